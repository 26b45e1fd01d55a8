use std::io::{self, Write};

use drama_catalog::{Drama, Matcher, Query, RecordProvider};
use tabwriter::TabWriter;

/// Write the given result set to the given writer as an aligned table.
///
/// When the query carries a name, an edit distance column is included so
/// that the reader can see how far each match is from what they typed. For
/// queries without a name (catalog listings, tag browsing) the column shows
/// a dash.
pub fn write_tsv<W: io::Write, P: RecordProvider>(
    wtr: W,
    matcher: &Matcher<P>,
    query: &Query,
    results: &[Drama],
) -> anyhow::Result<()> {
    let mut wtr = TabWriter::new(wtr).minwidth(4);
    writeln!(wtr, "#\tdist\tid\ttitle\tdirector\tyear\tchannel\teps\trating")?;
    for (i, record) in results.iter().enumerate() {
        let dist = matcher
            .min_distance(query, record)
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            wtr,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            i + 1,
            dist,
            record.id,
            record.title,
            record.director,
            record.year.map(|y| y.to_string()).unwrap_or("N/A".to_string()),
            record.channel,
            record
                .episodes
                .map(|e| e.to_string())
                .unwrap_or("N/A".to_string()),
            record
                .rating
                .map(|r| format!("{:0.1}", r))
                .unwrap_or("N/A".to_string()),
        )?;
    }
    wtr.flush()?;
    Ok(())
}
