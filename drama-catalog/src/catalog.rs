use std::collections::BTreeSet;
use std::fs::File;
use std::io;
use std::path::Path;

use log::debug;

use crate::error::{Error, Result};
use crate::record::Drama;

/// A source of candidate records for the matcher.
///
/// This is the seam between the matching core and whatever owns record
/// storage. The matcher only ever asks a provider for an already-resolved
/// list of candidates; storage failures surface as errors from these methods
/// and are never handled inside the matching logic itself.
///
/// The trait exists so the matcher can be exercised against an in-memory
/// catalog in tests rather than any particular storage backend.
pub trait RecordProvider {
    /// Return every record in the catalog.
    fn all(&self) -> Result<Vec<Drama>>;

    /// Return every record carrying the given tag.
    fn by_tag(&self, tag: &str) -> Result<Vec<Drama>>;

    /// Return the sorted set of distinct tags across all records.
    fn tags(&self) -> Result<Vec<String>>;
}

/// An in-memory drama catalog.
///
/// A catalog is usually loaded from a headered TSV file with one record per
/// row (see [`Drama`](struct.Drama.html) for the column set), but it can
/// also be built directly from records.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    records: Vec<Drama>,
}

impl Catalog {
    /// Load a catalog from a TSV file at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Catalog> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| Error::io_path(e, path))?;
        Catalog::from_reader(file)
    }

    /// Load a catalog from TSV data provided by any reader.
    pub fn from_reader<R: io::Read>(rdr: R) -> Result<Catalog> {
        let mut csvrdr = csv_reader_builder().from_reader(rdr);
        let mut records = vec![];
        for result in csvrdr.deserialize() {
            let record: Drama = result.map_err(Error::csv)?;
            records.push(record);
        }
        debug!("loaded {} drama records", records.len());
        Ok(Catalog { records })
    }

    /// Build a catalog directly from a sequence of records.
    pub fn from_records(records: Vec<Drama>) -> Catalog {
        Catalog { records }
    }

    /// Return all records in this catalog, in catalog order.
    pub fn records(&self) -> &[Drama] {
        &self.records
    }

    /// Returns the number of records in this catalog.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if and only if this catalog has no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl RecordProvider for Catalog {
    fn all(&self) -> Result<Vec<Drama>> {
        Ok(self.records.clone())
    }

    fn by_tag(&self, tag: &str) -> Result<Vec<Drama>> {
        Ok(self
            .records
            .iter()
            .filter(|r| r.tags.iter().any(|t| t == tag))
            .cloned()
            .collect())
    }

    fn tags(&self) -> Result<Vec<String>> {
        let set: BTreeSet<&str> = self
            .records
            .iter()
            .flat_map(|r| r.tags.iter().map(|t| t.as_str()))
            .collect();
        Ok(set.into_iter().map(str::to_string).collect())
    }
}

/// A CSV reader builder pre-loaded with the correct settings for reading
/// drama catalog TSV files.
fn csv_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder.has_headers(true).delimiter(b'\t').quoting(false);
    builder
}

#[cfg(test)]
mod tests {
    use super::{Catalog, RecordProvider};

    const CATALOG: &str = "\
id\ttitle\tdirector\tyear\tchannel\tepisodes\trating\tdescription\timage\ttags
1\tHumsafar\tSarmad Khoosat\t2011\tHum TV\t23\t9.0\tA classic.\thumsafar.jpg\t[\"romance\",\"family\"]
2\tAndhera Ujala\tRashid Dar\t1984\tPTV\tN/A\t8.5\tPolice drama.\t\t[\"crime\"]
3\tTanhaiyan\t\t1986\tPTV\t13\tN/A\t\t\t
";

    #[test]
    fn loads_records() {
        let catalog = Catalog::from_reader(CATALOG.as_bytes()).unwrap();
        assert_eq!(catalog.len(), 3);

        let humsafar = &catalog.records()[0];
        assert_eq!(humsafar.id, 1);
        assert_eq!(humsafar.title, "Humsafar");
        assert_eq!(humsafar.director, "Sarmad Khoosat");
        assert_eq!(humsafar.year, Some(2011));
        assert_eq!(humsafar.episodes, Some(23));
        assert_eq!(humsafar.tags, vec!["romance", "family"]);
    }

    #[test]
    fn invalid_numbers_become_none() {
        let catalog = Catalog::from_reader(CATALOG.as_bytes()).unwrap();
        assert_eq!(catalog.records()[1].episodes, None);
        assert_eq!(catalog.records()[2].rating, None);
    }

    #[test]
    fn missing_fields_are_empty() {
        let catalog = Catalog::from_reader(CATALOG.as_bytes()).unwrap();
        let tanhaiyan = &catalog.records()[2];
        assert_eq!(tanhaiyan.director, "");
        assert_eq!(tanhaiyan.description, "");
        assert!(tanhaiyan.tags.is_empty());
    }

    #[test]
    fn filter_by_tag() {
        let catalog = Catalog::from_reader(CATALOG.as_bytes()).unwrap();
        let romance = catalog.by_tag("romance").unwrap();
        assert_eq!(romance.len(), 1);
        assert_eq!(romance[0].title, "Humsafar");
        assert!(catalog.by_tag("thriller").unwrap().is_empty());
    }

    #[test]
    fn distinct_sorted_tags() {
        let catalog = Catalog::from_reader(CATALOG.as_bytes()).unwrap();
        assert_eq!(
            catalog.tags().unwrap(),
            vec!["crime", "family", "romance"]
        );
    }
}
