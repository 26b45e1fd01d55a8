use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use drama_catalog::{Catalog, Matcher, Query, RecordProvider};

use crate::util::write_tsv;

mod logger;
mod util;

fn main() {
    if let Err(err) = try_main() {
        // A pipe error occurs when the consumer of this process's output has
        // hung up. This is a normal event, and we should quit gracefully.
        if is_pipe_error(&err) {
            process::exit(0);
        }
        eprintln!("{:?}", err);
        process::exit(1);
    }
}

fn try_main() -> anyhow::Result<()> {
    logger::init()?;
    log::set_max_level(log::LevelFilter::Info);

    let args = Args::from_matches(&app().get_matches())?;
    if args.debug {
        log::set_max_level(log::LevelFilter::Debug);
    }

    let catalog = Catalog::open(&args.data_file)?;
    if args.list_tags {
        let mut stdout = io::stdout();
        for tag in catalog.tags()? {
            writeln!(stdout, "{}", tag)?;
        }
        return Ok(());
    }

    let query: Query = match args.query {
        None => Query::new(),
        Some(ref query) => query.parse()?,
    };
    let matcher = Matcher::new(catalog);
    let results = matcher.search(&query)?;
    if results.is_empty() {
        // An empty result set is a normal outcome, not an error.
        eprintln!("no matching dramas found");
        return Ok(());
    }
    write_tsv(io::stdout(), &matcher, &query, results.as_slice())
}

#[derive(Debug)]
struct Args {
    data_file: PathBuf,
    debug: bool,
    list_tags: bool,
    query: Option<String>,
}

impl Args {
    fn from_matches(matches: &clap::ArgMatches) -> anyhow::Result<Args> {
        let query = matches
            .values_of_lossy("query")
            .map(|terms| terms.join(" "));
        let data_file =
            matches.value_of_os("data").map(PathBuf::from).unwrap();
        Ok(Args {
            data_file,
            debug: matches.is_present("debug"),
            list_tags: matches.is_present("list-tags"),
            query,
        })
    }
}

fn app() -> clap::App<'static, 'static> {
    use clap::{App, AppSettings, Arg};

    App::new("drama-search")
        .author(clap::crate_authors!())
        .version(clap::crate_version!())
        .max_term_width(100)
        .setting(AppSettings::UnifiedHelpMessage)
        .arg(Arg::with_name("query")
             .multiple(true)
             .help("Query terms matched against titles and director names. \
                    Misspellings are tolerated: when no exact match exists, \
                    close matches are found by edit distance. Supports \
                    {threshold:0.3} and {tag:name} directives. When absent, \
                    the whole catalog is printed."))
        .arg(Arg::with_name("data")
             .long("data")
             .env("DRAMA_SEARCH_DATA")
             .takes_value(true)
             .default_value("data/dramas.tsv")
             .help("The TSV file containing the drama catalog."))
        .arg(Arg::with_name("debug")
             .long("debug")
             .help("Show debug messages. Use this when filing bugs."))
        .arg(Arg::with_name("list-tags")
             .long("list-tags")
             .help("Print the distinct set of tags in the catalog, one per \
                    line, and exit."))
}

/// Return true if and only if an I/O broken pipe error exists in the causal
/// chain of the given error.
fn is_pipe_error(err: &anyhow::Error) -> bool {
    for cause in err.chain() {
        if let Some(ioerr) = cause.downcast_ref::<io::Error>() {
            if ioerr.kind() == io::ErrorKind::BrokenPipe {
                return true;
            }
        }
    }
    false
}
