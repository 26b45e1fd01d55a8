/*!
This crate provides an in-memory catalog of television drama records and a
misspelling-tolerant search over their titles and director names. Searching
is done in two phases: exact substring matching always takes precedence, and
only when it finds nothing does the matcher fall back to approximate matching
using a length-normalized Levenshtein edit distance.
*/

#![deny(missing_docs)]

pub use crate::catalog::{Catalog, RecordProvider};
pub use crate::distance::{levenshtein, normalized_levenshtein};
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::matcher::{Matcher, Query, DEFAULT_THRESHOLD};
pub use crate::record::Drama;
pub use crate::results::MatchResults;

mod catalog;
mod distance;
mod error;
mod matcher;
mod record;
mod results;
