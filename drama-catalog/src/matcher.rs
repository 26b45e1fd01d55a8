use std::cmp;
use std::fmt;
use std::result;
use std::str::FromStr;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::catalog::RecordProvider;
use crate::distance::{levenshtein, normalized_levenshtein};
use crate::error::{Error, Result};
use crate::record::Drama;
use crate::results::MatchResults;

/// The normalized distance threshold used when a query does not specify one.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// A handle that matches queries against a catalog of drama records.
///
/// A matcher is constructed by providing it a
/// [`RecordProvider`](trait.RecordProvider.html). The provider is
/// responsible for record storage, while the `Matcher` provides the match
/// policy: exact substring matching first, approximate matching as a
/// fallback.
///
/// The primary interface to a `Matcher` is its `search` method, which takes
/// as input a [`Query`](struct.Query.html) and returns an ordered,
/// deduplicated [`MatchResults`](struct.MatchResults.html) as output.
#[derive(Debug)]
pub struct Matcher<P> {
    provider: P,
}

impl<P: RecordProvider> Matcher<P> {
    /// Create a new matcher for the given provider.
    ///
    /// A single matcher can be used to execute many queries.
    pub fn new(provider: P) -> Matcher<P> {
        Matcher { provider }
    }

    /// Execute a search with the given `Query`.
    ///
    /// Matching runs in two phases. The exact phase selects every candidate
    /// whose title or director contains the query name as a case-insensitive
    /// substring, sorted by title with ties keeping provider order. Only
    /// when the exact phase selects nothing does the fuzzy phase run: it
    /// case-folds the query and each candidate's fields and qualifies a
    /// candidate whenever the normalized Levenshtein distance between the
    /// query and the title, the director, or any single word of the title is
    /// within the query's threshold. Exact hits and fuzzy hits are never
    /// mixed into one result set.
    ///
    /// Fuzzy results preserve the provider-supplied candidate order and are
    /// deduplicated by record id, keeping the first qualification only.
    ///
    /// A query without a name applies no filter at all: the entire candidate
    /// set is returned, sorted by title. If the query has a tag, the
    /// candidate set is restricted to records carrying that tag before any
    /// matching happens.
    ///
    /// An error is only ever returned by the provider; the match policy
    /// itself cannot fail.
    pub fn search(&self, query: &Query) -> Result<MatchResults> {
        let candidates = match query.tag {
            None => self.provider.all()?,
            Some(ref tag) => self.provider.by_tag(tag)?,
        };
        let name = match query.name {
            Some(ref name) if !name.is_empty() => name.to_lowercase(),
            _ => {
                let mut results: MatchResults =
                    candidates.into_iter().collect();
                results.sort_by_title();
                return Ok(results);
            }
        };
        let results = exact_phase(&name, &candidates);
        if !results.is_empty() {
            return Ok(results);
        }
        Ok(fuzzy_phase(&name, query.clamped_threshold(), candidates))
    }

    /// Return the smallest edit distance between the query name and the
    /// given record, considering the title, the director and each word of
    /// the title, all case-folded.
    ///
    /// Returns `None` when the query has no name. This is intended for
    /// presenting match details alongside fuzzy results; it plays no role in
    /// the match decision itself.
    pub fn min_distance(
        &self,
        query: &Query,
        record: &Drama,
    ) -> Option<usize> {
        let name = match query.name {
            Some(ref name) if !name.is_empty() => name.to_lowercase(),
            _ => return None,
        };
        let title = record.title.to_lowercase();
        let director = record.director.to_lowercase();
        let mut min = cmp::min(
            levenshtein(&name, &title),
            levenshtein(&name, &director),
        );
        for word in title.split_whitespace() {
            min = cmp::min(min, levenshtein(&name, word));
        }
        Some(min)
    }

    /// Return a reference to the underlying provider for this matcher.
    pub fn provider(&self) -> &P {
        &self.provider
    }
}

/// Select every candidate containing `name` as a substring of its title or
/// director. `name` must already be case-folded.
fn exact_phase(name: &str, candidates: &[Drama]) -> MatchResults {
    let mut results = MatchResults::new();
    for record in candidates {
        if record.title.to_lowercase().contains(name)
            || record.director.to_lowercase().contains(name)
        {
            results.push(record.clone());
        }
    }
    results.sort_by_title();
    results
}

/// Select every candidate within the normalized distance threshold of
/// `name`, in candidate order. `name` must already be case-folded.
fn fuzzy_phase(
    name: &str,
    threshold: f64,
    candidates: Vec<Drama>,
) -> MatchResults {
    let mut results = MatchResults::new();
    for record in candidates {
        if is_fuzzy_match(name, threshold, &record) {
            results.push(record);
        }
    }
    results
}

fn is_fuzzy_match(name: &str, threshold: f64, record: &Drama) -> bool {
    let title = record.title.to_lowercase();
    if normalized_levenshtein(name, &title) <= threshold {
        return true;
    }
    if normalized_levenshtein(name, &record.director.to_lowercase())
        <= threshold
    {
        return true;
    }
    title
        .split_whitespace()
        .any(|word| normalized_levenshtein(name, word) <= threshold)
}

/// A query that can be used to search a drama catalog.
///
/// A query typically consists of a name (matched against titles and
/// directors), a normalized distance threshold controlling how tolerant the
/// fuzzy fallback is, and an optional tag restricting the candidate set.
///
/// A threshold of `0.0` only matches names that are identical after case
/// folding, while `1.0` matches everything. Queries without a name return
/// the full candidate set.
///
/// The `Serialize` and `Deserialize` implementations for this type use the
/// free-form query syntax, e.g. `{threshold:0.25} {tag:romance} humsafar`.
#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    name: Option<String>,
    threshold: f64,
    tag: Option<String>,
}

impl Default for Query {
    fn default() -> Query {
        Query::new()
    }
}

impl Query {
    /// Create a new empty query with the default threshold.
    pub fn new() -> Query {
        Query { name: None, threshold: DEFAULT_THRESHOLD, tag: None }
    }

    /// Return true if and only if this query is empty.
    ///
    /// Searching with an empty query returns the whole catalog.
    pub fn is_empty(&self) -> bool {
        self.name.as_ref().map_or(true, |n| n.is_empty())
            && self.tag.is_none()
    }

    /// Set the name to query by.
    ///
    /// The name is matched against both titles and director names.
    pub fn name(mut self, name: &str) -> Query {
        self.name = Some(name.to_string());
        self
    }

    /// Set the normalized distance threshold for the fuzzy fallback.
    ///
    /// The threshold is a user-tunable parameter, so out-of-range and
    /// non-finite values are never errors: values are clamped to `[0, 1]`
    /// at search time, and `NaN` falls back to the default.
    pub fn threshold(mut self, threshold: f64) -> Query {
        self.threshold = threshold;
        self
    }

    /// Restrict the candidate set to records carrying the given tag.
    pub fn tag(mut self, tag: &str) -> Query {
        self.tag = Some(tag.to_string());
        self
    }

    fn clamped_threshold(&self) -> f64 {
        if self.threshold.is_nan() {
            return DEFAULT_THRESHOLD;
        }
        self.threshold.max(0.0).min(1.0)
    }
}

impl Serialize for Query {
    fn serialize<S>(&self, s: S) -> result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        s.serialize_str(&self.to_string())
    }
}

impl<'a> Deserialize<'a> for Query {
    fn deserialize<D>(d: D) -> result::Result<Query, D::Error>
    where
        D: Deserializer<'a>,
    {
        use serde::de::Error;

        let querystr = String::deserialize(d)?;
        querystr
            .parse()
            .map_err(|e: self::Error| D::Error::custom(e.to_string()))
    }
}

impl FromStr for Query {
    type Err = Error;

    fn from_str(qstr: &str) -> Result<Query> {
        lazy_static! {
            // The 'directive', 'terms' and 'space' groups are all mutually
            // exclusive. When 'directive' matches, we parse it using
            // DIRECTIVE in a subsequent step. When 'terms' matches, we add
            // them to the name query. When 'space' matches, we ignore it.
            static ref PARTS: Regex = Regex::new(
                r"\{(?P<directive>[^}]+)\}|(?P<terms>[^{}\s]+)|(?P<space>\s+)"
            ).unwrap();

            // Parse a directive of the form '{name:val}'.
            static ref DIRECTIVE: Regex = Regex::new(
                r"^(?P<name>[^:]+):(?P<val>.+)$"
            ).unwrap();
        }
        let mut terms = vec![];
        let mut q = Query::new();
        for caps in PARTS.captures_iter(qstr) {
            if caps.name("space").is_some() {
                continue;
            } else if let Some(m) = caps.name("terms") {
                terms.push(m.as_str().to_string());
                continue;
            }

            let dcaps = match DIRECTIVE.captures(&caps["directive"]) {
                None => {
                    return Err(Error::unknown_directive(&caps["directive"]))
                }
                Some(dcaps) => dcaps,
            };
            let (name, val) = (dcaps["name"].trim(), dcaps["val"].trim());
            match name {
                "threshold" => {
                    q.threshold = val.parse().map_err(Error::number)?;
                }
                "tag" => {
                    q.tag = Some(val.to_string());
                }
                unk => return Err(Error::unknown_directive(unk)),
            }
        }
        if !terms.is_empty() {
            q = q.name(&terms.join(" "));
        }
        Ok(q)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{threshold:{}}}", self.threshold)?;
        if let Some(ref tag) = self.tag {
            write!(f, " {{tag:{}}}", tag)?;
        }
        if let Some(ref name) = self.name {
            write!(f, " {}", name)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    fn drama(id: u32, title: &str, director: &str) -> Drama {
        Drama {
            id,
            title: title.to_string(),
            director: director.to_string(),
            ..Drama::default()
        }
    }

    fn tagged(id: u32, title: &str, tags: &[&str]) -> Drama {
        Drama {
            id,
            title: title.to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            ..Drama::default()
        }
    }

    fn matcher(records: Vec<Drama>) -> Matcher<Catalog> {
        Matcher::new(Catalog::from_records(records))
    }

    fn titles(results: &MatchResults) -> Vec<&str> {
        results.as_slice().iter().map(|r| r.title.as_str()).collect()
    }

    #[test]
    fn exact_substring_match() {
        let m = matcher(vec![
            drama(1, "Humsafar", "Sarmad Khoosat"),
            drama(2, "Humraaz", "Iqbal Ansari"),
            drama(3, "Tanhaiyan", "Shahzad Khalil"),
        ]);
        let results = m.search(&Query::new().name("Hum")).unwrap();
        assert_eq!(titles(&results), vec!["Humraaz", "Humsafar"]);
    }

    #[test]
    fn exact_phase_matches_director_too() {
        let m = matcher(vec![
            drama(1, "Humsafar", "Sarmad Khoosat"),
            drama(2, "Shehr-e-Zaat", "Sarmad Khoosat"),
        ]);
        let results = m.search(&Query::new().name("khoosat")).unwrap();
        assert_eq!(results.len(), 2);
    }

    // Even with a threshold that would make the fuzzy phase match every
    // candidate, an exact hit must suppress the fuzzy phase entirely.
    #[test]
    fn exact_hits_win_over_fuzzy() {
        let m = matcher(vec![
            drama(1, "Humsafar", "Sarmad Khoosat"),
            drama(2, "Humraaz", "Iqbal Ansari"),
            drama(3, "Dhoop Kinare", "Sahira Kazmi"),
        ]);
        let query = Query::new().name("Hum").threshold(1.0);
        let results = m.search(&query).unwrap();
        assert_eq!(titles(&results), vec!["Humraaz", "Humsafar"]);
    }

    #[test]
    fn fuzzy_fallback_on_misspelling() {
        let m = matcher(vec![
            drama(1, "Andhera Ujala", "Tariq Mairaj"),
            drama(2, "Dhoop Kinare", "Sahira Kazmi"),
        ]);
        let results =
            m.search(&Query::new().name("Andera Ujhala")).unwrap();
        assert_eq!(titles(&results), vec!["Andhera Ujala"]);
    }

    #[test]
    fn threshold_boundaries() {
        let records = vec![drama(1, "Andhera Ujala", "Tariq Mairaj")];

        // Strings differ, so a zero threshold must reject them.
        let m = matcher(records.clone());
        let query = Query::new().name("Andera Ujhala").threshold(0.0);
        assert!(m.search(&query).unwrap().is_empty());

        // A threshold of 1.0 matches anything.
        let query = Query::new().name("zzzzz").threshold(1.0);
        assert_eq!(m.search(&query).unwrap().len(), 1);
    }

    #[test]
    fn zero_threshold_admits_only_identical_strings() {
        let record = drama(1, "Humsafar", "Sarmad Khoosat");
        // Case folding alone never contributes distance.
        assert!(is_fuzzy_match("humsafar", 0.0, &record));
        assert!(!is_fuzzy_match("humsafa", 0.0, &record));
    }

    #[test]
    fn fuzzy_matches_single_title_word() {
        let m = matcher(vec![
            drama(1, "Andhera Ujala", "Tariq Mairaj"),
            drama(2, "Dhoop Kinare", "Sahira Kazmi"),
        ]);
        // "ujhala" is close to the word "ujala" but far from the full
        // title and from both directors.
        let results = m.search(&Query::new().name("ujhala")).unwrap();
        assert_eq!(titles(&results), vec!["Andhera Ujala"]);
    }

    #[test]
    fn fuzzy_dedups_multi_criteria_hits() {
        // Title and director both qualify; the record must appear once, in
        // its provider position.
        let m = matcher(vec![
            drama(1, "Kankar", "Kankar Khan"),
            drama(2, "Kankr", "Nobody"),
        ]);
        let results = m.search(&Query::new().name("Kankarr")).unwrap();
        let ids: Vec<u32> =
            results.as_slice().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn empty_query_returns_everything() {
        let m = matcher(vec![
            drama(1, "Tanhaiyan", "Shahzad Khalil"),
            drama(2, "Humsafar", "Sarmad Khoosat"),
        ]);
        let results = m.search(&Query::new()).unwrap();
        assert_eq!(titles(&results), vec!["Humsafar", "Tanhaiyan"]);
    }

    #[test]
    fn tag_restricts_candidates() {
        let m = matcher(vec![
            tagged(1, "Humsafar", &["romance"]),
            tagged(2, "Andhera Ujala", &["crime"]),
            tagged(3, "Dhuwan", &["crime"]),
        ]);
        let results =
            m.search(&Query::new().tag("crime")).unwrap();
        assert_eq!(titles(&results), vec!["Andhera Ujala", "Dhuwan"]);

        // A name query only sees candidates carrying the tag.
        let results =
            m.search(&Query::new().name("Humsafar").tag("crime")).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn search_is_idempotent() {
        let m = matcher(vec![
            drama(1, "Andhera Ujala", "Tariq Mairaj"),
            drama(2, "Dhoop Kinare", "Sahira Kazmi"),
        ]);
        let query = Query::new().name("Andera Ujhala");
        let first = m.search(&query).unwrap().into_vec();
        let second = m.search(&query).unwrap().into_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_range_thresholds_are_clamped() {
        let records = vec![drama(1, "Andhera Ujala", "Tariq Mairaj")];

        // Below zero behaves like zero.
        let m = matcher(records.clone());
        let query = Query::new().name("Andera Ujhala").threshold(-3.0);
        assert!(m.search(&query).unwrap().is_empty());

        // Above one behaves like one.
        let query = Query::new().name("zzzzz").threshold(42.0);
        assert_eq!(m.search(&query).unwrap().len(), 1);

        // NaN falls back to the default, which admits the misspelling.
        let query =
            Query::new().name("Andera Ujhala").threshold(f64::NAN);
        assert_eq!(m.search(&query).unwrap().len(), 1);
    }

    #[test]
    fn min_distance_takes_best_of_title_director_words() {
        let m = matcher(vec![]);
        let record = drama(1, "Andhera Ujala", "Tariq Mairaj");

        let query = Query::new().name("ujhala");
        assert_eq!(m.min_distance(&query, &record), Some(1));

        let query = Query::new().name("tariq mairaj");
        assert_eq!(m.min_distance(&query, &record), Some(0));

        assert_eq!(m.min_distance(&Query::new(), &record), None);
    }

    #[test]
    fn query_parser() {
        let q: Query = "andhera ujala".parse().unwrap();
        assert_eq!(q, Query::new().name("andhera ujala"));

        let q: Query = "{threshold:0.25}".parse().unwrap();
        assert_eq!(q, Query::new().threshold(0.25));

        let q: Query = "{ threshold : 0.25 }".parse().unwrap();
        assert_eq!(q, Query::new().threshold(0.25));

        let q: Query = "{tag:romance}".parse().unwrap();
        assert_eq!(q, Query::new().tag("romance"));

        let q: Query =
            "andhera {threshold:0.5} ujala {tag:crime}".parse().unwrap();
        assert_eq!(
            q,
            Query::new()
                .name("andhera ujala")
                .threshold(0.5)
                .tag("crime")
        );
    }

    #[test]
    fn query_parser_error() {
        assert!("{blah}".parse::<Query>().is_err());
        assert!("{blah:5}".parse::<Query>().is_err());
        assert!("{threshold:abc}".parse::<Query>().is_err());
    }

    #[test]
    fn query_parser_weird() {
        let q: Query = "{tanhaiyan".parse().unwrap();
        assert_eq!(q, Query::new().name("tanhaiyan"));

        let q: Query = "tanhaiyan}".parse().unwrap();
        assert_eq!(q, Query::new().name("tanhaiyan"));
    }

    #[test]
    fn query_display() {
        let q = Query::new()
            .name("andhera ujala")
            .threshold(0.25)
            .tag("crime");
        assert_eq!(
            q.to_string(),
            "{threshold:0.25} {tag:crime} andhera ujala"
        );
    }

    #[test]
    fn query_serialize() {
        #[derive(Serialize)]
        struct Test {
            query: Query,
        }
        let query = Query::new().name("humsafar").threshold(0.5);
        let got = serde_json::to_string(&Test { query }).unwrap();

        let expected = r#"{"query":"{threshold:0.5} humsafar"}"#;
        assert_eq!(got, expected);
    }

    #[test]
    fn query_deserialize() {
        let json = r#"{"query": "humsafar {tag:romance}"}"#;
        let expected: Query =
            "{tag:romance} humsafar".parse().unwrap();

        #[derive(Deserialize)]
        struct Test {
            query: Query,
        }
        let got: Test = serde_json::from_str(json).unwrap();
        assert_eq!(got.query, expected);
    }
}
