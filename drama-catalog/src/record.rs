use serde::{Deserialize, Deserializer};

/// A single television drama record.
///
/// This is the primary record type of the catalog. The matcher only ever
/// reads the `id`, `title` and `director` fields; everything else is opaque
/// passthrough data for presentation layers. Records are typically
/// deserialized from a headered TSV catalog file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Drama {
    /// The stable identity key for this record.
    ///
    /// Match results are deduplicated by this key, so providers must ensure
    /// it uniquely identifies a record.
    pub id: u32,
    /// The title of the drama.
    ///
    /// A missing title compares as the empty string.
    #[serde(default)]
    pub title: String,
    /// The name of the drama's director.
    ///
    /// A missing director compares as the empty string.
    #[serde(default)]
    pub director: String,
    /// The year the drama first aired, if known.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub year: Option<u32>,
    /// The channel the drama aired on.
    #[serde(default)]
    pub channel: String,
    /// The total number of episodes, if known.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub episodes: Option<u32>,
    /// The rating, on a scale of 0 to 10, if one exists.
    #[serde(deserialize_with = "csv::invalid_option")]
    pub rating: Option<f32>,
    /// A free-form description of the drama.
    #[serde(default)]
    pub description: String,
    /// A path to the drama's cover image. The catalog does not interpret
    /// this in any way.
    #[serde(default)]
    pub image: String,
    /// The tags attached to this drama.
    ///
    /// In the TSV catalog, tags are encoded as a JSON array of strings in a
    /// single column. An empty column means no tags.
    #[serde(default, deserialize_with = "json_string_list")]
    pub tags: Vec<String>,
}

fn json_string_list<'de, D>(de: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(de)?;
    if raw.is_empty() {
        return Ok(vec![]);
    }
    serde_json::from_str(&raw).map_err(serde::de::Error::custom)
}
