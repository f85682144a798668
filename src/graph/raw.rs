use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RawGraph {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    pub nodes: Vec<RawNode>,
    pub edges: Vec<RawEdge>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub insights: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawNode {
    pub id: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct RawEdge {
    pub source: String,
    pub target: String,
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub label: String,
    #[serde(default, deserialize_with = "lenient_number")]
    pub strength: Option<f64>,
}

impl RawEdge {
    pub const DEFAULT_STRENGTH: u8 = 3;

    pub fn clamped_strength(&self) -> u8 {
        match self.strength {
            Some(value) if value.is_finite() => value.round().clamp(1.0, 5.0) as u8,
            _ => Self::DEFAULT_STRENGTH,
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// Extractors emit strength as a number, a numeric string or null.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    })
}

/// Parses extractor output, tolerating prose around the JSON object.
pub fn parse_raw_graph(raw: &str) -> Result<RawGraph> {
    let start = raw
        .find('{')
        .ok_or_else(|| anyhow!("no JSON object found in extractor output"))?;
    let end = raw
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| anyhow!("unterminated JSON object in extractor output"))?;

    serde_json::from_str(&raw[start..=end]).context("extractor output is not a valid graph")
}
