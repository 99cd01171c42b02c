//! Mapping-tool hitsound layer export

use crate::error::Result;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::Path;

/// Top-level export document
///
/// Fields other than the layers are carried through untouched so the export
/// can be written back with generated sample paths filled in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitsoundExport {
    #[serde(rename = "HitsoundLayers", default)]
    pub layers: Vec<HitsoundLayer>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One hitsound layer: a key/length pair and the times it plays at
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HitsoundLayer {
    #[serde(rename = "SampleArgs")]
    pub sample_args: SampleArgs,
    #[serde(rename = "Times", default)]
    pub times: Vec<Number>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SampleArgs {
    #[serde(rename = "Key")]
    pub key: Number,
    #[serde(rename = "Length")]
    pub length: Number,
    /// Sample file the layer plays
    #[serde(rename = "Path", default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A numeric field that the exporter may write as a JSON number or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Value(serde_json::Number),
    Text(String),
}

impl Number {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Number::Value(v) => v.as_f64(),
            Number::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl HitsoundExport {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::parse(&text)
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_fields() {
        let export = HitsoundExport::parse(
            r#"{"HitsoundLayers":[{"Name":"piano","SampleArgs":{"Key":60,"Length":"500","Path":""},"Times":["0","1000"]}]}"#,
        )
        .unwrap();
        let layer = &export.layers[0];
        assert_eq!(layer.sample_args.key.as_f64(), Some(60.0));
        assert_eq!(layer.sample_args.length.as_f64(), Some(500.0));
        let times: Vec<f64> = layer.times.iter().filter_map(Number::as_f64).collect();
        assert_eq!(times, vec![0.0, 1000.0]);
    }

    #[test]
    fn test_numeric_fields() {
        let export = HitsoundExport::parse(
            r#"{"HitsoundLayers":[{"SampleArgs":{"Key":"62","Length":250.5},"Times":[12.5]}]}"#,
        )
        .unwrap();
        assert_eq!(export.layers[0].sample_args.key.as_f64(), Some(62.0));
        assert_eq!(export.layers[0].sample_args.length.as_f64(), Some(250.5));
        assert_eq!(export.layers[0].times[0].as_f64(), Some(12.5));
    }

    #[test]
    fn test_missing_layers_is_empty() {
        let export = HitsoundExport::parse("{}").unwrap();
        assert!(export.layers.is_empty());
    }

    #[test]
    fn test_written_back_with_unknown_fields() {
        let mut export = HitsoundExport::parse(
            r#"{"Version":3,"HitsoundLayers":[{"Name":"piano","SampleArgs":{"Key":60,"Length":"500","Path":"","Volume":0.8},"Times":[0,"1000"]}]}"#,
        )
        .unwrap();
        export.layers[0].sample_args.path = Some("out/C4-500.ogg".to_string());

        let value: Value = serde_json::from_str(&export.to_json().unwrap()).unwrap();
        assert_eq!(value["Version"], 3);
        let layer = &value["HitsoundLayers"][0];
        assert_eq!(layer["Name"], "piano");
        assert_eq!(layer["SampleArgs"]["Key"], 60);
        assert_eq!(layer["SampleArgs"]["Length"], "500");
        assert_eq!(layer["SampleArgs"]["Path"], "out/C4-500.ogg");
        assert_eq!(layer["SampleArgs"]["Volume"], 0.8);
        assert_eq!(layer["Times"], serde_json::json!([0, "1000"]));
    }

    #[test]
    fn test_unparsable_text() {
        assert_eq!(Number::Text("abc".into()).as_f64(), None);
    }
}
