use crate::error::Result;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

fn default_parent_id() -> i64 {
    crate::types::ROOT_ID
}

/// Flat `node_info` entry: one location, application or module.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeRecord {
    #[serde(default)]
    pub name: String,

    #[serde(default, rename = "type")]
    pub node_type: String,

    /// Declared parent. `-1` (or a dangling id) means no structural parent.
    #[serde(default = "default_parent_id")]
    pub parent_id: i64,

    /// Ids of instruments attached to this node.
    #[serde(default)]
    pub instrumentations: Vec<i64>,
}

/// Raw threshold record as delivered by the feed. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ThresholdRecord {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub key: Option<String>,

    #[serde(default)]
    pub threshold_type: Option<String>,

    #[serde(default)]
    pub value: Option<f64>,
}

/// Asset sub-record under an instrumentation entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetRecord {
    #[serde(default)]
    pub id: i64,

    #[serde(default)]
    pub serial: String,

    #[serde(default)]
    pub prod_code: String,

    #[serde(default)]
    pub product_name: String,
}

/// Flat `instrumentation_info` entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InstrumentationRecord {
    #[serde(default)]
    pub tag: String,

    #[serde(default, rename = "type")]
    pub node_type: String,

    #[serde(default)]
    pub value_keys: Vec<String>,

    /// Feed name for the primary value key.
    #[serde(default)]
    pub specifications: Option<String>,

    #[serde(default)]
    pub thresholds: Vec<ThresholdRecord>,

    #[serde(default)]
    pub assets: Vec<AssetRecord>,
}

/// The two flat mappings consumed at build time.
///
/// `BTreeMap` keys give the build passes a deterministic iteration order
/// (ascending id), which in turn fixes child insertion order and every
/// rendered output.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HierarchyFeed {
    #[serde(default)]
    pub node_info: BTreeMap<i64, NodeRecord>,

    #[serde(default)]
    pub instrumentation_info: BTreeMap<i64, InstrumentationRecord>,
}

impl HierarchyFeed {
    pub fn new(
        node_info: BTreeMap<i64, NodeRecord>,
        instrumentation_info: BTreeMap<i64, InstrumentationRecord>,
    ) -> Self {
        Self {
            node_info,
            instrumentation_info,
        }
    }

    /// Parse a feed from its JSON representation.
    pub fn from_json_str(raw: &str) -> Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Load a feed from a JSON file on disk.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_full_feed() {
        let raw = r#"{
            "node_info": {
                "1": {"name": "Main Location", "type": "location", "parent_id": -1, "instrumentations": []},
                "2": {"name": "Abstraction", "type": "water_abstraction", "parent_id": 1, "instrumentations": [100]}
            },
            "instrumentation_info": {
                "100": {
                    "tag": "Flow Meter",
                    "type": "Flow",
                    "value_keys": ["flow_rate"],
                    "specifications": "flow_rate",
                    "thresholds": [{"name": "high", "key": "flow_rate", "threshold_type": "upper", "value": 100.0}],
                    "assets": [{"id": 200, "serial": "FM-001", "prod_code": "FLOW-MASTER", "product_name": "FlowMaster Pro"}]
                }
            }
        }"#;

        let feed = HierarchyFeed::from_json_str(raw).unwrap();
        assert_eq!(feed.node_info.len(), 2);
        assert_eq!(feed.node_info[&2].instrumentations, vec![100]);

        let inst = &feed.instrumentation_info[&100];
        assert_eq!(inst.tag, "Flow Meter");
        assert_eq!(inst.specifications.as_deref(), Some("flow_rate"));
        assert_eq!(inst.thresholds[0].threshold_type.as_deref(), Some("upper"));
        assert_eq!(inst.assets[0].product_name, "FlowMaster Pro");
    }

    #[test]
    fn test_missing_fields_default() {
        // A sparse feed parses; absent fields fall back to defaults instead
        // of failing.
        let raw = r#"{
            "node_info": {"1": {"name": "Bare"}},
            "instrumentation_info": {"100": {"tag": "Sensor", "thresholds": [{}]}}
        }"#;

        let feed = HierarchyFeed::from_json_str(raw).unwrap();
        let node = &feed.node_info[&1];
        assert_eq!(node.node_type, "");
        assert_eq!(node.parent_id, -1);
        assert!(node.instrumentations.is_empty());

        let inst = &feed.instrumentation_info[&100];
        assert!(inst.specifications.is_none());
        assert!(inst.thresholds[0].value.is_none());
        assert!(inst.assets.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let feed = HierarchyFeed::from_json_str("{}").unwrap();
        assert!(feed.node_info.is_empty());
        assert!(feed.instrumentation_info.is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"node_info": {{"1": {{"name": "L", "type": "location"}}}}, "instrumentation_info": {{}}}}"#
        )
        .unwrap();

        let feed = HierarchyFeed::from_json_file(file.path()).unwrap();
        assert_eq!(feed.node_info[&1].name, "L");
    }

    #[test]
    fn test_invalid_json_is_feed_error() {
        let err = HierarchyFeed::from_json_str("not json").unwrap_err();
        assert!(matches!(err, crate::HierarchyError::Feed(_)));
    }
}
