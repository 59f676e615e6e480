use nw_hierarchy::{Node, SearchMatches, Threshold};
use serde::Serialize;

/// Serializable projection of a hierarchy node for tool replies.
///
/// Generic nodes carry just id/name/type; instrument and asset fields only
/// appear for the matching variant.
#[derive(Debug, Clone, Serialize)]
pub struct NodeView {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_val_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value_keys: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thresholds: Option<Vec<Threshold>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serial: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prod_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prod_name: Option<String>,
}

impl From<&Node> for NodeView {
    fn from(node: &Node) -> Self {
        let spec = node.instrument();
        Self {
            id: node.id,
            name: node.name.clone(),
            node_type: node.node_type.clone(),
            tag: node.tag().map(str::to_string),
            primary_val_key: spec.and_then(|s| s.primary_val_key.clone()),
            value_keys: spec.map(|s| s.value_keys.clone()),
            thresholds: spec.map(|s| s.thresholds.clone()),
            serial: node.serial().map(str::to_string),
            prod_code: node.prod_code().map(str::to_string),
            prod_name: node.asset().map(|a| a.prod_name.clone()),
        }
    }
}

/// Per-category search reply; all five categories are always present.
#[derive(Debug, Serialize)]
pub struct SearchView {
    pub locations: Vec<NodeView>,
    pub applications: Vec<NodeView>,
    pub modules: Vec<NodeView>,
    pub instrumentations: Vec<NodeView>,
    pub assets: Vec<NodeView>,
}

impl From<SearchMatches<'_>> for SearchView {
    fn from(matches: SearchMatches<'_>) -> Self {
        let views = |nodes: Vec<&Node>| nodes.into_iter().map(NodeView::from).collect();
        Self {
            locations: views(matches.locations),
            applications: views(matches.applications),
            modules: views(matches.modules),
            instrumentations: views(matches.instrumentations),
            assets: views(matches.assets),
        }
    }
}

pub(crate) fn node_views(nodes: Vec<&Node>) -> Vec<NodeView> {
    nodes.into_iter().map(NodeView::from).collect()
}
