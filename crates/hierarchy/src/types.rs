use crate::error::{HierarchyError, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Reserved id of the synthetic root node.
pub const ROOT_ID: i64 = -1;

/// Type tag of the synthetic root node.
pub const ROOT_TYPE: &str = "NW_root";

/// Type tag of top-level location nodes.
pub const LOCATION_TYPE: &str = "location";

/// Recognized application type tags.
pub const APPLICATION_TYPES: [&str; 3] = [
    "water_abstraction",
    "water_distribution",
    "effluent_discharge",
];

/// Recognized module type tags.
pub const MODULE_TYPES: [&str; 7] = [
    "source_module",
    "disinfection_module",
    "storage_module",
    "outlet_module",
    "inlet_module",
    "transfer_module",
    "quality_control_module",
];

/// Named upper/lower limit bound to one of an instrument's value keys.
///
/// Fields missing in the feed stay absent rather than failing the build.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Threshold {
    pub name: Option<String>,

    /// Value key the limit applies to.
    pub key: Option<String>,

    /// Upper/lower semantics.
    #[serde(rename = "type")]
    pub kind: Option<String>,

    pub value: Option<f64>,
}

/// Instrument-only payload: measurement series and limits.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct InstrumentSpec {
    /// Key of the primary measurement series, if declared.
    pub primary_val_key: Option<String>,

    /// Ordered measurement series identifiers.
    pub value_keys: Vec<String>,

    /// Threshold records in feed order.
    pub thresholds: Vec<Threshold>,
}

/// Asset-only payload: product metadata.
///
/// The product code is stored in the node's shared `type` field and exposed
/// through [`Node::prod_code`]; only the product name needs dedicated storage.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AssetSpec {
    pub prod_name: String,
}

/// Closed set of node variants; categorization matches on this tag before
/// consulting the `type` string.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Generic,
    Instrument(InstrumentSpec),
    Asset(AssetSpec),
}

/// One element of the equipment hierarchy.
#[derive(Debug, Clone)]
pub struct Node {
    /// Identifier, unique across the hierarchy. `-1` is reserved for the root.
    pub id: i64,

    /// Display label, not guaranteed unique.
    pub name: String,

    /// Domain type tag (open string space).
    pub node_type: String,

    /// Variant payload.
    pub kind: NodeKind,
}

impl Node {
    /// Create a node. The only validated field is the id: anything below `-1`
    /// is rejected. Empty names and types are legal since the source feed is
    /// not guaranteed complete.
    pub fn new(id: i64, name: String, node_type: String, kind: NodeKind) -> Result<Self> {
        if id < ROOT_ID {
            return Err(HierarchyError::InvalidId(id));
        }
        Ok(Self {
            id,
            name,
            node_type,
            kind,
        })
    }

    pub fn is_instrument(&self) -> bool {
        matches!(self.kind, NodeKind::Instrument(_))
    }

    pub fn is_asset(&self) -> bool {
        matches!(self.kind, NodeKind::Asset(_))
    }

    /// Instrument view of the payload.
    pub fn instrument(&self) -> Option<&InstrumentSpec> {
        match &self.kind {
            NodeKind::Instrument(spec) => Some(spec),
            _ => None,
        }
    }

    /// Asset view of the payload.
    pub fn asset(&self) -> Option<&AssetSpec> {
        match &self.kind {
            NodeKind::Asset(spec) => Some(spec),
            _ => None,
        }
    }

    /// Instrument tag, an alias of `name`.
    pub fn tag(&self) -> Option<&str> {
        self.instrument().map(|_| self.name.as_str())
    }

    /// Asset serial number, an alias of `name`.
    pub fn serial(&self) -> Option<&str> {
        self.asset().map(|_| self.name.as_str())
    }

    /// Asset product code, an alias of the shared `type` field.
    pub fn prod_code(&self) -> Option<&str> {
        self.asset().map(|_| self.node_type.as_str())
    }

    /// Resolved category: runtime kind wins for instruments and assets,
    /// otherwise the `type` string decides. Unrecognized tags stay
    /// uncategorized.
    pub fn category(&self) -> Option<Category> {
        match &self.kind {
            NodeKind::Instrument(_) => Some(Category::Instrumentation),
            NodeKind::Asset(_) => Some(Category::Asset),
            NodeKind::Generic => {
                if self.node_type == LOCATION_TYPE {
                    Some(Category::Location)
                } else if APPLICATION_TYPES.contains(&self.node_type.as_str()) {
                    Some(Category::Application)
                } else if MODULE_TYPES.contains(&self.node_type.as_str()) {
                    Some(Category::Module)
                } else {
                    None
                }
            }
        }
    }
}

// Identity is the id alone: two nodes with the same id are the same entity
// even while name/type differ transiently during construction.
impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, '{}', {})", self.id, self.name, self.node_type)
    }
}

/// Semantic bucket a node lands in after categorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Location,
    Application,
    Module,
    Instrumentation,
    Asset,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Location => "locations",
            Category::Application => "applications",
            Category::Module => "modules",
            Category::Instrumentation => "instrumentations",
            Category::Asset => "assets",
        }
    }
}

/// Edge flavor in the hierarchy graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Strict parent/child ownership (location -> application -> module,
    /// instrument -> asset, root -> location).
    Owns,

    /// Module -> instrument attachment from the `instrumentations` list.
    /// Several nodes may attach the same instrument, so this layer is a DAG.
    Attaches,
}

/// Equipment hierarchy: one rooted graph plus the indices derived from it.
///
/// Built once by [`crate::HierarchyBuilder`]; read-only afterwards. The five
/// category lists are a materialized partition of the traversal, holding
/// arena indices rather than owning copies.
pub struct Hierarchy {
    /// Node arena with ownership and attachment edges.
    pub(crate) graph: DiGraph<Node, Link>,

    /// Synthetic root (id -1, type `NW_root`).
    pub(crate) root: NodeIndex,

    /// id -> arena index, every node including the root.
    pub(crate) id_index: HashMap<i64, NodeIndex>,

    pub(crate) locations: Vec<NodeIndex>,
    pub(crate) applications: Vec<NodeIndex>,
    pub(crate) modules: Vec<NodeIndex>,
    pub(crate) instrumentations: Vec<NodeIndex>,
    pub(crate) assets: Vec<NodeIndex>,
}

impl Hierarchy {
    /// Total nodes in the arena, including the root.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Total edges, ownership and attachment together.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::hash_map::DefaultHasher;

    fn hash_of(node: &Node) -> u64 {
        let mut hasher = DefaultHasher::new();
        node.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_valid_node_creation() {
        let node = Node::new(1, "Test Node".into(), "location".into(), NodeKind::Generic).unwrap();
        assert_eq!(node.id, 1);
        assert_eq!(node.name, "Test Node");
        assert_eq!(node.node_type, "location");
    }

    #[test]
    fn test_root_id_accepted() {
        let node = Node::new(ROOT_ID, "Root".into(), ROOT_TYPE.into(), NodeKind::Generic).unwrap();
        assert_eq!(node.id, -1);
    }

    #[test]
    fn test_invalid_id_rejected() {
        let err = Node::new(-2, "Invalid".into(), "location".into(), NodeKind::Generic)
            .expect_err("id below -1 must fail");
        assert!(matches!(err, HierarchyError::InvalidId(-2)));
    }

    #[test]
    fn test_empty_name_and_type_allowed() {
        assert!(Node::new(7, String::new(), String::new(), NodeKind::Generic).is_ok());
    }

    #[test]
    fn test_equality_is_id_only() {
        let a = Node::new(1, "Node1".into(), "location".into(), NodeKind::Generic).unwrap();
        let b = Node::new(1, "Node2".into(), "water_abstraction".into(), NodeKind::Generic).unwrap();
        let c = Node::new(2, "Node1".into(), "location".into(), NodeKind::Generic).unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_hash_consistent_with_equality() {
        let a = Node::new(1, "Node1".into(), "location".into(), NodeKind::Generic).unwrap();
        let b = Node::new(1, "Node2".into(), "water_abstraction".into(), NodeKind::Generic).unwrap();
        let c = Node::new(2, "Node1".into(), "location".into(), NodeKind::Generic).unwrap();

        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(hash_of(&a), hash_of(&c));
    }

    #[test]
    fn test_display_form() {
        let node = Node::new(1, "Test Node".into(), "location".into(), NodeKind::Generic).unwrap();
        assert_eq!(node.to_string(), "(1, 'Test Node', location)");
    }

    #[test]
    fn test_instrument_accessors() {
        let spec = InstrumentSpec {
            primary_val_key: Some("flow_rate".into()),
            value_keys: vec!["flow_rate".into(), "temperature".into()],
            thresholds: vec![],
        };
        let inst = Node::new(100, "Flow Meter".into(), "Flow".into(), NodeKind::Instrument(spec))
            .unwrap();

        assert_eq!(inst.tag(), Some("Flow Meter"));
        assert!(inst.is_instrument());
        assert_eq!(inst.serial(), None);
        assert_eq!(inst.category(), Some(Category::Instrumentation));
    }

    #[test]
    fn test_asset_accessors() {
        let asset = Node::new(
            200,
            "12345".into(),
            "FM001".into(),
            NodeKind::Asset(AssetSpec {
                prod_name: "FlowMaster".into(),
            }),
        )
        .unwrap();

        assert_eq!(asset.serial(), Some("12345"));
        assert_eq!(asset.prod_code(), Some("FM001"));
        assert_eq!(asset.asset().unwrap().prod_name, "FlowMaster");
        assert_eq!(asset.tag(), None);
        assert_eq!(asset.category(), Some(Category::Asset));
    }

    #[test]
    fn test_kind_wins_over_type_tag() {
        // An instrument whose type string collides with a module tag still
        // categorizes as an instrumentation.
        let inst = Node::new(
            100,
            "Odd".into(),
            "source_module".into(),
            NodeKind::Instrument(InstrumentSpec::default()),
        )
        .unwrap();
        assert_eq!(inst.category(), Some(Category::Instrumentation));
    }

    #[test]
    fn test_unrecognized_type_uncategorized() {
        let node = Node::new(5, "Mystery".into(), "pumping_station".into(), NodeKind::Generic)
            .unwrap();
        assert_eq!(node.category(), None);
    }
}
