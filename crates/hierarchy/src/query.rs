use crate::error::{HierarchyError, Result};
use crate::types::{Hierarchy, Node, APPLICATION_TYPES, LOCATION_TYPE, MODULE_TYPES};
use petgraph::graph::NodeIndex;

/// Per-category substring matches; every category is present on every
/// search, empty or not.
#[derive(Debug)]
pub struct SearchMatches<'a> {
    pub locations: Vec<&'a Node>,
    pub applications: Vec<&'a Node>,
    pub modules: Vec<&'a Node>,
    pub instrumentations: Vec<&'a Node>,
    pub assets: Vec<&'a Node>,
}

impl Hierarchy {
    /// The synthetic root node.
    pub fn root(&self) -> &Node {
        &self.graph[self.root]
    }

    /// Arena index for an id, if present.
    pub fn index_of(&self, id: i64) -> Option<NodeIndex> {
        self.id_index.get(&id).copied()
    }

    /// Node data at an arena index. Panics only on an index that never came
    /// from this hierarchy.
    pub fn node_at(&self, idx: NodeIndex) -> &Node {
        &self.graph[idx]
    }

    /// O(1) id lookup; `None` when absent.
    pub fn get_node_by_id(&self, id: i64) -> Option<&Node> {
        self.index_of(id).map(|idx| &self.graph[idx])
    }

    /// Child indices in edge insertion order. petgraph yields outgoing
    /// edges in reverse order of addition, hence the flip.
    pub(crate) fn child_indices(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        use petgraph::visit::EdgeRef;
        let mut children: Vec<NodeIndex> = self.graph.edges(idx).map(|e| e.target()).collect();
        children.reverse();
        children
    }

    /// Children of a node, insertion order preserved.
    pub fn children_of(&self, idx: NodeIndex) -> Vec<&Node> {
        self.child_indices(idx)
            .into_iter()
            .map(|c| &self.graph[c])
            .collect()
    }

    fn guarded_children(
        &self,
        target: Option<NodeIndex>,
        role: &'static str,
    ) -> Result<Vec<&Node>> {
        let idx = target.ok_or(HierarchyError::MissingNode(role))?;
        if self.graph.node_weight(idx).is_none() {
            return Err(HierarchyError::MissingNode(role));
        }
        Ok(self.children_of(idx))
    }

    /// Applications (all children) of a location. Errors on a missing
    /// argument rather than crashing; the caller decides how to surface it.
    pub fn get_applications(&self, location: Option<NodeIndex>) -> Result<Vec<&Node>> {
        self.guarded_children(location, "location")
    }

    /// Modules (all children, attached instruments included) of an
    /// application.
    pub fn get_modules(&self, application: Option<NodeIndex>) -> Result<Vec<&Node>> {
        self.guarded_children(application, "application")
    }

    /// Instrumentations (all children) of a module.
    pub fn get_instrumentations(&self, module: Option<NodeIndex>) -> Result<Vec<&Node>> {
        self.guarded_children(module, "module")
    }

    /// Assets (all children) of an instrumentation.
    pub fn get_assets(&self, instrument: Option<NodeIndex>) -> Result<Vec<&Node>> {
        self.guarded_children(instrument, "instrumentation")
    }

    fn resolve(&self, indices: &[NodeIndex]) -> Vec<&Node> {
        indices.iter().map(|&idx| &self.graph[idx]).collect()
    }

    pub fn all_locations(&self) -> Vec<&Node> {
        self.resolve(&self.locations)
    }

    pub fn all_applications(&self) -> Vec<&Node> {
        self.resolve(&self.applications)
    }

    pub fn all_modules(&self) -> Vec<&Node> {
        self.resolve(&self.modules)
    }

    pub fn all_instrumentations(&self) -> Vec<&Node> {
        self.resolve(&self.instrumentations)
    }

    pub fn all_assets(&self) -> Vec<&Node> {
        self.resolve(&self.assets)
    }

    /// Every categorized node, list concatenation order. The root and
    /// uncategorized nodes are deliberately absent.
    fn categorized(&self) -> impl Iterator<Item = &Node> {
        self.locations
            .iter()
            .chain(&self.applications)
            .chain(&self.modules)
            .chain(&self.instrumentations)
            .chain(&self.assets)
            .map(move |&idx| &self.graph[idx])
    }

    /// Exact-name lookup over the categorized nodes, optionally narrowed to
    /// an exact type tag.
    pub fn get_nodes_by_name(&self, name: &str, node_type: Option<&str>) -> Vec<&Node> {
        self.categorized()
            .filter(|n| n.name == name)
            .filter(|n| node_type.map_or(true, |t| n.node_type == t))
            .collect()
    }

    /// Exact-type lookup: the location list, a filtered application or
    /// module list, or instruments-then-assets for any other tag.
    pub fn get_nodes_by_type(&self, node_type: &str) -> Vec<&Node> {
        if node_type == LOCATION_TYPE {
            self.all_locations()
        } else if APPLICATION_TYPES.contains(&node_type) {
            self.all_applications()
                .into_iter()
                .filter(|n| n.node_type == node_type)
                .collect()
        } else if MODULE_TYPES.contains(&node_type) {
            self.all_modules()
                .into_iter()
                .filter(|n| n.node_type == node_type)
                .collect()
        } else {
            self.all_instrumentations()
                .into_iter()
                .chain(self.all_assets())
                .filter(|n| n.node_type == node_type)
                .collect()
        }
    }

    /// Substring search over node names, per category.
    pub fn search(&self, term: &str, case_sensitive: bool) -> SearchMatches<'_> {
        let needle = if case_sensitive {
            term.to_string()
        } else {
            term.to_lowercase()
        };
        let matches = |indices: &[NodeIndex]| -> Vec<&Node> {
            indices
                .iter()
                .map(|&idx| &self.graph[idx])
                .filter(|n| {
                    if case_sensitive {
                        n.name.contains(&needle)
                    } else {
                        n.name.to_lowercase().contains(&needle)
                    }
                })
                .collect()
        };

        SearchMatches {
            locations: matches(&self.locations),
            applications: matches(&self.applications),
            modules: matches(&self.modules),
            instrumentations: matches(&self.instrumentations),
            assets: matches(&self.assets),
        }
    }

    /// Instruments carrying the given value key (exact membership).
    pub fn get_instrumentations_by_value_key(&self, value_key: &str) -> Vec<&Node> {
        self.all_instrumentations()
            .into_iter()
            .filter(|n| {
                n.instrument()
                    .map_or(false, |spec| spec.value_keys.iter().any(|k| k == value_key))
            })
            .collect()
    }

    /// Instruments of the given type, matched case-insensitively the way
    /// the tool contract promises ("flow" finds type "Flow").
    pub fn get_instrumentations_by_type(&self, instrument_type: &str) -> Vec<&Node> {
        self.all_instrumentations()
            .into_iter()
            .filter(|n| n.node_type.eq_ignore_ascii_case(instrument_type))
            .collect()
    }

    /// Instruments with an empty threshold list.
    pub fn get_instrumentations_without_thresholds(&self) -> Vec<&Node> {
        self.all_instrumentations()
            .into_iter()
            .filter(|n| n.instrument().map_or(false, |spec| spec.thresholds.is_empty()))
            .collect()
    }

    /// First asset whose serial (name) matches exactly.
    pub fn get_asset_by_serial(&self, serial: &str) -> Option<&Node> {
        self.all_assets().into_iter().find(|n| n.name == serial)
    }
}
