use crate::error::Result;
use crate::feed::HierarchyFeed;
use crate::types::{
    AssetSpec, Hierarchy, InstrumentSpec, Link, Node, NodeKind, Threshold, LOCATION_TYPE, ROOT_ID,
    ROOT_TYPE,
};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Builds a [`Hierarchy`] from the two flat feed mappings.
///
/// Linking happens in five passes: plain nodes, instruments with their
/// assets, declared parent edges, instrument attachment edges, and the
/// synthetic root. A final traversal materializes the five category lists.
/// Malformed feed data (dangling ids, repeated attachments, missing fields)
/// degrades instead of failing; only an invalid node id aborts the build.
pub struct HierarchyBuilder;

impl HierarchyBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Build the hierarchy. No partially built value escapes on error.
    pub fn build(&self, feed: &HierarchyFeed) -> Result<Hierarchy> {
        let mut graph: DiGraph<Node, Link> = DiGraph::new();
        let mut id_index: HashMap<i64, NodeIndex> = HashMap::new();

        // Pass 1: instantiate plain nodes. No edges yet.
        for (&id, record) in &feed.node_info {
            let node = Node::new(
                id,
                record.name.clone(),
                record.node_type.clone(),
                NodeKind::Generic,
            )?;
            Self::upsert(&mut graph, &mut id_index, node);
        }

        // Pass 2: instantiate instruments and their assets. An instrument id
        // colliding with a pass-1 node overwrites the placeholder in place,
        // keeping the arena slot; the instrument wins the tie-break.
        for (&id, record) in &feed.instrumentation_info {
            let spec = InstrumentSpec {
                primary_val_key: record.specifications.clone(),
                value_keys: record.value_keys.clone(),
                thresholds: record
                    .thresholds
                    .iter()
                    .map(|t| Threshold {
                        name: t.name.clone(),
                        key: t.key.clone(),
                        kind: t.threshold_type.clone(),
                        value: t.value,
                    })
                    .collect(),
            };
            let node = Node::new(
                id,
                record.tag.clone(),
                record.node_type.clone(),
                NodeKind::Instrument(spec),
            )?;
            let inst_idx = Self::upsert(&mut graph, &mut id_index, node);

            // The only mechanism producing instrument -> asset edges.
            for asset in &record.assets {
                let node = Node::new(
                    asset.id,
                    asset.serial.clone(),
                    asset.prod_code.clone(),
                    NodeKind::Asset(AssetSpec {
                        prod_name: asset.product_name.clone(),
                    }),
                )?;
                let asset_idx = Self::upsert(&mut graph, &mut id_index, node);
                graph.add_edge(inst_idx, asset_idx, Link::Owns);
            }
        }

        // Pass 3: link declared parent/child edges. Dangling parents (and
        // -1, the root does not exist yet) are skipped without error;
        // self-references are dropped.
        for (&id, record) in &feed.node_info {
            let child = id_index[&id];
            if let Some(&parent) = id_index.get(&record.parent_id) {
                if parent != child {
                    graph.add_edge(parent, child, Link::Owns);
                }
            }
        }

        // Pass 4: cross-attach instruments. An instrument listed by more
        // than one node legitimately gains multiple parents; this layer is
        // the one place the structure is a DAG rather than a tree.
        for (&id, record) in &feed.node_info {
            let owner = id_index[&id];
            for inst_id in &record.instrumentations {
                if let Some(&inst) = id_index.get(inst_id) {
                    if inst != owner {
                        graph.add_edge(owner, inst, Link::Attaches);
                    }
                }
            }
        }

        // Pass 5: synthesize the root and adopt every location. Going
        // through upsert keeps last-write-wins for a malformed feed entry
        // claiming the reserved id.
        let root = Self::upsert(
            &mut graph,
            &mut id_index,
            Node::new(
                ROOT_ID,
                "NW Root".to_string(),
                ROOT_TYPE.to_string(),
                NodeKind::Generic,
            )?,
        );

        let locations: Vec<NodeIndex> = graph
            .node_indices()
            .filter(|&idx| idx != root && graph[idx].node_type == LOCATION_TYPE)
            .collect();
        for idx in locations {
            graph.add_edge(root, idx, Link::Owns);
        }

        let mut hierarchy = Hierarchy {
            graph,
            root,
            id_index,
            locations: Vec::new(),
            applications: Vec::new(),
            modules: Vec::new(),
            instrumentations: Vec::new(),
            assets: Vec::new(),
        };
        hierarchy.categorize();

        log::info!(
            "Built hierarchy: {} nodes, {} edges ({} locations, {} applications, {} modules, {} instrumentations, {} assets)",
            hierarchy.node_count(),
            hierarchy.edge_count(),
            hierarchy.locations.len(),
            hierarchy.applications.len(),
            hierarchy.modules.len(),
            hierarchy.instrumentations.len(),
            hierarchy.assets.len(),
        );

        Ok(hierarchy)
    }

    /// Insert a node, or replace the weight when the id is already taken
    /// (last-write-wins, existing edges stay on the arena slot).
    fn upsert(
        graph: &mut DiGraph<Node, Link>,
        id_index: &mut HashMap<i64, NodeIndex>,
        node: Node,
    ) -> NodeIndex {
        match id_index.get(&node.id) {
            Some(&idx) => {
                if let Some(weight) = graph.node_weight_mut(idx) {
                    *weight = node;
                }
                idx
            }
            None => {
                let id = node.id;
                let idx = graph.add_node(node);
                id_index.insert(id, idx);
                idx
            }
        }
    }
}

impl Default for HierarchyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl Hierarchy {
    /// Preorder traversal from the root, partitioning every visit into the
    /// five category lists. A node reachable through several attachment
    /// edges is visited once per incoming path and listed once per visit;
    /// displayed totals inherit that duplication deliberately. A node that
    /// is its own ancestor (a cyclic parent chain or an attachment pointing
    /// back up) is skipped, so traversal always terminates.
    fn categorize(&mut self) {
        let mut stack = vec![(self.root, 0usize)];
        let mut path: Vec<NodeIndex> = Vec::new();
        while let Some((idx, depth)) = stack.pop() {
            path.truncate(depth);
            if path.contains(&idx) {
                continue;
            }
            if idx != self.root {
                if let Some(category) = self.graph[idx].category() {
                    use crate::types::Category::*;
                    match category {
                        Location => self.locations.push(idx),
                        Application => self.applications.push(idx),
                        Module => self.modules.push(idx),
                        Instrumentation => self.instrumentations.push(idx),
                        Asset => self.assets.push(idx),
                    }
                }
            }
            path.push(idx);
            let mut children = self.child_indices(idx);
            children.reverse();
            for child in children {
                stack.push((child, depth + 1));
            }
        }
    }
}
