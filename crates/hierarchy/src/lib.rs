//! # NW Hierarchy
//!
//! Typed equipment-hierarchy model and query engine for the Netilion Water
//! monitoring domain.
//!
//! ## Features
//!
//! - **Hierarchy building** - link flat feed records into one rooted structure
//! - **Category indexing** - locations, applications, modules, instruments, assets
//! - **Fast lookup** - O(1) id lookup plus name/type/substring search
//! - **Statistics & rendering** - counts, histograms, deterministic tree dumps
//!
//! ## Architecture
//!
//! ```text
//! HierarchyFeed (node_info + instrumentation_info)
//!     │
//!     ├──> Hierarchy Builder (five linking passes)
//!     │      ├─ Instantiate plain nodes
//!     │      ├─ Instantiate instruments and their assets
//!     │      ├─ Link declared parent/child edges
//!     │      ├─ Cross-attach instruments to modules
//!     │      └─ Synthesize the NW_root node
//!     │
//!     ├──> Hierarchy (petgraph arena)
//!     │      ├─ Nodes: locations, applications, modules, instruments, assets
//!     │      ├─ Edges: ownership (Owns) and instrument attachment (Attaches)
//!     │      └─ Indices: id -> node, five category lists
//!     │
//!     └──> Query surface
//!            ├─ Child navigation, id/name/type lookup, substring search
//!            ├─ Instrument filters (value key, type, thresholds)
//!            └─ Statistics and pretty-print renderers
//! ```

mod builder;
mod error;
mod feed;
mod query;
mod render;
mod stats;
mod types;

pub use builder::HierarchyBuilder;
pub use error::{HierarchyError, Result};
pub use feed::{AssetRecord, HierarchyFeed, InstrumentationRecord, NodeRecord, ThresholdRecord};
pub use query::SearchMatches;
pub use stats::{DetailedStatistics, NodeCounts};
pub use types::{
    AssetSpec, Category, Hierarchy, InstrumentSpec, Link, Node, NodeKind, Threshold,
    APPLICATION_TYPES, LOCATION_TYPE, MODULE_TYPES, ROOT_ID, ROOT_TYPE,
};
