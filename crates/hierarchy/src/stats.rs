use crate::types::Hierarchy;
use serde::Serialize;
use std::collections::BTreeMap;

/// The five base category counts plus their sum.
///
/// Counts come from the category lists, so instruments reached through
/// several attachment edges count once per path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeCounts {
    pub locations: usize,
    pub applications: usize,
    pub modules: usize,
    pub instrumentations: usize,
    pub assets: usize,
    pub total: usize,
}

/// Base counts, per-type histograms and threshold coverage.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailedStatistics {
    pub locations: usize,
    pub applications: usize,
    pub modules: usize,
    pub instrumentations: usize,
    pub assets: usize,
    pub total: usize,

    pub instrument_types: BTreeMap<String, usize>,
    pub application_types: BTreeMap<String, usize>,
    pub module_types: BTreeMap<String, usize>,

    pub instruments_with_thresholds: usize,
    pub instruments_without_thresholds: usize,

    /// Percentage of instruments carrying at least one threshold;
    /// 0.0 when there are no instruments at all.
    pub threshold_coverage: f64,
}

impl Hierarchy {
    pub fn node_counts(&self) -> NodeCounts {
        let locations = self.locations.len();
        let applications = self.applications.len();
        let modules = self.modules.len();
        let instrumentations = self.instrumentations.len();
        let assets = self.assets.len();
        NodeCounts {
            locations,
            applications,
            modules,
            instrumentations,
            assets,
            total: locations + applications + modules + instrumentations + assets,
        }
    }

    pub fn detailed_statistics(&self) -> DetailedStatistics {
        let counts = self.node_counts();

        let histogram = |nodes: Vec<&crate::Node>| -> BTreeMap<String, usize> {
            let mut hist = BTreeMap::new();
            for node in nodes {
                *hist.entry(node.node_type.clone()).or_insert(0) += 1;
            }
            hist
        };

        let instruments = self.all_instrumentations();
        let with_thresholds = instruments
            .iter()
            .filter(|n| n.instrument().map_or(false, |s| !s.thresholds.is_empty()))
            .count();
        let without_thresholds = instruments.len() - with_thresholds;
        let threshold_coverage = if instruments.is_empty() {
            0.0
        } else {
            with_thresholds as f64 / instruments.len() as f64 * 100.0
        };

        DetailedStatistics {
            locations: counts.locations,
            applications: counts.applications,
            modules: counts.modules,
            instrumentations: counts.instrumentations,
            assets: counts.assets,
            total: counts.total,
            instrument_types: histogram(instruments),
            application_types: histogram(self.all_applications()),
            module_types: histogram(self.all_modules()),
            instruments_with_thresholds: with_thresholds,
            instruments_without_thresholds: without_thresholds,
            threshold_coverage,
        }
    }
}
