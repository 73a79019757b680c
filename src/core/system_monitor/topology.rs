//! Efficiency/performance core classification.
//!
//! The split is a lookup keyed on the active core count. It is a heuristic:
//! hardware outside the table is approximated with an even split and may be
//! misclassified.

use serde::{Deserialize, Serialize};

/// One logical core and its class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreDescriptor {
    pub id: usize,
    pub is_efficiency_core: bool,
}

/// Result of classifying the active cores, computed once at startup
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreTopology {
    pub cores: Vec<CoreDescriptor>,
}

/// (efficiency, performance) counts for a given active core count
pub fn core_split(active_cores: usize) -> (usize, usize) {
    match active_cores {
        8 => (4, 4),
        10 => (2, 8),
        12 => (2, 10),
        14 | 16 | 20 | 24 => (4, active_cores - 4),
        n => {
            // Odd remainder goes to performance so the counts always add up
            let efficiency = n / 2;
            (efficiency, n - efficiency)
        }
    }
}

impl CoreTopology {
    /// Efficiency cores take the lowest ids, performance cores the rest.
    pub fn classify(active_cores: usize) -> Self {
        let (efficiency, _) = core_split(active_cores);
        let cores = (0..active_cores)
            .map(|id| CoreDescriptor {
                id,
                is_efficiency_core: id < efficiency,
            })
            .collect();
        Self { cores }
    }

    pub fn len(&self) -> usize {
        self.cores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cores.is_empty()
    }

    pub fn efficiency_cores(&self) -> impl Iterator<Item = &CoreDescriptor> {
        self.cores.iter().filter(|c| c.is_efficiency_core)
    }

    pub fn performance_cores(&self) -> impl Iterator<Item = &CoreDescriptor> {
        self.cores.iter().filter(|c| !c.is_efficiency_core)
    }

    pub fn efficiency_count(&self) -> usize {
        self.efficiency_cores().count()
    }

    pub fn performance_count(&self) -> usize {
        self.performance_cores().count()
    }
}
