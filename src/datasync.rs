//! Shared-clause gossip channel between cooperating solver instances.
//!
//! Newly derived binary clauses are published as outside-numbered DIMACS
//! pairs; a peer pulls everything it has not seen and re-ingests it
//! through the regular outer clause path.
use {
    crate::{types::*, vmap::VarMap},
    std::sync::{Arc, Mutex},
};

/// The channel storage, shared by every participating solver.
#[derive(Debug, Default)]
pub struct SharedData {
    bins: Mutex<Vec<(i32, i32)>>,
}

impl SharedData {
    pub fn new() -> Arc<SharedData> {
        Arc::new(SharedData::default())
    }
    pub fn len(&self) -> usize {
        self.bins.lock().map(|b| b.len()).unwrap_or(0)
    }
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Per-solver endpoint; remembers how far it has drained the channel.
#[derive(Debug, Default)]
pub struct DataSync {
    shared: Option<Arc<SharedData>>,
    pulled: usize,
}

impl DataSync {
    pub fn set_shared(&mut self, shared: Arc<SharedData>) {
        self.pulled = shared.len();
        self.shared = Some(shared);
    }
    pub fn is_connected(&self) -> bool {
        self.shared.is_some()
    }
    /// publish a binary clause given in inter numbering. Clauses over
    /// synthetic variables stay private.
    pub fn publish_bin(&mut self, vmap: &VarMap, l0: Lit, l1: Lit) {
        if let Some(shared) = self.shared.as_ref() {
            let o0 = vmap.map_inter_lit_to_outer(l0);
            let o1 = vmap.map_inter_lit_to_outer(l1);
            if vmap.is_bva(o0.vi()) || vmap.is_bva(o1.vi()) {
                return;
            }
            let p = (
                i32::from(o0.map_var(vmap.map_outer_to_outside(o0.vi()).unwrap())),
                i32::from(o1.map_var(vmap.map_outer_to_outside(o1.vi()).unwrap())),
            );
            if let Ok(mut bins) = shared.bins.lock() {
                bins.push(p);
                self.pulled = bins.len();
            }
        }
    }
    /// drain peer binaries published since the last pull.
    pub fn pull_bins(&mut self) -> Vec<(i32, i32)> {
        if let Some(shared) = self.shared.as_ref() {
            if let Ok(bins) = shared.bins.lock() {
                let fresh = bins[self.pulled.min(bins.len())..].to_vec();
                self.pulled = bins.len();
                return fresh;
            }
        }
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CNFDescription, Instantiate};

    #[test]
    fn test_publish_and_pull() {
        let shared = SharedData::new();
        let mut a = DataSync::default();
        let mut b = DataSync::default();
        a.set_shared(shared.clone());
        b.set_shared(shared.clone());
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..CNFDescription::default()
        };
        let vmap = VarMap::instantiate(&crate::config::Config::default(), &cnf);
        a.publish_bin(&vmap, Lit::from(1i32), Lit::from(-2i32));
        assert_eq!(b.pull_bins(), vec![(1, -2)]);
        assert!(b.pull_bins().is_empty());
        assert!(a.pull_bins().is_empty());
    }
}
