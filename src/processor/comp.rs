//! Component decomposition: detach a small independent component, solve
//! it with a fresh solver, and keep its model for reconstruction.
use {
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::{ClauseDB, ClauseDBIF, ClauseIF, ClauseRef, WatchIndexIF, Watcher},
        solver::{Certificate, SatSolverIF, Solver},
        state::{Stat, State},
        types::*,
        vmap::VarMap,
    },
    std::collections::HashMap,
};

/// Bookkeeping of decomposed components.
#[derive(Clone, Debug, Default)]
pub struct CompHandler {
    /// outer-indexed values solved independently.
    saved_state: Vec<Lbool>,
    /// the component clauses, in outer numbering, for re-adding.
    removed_clauses: Vec<Vec<Lit>>,
    pub num_removed_vars: usize,
}

impl Instantiate for CompHandler {
    fn instantiate(_conf: &Config, cnf: &CNFDescription) -> Self {
        CompHandler {
            saved_state: vec![None; cnf.num_of_variables],
            ..CompHandler::default()
        }
    }
    fn handle(&mut self, e: SolverEvent) {
        if let SolverEvent::NewVar = e {
            self.saved_state.push(None);
        }
    }
}

/// union-find parent lookup with path halving.
fn find(parent: &mut [VarId], mut v: VarId) -> VarId {
    while parent[v as usize] != v {
        parent[v as usize] = parent[parent[v as usize] as usize];
        v = parent[v as usize];
    }
    v
}

fn union(parent: &mut [VarId], a: VarId, b: VarId) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        parent[rb as usize] = ra;
    }
}

/// Partition the active variables by clause connectivity. Redundant
/// clauses never cross a component, so the irredundant set decides.
pub fn find_components(asg: &AssignStack, cdb: &ClauseDB) -> Vec<Vec<VarId>> {
    let n = asg.num_vars;
    let mut parent: Vec<VarId> = (0..n as VarId).collect();
    for cr in cdb.long_irred.iter() {
        if cdb[*cr].is_dead() {
            continue;
        }
        let mut anchor: Option<VarId> = None;
        for l in cdb[*cr].iter() {
            match anchor {
                None => anchor = Some(l.vi()),
                Some(a) => union(&mut parent, a, l.vi()),
            }
        }
    }
    for vi in 0..n as VarId {
        for w in cdb.watch_list(Lit::pos(vi)).iter() {
            if let Watcher::Binary { other, red: false } = w {
                union(&mut parent, vi, other.vi());
            }
        }
    }
    let mut comps: HashMap<VarId, Vec<VarId>> = HashMap::new();
    for vi in 0..n as VarId {
        let v = asg.var(vi);
        if v.assign.is_none() && v.removed == Removed::None {
            let root = find(&mut parent, vi);
            comps.entry(root).or_default().push(vi);
        }
    }
    let mut out: Vec<Vec<VarId>> = comps.into_values().collect();
    out.sort_by_key(|c| std::cmp::Reverse(c.len()));
    out
}

impl CompHandler {
    /// detach and solve every small non-principal component.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_components(
        &mut self,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        vmap: &VarMap,
        state: &mut State,
        conf: &Config,
        frozen: &[bool],
    ) -> MaybeInconsistent {
        let comps = find_components(asg, cdb);
        if comps.len() < 2 {
            return Ok(());
        }
        for comp in comps.iter().skip(1) {
            if conf.comp_size_limit < comp.len()
                || comp.iter().any(|vi| frozen[*vi as usize])
            {
                continue;
            }
            self.handle_one(asg, cdb, vmap, state, conf, comp)?;
        }
        cdb.garbage_collect();
        Ok(())
    }

    fn handle_one(
        &mut self,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        vmap: &VarMap,
        state: &mut State,
        conf: &Config,
        comp: &[VarId],
    ) -> MaybeInconsistent {
        let mut dense: HashMap<VarId, VarId> = HashMap::new();
        for (i, vi) in comp.iter().enumerate() {
            dense.insert(*vi, i as VarId);
        }
        let longs: Vec<ClauseRef> = cdb
            .long_irred
            .iter()
            .copied()
            .filter(|cr| {
                !cdb[*cr].is_dead() && cdb[*cr].iter().any(|l| dense.contains_key(&l.vi()))
            })
            .collect();
        let mut bins: Vec<(Lit, Lit)> = Vec::new();
        for vi in comp.iter() {
            for sign in [false, true].iter() {
                let l = Lit::from((*vi, *sign));
                for w in cdb.watch_list(l).iter() {
                    if let Watcher::Binary { other, red: false } = w {
                        if l < *other {
                            bins.push((l, *other));
                        }
                    }
                }
            }
        }
        // solve the component in isolation first; nothing is detached on
        // an unknown verdict
        let mut sub_conf = Config::default();
        sub_conf.quiet_mode = true;
        sub_conf.do_comp_handler = false;
        sub_conf.do_simplify_problem = false;
        sub_conf.use_certification = false;
        let sub_cnf = CNFDescription {
            num_of_variables: comp.len(),
            num_of_clauses: longs.len() + bins.len(),
            pathname: CNFIndicator::Void,
        };
        let mut sub = Solver::instantiate(&sub_conf, &sub_cnf);
        let to_sub = |l: Lit, dense: &HashMap<VarId, VarId>| l.map_var(dense[&l.vi()]);
        for cr in longs.iter() {
            let lits: Vec<Lit> = cdb[*cr].iter().map(|l| to_sub(*l, &dense)).collect();
            if !sub.add_clause(&lits, false)? {
                cdb.certificate_empty();
                return Err(SolverError::Inconsistent);
            }
        }
        for (a, b) in bins.iter() {
            if !sub.add_clause(&[to_sub(*a, &dense), to_sub(*b, &dense)], false)? {
                cdb.certificate_empty();
                return Err(SolverError::Inconsistent);
            }
        }
        match sub.solve()? {
            Certificate::UNSAT => {
                cdb.certificate_empty();
                Err(SolverError::Inconsistent)
            }
            Certificate::UNKNOWN => Ok(()),
            Certificate::SAT(_) => {
                let model = sub.get_model().to_vec();
                for cr in longs.iter() {
                    let outer: Vec<Lit> = cdb[*cr]
                        .iter()
                        .map(|l| vmap.map_inter_lit_to_outer(*l))
                        .collect();
                    cdb.certificate_delete(vmap, &self.inter_of(cdb, *cr));
                    self.removed_clauses.push(outer);
                    cdb.remove_clause(*cr);
                }
                for (a, b) in bins.iter() {
                    cdb.certificate_delete(vmap, &[*a, *b]);
                    self.removed_clauses.push(vec![
                        vmap.map_inter_lit_to_outer(*a),
                        vmap.map_inter_lit_to_outer(*b),
                    ]);
                    cdb.detach_bin(*a, *b, false);
                }
                self.purge_red_in_comp(asg, cdb, vmap, &dense);
                for vi in comp.iter() {
                    let outer = vmap.map_inter_to_outer(*vi);
                    self.saved_state[outer as usize] = model[dense[vi] as usize];
                    asg.var_mut(*vi).removed = Removed::Decomposed;
                    state[Stat::DecomposedVar] += 1;
                    self.num_removed_vars += 1;
                }
                Ok(())
            }
        }
    }

    fn inter_of(&self, cdb: &ClauseDB, cr: ClauseRef) -> Vec<Lit> {
        cdb[cr].iter().copied().collect()
    }

    fn purge_red_in_comp(
        &mut self,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        vmap: &VarMap,
        dense: &HashMap<VarId, VarId>,
    ) {
        for tier in 0..cdb.long_red.len() {
            for i in 0..cdb.long_red[tier].len() {
                let cr = cdb.long_red[tier][i];
                if cdb[cr].is_dead() || asg.locked(cdb, cr) {
                    continue;
                }
                if cdb[cr].iter().any(|l| dense.contains_key(&l.vi())) {
                    let lits: Vec<Lit> = cdb[cr].iter().copied().collect();
                    cdb.certificate_delete(vmap, &lits);
                    cdb.remove_clause(cr);
                }
            }
        }
        for vi in dense.keys() {
            for sign in [false, true].iter() {
                let l = Lit::from((*vi, *sign));
                let red_bins: Vec<Lit> = cdb
                    .watch_list(l)
                    .iter()
                    .filter_map(|w| match w {
                        Watcher::Binary { other, red: true } => Some(*other),
                        _ => None,
                    })
                    .collect();
                for other in red_bins {
                    cdb.certificate_delete(vmap, &[l, other]);
                    cdb.detach_bin(l, other, true);
                }
            }
        }
    }

    /// push the independently solved values into an outer-indexed model.
    pub fn add_saved_state(&self, model: &mut [Lbool]) {
        for (v, val) in self.saved_state.iter().enumerate() {
            if let Some(b) = val {
                model[v] = Some(*b);
            }
        }
    }
    /// hand the stored clauses back for re-ingestion and forget the
    /// components; the caller reactivates the variables.
    pub fn take_removed_clauses(&mut self) -> Vec<Vec<Lit>> {
        for v in self.saved_state.iter_mut() {
            *v = None;
        }
        self.num_removed_vars = 0;
        std::mem::take(&mut self.removed_clauses)
    }
    pub fn has_removed_clauses(&self) -> bool {
        !self.removed_clauses.is_empty()
    }
}
