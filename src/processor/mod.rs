//! Simplification collaborators driven by the inprocess scheduler.
//!
//! * `eliminate` provides bounded variable elimination
//! * `subsume` provides clause subsumption and strengthening
//! * `replace` provides SCC-based equivalent-literal replacement
//! * `comp` provides component decomposition
//! * `probe` provides failed-literal and in-tree probing
//! * `distill` provides clause vivification
//! * `cache` provides the binary implication cache
//! * `gauss` provides the XOR matrix hook

/// binary implication cache
pub mod cache;
/// component decomposition
pub mod comp;
/// clause vivification
pub mod distill;
/// bounded variable elimination
pub mod eliminate;
/// XOR matrices
pub mod gauss;
/// probing
pub mod probe;
/// equivalence replacement
pub mod replace;
/// subsumption
pub mod subsume;

pub use self::{cache::ImplCache, comp::CompHandler, replace::VarReplacer};

use {
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::{ClauseDB, ClauseDBIF, ClauseIF, ClauseRef, WatchIndexIF, Watcher},
        state::State,
        types::*,
        vmap::VarMap,
    },
    std::ops::{Index, IndexMut},
};

/// API of the occurrence simplifier seen by the orchestrator.
pub trait EliminateIF: Instantiate {
    /// run the accumulated `occ-*` tokens as one invocation.
    fn simplify(
        &mut self,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        vmap: &VarMap,
        state: &mut State,
        conf: &Config,
        frozen: &[bool],
        tokens: &str,
    ) -> MaybeInconsistent;
    /// detach the reconstruction clauses of an eliminated outer variable;
    /// the caller re-ingests them and reactivates the variable.
    fn take_unelim_clauses(&mut self, outer: VarId) -> Vec<Vec<Lit>>;
    /// replay the reconstruction stack over an outer-indexed model.
    fn extend_model(&self, model: &mut [Lbool]);
    /// true after blocked-clause elimination changed the formula.
    fn anything_has_been_blocked(&self) -> bool;
}

/// Occurrence lists per literal; only irredundant long clauses register.
#[derive(Clone, Debug, Default)]
pub struct LitOccurs {
    pub refs: Vec<ClauseRef>,
}

/// Occurrence-based simplifier and owner of the elimination
/// reconstruction stack.
#[derive(Clone, Debug, Default)]
pub struct OccSimplifier {
    occur: Vec<LitOccurs>,
    /// reconstruction clauses in outer numbering, each ended by the
    /// literal the satisfaction falls back to.
    elim_stack: Vec<(Vec<Lit>, Lit)>,
    blocked: bool,
    pub num_elimed: usize,
    pub num_subsumed: usize,
    /// stop subsumption if the size of a clause is over this
    pub subsume_literal_limit: usize,
    /// max #clauses to try to eliminate a var
    pub eliminate_var_occurrence_limit: usize,
    /// stop elimination if the increase of clauses is over this
    pub eliminate_grow_limit: usize,
}

impl Index<Lit> for OccSimplifier {
    type Output = LitOccurs;
    #[inline]
    fn index(&self, l: Lit) -> &Self::Output {
        &self.occur[l.index()]
    }
}

impl IndexMut<Lit> for OccSimplifier {
    #[inline]
    fn index_mut(&mut self, l: Lit) -> &mut Self::Output {
        &mut self.occur[l.index()]
    }
}

impl Instantiate for OccSimplifier {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> Self {
        OccSimplifier {
            occur: vec![LitOccurs::default(); 2 * cnf.num_of_variables],
            subsume_literal_limit: config.elim_cls_lim,
            eliminate_var_occurrence_limit: config.elim_var_occ,
            eliminate_grow_limit: config.elim_grw_lim,
            ..OccSimplifier::default()
        }
    }
    fn handle(&mut self, e: SolverEvent) {
        if let SolverEvent::NewVar = e {
            self.occur.push(LitOccurs::default());
            self.occur.push(LitOccurs::default());
        }
    }
}

impl EliminateIF for OccSimplifier {
    fn simplify(
        &mut self,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        vmap: &VarMap,
        state: &mut State,
        conf: &Config,
        frozen: &[bool],
        tokens: &str,
    ) -> MaybeInconsistent {
        self.build_occur(cdb);
        let result = (|| {
            for token in tokens.split(',') {
                match token.trim() {
                    "occ-backw-sub-str" => {
                        subsume::backward_subsume(asg, cdb, vmap, self, state, conf)?;
                    }
                    "occ-bve" => {
                        eliminate::eliminate_vars(asg, cdb, vmap, self, state, frozen)?;
                    }
                    // the matrix finder runs from the scheduler after the flush
                    "occ-gauss" | "occ-xor" | "occ-clean-implicit" | "occ-bva" | "" => (),
                    // schedule items whose technique is not carried are skipped
                    _ => (),
                }
            }
            Ok(())
        })();
        self.clear_occur(cdb);
        cdb.garbage_collect();
        result
    }
    fn take_unelim_clauses(&mut self, outer: VarId) -> Vec<Vec<Lit>> {
        let mut out = Vec::new();
        let mut kept = Vec::with_capacity(self.elim_stack.len());
        for (lits, on) in self.elim_stack.drain(..) {
            if on.vi() == outer {
                // the polarity marker closing the variable's entries is
                // dropped, not re-added
                if !(lits.len() == 1 && lits[0] == on) {
                    out.push(lits);
                }
            } else {
                kept.push((lits, on));
            }
        }
        self.elim_stack = kept;
        self.num_elimed -= 1;
        out
    }
    fn extend_model(&self, model: &mut [Lbool]) {
        for (lits, on) in self.elim_stack.iter().rev() {
            let satisfied = lits.iter().any(|l| {
                model[l.vi() as usize].map_or(false, |b| b != l.sign())
            });
            if !satisfied {
                model[on.vi() as usize] = Some(!on.sign());
            }
        }
    }
    fn anything_has_been_blocked(&self) -> bool {
        self.blocked
    }
}

impl OccSimplifier {
    /// register every live irredundant long clause.
    pub fn build_occur(&mut self, cdb: &mut ClauseDB) {
        for o in self.occur.iter_mut() {
            o.refs.clear();
        }
        for i in 0..cdb.long_irred.len() {
            let cr = cdb.long_irred[i];
            if cdb[cr].is_dead() {
                continue;
            }
            self.link(cdb, cr);
        }
    }
    pub fn link(&mut self, cdb: &mut ClauseDB, cr: ClauseRef) {
        for l in cdb[cr].iter() {
            self.occur[l.index()].refs.push(cr);
        }
        cdb[cr].turn_on(FlagClause::OCCUR_LINKED);
    }
    pub fn unlink(&mut self, cdb: &mut ClauseDB, cr: ClauseRef) {
        if !cdb[cr].is(FlagClause::OCCUR_LINKED) {
            return;
        }
        for i in 0..cdb[cr].len() {
            let l = cdb[cr][i];
            self.occur[l.index()].refs.delete_unstable(|c| *c == cr);
        }
        cdb[cr].turn_off(FlagClause::OCCUR_LINKED);
    }
    fn clear_occur(&mut self, cdb: &mut ClauseDB) {
        for o in self.occur.iter_mut() {
            o.refs.clear();
        }
        for cr in cdb.arena.iter_refs().collect::<Vec<_>>() {
            cdb[cr].turn_off(FlagClause::OCCUR_LINKED);
        }
    }
    /// record a reconstruction clause; literals are outer-numbered and
    /// `on` is the one flipped when the clause ends up unsatisfied.
    pub fn push_reconstruction(&mut self, lits: Vec<Lit>, on: Lit) {
        debug_assert!(lits.contains(&on));
        self.elim_stack.push((lits, on));
    }
    pub(crate) fn save_stack(&self) -> &[(Vec<Lit>, Lit)] {
        &self.elim_stack
    }
    pub(crate) fn restore_stack(&mut self, stack: Vec<(Vec<Lit>, Lit)>) {
        self.num_elimed = stack
            .iter()
            .map(|(_, on)| on.vi())
            .collect::<std::collections::HashSet<_>>()
            .len();
        self.elim_stack = stack;
    }
}

/// Level-0 clause addition used by the simplifiers; the literal vector is
/// a *derived* clause, so a DRAT add record is always emitted.
pub(crate) fn add_simplified_clause(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    mut lits: Vec<Lit>,
    red: bool,
) -> Result<Option<ClauseRef>, SolverError> {
    debug_assert_eq!(asg.decision_level(), 0);
    lits.sort_unstable();
    let mut j = 0;
    let mut last = None;
    for i in 0..lits.len() {
        let li = lits[i];
        if asg.assigned(li) == Some(true) || last == Some(!li) {
            return Ok(None);
        }
        if asg.assigned(li) == Some(false) || last == Some(li) {
            continue;
        }
        lits[j] = li;
        j += 1;
        last = Some(li);
    }
    lits.truncate(j);
    match lits.len() {
        0 => {
            cdb.certificate_empty();
            Err(SolverError::Inconsistent)
        }
        1 => {
            cdb.certificate_assert(vmap, lits[0]);
            asg.assign_at_root_level(lits[0])?;
            if asg.propagate(cdb).is_err() {
                cdb.certificate_empty();
                return Err(SolverError::Inconsistent);
            }
            Ok(None)
        }
        2 => {
            if cdb.has_bin(lits[0], lits[1]) {
                return Ok(None);
            }
            cdb.certificate_add(vmap, &lits);
            cdb.attach_bin(lits[0], lits[1], red);
            Ok(None)
        }
        _ => {
            cdb.certificate_add(vmap, &lits);
            let cr = cdb.new_clause(lits, red, 0, asg.num_conflict);
            Ok(Some(cr))
        }
    }
}

/// Assert a derived unit at the root and propagate it; refutation emits
/// the empty clause.
pub(crate) fn assert_level0_unit(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    l: Lit,
) -> MaybeInconsistent {
    cdb.certificate_assert(vmap, l);
    if asg.assign_at_root_level(l).is_err() || asg.propagate(cdb).is_err() {
        cdb.certificate_empty();
        return Err(SolverError::Inconsistent);
    }
    Ok(())
}

/// Remove a long clause with its DRAT delete record and occurrence links.
pub(crate) fn remove_simplified_clause(
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    occ: &mut OccSimplifier,
    cr: ClauseRef,
) {
    occ.unlink(cdb, cr);
    let lits: Vec<Lit> = cdb[cr].iter().copied().collect();
    cdb.certificate_delete(vmap, &lits);
    cdb.remove_clause(cr);
}

/// The irredundant binary clauses of `l`, as (other-literal) payloads.
pub(crate) fn irred_bins_of(cdb: &ClauseDB, l: Lit) -> Vec<Lit> {
    cdb.watch_list(l)
        .iter()
        .filter_map(|w| match w {
            Watcher::Binary { other, red: false } => Some(*other),
            _ => None,
        })
        .collect()
}
