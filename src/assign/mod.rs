//! Trail, variable metadata and unit propagation.

/// decision-variable heap
mod heap;
/// watch-based unit propagation
mod propagate;
/// variable metadata
mod var;

pub use self::var::{AssignReason, Var};

use {
    self::heap::VarIdHeap,
    crate::{cdb::ClauseDB, cdb::ClauseIF, types::*},
    std::{fmt, ops::Range, slice::Iter},
};

/// API for assignment-level operations.
pub trait AssignIF: Instantiate {
    /// the value of a literal.
    fn assigned(&self, l: Lit) -> Lbool;
    /// the value of a variable.
    fn assign(&self, vi: VarId) -> Lbool;
    /// the decision level of an assigned variable.
    fn level(&self, vi: VarId) -> DecisionLevel;
    /// the reason of an assigned variable.
    fn reason(&self, vi: VarId) -> AssignReason;
    /// the current decision level.
    fn decision_level(&self) -> DecisionLevel;
    /// the trail length.
    fn stack_len(&self) -> usize;
    /// the trail entry at `i`.
    fn stack(&self, i: usize) -> Lit;
    fn stack_iter(&self) -> Iter<'_, Lit>;
    fn stack_range(&self, r: Range<usize>) -> &[Lit];
    /// the trail index where level `lv + 1` began.
    fn len_upto(&self, lv: DecisionLevel) -> usize;
    /// true while propagation has work left.
    fn remains(&self) -> bool;
    /// enqueue a literal at decision level 0.
    fn assign_at_root_level(&mut self, l: Lit) -> MaybeInconsistent;
    /// backtrack to `lv`, unassigning everything above it.
    fn cancel_until(&mut self, lv: DecisionLevel);
}

/// A record of assignments, called 'trail' in the MiniSat lineage.
#[derive(Clone, Debug, Default)]
pub struct AssignStack {
    var: Vec<Var>,
    trail: Vec<Lit>,
    trail_lim: Vec<usize>,
    q_head: usize,
    pub root_level: DecisionLevel,
    var_order: VarIdHeap,

    /// the number of searchable variables; the active inter prefix.
    pub num_vars: usize,

    //
    //## var rewarding
    //
    activity_inc: f64,
    activity_decay: f64,

    //
    //## statistics
    //
    pub num_conflict: usize,
    pub num_propagation: usize,
    pub num_decision: usize,
    pub num_restart: usize,
}

impl fmt::Display for AssignStack {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "AssignStack({} vars, {} assigned, level {})",
            self.num_vars,
            self.trail.len(),
            self.decision_level()
        )
    }
}

impl Instantiate for AssignStack {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> AssignStack {
        let nv = cnf.num_of_variables;
        AssignStack {
            var: vec![Var::default(); nv],
            trail: Vec::with_capacity(nv),
            var_order: VarIdHeap::new(nv),
            num_vars: nv,
            activity_inc: 1.0,
            activity_decay: config.var_decay,
            ..AssignStack::default()
        }
    }
    fn handle(&mut self, e: SolverEvent) {
        match e {
            SolverEvent::NewVar => {
                self.var.push(Var::default());
                self.var_order.expand();
                self.num_vars += 1;
            }
            SolverEvent::Renumber(n) => {
                self.num_vars = n;
                self.var_order.clear();
            }
            SolverEvent::Reinitialize => {
                self.cancel_until(0);
            }
            SolverEvent::Eliminate(_) => (),
        }
    }
}

impl AssignIF for AssignStack {
    #[inline]
    fn assigned(&self, l: Lit) -> Lbool {
        self.var[l.vi() as usize]
            .assign
            .map(|b| b != l.sign())
    }
    #[inline]
    fn assign(&self, vi: VarId) -> Lbool {
        self.var[vi as usize].assign
    }
    #[inline]
    fn level(&self, vi: VarId) -> DecisionLevel {
        self.var[vi as usize].level
    }
    #[inline]
    fn reason(&self, vi: VarId) -> AssignReason {
        self.var[vi as usize].reason
    }
    #[inline]
    fn decision_level(&self) -> DecisionLevel {
        self.trail_lim.len() as DecisionLevel
    }
    #[inline]
    fn stack_len(&self) -> usize {
        self.trail.len()
    }
    #[inline]
    fn stack(&self, i: usize) -> Lit {
        self.trail[i]
    }
    fn stack_iter(&self) -> Iter<'_, Lit> {
        self.trail.iter()
    }
    fn stack_range(&self, r: Range<usize>) -> &[Lit] {
        &self.trail[r]
    }
    fn len_upto(&self, lv: DecisionLevel) -> usize {
        self.trail_lim.get(lv as usize).map_or(self.trail.len(), |n| *n)
    }
    #[inline]
    fn remains(&self) -> bool {
        self.q_head < self.trail.len()
    }
    fn assign_at_root_level(&mut self, l: Lit) -> MaybeInconsistent {
        debug_assert_eq!(self.decision_level(), 0);
        match self.assigned(l) {
            Some(true) => Ok(()),
            Some(false) => Err(SolverError::Inconsistent),
            None => {
                self.enqueue(l, AssignReason::Asserted);
                Ok(())
            }
        }
    }
    fn cancel_until(&mut self, lv: DecisionLevel) {
        if self.trail_lim.len() as DecisionLevel <= lv {
            return;
        }
        let lim = self.trail_lim[lv as usize];
        for i in (lim..self.trail.len()).rev() {
            let vi = self.trail[i].vi();
            let removed = {
                let v = &mut self.var[vi as usize];
                v.set_phase(v.assign == Some(true));
                v.assign = None;
                v.reason = AssignReason::None;
                v.level = 0;
                v.removed
            };
            if removed == Removed::None && !self.var_order.contains(vi) {
                self.var_order.insert(&self.var, vi);
            }
        }
        self.trail.truncate(lim);
        self.trail_lim.truncate(lv as usize);
        self.q_head = self.trail.len();
    }
}

impl AssignStack {
    #[inline]
    pub fn var(&self, vi: VarId) -> &Var {
        &self.var[vi as usize]
    }
    #[inline]
    pub fn var_mut(&mut self, vi: VarId) -> &mut Var {
        &mut self.var[vi as usize]
    }
    pub fn var_iter(&self) -> Iter<'_, Var> {
        self.var.iter()
    }
    /// the number of inter slots, active or not.
    pub fn num_slots(&self) -> usize {
        self.var.len()
    }
    /// the number of level-0 assignments.
    pub fn num_asserted(&self) -> usize {
        self.len_upto(0)
    }
    /// a full copy of the inter assignment over every slot.
    pub fn assign_ref(&self) -> Vec<Lbool> {
        self.var.iter().map(|v| v.assign).collect()
    }

    /// the low-level enqueue; sets value, level and reason.
    pub fn enqueue(&mut self, l: Lit, reason: AssignReason) {
        let lv = self.decision_level();
        let v = &mut self.var[l.vi() as usize];
        debug_assert!(v.assign.is_none());
        debug_assert!(v.removed == Removed::None);
        v.assign = Some(!l.sign());
        v.level = lv;
        v.reason = reason;
        self.trail.push(l);
    }
    pub fn assign_by_decision(&mut self, l: Lit) {
        self.trail_lim.push(self.trail.len());
        self.enqueue(l, AssignReason::Decision);
        self.num_decision += 1;
    }
    /// open a decision level without assigning; used when an assumption
    /// is already satisfied.
    pub fn push_dummy_level(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    /// true iff the clause is the reason of its first literal's assignment.
    pub fn locked(&self, cdb: &ClauseDB, cr: ClauseRef) -> bool {
        let c = &cdb[cr];
        if c.is_dead() || c.is_empty() {
            return false;
        }
        let l0 = c.lit0();
        self.assigned(l0) == Some(true) && self.reason(l0.vi()) == AssignReason::Long(cr)
    }

    //
    //## var rewarding (exponential VSIDS)
    //
    pub fn update_activity_decay(&mut self, decay: f64) {
        self.activity_decay = decay;
    }
    pub fn reward_at_analysis(&mut self, vi: VarId) {
        let v = &mut self.var[vi as usize];
        v.activity += self.activity_inc;
        let act = v.activity;
        self.var_order.update(&self.var, vi);
        if 1e100 < act {
            self.rescale_activity();
        }
    }
    pub fn decay_activity(&mut self) {
        self.activity_inc /= self.activity_decay;
    }
    fn rescale_activity(&mut self) {
        for v in self.var.iter_mut() {
            v.activity *= 1e-100;
        }
        self.activity_inc *= 1e-100;
    }

    //
    //## decision heuristics
    //
    /// refill the heap with every active unassigned variable.
    pub fn rebuild_order(&mut self) {
        self.var_order.clear();
        for vi in 0..self.num_vars as VarId {
            let v = &self.var[vi as usize];
            if v.assign.is_none() && v.removed == Removed::None {
                self.var_order.insert(&self.var, vi);
            }
        }
    }
    /// drop the heap; it is rebuilt at the next search entry.
    pub fn clear_order(&mut self) {
        self.var_order.clear();
    }
    /// pick the unassigned active variable with the best activity.
    pub fn select_decision_var(&mut self) -> Option<VarId> {
        while let Some(vi) = self.var_order.pop(&self.var) {
            let v = &self.var[vi as usize];
            if v.assign.is_none() && v.removed == Removed::None && (vi as usize) < self.num_vars {
                return Some(vi);
            }
        }
        None
    }

    /// exchange two inter slots and fix the trail accordingly; both slots
    /// must be free of watch or clause references.
    pub fn swap_inter_slots(&mut self, i: VarId, j: VarId) {
        if i == j {
            return;
        }
        self.var.swap(i as usize, j as usize);
        for l in self.trail.iter_mut() {
            if l.vi() == i {
                *l = l.map_var(j);
            } else if l.vi() == j {
                *l = l.map_var(i);
            }
        }
        self.var_order.clear();
    }

    pub(crate) fn set_q_head(&mut self, n: usize) {
        self.q_head = n;
    }
    pub(crate) fn q_head(&self) -> usize {
        self.q_head
    }

    /// apply an old-inter to new-inter permutation over every slot; only
    /// callable at decision level 0 with propagation at a fixpoint.
    pub(crate) fn permute_slots(&mut self, old_to_new: &[VarId]) {
        debug_assert_eq!(self.decision_level(), 0);
        debug_assert!(!self.remains());
        let mut fresh: Vec<Var> = vec![Var::default(); self.var.len()];
        for (old, v) in self.var.drain(..).enumerate() {
            fresh[old_to_new[old] as usize] = v;
        }
        for v in fresh.iter_mut() {
            if let AssignReason::Binary(l) = v.reason {
                v.reason = AssignReason::Binary(l.map_var(old_to_new[l.vi() as usize]));
            }
        }
        self.var = fresh;
        for l in self.trail.iter_mut() {
            *l = l.map_var(old_to_new[l.vi() as usize]);
        }
        self.var_order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asg(n: usize) -> AssignStack {
        let cnf = CNFDescription {
            num_of_variables: n,
            ..CNFDescription::default()
        };
        AssignStack::instantiate(&Config::default(), &cnf)
    }

    #[test]
    fn test_enqueue_and_cancel() {
        let mut a = asg(4);
        a.assign_at_root_level(Lit::from(1i32)).expect("ok");
        assert_eq!(a.assigned(Lit::from(1i32)), Some(true));
        assert_eq!(a.assigned(Lit::from(-1i32)), Some(false));
        a.assign_by_decision(Lit::from(-2i32));
        assert_eq!(a.decision_level(), 1);
        assert_eq!(a.level(1), 1);
        a.cancel_until(0);
        assert_eq!(a.assign(1), None);
        assert_eq!(a.assign(0), Some(true));
        assert_eq!(a.stack_len(), 1);
    }

    #[test]
    fn test_root_level_conflict() {
        let mut a = asg(2);
        a.assign_at_root_level(Lit::from(1i32)).expect("ok");
        assert_eq!(
            a.assign_at_root_level(Lit::from(-1i32)),
            Err(SolverError::Inconsistent)
        );
        assert_eq!(a.assign_at_root_level(Lit::from(1i32)), Ok(()));
    }

    #[test]
    fn test_phase_saving() {
        let mut a = asg(2);
        a.assign_by_decision(Lit::from(1i32));
        a.cancel_until(0);
        assert!(a.var(0).phase());
        a.assign_by_decision(Lit::from(-1i32));
        a.cancel_until(0);
        assert!(!a.var(0).phase());
    }
}
