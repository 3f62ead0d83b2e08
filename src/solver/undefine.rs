//! Model minimization: unset variables whose value no clause needs.
use {
    super::Solver,
    crate::{
        assign::AssignIF,
        cdb::{ClauseIF, WatchIndexIF, Watcher},
        types::*,
    },
};

struct FindUndef {
    /// 1: on the trail; 2: also declared independent. A candidate needs
    /// the full count when an independent set was given.
    can_be_unset: Vec<u8>,
    can_be_unset_sum: usize,
    satisfies: Vec<usize>,
    dont_look_at_clause: Vec<bool>,
    must_fix: bool,
}

impl Solver {
    /// Unset every variable the model does not need, greedily keeping
    /// the ones that satisfy the most still-open clauses. Returns the
    /// number of unset variables.
    pub(crate) fn undefine(&mut self, trail_lim_vars: &[VarId]) -> usize {
        let n_slots = self.asg.num_slots();
        let mut undef = FindUndef {
            can_be_unset: vec![0; n_slots],
            can_be_unset_sum: 0,
            satisfies: vec![0; n_slots],
            dont_look_at_clause: vec![false; self.cdb.long_irred.len()],
            must_fix: false,
        };
        self.fill_potentials(trail_lim_vars, &mut undef);
        while self.check_must_fix(&mut undef) && 0 < undef.can_be_unset_sum {
            // fix the candidate that satisfies the most open clauses
            let mut maximum = 0;
            let mut v: Option<VarId> = None;
            for (i, can) in undef.can_be_unset.iter().enumerate() {
                if 0 < *can && maximum <= undef.satisfies[i] {
                    maximum = undef.satisfies[i];
                    v = Some(i as VarId);
                }
            }
            let v = v.expect("a demanded fix with no candidate left");
            undef.can_be_unset[v as usize] = 0;
            undef.can_be_unset_sum -= 1;
            for s in undef.satisfies.iter_mut() {
                *s = 0;
            }
        }
        // everything that was not fixed is now unset
        let mut unset = 0;
        for (i, can) in undef.can_be_unset.iter().enumerate() {
            if 0 < *can {
                unset += 1;
                let outer = self.vmap.map_inter_to_outer(i as VarId);
                self.full_model[outer as usize] = None;
                if let Some(outside) = self.vmap.map_outer_to_outside(outer) {
                    self.model[outside as usize] = None;
                }
            }
        }
        unset
    }

    fn model_value(&self, l: Lit) -> Lbool {
        let o = self.vmap.map_inter_lit_to_outer(l);
        self.full_model[o.vi() as usize].map(|b| b != o.sign())
    }

    fn fill_potentials(&self, trail_lim_vars: &[VarId], undef: &mut FindUndef) {
        let independent = self.conf.independent_vars.is_some();
        for vi in trail_lim_vars.iter().rev() {
            debug_assert_eq!(self.asg.var(*vi).removed, Removed::None);
            let is_assumed = self.assumptions.iter().any(|(i, _)| i.vi() == *vi);
            if self.full_model[self.vmap.map_inter_to_outer(*vi) as usize].is_some()
                && !is_assumed
            {
                undef.can_be_unset[*vi as usize] += 1;
                if !independent {
                    undef.can_be_unset_sum += 1;
                }
            }
        }
        if let Some(vars) = self.conf.independent_vars.as_ref() {
            for v in vars.iter() {
                if self.vmap.num_outside() <= *v as usize {
                    continue;
                }
                let outer = self.vmap.map_outside_to_outer(*v);
                let inter = self.vmap.map_outer_to_inter(outer);
                if (inter as usize) < self.asg.num_vars {
                    undef.can_be_unset[inter as usize] += 1;
                    if undef.can_be_unset[inter as usize] == 2 {
                        undef.can_be_unset_sum += 1;
                    }
                }
            }
            // only variables on the trail *and* in the independent set
            for can in undef.can_be_unset.iter_mut() {
                if *can < 2 {
                    *can = 0;
                }
            }
        }
        // variables standing in for an equivalence class stay fixed
        for outer in self.replacer.get_vars_replacing_others() {
            let inter = self.vmap.map_outer_to_inter(outer);
            if 0 < undef.can_be_unset[inter as usize] {
                undef.can_be_unset[inter as usize] = 0;
                undef.can_be_unset_sum -= 1;
            }
        }
        // dropped tautologies pinned these variables
        for (outer, must) in self.undef_must_set.iter().enumerate() {
            if *must {
                let inter = self.vmap.map_outer_to_inter(outer as VarId);
                if 0 < undef.can_be_unset[inter as usize] {
                    undef.can_be_unset[inter as usize] = 0;
                    undef.can_be_unset_sum -= 1;
                }
            }
        }
    }

    /// `true` when a clause with two or more candidate satisfiers turned
    /// up, i.e. a greedy fix is still required.
    fn check_must_fix(&self, undef: &mut FindUndef) -> bool {
        undef.must_fix = false;
        for i in 0..self.cdb.long_irred.len() {
            if undef.dont_look_at_clause[i] {
                continue;
            }
            let cr = self.cdb.long_irred[i];
            if self.cdb[cr].is_dead() {
                undef.dont_look_at_clause[i] = true;
                continue;
            }
            let lits: Vec<Lit> = self.cdb[cr].iter().copied().collect();
            if self.look_at_one_clause(&lits, undef) {
                undef.dont_look_at_clause[i] = true;
            }
        }
        for i in 0..2 * self.asg.num_vars {
            let l = Lit::from(i);
            if undef.can_be_unset[l.vi() as usize] == 0 && self.model_value(l) == Some(true) {
                continue;
            }
            for w in self.cdb.watch_list(l).iter() {
                if let Watcher::Binary { other, .. } = w {
                    if l < *other {
                        self.look_at_one_clause(&[l, *other], undef);
                    }
                }
            }
        }
        undef.must_fix
    }

    /// Returns `true` when the clause is satisfied for good.
    fn look_at_one_clause(&self, lits: &[Lit], undef: &mut FindUndef) -> bool {
        let mut num_true = 0;
        let mut v: Option<VarId> = None;
        for l in lits.iter() {
            if self.model_value(*l) == Some(true) {
                if 0 < undef.can_be_unset[l.vi() as usize] {
                    num_true += 1;
                    v = Some(l.vi());
                } else {
                    // satisfied by a variable that stays fixed
                    return true;
                }
            }
        }
        if num_true == 1 {
            let v = v.expect("counted a satisfier without keeping it");
            undef.can_be_unset[v as usize] = 0;
            undef.can_be_unset_sum -= 1;
            return true;
        }
        debug_assert!(1 < num_true, "the model leaves a clause unsatisfied");
        undef.must_fix = true;
        for l in lits.iter() {
            if self.model_value(*l) == Some(true) {
                undef.satisfies[l.vi() as usize] += 1;
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        solver::{Certificate, SatSolverIF, Solver},
        types::*,
    };

    #[test]
    fn test_minimization_with_independent_set() {
        let mut s = Solver::default();
        s.conf.greedy_undef = true;
        s.conf.independent_vars = Some(vec![0, 1]);
        s.conf.do_simplify_problem = false;
        s.new_vars(2);
        s.add_clause(&[Lit::from(1i32), Lit::from(2i32)], false)
            .expect("ok");
        s.add_clause(&[Lit::from(1i32), Lit::from(-2i32)], false)
            .expect("ok");
        let res = s.solve().expect("no error");
        assert!(matches!(res, Certificate::SAT(_)));
        let model = s.get_model();
        // x1 alone satisfies both clauses; x2 may be blanked
        assert_eq!(model[0], Some(true));
        assert_eq!(model[1], None);
    }
}
