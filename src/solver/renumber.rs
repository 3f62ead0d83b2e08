//! Variable-universe compaction: active variables move to a dense inter
//! prefix and every structure holding inter indices is rewritten.
use {
    super::Solver,
    crate::{
        assign::{AssignIF, AssignReason},
        cdb::{ClauseDBIF, ClauseIF, ClauseRef, WatchIndexIF, Watcher},
        state::StateIF,
        types::*,
    },
};

impl Solver {
    fn var_is_retirable(&self, vi: VarId) -> bool {
        self.asg.assign(vi).is_some() || self.asg.var(vi).removed != Removed::None
    }

    /// the fraction of inter slots a renumbering would retire.
    pub(crate) fn calc_renumber_saving(&self) -> f64 {
        let n = self.asg.num_vars;
        if n == 0 {
            return 0.0;
        }
        let used = (0..n as VarId)
            .filter(|vi| !self.var_is_retirable(*vi))
            .count();
        1.0 - used as f64 / n as f64
    }

    /// Beware: cannot be called while the searcher is running.
    pub(crate) fn renumber_variables(&mut self, must_renumber: bool) -> MaybeInconsistent {
        if self.asg.num_vars == 0 {
            return Ok(());
        }
        if !must_renumber && self.calc_renumber_saving() < 0.2 {
            return Ok(());
        }
        self.clean_clauses()?;
        let n_slots = self.asg.num_slots();
        let mut old_to_new: Vec<VarId> = vec![0; n_slots];
        let mut at: VarId = 0;
        let mut useless: Vec<VarId> = Vec::new();
        for vi in 0..self.asg.num_vars as VarId {
            if self.var_is_retirable(vi) {
                useless.push(vi);
                continue;
            }
            old_to_new[vi as usize] = at;
            at += 1;
        }
        let num_effective = at as usize;
        for vi in useless {
            old_to_new[vi as usize] = at;
            at += 1;
        }
        // identity continuation over the already-retired tail
        for vi in self.asg.num_vars..n_slots {
            old_to_new[vi] = vi as VarId;
        }
        debug_assert_eq!(at as usize, self.asg.num_vars);

        self.cdb.renumber(&old_to_new);
        self.asg.permute_slots(&old_to_new);
        self.cache.update_vars(&old_to_new);
        self.vmap.apply_renumber(&old_to_new, num_effective);
        for (inter, _) in self.assumptions.iter_mut() {
            *inter = inter.map_var(old_to_new[inter.vi() as usize]);
        }
        self.asg.handle(SolverEvent::Renumber(num_effective));
        self.test_renumbering();
        self.state.flush(format!("renumbered to {num_effective} vars"));
        // the order heap was dropped on purpose; it is rebuilt from the
        // surviving activities at the next search entry
        Ok(())
    }

    /// the active variables must occupy a dense prefix now.
    fn test_renumbering(&self) {
        let mut uninteresting = false;
        for vi in 0..self.asg.num_slots() as VarId {
            if self.var_is_retirable(vi) {
                uninteresting = true;
            } else {
                debug_assert!(
                    !uninteresting,
                    "renumbered the variables in the wrong order at {vi}"
                );
                debug_assert!((vi as usize) < self.asg.num_vars);
            }
        }
        debug_assert!(self
            .vmap
            .num_inter()
            .eq(&self.asg.num_vars));
    }

    /// Unit-propagate to a fixpoint, drop satisfied clauses and strip
    /// falsified literals, so that no clause mentions a retired slot.
    pub(crate) fn clean_clauses(&mut self) -> MaybeInconsistent {
        debug_assert_eq!(self.asg.decision_level(), 0);
        if self.asg.propagate(&mut self.cdb).is_err() {
            self.cdb.certificate_empty();
            return Err(SolverError::Inconsistent);
        }
        // level-0 reasons are not needed again; detach them so satisfied
        // reason clauses can go
        for i in 0..self.asg.stack_len() {
            let vi = self.asg.stack(i).vi();
            self.asg.var_mut(vi).reason = AssignReason::Asserted;
        }
        let targets: Vec<ClauseRef> = self
            .cdb
            .long_irred
            .iter()
            .chain(self.cdb.long_red.iter().flatten())
            .copied()
            .collect();
        for cr in targets {
            if self.cdb[cr].is_dead() {
                continue;
            }
            let lits: Vec<Lit> = self.cdb[cr].iter().copied().collect();
            if lits.iter().any(|l| self.asg.assigned(*l) == Some(true)) {
                self.cdb.certificate_delete(&self.vmap, &lits);
                self.cdb.remove_clause(cr);
                continue;
            }
            let cleaned: Vec<Lit> = lits
                .iter()
                .copied()
                .filter(|l| self.asg.assigned(*l).is_none())
                .collect();
            if cleaned.len() == lits.len() {
                continue;
            }
            debug_assert!(1 < cleaned.len());
            let red = self.cdb[cr].is_redundant();
            self.cdb.certificate_add(&self.vmap, &cleaned);
            self.cdb.certificate_delete(&self.vmap, &lits);
            self.cdb.remove_clause(cr);
            if cleaned.len() == 2 {
                if !self.cdb.has_bin(cleaned[0], cleaned[1]) {
                    self.cdb.attach_bin(cleaned[0], cleaned[1], red);
                }
            } else {
                let glue = self.cdb[cr].glue.min(cleaned.len() as u32);
                let born = self.cdb[cr].born;
                self.cdb.new_clause(cleaned, red, glue, born);
            }
        }
        // binary clauses: at a fixpoint one assigned side means the
        // clause is satisfied
        for i in 0..2 * self.asg.num_vars {
            let l = Lit::from(i);
            if self.asg.assigned(l) != Some(true) {
                continue;
            }
            let gone: Vec<(Lit, bool)> = self
                .cdb
                .watch_list(l)
                .iter()
                .filter_map(|w| match w {
                    Watcher::Binary { other, red } => Some((*other, *red)),
                    _ => None,
                })
                .collect();
            for (other, red) in gone {
                self.cdb.certificate_delete(&self.vmap, &[l, other]);
                self.cdb.detach_bin(l, other, red);
            }
        }
        self.cdb.garbage_collect();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        assign::AssignIF,
        cdb::{ClauseIF, WatchIndexIF, Watcher},
        solver::{SatSolverIF, Solver},
        types::*,
    };

    #[test]
    fn test_renumber_compacts_eliminated_vars() {
        let mut s = Solver::default();
        s.new_vars(100);
        // clauses over the high vars keep them active
        for v in (30..100).step_by(2) {
            let a = Lit::pos(s.vmap.map_outside_to_outer(v));
            let b = Lit::neg(s.vmap.map_outside_to_outer(v + 1));
            s.add_clause_outer(vec![a, b], false).expect("ok");
        }
        for vi in 0..30u32 {
            s.asg.var_mut(vi).removed = Removed::Eliminated;
        }
        s.renumber_variables(true).expect("consistent");
        assert_eq!(s.asg.num_vars, 70);
        for outer in 0..100u32 {
            let inter = s.vmap.map_outer_to_inter(outer);
            if s.asg.var(inter).removed == Removed::None {
                assert!((inter as usize) < 70);
            } else {
                assert!(70 <= inter as usize);
            }
        }
        // every watch entry mentions an active slot only
        for i in 0..2 * s.asg.num_slots() {
            for w in s.cdb.watch_list(Lit::from(i)).iter() {
                if let Watcher::Binary { other, .. } = w {
                    assert!(other.vi() < 70);
                }
            }
        }
    }

    #[test]
    fn test_renumber_is_idempotent() {
        let mut s = Solver::default();
        s.new_vars(10);
        s.add_clause(&[Lit::from(5i32), Lit::from(6i32), Lit::from(7i32)], false)
            .expect("ok");
        for vi in 0..3u32 {
            s.asg.var_mut(vi).removed = Removed::Replaced;
        }
        s.renumber_variables(true).expect("consistent");
        let map_once: Vec<u32> = (0..10)
            .map(|o| s.vmap.map_outer_to_inter(o))
            .collect();
        let n_once = s.asg.num_vars;
        s.renumber_variables(true).expect("consistent");
        let map_twice: Vec<u32> = (0..10)
            .map(|o| s.vmap.map_outer_to_inter(o))
            .collect();
        assert_eq!(map_once, map_twice);
        assert_eq!(n_once, s.asg.num_vars);
    }
}
