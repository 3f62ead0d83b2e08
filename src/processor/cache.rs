//! Binary implication cache and the try-both unit derivation.
use {
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::{ClauseDB, WatchIndexIF, Watcher},
        state::{Stat, State},
        types::*,
        vmap::VarMap,
    },
};

/// Per-literal lists of implied literals, harvested from the binary
/// clauses. Disabled wholesale when it outgrows its memory budget.
#[derive(Clone, Debug, Default)]
pub struct ImplCache {
    cache: Vec<Vec<Lit>>,
    pub enabled: bool,
}

impl Instantiate for ImplCache {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> Self {
        ImplCache {
            cache: vec![Vec::new(); 2 * cnf.num_of_variables],
            enabled: config.do_cache,
        }
    }
    fn handle(&mut self, e: SolverEvent) {
        if let SolverEvent::NewVar = e {
            self.cache.push(Vec::new());
            self.cache.push(Vec::new());
        }
    }
}

impl ImplCache {
    /// repopulate from the binary clauses: `l` implies `other` for every
    /// binary `(!l, other)`.
    pub fn refresh(&mut self, cdb: &ClauseDB) {
        if !self.enabled {
            return;
        }
        for (i, list) in self.cache.iter_mut().enumerate() {
            list.clear();
            let l = Lit::from(i);
            for w in cdb.watch_list(!l).iter() {
                if let Watcher::Binary { other, .. } = w {
                    list.push(*other);
                }
            }
            list.sort_unstable();
            list.dedup();
        }
    }

    /// drop entries over assigned or removed variables; derives a unit
    /// when a list carries both a literal and its complement. Returns
    /// whether anything was newly set.
    pub fn clean(
        &mut self,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        vmap: &VarMap,
    ) -> Result<bool, SolverError> {
        if !self.enabled {
            return Ok(false);
        }
        let mut set_something = false;
        let mut units: Vec<Lit> = Vec::new();
        for (i, list) in self.cache.iter_mut().enumerate() {
            let from = Lit::from(i);
            if asg.assign(from.vi()).is_some() || asg.var(from.vi()).removed != Removed::None {
                list.clear();
                continue;
            }
            list.retain(|l| {
                asg.assign(l.vi()).is_none() && asg.var(l.vi()).removed == Removed::None
            });
            list.sort_unstable();
            for l in list.iter() {
                if list.binary_search(&!*l).is_ok() {
                    // `from` implies both polarities of a variable
                    units.push(!from);
                    break;
                }
            }
        }
        for u in units {
            if asg.assigned(u) == Some(true) {
                continue;
            }
            set_something = true;
            super::assert_level0_unit(asg, cdb, vmap, u)?;
        }
        Ok(set_something)
    }

    /// the both-sides trick: anything implied by `v` and by `!v` holds.
    pub fn try_both(
        &mut self,
        asg: &mut AssignStack,
        cdb: &mut ClauseDB,
        vmap: &VarMap,
        state: &mut State,
    ) -> MaybeInconsistent {
        if !self.enabled {
            return Ok(());
        }
        self.refresh(cdb);
        for vi in 0..asg.num_vars as VarId {
            if asg.assign(vi).is_some() || asg.var(vi).removed != Removed::None {
                continue;
            }
            let pos = &self.cache[Lit::pos(vi).index()];
            let neg = &self.cache[Lit::neg(vi).index()];
            if pos.is_empty() || neg.is_empty() {
                continue;
            }
            let mut units: Vec<Lit> = Vec::new();
            for l in pos.iter() {
                if neg.binary_search(l).is_ok() && asg.assigned(*l).is_none() {
                    units.push(*l);
                }
            }
            for u in units {
                state[Stat::CacheUnit] += 1;
                super::assert_level0_unit(asg, cdb, vmap, u)?;
            }
        }
        Ok(())
    }

    /// rewrite the stored literals after a renumbering.
    pub fn update_vars(&mut self, old_to_new: &[VarId]) {
        if !self.enabled {
            return;
        }
        let n = self.cache.len();
        let mut fresh: Vec<Vec<Lit>> = vec![Vec::new(); n];
        for (i, list) in self.cache.iter().enumerate() {
            let from = Lit::from(i);
            let to = from.map_var(old_to_new[from.vi() as usize]);
            fresh[to.index()] = list
                .iter()
                .map(|l| l.map_var(old_to_new[l.vi() as usize]))
                .collect();
            fresh[to.index()].sort_unstable();
        }
        self.cache = fresh;
    }

    pub fn mem_used(&self) -> usize {
        self.cache
            .iter()
            .map(|l| l.capacity() * std::mem::size_of::<Lit>())
            .sum::<usize>()
            + self.cache.capacity() * std::mem::size_of::<Vec<Lit>>()
    }
    /// release everything and stay off.
    pub fn free(&mut self) {
        self.cache = Vec::new();
        self.enabled = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::ClauseDBIF;

    #[test]
    fn test_try_both_derives_unit() {
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..CNFDescription::default()
        };
        let conf = Config::default();
        let mut asg = AssignStack::instantiate(&conf, &cnf);
        let mut cdb = ClauseDB::instantiate(&conf, &cnf);
        let vmap = crate::vmap::VarMap::instantiate(&conf, &cnf);
        let mut state = State::instantiate(&conf, &cnf);
        // (x1 -> x3) and (!x1 -> x3), i.e. (-1 3) and (1 3)
        cdb.attach_bin(Lit::from(-1i32), Lit::from(3i32), false);
        cdb.attach_bin(Lit::from(1i32), Lit::from(3i32), false);
        let mut cache = ImplCache::instantiate(&conf, &cnf);
        cache.try_both(&mut asg, &mut cdb, &vmap, &mut state).expect("consistent");
        assert_eq!(asg.assigned(Lit::from(3i32)), Some(true));
    }
}
