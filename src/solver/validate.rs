//! Model validation against the live clause database.
use crate::{
    cdb::{ClauseDB, ClauseIF, WatchIndexIF, Watcher},
    types::*,
    vmap::VarMap,
};

/// Check an outer-indexed model against every live clause; returns the
/// first falsified clause as DIMACS literals, or `None` when the model
/// stands.
pub fn validate_current_db(cdb: &ClauseDB, vmap: &VarMap, model: &[Lbool]) -> Option<Vec<i32>> {
    let value_of = |l: Lit| -> Lbool {
        let o = vmap.map_inter_lit_to_outer(l);
        model[o.vi() as usize].map(|b| b != o.sign())
    };
    for cr in cdb.long_irred.iter() {
        let c = &cdb[*cr];
        if c.is_dead() {
            continue;
        }
        if !c.iter().any(|l| value_of(*l) == Some(true)) {
            return Some(vmap.inter_lits_to_outer_i32s(&c.lits));
        }
    }
    for i in 0..cdb.num_watch_lists() {
        let l = Lit::from(i);
        for w in cdb.watch_list(l).iter() {
            if let Watcher::Binary { other, red: false } = w {
                if l < *other
                    && value_of(l) != Some(true)
                    && value_of(*other) != Some(true)
                {
                    return Some(vmap.inter_lits_to_outer_i32s(&[l, *other]));
                }
            }
        }
    }
    None
}
