//! Clause distillation: vivification by re-asserting literals, and
//! strengthening long clauses with binaries.
use {
    super::{add_simplified_clause, OccSimplifier},
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::{ClauseDB, ClauseDBIF, ClauseIF, ClauseRef, WatchIndexIF, Watcher},
        state::{Stat, State},
        types::*,
        vmap::VarMap,
    },
};

/// Enqueue the negations of a clause's literals one by one; an early
/// conflict or implication proves a shorter clause.
pub fn distill(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    state: &mut State,
    conf: &Config,
) -> MaybeInconsistent {
    debug_assert_eq!(asg.decision_level(), 0);
    let budget =
        (conf.distill_propagation_limit as f64 * conf.global_timeout_multiplier) as usize;
    let start = asg.num_propagation;
    let targets: Vec<ClauseRef> = cdb.long_irred.clone();
    for cr in targets {
        if budget < asg.num_propagation - start {
            break;
        }
        if cdb[cr].is_dead() || asg.locked(cdb, cr) {
            continue;
        }
        let lits: Vec<Lit> = cdb[cr].iter().copied().collect();
        let mut kept: Vec<Lit> = Vec::with_capacity(lits.len());
        let mut satisfied_at_root = false;
        let mut shortened = false;
        for (i, l) in lits.iter().enumerate() {
            match asg.assigned(*l) {
                Some(true) => {
                    if asg.decision_level() == 0 {
                        satisfied_at_root = true;
                    } else {
                        // the kept prefix implies `l`; the tail is noise
                        kept.push(*l);
                        shortened = i + 1 < lits.len();
                    }
                    break;
                }
                Some(false) => {
                    // the kept prefix refutes `l`
                    shortened = true;
                }
                None => {
                    kept.push(*l);
                    if i + 1 < lits.len() {
                        asg.assign_by_decision(!*l);
                        if asg.propagate(cdb).is_err() {
                            shortened = i + 1 < lits.len();
                            break;
                        }
                    }
                }
            }
        }
        asg.cancel_until(0);
        if satisfied_at_root {
            let old: Vec<Lit> = cdb[cr].iter().copied().collect();
            cdb.certificate_delete(vmap, &old);
            cdb.remove_clause(cr);
            continue;
        }
        if shortened && kept.len() < lits.len() {
            state[Stat::DistilledLit] += lits.len() - kept.len();
            let old: Vec<Lit> = cdb[cr].iter().copied().collect();
            add_simplified_clause(asg, cdb, vmap, kept, false)?;
            cdb.certificate_delete(vmap, &old);
            cdb.remove_clause(cr);
        }
    }
    cdb.garbage_collect();
    Ok(())
}

/// Subsume and strengthen long clauses with binary clauses.
pub fn sub_str_with_bin(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    occ: &mut OccSimplifier,
    state: &mut State,
) -> MaybeInconsistent {
    let targets: Vec<ClauseRef> = cdb.long_irred.clone();
    let mut marks = vec![false; cdb.num_watch_lists()];
    for cr in targets {
        if cdb[cr].is_dead() || asg.locked(cdb, cr) {
            continue;
        }
        let lits: Vec<Lit> = cdb[cr].iter().copied().collect();
        for l in lits.iter() {
            marks[l.index()] = true;
        }
        let mut subsumed = false;
        let mut strengthen_out: Option<Lit> = None;
        'scan: for l in lits.iter() {
            // a binary (l, m) with m in the clause subsumes it
            for w in cdb.watch_list(*l).iter() {
                if let Watcher::Binary { other, .. } = w {
                    if marks[other.index()] {
                        subsumed = true;
                        break 'scan;
                    }
                }
            }
            // a binary (!l, m) with m in the clause removes l
            for w in cdb.watch_list(!*l).iter() {
                if let Watcher::Binary { other, .. } = w {
                    if marks[other.index()] && *other != *l {
                        strengthen_out = Some(*l);
                        break 'scan;
                    }
                }
            }
        }
        for l in lits.iter() {
            marks[l.index()] = false;
        }
        if subsumed {
            let old: Vec<Lit> = cdb[cr].iter().copied().collect();
            cdb.certificate_delete(vmap, &old);
            cdb.remove_clause(cr);
            state[Stat::SubsumedClause] += 1;
            continue;
        }
        if let Some(p) = strengthen_out {
            super::subsume::strengthen(asg, cdb, vmap, occ, state, cr, p)?;
        }
    }
    cdb.garbage_collect();
    Ok(())
}
