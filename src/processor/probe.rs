//! Failed-literal probing.
use {
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::{ClauseDB, WatchIndexIF, Watcher},
        state::{Stat, State},
        types::*,
        vmap::VarMap,
    },
};

/// Assume each candidate literal at level 1; a conflict asserts its
/// negation at the root.
pub fn probe(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    state: &mut State,
    conf: &Config,
) -> MaybeInconsistent {
    run_probe(asg, cdb, vmap, state, conf, false)
}

/// The in-tree variant: only roots of the binary implication graph are
/// probed, since their failure prunes whole implication trees.
pub fn intree_probe(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    state: &mut State,
    conf: &Config,
) -> MaybeInconsistent {
    run_probe(asg, cdb, vmap, state, conf, true)
}

fn num_bin_watches(cdb: &ClauseDB, l: Lit) -> usize {
    cdb.watch_list(l)
        .iter()
        .filter(|w| matches!(w, Watcher::Binary { .. }))
        .count()
}

fn run_probe(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    state: &mut State,
    conf: &Config,
    roots_only: bool,
) -> MaybeInconsistent {
    debug_assert_eq!(asg.decision_level(), 0);
    let budget =
        (conf.probe_propagation_limit as f64 * conf.global_timeout_multiplier) as usize;
    let start = asg.num_propagation;
    for vi in 0..asg.num_vars as VarId {
        if budget < asg.num_propagation - start {
            break;
        }
        for sign in [false, true].iter() {
            let l = Lit::from((vi, *sign));
            if asg.assigned(l).is_some()
                || asg.var(vi).removed != Removed::None
            {
                continue;
            }
            if roots_only
                && !(num_bin_watches(cdb, l) == 0 && 0 < num_bin_watches(cdb, !l))
            {
                continue;
            }
            asg.assign_by_decision(l);
            let failed = asg.propagate(cdb).is_err();
            asg.cancel_until(0);
            if failed {
                state[Stat::ProbedFailure] += 1;
                super::assert_level0_unit(asg, cdb, vmap, !l)?;
            }
        }
    }
    Ok(())
}
