//! Conflict-driven clause-learning search under a conflict budget.
mod analyze;

pub use self::analyze::analyze_final;

use {
    self::analyze::conflict_analyze,
    crate::{
        assign::{AssignIF, AssignReason, AssignStack},
        cdb::{ClauseDB, ClauseDBIF, ClauseIF, ClauseRef},
        config::{Config, PolarityMode, RestartType},
        datasync::DataSync,
        state::{Stat, State, StateIF},
        types::*,
        vmap::VarMap,
    },
    std::sync::atomic::{AtomicBool, Ordering},
};

/// the Luby series: 1, 1, 2, 1, 1, 2, 4, ...
fn luby(mut x: usize) -> usize {
    let mut size = 1;
    let mut seq = 0;
    while size < x + 1 {
        seq += 1;
        size = 2 * size + 1;
    }
    while size - 1 != x {
        size = (size - 1) / 2;
        seq -= 1;
        x %= size;
    }
    1 << seq
}

/// Run CDCL until a verdict, the conflict budget, the time budget or an
/// interrupt. The trail is left at the root on an undef return.
#[allow(clippy::too_many_arguments)]
pub fn solve(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    state: &mut State,
    conf: &Config,
    dsync: &mut DataSync,
    assumptions: &[Lit],
    num_confl: usize,
    interrupt: &AtomicBool,
) -> Result<Lbool, SolverError> {
    let mut conflicts_this_call = 0;
    let mut conflicts_this_restart = 0;
    let mut restart_len = match conf.restart_type {
        RestartType::Luby => luby(asg.num_restart) * conf.restart_first,
        RestartType::Geom => {
            (conf.restart_first as f64 * conf.restart_inc.powi(asg.num_restart as i32)) as usize
        }
    };
    asg.update_activity_decay(conf.var_decay);
    asg.rebuild_order();
    loop {
        match asg.propagate(cdb) {
            Err(confl) => {
                asg.num_conflict += 1;
                state[Stat::Conflict] += 1;
                conflicts_this_call += 1;
                conflicts_this_restart += 1;
                if asg.decision_level() == 0 {
                    cdb.certificate_empty();
                    return Ok(Some(false));
                }
                if asg.decision_level() <= asg.root_level {
                    // a conflict inside the assumption prefix
                    let failed = asg.stack(asg.len_upto(asg.decision_level() - 1));
                    analyze_final(asg, cdb, state, failed);
                    return Ok(Some(false));
                }
                let (learnt, bt, glue) = conflict_analyze(asg, cdb, state, confl);
                state.ema_glue.update(glue as f64);
                match learnt.len() {
                    1 => {
                        asg.cancel_until(0);
                        cdb.certificate_assert(vmap, learnt[0]);
                        asg.assign_at_root_level(learnt[0])
                            .map_err(|_| SolverError::SolverBug)?;
                    }
                    2 => {
                        asg.cancel_until(bt);
                        cdb.certificate_add(vmap, &learnt);
                        cdb.attach_bin(learnt[0], learnt[1], true);
                        dsync.publish_bin(vmap, learnt[0], learnt[1]);
                        asg.enqueue(learnt[0], AssignReason::Binary(learnt[1]));
                    }
                    _ => {
                        asg.cancel_until(bt);
                        cdb.certificate_add(vmap, &learnt);
                        let cr = cdb.new_clause(learnt.clone(), true, glue, asg.num_conflict);
                        if cdb[cr].tier == 0 {
                            state[Stat::LearntTier0] += 1;
                        }
                        asg.enqueue(cdb[cr].lit0(), AssignReason::Long(cr));
                    }
                }
                asg.decay_activity();
                if num_confl <= conflicts_this_call {
                    asg.cancel_until(0);
                    return Ok(None);
                }
                if conflicts_this_call % 1024 == 0 {
                    if interrupt.load(Ordering::Acquire) {
                        asg.cancel_until(0);
                        return Ok(None);
                    }
                    if let Some(r) = state.elapsed() {
                        if 1.0 <= r {
                            asg.cancel_until(0);
                            return Ok(None);
                        }
                    }
                }
            }
            Ok(()) => {
                if restart_len <= conflicts_this_restart {
                    conflicts_this_restart = 0;
                    asg.num_restart += 1;
                    state[Stat::Restart] += 1;
                    asg.cancel_until(asg.root_level.min(asg.decision_level()));
                    restart_len = match conf.restart_type {
                        RestartType::Luby => luby(asg.num_restart) * conf.restart_first,
                        RestartType::Geom => {
                            (conf.restart_first as f64
                                * conf.restart_inc.powi(asg.num_restart as i32))
                                as usize
                        }
                    };
                    if cdb.max_tier2 < cdb.long_red[2].len() && asg.decision_level() == 0 {
                        let locked: Vec<ClauseRef> = cdb.long_red[2]
                            .iter()
                            .copied()
                            .filter(|cr| asg.locked(cdb, *cr))
                            .collect();
                        cdb.reduce(|cr| locked.contains(&cr));
                        state[Stat::Reduction] += 1;
                    }
                }
                // assumption prefix, then a free decision
                let mut decided = false;
                while (asg.decision_level() as usize) < assumptions.len() {
                    let a = assumptions[asg.decision_level() as usize];
                    match asg.assigned(a) {
                        Some(true) => asg.push_dummy_level(),
                        Some(false) => {
                            analyze_final(asg, cdb, state, a);
                            return Ok(Some(false));
                        }
                        None => {
                            asg.assign_by_decision(a);
                            decided = true;
                            break;
                        }
                    }
                }
                if decided {
                    continue;
                }
                let next = asg.select_decision_var().or_else(|| {
                    // the heap may be stale after simplification
                    asg.rebuild_order();
                    asg.select_decision_var()
                });
                match next {
                    None => return Ok(Some(true)),
                    Some(vi) => {
                        let positive = match conf.polarity_mode {
                            PolarityMode::Positive => true,
                            PolarityMode::Negative => false,
                            PolarityMode::Saved => asg.var(vi).phase(),
                        };
                        asg.assign_by_decision(Lit::from((vi, !positive)));
                        state[Stat::Decision] += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luby() {
        let expect = [1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8];
        for (i, v) in expect.iter().enumerate() {
            assert_eq!(luby(i), *v);
        }
    }
}
