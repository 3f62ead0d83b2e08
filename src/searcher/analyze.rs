//! First-UIP conflict analysis and final-conflict extraction.
use {
    crate::{
        assign::{AssignIF, AssignReason, AssignStack},
        cdb::{ClauseDB, ClauseIF},
        state::State,
        types::*,
    },
    std::cmp::Reverse,
};

/// antecedent literals of a propagated literal `p`.
fn reason_lits(asg: &AssignStack, cdb: &ClauseDB, p: Lit) -> Vec<Lit> {
    match asg.reason(p.vi()) {
        AssignReason::Binary(other) => vec![other],
        AssignReason::Long(cr) => {
            debug_assert_eq!(cdb[cr].lit0(), p);
            cdb[cr].iter().skip(1).copied().collect()
        }
        _ => Vec::new(),
    }
}

/// Derive the first-UIP clause from a conflict. Returns the learnt
/// literal vector (asserting literal first, backtrack-level literal
/// second), the backtrack level, and the glue.
pub fn conflict_analyze(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    state: &mut State,
    confl: Conflict,
) -> (Vec<Lit>, DecisionLevel, u32) {
    let dl = asg.decision_level();
    let learnt = &mut state.new_learnt;
    learnt.clear();
    let mut seen_vars: Vec<VarId> = Vec::new();
    let mut path_cnt = 0usize;
    let mut antecedents: Vec<Lit> = match confl {
        Conflict::Bin(a, b) => vec![a, b],
        Conflict::Long(cr) => cdb[cr].iter().copied().collect(),
    };
    let mut idx = asg.stack_len();
    let mut p: Option<Lit> = None;
    loop {
        for q in antecedents.iter() {
            let vi = q.vi();
            if !asg.var(vi).is(FlagVar::CA_SEEN) && 0 < asg.level(vi) {
                asg.var_mut(vi).turn_on(FlagVar::CA_SEEN);
                seen_vars.push(vi);
                asg.reward_at_analysis(vi);
                if dl <= asg.level(vi) {
                    path_cnt += 1;
                } else {
                    learnt.push(*q);
                }
            }
        }
        while !asg.var(asg.stack(idx - 1).vi()).is(FlagVar::CA_SEEN) {
            idx -= 1;
        }
        let uip = asg.stack(idx - 1);
        idx -= 1;
        asg.var_mut(uip.vi()).turn_off(FlagVar::CA_SEEN);
        path_cnt -= 1;
        if path_cnt == 0 {
            p = Some(uip);
            break;
        }
        antecedents = reason_lits(asg, cdb, uip);
    }
    let uip = p.expect("analysis lost the implication path");
    // self-subsumption against the reason sides
    let keep: Vec<Lit> = learnt
        .iter()
        .copied()
        .filter(|l| !redundant_in_reasons(asg, cdb, *l))
        .collect();
    let mut out = Vec::with_capacity(keep.len() + 1);
    out.push(!uip);
    out.extend(keep);
    for vi in seen_vars {
        asg.var_mut(vi).turn_off(FlagVar::CA_SEEN);
    }
    // place the literal of the backtrack level at position 1
    let bt = if out.len() == 1 {
        0
    } else {
        let mut at = 1;
        for i in 2..out.len() {
            if asg.level(out[at].vi()) < asg.level(out[i].vi()) {
                at = i;
            }
        }
        out.swap(1, at);
        asg.level(out[1].vi())
    };
    let glue = {
        let mut levels: Vec<DecisionLevel> = out.iter().map(|l| asg.level(l.vi())).collect();
        levels.sort_unstable_by_key(|lv| Reverse(*lv));
        levels.dedup();
        levels.len() as u32
    };
    (out, bt, glue)
}

/// a literal is redundant when every antecedent of its assignment is
/// already part of the learnt clause.
fn redundant_in_reasons(asg: &AssignStack, cdb: &ClauseDB, l: Lit) -> bool {
    let ante = reason_lits(asg, cdb, !l);
    if ante.is_empty() {
        return false;
    }
    ante.iter()
        .all(|q| asg.var(q.vi()).is(FlagVar::CA_SEEN) || asg.level(q.vi()) == 0)
}

/// Compute the subset of assumptions responsible for a failure; the
/// result lands in `state.conflicts` in inter numbering.
pub fn analyze_final(asg: &mut AssignStack, cdb: &ClauseDB, state: &mut State, failed: Lit) {
    state.conflicts.clear();
    state.conflicts.push(!failed);
    if asg.decision_level() == 0 {
        return;
    }
    let mut seen_vars = vec![failed.vi()];
    asg.var_mut(failed.vi()).turn_on(FlagVar::CA_SEEN);
    for i in (asg.len_upto(0)..asg.stack_len()).rev() {
        let l = asg.stack(i);
        let vi = l.vi();
        if !asg.var(vi).is(FlagVar::CA_SEEN) {
            continue;
        }
        match asg.reason(vi) {
            AssignReason::Decision => state.conflicts.push(!l),
            _ => {
                for q in reason_lits(asg, cdb, l) {
                    if 0 < asg.level(q.vi()) && !asg.var(q.vi()).is(FlagVar::CA_SEEN) {
                        asg.var_mut(q.vi()).turn_on(FlagVar::CA_SEEN);
                        seen_vars.push(q.vi());
                    }
                }
            }
        }
    }
    for vi in seen_vars {
        asg.var_mut(vi).turn_off(FlagVar::CA_SEEN);
    }
}
