//! Backward subsumption and self-subsuming resolution over the
//! occurrence lists.
use {
    super::{remove_simplified_clause, OccSimplifier},
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::{ClauseDB, ClauseDBIF, ClauseIF, ClauseRef, RefClause},
        state::{Stat, State},
        types::*,
        vmap::VarMap,
    },
};

/// `Some(None)`: subsumed outright. `Some(Some(l))`: `l` can be removed
/// from the bigger clause by self-subsuming resolution. `None`: neither.
fn subsumes(small: &[Lit], big: &[Lit]) -> Option<Option<Lit>> {
    let mut flipped: Option<Lit> = None;
    'next: for l in small.iter() {
        for m in big.iter() {
            if l == m {
                continue 'next;
            }
            if *l == !*m {
                if flipped.is_some() {
                    return None;
                }
                flipped = Some(*m);
                continue 'next;
            }
        }
        return None;
    }
    Some(flipped)
}

/// Check every linked clause against the clauses sharing its rarest
/// literal; remove what it subsumes, strengthen what it nearly subsumes.
pub fn backward_subsume(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    occ: &mut OccSimplifier,
    state: &mut State,
    conf: &Config,
) -> MaybeInconsistent {
    let budget = (conf.global_timeout_multiplier * 1_000_000.0) as usize;
    let mut steps = 0usize;
    for i in 0..cdb.long_irred.len() {
        if budget < steps {
            break;
        }
        let cr = cdb.long_irred[i];
        if cdb[cr].is_dead() || occ.subsume_literal_limit < cdb[cr].len() {
            continue;
        }
        let small: Vec<Lit> = cdb[cr].iter().copied().collect();
        // candidates share the literal (subsumption) or its complement
        // (strengthening), so both lists of every member are scanned
        let mut candidates: Vec<ClauseRef> = Vec::new();
        for l in small.iter() {
            candidates.extend(occ[*l].refs.iter().copied());
            candidates.extend(occ[!*l].refs.iter().copied());
        }
        candidates.sort_unstable();
        candidates.dedup();
        for other in candidates {
            if other == cr || cdb[other].is_dead() || asg.locked(cdb, other) {
                continue;
            }
            if cdb[other].len() < small.len() {
                continue;
            }
            steps += small.len() * cdb[other].len();
            let big: Vec<Lit> = cdb[other].iter().copied().collect();
            match subsumes(&small, &big) {
                Some(None) => {
                    remove_simplified_clause(cdb, vmap, occ, other);
                    occ.num_subsumed += 1;
                    state[Stat::SubsumedClause] += 1;
                }
                Some(Some(flipped)) => {
                    strengthen(asg, cdb, vmap, occ, state, other, flipped)?;
                }
                None => (),
            }
        }
    }
    cdb.garbage_collect();
    Ok(())
}

/// Remove `p` from `cr`, reissuing certification and occurrence links.
pub(super) fn strengthen(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    occ: &mut OccSimplifier,
    state: &mut State,
    cr: ClauseRef,
    p: Lit,
) -> MaybeInconsistent {
    let old: Vec<Lit> = cdb[cr].iter().copied().collect();
    let new: Vec<Lit> = old.iter().copied().filter(|l| *l != p).collect();
    cdb.certificate_add(vmap, &new);
    occ.unlink(cdb, cr);
    match cdb.strengthen_clause(cr, p) {
        RefClause::Clause(cr2) => {
            debug_assert_eq!(cr, cr2);
            occ.link(cdb, cr);
        }
        RefClause::Bin(..) => (),
        RefClause::Unit(l) => {
            asg.assign_at_root_level(l)?;
            if asg.propagate(cdb).is_err() {
                cdb.certificate_empty();
                return Err(SolverError::Inconsistent);
            }
        }
        RefClause::Dead => (),
    }
    cdb.certificate_delete(vmap, &old);
    state[Stat::StrengthenedClause] += 1;
    Ok(())
}

/// Deduplicate the binary clauses; an irredundant copy beats a learnt one.
pub fn subsume_implicit(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    state: &mut State,
) -> MaybeInconsistent {
    use crate::cdb::{WatchIndexIF, Watcher};
    for i in 0..2 * asg.num_vars {
        let l = Lit::from(i);
        let mut seen: Vec<(Lit, bool)> = Vec::new();
        let mut drop: Vec<(Lit, bool)> = Vec::new();
        for w in cdb.watch_list(l).iter() {
            if let Watcher::Binary { other, red } = w {
                if l < *other {
                    match seen.iter().position(|(o, _)| o == other) {
                        None => seen.push((*other, *red)),
                        Some(at) => {
                            // keep the irredundant copy
                            if seen[at].1 && !*red {
                                drop.push((*other, true));
                                seen[at].1 = false;
                            } else {
                                drop.push((*other, *red));
                            }
                        }
                    }
                }
            }
        }
        for (other, red) in drop {
            cdb.certificate_delete(vmap, &[l, other]);
            cdb.detach_bin(l, other, red);
            state[Stat::SubsumedClause] += 1;
        }
    }
    Ok(())
}

/// Strengthen the implicit clauses: `(a x)` with `(a !x)` asserts `a`.
pub fn str_implicit(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    state: &mut State,
) -> MaybeInconsistent {
    use crate::cdb::{WatchIndexIF, Watcher};
    let mut units: Vec<Lit> = Vec::new();
    for i in 0..2 * asg.num_vars {
        let a = Lit::from(i);
        if asg.assigned(a).is_some() {
            continue;
        }
        let others: Vec<Lit> = cdb
            .watch_list(a)
            .iter()
            .filter_map(|w| match w {
                Watcher::Binary { other, .. } => Some(*other),
                _ => None,
            })
            .collect();
        if others.iter().any(|o| others.contains(&!*o)) {
            units.push(a);
        }
    }
    for a in units {
        if asg.assigned(a) == Some(true) {
            continue;
        }
        state[Stat::StrengthenedClause] += 1;
        super::assert_level0_unit(asg, cdb, vmap, a)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lits(v: &[i32]) -> Vec<Lit> {
        v.iter().map(|i| Lit::from(*i)).collect()
    }

    #[test]
    fn test_subsumes() {
        assert_eq!(subsumes(&lits(&[1, 2]), &lits(&[1, 2, 3])), Some(None));
        assert_eq!(
            subsumes(&lits(&[1, -2]), &lits(&[1, 2, 3])),
            Some(Some(Lit::from(2i32)))
        );
        assert_eq!(subsumes(&lits(&[1, 4]), &lits(&[1, 2, 3])), None);
        assert_eq!(subsumes(&lits(&[-1, -2]), &lits(&[1, 2, 3])), None);
    }
}
