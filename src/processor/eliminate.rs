//! Bounded variable elimination with reconstruction bookkeeping.
use {
    super::{add_simplified_clause, irred_bins_of, remove_simplified_clause, OccSimplifier},
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::{ClauseDB, ClauseDBIF, ClauseIF, ClauseRef, WatchIndexIF},
        state::{Stat, State},
        types::*,
        vmap::VarMap,
    },
};

/// A clause mentioning the elimination candidate: long, or a binary
/// rebuilt from the watch lists.
#[derive(Clone, Debug)]
enum OccClause {
    Long(ClauseRef),
    Bin(Lit, Lit),
}

impl OccClause {
    fn lits(&self, cdb: &ClauseDB) -> Vec<Lit> {
        match self {
            OccClause::Long(cr) => cdb[*cr].iter().copied().collect(),
            OccClause::Bin(a, b) => vec![*a, *b],
        }
    }
}

/// Try to eliminate every active variable, cheapest occurrence products
/// first, within the configured growth limits.
pub fn eliminate_vars(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    occ: &mut OccSimplifier,
    state: &mut State,
    frozen: &[bool],
) -> MaybeInconsistent {
    let mut order: Vec<(usize, VarId)> = (0..asg.num_vars as VarId)
        .filter(|vi| {
            asg.assign(*vi).is_none()
                && asg.var(*vi).removed == Removed::None
                && !frozen[*vi as usize]
        })
        .map(|vi| {
            let p = occ[Lit::pos(vi)].refs.len() + irred_bins_of(cdb, Lit::pos(vi)).len();
            let n = occ[Lit::neg(vi)].refs.len() + irred_bins_of(cdb, Lit::neg(vi)).len();
            (p * n, vi)
        })
        .collect();
    order.sort_unstable();
    for (_, vi) in order {
        if asg.assign(vi).is_none() && asg.var(vi).removed == Removed::None {
            eliminate_var(asg, cdb, vmap, occ, state, vi)?;
        }
    }
    Ok(())
}

fn gather(cdb: &ClauseDB, occ: &OccSimplifier, l: Lit) -> Vec<OccClause> {
    let mut side: Vec<OccClause> = occ[l]
        .refs
        .iter()
        .filter(|cr| !cdb[**cr].is_dead())
        .map(|cr| OccClause::Long(*cr))
        .collect();
    for other in irred_bins_of(cdb, l) {
        side.push(OccClause::Bin(l, other));
    }
    side
}

fn eliminate_var(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    occ: &mut OccSimplifier,
    state: &mut State,
    vi: VarId,
) -> MaybeInconsistent {
    let pos = gather(cdb, occ, Lit::pos(vi));
    let neg = gather(cdb, occ, Lit::neg(vi));
    if occ.eliminate_var_occurrence_limit < pos.len() * neg.len() {
        return Ok(());
    }
    // count the surviving resolvents before committing
    let mut resolvents: Vec<Vec<Lit>> = Vec::new();
    for p in pos.iter() {
        for n in neg.iter() {
            if let Some(r) = merge(&p.lits(cdb), &n.lits(cdb), vi) {
                if occ.subsume_literal_limit < r.len() {
                    return Ok(());
                }
                resolvents.push(r);
                if pos.len() + neg.len() + occ.eliminate_grow_limit < resolvents.len() {
                    return Ok(());
                }
            }
        }
    }
    // every removed clause goes on the reconstruction stack, blocked on
    // its own literal of `vi`; the closing polarity marker supplies the
    // default value when no clause ends up demanding one
    for (side, lit) in [(&pos, Lit::pos(vi)), (&neg, Lit::neg(vi))].iter() {
        let on = vmap.map_inter_lit_to_outer(*lit);
        for c in side.iter() {
            let outer: Vec<Lit> = c
                .lits(cdb)
                .iter()
                .map(|l| vmap.map_inter_lit_to_outer(*l))
                .collect();
            occ.push_reconstruction(outer, on);
        }
    }
    let kept_lit = if neg.len() < pos.len() {
        Lit::neg(vi)
    } else {
        Lit::pos(vi)
    };
    let unit_on = vmap.map_inter_lit_to_outer(!kept_lit);
    occ.push_reconstruction(vec![unit_on], unit_on);

    // drop the original clauses, then add the resolvents
    for c in pos.iter().chain(neg.iter()) {
        match c {
            OccClause::Long(cr) => {
                if !cdb[*cr].is_dead() {
                    remove_simplified_clause(cdb, vmap, occ, *cr);
                }
            }
            OccClause::Bin(a, b) => {
                cdb.certificate_delete(vmap, &[*a, *b]);
                cdb.detach_bin(*a, *b, false);
            }
        }
    }
    asg.var_mut(vi).removed = Removed::Eliminated;
    occ.num_elimed += 1;
    state[Stat::EliminatedVar] += 1;
    for r in resolvents {
        debug_assert!(r.iter().all(|l| l.vi() != vi));
        if let Some(cr) = add_simplified_clause(asg, cdb, vmap, r, false)? {
            occ.link(cdb, cr);
        }
    }
    // the redundant clauses over the variable no longer serve a purpose
    purge_red_clauses_with(asg, cdb, vmap, vi);
    Ok(())
}

/// Resolve two clauses on `vi`; `None` marks a tautological resolvent.
fn merge(pb: &[Lit], qb: &[Lit], vi: VarId) -> Option<Vec<Lit>> {
    let mut vec: Vec<Lit> = Vec::with_capacity(pb.len() + qb.len() - 2);
    'next_literal: for l in qb.iter() {
        if l.vi() != vi {
            for j in pb.iter() {
                if j.vi() == l.vi() {
                    if *j == !*l {
                        return None;
                    } else {
                        continue 'next_literal;
                    }
                }
            }
            vec.push(*l);
        }
    }
    for l in pb.iter() {
        if l.vi() != vi {
            vec.push(*l);
        }
    }
    Some(vec)
}

/// Learnt clauses mentioning an eliminated variable are dropped outright.
fn purge_red_clauses_with(asg: &mut AssignStack, cdb: &mut ClauseDB, vmap: &VarMap, vi: VarId) {
    for tier in 0..cdb.long_red.len() {
        for i in 0..cdb.long_red[tier].len() {
            let cr = cdb.long_red[tier][i];
            if cdb[cr].is_dead() || asg.locked(cdb, cr) {
                continue;
            }
            if cdb[cr].iter().any(|l| l.vi() == vi) {
                let lits: Vec<Lit> = cdb[cr].iter().copied().collect();
                cdb.certificate_delete(vmap, &lits);
                cdb.remove_clause(cr);
            }
        }
    }
    for sign in [false, true].iter() {
        let l = Lit::from((vi, *sign));
        let red_others: Vec<Lit> = cdb
            .watch_list(l)
            .iter()
            .filter_map(|w| match w {
                crate::cdb::Watcher::Binary { other, red: true } => Some(*other),
                _ => None,
            })
            .collect();
        for other in red_others {
            cdb.certificate_delete(vmap, &[l, other]);
            cdb.detach_bin(l, other, true);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_resolvent() {
        let a: Vec<Lit> = [1, 2].iter().map(|i| Lit::from(*i)).collect();
        let b: Vec<Lit> = [-1, 3].iter().map(|i| Lit::from(*i)).collect();
        let r = merge(&a, &b, 0).expect("resolvable");
        let mut r = i32s(&r);
        r.sort_unstable();
        assert_eq!(r, vec![2, 3]);
    }

    #[test]
    fn test_merge_tautology() {
        let a: Vec<Lit> = [1, 2].iter().map(|i| Lit::from(*i)).collect();
        let b: Vec<Lit> = [-1, -2].iter().map(|i| Lit::from(*i)).collect();
        assert_eq!(merge(&a, &b, 0), None);
    }
}
