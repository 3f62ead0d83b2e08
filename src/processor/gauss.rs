//! Gaussian reasoning over the stored XOR constraints.
//!
//! The store is partitioned into matrices of variable-connected rows;
//! each matrix is brought to row-echelon form over GF(2). Empty rows
//! with an odd right-hand side refute; singleton rows become units and
//! pairs become equivalence binaries fed back as regular clauses.
use {
    super::add_simplified_clause,
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::ClauseDB,
        state::{Stat, State},
        types::*,
        vmap::VarMap,
    },
    std::collections::HashMap,
};

#[derive(Clone, Debug)]
struct Row {
    vars: Vec<VarId>, // sorted
    rhs: bool,
}

/// symmetric difference of two sorted var sets; the GF(2) row addition.
fn xor_rows(a: &[VarId], b: &[VarId]) -> Vec<VarId> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i]);
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j]);
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Fold the assignment into the rows, group them into matrices and
/// eliminate each one.
pub fn find_and_eliminate(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    state: &mut State,
) -> MaybeInconsistent {
    let mut rows: Vec<Row> = Vec::new();
    for x in cdb.xors.clone() {
        let mut rhs = x.rhs;
        let mut vars: Vec<VarId> = Vec::with_capacity(x.vars.len());
        let mut stale = false;
        for vi in x.vars.iter() {
            if asg.var(*vi).removed != Removed::None {
                stale = true;
                break;
            }
            match asg.assign(*vi) {
                Some(b) => rhs ^= b,
                None => vars.push(*vi),
            }
        }
        if stale {
            continue;
        }
        vars.sort_unstable();
        if vars.is_empty() {
            if rhs {
                cdb.certificate_empty();
                return Err(SolverError::Inconsistent);
            }
            continue;
        }
        rows.push(Row { vars, rhs });
    }
    // partition rows into matrices connected by shared variables
    let mut leader: HashMap<VarId, usize> = HashMap::new();
    let mut matrices: Vec<Vec<Row>> = Vec::new();
    for row in rows {
        let mut hit: Vec<usize> = row
            .vars
            .iter()
            .filter_map(|v| leader.get(v).copied())
            .collect();
        hit.sort_unstable();
        hit.dedup();
        let target = match hit.first() {
            None => {
                matrices.push(Vec::new());
                matrices.len() - 1
            }
            Some(first) => {
                // merge later matrices into the first
                for m in hit.iter().skip(1).rev() {
                    let moved = std::mem::take(&mut matrices[*m]);
                    for r in moved.iter() {
                        for v in r.vars.iter() {
                            leader.insert(*v, *first);
                        }
                    }
                    matrices[*first].extend(moved);
                }
                *first
            }
        };
        for v in row.vars.iter() {
            leader.insert(*v, target);
        }
        matrices[target].push(row);
    }
    for m in matrices.iter_mut().filter(|m| !m.is_empty()) {
        eliminate_matrix(asg, cdb, vmap, state, m)?;
    }
    Ok(())
}

fn eliminate_matrix(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    state: &mut State,
    rows: &mut Vec<Row>,
) -> MaybeInconsistent {
    let mut pivot_row = 0;
    while pivot_row < rows.len() {
        let pivot_var = match rows[pivot_row].vars.first() {
            None => {
                if rows[pivot_row].rhs {
                    cdb.certificate_empty();
                    return Err(SolverError::Inconsistent);
                }
                rows.remove(pivot_row);
                continue;
            }
            Some(v) => *v,
        };
        for i in 0..rows.len() {
            if i != pivot_row && rows[i].vars.binary_search(&pivot_var).is_ok() {
                rows[i] = Row {
                    vars: xor_rows(&rows[i].vars, &rows[pivot_row].vars),
                    rhs: rows[i].rhs ^ rows[pivot_row].rhs,
                };
            }
        }
        pivot_row += 1;
    }
    for row in rows.iter() {
        match row.vars.len() {
            0 => {
                if row.rhs {
                    cdb.certificate_empty();
                    return Err(SolverError::Inconsistent);
                }
            }
            1 => {
                let l = Lit::from((row.vars[0], !row.rhs));
                if asg.assigned(l) != Some(true) {
                    state[Stat::GaussUnit] += 1;
                    super::assert_level0_unit(asg, cdb, vmap, l)?;
                }
            }
            2 => {
                // v0 ^ v1 = rhs is the pair of binaries (v0 v1), (!v0 !v1)
                // when rhs holds, else (v0 !v1), (!v0 v1)
                let (a, b) = (row.vars[0], row.vars[1]);
                add_simplified_clause(
                    asg,
                    cdb,
                    vmap,
                    vec![Lit::pos(a), Lit::from((b, !row.rhs))],
                    false,
                )?;
                add_simplified_clause(
                    asg,
                    cdb,
                    vmap,
                    vec![Lit::neg(a), Lit::from((b, row.rhs))],
                    false,
                )?;
            }
            _ => (),
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xor_rows() {
        assert_eq!(xor_rows(&[0, 1, 2], &[1, 3]), vec![0, 2, 3]);
        assert_eq!(xor_rows(&[0], &[0]), Vec::<VarId>::new());
    }
}
