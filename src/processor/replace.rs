//! Equivalent-literal replacement driven by the strongly connected
//! components of the binary implication graph.
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

/// The replacement table, kept in the outer numbering so that it
/// survives renumbering untouched.
#[derive(Clone, Debug, Default)]
pub struct VarReplacer {
    /// outer var -> outer literal it is replaced with; identity if none.
    table: Vec<Lit>,
    pub num_replaced: usize,
}

impl Instantiate for VarReplacer {
    fn instantiate(_conf: &Config, cnf: &CNFDescription) -> Self {
        VarReplacer {
            table: (0..cnf.num_of_variables as VarId).map(Lit::pos).collect(),
            num_replaced: 0,
        }
    }
    fn handle(&mut self, e: SolverEvent) {
        if let SolverEvent::NewVar = e {
            self.table.push(Lit::pos(self.table.len() as VarId));
        }
    }
}

impl VarReplacer {
    /// follow the (flattened) table once.
    #[inline]
    pub fn get_lit_replaced_with_outer(&self, l: Lit) -> Lit {
        self.table[l.vi() as usize] ^ l.sign()
    }
    pub fn is_replaced(&self, outer: VarId) -> bool {
        self.table[outer as usize] != Lit::pos(outer)
    }
    /// the representatives currently standing in for another variable.
    pub fn get_vars_replacing_others(&self) -> Vec<VarId> {
        let mut reps: Vec<VarId> = self
            .table
            .iter()
            .enumerate()
            .filter(|(v, l)| l.vi() != *v as VarId)
            .map(|(_, l)| l.vi())
            .collect();
        reps.sort_unstable();
        reps.dedup();
        reps
    }
    /// give every replaced variable the value its representative took.
    pub fn extend_model(&self, model: &mut [Lbool]) {
        for (v, l) in self.table.iter().enumerate() {
            if l.vi() == v as VarId {
                continue;
            }
            if let Some(b) = model[l.vi() as usize] {
                model[v] = Some(b != l.sign());
            }
        }
    }
    pub(crate) fn save_table(&self) -> &[Lit] {
        &self.table
    }
    pub(crate) fn restore_table(&mut self, table: Vec<Lit>) {
        self.num_replaced = table
            .iter()
            .enumerate()
            .filter(|(v, l)| l.vi() != *v as VarId)
            .count();
        self.table = table;
    }

    fn install(&mut self, outer_var: VarId, rep: Lit) {
        // resolve the representative through the table first, so that
        // entries always point at a class root
        let rep = self.table[rep.vi() as usize] ^ rep.sign();
        debug_assert_ne!(rep.vi(), outer_var);
        self.table[outer_var as usize] = rep;
        // flatten chains pointing at the newly replaced variable
        for i in 0..self.table.len() {
            let t = self.table[i];
            if t.vi() == outer_var {
                self.table[i] = rep ^ t.sign();
            }
        }
        self.num_replaced += 1;
    }
}

/// Iterative Tarjan over literal nodes; edges are `!a -> b` and
/// `!b -> a` for each binary clause `(a, b)`.
struct Tarjan<'a> {
    cdb: &'a ClauseDB,
    index: Vec<u32>,
    low: Vec<u32>,
    on_stack: Vec<bool>,
    stack: Vec<u32>,
    next_index: u32,
    sccs: Vec<Vec<u32>>,
}

const UNVISITED: u32 = u32::MAX;

impl<'a> Tarjan<'a> {
    fn new(cdb: &'a ClauseDB, n_lits: usize) -> Self {
        Tarjan {
            cdb,
            index: vec![UNVISITED; n_lits],
            low: vec![0; n_lits],
            on_stack: vec![false; n_lits],
            stack: Vec::new(),
            next_index: 0,
            sccs: Vec::new(),
        }
    }
    fn successors(&self, node: u32) -> Vec<u32> {
        // edges out of `node` come from binaries containing `!node`
        let from = !Lit::from(node);
        self.cdb
            .watch_list(from)
            .iter()
            .filter_map(|w| match w {
                Watcher::Binary { other, .. } => Some(u32::from(*other)),
                _ => None,
            })
            .collect()
    }
    fn run(&mut self, root: u32) {
        if self.index[root as usize] != UNVISITED {
            return;
        }
        // explicit DFS stack of (node, successor cursor)
        let mut dfs: Vec<(u32, usize)> = vec![(root, 0)];
        self.index[root as usize] = self.next_index;
        self.low[root as usize] = self.next_index;
        self.next_index += 1;
        self.stack.push(root);
        self.on_stack[root as usize] = true;
        while let Some((node, cursor)) = dfs.pop() {
            let succs = self.successors(node);
            if cursor < succs.len() {
                dfs.push((node, cursor + 1));
                let next = succs[cursor];
                if self.index[next as usize] == UNVISITED {
                    self.index[next as usize] = self.next_index;
                    self.low[next as usize] = self.next_index;
                    self.next_index += 1;
                    self.stack.push(next);
                    self.on_stack[next as usize] = true;
                    dfs.push((next, 0));
                } else if self.on_stack[next as usize] {
                    self.low[node as usize] =
                        self.low[node as usize].min(self.index[next as usize]);
                }
            } else {
                if let Some(&(parent, _)) = dfs.last() {
                    self.low[parent as usize] =
                        self.low[parent as usize].min(self.low[node as usize]);
                }
                if self.low[node as usize] == self.index[node as usize] {
                    let mut scc = Vec::new();
                    loop {
                        let w = self.stack.pop().expect("tarjan stack drained early");
                        self.on_stack[w as usize] = false;
                        scc.push(w);
                        if w == node {
                            break;
                        }
                    }
                    self.sccs.push(scc);
                }
            }
        }
    }
}

/// Find equivalence classes and substitute every member by its
/// representative, rewriting the clause database.
pub fn scc_and_replace(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    repl: &mut VarReplacer,
    occ: &mut OccSimplifier,
    state: &mut State,
    frozen: &[bool],
) -> MaybeInconsistent {
    let n_lits = 2 * asg.num_vars;
    let sccs = {
        let mut t = Tarjan::new(cdb, n_lits);
        for node in 0..n_lits as u32 {
            let vi = Lit::from(node).vi();
            if asg.assign(vi).is_none() && asg.var(vi).removed == Removed::None {
                t.run(node);
            }
        }
        t.sccs
    };
    let mut classes: Vec<Vec<Lit>> = Vec::new();
    let mut done = vec![false; asg.num_vars];
    for scc in sccs {
        if scc.len() < 2 {
            continue;
        }
        let lits: Vec<Lit> = scc.iter().map(|n| Lit::from(*n)).collect();
        // a literal and its complement in one class refute the formula
        for l in lits.iter() {
            if lits.contains(&!*l) {
                cdb.certificate_empty();
                return Err(SolverError::Inconsistent);
            }
        }
        if lits.iter().any(|l| {
            done[l.vi() as usize]
                || frozen[l.vi() as usize]
                || asg.assign(l.vi()).is_some()
                || asg.var(l.vi()).removed != Removed::None
        }) {
            continue;
        }
        for l in lits.iter() {
            done[l.vi() as usize] = true;
        }
        classes.push(lits);
    }
    for lits in classes {
        // the representative is the lowest outer literal of the class
        let rep = *lits
            .iter()
            .min_by_key(|l| vmap.map_inter_lit_to_outer(**l).vi())
            .expect("empty equivalence class");
        for l in lits.iter().filter(|l| l.vi() != rep.vi()) {
            // l == rep, so var(l) is replaced by rep xor the sign of l
            let outer_rep = vmap.map_inter_lit_to_outer(rep ^ l.sign());
            repl.install(vmap.map_inter_to_outer(l.vi()), outer_rep);
            asg.var_mut(l.vi()).removed = Removed::Replaced;
            state[Stat::ReplacedVar] += 1;
        }
        rewrite_clauses_with(asg, cdb, vmap, repl, occ, &lits, rep)?;
    }
    cdb.garbage_collect();
    Ok(())
}

/// Substitute the class members inside every clause that mentions one.
fn rewrite_clauses_with(
    asg: &mut AssignStack,
    cdb: &mut ClauseDB,
    vmap: &VarMap,
    repl: &VarReplacer,
    occ: &mut OccSimplifier,
    class: &[Lit],
    rep: Lit,
) -> MaybeInconsistent {
    let in_class = |l: Lit| class.iter().any(|c| c.vi() == l.vi()) && l.vi() != rep.vi();
    let subst = |l: Lit| {
        let outer = vmap.map_inter_lit_to_outer(l);
        vmap.map_outer_lit_to_inter(repl.get_lit_replaced_with_outer(outer))
    };
    // long clauses of every tier
    let all_longs: Vec<ClauseRef> = cdb
        .long_irred
        .iter()
        .chain(cdb.long_red.iter().flatten())
        .copied()
        .collect();
    for cr in all_longs {
        if cdb[cr].is_dead() || !cdb[cr].iter().any(|l| in_class(*l)) {
            continue;
        }
        let red = cdb[cr].is_redundant();
        let old: Vec<Lit> = cdb[cr].iter().copied().collect();
        let new: Vec<Lit> = old.iter().map(|l| subst(*l)).collect();
        occ.unlink(cdb, cr);
        cdb.certificate_delete(vmap, &old);
        cdb.remove_clause(cr);
        if let Some(ncr) = add_simplified_clause(asg, cdb, vmap, new, red)? {
            occ.link(cdb, ncr);
        }
    }
    // binary clauses touching the class
    for l in class.iter().filter(|l| l.vi() != rep.vi()) {
        for lit in [*l, !*l].iter() {
            loop {
                let entry = cdb.watch_list(*lit).iter().find_map(|w| match w {
                    Watcher::Binary { other, red } => Some((*other, *red)),
                    _ => None,
                });
                match entry {
                    None => break,
                    Some((other, red)) => {
                        cdb.certificate_delete(vmap, &[*lit, other]);
                        cdb.detach_bin(*lit, other, red);
                        add_simplified_clause(
                            asg,
                            cdb,
                            vmap,
                            vec![subst(*lit), subst(other)],
                            red,
                        )?;
                    }
                }
            }
        }
    }
    if asg.propagate(cdb).is_err() {
        cdb.certificate_empty();
        return Err(SolverError::Inconsistent);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_flattening() {
        let cnf = CNFDescription {
            num_of_variables: 4,
            ..CNFDescription::default()
        };
        let mut r = VarReplacer::instantiate(&Config::default(), &cnf);
        r.install(1, Lit::pos(0));
        // now replace var 2 by !v1; flattening must land on !v0
        r.install(2, Lit::neg(1));
        assert_eq!(r.get_lit_replaced_with_outer(Lit::pos(2)), Lit::neg(0));
        assert_eq!(r.get_lit_replaced_with_outer(Lit::neg(2)), Lit::pos(0));
        assert_eq!(r.get_vars_replacing_others(), vec![0]);
    }

    #[test]
    fn test_extend_model() {
        let cnf = CNFDescription {
            num_of_variables: 3,
            ..CNFDescription::default()
        };
        let mut r = VarReplacer::instantiate(&Config::default(), &cnf);
        r.install(2, Lit::neg(0));
        let mut model = vec![Some(true), None, None];
        r.extend_model(&mut model);
        assert_eq!(model[2], Some(false));
    }
}
