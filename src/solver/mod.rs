//! The solver orchestrator: owns every sub-module and carries the
//! variable-universe discipline across search and simplification.
mod extend;
mod ingress;
mod reconfigure;
mod renumber;
mod scheduler;
mod search;
mod state_io;
mod undefine;
mod validate;

pub use self::{reconfigure::features_to_reconf, validate::validate_current_db};

use {
    crate::{
        assign::{AssignIF, AssignStack},
        cdb::ClauseDB,
        config::Config,
        datasync::{DataSync, SharedData},
        processor::{CompHandler, EliminateIF, ImplCache, OccSimplifier, VarReplacer},
        state::State,
        types::*,
        vmap::VarMap,
    },
    std::{
        path::Path,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
    },
};

/// Verdicts of [`Solver::solve`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Certificate {
    /// solved with a satisfiable assignment; DIMACS-style literals.
    SAT(Vec<i32>),
    /// proved unsatisfiable.
    UNSAT,
    /// gave up by budget, timeout or interrupt.
    UNKNOWN,
}

/// The return type of `Solver::solve`.
pub type SolverResult = Result<Certificate, SolverError>;

/// API of the solver at the outer boundary.
pub trait SatSolverIF {
    /// allocate `n` fresh outside variables.
    fn new_vars(&mut self, n: usize);
    /// allocate one fresh outside variable and return its index.
    fn new_var(&mut self) -> VarId;
    /// ingest a CNF clause given in the outside numbering.
    ///
    /// # Errors
    ///
    /// `TooManyVars` for an undeclared variable, `TooLongClause` over the
    /// length bound, `AddAfterBlocking` after blocked-clause elimination.
    fn add_clause(&mut self, lits: &[Lit], red: bool) -> Result<bool, SolverError>;
    /// ingest an XOR constraint over outside variables.
    fn add_xor_clause(&mut self, vars: &[VarId], rhs: bool) -> Result<bool, SolverError>;
    /// replace the assumption stack.
    fn set_assumptions(&mut self, lits: &[Lit]);
    /// run the main driver.
    fn solve(&mut self) -> SolverResult;
    /// run one inprocessing pass only.
    fn simplify_problem_outside(&mut self) -> SolverResult;
    /// the model after a SAT verdict, outside-numbered.
    fn get_model(&self) -> &[Lbool];
    /// the subset of assumptions refuting the query after UNSAT.
    fn get_final_conflict(&self) -> &[Lit];
    /// install the shared-clause gossip channel.
    fn set_shared_data(&mut self, shared: Arc<SharedData>);
}

/// The SAT solver object consisting of its sub-modules.
#[derive(Debug)]
pub struct Solver {
    /// assignment and trail management
    pub asg: AssignStack,
    /// clause container
    pub cdb: ClauseDB,
    /// the three-level variable namespace
    pub vmap: VarMap,
    /// occurrence simplifier and elimination bookkeeping
    pub occ: OccSimplifier,
    /// equivalence replacement bookkeeping
    pub replacer: VarReplacer,
    /// component decomposition bookkeeping
    pub comps: CompHandler,
    /// binary implication cache
    pub cache: ImplCache,
    /// shared-clause gossip endpoint
    pub dsync: DataSync,
    /// misc data holder
    pub state: State,
    /// configuration; mutated by the reconfigurator
    pub conf: Config,

    /// sticky refutation flag; false is terminal.
    pub(crate) ok: bool,
    /// outside-numbered model of the last SAT verdict.
    pub(crate) model: Vec<Lbool>,
    /// outer-numbered model, BVA variables included.
    pub(crate) full_model: Vec<Lbool>,
    /// final conflict in the outside numbering.
    pub(crate) conflict: Vec<Lit>,
    /// assumptions as the caller gave them.
    pub(crate) outside_assumptions: Vec<Lit>,
    /// (inter, outside) assumption pairs of the running query.
    pub(crate) assumptions: Vec<(Lit, Lit)>,
    /// outer-indexed: variables a dropped tautology obliges the model
    /// minimizer to keep assigned.
    pub(crate) undef_must_set: Vec<bool>,
    must_interrupt: Arc<AtomicBool>,
}

impl Instantiate for Solver {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> Solver {
        Solver {
            asg: AssignStack::instantiate(config, cnf),
            cdb: ClauseDB::instantiate(config, cnf),
            vmap: VarMap::instantiate(config, cnf),
            occ: OccSimplifier::instantiate(config, cnf),
            replacer: VarReplacer::instantiate(config, cnf),
            comps: CompHandler::instantiate(config, cnf),
            cache: ImplCache::instantiate(config, cnf),
            dsync: DataSync::default(),
            state: State::instantiate(config, cnf),
            conf: config.clone(),
            ok: true,
            model: Vec::new(),
            full_model: Vec::new(),
            conflict: Vec::new(),
            outside_assumptions: Vec::new(),
            assumptions: Vec::new(),
            undef_must_set: vec![false; cnf.num_of_variables],
            must_interrupt: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Default for Solver {
    fn default() -> Solver {
        Solver::instantiate(&Config::default(), &CNFDescription::default())
    }
}

impl TryFrom<&Path> for Solver {
    type Error = SolverError;
    /// build a solver from a DIMACS file.
    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let config = Config::from(path.to_string_lossy().into_owned());
        crate::cnf::build_solver_from_file(&config)
    }
}

impl SatSolverIF for Solver {
    fn new_vars(&mut self, n: usize) {
        for _ in 0..n {
            self.alloc_var(false);
        }
    }
    fn new_var(&mut self) -> VarId {
        self.alloc_var(false);
        self.vmap.num_outside() as VarId - 1
    }
    fn add_clause(&mut self, lits: &[Lit], red: bool) -> Result<bool, SolverError> {
        if !self.ok {
            return Ok(false);
        }
        if self.occ.anything_has_been_blocked() {
            return Err(SolverError::AddAfterBlocking);
        }
        self.check_outside_lits(lits)?;
        let outer: Vec<Lit> = lits
            .iter()
            .map(|l| l.map_var(self.vmap.map_outside_to_outer(l.vi())))
            .collect();
        self.add_clause_outer(outer, red)
    }
    fn add_xor_clause(&mut self, vars: &[VarId], rhs: bool) -> Result<bool, SolverError> {
        if !self.ok {
            return Ok(false);
        }
        let lits: Vec<Lit> = vars.iter().map(|v| Lit::pos(*v)).collect();
        self.check_outside_lits(&lits)?;
        let outer: Vec<Lit> = lits
            .iter()
            .map(|l| l.map_var(self.vmap.map_outside_to_outer(l.vi())))
            .collect();
        self.add_xor_clause_outer(outer, rhs)
    }
    fn set_assumptions(&mut self, lits: &[Lit]) {
        self.outside_assumptions = lits.to_vec();
    }
    fn solve(&mut self) -> SolverResult {
        self.solve_inner()
    }
    fn simplify_problem_outside(&mut self) -> SolverResult {
        self.conf.global_timeout_multiplier = self.conf.orig_global_timeout_multiplier;
        if !self.ok {
            return Ok(Certificate::UNSAT);
        }
        self.conflict.clear();
        self.install_assumptions()?;
        let status = if 0 < self.asg.num_vars && self.conf.do_simplify_problem {
            self.simplify_problem(false)?
        } else {
            None
        };
        Ok(match status {
            Some(false) => Certificate::UNSAT,
            Some(true) => Certificate::SAT(self.dimacs_model()),
            None => Certificate::UNKNOWN,
        })
    }
    fn get_model(&self) -> &[Lbool] {
        &self.model
    }
    fn get_final_conflict(&self) -> &[Lit] {
        &self.conflict
    }
    fn set_shared_data(&mut self, shared: Arc<SharedData>) {
        self.dsync.set_shared(shared);
    }
}

impl Solver {
    /// a handle the embedder can trip from another thread.
    pub fn interrupt_handle(&self) -> Arc<AtomicBool> {
        self.must_interrupt.clone()
    }
    pub fn set_interrupt(&self) {
        self.must_interrupt.store(true, Ordering::Release);
    }
    pub fn clear_interrupt(&self) {
        self.must_interrupt.store(false, Ordering::Release);
    }
    pub(crate) fn interrupted(&self) -> bool {
        self.must_interrupt.load(Ordering::Acquire)
    }
    pub fn okay(&self) -> bool {
        self.ok
    }
    /// the number of active, unassigned variables.
    pub fn get_num_free_vars(&self) -> usize {
        (0..self.asg.num_vars as VarId)
            .filter(|vi| {
                self.asg.assign(*vi).is_none() && self.asg.var(*vi).removed == Removed::None
            })
            .count()
    }

    fn check_outside_lits(&self, lits: &[Lit]) -> MaybeInconsistent {
        if (0x1usize << 28) <= lits.len() {
            return Err(SolverError::TooLongClause);
        }
        for l in lits.iter() {
            if self.vmap.num_outside() <= l.vi() as usize {
                return Err(SolverError::TooManyVars);
            }
        }
        Ok(())
    }

    /// allocate one variable slot across every module; returns the outer id.
    pub(crate) fn alloc_var(&mut self, bva: bool) -> VarId {
        self.asg.handle(SolverEvent::NewVar);
        self.cdb.handle(SolverEvent::NewVar);
        self.occ.handle(SolverEvent::NewVar);
        self.cache.handle(SolverEvent::NewVar);
        self.replacer.handle(SolverEvent::NewVar);
        self.comps.handle(SolverEvent::NewVar);
        self.undef_must_set.push(false);
        let outer = self.vmap.push_var_raw(bva);
        self.activate_outer_var(outer);
        outer
    }

    /// move an outer variable's slot into the active inter prefix.
    pub(crate) fn activate_outer_var(&mut self, outer: VarId) {
        if (self.vmap.map_outer_to_inter(outer) as usize) < self.vmap.num_inter() {
            self.asg.num_vars = self.asg.num_vars.max(self.vmap.num_inter());
            return;
        }
        let (now, was) = self.vmap.promote_to_active(outer);
        if now != was {
            self.asg.swap_inter_slots(now, was);
        }
        self.asg.num_vars = self.vmap.num_inter();
    }

    /// (inter, outside) assumption pairs; resurrects whatever the
    /// assumptions mention.
    pub(crate) fn install_assumptions(&mut self) -> MaybeInconsistent {
        self.assumptions.clear();
        let outside = self.outside_assumptions.clone();
        self.check_outside_lits(&outside)?;
        let mut outer: Vec<Lit> = outside
            .iter()
            .map(|l| l.map_var(self.vmap.map_outside_to_outer(l.vi())))
            .collect();
        let inter = match self.add_clause_helper(&mut outer) {
            Ok(lits) => lits,
            Err(SolverError::Inconsistent) => {
                self.ok = false;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        debug_assert_eq!(inter.len(), outside.len());
        self.assumptions = inter.into_iter().zip(outside.into_iter()).collect();
        Ok(())
    }

    pub(crate) fn dimacs_model(&self) -> Vec<i32> {
        self.model
            .iter()
            .enumerate()
            .filter_map(|(v, b)| b.map(|b| if b { v as i32 + 1 } else { -(v as i32 + 1) }))
            .collect()
    }

    /// map the final conflict from inter literals to the outside ones.
    pub(crate) fn store_final_conflict(&mut self) {
        self.conflict.clear();
        let inter_conflict = std::mem::take(&mut self.state.conflicts);
        for l in inter_conflict.iter() {
            if let Some((inter, outside)) = self
                .assumptions
                .iter()
                .find(|(i, _)| i.vi() == l.vi())
            {
                // `l` is the negation of the failing assumption
                self.conflict
                    .push(if *l == *inter { *outside } else { !*outside });
            }
        }
        self.state.conflicts = inter_conflict;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_propagation_chain_at_level0() {
        let mut s = Solver::default();
        s.new_vars(3);
        s.add_clause(&[Lit::from(1i32)], false).expect("ok");
        s.add_clause(&[Lit::from(-1i32), Lit::from(2i32)], false)
            .expect("ok");
        s.add_clause(&[Lit::from(-2i32), Lit::from(3i32)], false)
            .expect("ok");
        for vi in 0..3 {
            assert_eq!(s.asg.assign(vi), Some(true));
        }
        assert!(!s.add_clause(&[Lit::from(-3i32)], false).expect("no error"));
        assert!(!s.okay());
        // the state is sticky
        assert!(!s.add_clause(&[Lit::from(1i32)], false).expect("no error"));
    }

    #[test]
    fn test_tautology_elision() {
        let mut s = Solver::default();
        s.new_vars(2);
        s.add_clause(&[Lit::from(1i32), Lit::from(-1i32), Lit::from(2i32)], false)
            .expect("ok");
        assert_eq!(s.cdb.long_irred.len(), 0);
        assert_eq!(s.cdb.num_bin_irred, 0);
        assert!(s.undef_must_set[0]);
    }

    #[test]
    fn test_too_many_vars() {
        let mut s = Solver::default();
        s.new_vars(1);
        assert_eq!(
            s.add_clause(&[Lit::from(2i32)], false),
            Err(SolverError::TooManyVars)
        );
    }
}
