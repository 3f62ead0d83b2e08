//! The outer driver: iterate search and simplification until a verdict.
use {
    super::{reconfigure, Certificate, SatSolverIF, Solver, SolverResult},
    crate::{
        assign::AssignIF,
        cdb::ClauseDBIF,
        processor::gauss,
        searcher,
        state::{Stat, StateIF},
        types::*,
    },
};

impl Solver {
    pub(crate) fn solve_inner(&mut self) -> SolverResult {
        self.conflict.clear();
        self.state.conflicts.clear();
        self.check_config_parameters()?;
        self.conf.global_timeout_multiplier = self.conf.orig_global_timeout_multiplier;
        self.state.start = std::time::Instant::now();
        self.state.time_budget = self.conf.max_time;
        if !self.ok {
            return Ok(Certificate::UNSAT);
        }
        self.install_assumptions()?;
        if !self.ok {
            return Ok(Certificate::UNSAT);
        }
        self.state.progress_header();
        let mut status: Lbool = None;
        if self.conf.preprocess == 2 {
            status = self.load_preprocessed()?;
        }
        if status.is_none()
            && 0 < self.asg.num_vars
            && self.conf.do_simplify_problem
            && self.conf.simplify_at_startup
            && (self.state.num_simplify == 0 || self.conf.simplify_at_every_startup)
        {
            status = self.simplify_problem(!self.conf.full_simplify_at_startup)?;
        }
        if status.is_none() && self.conf.do_gauss && !self.cdb.xors.is_empty() {
            let Solver {
                ref mut asg,
                ref mut cdb,
                ref vmap,
                ref mut state,
                ..
            } = self;
            if gauss::find_and_eliminate(asg, cdb, vmap, state).is_err() {
                self.ok = false;
                status = Some(false);
            }
        }
        if status.is_none() && self.conf.preprocess == 0 {
            status = self.iterate_until_solved()?;
        }
        if self.conf.preprocess == 1 {
            self.asg.cancel_until(0);
            if status.is_none() {
                self.clean_clauses()
                    .unwrap_or_else(|_| self.ok = false);
            }
            let path = self.conf.saved_state_file.clone();
            self.save_state(&path, if self.ok { status } else { Some(false) })?;
            let cnf_path = self.conf.simplified_cnf.clone();
            self.dump_irred_cnf(&cnf_path)?;
        }
        self.handle_found_solution(status)
    }

    fn check_config_parameters(&self) -> MaybeInconsistent {
        if self.conf.short_term_history_size == 0 {
            return Err(SolverError::SolverBug);
        }
        Ok(())
    }

    fn over_budget(&self) -> bool {
        self.conf.max_confl <= self.asg.num_conflict
            || self.interrupted()
            || self.state.elapsed().map_or(true, |r| 1.0 <= r)
    }

    fn calc_num_confl_to_do_this_iter(&self, iteration_num: usize) -> isize {
        let mult = self
            .conf
            .num_conflicts_of_search_inc
            .powi(iteration_num as i32)
            .min(self.conf.num_conflicts_of_search_inc_max);
        let mut num = (self.conf.num_conflicts_of_search as f64 * mult) as isize;
        if self.conf.never_stop_search {
            num = 500_000_000;
        }
        let remaining = self
            .conf
            .max_confl
            .saturating_sub(self.asg.num_conflict)
            .min(isize::MAX as usize) as isize;
        num.min(remaining)
    }

    /// the main loop: search under a geometrically growing conflict
    /// budget, then simplify, until something gives.
    fn iterate_until_solved(&mut self) -> Result<Lbool, SolverError> {
        let mut iteration_num = 0;
        let mut status: Lbool = None;
        while status.is_none() && !self.over_budget() {
            iteration_num += 1;
            let num_confl = self.calc_num_confl_to_do_this_iter(iteration_num);
            if num_confl <= 0 {
                break;
            }
            // pull peer binaries before going back to search
            for (a, b) in self.dsync.pull_bins() {
                let lits = [Lit::from(a), Lit::from(b)];
                if !self.add_clause(&lits, true)? {
                    return Ok(Some(false));
                }
            }
            {
                let Solver {
                    ref mut asg,
                    ref mut cdb,
                    ref vmap,
                    ref mut state,
                    ref conf,
                    ref mut dsync,
                    ref assumptions,
                    ref must_interrupt,
                    ..
                } = self;
                asg.root_level = assumptions.len() as DecisionLevel;
                let assumed: Vec<Lit> = assumptions.iter().map(|(i, _)| *i).collect();
                status = searcher::solve(
                    asg,
                    cdb,
                    vmap,
                    state,
                    conf,
                    dsync,
                    &assumed,
                    num_confl as usize,
                    must_interrupt,
                )?;
            }
            self.clear_gauss();
            self.check_too_many_low_glues();
            if status.is_some() || self.over_budget() {
                break;
            }
            if self.conf.do_simplify_problem {
                status = self.simplify_problem(false)?;
            }
        }
        Ok(status)
    }

    /// one-shot lowering of the tier-0 glue cutoff when too many learnts
    /// land there.
    fn check_too_many_low_glues(&mut self) {
        if self.conf.glue_put_lev0_if_below_or_eq == 2
            || self.asg.num_conflict < self.conf.min_num_confl_adjust_glue_cutoff
            || self.state.adjusted_glue_cutoff
            || 1.0 <= self.conf.adjust_glue_if_too_many_low
        {
            return;
        }
        let perc = self.state[Stat::LearntTier0] as f64 / self.asg.num_conflict.max(1) as f64;
        if self.conf.adjust_glue_if_too_many_low < perc {
            self.conf.glue_put_lev0_if_below_or_eq -= 1;
            self.cdb.glue_tier0 = self.conf.glue_put_lev0_if_below_or_eq;
            self.state.adjusted_glue_cutoff = true;
            self.state.flush(format!(
                "adjusted glue cutoff to {} ({}% low glues)",
                self.conf.glue_put_lev0_if_below_or_eq,
                (perc * 100.0) as usize
            ));
        }
    }

    pub(crate) fn clear_gauss(&mut self) {
        // the matrices are rebuilt from the XOR store on demand; nothing
        // outlives an iteration
    }

    /// The function that brings together almost all CNF simplifications.
    pub(crate) fn simplify_problem(&mut self, startup: bool) -> Result<Lbool, SolverError> {
        debug_assert!(self.ok);
        debug_assert_eq!(self.asg.decision_level(), 0);
        self.asg.clear_order();
        let strategy = if startup {
            self.conf.simplify_schedule_startup.clone()
        } else {
            self.conf.simplify_schedule_nonstartup.clone()
        };
        self.execute_inprocess_strategy(startup, &strategy)?;
        self.cdb.free_unused_watches();
        self.conf.global_timeout_multiplier = (self.conf.global_timeout_multiplier
            * self.conf.global_timeout_multiplier_multiplier)
            .min(self.conf.orig_global_timeout_multiplier
                * self.conf.global_multiplier_multiplier_max);
        if self.ok
            && 2 < self.asg.num_vars
            && (1 < self.cdb.long_irred.len()
                || 0 < self.cdb.num_bin_irred + self.cdb.num_bin_red)
            && self.state.num_simplify == self.conf.reconfigure_at
        {
            let val = if self.conf.reconfigure_val == 100 {
                reconfigure::features_to_reconf(self)
            } else {
                self.conf.reconfigure_val
            };
            if val != 0 {
                self.reconfigure(val)?;
            }
        }
        self.state.num_simplify += 1;
        self.state[Stat::Simplification] += 1;
        if !self.ok {
            return Ok(Some(false));
        }
        self.asg.rebuild_order();
        {
            let Solver {
                ref asg,
                ref cdb,
                ref mut state,
                ..
            } = self;
            state.progress(asg, cdb, Some("simplified"));
        }
        Ok(None)
    }

    /// SAT: build the final model; UNSAT: map the conflict out.
    fn handle_found_solution(&mut self, status: Lbool) -> SolverResult {
        match status {
            Some(true) => {
                let trail_above: Vec<VarId> = self
                    .asg
                    .stack_range(self.asg.len_upto(0)..self.asg.stack_len())
                    .iter()
                    .map(|l| l.vi())
                    .collect();
                self.extend_solution();
                if self.conf.greedy_undef {
                    self.undefine(&trail_above);
                }
                self.asg.cancel_until(0);
                Ok(Certificate::SAT(self.dimacs_model()))
            }
            Some(false) => {
                self.asg.cancel_until(0);
                // a refutation independent of the assumptions is terminal
                if self.state.conflicts.is_empty() {
                    self.ok = false;
                }
                self.store_final_conflict();
                Ok(Certificate::UNSAT)
            }
            None => {
                self.asg.cancel_until(0);
                Ok(Certificate::UNKNOWN)
            }
        }
    }
}
