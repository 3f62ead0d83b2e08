//! The tokenized inprocess strategy executor.
use {
    super::Solver,
    crate::{
        assign::AssignIF,
        processor::{comp, distill, gauss, probe, replace, subsume, EliminateIF},
        state::StateIF,
        types::*,
    },
};

/// Map a refutation found during simplification onto the sticky flag;
/// every other error keeps propagating.
macro_rules! absorb {
    ($self: expr, $res: expr) => {
        match $res {
            Ok(v) => v,
            Err(SolverError::Inconsistent) => {
                $self.ok = false;
                return Ok(());
            }
            Err(e) => return Err(e),
        }
    };
}

impl Solver {
    fn scheduler_exhausted(&self) -> bool {
        self.conf.max_confl <= self.asg.num_conflict
            || self.state.elapsed().map_or(true, |r| 1.0 <= r)
            || self.interrupted()
            || self.asg.num_vars == 0
            || !self.ok
    }

    /// inter-indexed variables the simplifiers must not touch.
    fn frozen_vars(&self) -> Vec<bool> {
        let mut frozen = vec![false; self.asg.num_slots()];
        for (inter, _) in self.assumptions.iter() {
            frozen[inter.vi() as usize] = true;
        }
        frozen
    }

    fn flush_occ_tokens(&mut self, occ_tokens: &mut String) -> MaybeInconsistent {
        if self.conf.perform_occur_based_simp {
            let tokens = occ_tokens.trim().to_string();
            self.state
                .flush(format!("--> executing occ strategy tokens: '{tokens}'"));
            let frozen = self.frozen_vars();
            let r = {
                let Solver {
                    ref mut asg,
                    ref mut cdb,
                    ref vmap,
                    ref mut occ,
                    ref mut state,
                    ref conf,
                    ..
                } = self;
                occ.simplify(asg, cdb, vmap, state, conf, &frozen, &tokens)
            };
            absorb!(self, r);
            if self.ok && tokens.contains("occ-gauss") {
                let r = {
                    let Solver {
                        ref mut asg,
                        ref mut cdb,
                        ref vmap,
                        ref mut state,
                        ..
                    } = self;
                    gauss::find_and_eliminate(asg, cdb, vmap, state)
                };
                absorb!(self, r);
            }
        }
        occ_tokens.clear();
        Ok(())
    }

    /// Execute a comma-separated strategy string. `occ-*` tokens are
    /// buffered and flushed as one combined simplifier invocation right
    /// before the next token of another kind runs.
    pub(crate) fn execute_inprocess_strategy(
        &mut self,
        _startup: bool,
        strategy: &str,
    ) -> MaybeInconsistent {
        let mut occ_tokens = String::new();
        let with_sentinel = format!("{strategy}, ");
        for raw in with_sentinel.split(',') {
            if self.scheduler_exhausted() {
                return Ok(());
            }
            let token = raw.trim().to_lowercase();
            if !token.starts_with("occ") && !token.is_empty() {
                self.state
                    .flush(format!("--> executing strategy token: {token}"));
            }
            if !occ_tokens.is_empty() && !token.starts_with("occ") {
                self.flush_occ_tokens(&mut occ_tokens)?;
                if self.scheduler_exhausted() {
                    return Ok(());
                }
            }
            match token.as_str() {
                "find-comps" => {
                    if self.get_num_free_vars() < self.conf.comp_var_limit {
                        let n = comp::find_components(&self.asg, &self.cdb).len();
                        self.state.flush(format!("{n} component(s) found"));
                    }
                }
                "handle-comps" => {
                    if self.conf.do_comp_handler
                        && self.get_num_free_vars() < self.conf.comp_var_limit
                        && self.conf.handler_from_simp_num <= self.state.num_simplify
                        && self.state.num_simplify % 2 == 0
                    {
                        let frozen = self.frozen_vars();
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut comps,
                                ref mut state,
                                ref conf,
                                ..
                            } = self;
                            comps.handle_components(asg, cdb, vmap, state, conf, &frozen)
                        };
                        absorb!(self, r);
                    }
                }
                "scc-vrepl" => {
                    if self.conf.do_find_and_replace_eq_lits {
                        let frozen = self.frozen_vars();
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut replacer,
                                ref mut occ,
                                ref mut state,
                                ..
                            } = self;
                            replace::scc_and_replace(asg, cdb, vmap, replacer, occ, state, &frozen)
                        };
                        absorb!(self, r);
                    }
                }
                "cache-clean" => {
                    if self.conf.do_cache {
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut cache,
                                ..
                            } = self;
                            cache.clean(asg, cdb, vmap)
                        };
                        absorb!(self, r);
                    }
                }
                "cache-tryboth" => {
                    if self.conf.do_cache {
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut cache,
                                ref mut state,
                                ..
                            } = self;
                            cache.try_both(asg, cdb, vmap, state)
                        };
                        absorb!(self, r);
                    }
                }
                "sub-impl" => {
                    if self.conf.do_str_sub_implicit {
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut state,
                                ..
                            } = self;
                            subsume::subsume_implicit(asg, cdb, vmap, state)
                        };
                        absorb!(self, r);
                    }
                }
                "intree-probe" => {
                    if self.conf.do_intree_probe {
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut state,
                                ref conf,
                                ..
                            } = self;
                            probe::intree_probe(asg, cdb, vmap, state, conf)
                        };
                        absorb!(self, r);
                    }
                }
                "probe" => {
                    if self.conf.do_probe {
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut state,
                                ref conf,
                                ..
                            } = self;
                            probe::probe(asg, cdb, vmap, state, conf)
                        };
                        absorb!(self, r);
                    }
                }
                "sub-str-cls-with-bin" => {
                    if self.conf.do_distill_clauses {
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut occ,
                                ref mut state,
                                ..
                            } = self;
                            distill::sub_str_with_bin(asg, cdb, vmap, occ, state)
                        };
                        absorb!(self, r);
                    }
                }
                "distill-cls" => {
                    if self.conf.do_distill_clauses {
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut state,
                                ref conf,
                                ..
                            } = self;
                            distill::distill(asg, cdb, vmap, state, conf)
                        };
                        absorb!(self, r);
                    }
                }
                "str-impl" => {
                    if self.conf.do_str_sub_implicit {
                        let r = {
                            let Solver {
                                ref mut asg,
                                ref mut cdb,
                                ref vmap,
                                ref mut state,
                                ..
                            } = self;
                            subsume::str_implicit(asg, cdb, vmap, state)
                        };
                        absorb!(self, r);
                    }
                }
                "check-cache-size" => {
                    if self.conf.do_cache {
                        let mb = self.cache.mem_used() / (1024 * 1024);
                        if self.conf.max_cache_size_mb < mb {
                            self.state.flush(format!(
                                "turning off the cache, {mb} MB is over the limit"
                            ));
                            self.cache.free();
                            self.conf.do_cache = false;
                        }
                    }
                }
                "renumber" | "must-renumber" => {
                    if self.conf.do_renumber_vars {
                        // clean the cache to a fixpoint first; renumbering
                        // with stale cached literals corrupts it
                        if self.conf.do_cache {
                            loop {
                                let r = {
                                    let Solver {
                                        ref mut asg,
                                        ref mut cdb,
                                        ref vmap,
                                        ref mut cache,
                                        ..
                                    } = self;
                                    cache.clean(asg, cdb, vmap)
                                };
                                let set_something = absorb!(self, r);
                                if !set_something {
                                    break;
                                }
                            }
                        }
                        let r = self.renumber_variables(token == "must-renumber");
                        absorb!(self, r);
                    }
                }
                "" => (),
                t if t.starts_with("occ") => {
                    occ_tokens.push_str(t);
                    occ_tokens.push_str(", ");
                }
                t => {
                    return Err(SolverError::UnknownStrategy(t.to_string()));
                }
            }
            if !self.ok {
                return Ok(());
            }
        }
        Ok(())
    }
}
