//! The reconfigurator: a fixed catalog of configuration presets keyed by
//! a small integer, picked from extracted formula features.
use {
    super::Solver,
    crate::{
        config::{PolarityMode, RestartType},
        state::StateIF,
        types::*,
    },
};

impl Solver {
    /// Install one of the presets {3, 4, 6, 7, 12, 13, 14, 15}.
    pub fn reconfigure(&mut self, val: u32) -> MaybeInconsistent {
        match val {
            3 => {
                // glue-based clause cleaning
                self.conf.glue_put_lev1_if_below_or_eq = 0;
                self.conf.adjust_glue_if_too_many_low = 0.0;
                self.conf.ratio_keep_clauses_recent = 0.0;
                self.conf.ratio_keep_clauses_glue = 0.5;
                self.conf.inc_max_temp_lev2_red_cls = 1.03;
                self.reset_temp_cl_num();
            }
            4 => {
                self.conf.glue_put_lev1_if_below_or_eq = 0;
                self.conf.max_temp_lev2_learnt_clauses = 10_000;
                self.reset_temp_cl_num();
            }
            6 => {
                // no more simplifying
                self.conf.never_stop_search = true;
            }
            7 => {
                // geometric restarts but keep the low-glue clauses
                self.conf.restart_type = RestartType::Geom;
                self.conf.polarity_mode = PolarityMode::Negative;
                self.conf.glue_put_lev1_if_below_or_eq = 0;
                self.conf.inc_max_temp_lev2_red_cls = 1.02;
                self.reset_temp_cl_num();
            }
            12 => {
                // a mix of clause-keeping criteria
                self.conf.glue_put_lev0_if_below_or_eq = 2;
                self.conf.glue_put_lev1_if_below_or_eq = 4;
                self.conf.ratio_keep_clauses_glue = 0.1;
                self.conf.ratio_keep_clauses_recent = 0.3;
                self.conf.inc_max_temp_lev2_red_cls = 1.04;
                self.conf.var_decay_max = 0.90;
                self.update_var_decay();
                self.reset_temp_cl_num();
            }
            13 => {
                self.conf.orig_global_timeout_multiplier = 5.0;
                self.conf.global_timeout_multiplier = 5.0;
                self.conf.global_multiplier_multiplier_max = 5.0;
                self.conf.num_conflicts_of_search_inc = 1.15;
                self.conf.max_temp_lev2_learnt_clauses = 10_000;
                self.conf.var_decay_max = 0.99;
                self.update_var_decay();
            }
            14 => {
                self.conf.short_term_history_size = 600;
                self.state.ema_glue = crate::state::Ema::new(600);
            }
            15 => {
                // like the earliest MiniSat
                self.conf.restart_type = RestartType::Geom;
                self.conf.polarity_mode = PolarityMode::Negative;
                self.conf.glue_put_lev1_if_below_or_eq = 0;
                self.conf.glue_put_lev0_if_below_or_eq = 0;
                self.conf.inc_max_temp_lev2_red_cls = 1.02;
                self.conf.ratio_keep_clauses_glue = 0.0;
                self.conf.ratio_keep_clauses_recent = 0.5;
                self.reset_temp_cl_num();
            }
            _ => {
                return Err(SolverError::UnknownPreset(val));
            }
        }
        self.sync_clause_db_config();
        self.state
            .flush(format!("reconfigured solver to config {val}"));
        Ok(())
    }

    fn reset_temp_cl_num(&mut self) {
        self.cdb.max_tier2 = self.conf.max_temp_lev2_learnt_clauses;
    }
    fn update_var_decay(&mut self) {
        self.conf.var_decay = self.conf.var_decay_max;
        self.asg.update_activity_decay(self.conf.var_decay);
    }
    fn sync_clause_db_config(&mut self) {
        self.cdb.glue_tier0 = self.conf.glue_put_lev0_if_below_or_eq;
        self.cdb.glue_tier1 = self.conf.glue_put_lev1_if_below_or_eq;
        self.cdb.inc_max_tier2 = self.conf.inc_max_temp_lev2_red_cls;
        self.cdb.ratio_keep_glue = self.conf.ratio_keep_clauses_glue;
        self.cdb.ratio_keep_recent = self.conf.ratio_keep_clauses_recent;
    }
}

/// Map extracted formula features onto a preset key.
pub fn features_to_reconf(solver: &Solver) -> u32 {
    let nv = solver.asg.num_vars.max(1);
    let bins = solver.cdb.num_bin_irred + solver.cdb.num_bin_red;
    let longs = solver.cdb.long_irred.len().max(1);
    let cls = bins + longs;
    let cls_per_var = cls as f64 / nv as f64;
    let bin_ratio = bins as f64 / cls.max(1) as f64;
    let avg_glue = solver.state.ema_glue.get();
    if !solver.cdb.xors.is_empty() {
        // XOR-heavy instances profit from undisturbed search
        6
    } else if 0.7 < bin_ratio {
        7
    } else if cls_per_var < 2.0 {
        13
    } else if 10.0 < avg_glue {
        12
    } else if 20.0 < cls_per_var {
        3
    } else {
        4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::Solver;

    #[test]
    fn test_known_presets_apply() {
        for val in [3u32, 4, 6, 7, 12, 13, 14, 15].iter() {
            let mut s = Solver::default();
            assert_eq!(s.reconfigure(*val), Ok(()));
        }
    }

    #[test]
    fn test_unknown_preset_is_fatal() {
        let mut s = Solver::default();
        assert_eq!(s.reconfigure(5), Err(SolverError::UnknownPreset(5)));
    }

    #[test]
    fn test_preset_12_changes_tiers() {
        let mut s = Solver::default();
        s.reconfigure(12).expect("known preset");
        assert_eq!(s.cdb.glue_tier0, 2);
        assert_eq!(s.cdb.glue_tier1, 4);
        assert_eq!(s.conf.var_decay, 0.90);
    }
}
