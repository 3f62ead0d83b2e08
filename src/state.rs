//! Solver statistics and progress reporting.
use {
    crate::{assign::AssignStack, cdb::ClauseDB, types::*},
    std::{
        fmt,
        ops::{Index, IndexMut},
        time::Instant,
    },
};

/// stat index
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stat {
    Conflict = 0,
    Decision,
    Restart,
    Propagation,
    Reduction,
    Simplification,
    LearntTier0,
    SubsumedClause,
    StrengthenedClause,
    EliminatedVar,
    ReplacedVar,
    DecomposedVar,
    ProbedFailure,
    CacheUnit,
    GaussUnit,
    DistilledLit,
    EndOfStatIndex,
}

/// API for state, providing the progress report.
pub trait StateIF {
    /// return an elapsed fraction of the time budget, or `None` on a
    /// clock failure.
    fn elapsed(&self) -> Option<f64>;
    /// write a header before progress lines.
    fn progress_header(&mut self);
    /// print a one-shot message.
    fn flush<S: AsRef<str>>(&self, mes: S);
    /// print the current progress.
    fn progress(&mut self, asg: &AssignStack, cdb: &ClauseDB, mes: Option<&str>);
}

/// Miscellaneous data holder.
#[derive(Clone, Debug)]
pub struct State {
    pub stats: [usize; Stat::EndOfStatIndex as usize],
    /// the short-term average glue of learnt clauses.
    pub ema_glue: Ema,
    /// the number of finished simplification rounds.
    pub num_simplify: usize,
    /// set after the one-shot glue-cutoff adjustment fired.
    pub adjusted_glue_cutoff: bool,
    /// scratch for conflict analysis.
    pub new_learnt: Vec<Lit>,
    /// the final conflict over assumption literals, in inter numbering.
    pub conflicts: Vec<Lit>,
    pub start: Instant,
    pub time_budget: f64,
    pub quiet: bool,
    pub target: CNFDescription,
    progress_cnt: usize,
}

impl Default for State {
    fn default() -> State {
        State {
            stats: [0; Stat::EndOfStatIndex as usize],
            ema_glue: Ema::new(100),
            num_simplify: 0,
            adjusted_glue_cutoff: false,
            new_learnt: Vec::new(),
            conflicts: Vec::new(),
            start: Instant::now(),
            time_budget: f64::MAX,
            quiet: true,
            target: CNFDescription::default(),
            progress_cnt: 0,
        }
    }
}

impl Index<Stat> for State {
    type Output = usize;
    #[inline]
    fn index(&self, i: Stat) -> &usize {
        &self.stats[i as usize]
    }
}

impl IndexMut<Stat> for State {
    #[inline]
    fn index_mut(&mut self, i: Stat) -> &mut usize {
        &mut self.stats[i as usize]
    }
}

impl Instantiate for State {
    fn instantiate(config: &Config, cnf: &CNFDescription) -> State {
        State {
            ema_glue: Ema::new(config.short_term_history_size),
            time_budget: config.max_time,
            quiet: config.quiet_mode,
            target: cnf.clone(),
            ..State::default()
        }
    }
}

impl StateIF for State {
    fn elapsed(&self) -> Option<f64> {
        Some(self.start.elapsed().as_secs_f64() / self.time_budget)
    }
    fn progress_header(&mut self) {
        if self.quiet {
            return;
        }
        println!("c {:<43}", self.target.to_string());
        println!("c {:>12} {:>12} {:>12} {:>9} {:>9} {:>9}",
                 "conflict", "decision", "propagate", "remain", "fixed", "elim");
    }
    fn flush<S: AsRef<str>>(&self, mes: S) {
        if !self.quiet {
            println!("c {}", mes.as_ref());
        }
    }
    fn progress(&mut self, asg: &AssignStack, cdb: &ClauseDB, mes: Option<&str>) {
        if self.quiet {
            return;
        }
        self.progress_cnt += 1;
        self.stats[Stat::Propagation as usize] = asg.num_propagation;
        let fixed = asg.num_asserted();
        let elim = self[Stat::EliminatedVar] + self[Stat::ReplacedVar] + self[Stat::DecomposedVar];
        println!(
            "c {:>12} {:>12} {:>12} {:>9} {:>9} {:>9} | cls {:>8} red {:>8} bin {:>7}{}",
            self[Stat::Conflict],
            self[Stat::Decision],
            self[Stat::Propagation],
            asg.num_vars.saturating_sub(fixed + elim),
            fixed,
            elim,
            cdb.long_irred.len(),
            cdb.long_red.iter().map(|t| t.len()).sum::<usize>(),
            cdb.num_bin_irred + cdb.num_bin_red,
            mes.map_or(String::new(), |m| format!(" | {m}")),
        );
    }
}

/// Exponential moving average.
#[derive(Clone, Debug)]
pub struct Ema {
    val: f64,
    cal: f64,
    sca: f64,
}

impl Ema {
    pub fn new(s: usize) -> Ema {
        Ema {
            val: 0.0,
            cal: 0.0,
            sca: 1.0 / (s as f64),
        }
    }
    pub fn update(&mut self, x: f64) {
        self.val = self.sca * x + (1.0 - self.sca) * self.val;
        self.cal = self.sca + (1.0 - self.sca) * self.cal;
    }
    pub fn get(&self) -> f64 {
        if self.cal == 0.0 {
            0.0
        } else {
            self.val / self.cal
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ema_converges() {
        let mut e = Ema::new(4);
        for _ in 0..100 {
            e.update(2.0);
        }
        assert!((e.get() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_stat_index() {
        let mut s = State::default();
        s[Stat::Conflict] += 3;
        assert_eq!(s[Stat::Conflict], 3);
    }
}
