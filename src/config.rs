/// Crate `config` provides the solver's configuration and CLI.
use {std::path::PathBuf, std::str::FromStr, structopt::StructOpt};

/// Restart schedule selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RestartType {
    Luby,
    Geom,
}

impl FromStr for RestartType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "luby" => Ok(RestartType::Luby),
            "geom" => Ok(RestartType::Geom),
            _ => Err(format!("unknown restart type: {s}")),
        }
    }
}

/// Decision polarity selector.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PolarityMode {
    Positive,
    Negative,
    Saved,
}

impl FromStr for PolarityMode {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pos" | "positive" => Ok(PolarityMode::Positive),
            "neg" | "negative" => Ok(PolarityMode::Negative),
            "saved" => Ok(PolarityMode::Saved),
            _ => Err(format!("unknown polarity mode: {s}")),
        }
    }
}

/// Configuration built from command line options.
#[derive(Clone, Debug, StructOpt)]
#[structopt(name = "paritysat", about, author)]
pub struct Config {
    //
    //## I/O configuration
    //
    /// CNF file in DIMACS format
    #[structopt(parse(from_os_str), default_value = "")]
    pub cnf_file: PathBuf,

    /// Output directory
    #[structopt(long = "dir", short = "o", default_value = ".", parse(from_os_str))]
    pub output_dir: PathBuf,

    /// Cert. file in DRAT format
    #[structopt(long = "proof", default_value = "proof.out", short = "p", parse(from_os_str))]
    pub proof_file: PathBuf,

    /// Writes a DRAT UNSAT certification file
    #[structopt(long = "certify", short = "c")]
    pub use_certification: bool,

    /// Disable any progress message
    #[structopt(long = "quiet", short = "q")]
    pub quiet_mode: bool,

    /// Result filename/stdout
    #[structopt(long = "result", short = "r", default_value = "", parse(from_os_str))]
    pub result_file: PathBuf,

    //
    //## resource limits
    //
    /// CPU time limit in sec.
    #[structopt(long = "timeout", short = "t", default_value = "5000.0")]
    pub max_time: f64,

    /// Conflict limit
    #[structopt(long = "maxconfl", default_value = "18446744073709551615")]
    pub max_confl: usize,

    //
    //## search
    //
    /// Conflicts allotted to the first search iteration
    #[structopt(long = "firstconfl", default_value = "50000")]
    pub num_conflicts_of_search: usize,

    /// Growth of the per-iteration conflict budget
    #[structopt(long = "confl-inc", default_value = "1.4")]
    pub num_conflicts_of_search_inc: f64,

    /// Cap on the growth multiplier
    #[structopt(long = "confl-inc-max", default_value = "3.0")]
    pub num_conflicts_of_search_inc_max: f64,

    /// Never interrupt search for simplification
    #[structopt(skip)]
    pub never_stop_search: bool,

    /// #conflicts between restarts
    #[structopt(long = "rfirst", default_value = "100")]
    pub restart_first: usize,

    /// Geometric restart growth
    #[structopt(long = "rinc", default_value = "1.5")]
    pub restart_inc: f64,

    /// Restart schedule: luby or geom
    #[structopt(long = "rtype", default_value = "luby")]
    pub restart_type: RestartType,

    /// Decision polarity: pos, neg or saved
    #[structopt(long = "polarity", default_value = "saved")]
    pub polarity_mode: PolarityMode,

    /// Var activity decay
    #[structopt(long = "vdecay", default_value = "0.95")]
    pub var_decay: f64,

    /// Var activity decay target after adaptation
    #[structopt(long = "vdecaymax", default_value = "0.95")]
    pub var_decay_max: f64,

    /// Window of the short-term glue history
    #[structopt(long = "gluehist", default_value = "100")]
    pub short_term_history_size: usize,

    //
    //## clause database
    //
    /// A learnt with glue at or below this is kept forever
    #[structopt(long = "gluecut0", default_value = "3")]
    pub glue_put_lev0_if_below_or_eq: u32,

    /// .. and below this is kept at mid-tier (0 disables the tier)
    #[structopt(long = "gluecut1", default_value = "6")]
    pub glue_put_lev1_if_below_or_eq: u32,

    /// Lower the tier-0 glue cutoff if this ratio of learnts lands there
    #[structopt(skip = 0.65f64)]
    pub adjust_glue_if_too_many_low: f64,

    /// Don't adjust the cutoff before this many conflicts
    #[structopt(skip = 150_000usize)]
    pub min_num_confl_adjust_glue_cutoff: usize,

    /// Soft cap on tier-2 learnts before a reduction
    #[structopt(long = "maxred", default_value = "30000")]
    pub max_temp_lev2_learnt_clauses: usize,

    /// Growth of the tier-2 cap after each reduction
    #[structopt(skip = 1.04f64)]
    pub inc_max_temp_lev2_red_cls: f64,

    /// Fraction of tier 2 kept by glue at a reduction
    #[structopt(skip = 0.5f64)]
    pub ratio_keep_clauses_glue: f64,

    /// Fraction of tier 2 kept by recency at a reduction
    #[structopt(skip = 0.2f64)]
    pub ratio_keep_clauses_recent: f64,

    //
    //## simplification
    //
    /// Inprocessing switch
    #[structopt(skip = true)]
    pub do_simplify_problem: bool,

    /// Simplify before the first search iteration
    #[structopt(skip = true)]
    pub simplify_at_startup: bool,

    /// Simplify at the start of every solve call
    #[structopt(skip)]
    pub simplify_at_every_startup: bool,

    /// Use the nonstartup schedule even on startup
    #[structopt(skip)]
    pub full_simplify_at_startup: bool,

    /// Strategy executed on the first simplification
    #[structopt(
        long = "schedule0",
        default_value = "sub-impl, occ-backw-sub-str, occ-bve, occ-gauss, scc-vrepl, sub-impl, str-impl"
    )]
    pub simplify_schedule_startup: String,

    /// Strategy executed on later simplifications
    #[structopt(
        long = "schedule",
        default_value = "handle-comps, scc-vrepl, cache-clean, cache-tryboth, sub-impl, intree-probe, probe, sub-str-cls-with-bin, distill-cls, str-impl, check-cache-size, renumber, occ-backw-sub-str, occ-bve, occ-gauss, find-comps, handle-comps"
    )]
    pub simplify_schedule_nonstartup: String,

    /// Base multiplier for simplifier budgets
    #[structopt(skip = 2.0f64)]
    pub orig_global_timeout_multiplier: f64,

    /// Live multiplier; inflated geometrically between rounds
    #[structopt(skip = 2.0f64)]
    pub global_timeout_multiplier: f64,

    /// Inflation applied after each simplification
    #[structopt(skip = 1.1f64)]
    pub global_timeout_multiplier_multiplier: f64,

    /// Cap, as a multiple of the base multiplier
    #[structopt(skip = 3.0f64)]
    pub global_multiplier_multiplier_max: f64,

    /// Run the reconfiguration hook at this simplification count
    #[structopt(skip = 2usize)]
    pub reconfigure_at: usize,

    /// Preset to install; 0 is off, 100 derives one from features
    #[structopt(long = "reconf", default_value = "0")]
    pub reconfigure_val: u32,

    //
    //## feature gates
    //
    /// Failed-literal probing switch
    #[structopt(skip = true)]
    pub do_probe: bool,

    /// In-tree probing switch
    #[structopt(skip = true)]
    pub do_intree_probe: bool,

    /// Component handling switch
    #[structopt(skip = true)]
    pub do_comp_handler: bool,

    /// Implicit subsumption/strengthening switch
    #[structopt(skip = true)]
    pub do_str_sub_implicit: bool,

    /// Implication cache switch
    #[structopt(skip = true)]
    pub do_cache: bool,

    /// Stamping switch; the stamping structure itself is not carried
    #[structopt(skip)]
    pub do_stamp: bool,

    /// Occurrence-based simplification switch
    #[structopt(skip = true)]
    pub perform_occur_based_simp: bool,

    /// Clause distillation switch
    #[structopt(skip = true)]
    pub do_distill_clauses: bool,

    /// Variable renumbering switch
    #[structopt(skip = true)]
    pub do_renumber_vars: bool,

    /// Equivalent-literal replacement switch
    #[structopt(skip = true)]
    pub do_find_and_replace_eq_lits: bool,

    /// Gaussian XOR reasoning switch
    #[structopt(skip = true)]
    pub do_gauss: bool,

    //
    //## simplifier limits
    //
    /// Max #lit for clause subsume
    #[structopt(long = "ecl", default_value = "100")]
    pub elim_cls_lim: usize,

    /// Max #cls for var elimination
    #[structopt(long = "evo", default_value = "10000")]
    pub elim_var_occ: usize,

    /// Grow limit of #cls in var elim.
    #[structopt(long = "evl", default_value = "0")]
    pub elim_grw_lim: usize,

    /// Free-var count below which components are searched
    #[structopt(skip = 1_000_000usize)]
    pub comp_var_limit: usize,

    /// Largest component solved independently
    #[structopt(skip = 100usize)]
    pub comp_size_limit: usize,

    /// Earliest simplification round that handles components
    #[structopt(skip = 2usize)]
    pub handler_from_simp_num: usize,

    /// Propagation budget of one probing round
    #[structopt(skip = 2_000_000usize)]
    pub probe_propagation_limit: usize,

    /// Propagation budget of one distillation round
    #[structopt(skip = 1_000_000usize)]
    pub distill_propagation_limit: usize,

    /// Implication cache memory budget in MB
    #[structopt(skip = 2048usize)]
    pub max_cache_size_mb: usize,

    //
    //## model post-processing
    //
    /// Unset variables not needed by the model
    #[structopt(long = "undef")]
    pub greedy_undef: bool,

    /// Caller-declared independent variables (outside numbering)
    #[structopt(skip)]
    pub independent_vars: Option<Vec<u32>>,

    //
    //## preprocessing mode
    //
    /// 0: solve, 1: preprocess and save, 2: load and finish
    #[structopt(long = "preproc", default_value = "0")]
    pub preprocess: usize,

    /// Solver-state file for the preprocessing mode
    #[structopt(long = "savedstate", default_value = "state.dat", parse(from_os_str))]
    pub saved_state_file: PathBuf,

    /// Solution file read back in mode 2
    #[structopt(long = "solution", default_value = "", parse(from_os_str))]
    pub solution_file: PathBuf,

    /// Simplified CNF written in mode 1
    #[structopt(long = "simplified", default_value = "simplified.cnf", parse(from_os_str))]
    pub simplified_cnf: PathBuf,
}

impl Default for Config {
    fn default() -> Config {
        Config::from_iter::<[std::ffi::OsString; 1]>([std::ffi::OsString::from("paritysat")])
    }
}

impl<T> From<T> for Config
where
    PathBuf: From<T>,
{
    fn from(path: T) -> Config {
        Config {
            cnf_file: PathBuf::from(path),
            ..Config::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let conf = Config::default();
        assert!(conf.do_simplify_problem);
        assert_eq!(conf.glue_put_lev0_if_below_or_eq, 3);
        assert_eq!(conf.restart_type, RestartType::Luby);
        assert_eq!(conf.polarity_mode, PolarityMode::Saved);
        assert!(conf.independent_vars.is_none());
    }

    #[test]
    fn test_from_path() {
        let conf = Config::from("tests/cnfs/sample.cnf");
        assert_eq!(conf.cnf_file, PathBuf::from("tests/cnfs/sample.cnf"));
    }
}
