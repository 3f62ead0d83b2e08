//! `paritysat` is a CDCL SAT solver with XOR constraint reasoning and
//! inprocessing, written in Rust.
/// assignment, trail and propagation
pub mod assign;
/// clause database
pub mod cdb;
/// DIMACS input and solution-line parsing
pub mod cnf;
/// solver configuration and CLI
pub mod config;
/// shared-clause gossip channel
pub mod datasync;
/// simplification techniques
pub mod processor;
/// the CDCL search engine
pub mod searcher;
/// struct Solver
pub mod solver;
/// stats and progress reporting
pub mod state;
/// plumbing layer
pub mod types;
/// the outside/outer/inter variable namespaces
pub mod vmap;
