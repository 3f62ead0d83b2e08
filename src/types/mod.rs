//! Module `types` provides various building blocks, including
//! some common traits.

/// methods on flags used in Var and Clause
pub mod flags;
/// methods on literals
pub mod lit;

pub use self::{flags::*, lit::*};

pub use crate::{assign::AssignReason, cdb::ClauseRef, config::Config};

use std::fmt;

/// API for object instantiation based on `Config` and `CNFDescription`.
/// This is implemented by all the solver modules except `Config` and
/// `CNFDescription` themselves.
pub trait Instantiate {
    /// make and return an object from `Config` and `CNFDescription`.
    fn instantiate(conf: &Config, cnf: &CNFDescription) -> Self;
    /// update by a solver event.
    fn handle(&mut self, _e: SolverEvent) {}
}

/// Events that sub-modules react to.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SolverEvent {
    /// a new variable slot was allocated.
    NewVar,
    /// a variable was removed by elimination.
    Eliminate(VarId),
    /// the inter numbering was rebuilt; the payload is the new active count.
    Renumber(usize),
    /// the trail was rolled back to the root level.
    Reinitialize,
}

/// API for O(n) deletion from a list, providing `delete_unstable`.
pub trait Delete<T> {
    /// *O(n)* item deletion protocol.
    fn delete_unstable<F>(&mut self, filter: F)
    where
        F: FnMut(&T) -> bool;
}

impl<T> Delete<T> for Vec<T> {
    fn delete_unstable<F>(&mut self, filter: F)
    where
        F: FnMut(&T) -> bool,
    {
        if let Some(i) = self.iter().position(filter) {
            self.swap_remove(i);
        }
    }
}

/// Why a variable was removed from the active universe.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Removed {
    /// still active.
    #[default]
    None,
    /// removed by bounded variable elimination.
    Eliminated,
    /// substituted by an equivalent literal.
    Replaced,
    /// moved into an independently solved component.
    Decomposed,
}

/// Capture a conflict found by propagation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Conflict {
    /// a falsified binary clause, given as its two literals.
    Bin(Lit, Lit),
    /// a falsified long clause.
    Long(ClauseRef),
}

/// Return type of unit propagation.
pub type PropagationResult = Result<(), Conflict>;

/// Errors surfaced at the outer API.
#[derive(Debug, Eq, PartialEq)]
pub enum SolverError {
    /// a literal refers to a variable outside the declared universe.
    TooManyVars,
    /// clause length reached the `2^28` bound.
    TooLongClause,
    /// an inprocess strategy token outside the closed vocabulary.
    UnknownStrategy(String),
    /// a reconfigure preset key outside the catalog.
    UnknownPreset(u32),
    /// clauses were added after blocked-clause elimination altered the formula.
    AddAfterBlocking,
    /// exceptions caused by file operations.
    IOError,
    /// UNSAT with some internal context.
    Inconsistent,
    /// an internal invariant did not hold.
    SolverBug,
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A return type used by solver functions.
pub type MaybeInconsistent = Result<(), SolverError>;

/// CNF locator
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub enum CNFIndicator {
    /// not specified
    #[default]
    Void,
    /// from a file
    File(String),
    /// embedded directly
    LitVec(usize),
}

impl fmt::Display for CNFIndicator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CNFIndicator::Void => write!(f, "(no CNF specified)"),
            CNFIndicator::File(file) => write!(f, "CNF file({file})"),
            CNFIndicator::LitVec(n) => write!(f, "a vec({n} clauses)"),
        }
    }
}

/// Data storage about a problem.
#[derive(Clone, Debug, Default)]
pub struct CNFDescription {
    pub num_of_variables: usize,
    pub num_of_clauses: usize,
    pub pathname: CNFIndicator,
}

impl fmt::Display for CNFDescription {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let CNFDescription {
            num_of_variables: nv,
            num_of_clauses: nc,
            pathname: path,
        } = &self;
        write!(f, "CNF({nv}, {nc}, {path})")
    }
}

impl<V: AsRef<[i32]>> From<&[V]> for CNFDescription {
    fn from(vec: &[V]) -> Self {
        let num_of_variables = vec
            .iter()
            .map(|clause| clause.as_ref().iter().map(|l| l.abs()).max().unwrap_or(0))
            .max()
            .unwrap_or(0) as usize;
        CNFDescription {
            num_of_variables,
            num_of_clauses: vec.len(),
            pathname: CNFIndicator::LitVec(vec.len()),
        }
    }
}
