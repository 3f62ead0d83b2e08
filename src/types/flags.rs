use bitflags::bitflags;

/// API for object properties.
pub trait FlagIF {
    type FlagType;
    /// return true if the flag is on.
    fn is(&self, flag: Self::FlagType) -> bool;
    /// set the flag.
    fn set(&mut self, f: Self::FlagType, b: bool);
    /// toggle the flag off.
    fn turn_off(&mut self, flag: Self::FlagType);
    /// toggle the flag on.
    fn turn_on(&mut self, flag: Self::FlagType);
}

bitflags! {
    /// Misc flags used by [`Clause`](`crate::cdb::Clause`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
    pub struct FlagClause: u8 {
        /// a clause derived by conflict analysis; removable.
        const LEARNT       = 0b0000_0001;
        /// a clause that lost literals since its creation.
        const STRENGTHENED = 0b0000_0010;
        /// a clause scheduled for removal; detached but not yet freed.
        const REMOVED      = 0b0000_0100;
        /// the slot is on the arena free list.
        const FREED        = 0b0000_1000;
        /// a clause registered in the occurrence lists.
        const OCCUR_LINKED = 0b0001_0000;
        /// used during the current conflict analysis.
        const USED         = 0b0010_0000;
    }
}

bitflags! {
    /// Misc flags used by [`Var`](`crate::assign::Var`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
    pub struct FlagVar: u8 {
        /// the previously assigned value of a Var.
        const PHASE    = 0b0000_0001;
        /// a var is checked during the current conflict analysis.
        const CA_SEEN  = 0b0000_0010;
        /// a var is enqueued for the occurrence simplifier.
        const ENQUEUED = 0b0000_0100;
    }
}
