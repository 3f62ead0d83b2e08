//! The three-level variable namespace.
//!
//! - **outside**: the caller's dense numbering, no synthetic variables.
//! - **outer**: outside plus BVA variables, in creation order.
//! - **inter**: a permutation of outer where active variables occupy a
//!   dense prefix `0..num_inter` after a renumbering.
use crate::types::*;

const NON_OUTSIDE: VarId = VarId::MAX;

/// Dense maps between the outside, outer and inter numberings.
#[derive(Clone, Debug, Default)]
pub struct VarMap {
    outer_to_inter: Vec<VarId>,
    inter_to_outer: Vec<VarId>,
    /// outer-indexed; `true` for synthetic variables.
    outer_is_bva: Vec<bool>,
    outside_to_outer: Vec<VarId>,
    /// `NON_OUTSIDE` for BVA variables.
    outer_to_outside: Vec<VarId>,
    /// the active prefix length of the inter numbering.
    num_inter: usize,
}

impl Instantiate for VarMap {
    fn instantiate(_conf: &Config, cnf: &CNFDescription) -> Self {
        let mut m = VarMap::default();
        for _ in 0..cnf.num_of_variables {
            m.push_var(false);
        }
        m
    }
}

impl VarMap {
    /// the number of outer (and inter) slots.
    pub fn num_outer(&self) -> usize {
        self.outer_to_inter.len()
    }
    /// the number of caller-visible variables.
    pub fn num_outside(&self) -> usize {
        self.outside_to_outer.len()
    }
    /// the active prefix length, i.e. the searchable variable count.
    pub fn num_inter(&self) -> usize {
        self.num_inter
    }
    pub fn is_bva(&self, outer: VarId) -> bool {
        self.outer_is_bva[outer as usize]
    }

    /// append a fresh variable identically numbered in all three levels
    /// (minus the outside level for a BVA variable). Returns the outer id.
    pub fn push_var(&mut self, bva: bool) -> VarId {
        let outer = self.push_var_raw(bva);
        self.num_inter += 1;
        outer
    }

    /// append the slot without widening the active prefix; the caller
    /// follows up with `promote_to_active`.
    pub fn push_var_raw(&mut self, bva: bool) -> VarId {
        let outer = self.outer_to_inter.len() as VarId;
        self.outer_to_inter.push(outer);
        self.inter_to_outer.push(outer);
        self.outer_is_bva.push(bva);
        if bva {
            self.outer_to_outside.push(NON_OUTSIDE);
        } else {
            self.outer_to_outside.push(self.outside_to_outer.len() as VarId);
            self.outside_to_outer.push(outer);
        }
        outer
    }

    #[inline]
    pub fn map_outer_to_inter(&self, outer: VarId) -> VarId {
        self.outer_to_inter[outer as usize]
    }
    #[inline]
    pub fn map_inter_to_outer(&self, inter: VarId) -> VarId {
        self.inter_to_outer[inter as usize]
    }
    #[inline]
    pub fn map_outer_lit_to_inter(&self, l: Lit) -> Lit {
        l.map_var(self.map_outer_to_inter(l.vi()))
    }
    #[inline]
    pub fn map_inter_lit_to_outer(&self, l: Lit) -> Lit {
        l.map_var(self.map_inter_to_outer(l.vi()))
    }
    #[inline]
    pub fn map_outside_to_outer(&self, outside: VarId) -> VarId {
        self.outside_to_outer[outside as usize]
    }
    /// `None` for a BVA variable.
    #[inline]
    pub fn map_outer_to_outside(&self, outer: VarId) -> Option<VarId> {
        match self.outer_to_outside[outer as usize] {
            NON_OUTSIDE => None,
            v => Some(v),
        }
    }

    /// literal translation used by the certification store.
    pub fn inter_lits_to_outer_i32s(&self, lits: &[Lit]) -> Vec<i32> {
        lits.iter()
            .map(|l| i32::from(self.map_inter_lit_to_outer(*l)))
            .collect()
    }

    /// swap two inter slots; the caller renames everything else that holds
    /// inter indices. Returns nothing on purpose: composition only.
    pub fn swap_inter(&mut self, i: VarId, j: VarId) {
        if i == j {
            return;
        }
        let oi = self.inter_to_outer[i as usize];
        let oj = self.inter_to_outer[j as usize];
        self.inter_to_outer.swap(i as usize, j as usize);
        self.outer_to_inter[oi as usize] = j;
        self.outer_to_inter[oj as usize] = i;
    }

    /// widen the active prefix by one slot and return the inter index that
    /// now hosts `outer` (always the previous prefix end). Any variable
    /// displaced from that position moves to `outer`'s old inter slot.
    pub fn promote_to_active(&mut self, outer: VarId) -> (VarId, VarId) {
        let target = self.num_inter as VarId;
        let current = self.outer_to_inter[outer as usize];
        debug_assert!(target <= current);
        self.swap_inter(current, target);
        self.num_inter += 1;
        (target, current)
    }

    /// install a freshly computed old-inter -> new-inter permutation.
    pub fn apply_renumber(&mut self, old_to_new: &[VarId], num_effective: usize) {
        debug_assert_eq!(old_to_new.len(), self.num_outer());
        for inter in self.outer_to_inter.iter_mut() {
            *inter = old_to_new[*inter as usize];
        }
        for (outer, inter) in self.outer_to_inter.iter().enumerate() {
            self.inter_to_outer[*inter as usize] = outer as VarId;
        }
        self.num_inter = num_effective;
    }

    /// compact an outer-indexed model down to the outside numbering.
    pub fn strip_bva<T: Copy>(&self, outer_model: &[T]) -> Vec<T> {
        self.outside_to_outer
            .iter()
            .map(|o| outer_model[*o as usize])
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_when_no_bva() {
        let mut m = VarMap::default();
        for _ in 0..4 {
            m.push_var(false);
        }
        for v in 0..4u32 {
            assert_eq!(m.map_outside_to_outer(v), v);
            assert_eq!(m.map_outer_to_inter(v), v);
            assert_eq!(m.map_outer_to_outside(v), Some(v));
        }
        assert_eq!(m.num_inter(), 4);
        assert_eq!(m.num_outside(), 4);
    }

    #[test]
    fn test_bva_skipped_outside() {
        let mut m = VarMap::default();
        m.push_var(false); // outside 0 -> outer 0
        m.push_var(true); // bva     -> outer 1
        m.push_var(false); // outside 1 -> outer 2
        assert_eq!(m.num_outside(), 2);
        assert_eq!(m.map_outside_to_outer(1), 2);
        assert_eq!(m.map_outer_to_outside(1), None);
        assert_eq!(m.map_outer_to_outside(2), Some(1));
        let stripped = m.strip_bva(&[Some(true), Some(false), None]);
        assert_eq!(stripped, vec![Some(true), None]);
    }

    #[test]
    fn test_renumber_round_trip() {
        let mut m = VarMap::default();
        for _ in 0..5 {
            m.push_var(false);
        }
        // move vars 1 and 3 to the tail
        let old_to_new = vec![0u32, 3, 1, 4, 2];
        m.apply_renumber(&old_to_new, 3);
        assert_eq!(m.num_inter(), 3);
        for outer in 0..5u32 {
            assert_eq!(m.map_inter_to_outer(m.map_outer_to_inter(outer)), outer);
        }
        assert_eq!(m.map_outer_to_inter(1), 3);
        assert_eq!(m.map_outer_to_inter(4), 2);
    }

    #[test]
    fn test_promote_to_active() {
        let mut m = VarMap::default();
        for _ in 0..4 {
            m.push_var(false);
        }
        m.apply_renumber(&[0u32, 2, 1, 3], 2);
        assert_eq!(m.num_inter(), 2);
        let (now, was) = m.promote_to_active(1);
        assert_eq!(m.map_outer_to_inter(1), now);
        assert_eq!(now, 2);
        assert_eq!(was, 2); // outer 1 already sat at the prefix end
        assert_eq!(m.num_inter(), 3);
    }
}
