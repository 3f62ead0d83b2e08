use {super::Var, crate::types::*};

/// Heap of variable ids, ordered by activity, with an index map for
/// in-place updates.
#[derive(Clone, Debug, Default)]
pub struct VarIdHeap {
    /// heap positions to var ids
    heap: Vec<VarId>,
    /// var ids to heap positions; `usize::MAX` when absent
    idxs: Vec<usize>,
}

const ABSENT: usize = usize::MAX;

impl VarIdHeap {
    pub fn new(n: usize) -> Self {
        VarIdHeap {
            heap: Vec::with_capacity(n),
            idxs: vec![ABSENT; n],
        }
    }
    pub fn expand(&mut self) {
        self.idxs.push(ABSENT);
    }
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
    pub fn clear(&mut self) {
        for vi in self.heap.drain(..) {
            self.idxs[vi as usize] = ABSENT;
        }
    }
    pub fn contains(&self, vi: VarId) -> bool {
        self.idxs.get(vi as usize).map_or(false, |i| *i != ABSENT)
    }
    pub fn insert(&mut self, vars: &[Var], vi: VarId) {
        if self.contains(vi) {
            return;
        }
        let i = self.heap.len();
        self.heap.push(vi);
        self.idxs[vi as usize] = i;
        self.sift_up(vars, i);
    }
    pub fn pop(&mut self, vars: &[Var]) -> Option<VarId> {
        if self.heap.is_empty() {
            return None;
        }
        let top = self.heap[0];
        self.idxs[top as usize] = ABSENT;
        let last = self.heap.pop().unwrap();
        if !self.heap.is_empty() {
            self.heap[0] = last;
            self.idxs[last as usize] = 0;
            self.sift_down(vars, 0);
        }
        Some(top)
    }
    /// restore the heap property after `vi`'s activity grew.
    pub fn update(&mut self, vars: &[Var], vi: VarId) {
        if let Some(&i) = self.idxs.get(vi as usize) {
            if i != ABSENT {
                self.sift_up(vars, i);
            }
        }
    }

    fn sift_up(&mut self, vars: &[Var], mut i: usize) {
        while 0 < i {
            let parent = (i - 1) / 2;
            if vars[self.heap[parent] as usize].activity
                < vars[self.heap[i] as usize].activity
            {
                self.swap(parent, i);
                i = parent;
            } else {
                break;
            }
        }
    }
    fn sift_down(&mut self, vars: &[Var], mut i: usize) {
        loop {
            let l = 2 * i + 1;
            if self.heap.len() <= l {
                break;
            }
            let r = l + 1;
            let child = if r < self.heap.len()
                && vars[self.heap[l] as usize].activity < vars[self.heap[r] as usize].activity
            {
                r
            } else {
                l
            };
            if vars[self.heap[i] as usize].activity < vars[self.heap[child] as usize].activity {
                self.swap(i, child);
                i = child;
            } else {
                break;
            }
        }
    }
    fn swap(&mut self, i: usize, j: usize) {
        self.heap.swap(i, j);
        self.idxs[self.heap[i] as usize] = i;
        self.idxs[self.heap[j] as usize] = j;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heap_orders_by_activity() {
        let mut vars = vec![Var::default(); 4];
        vars[0].activity = 1.0;
        vars[1].activity = 4.0;
        vars[2].activity = 2.0;
        vars[3].activity = 3.0;
        let mut h = VarIdHeap::new(4);
        for vi in 0..4u32 {
            h.insert(&vars, vi);
        }
        assert_eq!(h.pop(&vars), Some(1));
        assert_eq!(h.pop(&vars), Some(3));
        vars[0].activity = 10.0;
        h.update(&vars, 0);
        assert_eq!(h.pop(&vars), Some(0));
        assert_eq!(h.pop(&vars), Some(2));
        assert_eq!(h.pop(&vars), None);
    }
}
