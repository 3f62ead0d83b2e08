//! Watch-based unit propagation.
use {
    super::{AssignIF, AssignReason, AssignStack},
    crate::{
        cdb::{ClauseDB, ClauseIF, Watcher},
        types::*,
    },
};

impl AssignStack {
    /// propagate every queued assignment to a fixpoint or a conflict.
    ///
    /// The watch lists are indexed by the watched literal itself, so the
    /// assignment of `p` scans `watches[!p]`. Entries are kept in place
    /// unless the scan consumes them by moving a watch.
    pub fn propagate(&mut self, cdb: &mut ClauseDB) -> PropagationResult {
        while self.q_head < self.trail.len() {
            let p = self.trail[self.q_head];
            self.q_head += 1;
            self.num_propagation += 1;
            let false_lit = !p;
            let mut ws = cdb.take_watch_list(false_lit);
            let mut i = 0;
            let mut j = 0;
            let conflict = 'scan: loop {
                if ws.len() <= i {
                    break 'scan None;
                }
                let w = ws[i];
                i += 1;
                match w {
                    Watcher::Binary { other, .. } => {
                        ws[j] = w;
                        j += 1;
                        match self.assigned(other) {
                            Some(true) => (),
                            Some(false) => break 'scan Some(Conflict::Bin(false_lit, other)),
                            None => self.enqueue(other, AssignReason::Binary(false_lit)),
                        }
                    }
                    Watcher::Long { cr, blocker } => {
                        if self.assigned(blocker) == Some(true) {
                            ws[j] = w;
                            j += 1;
                            continue;
                        }
                        // ensure the false watch sits at position 1
                        if cdb[cr].lit0() == false_lit {
                            cdb[cr].lits.swap(0, 1);
                        }
                        let first = cdb[cr].lit0();
                        if first != blocker && self.assigned(first) == Some(true) {
                            ws[j] = Watcher::Long { cr, blocker: first };
                            j += 1;
                            continue;
                        }
                        let mut moved = false;
                        for k in 2..cdb[cr].len() {
                            if self.assigned(cdb[cr][k]) != Some(false) {
                                cdb[cr].lits.swap(1, k);
                                let new_watch = cdb[cr].lit1();
                                cdb.push_long_watch(new_watch, cr, first);
                                moved = true;
                                break;
                            }
                        }
                        if moved {
                            continue;
                        }
                        // unit or conflict on the first watch
                        ws[j] = Watcher::Long { cr, blocker };
                        j += 1;
                        match self.assigned(first) {
                            Some(false) => break 'scan Some(Conflict::Long(cr)),
                            Some(true) => (),
                            None => self.enqueue(first, AssignReason::Long(cr)),
                        }
                    }
                }
            };
            if let Some(cc) = conflict {
                while i < ws.len() {
                    ws[j] = ws[i];
                    j += 1;
                    i += 1;
                }
                ws.truncate(j);
                cdb.restore_watch_list(false_lit, ws);
                self.q_head = self.trail.len();
                return Err(cc);
            }
            ws.truncate(j);
            cdb.restore_watch_list(false_lit, ws);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cdb::ClauseDBIF;

    fn setup(n: usize) -> (AssignStack, ClauseDB) {
        let cnf = CNFDescription {
            num_of_variables: n,
            ..CNFDescription::default()
        };
        let conf = Config::default();
        (
            AssignStack::instantiate(&conf, &cnf),
            ClauseDB::instantiate(&conf, &cnf),
        )
    }

    fn lits(v: &[i32]) -> Vec<Lit> {
        v.iter().map(|i| Lit::from(*i)).collect()
    }

    #[test]
    fn test_binary_chain_propagation() {
        let (mut asg, mut cdb) = setup(3);
        cdb.attach_bin(Lit::from(-1i32), Lit::from(2i32), false);
        cdb.attach_bin(Lit::from(-2i32), Lit::from(3i32), false);
        asg.assign_at_root_level(Lit::from(1i32)).expect("ok");
        assert_eq!(asg.propagate(&mut cdb), Ok(()));
        assert_eq!(asg.assign(0), Some(true));
        assert_eq!(asg.assign(1), Some(true));
        assert_eq!(asg.assign(2), Some(true));
    }

    #[test]
    fn test_long_clause_unit() {
        let (mut asg, mut cdb) = setup(3);
        cdb.new_clause(lits(&[1, 2, 3]), false, 0, 0);
        asg.assign_at_root_level(Lit::from(-1i32)).expect("ok");
        asg.assign_at_root_level(Lit::from(-2i32)).expect("ok");
        assert_eq!(asg.propagate(&mut cdb), Ok(()));
        assert_eq!(asg.assign(2), Some(true));
        assert_eq!(asg.reason(2), AssignReason::Long(crate::cdb::ClauseRef::from_index(0)));
    }

    #[test]
    fn test_binary_conflict() {
        let (mut asg, mut cdb) = setup(2);
        cdb.attach_bin(Lit::from(-1i32), Lit::from(2i32), false);
        cdb.attach_bin(Lit::from(-1i32), Lit::from(-2i32), false);
        asg.assign_at_root_level(Lit::from(1i32)).expect("ok");
        assert!(asg.propagate(&mut cdb).is_err());
    }

    #[test]
    fn test_watch_move_preserves_two_watches() {
        let (mut asg, mut cdb) = setup(4);
        let cr = cdb.new_clause(lits(&[1, 2, 3, 4]), false, 0, 0);
        asg.assign_at_root_level(Lit::from(-1i32)).expect("ok");
        assert_eq!(asg.propagate(&mut cdb), Ok(()));
        // exactly two long watch entries reference the clause
        let count = (0..8usize)
            .map(Lit::from)
            .map(|l| {
                crate::cdb::WatchIndexIF::watch_list(&cdb, l)
                    .iter()
                    .filter(|w| w.as_long() == Some(cr))
                    .count()
            })
            .sum::<usize>();
        assert_eq!(count, 2);
    }
}
