//! Flat-file persistence of the solver state: verdict, saved phases,
//! the replacement table and the elimination reconstruction stack.
//! Everything is little-endian and outer-numbered.
use {
    super::Solver,
    crate::{assign::AssignIF, types::*},
    std::{
        fs::File,
        io::{BufReader, BufWriter, Read, Write},
        path::Path,
    },
};

const MAGIC: &[u8; 8] = b"PSATST\x01\n";

fn put_u32<W: Write>(w: &mut W, v: u32) -> std::io::Result<()> {
    w.write_all(&v.to_le_bytes())
}

fn get_u32<R: Read>(r: &mut R) -> std::io::Result<u32> {
    let mut buf = [0u8; 4];
    r.read_exact(&mut buf)?;
    Ok(u32::from_le_bytes(buf))
}

fn put_lbool<W: Write>(w: &mut W, v: Lbool) -> std::io::Result<()> {
    w.write_all(&[match v {
        None => 0u8,
        Some(false) => 1,
        Some(true) => 2,
    }])
}

fn get_lbool<R: Read>(r: &mut R) -> std::io::Result<Lbool> {
    let mut buf = [0u8; 1];
    r.read_exact(&mut buf)?;
    Ok(match buf[0] {
        1 => Some(false),
        2 => Some(true),
        _ => None,
    })
}

impl Solver {
    pub fn save_state(&self, path: &Path, status: Lbool) -> MaybeInconsistent {
        let inner = || -> std::io::Result<()> {
            let mut w = BufWriter::new(File::create(path)?);
            w.write_all(MAGIC)?;
            put_lbool(&mut w, status)?;
            let n_outer = self.vmap.num_outer();
            put_u32(&mut w, n_outer as u32)?;
            // saved phases
            for outer in 0..n_outer as VarId {
                let inter = self.vmap.map_outer_to_inter(outer);
                w.write_all(&[self.asg.var(inter).phase() as u8])?;
            }
            // the replacement table
            for l in self.replacer.save_table().iter() {
                put_u32(&mut w, u32::from(*l))?;
            }
            // the reconstruction stack
            let stack = self.occ.save_stack();
            put_u32(&mut w, stack.len() as u32)?;
            for (lits, on) in stack.iter() {
                put_u32(&mut w, lits.len() as u32)?;
                for l in lits.iter() {
                    put_u32(&mut w, u32::from(*l))?;
                }
                put_u32(&mut w, u32::from(*on))?;
            }
            w.flush()
        };
        inner().map_err(|_| SolverError::IOError)
    }

    pub fn load_state(&mut self, path: &Path) -> Result<Lbool, SolverError> {
        let mut inner = || -> std::io::Result<Result<Lbool, SolverError>> {
            let mut r = BufReader::new(File::open(path)?);
            let mut magic = [0u8; 8];
            r.read_exact(&mut magic)?;
            if &magic != MAGIC {
                return Ok(Err(SolverError::IOError));
            }
            let status = get_lbool(&mut r)?;
            let n_outer = get_u32(&mut r)? as usize;
            if n_outer != self.vmap.num_outer() {
                return Ok(Err(SolverError::IOError));
            }
            for outer in 0..n_outer as VarId {
                let mut b = [0u8; 1];
                r.read_exact(&mut b)?;
                let inter = self.vmap.map_outer_to_inter(outer);
                self.asg.var_mut(inter).set_phase(b[0] != 0);
            }
            let mut table: Vec<Lit> = Vec::with_capacity(n_outer);
            for _ in 0..n_outer {
                table.push(Lit::from(get_u32(&mut r)?));
            }
            let n_stack = get_u32(&mut r)? as usize;
            let mut stack: Vec<(Vec<Lit>, Lit)> = Vec::with_capacity(n_stack);
            for _ in 0..n_stack {
                let len = get_u32(&mut r)? as usize;
                let mut lits: Vec<Lit> = Vec::with_capacity(len);
                for _ in 0..len {
                    lits.push(Lit::from(get_u32(&mut r)?));
                }
                let on = Lit::from(get_u32(&mut r)?);
                stack.push((lits, on));
            }
            self.replacer.restore_table(table);
            self.occ.restore_stack(stack);
            // reinstate the removal tags the tables imply
            for outer in 0..n_outer as VarId {
                let inter = self.vmap.map_outer_to_inter(outer);
                if self.asg.var(inter).removed != Removed::None
                    || self.asg.assign(inter).is_some()
                {
                    continue;
                }
                if self.replacer.is_replaced(outer) {
                    self.asg.var_mut(inter).removed = Removed::Replaced;
                }
            }
            for (_, on) in self.occ.save_stack().to_vec() {
                let inter = self.vmap.map_outer_to_inter(on.vi());
                if self.asg.var(inter).removed == Removed::None
                    && self.asg.assign(inter).is_none()
                {
                    self.asg.var_mut(inter).removed = Removed::Eliminated;
                }
            }
            Ok(Ok(status))
        };
        inner().map_err(|_| SolverError::IOError)?
    }

    /// Write the irredundant database as a DIMACS file in the outer
    /// numbering; the other half of the preprocessing mode.
    pub fn dump_irred_cnf(&self, path: &Path) -> MaybeInconsistent {
        use crate::{
            assign::AssignIF,
            cdb::{ClauseIF, WatchIndexIF, Watcher},
        };
        let inner = || -> std::io::Result<()> {
            let mut w = BufWriter::new(File::create(path)?);
            let mut lines: Vec<String> = Vec::new();
            for i in 0..self.asg.stack_len() {
                let l = self.asg.stack(i);
                lines.push(format!("{} 0", i32::from(self.vmap.map_inter_lit_to_outer(l))));
            }
            for i in 0..self.cdb.num_watch_lists() {
                let l = Lit::from(i);
                for wt in self.cdb.watch_list(l).iter() {
                    if let Watcher::Binary { other, red: false } = wt {
                        if l < *other {
                            let a = self.vmap.map_inter_lit_to_outer(l);
                            let b = self.vmap.map_inter_lit_to_outer(*other);
                            lines.push(format!("{} {} 0", i32::from(a), i32::from(b)));
                        }
                    }
                }
            }
            for cr in self.cdb.long_irred.iter() {
                let c = &self.cdb[*cr];
                if c.is_dead() {
                    continue;
                }
                let body = c
                    .iter()
                    .map(|l| i32::from(self.vmap.map_inter_lit_to_outer(*l)).to_string())
                    .collect::<Vec<_>>()
                    .join(" ");
                lines.push(format!("{body} 0"));
            }
            writeln!(w, "p cnf {} {}", self.vmap.num_outer(), lines.len())?;
            for line in lines {
                writeln!(w, "{line}")?;
            }
            w.flush()
        };
        inner().map_err(|_| SolverError::IOError)
    }

    /// `preprocess == 2`: pick up the saved state, then the solution file.
    pub(crate) fn load_preprocessed(&mut self) -> Result<Lbool, SolverError> {
        let state_file = self.conf.saved_state_file.clone();
        let status = self.load_state(&state_file)?;
        if status == Some(false) {
            self.ok = false;
            return Ok(Some(false));
        }
        let solution_file = self.conf.solution_file.clone();
        if solution_file.as_os_str().is_empty() {
            return Ok(status);
        }
        let parsed = crate::cnf::load_solution_from_file(&solution_file, self.asg.num_slots())?;
        match parsed {
            (Some(true), values) => {
                for (vi, val) in values.iter().enumerate() {
                    if self.asg.assign(vi as VarId).is_none()
                        && self.asg.var(vi as VarId).removed == Removed::None
                    {
                        if let Some(b) = val {
                            let _ = self
                                .asg
                                .assign_at_root_level(Lit::from((vi as VarId, !*b)));
                        }
                    }
                }
                Ok(Some(true))
            }
            (s, _) => Ok(s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::{SatSolverIF, Solver};

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join("paritysat-state-test");
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("state.dat");
        let mut s = Solver::default();
        s.new_vars(4);
        s.asg.var_mut(2).set_phase(true);
        s.save_state(&path, None).expect("saved");
        let mut t = Solver::default();
        t.new_vars(4);
        let status = t.load_state(&path).expect("loaded");
        assert_eq!(status, None);
        assert!(t.asg.var(2).phase());
        let _ = std::fs::remove_file(path);
    }
}
