//! DIMACS input, including `x` XOR lines and `c ind` independent-variable
//! lines, and the solution-line parser used by the preprocessing mode.
use {
    crate::{
        config::Config,
        solver::{SatSolverIF, Solver},
        types::*,
    },
    std::{
        fs::File,
        io::{BufRead, BufReader},
        path::Path,
    },
};

/// A wrapper structure to make a `CNFDescription` from a file. The
/// reader is separated so the description stays cloneable.
#[derive(Debug)]
pub struct CNFReader {
    pub cnf: CNFDescription,
    pub reader: BufReader<File>,
}

impl TryFrom<&Path> for CNFReader {
    type Error = SolverError;
    fn try_from(path: &Path) -> Result<Self, Self::Error> {
        let pathname = if path.to_string_lossy().is_empty() {
            "--".to_string()
        } else {
            path.file_name()
                .map_or("--".to_string(), |f| f.to_string_lossy().into_owned())
        };
        let fs = File::open(path).map_err(|_| SolverError::IOError)?;
        let mut reader = BufReader::new(fs);
        let mut buf = String::new();
        let mut nv: usize = 0;
        let mut nc: usize = 0;
        let mut found_valid_header = false;
        loop {
            buf.clear();
            match reader.read_line(&mut buf) {
                Ok(0) => break,
                Ok(_) => {
                    let mut iter = buf.split_whitespace();
                    if iter.next() == Some("p") && iter.next() == Some("cnf") {
                        if let Some(v) = iter.next().and_then(|s| s.parse::<usize>().ok()) {
                            if let Some(c) = iter.next().and_then(|s| s.parse::<usize>().ok()) {
                                nv = v;
                                nc = c;
                                found_valid_header = true;
                                break;
                            }
                        }
                    }
                }
                Err(_) => return Err(SolverError::IOError),
            }
        }
        if !found_valid_header {
            return Err(SolverError::IOError);
        }
        let cnf = CNFDescription {
            num_of_variables: nv,
            num_of_clauses: nc,
            pathname: CNFIndicator::File(pathname),
        };
        Ok(CNFReader { cnf, reader })
    }
}

/// Build a solver, then stream the body of the DIMACS file into it.
pub fn build_solver_from_file(config: &Config) -> Result<Solver, SolverError> {
    let CNFReader { cnf, reader } = CNFReader::try_from(config.cnf_file.as_path())?;
    let mut solver = Solver::instantiate(config, &cnf);
    inject(&mut solver, reader)?;
    Ok(solver)
}

fn inject(solver: &mut Solver, mut reader: BufReader<File>) -> MaybeInconsistent {
    let mut buf = String::new();
    let mut independent: Vec<u32> = Vec::new();
    loop {
        buf.clear();
        match reader.read_line(&mut buf) {
            Ok(0) => break,
            Ok(_) if buf.starts_with("c ind") => {
                for s in buf.split_whitespace().skip(2) {
                    match s.parse::<u32>() {
                        Ok(0) => break,
                        Ok(v) => independent.push(v - 1),
                        Err(_) => (),
                    }
                }
            }
            Ok(_) if buf.starts_with('c') || buf.starts_with('p') => continue,
            Ok(_) if buf.starts_with('x') => {
                // an XOR constraint: `x 1 -2 3 0` reads x1 ^ !x2 ^ x3 = 1
                let mut rhs = true;
                let mut vars: Vec<VarId> = Vec::new();
                for s in buf[1..].split_whitespace() {
                    match s.parse::<i32>() {
                        Ok(0) => break,
                        Ok(val) => {
                            if val < 0 {
                                rhs = !rhs;
                            }
                            vars.push(val.unsigned_abs() - 1);
                        }
                        Err(_) => (),
                    }
                }
                if !vars.is_empty() && !solver.add_xor_clause(&vars, rhs)? {
                    return Err(SolverError::Inconsistent);
                }
            }
            Ok(_) => {
                let mut v: Vec<Lit> = Vec::new();
                for s in buf.split_whitespace() {
                    match s.parse::<i32>() {
                        Ok(0) => break,
                        Ok(val) => v.push(Lit::from(val)),
                        Err(_) => (),
                    }
                }
                if !v.is_empty() && !solver.add_clause(&v, false)? {
                    return Err(SolverError::Inconsistent);
                }
            }
            Err(_) => return Err(SolverError::IOError),
        }
    }
    if !independent.is_empty() {
        solver.conf.independent_vars = Some(independent);
    }
    Ok(())
}

/// Parse an `s`/`v` solution stream. Values land in a vector of `n`
/// slots; zero or the end of input closes a `v` block.
pub fn load_solution_from_file(
    path: &Path,
    n: usize,
) -> Result<(Lbool, Vec<Lbool>), SolverError> {
    let file = File::open(path).map_err(|_| SolverError::IOError)?;
    let reader = BufReader::new(file);
    let mut status: Lbool = None;
    let mut values: Vec<Lbool> = vec![None; n];
    for line in reader.lines() {
        let line = line.map_err(|_| SolverError::IOError)?;
        let mut it = line.split_whitespace();
        match it.next() {
            Some("s") => match it.next() {
                Some("SATISFIABLE") => status = Some(true),
                Some("UNSATISFIABLE") => return Ok((Some(false), values)),
                Some("INDETERMINATE") => return Ok((None, values)),
                _ => return Err(SolverError::IOError),
            },
            Some("v") => {
                for s in it {
                    match s.parse::<i32>() {
                        Ok(0) => break,
                        Ok(val) => {
                            let vi = val.unsigned_abs() as usize - 1;
                            if n <= vi {
                                return Err(SolverError::IOError);
                            }
                            // don't overwrite previously computed values
                            if values[vi].is_none() {
                                values[vi] = Some(0 < val);
                            }
                        }
                        Err(_) => return Err(SolverError::IOError),
                    }
                }
            }
            _ => (),
        }
    }
    Ok((status, values))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_solution_lines() {
        let dir = std::env::temp_dir().join("paritysat-cnf-test");
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("solution.txt");
        let mut f = File::create(&path).expect("create");
        writeln!(f, "c a comment").expect("write");
        writeln!(f, "s SATISFIABLE").expect("write");
        writeln!(f, "v 1 -2 3 0").expect("write");
        drop(f);
        let (status, values) = load_solution_from_file(&path, 4).expect("parsed");
        assert_eq!(status, Some(true));
        assert_eq!(
            values,
            vec![Some(true), Some(false), Some(true), None]
        );
        let _ = std::fs::remove_file(path);
    }
}
