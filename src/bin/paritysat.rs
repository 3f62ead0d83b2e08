//! The command-line frontend: DIMACS in, `s`/`v` lines out.
use {
    paritysat::{
        cnf::build_solver_from_file,
        config::Config,
        solver::{Certificate, SatSolverIF},
        types::SolverError,
    },
    std::{
        fs::File,
        io::{BufWriter, Write},
        process::exit,
    },
    structopt::StructOpt,
};

fn main() {
    let config = Config::from_args();
    if config.cnf_file.as_os_str().is_empty() {
        eprintln!("no CNF file given");
        exit(1);
    }
    let mut solver = match build_solver_from_file(&config) {
        Ok(s) => s,
        Err(SolverError::Inconsistent) => {
            // the input refuted itself during loading
            println!("s UNSATISFIABLE");
            exit(20);
        }
        Err(e) => {
            eprintln!("failed to load {}: {}", config.cnf_file.display(), e);
            exit(1);
        }
    };
    let result = solver.solve();
    let mut out: Box<dyn Write> = if config.result_file.as_os_str().is_empty() {
        Box::new(std::io::stdout())
    } else {
        match File::create(&config.result_file) {
            Ok(f) => Box::new(BufWriter::new(f)),
            Err(e) => {
                eprintln!("cannot write {}: {}", config.result_file.display(), e);
                exit(1);
            }
        }
    };
    match result {
        Ok(Certificate::SAT(model)) => {
            writeln!(out, "s SATISFIABLE").expect("write");
            let mut line = String::from("v");
            for l in model.iter() {
                line.push_str(&format!(" {l}"));
                if 4000 < line.len() {
                    writeln!(out, "{line}").expect("write");
                    line = String::from("v");
                }
            }
            writeln!(out, "{line} 0").expect("write");
            exit(10);
        }
        Ok(Certificate::UNSAT) => {
            writeln!(out, "s UNSATISFIABLE").expect("write");
            exit(20);
        }
        Ok(Certificate::UNKNOWN) => {
            writeln!(out, "s INDETERMINATE").expect("write");
            exit(0);
        }
        Err(e) => {
            eprintln!("solver error: {e}");
            exit(1);
        }
    }
}
