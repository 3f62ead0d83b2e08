//! End-to-end checks of the outer API.
use paritysat::{
    solver::{Certificate, SatSolverIF, Solver},
    types::*,
};

fn lits(v: &[i32]) -> Vec<Lit> {
    v.iter().map(|i| Lit::from(*i)).collect()
}

fn add_all(s: &mut Solver, clauses: &[Vec<i32>]) -> bool {
    for c in clauses {
        if !s.add_clause(&lits(c), false).expect("well-formed input") {
            return false;
        }
    }
    true
}

fn model_satisfies(model: &[Lbool], clauses: &[Vec<i32>]) -> bool {
    clauses.iter().all(|c| {
        c.iter().any(|l| {
            let v = l.unsigned_abs() as usize - 1;
            model[v].map_or(false, |b| b == (0 < *l))
        })
    })
}

#[test]
fn sat_small() {
    let clauses = vec![vec![1, 2], vec![-1, 2], vec![1, -2]];
    let mut s = Solver::default();
    s.new_vars(2);
    assert!(add_all(&mut s, &clauses));
    match s.solve().expect("no error") {
        Certificate::SAT(_) => {
            assert!(model_satisfies(s.get_model(), &clauses));
        }
        other => panic!("expected SAT, got {other:?}"),
    }
}

#[test]
fn unsat_all_binaries() {
    let clauses = vec![vec![1, 2], vec![-1, 2], vec![1, -2], vec![-1, -2]];
    let mut s = Solver::default();
    s.new_vars(2);
    add_all(&mut s, &clauses);
    assert_eq!(s.solve().expect("no error"), Certificate::UNSAT);
}

#[test]
fn unsat_pigeonhole_3_into_2() {
    // pigeon i in hole j is var 2i + j + 1
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    for i in 0..3i32 {
        clauses.push(vec![2 * i + 1, 2 * i + 2]);
    }
    for j in 0..2i32 {
        for a in 0..3i32 {
            for b in (a + 1)..3i32 {
                clauses.push(vec![-(2 * a + j + 1), -(2 * b + j + 1)]);
            }
        }
    }
    let mut s = Solver::default();
    s.new_vars(6);
    add_all(&mut s, &clauses);
    assert_eq!(s.solve().expect("no error"), Certificate::UNSAT);
}

#[test]
fn sat_with_inprocessing_keeps_models_valid() {
    // a chain of implications plus some redundancy for the simplifiers
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    for v in 1..20i32 {
        clauses.push(vec![-v, v + 1]);
    }
    clauses.push(vec![1, 20]);
    clauses.push(vec![3, 7, 11]);
    clauses.push(vec![-3, -7, 15]);
    let mut s = Solver::default();
    s.new_vars(20);
    add_all(&mut s, &clauses);
    match s.solve().expect("no error") {
        Certificate::SAT(_) => assert!(model_satisfies(s.get_model(), &clauses)),
        other => panic!("expected SAT, got {other:?}"),
    }
}

#[test]
fn assumptions_yield_final_conflict() {
    let mut s = Solver::default();
    s.new_vars(2);
    add_all(&mut s, &[vec![-1, 2]]);
    s.set_assumptions(&lits(&[1, -2]));
    assert_eq!(s.solve().expect("no error"), Certificate::UNSAT);
    let conflict = s.get_final_conflict().to_vec();
    assert!(!conflict.is_empty());
    // the conflict holds negations of (some of) the assumptions
    for l in conflict.iter() {
        assert!(lits(&[-1, 2]).contains(l), "stray conflict literal {l}");
    }
    // the solver is reusable once the assumptions are dropped
    s.set_assumptions(&[]);
    assert!(matches!(s.solve().expect("no error"), Certificate::SAT(_)));
}

#[test]
fn solve_from_dimacs_file() {
    let path = std::path::Path::new("tests/cnfs/sample.cnf");
    let mut s = Solver::try_from(path).expect("loadable");
    assert!(matches!(s.solve().expect("no error"), Certificate::SAT(_)));
}

#[test]
fn unknown_strategy_token_is_fatal() {
    let mut s = Solver::default();
    s.new_vars(2);
    add_all(&mut s, &[vec![1, 2]]);
    s.conf.simplify_schedule_nonstartup = "probe, no-such-token".to_string();
    assert_eq!(
        s.simplify_problem_outside(),
        Err(SolverError::UnknownStrategy("no-such-token".to_string()))
    );
}

#[test]
fn drat_file_records_the_refutation() {
    let dir = std::env::temp_dir().join("paritysat-drat-test");
    std::fs::create_dir_all(&dir).expect("mkdir");
    let mut conf = paritysat::config::Config::default();
    conf.use_certification = true;
    conf.output_dir = dir.clone();
    conf.proof_file = "proof.out".into();
    let cnf = CNFDescription {
        num_of_variables: 2,
        ..CNFDescription::default()
    };
    let mut s = Solver::instantiate(&conf, &cnf);
    add_all(&mut s, &[vec![1, 2], vec![-1, 2], vec![1, -2], vec![-1, -2]]);
    assert_eq!(s.solve().expect("no error"), Certificate::UNSAT);
    s.cdb.certification.close();
    let proof = std::fs::read_to_string(dir.join("proof.out")).expect("written");
    assert!(!proof.is_empty());
    assert!(proof.lines().last().map_or(false, |l| l.ends_with('0')));
    let _ = std::fs::remove_file(dir.join("proof.out"));
}
