//! Elimination, replacement and reconstruction round trips through the
//! public API.
use paritysat::{
    assign::AssignIF,
    solver::{Certificate, SatSolverIF, Solver},
    types::*,
};

fn lits(v: &[i32]) -> Vec<Lit> {
    v.iter().map(|i| Lit::from(*i)).collect()
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
fn elimination_round_trip() {
    let clauses = vec![vec![1, 2], vec![-1, 3]];
    let mut s = Solver::default();
    s.new_vars(3);
    for c in clauses.iter() {
        s.add_clause(&lits(c), false).expect("ok");
    }
    s.conf.simplify_schedule_nonstartup = "occ-bve".to_string();
    assert_eq!(s.simplify_problem_outside().expect("no error"), Certificate::UNKNOWN);
    assert!(0 < s.occ.num_elimed, "nothing was eliminated");
    s.conf.do_simplify_problem = false;
    match s.solve().expect("no error") {
        Certificate::SAT(_) => {
            assert!(model_satisfies(s.get_model(), &clauses));
        }
        other => panic!("expected SAT, got {other:?}"),
    }
}

#[test]
fn uneliminate_on_new_clause_mentioning_the_variable() {
    let mut s = Solver::default();
    s.new_vars(3);
    s.add_clause(&lits(&[1, 2]), false).expect("ok");
    s.add_clause(&lits(&[-1, 3]), false).expect("ok");
    s.conf.simplify_schedule_nonstartup = "occ-bve".to_string();
    s.simplify_problem_outside().expect("no error");
    assert!(0 < s.occ.num_elimed);
    // a new clause over the eliminated variable resurrects it (and the
    // other one it mentions); the untouched variable stays eliminated
    s.add_clause(&lits(&[-1, -3]), false).expect("ok");
    assert_eq!(s.occ.num_elimed, 1);
    s.conf.do_simplify_problem = false;
    let clauses = vec![vec![1, 2], vec![-1, 3], vec![-1, -3]];
    match s.solve().expect("no error") {
        Certificate::SAT(_) => {
            assert!(model_satisfies(s.get_model(), &clauses));
        }
        other => panic!("expected SAT, got {other:?}"),
    }
}

#[test]
fn equivalence_replacement_round_trip() {
    // x1 <-> x2 plus a clause over x2 only
    let clauses = vec![vec![-1, 2], vec![1, -2], vec![2, 3]];
    let mut s = Solver::default();
    s.new_vars(3);
    for c in clauses.iter() {
        s.add_clause(&lits(c), false).expect("ok");
    }
    s.conf.simplify_schedule_nonstartup = "scc-vrepl".to_string();
    s.simplify_problem_outside().expect("no error");
    assert!(0 < s.replacer.num_replaced, "no equivalence was installed");
    s.conf.do_simplify_problem = false;
    match s.solve().expect("no error") {
        Certificate::SAT(_) => {
            let model = s.get_model();
            assert!(model_satisfies(model, &clauses));
            assert_eq!(model[0], model[1]);
        }
        other => panic!("expected SAT, got {other:?}"),
    }
}

#[test]
fn component_handling_round_trip() {
    // two disconnected components; the small one is solved independently
    let clauses = vec![
        vec![1, 2],
        vec![-1, 2],
        vec![3, 4, 5],
        vec![-3, 4],
        vec![-4, 5],
    ];
    let mut s = Solver::default();
    s.new_vars(5);
    for c in clauses.iter() {
        s.add_clause(&lits(c), false).expect("ok");
    }
    s.state.num_simplify = 2; // past the handler threshold, and even
    s.conf.simplify_schedule_nonstartup = "handle-comps".to_string();
    s.simplify_problem_outside().expect("no error");
    s.conf.do_simplify_problem = false;
    match s.solve().expect("no error") {
        Certificate::SAT(_) => {
            assert!(model_satisfies(s.get_model(), &clauses));
        }
        other => panic!("expected SAT, got {other:?}"),
    }
}

#[test]
fn probing_derives_roots() {
    // !x1 fails: both (x1 x2) and (x1 -x2) force x1
    let mut s = Solver::default();
    s.new_vars(2);
    s.add_clause(&lits(&[1, 2]), false).expect("ok");
    s.add_clause(&lits(&[1, -2]), false).expect("ok");
    s.conf.simplify_schedule_nonstartup = "probe".to_string();
    s.simplify_problem_outside().expect("no error");
    assert_eq!(s.asg.assign(0), Some(true));
}

#[test]
fn cache_try_both_derives_units() {
    let mut s = Solver::default();
    s.new_vars(2);
    s.add_clause(&lits(&[1, 2]), false).expect("ok");
    s.add_clause(&lits(&[-1, 2]), false).expect("ok");
    s.conf.simplify_schedule_nonstartup = "cache-tryboth".to_string();
    s.simplify_problem_outside().expect("no error");
    assert_eq!(s.asg.assign(1), Some(true));
}
