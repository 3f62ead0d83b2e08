//! XOR ingestion: cutting, equisatisfiability and Gaussian units.
use paritysat::{
    solver::{Certificate, SatSolverIF, Solver},
    types::*,
};

fn parity(model: &[Lbool], vars: &[u32]) -> Option<bool> {
    let mut acc = false;
    for v in vars {
        acc ^= model[*v as usize]?;
    }
    Some(acc)
}

#[test]
fn xor_even_parity_holds_in_model() {
    let mut s = Solver::default();
    s.new_vars(4);
    s.add_xor_clause(&[0, 1, 2, 3], false).expect("ok");
    match s.solve().expect("no error") {
        Certificate::SAT(_) => {
            assert_eq!(parity(s.get_model(), &[0, 1, 2, 3]), Some(false));
        }
        other => panic!("expected SAT, got {other:?}"),
    }
}

#[test]
fn xor_chain_with_connectors_is_equisatisfiable() {
    let mut s = Solver::default();
    s.new_vars(7);
    s.add_xor_clause(&[0, 1, 2, 3, 4, 5, 6], true).expect("ok");
    // pin six of the members; the last one is forced by parity
    for v in 1..7i32 {
        s.add_clause(&[Lit::from(v + 1)], false).expect("ok");
    }
    match s.solve().expect("no error") {
        Certificate::SAT(_) => {
            let model = s.get_model();
            assert_eq!(model.len(), 7);
            // six trues, so x0 must be true for an odd total
            assert_eq!(model[0], Some(true));
            assert_eq!(parity(model, &[0, 1, 2, 3, 4, 5, 6]), Some(true));
        }
        other => panic!("expected SAT, got {other:?}"),
    }
}

#[test]
fn contradicting_xors_refute() {
    let mut s = Solver::default();
    s.new_vars(2);
    s.add_xor_clause(&[0, 1], false).expect("ok");
    s.add_xor_clause(&[0, 1], true).expect("ok");
    assert_eq!(s.solve().expect("no error"), Certificate::UNSAT);
}

#[test]
fn xor_with_assigned_member_folds_into_rhs() {
    let mut s = Solver::default();
    s.new_vars(3);
    s.add_clause(&[Lit::from(1i32)], false).expect("ok");
    // x0 ^ x1 ^ x2 = 1 with x0 = true leaves x1 ^ x2 = 0
    s.add_xor_clause(&[0, 1, 2], true).expect("ok");
    match s.solve().expect("no error") {
        Certificate::SAT(_) => {
            let model = s.get_model();
            assert_eq!(model[0], Some(true));
            assert_eq!(model[1], model[2]);
        }
        other => panic!("expected SAT, got {other:?}"),
    }
}

#[test]
fn xor_equivalence_propagates() {
    let mut s = Solver::default();
    s.new_vars(2);
    // x0 ^ x1 = 0 makes the two variables equal
    s.add_xor_clause(&[0, 1], false).expect("ok");
    s.add_clause(&[Lit::from(1i32)], false).expect("ok");
    match s.solve().expect("no error") {
        Certificate::SAT(_) => {
            assert_eq!(s.get_model()[0], Some(true));
            assert_eq!(s.get_model()[1], Some(true));
        }
        other => panic!("expected SAT, got {other:?}"),
    }
}
