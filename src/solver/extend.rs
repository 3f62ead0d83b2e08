//! The solution reconstructor: lift a satisfying inter-assignment back
//! through decomposition, replacement and elimination to the outside
//! universe.
use {
    super::{validate::validate_current_db, Solver},
    crate::{assign::AssignIF, processor::EliminateIF, state::StateIF, types::*},
};

impl Solver {
    /// Build `full_model` (outer) and `model` (outside) from the current
    /// assignment. The trail must still hold the satisfying assignment.
    pub(crate) fn extend_solution(&mut self) {
        let inter = self.asg.assign_ref();
        // 1. inter -> outer; the identity extension covers slots beyond
        //    the compacted prefix
        let mut outer_model: Vec<Lbool> = (0..self.vmap.num_outer() as VarId)
            .map(|o| inter[self.vmap.map_outer_to_inter(o) as usize])
            .collect();
        // 2. values of independently solved components
        self.comps.add_saved_state(&mut outer_model);
        // 3. replaced variables take their representative's value
        self.replacer.extend_model(&mut outer_model);
        // 4. replay the elimination reconstruction stack
        self.occ.extend_model(&mut outer_model);
        // 5. a representative may have been revived by the replay
        self.replacer.extend_model(&mut outer_model);
        // 6. dropped tautologies oblige their variable to hold a value
        for (v, must) in self.undef_must_set.iter().enumerate() {
            if *must && outer_model[v].is_none() {
                outer_model[v] = Some(true);
            }
        }
        debug_assert!(validate_current_db(&self.cdb, &self.vmap, &outer_model).is_none());
        self.full_model = outer_model.clone();
        // 7. strip the synthetic variables
        self.model = self.vmap.strip_bva(&outer_model);
        self.check_model_for_assumptions();
    }

    /// every assumption literal must have come out true.
    pub(crate) fn check_model_for_assumptions(&self) {
        for l in self.outside_assumptions.iter() {
            match self.model[l.vi() as usize] {
                None => {
                    self.state.flush(format!(
                        "ERROR: assumption {l} was not set at all in the model"
                    ));
                    debug_assert!(false, "unset assumption {l}");
                }
                Some(b) => {
                    debug_assert!(
                        b != l.sign(),
                        "assumption {l} was set to its opposite value"
                    );
                }
            }
        }
    }
}
