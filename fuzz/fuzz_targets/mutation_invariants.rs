//! Replays arbitrary call sequences against a mutation.
//!
//! Checks that failed calls leave the mutation unchanged and that the field
//! and edge store invariants hold after every call.

use graph_changeset::testing::{MutationScript, test_mutation_invariants};
use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|script: MutationScript| {
            test_mutation_invariants(&script);
        });
    }
}
