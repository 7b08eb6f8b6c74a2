//! Identifier generation for events and observations.
//!
//! Production runs use random v4 UUIDs. Deterministic mode hashes the
//! identifying tuple into a namespaced v5 UUID so that repeated runs over
//! the same input are byte-identical. No counters are involved.

use uuid::Uuid;

/// Namespace under which all deterministic Tally identifiers are minted.
const TALLY_NAMESPACE: Uuid = Uuid::from_u128(0x8f1d_9c2a_54e6_4b0f_9a73_c0d1_e5b2_7a14);

#[derive(Debug, Clone, Copy)]
pub struct IdGen {
    deterministic: bool,
}

impl IdGen {
    pub fn new(deterministic: bool) -> Self {
        Self { deterministic }
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    /// Identifier for a measurement event.
    pub fn event_id(&self, measure_id: &str, submission_id: &str) -> Uuid {
        self.mint(&format!("{measure_id}:{submission_id}:event"))
    }

    /// Identifier for a single observation, seeded on the observation code
    /// (item_id or scale_id).
    pub fn observation_id(&self, measure_id: &str, submission_id: &str, code: &str) -> Uuid {
        self.mint(&format!("{measure_id}:{submission_id}:{code}"))
    }

    fn mint(&self, seed: &str) -> Uuid {
        if self.deterministic {
            Uuid::new_v5(&TALLY_NAMESPACE, seed.as_bytes())
        } else {
            Uuid::new_v4()
        }
    }
}
