//! Verifier configuration.
//!
//! Loaded from JSON at runtime; every key is optional. The
//! `maxConsecutiveSlotsPerFaculty` spelling used by the scheduling input's
//! resource constraints is accepted as an alias.

use serde::{Deserialize, Serialize};

use crate::error::DataError;

/// How the verifier treats co-scheduled groups whose relationship is
/// neither a known conflict nor a known parallel pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownPairPolicy {
    /// Report the pair as a student-group overlap.
    #[default]
    Conflict,
    /// Report only confirmed conflicts.
    Ignore,
}

/// Schedule verifier settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VerifierConfig {
    /// Longest allowed run of adjacent slots for one faculty member per day.
    #[serde(alias = "maxConsecutiveSlotsPerFaculty")]
    pub max_consecutive_slots: usize,

    /// Treatment of undetermined group pairs.
    pub unknown_pair_policy: UnknownPairPolicy,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            max_consecutive_slots: 3,
            unknown_pair_policy: UnknownPairPolicy::Conflict,
        }
    }
}

impl VerifierConfig {
    /// Sets the consecutive-slot threshold.
    pub fn with_max_consecutive_slots(mut self, max: usize) -> Self {
        self.max_consecutive_slots = max;
        self
    }

    /// Sets the unknown-pair policy.
    pub fn with_unknown_pair_policy(mut self, policy: UnknownPairPolicy) -> Self {
        self.unknown_pair_policy = policy;
        self
    }

    /// Parses a configuration document.
    pub fn from_json_str(json: &str) -> Result<Self, DataError> {
        serde_json::from_str(json).map_err(|source| DataError::Json {
            context: "verifier config".into(),
            source,
        })
    }
}
