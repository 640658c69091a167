//! Validation windows and limits.

/// Maximum number of state actions in one hash proof.
pub const MAX_PROOF_ELEMENTS: usize = 10_000;

const SECOND_MS: u64 = 1_000;
const MINUTE_MS: u64 = 60 * SECOND_MS;
const HOUR_MS: u64 = 60 * MINUTE_MS;

/// Configuration shared by every ledger structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerConfig {
    /// Upper bound on hash proof payload size.
    pub max_proof_elements: usize,
    /// How far a header timestamp may lag behind the clock.
    pub max_past_drift_ms: u64,
    /// How far a header timestamp may run ahead of the clock.
    pub max_future_drift_ms: u64,
    /// Largest step a relay block timestamp advances on consider.
    pub relay_timestamp_advance_cap_ms: u64,
    /// Age below which a cluster block still accepts elements.
    pub cluster_open_window_ms: u64,
    /// Length of the cluster block voting phase.
    pub cluster_voting_window_ms: u64,
    /// Highest difficulty a hash proof may declare.
    pub max_difficulty: u64,
    /// Newest structure version this node understands.
    pub supported_version: u64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            max_proof_elements: MAX_PROOF_ELEMENTS,
            max_past_drift_ms: 24 * HOUR_MS,
            max_future_drift_ms: 2 * HOUR_MS,
            relay_timestamp_advance_cap_ms: 10 * MINUTE_MS,
            cluster_open_window_ms: 60 * SECOND_MS,
            cluster_voting_window_ms: 5 * SECOND_MS,
            max_difficulty: 1 << 48,
            supported_version: 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LedgerConfig::default();
        assert_eq!(config.max_proof_elements, 10_000);
        assert_eq!(config.max_past_drift_ms, 86_400_000);
        assert_eq!(config.max_future_drift_ms, 7_200_000);
        assert_eq!(config.relay_timestamp_advance_cap_ms, 600_000);
        assert_eq!(config.cluster_open_window_ms, 60_000);
        assert_eq!(config.cluster_voting_window_ms, 5_000);
    }
}
