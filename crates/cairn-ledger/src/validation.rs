//! Checks shared by the block structures.

use cairn_auth::{MultiAuthorization, Signable};
use cairn_core::ValidationError;

use crate::config::LedgerConfig;

/// Whether `name` has the `partition.ledger` shape, e.g. `core.banking`.
///
/// Exactly two non-empty segments of ASCII alphanumerics, `-` or `_`.
pub fn is_valid_cluster_name(name: &str) -> bool {
    let segment_ok = |s: &str| {
        !s.is_empty()
            && s
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
    };
    match name.split_once('.') {
        Some((partition, ledger)) => segment_ok(partition) && segment_ok(ledger),
        None => false,
    }
}

pub(crate) fn check_cluster_name(name: &str) -> Result<(), ValidationError> {
    if is_valid_cluster_name(name) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCluster(name.to_string()))
    }
}

/// `timestamp` must lie within `[now - past drift, now + future drift]`.
pub(crate) fn check_timestamp_window(
    timestamp: u64,
    now: u64,
    config: &LedgerConfig,
) -> Result<(), ValidationError> {
    let earliest = now.saturating_sub(config.max_past_drift_ms);
    let latest = now.saturating_add(config.max_future_drift_ms);
    if timestamp < earliest || timestamp > latest {
        return Err(ValidationError::TimestampOutOfWindow { timestamp, now });
    }
    Ok(())
}

/// At least one authorization, the proposer among the signers, and every
/// signature valid over `target`.
pub(crate) fn check_proposer_authorizations<T: Signable + ?Sized>(
    authorizations: &MultiAuthorization,
    proposer: &str,
    target: &T,
) -> Result<(), ValidationError> {
    if authorizations.is_empty() {
        return Err(ValidationError::MissingAuthorization);
    }
    if !authorizations.contains(proposer) {
        return Err(ValidationError::ProposerAuthorizationRequired);
    }
    authorizations.verify(target)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_names() {
        assert!(is_valid_cluster_name("core.banking"));
        assert!(is_valid_cluster_name("eu-west.settle_2"));
        assert!(!is_valid_cluster_name("core"));
        assert!(!is_valid_cluster_name("core."));
        assert!(!is_valid_cluster_name(".banking"));
        assert!(!is_valid_cluster_name("core.banking.eu"));
        assert!(!is_valid_cluster_name("core banking.x"));
    }

    #[test]
    fn test_timestamp_window() {
        let config = LedgerConfig::default();
        let now = 100 * 3_600_000;
        assert!(check_timestamp_window(now, now, &config).is_ok());
        assert!(check_timestamp_window(now - config.max_past_drift_ms, now, &config).is_ok());
        assert!(check_timestamp_window(now + config.max_future_drift_ms, now, &config).is_ok());
        assert_eq!(
            check_timestamp_window(now + config.max_future_drift_ms + 1, now, &config),
            Err(ValidationError::TimestampOutOfWindow {
                timestamp: now + config.max_future_drift_ms + 1,
                now
            })
        );
        assert!(check_timestamp_window(now - config.max_past_drift_ms - 1, now, &config).is_err());
    }

    #[test]
    fn test_empty_authorizations_rejected() {
        struct Nothing;
        impl Signable for Nothing {
            fn signable_bytes(&self) -> Vec<u8> {
                Vec::new()
            }
        }
        assert_eq!(
            check_proposer_authorizations(&MultiAuthorization::new(), "alice", &Nothing),
            Err(ValidationError::MissingAuthorization)
        );
    }
}
