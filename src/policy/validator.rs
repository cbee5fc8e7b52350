//! Single-policy rule for comparison runs.

use crate::errors::ConfigurationError;

use super::{PolicyConfiguration, PolicyKind};

/// Check that a configuration used for comparison holds exactly one policy,
/// returning that policy's kind.
pub fn validate_single_policy(
    config: &PolicyConfiguration,
) -> Result<&PolicyKind, ConfigurationError> {
    match config.policies.as_slice() {
        [only] => Ok(&only.kind),
        other => Err(ConfigurationError::NotSinglePolicy {
            path: config.source.clone(),
            count: other.len(),
        }),
    }
}
