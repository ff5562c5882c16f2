use thiserror::Error;

use hip_types::Hit;

#[derive(Debug, Error)]
pub enum HidError {
    #[error("a host identity with HIT {0} is already present")]
    DuplicateHit(Hit),

    #[error("no host identity found for HIT {0}")]
    NotFound(Hit),
}
