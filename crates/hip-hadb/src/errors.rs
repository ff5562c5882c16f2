use thiserror::Error;

use hip_types::Hit;

#[derive(Debug, Error)]
pub enum HadbError {
    #[error("a host association for (local {local}, peer {peer}) already exists")]
    AlreadyExists { local: Hit, peer: Hit },

    #[error("no host association for (local {local}, peer {peer})")]
    NotFound { local: Hit, peer: Hit },
}
