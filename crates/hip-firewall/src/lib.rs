//! Connection tracking for the HIP-aware firewall: per-tuple HIP and ESP
//! association state, transitioned purely by observing control-plane
//! traffic (no access to the daemon's own HADB).

mod conn;
mod tracker;
mod tuple;

pub use conn::{ConnState, Connection};
pub use tracker::ConnectionTracker;
pub use tuple::{Direction, EspTuple, HipTuple};
