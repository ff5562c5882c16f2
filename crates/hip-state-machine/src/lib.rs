//! Control-plane decision logic: canonical state transitions, I2/I2
//! collision resolution, UPDATE classification, and the error taxonomy
//! that governs how a failed check affects the packet and the
//! association it belongs to.

mod collision;
mod errors;
mod outcome;
mod processor;
mod transitions;
mod update;

pub use collision::{resolve_i2_collision, CollisionAction};
pub use errors::{policy_for, ControlPlaneError, Policy, RaisedError};
pub use outcome::{priority, run_chain, HandlerOutcome, HandlerStep, Phase};
pub use processor::{handle_i1, handle_i2, I2Outcome, LocalIdentity};
pub use transitions::next_state;
pub use update::{classify, UpdateKind, UpdateTlvPresence};
