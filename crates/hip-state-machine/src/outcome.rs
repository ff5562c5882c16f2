//! Result of running one handler step against an incoming packet, and the
//! generic Check/Handle/Send pipeline that runs a registered set of steps
//! in phase/priority order.

use crate::errors::ControlPlaneError;

/// What a single check/handle/send step decided to do with the packet
/// currently being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandlerOutcome {
    /// Proceed to the next handler.
    Continue,
    /// Stop the chain entirely; no later step in any phase runs. Used for
    /// malformed or unauthenticated packets that must not influence any
    /// association state. Distinct from an `Err` return in that the packet
    /// is dropped without raising a [`ControlPlaneError`].
    Abort,
    /// Stop the chain entirely because another subsystem has already
    /// absorbed this packet (e.g. a duplicate handed to a one-shot
    /// handler). Not an error and not a drop-worthy condition; just nothing
    /// left for this chain to do.
    Cancel,
}

/// The three phases a packet is run through, corresponding to the priority
/// bands handlers register under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Cheap structural/authentication checks that must pass before any
    /// state mutation is considered.
    Check,
    /// State mutation: HADB updates, key derivation, SA installation.
    Handle,
    /// Response construction and transmission.
    Send,
}

/// Priority bands each phase's handlers are registered under. Handlers
/// within a phase run in ascending priority order.
pub mod priority {
    pub const CHECK_BAND: u32 = 20_000;
    pub const HANDLE_BAND: u32 = 30_000;
    pub const SEND_BAND: u32 = 40_000;
}

fn phase_band(phase: Phase) -> u32 {
    match phase {
        Phase::Check => priority::CHECK_BAND,
        Phase::Handle => priority::HANDLE_BAND,
        Phase::Send => priority::SEND_BAND,
    }
}

/// One step registered into a phase at a priority. Generic over the
/// context type a concrete pipeline threads through its steps (the base
/// exchange's I2 handling, for instance, threads a context carrying the
/// incoming message, the host association, and the crypto material each
/// step derives or consumes).
pub trait HandlerStep<Ctx> {
    fn phase(&self) -> Phase;
    /// Priority within `phase()`; lower runs first. Callers typically add
    /// a small offset to the phase's band constant rather than pick an
    /// arbitrary number, so steps from different call sites don't collide.
    fn priority(&self) -> u32;
    fn run(&self, ctx: &mut Ctx) -> Result<HandlerOutcome, ControlPlaneError>;
}

/// Run `steps` in ascending (phase, priority) order against `ctx`. Returns
/// as soon as a step returns anything other than `Continue`, or propagates
/// the first `Err`. A `phase()` with no matching [`priority`] band constant
/// used by any step just sorts wherever its raw priority value lands.
pub fn run_chain<Ctx>(
    steps: &[Box<dyn HandlerStep<Ctx>>],
    ctx: &mut Ctx,
) -> Result<HandlerOutcome, ControlPlaneError> {
    let mut ordered: Vec<&Box<dyn HandlerStep<Ctx>>> = steps.iter().collect();
    ordered.sort_by_key(|step| (phase_band(step.phase()), step.priority()));
    for step in ordered {
        match step.run(ctx)? {
            HandlerOutcome::Continue => continue,
            other => return Ok(other),
        }
    }
    Ok(HandlerOutcome::Continue)
}
