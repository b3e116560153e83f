/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Bundles everything a single message handler needs: the world state, the current protocol
//! parameters, and the block's timestamp. Mirrors the reference runtime's `TransitionContext`,
//! which similarly pairs a mutable store handle with read-only block metadata for the lifetime
//! of one state transition.

use crate::params::Params;
use crate::store::WorldState;

/// Execution context for a single message or end-block pass.
///
/// `now` is the Unix timestamp of the current block. Every timing computation in this crate
/// (upload timeouts, upgrade windows) is expressed against this single value rather than a wall
/// clock, so a replay of the same block always derives the same outcome.
pub struct Context<'a, S: WorldState> {
    pub state: &'a mut S,
    pub params: Params,
    pub now: u64,
}

impl<'a, S: WorldState> Context<'a, S> {
    pub fn new(state: &'a mut S, params: Params, now: u64) -> Self {
        Self { state, params, now }
    }
}
