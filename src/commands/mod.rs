/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! One module per family of external messages (design doc §6), mirroring the reference runtime's
//! `commands::staking` / `commands::account` split: each function validates its own preconditions
//! left-to-right before performing its first mutation, and returns `Err` without having mutated
//! anything on any rejected path.

pub mod bundles;
pub mod pool_admin;
pub mod staking;

use crate::context::Context;
use crate::error::TransitionError;
use crate::store::WorldState;
use crate::types::{Address, PoolId};

/// Verifies that `creator` owns the operator key bound to `staker` within `pool_id` (design doc
/// §4.6: "the creator signature must belong to the valaddress bound to the staker"). This module
/// never verifies signatures; the host runtime has already authenticated `creator` before the
/// message reaches here.
pub(crate) fn authorize_staker<S: WorldState>(
    ctx: &Context<S>,
    pool_id: PoolId,
    staker: &Address,
    creator: &Address,
) -> Result<(), TransitionError> {
    let valaccount = ctx
        .state
        .get_valaccount(pool_id, staker)
        .ok_or(TransitionError::NotPoolMember)?;
    if &valaccount.operator_key != creator {
        return Err(TransitionError::Unauthorized);
    }
    Ok(())
}
