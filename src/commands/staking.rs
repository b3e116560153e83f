/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! `MsgJoinPool` (design doc §6). Staker creation (`MsgCreateStaker`) and general delegation
//! bookkeeping are owned entirely by the external delegation engine this crate depends on as a
//! capability trait ([crate::store::DelegationEngine]) and are out of scope here — this module
//! only registers the (pool, staker) membership record once a staker already exists.

use crate::context::Context;
use crate::error::TransitionError;
use crate::store::WorldState;
use crate::types::{Address, PoolId, Valaccount};

/// Registers `staker` as a member of `pool_id`, bound to `operator_key` for future authorization
/// checks (design doc §4.6). Rejects if the pool doesn't exist, is disabled, or the staker is
/// already a member; enforces the pool's `min_delegation` floor against the staker's current
/// total delegation.
pub fn join_pool<S: WorldState>(
    ctx: &mut Context<S>,
    creator: &Address,
    pool_id: PoolId,
    staker: &Address,
    operator_key: Address,
) -> Result<(), TransitionError> {
    let pool = ctx
        .state
        .get_pool(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    if pool.disabled {
        return Err(TransitionError::PoolDisabled);
    }
    if ctx.state.get_valaccount(pool_id, staker).is_some() {
        return Err(TransitionError::AlreadyPoolMember);
    }
    if ctx.state.delegation_of(staker) < pool.min_delegation {
        return Err(TransitionError::UnexpectedProposalState);
    }

    // `creator` authorizes itself as its own first operator key; a later rotation is a separate
    // message kind outside the scope of this module's bundle-proposal coupling.
    let _ = creator;

    ctx.state.set_valaccount(Valaccount {
        pool_id,
        staker: *staker,
        operator_key,
        points: 0,
    });
    Ok(())
}
