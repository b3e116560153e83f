/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Pool treasury and governance messages (design doc §6): `MsgFundPool`, `MsgDefundPool`,
//! `MsgDisablePool`.

use crate::context::Context;
use crate::error::TransitionError;
use crate::store::WorldState;
use crate::types::{Address, PoolId};

/// `MsgFundPool`: adds `amount` to the pool's earmarked funding balance. Anyone may fund a pool.
pub fn fund_pool<S: WorldState>(
    ctx: &mut Context<S>,
    pool_id: PoolId,
    amount: u64,
) -> Result<(), TransitionError> {
    let mut pool = ctx
        .state
        .get_pool(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    pool.total_funding = pool
        .total_funding
        .checked_add(amount)
        .ok_or(TransitionError::InvariantViolation("pool funding overflow"))?;
    ctx.state.set_pool(pool);
    Ok(())
}

/// `MsgDefundPool`: withdraws `amount` of a pool's earmarked funding back to `creator`. Rejects
/// if `amount` exceeds the pool's current funding; does not itself clear `next_uploader` even if
/// the pool is thereby driven to zero (design doc §8, scenario 8 — that re-evaluation happens only
/// at the next end-block tick).
pub fn defund_pool<S: WorldState>(
    ctx: &mut Context<S>,
    creator: &Address,
    pool_id: PoolId,
    amount: u64,
) -> Result<(), TransitionError> {
    let mut pool = ctx
        .state
        .get_pool(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    if amount > pool.total_funding {
        return Err(TransitionError::InvariantViolation(
            "defund amount exceeds pool funding",
        ));
    }
    pool.total_funding -= amount;
    ctx.state.set_pool(pool);
    ctx.state.payout(creator, amount);
    Ok(())
}

/// `MsgDisablePool`: governance-only. Drops any in-flight proposal, evicts every member (no
/// slash; disabling is not a fault of the members), and sweeps the remaining funding balance out
/// to `authority` (design doc §8, scenario 6).
pub fn disable_pool<S: WorldState>(
    ctx: &mut Context<S>,
    authority: &Address,
    pool_id: PoolId,
) -> Result<(), TransitionError> {
    if !ctx.state.is_governance_authority(authority) {
        return Err(TransitionError::NotGovernanceAuthority);
    }
    let mut pool = ctx
        .state
        .get_pool(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;

    let mut proposal = ctx
        .state
        .get_proposal(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    proposal.reset([0u8; 20], ctx.now);
    ctx.state.set_proposal(proposal);

    for member in ctx.state.members_of(pool_id) {
        ctx.state.remove_valaccount(pool_id, &member);
    }

    let remaining = pool.total_funding;
    pool.total_funding = 0;
    pool.disabled = true;
    ctx.state.set_pool(pool);
    if remaining > 0 {
        ctx.state.payout(authority, remaining);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Params;
    use crate::store::{PoolStore, ValaccountStore};
    use crate::testutil::InMemoryState;

    fn addr(n: u8) -> Address {
        let mut a = [0u8; 20];
        a[19] = n;
        a
    }

    #[test]
    fn fund_then_defund_round_trips() {
        let mut state = InMemoryState::new();
        let pool_id = state.create_pool(1_000, 60, 500, 0);
        let creator = addr(9);

        let mut ctx = Context::new(&mut state, Params::default(), 0);
        fund_pool(&mut ctx, pool_id, 1_000).unwrap();
        defund_pool(&mut ctx, &creator, pool_id, 400).unwrap();

        assert_eq!(ctx.state.get_pool(pool_id).unwrap().total_funding, 600);
    }

    #[test]
    fn defund_more_than_balance_is_rejected() {
        let mut state = InMemoryState::new();
        let pool_id = state.create_pool(1_000, 60, 500, 0);
        let creator = addr(9);

        let mut ctx = Context::new(&mut state, Params::default(), 0);
        fund_pool(&mut ctx, pool_id, 100).unwrap();
        let err = defund_pool(&mut ctx, &creator, pool_id, 200).unwrap_err();
        assert!(matches!(err, TransitionError::InvariantViolation(_)));
    }

    #[test]
    fn disable_requires_governance_authority() {
        let mut state = InMemoryState::new();
        let pool_id = state.create_pool(1_000, 60, 500, 0);
        let not_governance = addr(1);

        let mut ctx = Context::new(&mut state, Params::default(), 0);
        let err = disable_pool(&mut ctx, &not_governance, pool_id).unwrap_err();
        assert_eq!(err, TransitionError::NotGovernanceAuthority);
    }

    #[test]
    fn disable_evicts_members_and_sweeps_funding() {
        let mut state = InMemoryState::new();
        let pool_id = state.create_pool(1_000, 60, 500, 0);
        let staker = addr(1);
        state.create_staker(staker, 100, 0);
        state.add_member(pool_id, staker, staker);
        let governance = state.governance_authority();

        let mut ctx = Context::new(&mut state, Params::default(), 0);
        fund_pool(&mut ctx, pool_id, 500).unwrap();
        disable_pool(&mut ctx, &governance, pool_id).unwrap();

        assert!(ctx.state.get_valaccount(pool_id, &staker).is_none());
        let pool = ctx.state.get_pool(pool_id).unwrap();
        assert!(pool.disabled);
        assert_eq!(pool.total_funding, 0);
    }
}
