/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The reward engine (design doc §4.2): splits a finalized bundle's payout between the network
//! treasury, the uploader's storage cost, the uploader's staking commission, and that uploader's
//! delegators — mirroring the treasury/commission/delegation split the reference runtime performs
//! once per epoch in `commands/protocol.rs::next_epoch`, but here triggered per finalized bundle.

use crate::context::Context;
use crate::params::Params;
use crate::rate::split_floor;
use crate::store::WorldState;
use crate::types::Address;

/// The result of splitting a single bundle's payout, for callers that want to observe the
/// breakdown (e.g. tests asserting the exact residue amounts).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardBreakdown {
    pub treasury: u64,
    pub storage_cost: u64,
    pub commission: u64,
    pub delegation_reward: u64,
}

/// Splits `operating_cost` for one finalized bundle uploaded by `uploader`, crediting each part
/// via the world-state capabilities and returning the breakdown.
///
/// Order of splits (§4.2): the network fee is taken off the top, then storage cost is paid from
/// what remains (proportional to `data_size`, capped at what's left after the fee), then the
/// remainder is split between the uploader's commission and their delegators' rewards by the
/// uploader's own commission rate. Every split uses [split_floor] so truncation residue is always
/// accounted for rather than silently lost.
pub fn distribute_bundle_reward<S: WorldState>(
    ctx: &mut Context<S>,
    uploader: &Address,
    operating_cost: u64,
    data_size: u64,
) -> RewardBreakdown {
    let Params {
        network_fee_rate,
        storage_cost_rate,
        ..
    } = ctx.params;

    let (treasury, after_fee) = split_floor(operating_cost, network_fee_rate);
    ctx.state.credit_treasury(treasury);

    let storage_cost_uncapped = storage_cost_rate.mul_floor(data_size);
    let storage_cost = storage_cost_uncapped.min(after_fee);
    let remainder = after_fee - storage_cost;

    let commission_rate = ctx.state.commission_rate(uploader);
    let (commission, delegation_reward) = split_floor(remainder, commission_rate);

    if storage_cost > 0 {
        ctx.state.credit_commission(uploader, storage_cost);
    }
    if commission > 0 {
        ctx.state.credit_commission(uploader, commission);
    }
    if delegation_reward > 0 {
        ctx.state
            .credit_outstanding_delegation_rewards(uploader, delegation_reward);
    }

    RewardBreakdown {
        treasury,
        storage_cost,
        commission,
        delegation_reward,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::InMemoryState;

    #[test]
    fn splits_are_exhaustive_and_nonoverlapping() {
        let mut state = InMemoryState::new();
        let uploader = [1u8; 20];
        state.create_staker(uploader, 1_000, 10);

        let params = Params::default();
        let mut ctx = Context::new(&mut state, params, 0);

        let breakdown = distribute_bundle_reward(&mut ctx, &uploader, 1_000, 500);

        let total_accounted =
            breakdown.treasury + breakdown.storage_cost + breakdown.commission + breakdown.delegation_reward;
        assert_eq!(total_accounted, 1_000);
    }

    #[test]
    fn zero_operating_cost_yields_zero_everywhere() {
        let mut state = InMemoryState::new();
        let uploader = [1u8; 20];
        state.create_staker(uploader, 1_000, 10);

        let params = Params::default();
        let mut ctx = Context::new(&mut state, params, 0);

        let breakdown = distribute_bundle_reward(&mut ctx, &uploader, 0, 0);
        assert_eq!(breakdown, RewardBreakdown {
            treasury: 0,
            storage_cost: 0,
            commission: 0,
            delegation_reward: 0,
        });
    }
}
