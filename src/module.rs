/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! [BundlesModule], the single entry point a host runtime drives (design doc §4.6). Mirrors the
//! reference runtime's `Runtime::transition_v1`: the façade owns no state of its own, only a
//! handle to the injected world state plus the block-scoped parameters and timestamp, and offers
//! one method per external message kind (§6).

use crate::commands::{bundles, pool_admin, staking};
use crate::context::Context;
use crate::end_block;
use crate::error::TransitionError;
use crate::params::Params;
use crate::store::WorldState;
use crate::types::{Address, PoolId, Vote};

/// The bundle-proposal state machine, parameterized over a concrete [WorldState] implementation.
pub struct BundlesModule<'a, S: WorldState> {
    ctx: Context<'a, S>,
}

impl<'a, S: WorldState> BundlesModule<'a, S> {
    pub fn new(state: &'a mut S, params: Params, now: u64) -> Self {
        Self {
            ctx: Context::new(state, params, now),
        }
    }

    /// `MsgJoinPool`.
    pub fn join_pool(
        &mut self,
        creator: Address,
        pool_id: PoolId,
        staker: Address,
        operator_key: Address,
    ) -> Result<(), TransitionError> {
        staking::join_pool(&mut self.ctx, &creator, pool_id, &staker, operator_key)
    }

    /// `MsgClaimUploaderRole`.
    pub fn claim_uploader_role(
        &mut self,
        creator: Address,
        staker: Address,
        pool_id: PoolId,
    ) -> Result<(), TransitionError> {
        bundles::claim_uploader_role(&mut self.ctx, &creator, &staker, pool_id)
    }

    /// `MsgSubmitBundleProposal`.
    #[allow(clippy::too_many_arguments)]
    pub fn submit_bundle_proposal(
        &mut self,
        creator: Address,
        staker: Address,
        pool_id: PoolId,
        storage_id: String,
        data_size: u64,
        data_hash: Vec<u8>,
        from_index: u64,
        bundle_size: u64,
        from_key: String,
        to_key: String,
        bundle_summary: String,
    ) -> Result<(), TransitionError> {
        bundles::submit_bundle_proposal(
            &mut self.ctx,
            &creator,
            &staker,
            pool_id,
            data_size,
            data_hash,
            from_index,
            bundle_size,
            from_key,
            to_key,
            bundle_summary,
            storage_id,
        )
    }

    /// `MsgVoteBundleProposal`.
    pub fn vote_bundle_proposal(
        &mut self,
        creator: Address,
        staker: Address,
        pool_id: PoolId,
        storage_id: &str,
        vote: Vote,
    ) -> Result<(), TransitionError> {
        bundles::vote_bundle_proposal(&mut self.ctx, &creator, &staker, pool_id, storage_id, vote)
    }

    /// `MsgSkipUploaderRole`.
    pub fn skip_uploader_role(
        &mut self,
        creator: Address,
        staker: Address,
        pool_id: PoolId,
        from_index: u64,
    ) -> Result<(), TransitionError> {
        bundles::skip_uploader_role(&mut self.ctx, &creator, &staker, pool_id, from_index)
    }

    /// `MsgFundPool`.
    pub fn fund_pool(&mut self, pool_id: PoolId, amount: u64) -> Result<(), TransitionError> {
        pool_admin::fund_pool(&mut self.ctx, pool_id, amount)
    }

    /// `MsgDefundPool`.
    pub fn defund_pool(
        &mut self,
        creator: Address,
        pool_id: PoolId,
        amount: u64,
    ) -> Result<(), TransitionError> {
        pool_admin::defund_pool(&mut self.ctx, &creator, pool_id, amount)
    }

    /// `MsgDisablePool`.
    pub fn disable_pool(
        &mut self,
        authority: Address,
        pool_id: PoolId,
    ) -> Result<(), TransitionError> {
        pool_admin::disable_pool(&mut self.ctx, &authority, pool_id)
    }

    /// The end-of-block hook (design doc §4.5), run once per block after every message in it.
    pub fn end_block(&mut self) {
        end_block::run_end_block(&mut self.ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::InMemoryState;

    #[test]
    fn facade_round_trip() {
        let mut state = InMemoryState::new();
        let pool_id = state.create_pool(1_000, 0, 500, 0);
        let staker = [1u8; 20];
        state.create_staker(staker, 100, 0);
        state.add_member(pool_id, staker, staker);

        let mut module = BundlesModule::new(&mut state, Params::default(), 0);
        module.claim_uploader_role(staker, staker, pool_id).unwrap();
        module
            .submit_bundle_proposal(
                staker,
                staker,
                pool_id,
                "ar://1".into(),
                10,
                vec![],
                0,
                5,
                "a".into(),
                "b".into(),
                "s".into(),
            )
            .unwrap();
        module.end_block();
    }
}
