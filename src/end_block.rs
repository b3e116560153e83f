/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The end-of-block handler (design doc §4.5): runs once per block, after every message, over
//! every pool in canonical (ascending id) order. Mirrors the reference runtime's
//! `commands/protocol.rs::next_epoch` batch-over-all-accounts shape, but triggered every block
//! rather than every epoch.

use crate::context::Context;
use crate::selector::{entropy, select_next_uploader};
use crate::slashing::apply_uploader_timeout_point;
use crate::store::WorldState;
use crate::types::ProposalState;

const NO_ADDRESS: crate::types::Address = [0u8; 20];

/// Runs the end-block tick over every pool. Never fails: suppressed or malformed pools are simply
/// left untouched for this tick rather than aborting the whole batch (design doc §5: "no partial
/// payout" applies within a single message, not across this best-effort sweep).
pub fn run_end_block<S: WorldState>(ctx: &mut Context<S>) {
    for pool_id in ctx.state.pool_ids() {
        tick_pool(ctx, pool_id);
    }
}

fn tick_pool<S: WorldState>(ctx: &mut Context<S>, pool_id: crate::types::PoolId) {
    let Some(mut pool) = ctx.state.get_pool(pool_id) else {
        return;
    };
    let Some(mut proposal) = ctx.state.get_proposal(pool_id) else {
        return;
    };

    let members = ctx.state.members_of(pool_id);
    let total_delegation: u64 = members.iter().map(|m| ctx.state.delegation_of(m)).sum();

    let suppressed = pool.disabled
        || pool.is_upgrading(ctx.now)
        || total_delegation < pool.min_delegation
        || pool.total_funding == 0;

    if suppressed {
        if pool.disabled {
            proposal.reset(NO_ADDRESS, ctx.now);
            for member in &members {
                ctx.state.remove_valaccount(pool_id, member);
            }
        } else if proposal.state() != ProposalState::Open {
            proposal.next_uploader = NO_ADDRESS;
        }
        ctx.state.set_proposal(proposal);
        ctx.state.set_pool(pool);
        return;
    }

    let timed_out = ctx.now
        >= proposal
            .updated_at
            .saturating_add(pool.upload_interval)
            .saturating_add(ctx.params.upload_timeout)
        && matches!(
            proposal.state(),
            ProposalState::Open | ProposalState::Genesis
        );

    if timed_out {
        match proposal.state() {
            // In both states, a missed submission deadline is a missed duty of whoever owed the
            // *next* bundle (`proposal.next_uploader`), not a finalization of whatever is already
            // Open. An Open bundle's content (storage_id, votes, uploader) is left untouched here;
            // it only gets finalized when the next `SubmitBundleProposal` actually arrives.
            ProposalState::Genesis | ProposalState::Open => {
                let timed_out_uploader = proposal.next_uploader;
                apply_uploader_timeout_point(ctx, pool_id, &timed_out_uploader);
                let members = ctx.state.members_of(pool_id);
                let seed = entropy(pool_id, ctx.now, &proposal.storage_id);
                let next_uploader = select_next_uploader(
                    &members,
                    |m| ctx.state.delegation_of(m),
                    seed,
                    Some(&timed_out_uploader),
                );
                proposal.next_uploader = next_uploader.unwrap_or(NO_ADDRESS);
                proposal.updated_at = ctx.now;
                ctx.state.set_proposal(proposal);
                ctx.state.set_pool(pool);
            }
            ProposalState::Empty => unreachable!("guarded by the match above"),
        }
        return;
    }

    if members.is_empty() && proposal.state() != ProposalState::Open {
        proposal.next_uploader = NO_ADDRESS;
        ctx.state.set_proposal(proposal);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::bundles::{claim_uploader_role, submit_bundle_proposal};
    use crate::params::Params;
    use crate::store::{PoolStore, ProposalStore, ValaccountStore};
    use crate::testutil::InMemoryState;

    fn addr(n: u8) -> crate::types::Address {
        let mut a = [0u8; 20];
        a[19] = n;
        a
    }

    #[test]
    fn genesis_timeout_respects_interval_before_timeout_clock() {
        let mut state = InMemoryState::new();
        let pool_id = state.create_pool(1_000, 60, 500, 0);
        let staker = addr(1);
        state.create_staker(staker, 100, 0);
        state.add_member(pool_id, staker, staker);

        let mut ctx = Context::new(&mut state, Params::default(), 0);
        claim_uploader_role(&mut ctx, &staker, &staker, pool_id).unwrap();

        // upload_timeout alone (default 600) has elapsed, but upload_interval (60) has not
        // additionally elapsed on top of it yet relative to updated_at=0: total required is 660.
        let mut ctx = Context::new(&mut state, Params::default(), 600);
        run_end_block(&mut ctx);
        assert_eq!(
            ctx.state.get_proposal(pool_id).unwrap().next_uploader,
            staker
        );

        let mut ctx = Context::new(&mut state, Params::default(), 660);
        run_end_block(&mut ctx);
        // Sole member still selects itself, but updated_at must have advanced.
        assert_eq!(ctx.state.get_proposal(pool_id).unwrap().updated_at, 660);
    }

    #[test]
    fn defunding_does_not_clear_next_uploader_until_a_tick() {
        let mut state = InMemoryState::new();
        let pool_id = state.create_pool(1_000, 60, 500, 0);
        let staker = addr(1);
        state.create_staker(staker, 100, 0);
        state.add_member(pool_id, staker, staker);

        let mut ctx = Context::new(&mut state, Params::default(), 0);
        crate::commands::pool_admin::fund_pool(&mut ctx, pool_id, 500).unwrap();
        claim_uploader_role(&mut ctx, &staker, &staker, pool_id).unwrap();

        crate::commands::pool_admin::defund_pool(&mut ctx, &staker, pool_id, 500).unwrap();
        assert_eq!(
            ctx.state.get_proposal(pool_id).unwrap().next_uploader,
            staker
        );

        run_end_block(&mut ctx);
        assert_eq!(
            ctx.state.get_proposal(pool_id).unwrap().next_uploader,
            NO_ADDRESS
        );
    }

    #[test]
    fn disabled_pool_evicts_members_and_drops_open_proposal() {
        let mut state = InMemoryState::new();
        let pool_id = state.create_pool(1_000, 0, 500, 0);
        let staker = addr(1);
        state.create_staker(staker, 100, 0);
        state.add_member(pool_id, staker, staker);

        let mut ctx = Context::new(&mut state, Params::default(), 0);
        crate::commands::pool_admin::fund_pool(&mut ctx, pool_id, 500).unwrap();
        claim_uploader_role(&mut ctx, &staker, &staker, pool_id).unwrap();
        submit_bundle_proposal(
            &mut ctx, &staker, &staker, pool_id, 10, vec![], 0, 5, "a".into(), "b".into(),
            "s".into(), "ar://1".into(),
        )
        .unwrap();

        let mut pool = ctx.state.get_pool(pool_id).unwrap();
        pool.disabled = true;
        ctx.state.set_pool(pool);

        run_end_block(&mut ctx);

        assert!(ctx.state.get_valaccount(pool_id, &staker).is_none());
        let proposal = ctx.state.get_proposal(pool_id).unwrap();
        assert_eq!(proposal.state(), ProposalState::Empty);
    }
}
