/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The four bundle-proposal messages (design doc §4.4): `ClaimUploaderRole`,
//! `SubmitBundleProposal`, `VoteBundleProposal`, `SkipUploaderRole`. Each function validates every
//! precondition before its first mutation, the same left-to-right discipline the reference
//! runtime's `commands::staking` functions use.

use crate::commands::authorize_staker;
use crate::context::Context;
use crate::error::TransitionError;
use crate::rewards::distribute_bundle_reward;
use crate::selector::{entropy, select_next_uploader};
use crate::slashing::{
    apply_point_outcome, apply_voter_outcome, quorum_outcome, slash_uploader, PointOutcome,
    QuorumOutcome,
};
use crate::store::WorldState;
use crate::types::{Address, FinalizedBundle, Pool, PoolId, ProposalState, Vote};

/// `ClaimUploaderRole` (design doc §4.4): Empty -> Genesis.
pub fn claim_uploader_role<S: WorldState>(
    ctx: &mut Context<S>,
    creator: &Address,
    staker: &Address,
    pool_id: PoolId,
) -> Result<(), TransitionError> {
    authorize_staker(ctx, pool_id, staker, creator)?;
    let pool = ctx
        .state
        .get_pool(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    if pool.disabled {
        return Err(TransitionError::PoolDisabled);
    }
    let proposal = ctx
        .state
        .get_proposal(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    if proposal.state() != ProposalState::Empty {
        return Err(TransitionError::UnexpectedProposalState);
    }

    let mut proposal = proposal;
    proposal.next_uploader = *staker;
    ctx.state.set_proposal(proposal);
    Ok(())
}

/// `SubmitBundleProposal` (design doc §4.4): finalizes the previous round (if Open), then opens
/// the new one. `fields` carries the wire message's content fields verbatim.
#[allow(clippy::too_many_arguments)]
pub fn submit_bundle_proposal<S: WorldState>(
    ctx: &mut Context<S>,
    creator: &Address,
    staker: &Address,
    pool_id: PoolId,
    data_size: u64,
    data_hash: Vec<u8>,
    from_index: u64,
    bundle_size: u64,
    from_key: String,
    to_key: String,
    bundle_summary: String,
    storage_id: String,
) -> Result<(), TransitionError> {
    authorize_staker(ctx, pool_id, staker, creator)?;
    let pool = ctx
        .state
        .get_pool(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    if pool.disabled {
        return Err(TransitionError::PoolDisabled);
    }
    if pool.is_upgrading(ctx.now) {
        return Err(TransitionError::PoolUpgrading);
    }
    if bundle_size > pool.max_bundle_size {
        return Err(TransitionError::BundleTooLarge);
    }
    if from_index != pool.current_index {
        return Err(TransitionError::WrongFromIndex);
    }

    let proposal = ctx
        .state
        .get_proposal(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    match proposal.state() {
        ProposalState::Genesis | ProposalState::Open => {}
        ProposalState::Empty => return Err(TransitionError::UnexpectedProposalState),
    }
    if proposal.next_uploader != *staker {
        return Err(TransitionError::NotNextUploader);
    }
    if ctx.now < proposal.updated_at.saturating_add(pool.upload_interval) {
        return Err(TransitionError::UploadIntervalNotElapsed);
    }

    let mut pool = pool;
    if proposal.state() == ProposalState::Open {
        finalize_open_proposal(ctx, &mut pool, &proposal)?;
    }

    let members = ctx.state.members_of(pool_id);
    let eligible_delegation_total: u64 = members.iter().map(|m| ctx.state.delegation_of(m)).sum();
    let seed = entropy(pool_id, ctx.now, &storage_id);
    let next_uploader = select_next_uploader(
        &members,
        |m| ctx.state.delegation_of(m),
        seed,
        Some(staker),
    );

    let mut new_proposal = ctx
        .state
        .get_proposal(pool_id)
        .ok_or(TransitionError::InvariantViolation("proposal vanished mid-handler"))?;
    new_proposal.storage_id = storage_id;
    new_proposal.uploader = *staker;
    new_proposal.next_uploader = next_uploader.unwrap_or([0u8; 20]);
    new_proposal.data_size = data_size;
    new_proposal.data_hash = data_hash;
    new_proposal.from_index = from_index;
    new_proposal.bundle_size = bundle_size;
    new_proposal.from_key = from_key;
    new_proposal.to_key = to_key;
    new_proposal.bundle_summary = bundle_summary;
    new_proposal.voters_valid = vec![*staker];
    new_proposal.voters_invalid = Vec::new();
    new_proposal.voters_abstain = Vec::new();
    new_proposal.updated_at = ctx.now;
    new_proposal.eligible_delegation_total = eligible_delegation_total;
    new_proposal.eligible_members = members;
    ctx.state.set_proposal(new_proposal);

    ctx.state.set_pool(pool);
    Ok(())
}

/// `VoteBundleProposal` (design doc §4.4 and §6): adds `staker` to the matching voter set.
pub fn vote_bundle_proposal<S: WorldState>(
    ctx: &mut Context<S>,
    creator: &Address,
    staker: &Address,
    pool_id: PoolId,
    storage_id: &str,
    vote: Vote,
) -> Result<(), TransitionError> {
    authorize_staker(ctx, pool_id, staker, creator)?;
    let mut proposal = ctx
        .state
        .get_proposal(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    if proposal.state() != ProposalState::Open {
        return Err(TransitionError::UnexpectedProposalState);
    }
    if proposal.storage_id != storage_id {
        return Err(TransitionError::StorageIdMismatch);
    }
    if proposal.uploader == *staker {
        return Err(TransitionError::UploaderCannotVote);
    }
    if proposal.has_voted(staker) {
        return Err(TransitionError::DuplicateVote);
    }

    match vote {
        Vote::Valid => proposal.voters_valid.push(*staker),
        Vote::Invalid => proposal.voters_invalid.push(*staker),
        Vote::Abstain => proposal.voters_abstain.push(*staker),
    }
    ctx.state.set_proposal(proposal);
    Ok(())
}

/// `SkipUploaderRole` (design doc §4.4): reselects `next_uploader`, excluding the skipper, without
/// altering any other proposal content.
pub fn skip_uploader_role<S: WorldState>(
    ctx: &mut Context<S>,
    creator: &Address,
    staker: &Address,
    pool_id: PoolId,
    from_index: u64,
) -> Result<(), TransitionError> {
    authorize_staker(ctx, pool_id, staker, creator)?;
    let pool = ctx
        .state
        .get_pool(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    if from_index != pool.current_index {
        return Err(TransitionError::WrongFromIndex);
    }
    let mut proposal = ctx
        .state
        .get_proposal(pool_id)
        .ok_or(TransitionError::PoolNotFound)?;
    if proposal.next_uploader != *staker {
        return Err(TransitionError::NotNextUploader);
    }

    let members = ctx.state.members_of(pool_id);
    let seed = entropy(pool_id, ctx.now, &proposal.storage_id);
    let next_uploader =
        select_next_uploader(&members, |m| ctx.state.delegation_of(m), seed, Some(staker));
    proposal.next_uploader = next_uploader.unwrap_or([0u8; 20]);
    ctx.state.set_proposal(proposal);
    Ok(())
}

/// Finalizes an Open proposal in place (reward/slash, pool index advance), called both from a
/// fresh submission (design doc §4.4) and from the end-block timeout path (design doc §4.5).
///
/// Does not touch `next_uploader`/`storage_id`; callers decide what the proposal becomes next.
pub(crate) fn finalize_open_proposal<S: WorldState>(
    ctx: &mut Context<S>,
    pool: &mut Pool,
    proposal: &crate::types::BundleProposal,
) -> Result<(), TransitionError> {
    let valid_delegation: u64 = proposal
        .voters_valid
        .iter()
        .map(|a| ctx.state.delegation_of(a))
        .sum();
    let invalid_delegation: u64 = proposal
        .voters_invalid
        .iter()
        .map(|a| ctx.state.delegation_of(a))
        .sum();
    let outcome = quorum_outcome(
        valid_delegation,
        invalid_delegation,
        proposal.eligible_delegation_total,
    );

    // Every participant whose outcome needs resolving: members at submission time who are still
    // in the pool (to catch silent non-voters, scoped to design doc §4.3's "members at submission
    // time still in the pool" so a staker who joins mid-round is never assessed a point for a
    // round it wasn't eligible to vote in) unioned with whoever actually voted (to catch voters
    // who have since left the pool; design doc §4.4, "a departed voter is counted for whichever
    // vote was cast before leaving"). A departed staker who never voted appears in neither set
    // and correctly receives no consequence at all.
    let mut participants: Vec<Address> = ctx
        .state
        .members_of(pool.id)
        .into_iter()
        .filter(|m| proposal.eligible_members.contains(m))
        .collect();
    for voter in proposal
        .voters_valid
        .iter()
        .chain(proposal.voters_invalid.iter())
        .chain(proposal.voters_abstain.iter())
    {
        if !participants.contains(voter) {
            participants.push(*voter);
        }
    }
    participants.retain(|a| *a != proposal.uploader);
    participants.sort_unstable();
    participants.dedup();

    match outcome {
        QuorumOutcome::Valid => {
            let reward_amount = pool.operating_cost.min(pool.total_funding);
            pool.total_funding -= reward_amount;
            distribute_bundle_reward(ctx, &proposal.uploader, reward_amount, proposal.data_size);
            apply_point_outcome(ctx, pool.id, &proposal.uploader, PointOutcome::Reset);
            pool.current_index = proposal.from_index + proposal.bundle_size;
            pool.current_key = proposal.to_key.clone();
        }
        QuorumOutcome::Invalid => {
            slash_uploader(ctx, &proposal.uploader);
        }
        QuorumOutcome::NoQuorum => {
            apply_point_outcome(ctx, pool.id, &proposal.uploader, PointOutcome::Point);
        }
    }

    for voter in &participants {
        let vote = vote_of(proposal, voter);
        apply_voter_outcome(ctx, pool.id, voter, vote, outcome);
    }

    if matches!(outcome, QuorumOutcome::Valid) {
        ctx.state.append_finalized(FinalizedBundle {
            pool_id: pool.id,
            index: proposal.from_index,
            storage_id: proposal.storage_id.clone(),
            from_key: proposal.from_key.clone(),
            to_key: proposal.to_key.clone(),
            finalized_at: ctx.now,
        });
    }

    Ok(())
}

fn vote_of(proposal: &crate::types::BundleProposal, voter: &Address) -> Option<Vote> {
    if proposal.voters_valid.contains(voter) {
        Some(Vote::Valid)
    } else if proposal.voters_invalid.contains(voter) {
        Some(Vote::Invalid)
    } else if proposal.voters_abstain.contains(voter) {
        Some(Vote::Abstain)
    } else {
        None
    }
}
