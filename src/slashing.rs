/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The slash & point engine (design doc §4.3): resolves what happens to every non-uploader
//! participant once a round finalizes, one round late — mirroring the short-circuit, one-outcome-
//! per-branch style of the reference runtime's `execution/abort.rs`.

use crate::context::Context;
use crate::store::WorldState;
use crate::types::{Address, PoolId, Valaccount, Vote};

/// What happens to a single valaccount's point/slash state as a round resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointOutcome {
    /// Voted on the winning side (or the uploader, on a valid quorum): points reset to 0.
    Reset,
    /// Abstained, or did not vote at all: one point accrues. Also the outcome for a voter who
    /// cast no vote before leaving mid-round (design doc §4.4, "no point if they failed to
    /// vote" is itself folded into the non-voting branch — see note below).
    Point,
    /// Voted on the losing side of a counted quorum: self-delegation slashed at `vote_slash_rate`,
    /// valaccount removed from the pool.
    SlashAndEvict,
}

/// Which side won a concluded vote, or that no side reached quorum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuorumOutcome {
    Valid,
    Invalid,
    NoQuorum,
}

/// Resolves the point/slash consequence for one voter given the concluded quorum outcome.
///
/// Per the resolved open question (design doc §4.3): an explicit ABSTAIN and a silent non-vote
/// are handled by the exact same branch here — both accrue a point, neither is ever charged
/// `vote_slash_rate`, since that rate only ever applies to a counted loser of `Valid`/`Invalid`.
pub fn resolve_voter_outcome(vote: Option<Vote>, quorum: QuorumOutcome) -> PointOutcome {
    match (vote, quorum) {
        (Some(Vote::Valid), QuorumOutcome::Valid) => PointOutcome::Reset,
        (Some(Vote::Invalid), QuorumOutcome::Invalid) => PointOutcome::Reset,
        (Some(Vote::Valid), QuorumOutcome::Invalid) => PointOutcome::SlashAndEvict,
        (Some(Vote::Invalid), QuorumOutcome::Valid) => PointOutcome::SlashAndEvict,
        (Some(Vote::Abstain), _) | (None, _) => PointOutcome::Point,
        (_, QuorumOutcome::NoQuorum) => PointOutcome::Point,
    }
}

/// Applies a resolved [PointOutcome] to `addr`'s valaccount in `pool_id`, mutating points or
/// slashing and removing membership as appropriate.
///
/// `Reset` and `Point` are no-ops if the valaccount no longer exists (design doc §4.4: "points
/// cannot accrue to a destroyed valaccount"). `SlashAndEvict` always slashes self-delegation via
/// the staker record regardless of current membership (design doc §4.4: "a departed voter ...
/// slashed if on the losing side"); removing an already-absent valaccount is a harmless no-op.
pub fn apply_point_outcome<S: WorldState>(
    ctx: &mut Context<S>,
    pool_id: PoolId,
    addr: &Address,
    outcome: PointOutcome,
) {
    match outcome {
        PointOutcome::Reset => {
            if let Some(mut valaccount) = ctx.state.get_valaccount(pool_id, addr) {
                valaccount.points = 0;
                ctx.state.set_valaccount(valaccount);
            }
        }
        PointOutcome::Point => {
            if let Some(mut valaccount) = ctx.state.get_valaccount(pool_id, addr) {
                valaccount.points += 1;
                if valaccount.points >= ctx.params.max_points {
                    ctx.state.slash(addr, ctx.params.timeout_slash_rate);
                    ctx.state.remove_valaccount(pool_id, addr);
                } else {
                    ctx.state.set_valaccount(valaccount);
                }
            }
        }
        PointOutcome::SlashAndEvict => {
            ctx.state.slash(addr, ctx.params.vote_slash_rate);
            ctx.state.remove_valaccount(pool_id, addr);
        }
    }
}

/// Resolves and applies the outcome for a single non-uploader participant in one step.
pub fn apply_voter_outcome<S: WorldState>(
    ctx: &mut Context<S>,
    pool_id: PoolId,
    voter: &Address,
    vote: Option<Vote>,
    quorum: QuorumOutcome,
) {
    apply_point_outcome(ctx, pool_id, voter, resolve_voter_outcome(vote, quorum));
}

/// Slashes the uploader of an invalid-quorum bundle at `upload_slash_rate` (design doc §4.3).
/// Unlike a losing voter, the uploader's valaccount is not removed by this alone; pool membership
/// is untouched, only self-delegation is reduced.
pub fn slash_uploader<S: WorldState>(ctx: &mut Context<S>, uploader: &Address) -> u64 {
    ctx.state.slash(uploader, ctx.params.upload_slash_rate)
}

/// Applies a single missed-duty point to the uploader after a timed-out round with no submission
/// (design doc §4.3: "Timeout with no submission -> uploader gets +1 point"), evicting on
/// reaching `max_points` exactly like any other point accrual.
pub fn apply_uploader_timeout_point<S: WorldState>(
    ctx: &mut Context<S>,
    pool_id: PoolId,
    uploader: &Address,
) {
    apply_point_outcome(ctx, pool_id, uploader, PointOutcome::Point);
}

/// Computes the quorum outcome from a proposal's recorded votes, weighted by delegation at the
/// time of the call (design doc §4.3/§4.4: "majority" is computed over `eligible_delegation_total`
/// taken as a submission-time snapshot, not the live membership set).
pub fn quorum_outcome(
    valid_delegation: u64,
    invalid_delegation: u64,
    eligible_delegation_total: u64,
) -> QuorumOutcome {
    if eligible_delegation_total == 0 {
        return QuorumOutcome::NoQuorum;
    }
    let half = eligible_delegation_total / 2;
    if valid_delegation > half {
        QuorumOutcome::Valid
    } else if invalid_delegation > half {
        QuorumOutcome::Invalid
    } else {
        QuorumOutcome::NoQuorum
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winning_voter_resets_points() {
        assert_eq!(
            resolve_voter_outcome(Some(Vote::Valid), QuorumOutcome::Valid),
            PointOutcome::Reset
        );
        assert_eq!(
            resolve_voter_outcome(Some(Vote::Invalid), QuorumOutcome::Invalid),
            PointOutcome::Reset
        );
    }

    #[test]
    fn losing_voter_is_slashed_and_evicted() {
        assert_eq!(
            resolve_voter_outcome(Some(Vote::Valid), QuorumOutcome::Invalid),
            PointOutcome::SlashAndEvict
        );
        assert_eq!(
            resolve_voter_outcome(Some(Vote::Invalid), QuorumOutcome::Valid),
            PointOutcome::SlashAndEvict
        );
    }

    #[test]
    fn abstain_and_non_vote_are_identical() {
        assert_eq!(
            resolve_voter_outcome(Some(Vote::Abstain), QuorumOutcome::Valid),
            PointOutcome::Point
        );
        assert_eq!(
            resolve_voter_outcome(None, QuorumOutcome::Valid),
            PointOutcome::Point
        );
        assert_eq!(
            resolve_voter_outcome(Some(Vote::Abstain), QuorumOutcome::Invalid),
            resolve_voter_outcome(None, QuorumOutcome::Invalid)
        );
    }

    #[test]
    fn no_quorum_never_slashes_regardless_of_vote() {
        assert_eq!(
            resolve_voter_outcome(Some(Vote::Valid), QuorumOutcome::NoQuorum),
            PointOutcome::Point
        );
        assert_eq!(
            resolve_voter_outcome(Some(Vote::Invalid), QuorumOutcome::NoQuorum),
            PointOutcome::Point
        );
    }

    #[test]
    fn quorum_requires_strict_majority_of_eligible_total() {
        assert_eq!(quorum_outcome(51, 0, 100), QuorumOutcome::Valid);
        assert_eq!(quorum_outcome(50, 0, 100), QuorumOutcome::NoQuorum);
        assert_eq!(quorum_outcome(0, 0, 0), QuorumOutcome::NoQuorum);
    }
}
