/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines a set of descriptive error definitions arising from bundle-proposal state transitions.
//!
//! Transition errors are returned by failure paths caused by invalid input in the
//! [message handlers](crate::module), so that processes hosting this module can differentiate
//! between failure modes instead of observing an opaque rejection.

use thiserror::Error;

/// Descriptive error definitions of a bundle-proposal state transition.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum TransitionError {
    /// `creator` does not hold the operator key bound to `staker` in this pool.
    #[error("creator does not hold the operator key bound to this staker")]
    Unauthorized,

    /// A governance-only message was not signed by the governance module account.
    #[error("message is not signed by the governance authority")]
    NotGovernanceAuthority,

    /// The referenced pool does not exist.
    #[error("pool does not exist")]
    PoolNotFound,

    /// The pool is disabled; no new proposals may be created.
    #[error("pool is disabled")]
    PoolDisabled,

    /// The pool has a scheduled upgrade in effect.
    #[error("pool is upgrading")]
    PoolUpgrading,

    /// `staker` is not a member (has no valaccount) of the pool.
    #[error("staker is not a member of this pool")]
    NotPoolMember,

    /// The proposal is not in the state the requested transition expects.
    #[error("proposal is not in the expected state for this operation")]
    UnexpectedProposalState,

    /// `staker` is not the pool's current `next_uploader`.
    #[error("staker is not the current next uploader")]
    NotNextUploader,

    /// `upload_interval` has not elapsed since the proposal was last updated.
    #[error("upload interval has not elapsed since the last update")]
    UploadIntervalNotElapsed,

    /// `bundle_size` exceeds the pool's `max_bundle_size`.
    #[error("bundle size exceeds the pool's maximum bundle size")]
    BundleTooLarge,

    /// `from_index` does not match the pool's `current_index`.
    #[error("from_index does not match the pool's current index")]
    WrongFromIndex,

    /// The vote's `storage_id` does not match the current proposal's `storage_id`.
    #[error("storage_id does not match the current proposal")]
    StorageIdMismatch,

    /// `staker` already cast a vote (in any voter set) for this proposal.
    #[error("staker has already voted on this proposal")]
    DuplicateVote,

    /// `staker` is the proposal's uploader and may not also vote on it.
    #[error("uploader may not vote on its own proposal")]
    UploaderCannotVote,

    /// A valaccount with this (pool_id, staker) pair already exists.
    #[error("staker is already a member of this pool")]
    AlreadyPoolMember,

    /// An internal accounting invariant would be violated by this transition (e.g. funding
    /// would go negative). Surfaced as an error rather than a panic so a host runtime can halt
    /// the transaction atomically instead of crashing the process; it indicates a bug in this
    /// module or in a collaborator, never adversarial input.
    #[error("internal invariant violation: {0}")]
    InvariantViolation(&'static str),
}
