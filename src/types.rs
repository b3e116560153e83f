/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Defines common data structures used across this crate: pools, valaccounts, bundle proposals
//! and finalized bundles. See the design document §3 for field-by-field invariants.

/// An opaque account identifier. The host ledger owns the concrete address encoding (bech32,
/// hex, ...); this module only needs equality, ordering (for canonical iteration) and hashing.
pub type Address = [u8; 20];

/// A pool identifier.
pub type PoolId = u64;

/// A vote cast on an open bundle proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Vote {
    Valid,
    Invalid,
    Abstain,
}

/// A scheduled protocol-version upgrade for a pool. While `scheduled_at <= now < scheduled_at +
/// duration`, the pool is considered "upgrading" and suppresses uploader selection (§4.5).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradePlan {
    pub version: u64,
    pub scheduled_at: u64,
    pub duration: u64,
}

impl UpgradePlan {
    /// Whether this plan puts the pool in the "upgrading" state at time `now`.
    pub fn is_active_at(&self, now: u64) -> bool {
        self.scheduled_at <= now && now < self.scheduled_at.saturating_add(self.duration)
    }
}

/// Identity and configuration for a data-bundling stream (design doc §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Pool {
    pub id: PoolId,
    pub name: String,
    pub start_key: String,
    pub max_bundle_size: u64,
    /// Minimum number of seconds that must elapse between successive proposal submissions.
    pub upload_interval: u64,
    /// Reward pot paid out, at most, per finalized bundle.
    pub operating_cost: u64,
    /// `from_index` of the next bundle to be proposed.
    pub current_index: u64,
    /// `to_key` of the last finalized bundle.
    pub current_key: String,
    pub min_delegation: u64,
    pub disabled: bool,
    pub upgrade_plan: Option<UpgradePlan>,
    pub total_funding: u64,
}

impl Pool {
    pub fn is_upgrading(&self, now: u64) -> bool {
        self.upgrade_plan
            .as_ref()
            .is_some_and(|plan| plan.is_active_at(now))
    }
}

/// Membership of a staker in a pool (design doc §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Valaccount {
    pub pool_id: PoolId,
    pub staker: Address,
    pub operator_key: Address,
    pub points: u64,
}

/// The derived state of a [BundleProposal], made explicit per the REDESIGN FLAG in the design
/// document §9 rather than inferred from sentinel-empty fields at every call site.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProposalState {
    /// No uploader assigned; no member may upload.
    Empty,
    /// An uploader has been assigned but has not yet submitted a bundle.
    Genesis,
    /// A bundle has been submitted and is awaiting votes or timeout.
    Open,
}

/// The single in-flight proposal for a pool (design doc §3).
///
/// `state()` derives [ProposalState] from `storage_id`/`next_uploader` exactly as the wire
/// format does (empty `storage_id` means not-yet-submitted), but every other part of this crate
/// matches on the derived enum instead of re-deriving it ad hoc.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BundleProposal {
    pub pool_id: PoolId,
    pub storage_id: String,
    pub uploader: Address,
    pub next_uploader: Address,
    pub data_size: u64,
    pub data_hash: Vec<u8>,
    pub from_index: u64,
    pub bundle_size: u64,
    pub from_key: String,
    pub to_key: String,
    pub bundle_summary: String,
    pub voters_valid: Vec<Address>,
    pub voters_invalid: Vec<Address>,
    pub voters_abstain: Vec<Address>,
    pub updated_at: u64,
    /// Snapshot, taken at submission time, of the total delegation of every pool member present
    /// at that moment. Quorum (§4.3) is measured against this fixed denominator rather than a
    /// live recomputation, so that members joining mid-round cannot dilute an already-open vote
    /// and members leaving mid-round cannot shrink it out from under voters who already relied on
    /// it — both of which would make quorum non-deterministic with respect to message ordering
    /// within the block. Not part of the wire message fields (§6); an internal bookkeeping field.
    pub eligible_delegation_total: u64,
    /// Snapshot, taken at submission time alongside `eligible_delegation_total`, of exactly which
    /// addresses were pool members at that moment. Point accrual at finalization is scoped to
    /// this set (design doc §4.3: "members at submission time still in the pool"), so a staker who
    /// joins mid-round is never assessed a point for a vote it was never eligible to cast.
    pub eligible_members: Vec<Address>,
}

const NO_ADDRESS: Address = [0u8; 20];

impl BundleProposal {
    /// Constructs the empty proposal a freshly-created pool starts with.
    pub fn empty(pool_id: PoolId, updated_at: u64) -> Self {
        Self {
            pool_id,
            storage_id: String::new(),
            uploader: NO_ADDRESS,
            next_uploader: NO_ADDRESS,
            data_size: 0,
            data_hash: Vec::new(),
            from_index: 0,
            bundle_size: 0,
            from_key: String::new(),
            to_key: String::new(),
            bundle_summary: String::new(),
            voters_valid: Vec::new(),
            voters_invalid: Vec::new(),
            voters_abstain: Vec::new(),
            updated_at,
            eligible_delegation_total: 0,
            eligible_members: Vec::new(),
        }
    }

    pub fn state(&self) -> ProposalState {
        if !self.storage_id.is_empty() {
            ProposalState::Open
        } else if self.next_uploader != NO_ADDRESS {
            ProposalState::Genesis
        } else {
            ProposalState::Empty
        }
    }

    /// Resets the proposal back to Empty (or Genesis, if `next_uploader` is supplied), clearing
    /// every field except `pool_id` and `updated_at` (design doc §8 boundary behavior).
    pub fn reset(&mut self, next_uploader: Address, updated_at: u64) {
        let pool_id = self.pool_id;
        *self = Self::empty(pool_id, updated_at);
        self.next_uploader = next_uploader;
    }

    /// Whether `staker` has already cast any vote on this proposal.
    pub fn has_voted(&self, staker: &Address) -> bool {
        self.voters_valid.contains(staker)
            || self.voters_invalid.contains(staker)
            || self.voters_abstain.contains(staker)
    }
}

/// An immutable, append-only record of a finalized bundle (design doc §3).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FinalizedBundle {
    pub pool_id: PoolId,
    pub index: u64,
    pub storage_id: String,
    pub from_key: String,
    pub to_key: String,
    pub finalized_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_state_derivation() {
        let mut p = BundleProposal::empty(0, 0);
        assert_eq!(p.state(), ProposalState::Empty);
        p.next_uploader = [1u8; 20];
        assert_eq!(p.state(), ProposalState::Genesis);
        p.storage_id = "ar://abc".into();
        assert_eq!(p.state(), ProposalState::Open);
    }

    #[test]
    fn reset_clears_all_but_pool_id_and_updated_at() {
        let mut p = BundleProposal::empty(7, 5);
        p.storage_id = "x".into();
        p.uploader = [1u8; 20];
        p.voters_valid.push([1u8; 20]);
        p.reset([2u8; 20], 42);
        assert_eq!(p.pool_id, 7);
        assert_eq!(p.updated_at, 42);
        assert_eq!(p.next_uploader, [2u8; 20]);
        assert!(p.storage_id.is_empty());
        assert!(p.voters_valid.is_empty());
    }

    #[test]
    fn upgrade_plan_activity_window() {
        let plan = UpgradePlan {
            version: 1,
            scheduled_at: 100,
            duration: 10,
        };
        assert!(!plan.is_active_at(99));
        assert!(plan.is_active_at(100));
        assert!(plan.is_active_at(109));
        assert!(!plan.is_active_at(110));
    }
}
