/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Capability traits standing in for the external collaborator modules named in the design
//! document §6 (pool registry, staker registry, delegation engine, bank, governance).
//!
//! The proposal state machine is passed these as trait objects rather than reaching for ambient
//! globals, the same way the reference runtime models its sole point of contact with outside
//! state as the injected `DB`/`NetworkAccountStorage` traits (design doc §9, "Cross-module
//! coupling"). This keeps the state machine unit-testable against in-memory fakes (see
//! [crate::testutil]) without depending on a real ledger backend.

use crate::rate::Rate;
use crate::types::{Address, BundleProposal, FinalizedBundle, Pool, PoolId, Valaccount};

/// Read/write access to pool records (design doc §6: `GetPool`, `SetPool`, `AppendPool`).
pub trait PoolStore {
    fn get_pool(&self, id: PoolId) -> Option<Pool>;
    fn set_pool(&mut self, pool: Pool);
    /// All existing pool ids in canonical (ascending) order, for use by the end-block handler.
    fn pool_ids(&self) -> Vec<PoolId>;
}

/// Read/write access to (pool, staker) memberships (design doc §6: `GetValaccount`,
/// `GetAllStakerAddressesOfPool`, `RemoveValaccountFromPool`, `GetActiveStakers`).
pub trait ValaccountStore {
    fn get_valaccount(&self, pool_id: PoolId, staker: &Address) -> Option<Valaccount>;
    fn set_valaccount(&mut self, valaccount: Valaccount);
    fn remove_valaccount(&mut self, pool_id: PoolId, staker: &Address);
    /// Active members of a pool, in canonical (ascending address) order.
    fn members_of(&self, pool_id: PoolId) -> Vec<Address>;
}

/// Read/write access to the single in-flight proposal of a pool (design doc §6:
/// `GetBundleProposal`, `SetBundleProposal`).
pub trait ProposalStore {
    /// Every existing pool has exactly one proposal (design doc §3 invariant); callers may
    /// assume this returns `Some` whenever the pool itself exists.
    fn get_proposal(&self, pool_id: PoolId) -> Option<BundleProposal>;
    fn set_proposal(&mut self, proposal: BundleProposal);
}

/// Append-only log of finalized bundles (design doc §6 scope: "append-only finalized log
/// reference").
pub trait FinalizedLogStore {
    fn append_finalized(&mut self, bundle: FinalizedBundle);
}

/// The delegation engine (design doc §6: `GetDelegationAmount`, `GetDelegationAmountOfDelegator`,
/// `PayoutRewards`, `Slash`, `GetOutstandingRewards`).
///
/// Self-delegation and commission are properties of the *staker* record, which outlives
/// pool membership (design doc §4.4: "the associated self-delegation remains slashable via the
/// staker record" after a valaccount is destroyed).
pub trait DelegationEngine {
    /// The staker's total delegation (self-delegation plus delegators), used for weighted
    /// uploader selection (§4.1) and for quorum majority computation (§4.3). This is the
    /// `GetDelegationAmount`-style figure, distinct from the self-delegation slashing base.
    fn delegation_of(&self, staker: &Address) -> u64;
    /// The staker's own (non-delegated) stake, the only thing this module is ever allowed to
    /// slash (delegators' funds are never touched by this module).
    fn self_delegation(&self, staker: &Address) -> u64;
    /// The staker's commission rate, as set at `MsgCreateStaker` / updated by the staker.
    fn commission_rate(&self, staker: &Address) -> Rate;
    /// Slashes `rate` of the staker's self-delegation, returning the amount actually slashed.
    fn slash(&mut self, staker: &Address, rate: Rate) -> u64;
    /// Credits the staker's commission-rewards balance (accrued, not yet withdrawn).
    fn credit_commission(&mut self, staker: &Address, amount: u64);
    /// Credits the staker's delegators' outstanding-rewards balance, pro rata, via the
    /// delegation engine's own accounting (this module does not enumerate individual delegators).
    fn credit_outstanding_delegation_rewards(&mut self, staker: &Address, amount: u64);
}

/// The bank module (design doc §6: "credit/debit pool accounts, treasury account").
pub trait Bank {
    fn credit_treasury(&mut self, amount: u64);
    /// Pays `amount` out to `to` directly, used when funding leaves a pool's earmarked balance
    /// (`MsgDefundPool`, or the full sweep-out on `MsgDisablePool`).
    fn payout(&mut self, to: &Address, amount: u64);
}

/// Governance authority check (design doc §6: "Governance: authority check against the
/// governance module account").
pub trait GovernanceAuth {
    fn is_governance_authority(&self, addr: &Address) -> bool;
}

/// Aggregates every capability the bundle-proposal state machine needs. A single type
/// implementing all six traits (see [crate::testutil::InMemoryState] for the reference/test
/// implementation) is the only thing [crate::module::BundlesModule] needs to be constructed.
pub trait WorldState:
    PoolStore + ValaccountStore + ProposalStore + FinalizedLogStore + DelegationEngine + Bank + GovernanceAuth
{
}

impl<T> WorldState for T where
    T: PoolStore
        + ValaccountStore
        + ProposalStore
        + FinalizedLogStore
        + DelegationEngine
        + Bank
        + GovernanceAuth
{
}
