/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! An in-memory [WorldState] implementation, the one this crate's own tests (and the doctest in
//! the crate root) build against. Mirrors the reference runtime's `execution/tests` fixture
//! pattern: plain `HashMap`-backed storage plus a handful of convenience constructors, never
//! meant to be the production backend.

use std::collections::HashMap;

use crate::rate::Rate;
use crate::store::{Bank, DelegationEngine, FinalizedLogStore, GovernanceAuth, PoolStore, ProposalStore, ValaccountStore};
use crate::types::{Address, BundleProposal, FinalizedBundle, Pool, PoolId, Valaccount};

/// A staker record as tracked by the fake delegation engine: self-delegation, commission rate,
/// and the two reward accumulators this crate credits into.
#[derive(Debug, Clone, Default)]
struct StakerRecord {
    self_delegation: u64,
    delegators_delegation: u64,
    commission_rate: Rate,
    commission_rewards: u64,
    outstanding_delegation_rewards: u64,
}

/// An in-memory [crate::store::WorldState] implementation for tests and examples.
#[derive(Default)]
pub struct InMemoryState {
    pools: HashMap<PoolId, Pool>,
    proposals: HashMap<PoolId, BundleProposal>,
    valaccounts: HashMap<(PoolId, Address), Valaccount>,
    finalized: Vec<FinalizedBundle>,
    stakers: HashMap<Address, StakerRecord>,
    treasury_balance: u64,
    payouts: HashMap<Address, u64>,
    governance_authority: Address,
    next_pool_id: PoolId,
}

impl InMemoryState {
    pub fn new() -> Self {
        Self {
            governance_authority: [0xFFu8; 20],
            ..Default::default()
        }
    }

    /// Creates a pool with the given parameters and an Empty proposal, returning its id.
    pub fn create_pool(
        &mut self,
        max_bundle_size: u64,
        upload_interval: u64,
        operating_cost: u64,
        min_delegation: u64,
    ) -> PoolId {
        let id = self.next_pool_id;
        self.next_pool_id += 1;
        let pool = Pool {
            id,
            name: format!("pool-{id}"),
            start_key: String::new(),
            max_bundle_size,
            upload_interval,
            operating_cost,
            current_index: 0,
            current_key: String::new(),
            min_delegation,
            disabled: false,
            upgrade_plan: None,
            total_funding: 0,
        };
        self.pools.insert(id, pool);
        self.proposals.insert(id, BundleProposal::empty(id, 0));
        id
    }

    /// Creates a staker record with the given self-delegation and whole-percent commission rate,
    /// returning the same address back for fluent chaining.
    pub fn create_staker(&mut self, staker: Address, self_delegation: u64, commission_pct: u8) -> Address {
        self.stakers.insert(
            staker,
            StakerRecord {
                self_delegation,
                commission_rate: Rate::from_percent(commission_pct),
                ..Default::default()
            },
        );
        staker
    }

    /// Adds delegated (non-self) stake to `staker`, affecting weighted selection and quorum but
    /// never the slashing base.
    pub fn add_delegator_stake(&mut self, staker: Address, amount: u64) {
        self.stakers.entry(staker).or_default().delegators_delegation += amount;
    }

    /// Registers `staker` as a member of `pool_id` directly, bypassing command-level validation
    /// (use [crate::commands::staking::join_pool] to exercise the validated path instead).
    pub fn add_member(&mut self, pool_id: PoolId, staker: Address, operator_key: Address) {
        self.valaccounts.insert(
            (pool_id, staker),
            Valaccount {
                pool_id,
                staker,
                operator_key,
                points: 0,
            },
        );
    }

    /// The address this fake treats as the governance module account.
    pub fn governance_authority(&self) -> Address {
        self.governance_authority
    }

    pub fn treasury_balance(&self) -> u64 {
        self.treasury_balance
    }

    pub fn commission_rewards_of(&self, staker: &Address) -> u64 {
        self.stakers.get(staker).map(|s| s.commission_rewards).unwrap_or(0)
    }

    pub fn outstanding_delegation_rewards_of(&self, staker: &Address) -> u64 {
        self.stakers
            .get(staker)
            .map(|s| s.outstanding_delegation_rewards)
            .unwrap_or(0)
    }

    pub fn payout_received_by(&self, addr: &Address) -> u64 {
        self.payouts.get(addr).copied().unwrap_or(0)
    }

    pub fn finalized_bundles(&self) -> &[FinalizedBundle] {
        &self.finalized
    }
}

impl PoolStore for InMemoryState {
    fn get_pool(&self, id: PoolId) -> Option<Pool> {
        self.pools.get(&id).cloned()
    }

    fn set_pool(&mut self, pool: Pool) {
        self.pools.insert(pool.id, pool);
    }

    fn pool_ids(&self) -> Vec<PoolId> {
        let mut ids: Vec<PoolId> = self.pools.keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}

impl ValaccountStore for InMemoryState {
    fn get_valaccount(&self, pool_id: PoolId, staker: &Address) -> Option<Valaccount> {
        self.valaccounts.get(&(pool_id, *staker)).cloned()
    }

    fn set_valaccount(&mut self, valaccount: Valaccount) {
        self.valaccounts
            .insert((valaccount.pool_id, valaccount.staker), valaccount);
    }

    fn remove_valaccount(&mut self, pool_id: PoolId, staker: &Address) {
        self.valaccounts.remove(&(pool_id, *staker));
    }

    fn members_of(&self, pool_id: PoolId) -> Vec<Address> {
        let mut members: Vec<Address> = self
            .valaccounts
            .keys()
            .filter(|(pid, _)| *pid == pool_id)
            .map(|(_, addr)| *addr)
            .collect();
        members.sort_unstable();
        members
    }
}

impl ProposalStore for InMemoryState {
    fn get_proposal(&self, pool_id: PoolId) -> Option<BundleProposal> {
        self.proposals.get(&pool_id).cloned()
    }

    fn set_proposal(&mut self, proposal: BundleProposal) {
        self.proposals.insert(proposal.pool_id, proposal);
    }
}

impl FinalizedLogStore for InMemoryState {
    fn append_finalized(&mut self, bundle: FinalizedBundle) {
        self.finalized.push(bundle);
    }
}

impl DelegationEngine for InMemoryState {
    fn delegation_of(&self, staker: &Address) -> u64 {
        self.stakers
            .get(staker)
            .map(|s| s.self_delegation + s.delegators_delegation)
            .unwrap_or(0)
    }

    fn self_delegation(&self, staker: &Address) -> u64 {
        self.stakers.get(staker).map(|s| s.self_delegation).unwrap_or(0)
    }

    fn commission_rate(&self, staker: &Address) -> Rate {
        self.stakers.get(staker).map(|s| s.commission_rate).unwrap_or(Rate::ZERO)
    }

    fn slash(&mut self, staker: &Address, rate: Rate) -> u64 {
        let Some(record) = self.stakers.get_mut(staker) else {
            return 0;
        };
        let slashed = rate.mul_floor(record.self_delegation);
        record.self_delegation -= slashed;
        slashed
    }

    fn credit_commission(&mut self, staker: &Address, amount: u64) {
        self.stakers.entry(*staker).or_default().commission_rewards += amount;
    }

    fn credit_outstanding_delegation_rewards(&mut self, staker: &Address, amount: u64) {
        self.stakers.entry(*staker).or_default().outstanding_delegation_rewards += amount;
    }
}

impl Bank for InMemoryState {
    fn credit_treasury(&mut self, amount: u64) {
        self.treasury_balance += amount;
    }

    fn payout(&mut self, to: &Address, amount: u64) {
        *self.payouts.entry(*to).or_insert(0) += amount;
    }
}

impl GovernanceAuth for InMemoryState {
    fn is_governance_authority(&self, addr: &Address) -> bool {
        addr == &self.governance_authority
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_of_is_canonically_ordered() {
        let mut state = InMemoryState::new();
        let pool_id = state.create_pool(100, 60, 10, 0);
        let a = [3u8; 20];
        let b = [1u8; 20];
        let c = [2u8; 20];
        state.add_member(pool_id, a, a);
        state.add_member(pool_id, b, b);
        state.add_member(pool_id, c, c);
        assert_eq!(state.members_of(pool_id), vec![b, c, a]);
    }

    #[test]
    fn slash_only_touches_self_delegation() {
        let mut state = InMemoryState::new();
        let staker = [1u8; 20];
        state.create_staker(staker, 100, 0);
        state.add_delegator_stake(staker, 900);

        assert_eq!(state.delegation_of(&staker), 1_000);
        let slashed = state.slash(&staker, Rate::from_percent(10));
        assert_eq!(slashed, 10);
        assert_eq!(state.self_delegation(&staker), 90);
        assert_eq!(state.delegation_of(&staker), 990);
    }
}
