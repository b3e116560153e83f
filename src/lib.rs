/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! `kyve-bundles` is a reference implementation of the bundle-proposal state machine used by a
//! decentralized data-bundling protocol, the component responsible for selecting uploaders,
//! accepting and voting on bundles of off-chain data, and paying out or slashing stakers.
//!
//! ## State transition
//!
//! The interface this module offers to the rest of the protocol is a set of pure state
//! transition functions, one per external message kind (§6 of the design document), plus an
//! end-of-block hook. Each transition takes the current state (via injected [store](store)
//! capabilities) and a message, and produces either a committed set of state writes or a
//! [TransitionError] with no partial effects.
//!
//! ## Usage
//!
//! Construct a [BundlesModule](module::BundlesModule) over your own implementations of the
//! [store] capability traits, then call one of its message-handling methods. For example:
//!
//! ```
//! use kyve_bundles::{module::BundlesModule, params::Params, testutil::InMemoryState};
//!
//! let mut state = InMemoryState::new();
//! let pool = state.create_pool(100, 60, 10_000, 0);
//! let staker = state.create_staker([1u8; 20], 100_000_000, 10);
//! state.add_member(pool, staker, [1u8; 20]);
//!
//! let mut module = BundlesModule::new(&mut state, Params::default(), 0);
//! module.claim_uploader_role([1u8; 20], staker, pool).unwrap();
//! ```

pub mod commands;
pub mod context;
pub mod end_block;
pub mod error;
pub use error::TransitionError;

pub mod module;
pub use module::BundlesModule;

pub mod params;
pub use params::Params;

pub mod rate;
pub use rate::Rate;

pub mod rewards;
pub mod selector;
pub mod slashing;
pub mod store;

pub mod types;
pub use types::{Address, BundleProposal, FinalizedBundle, Pool, ProposalState, Valaccount, Vote};

pub mod testutil;
