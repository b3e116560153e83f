/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! The immutable-within-block configuration supplied to the bundle-proposal state transition.

use crate::rate::Rate;

/// Protocol parameters governing bundle-proposal behavior (design doc §2.1). Owned by
/// governance; a host runtime is expected to read the current value once per block and hold it
/// fixed for every message processed within that block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Params {
    /// Seconds after `upload_interval` has elapsed before an uploader is considered timed out.
    pub upload_timeout: u64,
    /// Maximum accumulated points a valaccount may hold before eviction.
    pub max_points: u64,
    /// Fraction of a finalized bundle's operating cost sent to the network treasury.
    pub network_fee_rate: Rate,
    /// Fraction of uploaded `data_size` credited to the uploader as storage cost.
    pub storage_cost_rate: Rate,
    /// Fraction of self-delegation slashed when an uploader's bundle is voted invalid.
    pub upload_slash_rate: Rate,
    /// Fraction of self-delegation slashed from a voter on the losing side of a quorum.
    pub vote_slash_rate: Rate,
    /// Fraction of self-delegation slashed when a valaccount is evicted for reaching max points.
    pub timeout_slash_rate: Rate,
}

impl Default for Params {
    fn default() -> Self {
        Self {
            upload_timeout: 600,
            max_points: 30,
            network_fee_rate: Rate::from_percent(10),
            storage_cost_rate: Rate::from_parts(20_000), // 0.02 per byte-unit
            upload_slash_rate: Rate::from_percent(5),
            vote_slash_rate: Rate::from_percent(2),
            timeout_slash_rate: Rate::from_percent(1),
        }
    }
}
