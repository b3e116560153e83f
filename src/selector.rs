/*
    Copyright © 2023, ParallelChain Lab
    Licensed under the Apache License, Version 2.0: http://www.apache.org/licenses/LICENSE-2.0
*/

//! Deterministic, delegation-weighted next-uploader selection (design doc §4.1).
//!
//! All replicas must agree on the outcome, so the only source of randomness is a hash of
//! block-level data already present in state — never a non-deterministic RNG (design doc §9,
//! "Selector entropy").

use blake2::{Blake2b512, Digest};

use crate::types::{Address, PoolId};

/// Hashes `(pool_id, updated_at, last_storage_id)` down to a `u64`, the single entropy function
/// every random choice in this crate is gated through (design doc §9).
pub fn entropy(pool_id: PoolId, updated_at: u64, last_storage_id: &str) -> u64 {
    let mut hasher = Blake2b512::new();
    hasher.update(pool_id.to_be_bytes());
    hasher.update(updated_at.to_be_bytes());
    hasher.update(last_storage_id.as_bytes());
    let digest = hasher.finalize();
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(bytes)
}

/// Picks a staker from `members` weighted by `delegation_of`, deterministically from `seed`.
///
/// `members` must already be in canonical (ascending address) order; this function does not sort
/// them itself, so that callers decide once and the same canonical list can be reused for other
/// purposes (e.g. quorum denominators).
///
/// Returns `None` if `members` is empty or every member has zero delegation.
pub fn select_weighted(
    members: &[Address],
    delegation_of: impl Fn(&Address) -> u64,
    seed: u64,
) -> Option<Address> {
    let total: u64 = members.iter().map(&delegation_of).sum();
    if total == 0 {
        return None;
    }
    let r = seed % total;
    let mut cumulative: u64 = 0;
    for member in members {
        cumulative = cumulative.saturating_add(delegation_of(member));
        if r < cumulative {
            return Some(*member);
        }
    }
    // Unreachable given total > 0 and r < total, but fall back to the last member rather than
    // panicking in case of a rounding inconsistency in a future `delegation_of` implementation.
    members.last().copied()
}

/// Selects the next uploader for a pool (design doc §4.1), excluding `previous_uploader` in
/// favor of the next member in canonical order whenever an alternative with nonzero delegation
/// exists — preventing the same member from serving twice in a row except in a single-member
/// pool, which legitimately self-selects.
pub fn select_next_uploader(
    members: &[Address],
    delegation_of: impl Fn(&Address) -> u64,
    seed: u64,
    previous_uploader: Option<&Address>,
) -> Option<Address> {
    let chosen = select_weighted(members, &delegation_of, seed)?;
    let Some(previous) = previous_uploader else {
        return Some(chosen);
    };
    if chosen != *previous {
        return Some(chosen);
    }
    // Tie-break: walk forward in canonical order to the next member with nonzero delegation.
    let chosen_pos = members.iter().position(|m| m == &chosen)?;
    for offset in 1..members.len() {
        let candidate = &members[(chosen_pos + offset) % members.len()];
        if candidate != previous && delegation_of(candidate) > 0 {
            return Some(*candidate);
        }
    }
    // No alternative exists: a single-member pool legitimately self-selects.
    Some(chosen)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u8) -> Address {
        let mut a = [0u8; 20];
        a[19] = n;
        a
    }

    #[test]
    fn entropy_is_deterministic() {
        let a = entropy(3, 1000, "ar://x");
        let b = entropy(3, 1000, "ar://x");
        assert_eq!(a, b);
        let c = entropy(3, 1001, "ar://x");
        assert_ne!(a, c);
    }

    #[test]
    fn selection_is_deterministic_for_same_inputs() {
        let members = vec![addr(1), addr(2), addr(3)];
        let weights = |a: &Address| match a[19] {
            1 => 10,
            2 => 20,
            3 => 30,
            _ => 0,
        };
        let first = select_weighted(&members, weights, 42);
        let second = select_weighted(&members, weights, 42);
        assert_eq!(first, second);
    }

    #[test]
    fn no_members_selects_none() {
        assert_eq!(select_weighted(&[], |_| 1, 0), None);
    }

    #[test]
    fn all_zero_delegation_selects_none() {
        let members = vec![addr(1), addr(2)];
        assert_eq!(select_weighted(&members, |_| 0, 7), None);
    }

    #[test]
    fn avoids_repeating_previous_uploader_when_alternative_exists() {
        let members = vec![addr(1), addr(2)];
        // seed chosen so the weighted pick lands on addr(1) deterministically.
        let weights = |_: &Address| 1u64;
        let previous = addr(1);
        let chosen = select_next_uploader(&members, weights, 0, Some(&previous));
        assert_eq!(chosen, Some(addr(2)));
    }

    #[test]
    fn single_member_pool_self_selects() {
        let members = vec![addr(1)];
        let previous = addr(1);
        let chosen = select_next_uploader(&members, |_| 5, 0, Some(&previous));
        assert_eq!(chosen, Some(addr(1)));
    }
}
