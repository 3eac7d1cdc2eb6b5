//! Seeded permutation table used to hash lattice corners.

use std::sync::OnceLock;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::NoiseError;

/// Number of entries in a permutation table (two copies of `0..256`).
pub const PERMUTATION_SIZE: usize = 512;

const HALF: usize = PERMUTATION_SIZE / 2;

static GLOBAL: OnceLock<PermutationTable> = OnceLock::new();

/// A Fisher–Yates shuffle of `0..256`, duplicated into `[256, 512)` so that
/// corner hashes can index `p[p[x] + y + 1]` without wrapping.
#[derive(Clone, PartialEq, Eq)]
pub struct PermutationTable {
    entries: [u32; PERMUTATION_SIZE],
}

impl PermutationTable {
    /// Build a table from a seed. Identical seeds give identical tables on
    /// every platform.
    pub fn from_seed(seed: u64) -> Self {
        Self::from_rng(&mut ChaCha8Rng::seed_from_u64(seed))
    }

    /// Build a table by shuffling with a caller-supplied RNG.
    pub fn from_rng<R: Rng>(rng: &mut R) -> Self {
        let mut entries = [0u32; PERMUTATION_SIZE];
        for (i, entry) in entries.iter_mut().take(HALF).enumerate() {
            *entry = i as u32;
        }
        for i in (1..HALF).rev() {
            let j = rng.random_range(0..=i);
            entries.swap(i, j);
        }
        entries.copy_within(0..HALF, HALF);
        Self { entries }
    }

    /// Rebuild a table from its flat entries, e.g. after reading a bound
    /// buffer back from a compute backend.
    pub fn try_from_slice(entries: &[u32]) -> Result<Self, NoiseError> {
        if entries.len() != PERMUTATION_SIZE {
            return Err(NoiseError::TableLength {
                expected: PERMUTATION_SIZE,
                actual: entries.len(),
            });
        }
        let mut seen = [false; HALF];
        for (index, &value) in entries.iter().enumerate() {
            let slot = value as usize;
            let fresh = slot < HALF && (index >= HALF || !seen[slot]);
            let mirrored = index < HALF || entries[index - HALF] == value;
            if !fresh || !mirrored {
                return Err(NoiseError::NotAPermutation { index, value });
            }
            if index < HALF {
                seen[slot] = true;
            }
        }
        let mut table = [0u32; PERMUTATION_SIZE];
        table.copy_from_slice(entries);
        Ok(Self { entries: table })
    }

    /// The process-wide table. Initialised once, from entropy, unless
    /// [`install_global`](Self::install_global) pinned one first.
    pub fn global() -> &'static PermutationTable {
        GLOBAL.get_or_init(|| {
            let seed: u64 = rand::random();
            log::debug!("Initialising global permutation table from entropy (seed {seed})");
            Self::from_seed(seed)
        })
    }

    /// Pin the process-wide table. Fails, handing the table back, when the
    /// global has already been initialised.
    pub fn install_global(table: PermutationTable) -> Result<(), PermutationTable> {
        GLOBAL.set(table)
    }

    #[inline]
    pub fn get(&self, index: usize) -> u32 {
        self.entries[index]
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.entries
    }
}

impl std::fmt::Debug for PermutationTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutationTable")
            .field("head", &&self.entries[..8])
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_half_is_a_permutation() {
        let table = PermutationTable::from_seed(42);
        let mut sorted: Vec<u32> = table.as_slice()[..HALF].to_vec();
        sorted.sort_unstable();
        let expected: Vec<u32> = (0..HALF as u32).collect();
        assert_eq!(sorted, expected, "first half must hold every value in 0..256 once");
    }

    #[test]
    fn test_second_half_duplicates_first() {
        let table = PermutationTable::from_seed(7);
        let (lo, hi) = table.as_slice().split_at(HALF);
        assert_eq!(lo, hi);
    }

    #[test]
    fn test_same_seed_same_table() {
        assert_eq!(PermutationTable::from_seed(99), PermutationTable::from_seed(99));
        assert_ne!(
            PermutationTable::from_seed(99),
            PermutationTable::from_seed(100),
            "different seeds should shuffle differently"
        );
    }

    #[test]
    fn test_try_from_slice_round_trips_valid_table() {
        let table = PermutationTable::from_seed(3);
        let rebuilt = PermutationTable::try_from_slice(table.as_slice()).unwrap();
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn test_try_from_slice_rejects_bad_input() {
        assert_eq!(
            PermutationTable::try_from_slice(&[0; 10]),
            Err(NoiseError::TableLength { expected: 512, actual: 10 })
        );

        let mut entries = PermutationTable::from_seed(3).as_slice().to_vec();
        entries[1] = entries[0];
        assert!(matches!(
            PermutationTable::try_from_slice(&entries),
            Err(NoiseError::NotAPermutation { .. })
        ));

        let mut entries = PermutationTable::from_seed(3).as_slice().to_vec();
        entries[HALF + 5] = (entries[5] + 1) % HALF as u32;
        assert!(matches!(
            PermutationTable::try_from_slice(&entries),
            Err(NoiseError::NotAPermutation { index, .. }) if index == HALF + 5
        ));
    }

    #[test]
    fn test_global_is_initialised_once() {
        let first = PermutationTable::global() as *const PermutationTable;
        let second = PermutationTable::global() as *const PermutationTable;
        assert_eq!(first, second);
        assert!(
            PermutationTable::install_global(PermutationTable::from_seed(1)).is_err(),
            "installing after first use must fail"
        );
    }

    #[test]
    fn test_global_shared_across_racing_threads() {
        let barrier = std::sync::Barrier::new(8);
        let tables: Vec<&'static PermutationTable> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    s.spawn(|| {
                        barrier.wait();
                        PermutationTable::global()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        assert!(
            tables.iter().all(|t| std::ptr::eq(*t, tables[0])),
            "every thread must observe the same table"
        );
        assert!(std::ptr::eq(tables[0], PermutationTable::global()));
    }
}
