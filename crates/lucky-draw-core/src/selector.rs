// Winner selection: uniform sampling without replacement.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::participant::Participant;

/// Pick `k` distinct participants from `pool`.
///
/// `k` larger than the pool is clamped to the pool size. The result is the
/// prefix of a uniformly random permutation (partial Fisher–Yates over an
/// index vector), so every participant is equally likely to land in every
/// output position. `pool` is never modified.
pub fn select_winners<R: Rng + ?Sized>(
    pool: &[Participant],
    k: usize,
    rng: &mut R,
) -> Vec<Participant> {
    let take = k.min(pool.len());
    let mut indices: Vec<usize> = (0..pool.len()).collect();
    let (picked, _) = indices.partial_shuffle(rng, take);

    picked.iter().map(|&i| pool[i].clone()).collect()
}

/// Participants in `pool` whose id does not appear in `exclude`.
pub fn remaining_participants(pool: &[Participant], exclude: &[Participant]) -> Vec<Participant> {
    pool.iter()
        .filter(|p| !exclude.iter().any(|w| w.id == p.id))
        .cloned()
        .collect()
}
