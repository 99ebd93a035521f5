//! Unequal next-hop weights for weighted multipath tests.

/// Split `weight_sum` into `count` positive weights that are pairwise distinct where possible,
/// so a hop carrying the wrong share of traffic cannot be mistaken for another.
///
/// - One hop takes the whole sum.
/// - If there is not enough to go round, every hop gets 1.
/// - Two hops get `[1, sum - 1]`.
/// - Otherwise the first three hops get 1, 2 and the remainder of splitting `sum - 3` evenly, and every
///   hop from the third onwards shares that even split.
///
/// ```
/// # use scale_core::weights::next_hop_weights;
/// assert_eq!(next_hop_weights(100, 4), [1, 2, 49, 48]);
/// assert_eq!(next_hop_weights(3, 5), [1, 1, 1, 1, 1]);
/// ```
pub fn next_hop_weights(weight_sum: u64, count: usize) -> Vec<u64> {
    match count {
        0 => vec![],
        1 => vec![weight_sum],
        _ if weight_sum <= count as u64 => vec![1; count],
        2 => vec![1, weight_sum - 1],
        _ => {
            let even_hops = count as u64 - 2;
            let q = (weight_sum - 3) / even_hops;
            let rem = (weight_sum - 3) % even_hops;
            let mut weights = Vec::with_capacity(count);
            weights.extend([1, 2, rem + q]);
            weights.resize(count, q);
            weights
        }
    }
}

/// Each weight as a percentage of the total, suitable for
/// [crate::distribution::check_rates_against_weights].
pub fn weights_to_percents(weights: &[u64]) -> Vec<f64> {
    let total: u128 = weights.iter().map(|w| *w as u128).sum();
    if total == 0 {
        return vec![0.0; weights.len()];
    }
    weights.iter().map(|w| 100.0 * *w as f64 / total as f64).collect()
}
