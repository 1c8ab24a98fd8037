/// Compute the Gini coefficient of a payout distribution.
///
/// Standard formulation over ascending-sorted amounts with 1-indexed ranks:
///
/// `G = 2 * sum(i * a_i) / (n * sum(a)) - (n + 1) / n`
///
/// Returns 0.0 for n <= 1 (a single recipient cannot be unequal) and for
/// all-zero totals. The result is clamped to [0, 1] to absorb float noise.
pub fn gini_coefficient(amounts: &[u64]) -> f64 {
    let n = amounts.len();
    if n <= 1 {
        return 0.0;
    }

    let total: u128 = amounts.iter().map(|&a| a as u128).sum();
    if total == 0 {
        return 0.0;
    }

    let mut sorted: Vec<u64> = amounts.to_vec();
    sorted.sort_unstable();

    let weighted: u128 = sorted
        .iter()
        .enumerate()
        .map(|(i, &a)| (i as u128 + 1) * a as u128)
        .sum();

    let n_f = n as f64;
    let gini = 2.0 * weighted as f64 / (n_f * total as f64) - (n_f + 1.0) / n_f;
    gini.clamp(0.0, 1.0)
}
