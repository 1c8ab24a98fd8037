use std::collections::BTreeMap;

use tracing::debug;

use bounty_model::{ActorId, Contribution, ContributionId, PaymentSplit};

use crate::types::SplitError;

/// Compute the exact per-contributor split of `bounty` (in currency minor
/// units) across the given contributions.
///
/// Multiple contributions by the same contributor are aggregated into a
/// single entry before the split, so a contributor never receives two
/// separate amounts for one challenge.
///
/// Proportional division of an integer amount by arbitrary weights rarely
/// divides evenly, so amounts are allocated by largest remainder: each
/// entry gets the floor of its ideal share, then the leftover minor units
/// are handed out one each in descending order of fractional remainder,
/// ties broken by ascending contribution id. The resulting amounts always
/// sum to `bounty` exactly.
///
/// Pure computation: safe for both sponsor-facing previews and the
/// authoritative split used at completion.
pub fn calculate_split(
    contributions: &[Contribution],
    bounty: u64,
) -> Result<Vec<PaymentSplit>, SplitError> {
    if contributions.is_empty() {
        return Err(SplitError::NoContributions);
    }
    if bounty == 0 {
        return Err(SplitError::ZeroBounty);
    }

    // Aggregate weights per contributor, keeping the lowest contribution id
    // as the entry's stable identity and tie-break key.
    let mut aggregated: BTreeMap<&ActorId, (u64, ContributionId)> = BTreeMap::new();
    for contribution in contributions {
        let entry = aggregated
            .entry(&contribution.contributor)
            .or_insert((0, contribution.id));
        entry.0 += contribution.weight as u64;
        entry.1 = entry.1.min(contribution.id);
    }

    let total_weight: u64 = aggregated.values().map(|(weight, _)| *weight).sum();
    if total_weight == 0 {
        // Unreachable with table-assigned weights, but never divide by zero.
        return Err(SplitError::ZeroTotalWeight);
    }

    struct Allocation<'a> {
        contributor: &'a ActorId,
        contribution_id: ContributionId,
        weight: u64,
        base: u64,
        remainder: u64,
    }

    let mut allocations: Vec<Allocation<'_>> = aggregated
        .iter()
        .map(|(&contributor, &(weight, contribution_id))| {
            let ideal = bounty as u128 * weight as u128;
            Allocation {
                contributor,
                contribution_id,
                weight,
                base: (ideal / total_weight as u128) as u64,
                remainder: (ideal % total_weight as u128) as u64,
            }
        })
        .collect();

    // Hand out the leftover minor units, largest fractional remainder first.
    let allocated: u64 = allocations.iter().map(|a| a.base).sum();
    let leftover = bounty - allocated;
    allocations.sort_by(|a, b| {
        b.remainder
            .cmp(&a.remainder)
            .then(a.contribution_id.cmp(&b.contribution_id))
    });
    for allocation in allocations.iter_mut().take(leftover as usize) {
        allocation.base += 1;
    }

    let mut splits: Vec<PaymentSplit> = allocations
        .into_iter()
        .map(|a| PaymentSplit {
            contributor: a.contributor.clone(),
            contribution_id: a.contribution_id,
            weight: a.weight,
            percentage: a.weight as f64 / total_weight as f64 * 100.0,
            amount: a.base,
        })
        .collect();

    // Largest share first; contribution id breaks ties deterministically.
    splits.sort_by(|a, b| {
        b.amount
            .cmp(&a.amount)
            .then(a.contribution_id.cmp(&b.contribution_id))
    });

    debug!(
        recipients = splits.len(),
        total_weight,
        bounty,
        "split computed"
    );

    Ok(splits)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bounty_model::{ChallengeId, ContributionCategory};
    use chrono::Utc;

    fn contribution(
        id: ContributionId,
        challenge_id: ChallengeId,
        contributor: &str,
        weight: u32,
    ) -> Contribution {
        Contribution {
            id,
            challenge_id,
            contributor: contributor.to_string(),
            category: ContributionCategory::Implementation,
            weight,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_empty_contributions_rejected() {
        assert_eq!(calculate_split(&[], 10_000), Err(SplitError::NoContributions));
    }

    #[test]
    fn test_zero_bounty_rejected() {
        let contributions = vec![contribution(1, 1, "alice", 30)];
        assert_eq!(
            calculate_split(&contributions, 0),
            Err(SplitError::ZeroBounty)
        );
    }

    #[test]
    fn test_zero_total_weight_rejected() {
        let contributions = vec![
            contribution(1, 1, "alice", 0),
            contribution(2, 1, "bob", 0),
        ];
        assert_eq!(
            calculate_split(&contributions, 10_000),
            Err(SplitError::ZeroTotalWeight)
        );
    }

    #[test]
    fn test_three_way_example() {
        // $1000.00 over weights 30 / 25 / 20.
        let contributions = vec![
            contribution(1, 1, "alice", 30),
            contribution(2, 1, "bob", 25),
            contribution(3, 1, "carol", 20),
        ];
        let splits = calculate_split(&contributions, 100_000).unwrap();

        assert_eq!(splits.len(), 3);
        assert_eq!(splits[0].contributor, "alice");
        assert_eq!(splits[0].amount, 40_000); // $400.00
        assert_eq!(splits[1].contributor, "bob");
        assert_eq!(splits[1].amount, 33_333); // $333.33
        assert_eq!(splits[2].contributor, "carol");
        assert_eq!(splits[2].amount, 26_667); // $266.67

        let total: u64 = splits.iter().map(|s| s.amount).sum();
        assert_eq!(total, 100_000);
    }

    #[test]
    fn test_equal_three_way_split_of_100() {
        // $100.00 over three equal weights: 33.33 + 33.33 + 33.34.
        let contributions = vec![
            contribution(1, 1, "alice", 10),
            contribution(2, 1, "bob", 10),
            contribution(3, 1, "carol", 10),
        ];
        let splits = calculate_split(&contributions, 10_000).unwrap();

        let total: u64 = splits.iter().map(|s| s.amount).sum();
        assert_eq!(total, 10_000);

        // The extra cent goes to the lowest contribution id among the ties.
        let alice = splits.iter().find(|s| s.contributor == "alice").unwrap();
        assert_eq!(alice.amount, 3_334);
    }

    #[test]
    fn test_same_contributor_aggregated() {
        let contributions = vec![
            contribution(1, 1, "alice", 10),
            contribution(2, 1, "alice", 20),
            contribution(3, 1, "bob", 30),
        ];
        let splits = calculate_split(&contributions, 60_000).unwrap();

        assert_eq!(splits.len(), 2);
        let alice = splits.iter().find(|s| s.contributor == "alice").unwrap();
        assert_eq!(alice.weight, 30);
        assert_eq!(alice.contribution_id, 1);
        assert_eq!(alice.amount, 30_000);
    }

    #[test]
    fn test_percentages_sum_to_100() {
        let contributions = vec![
            contribution(1, 1, "alice", 30),
            contribution(2, 1, "bob", 25),
            contribution(3, 1, "carol", 20),
        ];
        let splits = calculate_split(&contributions, 100_000).unwrap();
        let total_pct: f64 = splits.iter().map(|s| s.percentage).sum();
        assert!((total_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_bounty_smaller_than_recipient_count() {
        // 1 cent across three contributors: one gets it, the others get 0.
        let contributions = vec![
            contribution(1, 1, "alice", 10),
            contribution(2, 1, "bob", 10),
            contribution(3, 1, "carol", 10),
        ];
        let splits = calculate_split(&contributions, 1).unwrap();

        let total: u64 = splits.iter().map(|s| s.amount).sum();
        assert_eq!(total, 1);
        assert_eq!(splits.iter().filter(|s| s.amount > 0).count(), 1);
    }

    #[test]
    fn test_sum_conserved_for_awkward_inputs() {
        // Weight/bounty combinations chosen to not divide evenly.
        let cases: &[(&[u32], u64)] = &[
            (&[1, 2, 3], 100),
            (&[7, 13, 29], 99_999),
            (&[30, 25, 20], 100_000),
            (&[1, 1, 1, 1, 1, 1, 1], 10),
            (&[5, 95], 333),
            (&[3], 1_000_001),
        ];

        for (weights, bounty) in cases {
            let contributions: Vec<Contribution> = weights
                .iter()
                .enumerate()
                .map(|(i, w)| contribution(i as u64 + 1, 1, &format!("actor-{i}"), *w))
                .collect();
            let splits = calculate_split(&contributions, *bounty).unwrap();
            let total: u64 = splits.iter().map(|s| s.amount).sum();
            assert_eq!(
                total, *bounty,
                "sum not conserved for weights {weights:?} bounty {bounty}"
            );
        }
    }

    #[test]
    fn test_large_bounty_no_overflow() {
        let contributions = vec![
            contribution(1, 1, "alice", u32::MAX),
            contribution(2, 1, "bob", u32::MAX),
            contribution(3, 1, "carol", 1),
        ];
        let splits = calculate_split(&contributions, u64::MAX / 2).unwrap();
        let total: u64 = splits.iter().map(|s| s.amount).sum();
        assert_eq!(total, u64::MAX / 2);
    }

    #[test]
    fn test_output_ordered_by_amount_descending() {
        let contributions = vec![
            contribution(1, 1, "small", 5),
            contribution(2, 1, "large", 50),
            contribution(3, 1, "medium", 20),
        ];
        let splits = calculate_split(&contributions, 75_000).unwrap();
        assert_eq!(splits[0].contributor, "large");
        assert_eq!(splits[1].contributor, "medium");
        assert_eq!(splits[2].contributor, "small");
    }

    #[test]
    fn test_single_contributor_gets_everything() {
        let contributions = vec![contribution(1, 1, "alice", 30)];
        let splits = calculate_split(&contributions, 42_424).unwrap();
        assert_eq!(splits.len(), 1);
        assert_eq!(splits[0].amount, 42_424);
        assert!((splits[0].percentage - 100.0).abs() < 1e-9);
    }
}
