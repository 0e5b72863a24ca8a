use crate::models::TallyRecord;
use crate::voting::{PollResults, VoteShare};

/// Integer percentage of `count` over `total`, rounded half up.
/// Returns 0 when nothing has been voted yet. Capped at 100.
pub fn percentage(count: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    // round(100 * count / total) == floor((200 * count + total) / (2 * total))
    let count = count as u128;
    let total = total as u128;
    let rounded = (200 * count + total) / (2 * total);
    rounded.min(100) as u8
}

/// Computes the share of every listed answer. Each percentage is rounded on
/// its own, so the shares need not add up to exactly 100.
pub fn calculate_results<'a>(
    labels: impl IntoIterator<Item = &'a str>,
    record: &TallyRecord,
) -> PollResults {
    let total_polls = record.total_polls();
    let shares = labels
        .into_iter()
        .map(|label| {
            let count = record.count_for(label);
            VoteShare {
                label: label.to_string(),
                count,
                percentage: percentage(count, total_polls),
            }
        })
        .collect();

    PollResults {
        total_polls,
        shares,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Integer rounding agrees with rounding the exact quotient half up.
        #[test]
        fn prop_percentage_matches_half_up((total, count) in (1u64..100_000).prop_flat_map(|t| (Just(t), 0..=t))) {
            let expected = (100.0 * count as f64 / total as f64).round() as u8;
            prop_assert_eq!(percentage(count, total), expected);
        }
    }

    #[test]
    fn test_percentage_rounds_half_up() {
        assert_eq!(percentage(1, 3), 33);
        assert_eq!(percentage(2, 3), 67);
        assert_eq!(percentage(1, 8), 13); // 12.5
        assert_eq!(percentage(1, 200), 1); // 0.5
        assert_eq!(percentage(1, 201), 0);
        assert_eq!(percentage(3, 3), 100);
    }

    #[test]
    fn test_percentage_of_empty_tally_is_zero() {
        assert_eq!(percentage(0, 0), 0);
        assert_eq!(percentage(5, 0), 0);
    }

    #[test]
    fn test_percentage_is_capped() {
        assert_eq!(percentage(4, 2), 100);
    }

    #[test]
    fn test_shares_need_not_sum_to_hundred() {
        let mut record = TallyRecord::empty();
        record.record_vote("A");
        record.record_vote("B");
        record.record_vote("B");

        let results = calculate_results(["A", "B"], &record);
        assert_eq!(results.total_polls, 3);
        assert_eq!(results.percentage_for("A"), Some(33));
        assert_eq!(results.percentage_for("B"), Some(67));

        let mut thirds = TallyRecord::empty();
        for label in ["A", "B", "C"] {
            thirds.record_vote(label);
        }
        let results = calculate_results(["A", "B", "C"], &thirds);
        let sum: u32 = results.shares.iter().map(|s| s.percentage as u32).sum();
        assert_eq!(sum, 99);
    }

    #[test]
    fn test_unvoted_answer_shows_zero() {
        let record = TallyRecord::empty().with_vote("Yes");
        let results = calculate_results(["Yes", "No"], &record);
        assert_eq!(results.shares[0].percentage, 100);
        assert_eq!(results.shares[1].count, 0);
        assert_eq!(results.shares[1].percentage, 0);
        assert_eq!(results.percentage_for("Maybe"), None);
    }
}
