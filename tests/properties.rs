//! Invariants of the scoring stages over generated batches.

use proptest::prelude::*;
use std::collections::BTreeSet;
use wallet_credit_scoring::{
    AppConfig, CreditScorer, FeatureExtractor, ScoreDistribution, TransactionRecord,
};

const ACTIONS: [&str; 5] = ["deposit", "borrow", "repay", "redeemunderlying", "liquidationcall"];

fn batch_strategy() -> impl Strategy<Value = Vec<TransactionRecord>> {
    prop::collection::vec(
        (0usize..12, 0usize..ACTIONS.len(), 1_600_000_000i64..1_640_000_000i64),
        1..80,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .map(|(wallet, action, ts)| {
                TransactionRecord::new(format!("0xwallet{:02}", wallet), ACTIONS[action], ts)
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn every_wallet_gets_one_bounded_score(batch in batch_strategy()) {
        let features = FeatureExtractor::new().extract(&batch).unwrap();
        let scores = CreditScorer::new(&AppConfig::default()).unwrap().score(&features).unwrap();

        let distinct: BTreeSet<&str> = batch.iter().map(|tx| tx.user_wallet.as_str()).collect();
        prop_assert_eq!(scores.len(), distinct.len());

        let scored: BTreeSet<&str> = scores.scores().iter().map(|s| s.user_wallet.as_str()).collect();
        prop_assert_eq!(&scored, &distinct);

        for score in scores.credit_scores() {
            prop_assert!((300..=1000).contains(&score), "score {} out of range", score);
        }

        let distribution = ScoreDistribution::standard(scores.credit_scores());
        prop_assert_eq!(distribution.total(), scores.len() as u64);
    }

    #[test]
    fn features_are_consistent(batch in batch_strategy()) {
        let table = FeatureExtractor::new().extract(&batch).unwrap();

        for (wallet, features) in table.iter() {
            let count = batch.iter().filter(|tx| tx.user_wallet == wallet).count() as u64;
            prop_assert_eq!(features.total_transactions, count);
            prop_assert_eq!(features.action_counts.values().sum::<u64>(), count);
            prop_assert!(features.active_days >= 1);
            prop_assert!(features.active_days <= features.lifespan_days + 2);
        }
    }
}
