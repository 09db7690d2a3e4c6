//! End-to-end runs of the scoring pipeline against files on disk.

use std::fs;
use std::path::Path;
use tempfile::TempDir;
use wallet_credit_scoring::{
    AppConfig, FeatureExtractor, Pipeline, ScoreDistribution, ScoringError, TransactionRecord,
};

fn config_in(dir: &TempDir, input: &str) -> AppConfig {
    let input_path = dir.path().join("transactions.json");
    fs::write(&input_path, input).unwrap();

    let mut config = AppConfig::default();
    config.input.path = input_path;
    config.output.scores_path = dir.path().join("wallet_scores.csv");
    config.report.chart_path = dir.path().join("score_distribution.png");
    config
}

fn read_rows(path: &Path) -> Vec<(String, u32)> {
    let mut reader = csv::Reader::from_path(path).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(headers, vec!["userWallet", "credit_score"]);
    reader
        .records()
        .map(|r| {
            let r = r.unwrap();
            (r[0].to_string(), r[1].parse().unwrap())
        })
        .collect()
}

fn synthetic_batch(wallets: usize) -> Vec<TransactionRecord> {
    let mut batch = Vec::new();
    for w in 0..wallets {
        let wallet = format!("0x{:04}", w);
        let days = 1 + (w % 9) as i64;
        for d in 0..days {
            let action = if d % 3 == 0 { "borrow" } else { "deposit" };
            batch.push(TransactionRecord::new(
                &wallet,
                action,
                1_617_235_200 + d * 86_400 + (w as i64) * 37,
            ));
        }
        if w % 17 == 0 {
            batch.push(TransactionRecord::new(&wallet, "liquidationcall", 1_620_000_000));
        }
    }
    batch
}

#[test]
fn two_wallet_scenario() {
    let dir = TempDir::new().unwrap();
    let config = config_in(
        &dir,
        r#"[
            {"userWallet": "A", "action": "deposit", "timestamp": 1000},
            {"userWallet": "A", "action": "deposit", "timestamp": 1086400},
            {"userWallet": "B", "action": "borrow", "timestamp": 1000}
        ]"#,
    );
    let scores_path = config.output.scores_path.clone();

    let summary = Pipeline::new(config).run().unwrap();
    assert_eq!(summary.transactions, 3);
    assert_eq!(summary.wallets, 2);
    assert_eq!(summary.actions, vec!["borrow", "deposit"]);

    let rows = read_rows(&scores_path);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, "A");
    assert_eq!(rows[1].0, "B");
    assert!(rows.iter().all(|(_, s)| (300..=1000).contains(s)));
    let chart = fs::read(dir.path().join("score_distribution.png")).unwrap();
    assert!(chart.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[test]
fn default_chart_settings_render_png() {
    let dir = TempDir::new().unwrap();
    let batch = serde_json::to_string(&synthetic_batch(40)).unwrap();
    let config = config_in(&dir, &batch);
    assert_eq!(
        config.report.chart_path.extension().and_then(|e| e.to_str()),
        AppConfig::default().report.chart_path.extension().and_then(|e| e.to_str())
    );
    let chart_path = config.report.chart_path.clone();

    let summary = Pipeline::new(config).run().unwrap();
    assert_eq!(summary.distribution.total(), 40);

    let chart = fs::read(chart_path).unwrap();
    assert!(chart.starts_with(b"\x89PNG\r\n\x1a\n"));
}

#[test]
fn two_wallet_features() {
    let batch = vec![
        TransactionRecord::new("A", "deposit", 1000),
        TransactionRecord::new("A", "deposit", 1000 + 86_400),
        TransactionRecord::new("B", "borrow", 1000),
    ];
    let table = FeatureExtractor::new().extract(&batch).unwrap();

    let a = table.get("A").unwrap();
    assert_eq!(
        (a.action_count("deposit"), a.total_transactions, a.active_days, a.lifespan_days),
        (2, 2, 2, 1)
    );
    let b = table.get("B").unwrap();
    assert_eq!(
        (b.action_count("borrow"), b.total_transactions, b.active_days, b.lifespan_days),
        (1, 1, 1, 0)
    );
}

#[test]
fn every_wallet_scored_once() {
    let dir = TempDir::new().unwrap();
    let batch = synthetic_batch(120);
    let config = config_in(&dir, &serde_json::to_string(&batch).unwrap());
    let scores_path = config.output.scores_path.clone();

    let summary = Pipeline::new(config).run().unwrap();
    let rows = read_rows(&scores_path);

    assert_eq!(rows.len(), 120);
    let mut wallets: Vec<&str> = rows.iter().map(|(w, _)| w.as_str()).collect();
    wallets.dedup();
    assert_eq!(wallets.len(), 120);
    assert!(rows.iter().all(|(_, s)| (300..=1000).contains(s)));

    assert_eq!(summary.distribution.total(), 120);
    assert_eq!(summary.scores.min_score(), Some(300));
    assert_eq!(summary.scores.max_score(), Some(1000));
}

#[test]
fn repeated_runs_are_byte_identical() {
    let batch = serde_json::to_string(&synthetic_batch(80)).unwrap();

    let first = TempDir::new().unwrap();
    let config = config_in(&first, &batch);
    let first_path = config.output.scores_path.clone();
    Pipeline::new(config).run().unwrap();

    let second = TempDir::new().unwrap();
    let config = config_in(&second, &batch);
    let second_path = config.output.scores_path.clone();
    Pipeline::new(config).run().unwrap();

    assert_eq!(fs::read(first_path).unwrap(), fs::read(second_path).unwrap());
}

#[test]
fn identical_wallets_all_score_minimum() {
    let dir = TempDir::new().unwrap();
    let batch: Vec<TransactionRecord> = (0..25)
        .map(|i| TransactionRecord::new(format!("w{:02}", i), "deposit", 1_650_000_000))
        .collect();
    let config = config_in(&dir, &serde_json::to_string(&batch).unwrap());
    let scores_path = config.output.scores_path.clone();

    let summary = Pipeline::new(config).run().unwrap();
    assert!(read_rows(&scores_path).iter().all(|(_, s)| *s == 300));
    assert_eq!(summary.distribution.count_for("300-399"), Some(25));
}

#[test]
fn missing_wallet_field_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let config = config_in(
        &dir,
        r#"[
            {"userWallet": "A", "action": "deposit", "timestamp": 1000},
            {"action": "borrow", "timestamp": 2000}
        ]"#,
    );
    let scores_path = config.output.scores_path.clone();
    let chart_path = config.report.chart_path.clone();

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, ScoringError::Parse(_)));
    assert!(!scores_path.exists());
    assert!(!chart_path.exists());
}

#[test]
fn missing_input_is_data_access_error() {
    let dir = TempDir::new().unwrap();
    let mut config = AppConfig::default();
    config.input.path = dir.path().join("absent.json");
    config.output.scores_path = dir.path().join("wallet_scores.csv");

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, ScoringError::DataAccess { .. }));
    assert!(!dir.path().join("wallet_scores.csv").exists());
}

#[test]
fn empty_batch_fails_before_output() {
    let dir = TempDir::new().unwrap();
    let config = config_in(&dir, "[]");
    let scores_path = config.output.scores_path.clone();

    let err = Pipeline::new(config).run().unwrap_err();
    assert!(matches!(err, ScoringError::ModelFit(_)));
    assert!(!scores_path.exists());
}

#[test]
fn svg_chart_and_disabled_chart() {
    let batch = serde_json::to_string(&synthetic_batch(30)).unwrap();

    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, &batch);
    config.report.chart_path = dir.path().join("chart.svg");
    Pipeline::new(config).run().unwrap();
    assert!(fs::read_to_string(dir.path().join("chart.svg")).unwrap().contains("<svg"));

    let dir = TempDir::new().unwrap();
    let mut config = config_in(&dir, &batch);
    config.report.enabled = false;
    let chart_path = config.report.chart_path.clone();
    let summary = Pipeline::new(config).run().unwrap();
    assert!(!chart_path.exists());
    assert_eq!(summary.distribution, ScoreDistribution::standard(summary.scores.credit_scores()));
}
