//! Synthetic Transaction Generator
//!
//! Writes a batch of wallet transactions for trying out the scoring pipeline.
//! Most wallets behave regularly; a configurable share are bursty,
//! liquidation-heavy or short-lived.

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use tracing::info;
use wallet_credit_scoring::TransactionRecord;

const DAY: i64 = 86_400;
/// 2021-04-01T00:00:00Z
const WINDOW_START: i64 = 1_617_235_200;
const WINDOW_DAYS: i64 = 150;

#[derive(Parser, Debug)]
#[command(name = "generate-transactions", about = "Write a synthetic wallet transaction batch")]
struct Cli {
    /// Number of wallets
    #[arg(long, default_value_t = 500)]
    wallets: usize,

    /// Destination JSON file
    #[arg(long, default_value = "user-wallet-transactions.json")]
    output: PathBuf,

    /// Generator seed
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Share of wallets generated with anomalous behavior
    #[arg(long, default_value_t = 0.05)]
    anomaly_rate: f64,
}

/// Wallet activity generator
struct TransactionGenerator {
    rng: StdRng,
    wallet_counter: u64,
}

impl TransactionGenerator {
    fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            wallet_counter: 0,
        }
    }

    fn next_wallet(&mut self) -> String {
        self.wallet_counter += 1;
        format!("0x{:040x}", self.rng.gen::<u128>() ^ u128::from(self.wallet_counter))
    }

    /// Deposits and repays spread over many days
    fn generate_regular(&mut self) -> Vec<TransactionRecord> {
        let wallet = self.next_wallet();
        let first_day = self.rng.gen_range(0..WINDOW_DAYS / 2);
        let active_days = self.rng.gen_range(3..20);

        let mut records = Vec::new();
        for _ in 0..active_days {
            let day = first_day + self.rng.gen_range(0..WINDOW_DAYS / 2);
            let ts = WINDOW_START + day * DAY + self.rng.gen_range(0..DAY);
            let action = self.random_choice(&["deposit", "deposit", "borrow", "repay", "redeemunderlying"]);
            records.push(TransactionRecord::new(&wallet, action, ts));
        }
        records
    }

    /// Many transactions inside a few hours, heavy on borrows and liquidations
    fn generate_anomalous(&mut self) -> Vec<TransactionRecord> {
        let wallet = self.next_wallet();
        let start = WINDOW_START + self.rng.gen_range(0..WINDOW_DAYS) * DAY;
        let burst = self.rng.gen_range(40..120);

        (0..burst)
            .map(|_| {
                let ts = start + self.rng.gen_range(0..4 * 3600);
                let action = self.random_choice(&["borrow", "liquidationcall", "liquidationcall"]);
                TransactionRecord::new(&wallet, action, ts)
            })
            .collect()
    }

    fn random_choice<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("generate_transactions=info"))
        .init();

    let cli = Cli::parse();
    anyhow::ensure!(
        (0.0..=1.0).contains(&cli.anomaly_rate),
        "anomaly rate must be within [0, 1], got {}",
        cli.anomaly_rate
    );

    info!(
        wallets = cli.wallets,
        seed = cli.seed,
        anomaly_rate = cli.anomaly_rate,
        output = %cli.output.display(),
        "Generating transactions"
    );

    let mut generator = TransactionGenerator::new(cli.seed);
    let mut records = Vec::new();
    let mut anomalous = 0;

    for _ in 0..cli.wallets {
        if generator.rng.gen_bool(cli.anomaly_rate) {
            anomalous += 1;
            records.extend(generator.generate_anomalous());
        } else {
            records.extend(generator.generate_regular());
        }
    }

    let file = File::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), &records)?;

    info!(
        "Completed! Wrote {} transactions for {} wallets ({} anomalous)",
        records.len(),
        cli.wallets,
        anomalous
    );

    Ok(())
}
