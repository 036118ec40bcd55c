//! coglab CLI — simulate a reaction-test population and report on it.
//!
//! Commands:
//! - `simulate` — seeded population simulator; persists a JSONL session file
//! - `leaderboard` — top users by completed-test count
//! - `distribution` — histogram for a test type and metric
//! - `stats` — per-type summary, or global totals when no type is given
//! - `export` — CSV export of the leaderboard and every distribution

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

use coglab_core::domain::{TestId, TestType, TrialObservation, UserId};
use coglab_service::{
    build_distribution, build_leaderboard, global_stats, type_stats, write_distribution_csv,
    write_leaderboard_csv, CompletedTest, DistributionMetric, InMemoryRepository, Repository,
    ScoringService, ServiceConfig, SessionHistory, StatisticsRecord,
};

#[derive(Parser)]
#[command(
    name = "coglab",
    about = "coglab CLI — cognitive reaction-test scoring engine"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulate users completing tests and persist the session history.
    Simulate {
        /// Number of simulated users.
        #[arg(long, default_value_t = 8)]
        users: u64,

        /// Completed tests per user.
        #[arg(long, default_value_t = 12)]
        tests: u64,

        /// RNG seed; identical seeds reproduce identical sessions.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        /// Session history file (JSONL).
        #[arg(long, default_value = "coglab-session.jsonl")]
        history: PathBuf,

        /// Optional service config TOML (conflict retries, page sizes).
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Top users by completed-test count.
    Leaderboard {
        #[arg(long, default_value_t = 10)]
        limit: usize,

        /// Also resolve this user id's own standing.
        #[arg(long)]
        user: Option<u64>,

        #[arg(long, default_value = "coglab-session.jsonl")]
        history: PathBuf,
    },
    /// Histogram of one test type's population.
    Distribution {
        /// Test type: simple_reaction, choice_reaction, working_memory, go_no_go, stroop.
        #[arg(long)]
        test_type: String,

        /// Metric: reaction-time or accuracy.
        #[arg(long, default_value = "reaction-time")]
        metric: String,

        #[arg(long, default_value = "coglab-session.jsonl")]
        history: PathBuf,
    },
    /// Per-type summary, or global totals when --test-type is omitted.
    Stats {
        #[arg(long)]
        test_type: Option<String>,

        #[arg(long, default_value = "coglab-session.jsonl")]
        history: PathBuf,
    },
    /// Write leaderboard and distribution CSVs.
    Export {
        #[arg(long, default_value = "exports")]
        output_dir: PathBuf,

        #[arg(long, default_value = "coglab-session.jsonl")]
        history: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Simulate {
            users,
            tests,
            seed,
            history,
            config,
        } => simulate(users, tests, seed, &history, config.as_deref()),
        Commands::Leaderboard {
            limit,
            user,
            history,
        } => leaderboard(limit, user, &history),
        Commands::Distribution {
            test_type,
            metric,
            history,
        } => distribution(&test_type, &metric, &history),
        Commands::Stats { test_type, history } => stats(test_type.as_deref(), &history),
        Commands::Export {
            output_dir,
            history,
        } => export(&output_dir, &history),
    }
}

// ── simulate ─────────────────────────────────────────────────────────

fn simulate(
    users: u64,
    tests: u64,
    seed: u64,
    history: &Path,
    config: Option<&Path>,
) -> Result<()> {
    if users == 0 || tests == 0 {
        bail!("--users and --tests must be positive");
    }

    let service_config = match config {
        Some(path) => ServiceConfig::from_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => ServiceConfig::default(),
    };

    let repo = Arc::new(InMemoryRepository::new());
    let service = ScoringService::with_config(Arc::clone(&repo), &service_config)
        .with_history(SessionHistory::new(history));

    let completions = plan_session(users, tests, seed);
    let total = completions.len();

    // Completions of the same type serialize inside the service; rayon
    // only supplies the concurrent request handlers.
    completions
        .into_par_iter()
        .try_for_each(|completed| service.complete_test(completed).map(|_| ()))
        .context("simulated completion failed")?;

    // Compact the session file to the final recomputed ranks.
    let mut records: Vec<StatisticsRecord> = Vec::new();
    for test_type in TestType::ALL {
        records.extend(service.repository().find_all_by_type(test_type)?.records);
    }
    records.sort_by_key(|r| r.test_id);
    SessionHistory::new(history).write_snapshot(&records)?;

    println!(
        "simulated {total} completions from {users} users (seed {seed})"
    );
    let totals = global_stats(repo.as_ref(), Utc::now())?;
    for count in &totals.test_type_counts {
        println!("  {:<18} {:>5}", count.test_name, count.count);
    }
    println!("session history written to {}", history.display());
    Ok(())
}

/// Deterministic session plan: every user gets a latent skill profile
/// drawn from the seed, then a schedule of completed tests across types.
fn plan_session(users: u64, tests: u64, seed: u64) -> Vec<CompletedTest> {
    let now = Utc::now();
    let mut completions = Vec::with_capacity((users * tests) as usize);
    let mut test_id = 0u64;

    for user in 1..=users {
        let mut rng = StdRng::seed_from_u64(seed ^ (user.wrapping_mul(0x9E37_79B9)));
        let base_ms: u32 = rng.gen_range(170..420);
        let accuracy: f64 = rng.gen_range(0.55..0.98);

        for t in 0..tests {
            test_id += 1;
            let test_type = TestType::ALL[rng.gen_range(0..TestType::COUNT)];
            completions.push(CompletedTest {
                test_id: TestId(test_id),
                test_type,
                user_id: UserId(user),
                username: format!("user-{user:03}"),
                completed_at: now - Duration::minutes((tests - t) as i64 * 7),
                trials: synth_trials(&mut rng, test_type, base_ms, accuracy),
            });
        }
    }
    completions
}

fn synth_trials(
    rng: &mut StdRng,
    test_type: TestType,
    base_ms: u32,
    accuracy: f64,
) -> Vec<TrialObservation> {
    let trial_count: u32 = match test_type {
        TestType::SimpleReaction => 5,
        TestType::ChoiceReaction => 10,
        TestType::WorkingMemory => 12,
        TestType::GoNoGo => 15,
        TestType::Stroop => 20,
    };

    (1..=trial_count)
        .map(|trial_index| {
            let (stimulus, response) = synth_stimulus(rng, test_type);
            let is_correct = rng.gen_bool(accuracy);
            // Withheld responses (correct no-go inhibitions, lapses)
            // record no latency.
            let withheld = match test_type {
                TestType::GoNoGo => stimulus == "no-go" || rng.gen_bool(0.05),
                _ => rng.gen_bool(0.03),
            };
            let reaction_time_ms = if withheld {
                None
            } else {
                Some(base_ms + rng.gen_range(0..140))
            };
            TrialObservation {
                trial_index,
                stimulus,
                response: if withheld { String::new() } else { response },
                reaction_time_ms,
                is_correct,
            }
        })
        .collect()
}

fn synth_stimulus(rng: &mut StdRng, test_type: TestType) -> (String, String) {
    match test_type {
        TestType::SimpleReaction => ("●".into(), "space".into()),
        TestType::ChoiceReaction => {
            if rng.gen_bool(0.5) {
                ("◀".into(), "left".into())
            } else {
                ("▶".into(), "right".into())
            }
        }
        TestType::WorkingMemory => {
            let letters = ["K", "T", "R", "M", "B"];
            let s = letters[rng.gen_range(0..letters.len())];
            (s.into(), if rng.gen_bool(0.3) { "match" } else { "pass" }.into())
        }
        TestType::GoNoGo => {
            if rng.gen_bool(0.75) {
                ("go".into(), "space".into())
            } else {
                ("no-go".into(), String::new())
            }
        }
        TestType::Stroop => {
            let words = ["RED", "BLUE", "GREEN", "YELLOW"];
            let w = words[rng.gen_range(0..words.len())];
            (w.into(), w.to_ascii_lowercase())
        }
    }
}

// ── reports ──────────────────────────────────────────────────────────

fn open_session(history: &Path) -> Result<Arc<InMemoryRepository>> {
    if !history.exists() {
        bail!(
            "no session history at {}; run `coglab simulate` first",
            history.display()
        );
    }
    let repo = Arc::new(InMemoryRepository::new());
    SessionHistory::new(history)
        .replay_into(repo.as_ref())
        .with_context(|| format!("replay session history {}", history.display()))?;
    Ok(repo)
}

fn leaderboard(limit: usize, user: Option<u64>, history: &Path) -> Result<()> {
    let repo = open_session(history)?;
    let result = build_leaderboard(repo.as_ref(), limit, user.map(UserId))?;

    println!("rank  username      tests");
    for entry in &result.rankings {
        println!(
            "{:>4}  {:<12} {:>6}",
            entry.rank, entry.username, entry.test_count
        );
    }
    println!("({} participating users)", result.total_users);
    if let Some(me) = result.current_user {
        println!(
            "you: rank {} with {} completed tests",
            me.rank, me.test_count
        );
    }
    Ok(())
}

fn distribution(test_type: &str, metric: &str, history: &Path) -> Result<()> {
    let test_type: TestType = test_type.parse()?;
    let metric: DistributionMetric = metric.parse()?;
    let repo = open_session(history)?;
    let report = build_distribution(repo.as_ref(), test_type, metric)?;

    println!(
        "{} — {} tests",
        report.test_name, report.total_tests
    );
    for bucket in &report.buckets {
        let bar = "█".repeat((bucket.percentage / 2.0).round() as usize);
        println!(
            "{:>10}  {:>4}  {:>5.1}%  {bar}",
            bucket.label, bucket.count, bucket.percentage
        );
    }
    Ok(())
}

fn stats(test_type: Option<&str>, history: &Path) -> Result<()> {
    let repo = open_session(history)?;
    match test_type {
        Some(raw) => {
            let test_type: TestType = raw.parse()?;
            let stats = type_stats(repo.as_ref(), test_type)?;
            println!("{} — {} tests", stats.test_name, stats.total_tests);
            if let Some(rt) = &stats.reaction_time {
                println!(
                    "  avg reaction time: {:.1} ms (range {:.0}–{:.0})",
                    rt.mean, rt.min, rt.max
                );
            }
            if let Some(acc) = &stats.accuracy {
                println!(
                    "  accuracy: {:.1}% (range {:.1}%–{:.1}%)",
                    acc.mean * 100.0,
                    acc.min * 100.0,
                    acc.max * 100.0
                );
            }
        }
        None => {
            let totals = global_stats(repo.as_ref(), Utc::now())?;
            println!("{} users, {} completed tests", totals.total_users, totals.total_tests);
            println!("{} completed today", totals.total_tests_today);
            for count in &totals.test_type_counts {
                println!("  {:<18} {:>5}", count.test_name, count.count);
            }
        }
    }
    Ok(())
}

fn export(output_dir: &Path, history: &Path) -> Result<()> {
    let repo = open_session(history)?;
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;

    let result = build_leaderboard(repo.as_ref(), 100, None)?;
    let leaderboard_path = output_dir.join("leaderboard.csv");
    write_leaderboard_csv(&leaderboard_path, &result)?;
    println!("wrote {}", leaderboard_path.display());

    for test_type in TestType::ALL {
        for metric in [DistributionMetric::ReactionTime, DistributionMetric::Accuracy] {
            let report = build_distribution(repo.as_ref(), test_type, metric)?;
            let suffix = match metric {
                DistributionMetric::ReactionTime => "reaction_time",
                DistributionMetric::Accuracy => "accuracy",
            };
            let path = output_dir.join(format!("{}_{suffix}.csv", test_type.slug()));
            write_distribution_csv(&path, &report)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}
