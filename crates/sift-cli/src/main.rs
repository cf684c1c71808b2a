//! `sift` — command line entry points for the email evolution pipeline.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use sift_classifier::{BootstrapLabeler, ClassifierEngine};
use sift_core::config::SiftConfig;
use sift_core::models::{CycleSummary, ProposalStatus, TrainingTrigger};
use sift_core::taxonomy::{CategoryGroup, Taxonomy};
use sift_core::traits::{IMessageStore, INamingOracle};
use sift_discovery::DiscoveryEngine;
use sift_evolution::{EvolutionEngine, Scheduler};
use sift_oracle::AnthropicClient;
use sift_storage::StorageEngine;
use sift_training::TrainingEngine;

#[derive(Parser)]
#[command(name = "sift", about = "Self-evolving email classification", version)]
struct Cli {
    /// Data directory (overrides SIFT_DATA_DIR).
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Taxonomy TOML file (overrides the built-in taxonomy).
    #[arg(long, global = true, env = "SIFT_TAXONOMY_FILE")]
    taxonomy: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one evolution cycle, or keep cycling on a schedule.
    Cycle {
        /// Keep running cycles at the configured interval.
        #[arg(long)]
        schedule: bool,
        /// Override the sleep between cycles, in seconds.
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Classify all unlabeled messages with the latest model.
    Classify,
    /// Train a new model version from all labeled messages.
    Train,
    /// Cluster low-confidence messages and propose new categories.
    Discover {
        /// Confidence threshold for selecting candidates.
        #[arg(long)]
        threshold: Option<f64>,
        /// Maximum candidates to cluster.
        #[arg(long, default_value_t = 500)]
        limit: usize,
    },
    /// Review pending category proposals interactively.
    Review,
    /// Bootstrap training labels with the LLM labeler.
    Bootstrap {
        /// Delete all existing labels first (re-label under a new taxonomy).
        #[arg(long)]
        clear_existing: bool,
    },
    /// Label distribution grouped by handling priority.
    Digest,
    /// Backlog, model lineage, and pending proposal counts.
    Status,
}

/// Wired-up application state shared by the subcommands.
struct App {
    config: SiftConfig,
    store: Arc<StorageEngine>,
    taxonomy: Taxonomy,
}

impl App {
    fn open(data_dir: Option<PathBuf>, taxonomy_file: Option<PathBuf>) -> anyhow::Result<Self> {
        let mut config = SiftConfig::from_env();
        if let Some(dir) = data_dir {
            config = config.with_data_dir(dir);
        }
        let taxonomy = match taxonomy_file {
            Some(path) => {
                let raw = std::fs::read_to_string(&path)
                    .with_context(|| format!("reading taxonomy file {}", path.display()))?;
                Taxonomy::from_toml_str(&raw)?
            }
            None => Taxonomy::default(),
        };
        let store = Arc::new(StorageEngine::open(&config.db_path())?);
        Ok(Self {
            config,
            store,
            taxonomy,
        })
    }

    fn classifier(&self) -> ClassifierEngine {
        ClassifierEngine::new(
            self.store.clone(),
            self.config.classifier.clone(),
            self.config.model_dir(),
        )
    }

    fn trainer(&self) -> TrainingEngine {
        TrainingEngine::new(
            self.store.clone(),
            self.config.training.clone(),
            self.config.model_dir(),
        )
    }

    fn naming_oracle(&self) -> Option<Arc<dyn INamingOracle>> {
        match AnthropicClient::from_config(&self.config.oracle) {
            Ok(client) => Some(Arc::new(client)),
            Err(error) => {
                warn!(%error, "naming oracle unavailable; discovery will not record proposals");
                None
            }
        }
    }

    fn discovery(&self) -> DiscoveryEngine {
        DiscoveryEngine::new(
            self.store.clone(),
            self.naming_oracle(),
            self.taxonomy.clone(),
            self.config.discovery.clone(),
        )
    }

    fn evolution(&self) -> EvolutionEngine {
        EvolutionEngine::new(
            self.store.clone(),
            // Provider ingestion is an external collaborator; nothing is
            // wired in by default, so cycles classify the stored backlog.
            None,
            self.classifier(),
            self.discovery(),
            self.trainer(),
            self.config.evolution.clone(),
            self.config.discovery.min_candidates(),
        )
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let app = App::open(cli.data_dir.clone(), cli.taxonomy.clone())?;

    match cli.command {
        Command::Cycle {
            schedule,
            interval_secs,
        } => {
            if schedule {
                let interval = Duration::from_secs(
                    interval_secs.unwrap_or(app.config.evolution.schedule_interval_secs),
                );
                println!(
                    "Starting evolution scheduler (every {}s). Press Ctrl+C to stop.",
                    interval.as_secs()
                );
                let scheduler = Scheduler::new(app.evolution(), interval);
                // The pipeline itself is synchronous; the runtime exists only
                // for the interruptible sleep and signal handling.
                let runtime = tokio::runtime::Runtime::new()?;
                runtime.block_on(scheduler.run(print_summary))?;
            } else {
                let summary = app.evolution().run_cycle();
                print_summary(&summary);
                let pending = app.store.pending_proposals()?;
                if !pending.is_empty() {
                    println!(
                        "\n{} pending category proposal(s). Run 'sift review' to review them.",
                        pending.len()
                    );
                }
            }
        }
        Command::Classify => {
            let report = app.classifier().classify_and_flag()?;
            println!(
                "Classified {} message(s), {} uncertain.",
                report.classified,
                report.uncertain_ids.len()
            );
        }
        Command::Train => {
            let outcome = app.trainer().train_and_version(TrainingTrigger::Manual)?;
            match outcome.score.accuracy() {
                Some(accuracy) => println!(
                    "Model {} trained on {} samples (accuracy {:.3}).",
                    outcome.version, outcome.num_samples, accuracy
                ),
                None => println!(
                    "Model {} recorded with insufficient data for evaluation ({} samples).",
                    outcome.version, outcome.num_samples
                ),
            }
        }
        Command::Discover { threshold, limit } => {
            let threshold = threshold.unwrap_or(app.config.classifier.confidence_threshold);
            let candidates = app.store.low_confidence_messages(threshold, limit)?;
            if candidates.is_empty() {
                println!("No messages below confidence {threshold}.");
                return Ok(());
            }
            println!("Clustering {} low-confidence message(s)...", candidates.len());
            let ids: Vec<i64> = candidates.iter().map(|c| c.message.id).collect();
            let report = app.discovery().discover(&ids)?;
            println!(
                "{} cluster(s), {} proposal(s) recorded.",
                report.clusters,
                report.proposals.len()
            );
            if !report.proposals.is_empty() {
                println!("Run 'sift review' to review them.");
            }
        }
        Command::Review => review_proposals(&app)?,
        Command::Bootstrap { clear_existing } => {
            let oracle = AnthropicClient::from_config(&app.config.oracle)
                .context("bootstrap labeling needs ANTHROPIC_API_KEY")?;
            let labeler = BootstrapLabeler::new(
                app.store.clone(),
                Arc::new(oracle),
                app.taxonomy.clone(),
                app.config.oracle.bootstrap_batch_size,
            );
            let report = labeler.run(clear_existing)?;
            println!(
                "Labeled {} message(s), skipped {}.",
                report.labeled, report.skipped
            );
        }
        Command::Digest => print_digest(&app)?,
        Command::Status => print_status(&app)?,
    }

    Ok(())
}

fn print_summary(summary: &CycleSummary) {
    println!(
        "\n=== Evolution Cycle Summary ({}) ===",
        summary.timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    println!("  New messages ingested: {}", summary.ingested);
    println!("  Messages classified:   {}", summary.classified);
    println!("  Uncertain predictions: {}", summary.uncertain);
    println!("  Category proposals:    {}", summary.proposals);
    println!(
        "  Retrained:             {}",
        if summary.retrained { "Yes" } else { "No" }
    );
    if let Some(accuracy) = summary.accuracy {
        println!("  New accuracy:          {accuracy:.3}");
    }
    if let (Some(previous), Some(delta)) = (summary.previous_accuracy, summary.accuracy_delta()) {
        println!("  Previous accuracy:     {previous:.3} ({delta:+.3})");
    }
    if summary.accuracy_warning {
        println!("  WARNING: accuracy dropped past the regression threshold.");
    }
    for note in &summary.notes {
        println!("  note: {note}");
    }
}

fn review_proposals(app: &App) -> anyhow::Result<()> {
    let pending = app.store.pending_proposals()?;
    if pending.is_empty() {
        println!("No pending category proposals.");
        return Ok(());
    }

    println!("\n=== Pending Category Proposals ({}) ===\n", pending.len());
    let stdin = std::io::stdin();

    for proposal in &pending {
        println!("ID: {}", proposal.id);
        println!("  Proposed name: {}", proposal.proposed_name);
        println!("  Cluster size:  {} messages", proposal.cluster_size);
        if !proposal.description.is_empty() {
            println!("  Description:   {}", proposal.description);
        }
        println!("  Reasoning:     {}", proposal.reasoning);

        let samples = app.store.messages_by_ids(&proposal.sample_message_ids)?;
        if !samples.is_empty() {
            println!("  Sample messages:");
            for sample in &samples {
                println!(
                    "    - [{}] {}",
                    sample.message.from_addr, sample.message.subject
                );
            }
        }

        loop {
            print!("  Accept (a), Reject (r), Skip (s): ");
            std::io::stdout().flush()?;
            let mut line = String::new();
            stdin.read_line(&mut line)?;
            match line.trim().to_lowercase().as_str() {
                "a" => {
                    app.store
                        .update_proposal_status(proposal.id, ProposalStatus::Accepted)?;
                    println!(
                        "  Accepted. Add '{}' to the taxonomy and retrain.",
                        proposal.proposed_name
                    );
                    break;
                }
                "r" => {
                    app.store
                        .update_proposal_status(proposal.id, ProposalStatus::Rejected)?;
                    println!("  Rejected.");
                    break;
                }
                "s" => {
                    println!("  Skipped.");
                    break;
                }
                _ => println!("  Invalid input. Try a/r/s."),
            }
        }
        println!();
    }

    let remaining = app.store.pending_proposals()?;
    println!("Review complete. Remaining pending: {}", remaining.len());
    Ok(())
}

fn print_digest(app: &App) -> anyhow::Result<()> {
    let summary = app.store.label_summary()?;
    let unlabeled = app.store.unlabeled_count()?;
    if summary.is_empty() && unlabeled == 0 {
        println!("No messages in the database.");
        return Ok(());
    }

    let count_of = |name: &str| {
        summary
            .iter()
            .find(|(category, _)| category == name)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    };
    let max_count = summary.iter().map(|(_, c)| *c).max().unwrap_or(0);

    println!("=== Message Classification Summary ===\n");
    for (group, title) in [
        (CategoryGroup::Action, "ACTION (needs response)"),
        (CategoryGroup::Informational, "INFORMATIONAL (read later)"),
        (CategoryGroup::Noise, "NOISE (batch/archive)"),
    ] {
        let members: Vec<&String> = app
            .taxonomy
            .priority_order()
            .iter()
            .filter(|name| app.taxonomy.group_of(name) == Some(group))
            .collect();
        let group_total: usize = members.iter().map(|name| count_of(name)).sum();
        if group_total == 0 {
            continue;
        }
        println!("  --- {title} ({group_total}) ---");
        for name in members {
            let count = count_of(name);
            if count == 0 {
                continue;
            }
            let bar_len = if max_count > 0 { count * 30 / max_count } else { 0 };
            println!("  {:<24} {} {}", name, "█".repeat(bar_len), count);
        }
        println!();
    }

    // Categories outside the taxonomy (from an older taxonomy version).
    for (category, count) in &summary {
        if !app.taxonomy.contains(category) {
            println!("  {category:<24} (not in taxonomy) {count}");
        }
    }

    let total: usize = summary.iter().map(|(_, c)| *c).sum();
    println!("  Labeled: {total}, unlabeled: {unlabeled}");
    Ok(())
}

fn print_status(app: &App) -> anyhow::Result<()> {
    println!("Messages:  {}", app.store.message_count()?);
    println!("Labeled:   {}", app.store.labeled_count()?);
    println!("Unlabeled: {}", app.store.unlabeled_count()?);

    let history = app.store.model_version_history(5)?;
    if history.is_empty() {
        println!("Models:    none trained yet");
    } else {
        println!("Models ({} total):", app.store.model_version_count()?);
        for version in &history {
            match version.score.accuracy() {
                Some(accuracy) => println!(
                    "  {} [{}] {} samples, accuracy {:.3}",
                    version.version,
                    version.trigger.as_str(),
                    version.num_samples,
                    accuracy
                ),
                None => println!(
                    "  {} [{}] {} samples, insufficient data for evaluation",
                    version.version,
                    version.trigger.as_str(),
                    version.num_samples
                ),
            }
        }
    }

    let pending = app.store.pending_proposals()?;
    println!("Pending category proposals: {}", pending.len());
    Ok(())
}
