mod config;
mod pipeline;
mod server;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use wb_core::{TaskInput, TaskType, analyze_patterns};
use wb_store::{DB_FILE_NAME, Store};

use crate::config::Config;

#[derive(Parser)]
#[command(name = "wb", about = "NLP workbench: mock analyses and attention visualization")]
struct Cli {
    /// Config file (defaults to <data_dir>/wb.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose debug output
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API
    Serve {
        /// Listen address (overrides config)
        #[arg(long)]
        addr: Option<String>,
    },

    /// Analyze text and store the result
    Analyze {
        /// sentiment, classification, ner, summarization, qa or attention
        #[arg(long, default_value = "sentiment")]
        task: String,

        /// Model name to record
        #[arg(long)]
        model: Option<String>,

        /// Context passage for qa
        #[arg(long)]
        context: Option<String>,

        /// Classification label (repeatable)
        #[arg(long = "label")]
        labels: Vec<String>,

        /// Text to analyze (the question for qa)
        text: String,
    },

    /// Show the stored heatmap and attention patterns of a task
    Show {
        task_id: i64,
    },

    /// List recent tasks
    Recent {
        /// Number of tasks (overrides config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show per-model processing metrics
    Metrics,
}

struct Env {
    store: Store,
    config: Config,
}

fn open_env(cli: &Cli) -> Result<Env> {
    let data_dir = config::data_dir();
    let config = config::load(cli.config.as_deref(), &data_dir)?;
    let store = open_store(&data_dir)?;
    Ok(Env { store, config })
}

fn open_store(data_dir: &Path) -> Result<Store> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("failed to create {}", data_dir.display()))?;
    Store::open(&data_dir.join(DB_FILE_NAME)).context("failed to open store")
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match &cli.command {
        Commands::Serve { addr } => cmd_serve(&cli, addr.as_deref()).await,
        Commands::Analyze {
            task,
            model,
            context,
            labels,
            text,
        } => cmd_analyze(&cli, task, model.as_deref(), context.as_deref(), labels, text),
        Commands::Show { task_id } => cmd_show(&cli, *task_id),
        Commands::Recent { limit } => cmd_recent(&cli, *limit),
        Commands::Metrics => cmd_metrics(&cli),
    }
}

async fn cmd_serve(cli: &Cli, addr: Option<&str>) -> Result<()> {
    let Env { store, config } = open_env(cli)?;
    let addr = addr.unwrap_or(&config.server.addr).to_string();
    tracing::info!("starting HTTP API on {addr}");
    let state = server::AppState::new(store, config);
    server::run(state, &addr).await
}

fn cmd_analyze(
    cli: &Cli,
    task: &str,
    model: Option<&str>,
    context: Option<&str>,
    labels: &[String],
    text: &str,
) -> Result<()> {
    let env = open_env(cli)?;
    let text = text.trim();
    if text.is_empty() {
        bail!("no text provided");
    }
    let task: TaskType = task.parse()?;

    let input = TaskInput {
        text: text.to_string(),
        model_name: Some(
            model
                .unwrap_or(&env.config.analysis.default_model)
                .to_string(),
        ),
        context: context.unwrap_or_default().to_string(),
        labels: (!labels.is_empty()).then(|| labels.to_vec()),
    };

    let processor = env.config.analysis.processor();
    let mut rng = SmallRng::from_os_rng();
    let analysis = pipeline::analyze(&processor, task, &input, &mut rng)
        .context("analysis failed")?;
    let task_id = pipeline::persist(&env.store, &input.text, &analysis)
        .context("failed to store task")?;

    let out = serde_json::json!({
        "task_id": task_id,
        "results": analysis.results,
        "processing_time": analysis.processing_time,
        "attention_data": analysis.heatmap,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_show(cli: &Cli, task_id: i64) -> Result<()> {
    let env = open_env(cli)?;
    let Some(task) = env.store.get_task(task_id).context("failed to load task")? else {
        bail!("task {task_id} not found");
    };
    let Some(heatmap) = task.heatmap().context("corrupt attention data")? else {
        bail!("no attention data for task {task_id}");
    };
    let patterns = analyze_patterns(&heatmap.attention_matrix, &heatmap.tokens)
        .context("pattern analysis failed")?;

    let out = serde_json::json!({
        "task_id": task.id,
        "task_type": task.task_type,
        "heatmap": heatmap,
        "patterns": patterns,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

fn cmd_recent(cli: &Cli, limit: Option<usize>) -> Result<()> {
    let env = open_env(cli)?;
    let limit = limit.unwrap_or(env.config.server.recent_limit);
    let tasks = env
        .store
        .recent_tasks(limit)
        .context("failed to list tasks")?;

    if tasks.is_empty() {
        println!("(no tasks yet)");
        return Ok(());
    }
    for t in &tasks {
        let preview: String = t.input_text.chars().take(60).collect();
        let marker = if t.attention_data.is_some() { "*" } else { " " };
        println!(
            "#{:<5} {} {:<14} {marker} {:<24} {preview}",
            t.id,
            t.created_at,
            t.task_type.as_str(),
            t.model_name,
        );
    }
    Ok(())
}

fn cmd_metrics(cli: &Cli) -> Result<()> {
    let env = open_env(cli)?;
    let metrics = env.store.list_metrics().context("failed to list metrics")?;

    if metrics.is_empty() {
        println!("(no metrics yet)");
        return Ok(());
    }
    for m in &metrics {
        println!(
            "{:<48} {:<14} requests={:<6} avg={:.4}s",
            m.model_name, m.task_type, m.total_requests, m.avg_processing_time,
        );
    }
    Ok(())
}
