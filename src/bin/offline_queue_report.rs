use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use offline_sync::infrastructure::database::ConnectionPool;
use offline_sync::infrastructure::offline::{SqliteOfflineStore, TracingEventSink};
use offline_sync::{
    AppConfig, PendingOperation, QueueService, QueueServiceTrait, QueueStats, init_logging,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "offline_queue_report")]
#[command(about = "Dump the offline operation queue as JSON", long_about = None)]
struct Cli {
    /// SQLite database url (defaults to the configured database)
    #[arg(long, env = "OFFLINE_SYNC_DATABASE_URL")]
    database_url: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,

    /// Only report failed operations
    #[arg(long)]
    failed_only: bool,

    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, serde::Serialize)]
struct QueueReport {
    generated_at_ms: i64,
    stats: QueueStats,
    failed: Vec<PendingOperation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    next_batch: Option<Vec<PendingOperation>>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::from_env();
    init_logging(&config.logging);

    let database_url = cli
        .database_url
        .clone()
        .filter(|url| !url.trim().is_empty())
        .unwrap_or(config.database.url);

    let report = collect_report(&database_url, cli.failed_only)
        .await
        .with_context(|| format!("Failed to read offline queue from {database_url}"))?;

    let payload = to_json(&report, cli.pretty)?;
    emit_payload(cli.output.as_deref(), &payload)
}

async fn collect_report(database_url: &str, failed_only: bool) -> Result<QueueReport> {
    // 読み取り専用: ファイル作成も復旧処理 (processing -> pending) も行わない
    let pool = ConnectionPool::open_existing(database_url).await?;
    let store = Arc::new(SqliteOfflineStore::new(pool.get_pool().clone()));
    let queue = QueueService::new(store, Arc::new(TracingEventSink));

    let stats = queue.stats().await?;
    let failed = queue.list_failed().await?;
    let next_batch = if failed_only {
        None
    } else {
        Some(queue.next_batch().await?)
    };
    pool.close().await;

    Ok(QueueReport {
        generated_at_ms: Utc::now().timestamp_millis(),
        stats,
        failed,
        next_batch,
    })
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(serde_json::to_string(value)?)
    }
}

fn write_output(path: &Path, data: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))
}

fn emit_payload(target: Option<&Path>, payload: &str) -> Result<()> {
    if let Some(path) = target {
        write_output(path, payload)?;
        println!("Report written to {}", path.display());
    } else {
        println!("{payload}");
    }
    Ok(())
}
