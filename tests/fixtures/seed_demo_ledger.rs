// 演示台账初始化: 写入演示项目 → 计算驾驶舱 → 输出 JSON
//
// Usage:
//   cargo run --bin seed_demo_ledger -- [db_path] [today(YYYY-MM-DD)]

#[path = "demo_project.rs"]
mod demo_project;

use anyhow::Context;
use chrono::NaiveDate;
use project_evm::api::EvmApi;
use project_evm::config::ConfigManager;
use project_evm::db::open_sqlite_connection;
use project_evm::logging;
use project_evm::repository::SqliteLedgerRepository;
use std::sync::{Arc, Mutex};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();

    let mut args = std::env::args().skip(1);
    let db_path = args.next().unwrap_or_else(|| "demo_ledger.db".to_string());
    let today = match args.next() {
        Some(raw) => NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
            .with_context(|| format!("评估日格式错误: {}", raw))?,
        None => demo_project::demo_today(),
    };

    let conn = Arc::new(Mutex::new(open_sqlite_connection(&db_path)?));
    let repo = SqliteLedgerRepository::from_connection(conn.clone())?;
    let config_manager = ConfigManager::from_connection(conn).map_err(|e| anyhow::anyhow!(e))?;

    if repo.find_project(demo_project::DEMO_PROJECT_ID)?.is_some() {
        tracing::info!(db_path = %db_path, "演示项目已存在，跳过写入");
    } else {
        repo.insert_snapshot(&demo_project::demo_snapshot())?;
    }

    let api = EvmApi::from_config_reader(Arc::new(repo), &config_manager).await?;
    let dashboard = api
        .project_dashboard(demo_project::DEMO_PROJECT_ID, today)
        .await?;

    println!("{}", serde_json::to_string_pretty(&dashboard)?);
    Ok(())
}
