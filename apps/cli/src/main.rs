mod config;
mod main_lib;
mod render;
mod shell;

use config::Config;
use main_lib::{build_dashboard, init_tracing};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing();
    let dashboard = build_dashboard(&config)?;

    let watchers = render::spawn_watchers(&dashboard);
    println!("{}", shell::HELP);
    tracing::info!("Tracking {} symbols", dashboard.symbols().len());

    let result = shell::run(&dashboard).await;

    for watcher in watchers {
        watcher.abort();
    }
    tracing::info!("Shutting down");
    result
}
