use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use lumebar_server::{DemoServer, resolve_bind_address};
use lumebar_tui::source::DataSource;
use lumebar_tui::{RunOptions, run_app};
use lumebar_util::UiStateStore;

/// Collapsible diagnostics bar for the terminal.
#[derive(Parser)]
#[command(name = "lumebar", version, about)]
struct Cli {
    /// URL or file path of the JSON data source.
    #[arg(long)]
    src: Option<String>,

    /// Watch a file data source and reload on change.
    #[arg(long)]
    watch: bool,

    /// Clear persisted UI state before starting.
    #[arg(long)]
    reset_state: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the demo page and data document.
    Serve {
        /// Loopback address to bind.
        #[arg(long, default_value = "127.0.0.1:8000")]
        bind: String,

        /// Directory holding index.html and data.json.
        #[arg(long, default_value = "demo")]
        root: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::Serve { bind, root }) = cli.command {
        init_tracing();
        let address = resolve_bind_address(Some(&bind))?;
        let server = DemoServer::new(address, root).start().await?;
        println!("Serving demo on http://{}", server.bound_address());
        tokio::signal::ctrl_c().await?;
        return server.stop().await;
    }

    // The TUI owns the terminal, so diagnostics go to a file instead of
    // stdout.
    init_file_tracing()?;
    let ui_state = Arc::new(UiStateStore::new()?);
    if cli.reset_state {
        ui_state.clear()?;
    }

    run_app(RunOptions {
        source: cli.src.as_deref().map(DataSource::parse),
        ui_state,
        watch: cli.watch,
        action_tx: None,
    })
    .await
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

fn init_file_tracing() -> Result<()> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());
    let path = std::env::temp_dir().join("lumebar-tui.log");
    let file = std::fs::File::create(path)?;
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
    Ok(())
}
