use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use timesync_report::conf::{C_FILE_OUT_DEFAULT, C_HOST_SERVE_DEFAULT, N_PORT_SERVE_DEFAULT};
use timesync_report::log::init_tracing;
use timesync_report::{SpecReportContext, run_export, serve};

#[derive(Parser)]
#[command(name = "timesync_report", version, about = "Timesync monthly report export")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the workbook once and write it to disk
    Export {
        #[arg(short, long, default_value = C_FILE_OUT_DEFAULT)]
        output: PathBuf,
    },
    /// Serve the export over HTTP
    Serve {
        #[arg(long, default_value = C_HOST_SERVE_DEFAULT)]
        host: String,
        #[arg(short, long, default_value_t = N_PORT_SERVE_DEFAULT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let ctx = SpecReportContext::from_env().context("failed to read database settings")?;

    match cli.command {
        Commands::Export { output } => run_export(&ctx, &output)
            .await
            .with_context(|| format!("failed to export report to {}", output.display()))?,
        Commands::Serve { host, port } => serve(ctx, &host, port)
            .await
            .context("report export service stopped with an error")?,
    }
    Ok(())
}
