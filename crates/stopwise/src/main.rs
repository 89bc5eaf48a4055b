use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use stopwise::commands::{self, PlanOptions};
use stopwise::TableFormat;

#[derive(Parser)]
#[command(name = "stopwise")]
#[command(about = "Stopwise - plan a round trip through a table of locations")]
#[command(version)]
struct Cli {
  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Resolve, color and order the locations of a table
  Plan {
    /// CSV or JSON table with latitude/longitude or address columns
    table: PathBuf,
    /// Table format (defaults to the file extension)
    #[arg(short, long)]
    format: Option<TableFormat>,
    /// Config file (defaults to .stopwise.json in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Maps platform API key
    #[arg(long, env = "STOPWISE_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Skip route optimization and only place markers
    #[arg(long)]
    no_route: bool,
    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
  },
  /// Show the effective category colors
  Colors {
    /// Config file (defaults to .stopwise.json in the working directory)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

async fn handle(command: Command, verbose: bool) -> Result<()> {
  match command {
    Command::Plan { table, format, config, api_key, no_route, output, pretty } => {
      let options =
        PlanOptions { table, format, config, api_key, no_route, output, pretty, verbose };
      commands::plan(&options).await
    }
    Command::Colors { config } => commands::colors(config.as_deref()),
  }
}

#[tokio::main]
async fn main() {
  let cli = Cli::parse();

  herald::init();
  herald::init_tracing("stopwise", cli.verbose);

  if let Err(error) = handle(cli.command, cli.verbose).await {
    herald::showstopper(&format!("{error:#}"));
    std::process::exit(1);
  }
}
