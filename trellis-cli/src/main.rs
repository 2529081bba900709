mod bundle;
mod check;
mod render;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "trellis")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. warn, debug, trellis_render=trace)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a template bundle and print the resulting document
    Render {
        /// Path to the JSON bundle
        file: PathBuf,
        /// Selector of the element the root host view is built over
        #[arg(short, long, default_value = "app-root")]
        selector: String,
        /// Renderer configuration file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Build the view without attaching global listeners
        #[arg(long)]
        no_hydrate: bool,
    },
    /// Validate a template bundle without rendering it
    Check {
        /// Path to the JSON bundle
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level);

    match cli.command {
        Commands::Render {
            file,
            selector,
            config,
            no_hydrate,
        } => render::run_render(render::RenderOptions {
            file,
            selector,
            config,
            hydrate: !no_hydrate,
        }),
        Commands::Check { file, format } => {
            let format = match format {
                Format::Json => check::OutputFormat::Json,
                Format::Pretty => check::OutputFormat::Pretty,
            };
            check::run_check(check::CheckOptions { file, format })
        }
    }
}

fn init_tracing(log_level: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}
