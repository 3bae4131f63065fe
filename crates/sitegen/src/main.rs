//! sitegen CLI - AI-assisted single page site builder.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "sitegen")]
#[command(about = "Build a web page section by section with a generation service")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to sitegen.toml config file
    #[arg(short, long, default_value = "sitegen.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create sitegen.toml and an empty form file
    Init {
        /// Overwrite existing files
        #[arg(short, long)]
        yes: bool,
    },

    /// Start the editor with live preview
    Edit {
        /// Port to listen on (defaults to config or 7878)
        #[arg(short, long)]
        port: Option<u16>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,

        /// Form values file (JSON or TOML)
        #[arg(short, long, default_value = "form.json")]
        form: PathBuf,

        /// Use built-in markup instead of the generation service
        #[arg(long)]
        offline: bool,
    },

    /// Generate a page without the editor and save it
    Generate {
        /// Sections to add, in order (e.g. navigation,welcome,footer)
        #[arg(short, long, value_delimiter = ',', required = true)]
        sections: Vec<String>,

        /// Also generate head tag information
        #[arg(long)]
        head: bool,

        /// Output directory (defaults to config or "out")
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Form values file (JSON or TOML)
        #[arg(short, long, default_value = "form.json")]
        form: PathBuf,

        /// Use built-in markup instead of the generation service
        #[arg(long)]
        offline: bool,
    },

    /// View a saved page in the browser
    Serve {
        /// Saved page, or the directory it was saved into
        #[arg(default_value = "out")]
        path: PathBuf,

        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Don't open browser automatically
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(yes).await?;
        }
        Commands::Edit {
            port,
            no_open,
            form,
            offline,
        } => {
            let config = config::load(&cli.config)?;
            commands::edit::run(&config, port, !no_open, form, offline).await?;
        }
        Commands::Generate {
            sections,
            head,
            out,
            form,
            offline,
        } => {
            let config = config::load(&cli.config)?;
            commands::generate::run(&config, &sections, head, out, form, offline).await?;
        }
        Commands::Serve {
            path,
            port,
            no_open,
        } => {
            commands::serve::run(port, path, !no_open).await?;
        }
    }

    Ok(())
}
