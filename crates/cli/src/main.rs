mod commands;

use clap::{CommandFactory, Parser};
use clap_complete::{Shell, generate};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "site-wizard")]
#[command(version, about = "Describe a website, review the generated outline, save it", long_about = None)]
struct Cli {
    /// Config file (default: ~/.site-wizard/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Parser)]
enum Command {
    /// Start the interactive wizard: describe, review, edit, save
    New {
        /// Skip the first prompt and generate from this description
        #[arg(short, long)]
        description: Option<String>,
    },

    /// Reopen a saved project in the wizard
    Edit {
        /// Project id
        id: String,
    },

    /// Generate an outline and print it as JSON without saving
    Generate {
        /// Free-text description of the site
        description: String,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// List saved projects, most recently updated first
    List,

    /// Show a saved project with its pages and sections
    Show {
        /// Project id
        id: String,
    },

    /// Delete a saved project
    Delete {
        /// Project id
        id: String,
    },

    /// Talk to the site-building assistant
    Chat,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("site_wizard=info")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    if let Command::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        generate(shell, &mut cmd, "site-wizard", &mut io::stdout());
        return Ok(());
    }

    let config = commands::load_app_config(cli.config.as_deref())?;

    match cli.command {
        Command::New { description } => commands::wizard::run(&config, description).await,
        Command::Edit { id } => commands::wizard::resume(&config, &id).await,
        Command::Generate {
            description,
            pretty,
        } => commands::generate::run(&config, &description, pretty).await,
        Command::List => commands::projects::list(&config).await,
        Command::Show { id } => commands::projects::show(&config, &id).await,
        Command::Delete { id } => commands::projects::delete(&config, &id).await,
        Command::Chat => commands::chat::run(&config).await,
        Command::Completions { .. } => Ok(()),
    }
}
