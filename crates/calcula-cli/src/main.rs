use anyhow::Result;
use calcula_infrastructure::CalculaPaths;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;

use commands::Client;

#[derive(Parser)]
#[command(name = "calcula")]
#[command(about = "Calcula - shared price-tracking sessions", long_about = None)]
struct Cli {
    /// API base URL (overrides config.toml and CALCULA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Directory holding config.toml, session.toml and logs/
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the current session id
    Id,
    /// Start a new session, forgetting the current one
    New,
    /// Join a session shared by someone else
    Join {
        /// Session id (from the QR code)
        id: String,
    },
    /// Show the session's prices and total
    Show,
    /// Keep showing the session as it changes
    Watch {
        /// Poll interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },
    /// Add a price by hand
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "1")]
        quantity: String,
        /// Unit value, e.g. "10,50" or "1.234,56"
        #[arg(long)]
        value: String,
    },
    /// Edit a price; omitted fields keep their current value
    Edit {
        price_id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        quantity: Option<String>,
        #[arg(long)]
        value: Option<String>,
    },
    /// Delete a price
    Delete { price_id: String },
    /// Upload a photo of a price label
    Upload {
        /// Image to send; without one nothing is uploaded
        file: Option<PathBuf>,
        /// Units on the label (1-99)
        #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=99))]
        quantity: u32,
    },
    /// Fetch the photo of a price
    Photo {
        price_id: String,
        /// Write the image here instead of printing its data URI
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let paths = CalculaPaths::new(cli.config_dir.clone());
    let _log_guard = logging::init(&paths);

    let api_url = cli.api_url.as_deref();
    match cli.command {
        Commands::Id => commands::session::id(&paths).await?,
        Commands::New => commands::session::new(&Client::connect(&paths, api_url, None)?).await?,
        Commands::Join { id } => {
            commands::session::join(&Client::connect(&paths, api_url, None)?, &id).await?
        }
        Commands::Show => commands::session::show(&Client::connect(&paths, api_url, None)?).await?,
        Commands::Watch { interval_ms } => {
            commands::session::watch(&Client::connect(&paths, api_url, interval_ms)?).await?
        }
        Commands::Add {
            name,
            quantity,
            value,
        } => {
            let client = Client::connect(&paths, api_url, None)?;
            commands::price::add(&client, name, quantity, value).await?
        }
        Commands::Edit {
            price_id,
            name,
            quantity,
            value,
        } => {
            let client = Client::connect(&paths, api_url, None)?;
            commands::price::edit(&client, &price_id, name, quantity, value).await?
        }
        Commands::Delete { price_id } => {
            commands::price::delete(&Client::connect(&paths, api_url, None)?, &price_id).await?
        }
        Commands::Upload { file, quantity } => {
            let client = Client::connect(&paths, api_url, None)?;
            commands::price::upload(&client, file.as_deref(), quantity).await?
        }
        Commands::Photo { price_id, out } => {
            let client = Client::connect(&paths, api_url, None)?;
            commands::photo::show(&client, &price_id, out.as_deref()).await?
        }
    }

    Ok(())
}
