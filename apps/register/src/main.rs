//! # register
//!
//! Command-line front of the till.
//!
//! ```text
//! register checkout --request cart.json     bill a cart
//! register bill --number 42                 show a committed bill
//! register history --email asha@example.in  a customer's bills
//! register till --set 500=4 --set 100=10    recount the till
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use till_register::commands::{self, BillKey, Output};
use till_register::config::RegisterConfig;
use till_register::{init_tracing, open_database};

#[derive(Debug, Parser)]
#[command(name = "register", version, about = "Rupee point-of-sale till")]
struct Cli {
    /// Config file (default: register.toml in the platform config dir)
    #[arg(long, short, env = "TILL_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Bill a cart described by a JSON request file
    Checkout {
        #[arg(long, short)]
        request: PathBuf,
    },

    /// Show a committed bill with its items and change
    Bill {
        #[arg(long, conflicts_with = "number", required_unless_present = "number")]
        id: Option<String>,

        #[arg(long)]
        number: Option<i64>,
    },

    /// List a customer's bills, newest first
    History {
        #[arg(long)]
        email: String,

        #[arg(long, default_value_t = 20)]
        limit: u32,
    },

    /// Show the till, optionally setting counts first
    Till {
        /// VALUE=COUNT, repeatable
        #[arg(long = "set", value_parser = commands::parse_till_update)]
        set: Vec<(i64, i64)>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = RegisterConfig::load(cli.config.as_deref()).context("loading configuration")?;
    info!(
        db_path = %config.database.path.display(),
        notifications = config.notification.enabled,
        "Configuration loaded"
    );

    let output = if cli.json { Output::Json } else { Output::Text };
    let db = open_database(&config).await?;

    let result = match cli.command {
        Command::Checkout { request } => commands::checkout(&db, &config, &request, output).await,
        Command::Bill { id, number } => {
            let key = match (id, number) {
                (Some(id), _) => BillKey::Id(id),
                (None, Some(number)) => BillKey::Number(number),
                (None, None) => anyhow::bail!("give --id or --number"),
            };
            commands::show_bill(&db, &config.shop, key, output).await
        }
        Command::History { email, limit } => {
            commands::history(&db, &config.shop, &email, limit, output).await
        }
        Command::Till { set } => commands::till(&db, &config.shop, &set, output).await,
    };

    db.close().await;

    let text = result?;
    print!("{}", text);
    if !text.ends_with('\n') {
        println!();
    }
    Ok(())
}
