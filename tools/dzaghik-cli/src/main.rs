//! Dzaghik CLI - the flower shop from the terminal.
//!
//! Commands:
//! - `dzaghik catalog` - Browse flowers
//! - `dzaghik cart` - Manage the cart
//! - `dzaghik currency` / `dzaghik language` - Display preferences
//! - `dzaghik checkout` - Place an order, cash or card
//! - `dzaghik account` - Local customer login
//! - `dzaghik admin` - Admin console

mod commands;
mod context;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{
    AccountArgs, AdminArgs, CartArgs, CatalogArgs, CheckoutArgs, CurrencyArgs, LanguageArgs,
};

/// Dzaghik - browse, order and manage flowers
#[derive(Parser)]
#[command(name = "dzaghik")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the flower catalog
    Catalog(CatalogArgs),

    /// View and change the cart
    Cart(CartArgs),

    /// Show or change the display currency
    Currency(CurrencyArgs),

    /// Show or change the interface language
    Language(LanguageArgs),

    /// Place an order for the cart or a single flower
    Checkout(CheckoutArgs),

    /// Customer login on this device
    Account(AccountArgs),

    /// Manage flowers, orders and the home page
    Admin(AdminArgs),
}

fn init_tracing(verbose: bool, json: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.with_target(false).init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.json);

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    let config_path = cli.config.as_deref();
    let mut ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Catalog(args) => commands::catalog::run(args, &mut ctx).await,
        Commands::Cart(args) => commands::cart::run(args, &mut ctx).await,
        Commands::Currency(args) => commands::preferences::run_currency(args, &mut ctx),
        Commands::Language(args) => commands::preferences::run_language(args, &mut ctx),
        Commands::Checkout(args) => commands::checkout::run(args, &mut ctx).await,
        Commands::Account(args) => commands::account::run(args, &mut ctx),
        Commands::Admin(args) => commands::admin::run(args, &mut ctx).await,
    };

    if let Err(e) = result {
        ctx.output.error(&context::describe(&e));
        std::process::exit(1);
    }

    Ok(())
}
