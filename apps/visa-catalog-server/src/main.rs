use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use api_ingress::ApiIngressConfig;
use axum::Router;
use catalog_db::ConnectOpts;
use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;
use products::{Products, ProductsConfig};
use runtime::{AppConfig, CliArgs, DatabaseConfig};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

mod shutdown;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const API_INGRESS_MODULE: &str = "api_ingress";
const PRODUCTS_MODULE: &str = "products";
const DEFAULT_DATABASE_URL: &str = "sqlite://database/catalog.db";

/// Visa Catalog Server - REST backend for the visa product catalog
#[derive(Parser)]
#[command(name = "visa-catalog-server")]
#[command(about = "Visa Catalog Server - REST backend for the visa product catalog")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port for HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print current configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use a throwaway in-memory database
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Check configuration
    Check,
}

/// Module settings resolved from the `modules` bag.
struct ModuleConfigs {
    api_ingress: ApiIngressConfig,
    products: ProductsConfig,
}

impl ModuleConfigs {
    fn from_app(config: &AppConfig) -> Result<Self> {
        Ok(Self {
            api_ingress: config.module_config(API_INGRESS_MODULE)?,
            products: config.module_config(PRODUCTS_MODULE)?,
        })
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        port: cli.port,
        print_config: cli.print_config,
        verbose: cli.verbose,
        mock: cli.mock,
    };

    // home_dir is normalized and created while loading
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    let logging_config = config.logging.clone().unwrap_or_default();
    runtime::logging::init_logging_from_config(&logging_config, &config.home_dir());
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Visa Catalog Server starting");

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config).await,
        Commands::Check => check_config(&config),
    }
}

fn database_config(config: &AppConfig) -> DatabaseConfig {
    config.database.clone().unwrap_or_else(|| DatabaseConfig {
        url: DEFAULT_DATABASE_URL.to_string(),
        max_conns: None,
        busy_timeout_ms: None,
    })
}

/// Final DSN with relative SQLite paths anchored at the home directory.
fn resolve_dsn(config: &AppConfig) -> Result<String> {
    let db = database_config(config);
    let raw = db.url.trim();
    anyhow::ensure!(!raw.is_empty(), "Database URL not configured");
    catalog_db::detect(raw).context("Unsupported database URL")?;
    Ok(catalog_db::absolutize_sqlite_dsn(raw, &config.home_dir()))
}

fn connect_opts(db: &DatabaseConfig) -> ConnectOpts {
    let defaults = ConnectOpts::default();
    ConnectOpts {
        max_conns: db.max_conns.unwrap_or(defaults.max_conns),
        busy_timeout: db
            .busy_timeout_ms
            .map(|ms| Duration::from_millis(u64::from(ms)))
            .unwrap_or(defaults.busy_timeout),
        ..defaults
    }
}

async fn run_server(config: AppConfig) -> Result<()> {
    let modules = ModuleConfigs::from_app(&config)?;

    let dsn = resolve_dsn(&config)?;
    tracing::info!(dsn = %catalog_db::redact_credentials(&dsn), "Connecting to database");
    let db = catalog_db::connect(&dsn, &connect_opts(&database_config(&config)))
        .await
        .context("Failed to connect to database")?;

    Products::migrate(&db).await.context("Failed to run migrations")?;
    let products = Products::new(db, &modules.products);

    let prefix = modules.api_ingress.normalized_prefix();
    let routes = products.register_rest(Router::new(), &prefix);
    let timeout = (config.server.timeout_sec > 0)
        .then(|| Duration::from_secs(config.server.timeout_sec));
    let router = api_ingress::build_router(routes, &modules.api_ingress, timeout);

    let bind = (config.server.host.as_str(), config.server.port);
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {}:{}", bind.0, bind.1))?;

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = shutdown::wait_for_shutdown().await {
            tracing::error!(error = %e, "Signal handling failed; shutting down");
        }
        trigger.cancel();
    });

    api_ingress::serve(listener, router, cancel).await
}

fn check_config(config: &AppConfig) -> Result<()> {
    tracing::info!("Checking configuration...");

    ModuleConfigs::from_app(config)?;
    let dsn = resolve_dsn(config)?;

    tracing::info!("Configuration is valid");
    println!("Configuration check passed");
    println!("Database: {}", catalog_db::redact_credentials(&dsn));
    println!("{}", config.to_yaml()?);
    Ok(())
}
