pub mod cli;
pub mod config;
pub mod core;
pub mod providers;
pub mod resolver;
pub mod scheduler;
pub mod store;
pub mod synthetic;
pub mod validator;

use crate::cli::ui;
use crate::config::AppConfig;
use crate::core::asset::AssetKind;
use crate::core::quote::{QuoteProvider, SymbolSearchProvider};
use crate::core::reference::ReferenceTable;
use crate::providers::{
    CoinGeckoProvider, RapidApiQuoteProvider, RapidApiSearchProvider, YahooChartProvider,
    YahooSummaryProvider,
};
use crate::resolver::PriceResolver;
use crate::scheduler::PriceScheduler;
use crate::store::PriceStore;
use crate::synthetic::SyntheticQuote;
use crate::validator::SymbolValidator;
use anyhow::{Context, Result, bail};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// The RapidAPI and CoinGecko endpoints answer fast or not at all; a long
/// timeout there only stalls the fallback.
const SECONDARY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub enum AppCommand {
    Add { symbol: String, crypto: bool },
    Remove { symbol: String },
    List,
    History { symbol: String, limit: usize },
    Search { query: String },
    Refresh,
    Watch,
    Seed,
}

struct App {
    store: Arc<PriceStore>,
    resolver: Arc<PriceResolver>,
    validator: SymbolValidator,
    reference: ReferenceTable,
    poll_interval: Duration,
}

impl App {
    fn build(config: &AppConfig) -> Result<Self> {
        let data_path = config.data_path()?;
        let store = Arc::new(PriceStore::open(&data_path)?);
        let reference = config.reference_table();
        let timeout = config.request_timeout();

        let (primary_base, secondary_base) = config.providers.yahoo.as_ref().map_or(
            (
                "https://query1.finance.yahoo.com".to_string(),
                "https://query2.finance.yahoo.com".to_string(),
            ),
            |y| (y.primary_base_url.clone(), y.secondary_base_url.clone()),
        );

        let mut stock_chain: Vec<Arc<dyn QuoteProvider>> = vec![
            Arc::new(YahooChartProvider::new(&primary_base, timeout)),
            Arc::new(YahooChartProvider::new(&secondary_base, timeout)),
            Arc::new(YahooSummaryProvider::new(&primary_base, timeout)),
        ];

        let mut search_provider: Option<Arc<dyn SymbolSearchProvider>> = None;
        match config.rapidapi_credentials() {
            Some((rapidapi, credentials)) => {
                stock_chain.push(Arc::new(RapidApiQuoteProvider::new(
                    &rapidapi.base_url,
                    credentials.clone(),
                    SECONDARY_TIMEOUT,
                )));
                search_provider = Some(Arc::new(RapidApiSearchProvider::new(
                    &rapidapi.base_url,
                    credentials,
                    SECONDARY_TIMEOUT,
                )));
            }
            None => {
                debug!("No RapidAPI key configured, running without the secondary provider");
            }
        }

        let coingecko_base = config
            .providers
            .coingecko
            .as_ref()
            .map_or("https://api.coingecko.com", |c| &c.base_url);
        let crypto_provider: Arc<dyn QuoteProvider> =
            Arc::new(CoinGeckoProvider::new(coingecko_base, SECONDARY_TIMEOUT));

        let synthetic = SyntheticQuote::new(reference.clone(), Arc::clone(&store));
        let resolver = Arc::new(PriceResolver::new(
            stock_chain,
            crypto_provider,
            synthetic,
            Arc::clone(&store),
        ));
        let validator =
            SymbolValidator::new(reference.clone(), Arc::clone(&store), search_provider);

        Ok(App {
            store,
            resolver,
            validator,
            reference,
            poll_interval: config.poll_interval(),
        })
    }
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let app = App::build(&config)?;

    match command {
        AppCommand::Add { symbol, crypto } => add_asset(&app, &symbol, crypto).await,
        AppCommand::Remove { symbol } => remove_asset(&app, &symbol),
        AppCommand::List => cli::list::run(&app.store),
        AppCommand::History { symbol, limit } => cli::history::run(&app.store, &symbol, limit),
        AppCommand::Search { query } => cli::search::run(&app.validator, &query).await,
        AppCommand::Refresh => cli::refresh::run(&app.resolver, &app.store).await,
        AppCommand::Watch => watch(&app).await,
        AppCommand::Seed => seed(&app),
    }
}

async fn add_asset(app: &App, symbol: &str, crypto: bool) -> Result<()> {
    let kind = if crypto {
        AssetKind::Crypto
    } else {
        AssetKind::Stock
    };
    let normalized = kind.normalize_symbol(symbol);
    let mut name = normalized.clone();

    if kind == AssetKind::Stock {
        let validation = app.validator.validate(&normalized).await;
        if !validation.valid {
            bail!(
                "Stock symbol '{}' not found. Check the symbol and try again.",
                normalized
            );
        }
        if let Some(display_name) = validation.display_name {
            name = display_name;
        }
    }

    let asset = app.store.get_or_create_asset(&normalized, kind, &name)?;

    // First price fetch happens inline so the asset shows up with data.
    match app.resolver.resolve_price(&asset).await {
        Ok(price) => {
            println!(
                "Tracking {} ({}) at {}",
                ui::style_text(&asset.symbol, ui::StyleType::Title),
                asset.name,
                ui::style_text(&format!("{price:.2}"), ui::StyleType::Success)
            );
        }
        Err(e) => {
            warn!(symbol = %asset.symbol, error = %e, "No initial price available");
            println!(
                "Tracking {} ({}), no price available yet",
                ui::style_text(&asset.symbol, ui::StyleType::Title),
                asset.name
            );
        }
    }
    Ok(())
}

fn remove_asset(app: &App, symbol: &str) -> Result<()> {
    let removed = app.store.remove_asset(&symbol.to_uppercase())?
        || app.store.remove_asset(&symbol.to_lowercase())?;
    if !removed {
        bail!("Asset '{}' is not tracked", symbol);
    }
    println!("Removed {symbol} from tracking");
    Ok(())
}

async fn watch(app: &App) -> Result<()> {
    let scheduler = PriceScheduler::new(
        Arc::clone(&app.resolver),
        Arc::clone(&app.store),
        app.poll_interval,
    );
    scheduler.start();
    println!(
        "Updating prices every {}s, press Ctrl-C to stop",
        app.poll_interval.as_secs()
    );

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl-C")?;
    scheduler.stop();
    info!("Watch ended");
    Ok(())
}

fn seed(app: &App) -> Result<()> {
    let mut created = 0;
    for entry in app.reference.entries() {
        if app.store.get_asset(&entry.symbol)?.is_none() {
            created += 1;
        }
        app.store
            .get_or_create_asset(&entry.symbol, AssetKind::Stock, &entry.name)?;
    }
    println!(
        "Seeded {} new assets ({} known symbols)",
        created,
        app.reference.entries().len()
    );
    Ok(())
}
