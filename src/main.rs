use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod domain;
mod application;
mod infrastructure;

use infrastructure::config::{Config, StorageBackend};
use infrastructure::storage::MemoryStore;
use infrastructure::database::SqliteStore;
use infrastructure::recognizer::{KeywordRecognizer, LuisRecognizer};
use infrastructure::adapters::{http, AppState, ConnectorClient, ConsoleAdapter};
use infrastructure::publish::Publisher;
use application::cards::CardRenderer;
use application::errors::{BotError, ConfigError};
use application::messaging::{ActivityParser, ConsoleInput, LoggingMiddleware, MiddlewareChain, RateLimitMiddleware, TurnDispatcher};
use application::services::{CommandService, TurnService};
use domain::entities::{Activity, CommandReply};
use domain::traits::{Bot, BotInfo, Recognizer, StateStore};

#[derive(Parser)]
#[command(name = "cake-bot")]
#[command(about = "A conversational bot that helps you pick a cake", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "config.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the bot
    Run {
        /// Chat on the terminal instead of serving HTTP
        #[arg(long)]
        console: bool,
    },
    /// Show version
    Version,
    /// Generate default config
    InitConfig,
    /// Archive the project and upload it
    Publish {
        /// Project directory to publish
        #[arg(short, long, default_value = ".")]
        dir: PathBuf,
    },
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { console } => {
            run_bot(&cli.config, console);
        }
        Commands::Version => {
            println!("cake-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
        Commands::Publish { dir } => {
            publish(&cli.config, &dir);
        }
    }
}

fn load_config(config_path: &str) -> Config {
    let mut config = if Path::new(config_path).exists() {
        Config::load(config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };
    config.apply_env();

    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {}", e);
        std::process::exit(1);
    }
    config
}

fn runtime() -> tokio::runtime::Runtime {
    match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to start async runtime: {}", e);
            std::process::exit(1);
        }
    }
}

fn build_recognizer(config: &Config) -> Result<Arc<dyn Recognizer>, BotError> {
    match config.luis.as_ref().filter(|luis| luis.is_configured()) {
        Some(luis) => {
            let recognizer = LuisRecognizer::new(luis)?;
            tracing::info!("Using LUIS app at {}", luis.endpoint());
            Ok(Arc::new(recognizer))
        }
        None => {
            tracing::warn!("LUIS is not configured, falling back to keyword recognition");
            tracing::debug!("Keyword intents: {}", KeywordRecognizer::labels().join(", "));
            Ok(Arc::new(KeywordRecognizer::new()?))
        }
    }
}

fn build_store(config: &Config) -> Result<Arc<dyn StateStore>, BotError> {
    match config.storage.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryStore::new())),
        StorageBackend::Sqlite => {
            let store = SqliteStore::new(&config.storage.path)?;
            tracing::info!("Database initialized at {}", config.storage.path.display());
            Ok(Arc::new(store))
        }
    }
}

fn build_dispatcher(config: &Config) -> Result<TurnDispatcher, BotError> {
    let recognizer = build_recognizer(config)?;
    let store = build_store(config)?;
    let cards = CardRenderer::new(config.cards.directory.clone(), config.cards.image_base_url.clone());
    let min_score = config.luis.as_ref().map(|luis| luis.min_score).unwrap_or(0.0);

    let turns = TurnService::new(recognizer, store, cards).with_min_score(min_score);
    let rate_limit = &config.security.rate_limit;

    let chain = MiddlewareChain::new()
        .add(LoggingMiddleware)
        .add(RateLimitMiddleware::new(rate_limit.max_requests, rate_limit.window_seconds));

    Ok(TurnDispatcher::new(turns).with_chain(chain))
}

fn run_bot(config_path: &str, console: bool) {
    let config = load_config(config_path);
    tracing::info!("Starting cake-bot: {}", config.bot.name);

    let dispatcher = match build_dispatcher(&config) {
        Ok(dispatcher) => dispatcher,
        Err(e) => {
            tracing::error!("Failed to initialize bot: {}", e);
            std::process::exit(1);
        }
    };

    let rt = runtime();
    let result = if console {
        rt.block_on(async {
            let bot = ConsoleAdapter::new(config.bot.id.clone(), config.bot.name.clone());
            run_console_bot(bot, dispatcher).await
        })
    } else {
        rt.block_on(run_server(&config, dispatcher))
    };

    if let Err(e) = result {
        tracing::error!("Bot stopped: {}", e);
        std::process::exit(1);
    }
}

async fn run_server(config: &Config, dispatcher: TurnDispatcher) -> Result<(), BotError> {
    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .map_err(|e| ConfigError::InvalidValue(format!("server address: {}", e)))?;

    let connector = ConnectorClient::new(BotInfo {
        id: config.bot.id.clone(),
        name: config.bot.name.clone(),
    });
    connector.start().await?;

    let state = AppState {
        dispatcher: Arc::new(dispatcher),
        connector: Arc::new(connector),
    };
    http::serve(addr, state).await
}

async fn run_console_bot(bot: ConsoleAdapter, dispatcher: TurnDispatcher) -> Result<(), BotError> {
    let mut commands = CommandService::new("/");
    commands.register_defaults();
    let parser = ActivityParser::new(commands.prefix());

    bot.start().await?;
    let info = bot.bot_info();
    tracing::info!("Bot started: {}", info.name);
    println!("Type {}help for commands.", commands.prefix());

    deliver(&bot, &dispatcher, bot.session_start()).await;

    // Main loop (for console mode)
    while let Some(input) = bot.read_line("> ").await {
        if input.is_empty() {
            continue;
        }

        match parser.parse_console(bot.conversation_id(), bot.user(), &bot.bot_account(), &input) {
            ConsoleInput::Command { name, args } => {
                let mut activity = Activity::message("console", bot.conversation_id(), bot.user().clone(), input.as_str());
                activity.recipient = bot.bot_account();

                let text = match commands.handle(&name, &args, &activity) {
                    Ok(CommandReply::Text(text)) => text,
                    Ok(CommandReply::ResetConversation) => {
                        dispatcher.turns().reset(&activity.conversation_key()).await?;
                        "Conversation reset. Pick a shape to start again.".to_string()
                    }
                    Ok(CommandReply::ShowProfile) => {
                        match dispatcher.turns().store().load_profile(&activity.user_key()).await? {
                            Some(profile) => profile.to_string(),
                            None => "I don't know anything about you yet.".to_string(),
                        }
                    }
                    Ok(CommandReply::Quit) => break,
                    Err(e) => format!("Error: {}", e),
                };
                bot.send_activity(&activity.reply_text(text)).await?;
            }
            ConsoleInput::Message(activity) => {
                deliver(&bot, &dispatcher, activity).await;
            }
        }
    }

    tracing::info!("Console session ended");
    Ok(())
}

/// Run one turn and print its replies
async fn deliver(bot: &ConsoleAdapter, dispatcher: &TurnDispatcher, activity: Activity) {
    match dispatcher.process(activity.clone()).await {
        Ok(replies) => {
            if let Err(e) = bot.send_activities(&replies).await {
                dispatcher.delivery_failed(&activity, &e).await;
            }
        }
        Err(e) => tracing::error!("Turn failed: {}", e),
    }
}

fn publish(config_path: &str, dir: &Path) {
    let config = load_config(config_path);

    let publisher = match Publisher::new(&config.publish) {
        Ok(publisher) => publisher,
        Err(e) => {
            tracing::error!("Cannot publish: {}", e);
            std::process::exit(1);
        }
    };

    let rt = runtime();
    match rt.block_on(publisher.publish(dir)) {
        Ok(_) => println!("{} published", config.bot.name),
        Err(e) => {
            tracing::error!("Failed to publish {}: {}", config.bot.name, e);
            std::process::exit(1);
        }
    }
}

fn init_config() {
    let config = Config::default();
    match serde_yaml::to_string(&config) {
        Ok(yaml) => {
            println!("{}", yaml);
            println!("\nSave this to config.yaml and adjust as needed.");
        }
        Err(e) => {
            tracing::error!("Failed to render config: {}", e);
            std::process::exit(1);
        }
    }
}
