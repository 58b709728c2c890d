use std::sync::Arc;

use clap::{Parser, Subcommand};

use warta_bot::application::handlers::{
    CommandHandler, DefaultEmitters, InhibitorHandler, ListenerHandler, ListenerHandlerOptions,
};
use warta_bot::domain::entities::Inhibitor;
use warta_bot::domain::traits::{Adapter, EventSource};
use warta_bot::infrastructure::adapters::ConsoleAdapter;
use warta_bot::infrastructure::client::Client;
use warta_bot::infrastructure::config::Config;
use warta_bot::infrastructure::listeners::ActionRegistry;

#[derive(Parser)]
#[command(name = "warta-bot")]
#[command(about = "A minimal event-driven bot framework", long_about = None)]
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
    Run,
    /// Show version
    Version,
    /// Generate default config and a sample listener
    InitConfig,
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
        Commands::Run => {
            run_bot(cli.config);
        }
        Commands::Version => {
            println!("warta-bot v{}", env!("CARGO_PKG_VERSION"));
        }
        Commands::InitConfig => {
            init_config();
        }
    }
}

fn run_bot(config_path: String) {
    // Load config
    let config = if std::path::Path::new(&config_path).exists() {
        Config::load(&config_path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config: {}, using defaults", e);
            Config::load_env()
        })
    } else {
        Config::load_env()
    };

    tracing::info!("Starting warta-bot: {}", config.bot.name);

    let client = Arc::new(Client::new(config.bot.name.clone()));
    let commands = Arc::new(CommandHandler::new());

    let mut inhibitors = InhibitorHandler::new();
    inhibitors.register(Inhibitor::new("empty", "empty message", |payload| {
        payload
            .get("text")
            .and_then(|t| t.as_str())
            .map(|t| t.trim().is_empty())
            .unwrap_or(true)
    }));
    let inhibitors = Arc::new(inhibitors);

    // Wire command dispatch: client messages starting with the prefix are
    // routed through the inhibitors into the command handler.
    let prefix = config.bot.prefix.clone();
    let dispatch_commands = commands.clone();
    let dispatch_inhibitors = inhibitors.clone();
    client.events().on(
        "message",
        Arc::new(move |payload| {
            let Some(text) = payload.get("text").and_then(|t| t.as_str()) else {
                return;
            };
            let Some(rest) = text.strip_prefix(prefix.as_str()) else {
                return;
            };
            if let Some(reason) = dispatch_inhibitors.test(payload) {
                tracing::warn!("Message blocked: {}", reason);
                return;
            }
            let name = rest.split_whitespace().next().unwrap_or(rest);
            match dispatch_commands.handle(name, payload) {
                Ok(response) => println!("{}", response),
                Err(e) => tracing::warn!("Command failed: {}", e),
            }
        }),
    );

    // Load and register listeners from the manifest directory.
    let handler = ListenerHandler::new(
        DefaultEmitters {
            client: client.events(),
            command_handler: commands.events(),
            inhibitor_handler: inhibitors.events(),
        },
        ListenerHandlerOptions::new(&config.listeners.directory),
        ActionRegistry::with_builtins(),
    );
    let handler = match handler {
        Ok(handler) => handler,
        Err(e) => {
            tracing::error!("Failed to initialize listeners: {}", e);
            std::process::exit(1);
        }
    };
    tracing::info!(
        "Listener handler ready with {} listener(s) from {}",
        handler.listeners().len(),
        handler.directory().display()
    );

    let console_enabled = config
        .adapters
        .console
        .as_ref()
        .map(|c| c.enabled)
        .unwrap_or(true);
    if !console_enabled {
        tracing::error!("No adapter enabled, nothing to run");
        return;
    }

    // Run console bot (dev mode)
    let rt = tokio::runtime::Runtime::new().unwrap();
    rt.block_on(async {
        let adapter = ConsoleAdapter::new(client.clone());
        if let Err(e) = adapter.start().await {
            tracing::error!("Adapter stopped with error: {}", e);
        }
    });
}

fn init_config() {
    let config = Config::default();
    let yaml = match serde_yaml::to_string(&config) {
        Ok(yaml) => yaml,
        Err(e) => {
            tracing::error!("Failed to serialize default config: {}", e);
            return;
        }
    };

    if let Err(e) = std::fs::write("config.yaml", yaml) {
        tracing::error!("Failed to write config.yaml: {}", e);
        return;
    }
    tracing::info!("Wrote config.yaml");

    let sample = "\
# Logs once when the client comes up.
emitter: client
event: ready
kind: once
action: log
with:
  message: bot is ready
";
    if let Err(e) = std::fs::create_dir_all(&config.listeners.directory)
        .and_then(|_| std::fs::write(config.listeners.directory.join("ready.yaml"), sample))
    {
        tracing::error!("Failed to write sample listener: {}", e);
        return;
    }
    tracing::info!(
        "Wrote sample listener to {}",
        config.listeners.directory.join("ready.yaml").display()
    );
}
