// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, debug, info};
use std::io::{Read, Write};
use std::path::PathBuf;

use segtrans::api::{EncodeOptions, TranslateRequest, TranslateResponse, encode_response};
use segtrans::app_config::{self, CacheBackend, Config, DEFAULT_CONFIG_FILE, TranslationProvider};
use segtrans::app_controller::Controller;
use segtrans::markup;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    #[value(name = "libretranslate")]
    LibreTranslate,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::LibreTranslate => TranslationProvider::LibreTranslate,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for CacheBackend to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliCacheBackend {
    Memory,
    Sqlite,
}

impl From<CliCacheBackend> for CacheBackend {
    fn from(cli_backend: CliCacheBackend) -> Self {
        match cli_backend {
            CliCacheBackend::Memory => CacheBackend::Memory,
            CliCacheBackend::Sqlite => CacheBackend::Sqlite,
        }
    }
}

/// segtrans - sentence-level translation of text and HTML
#[derive(Parser, Debug)]
#[command(name = "segtrans")]
#[command(version)]
#[command(about = "Sentence-level, cache-aware translation of text and HTML")]
#[command(long_about = "segtrans splits text or HTML into sentences, translates each sentence through
a translation backend with a persistent cache, and puts the result back together
with the original markup untouched.

EXAMPLES:
    segtrans translate --text 'Hello. How are you?' -t es
    segtrans translate --input page.html -s en -t fr
    segtrans translate --request request.json --json
    segtrans languages -p libretranslate
    segtrans check -p ollama
    segtrans cache stats
    segtrans completions bash > segtrans.bash

CONFIGURATION:
    Configuration is stored in conf.json by default. If the config file doesn't
    exist, a default one will be created automatically.

SUPPORTED PROVIDERS:
    libretranslate - LibreTranslate server (default: http://localhost:5000)
    ollama         - Local Ollama server prompted to translate")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Translate text or HTML
    Translate(TranslateArgs),

    /// List the target languages offered by the provider
    Languages(ProviderArgs),

    /// Check that the provider is reachable
    Check(ProviderArgs),

    /// Inspect or clear the translation cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Generate shell completions for segtrans
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum CacheAction {
    /// Show entry and hit counts
    Stats(CacheArgs),
    /// Delete every cached translation
    Clear(CacheArgs),
}

#[derive(Args, Debug, Default)]
struct ProviderArgs {
    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name (LLM providers)
    #[arg(short, long)]
    model: Option<String>,

    /// Provider endpoint URL
    #[arg(long, env = "SEGTRANS_ENDPOINT")]
    endpoint: Option<String>,

    /// Provider API key
    #[arg(long, env = "SEGTRANS_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
}

#[derive(Args, Debug, Default)]
struct CacheArgs {
    /// Cache backend
    #[arg(long, value_enum)]
    cache_backend: Option<CliCacheBackend>,

    /// SQLite cache file
    #[arg(long)]
    cache_path: Option<PathBuf>,

    /// SQLite cache table
    #[arg(long)]
    cache_table: Option<String>,
}

#[derive(Args, Debug)]
struct TranslateArgs {
    /// Text to translate
    #[arg(long, conflicts_with_all = ["input", "request"])]
    text: Option<String>,

    /// File holding the text to translate
    #[arg(short, long, conflicts_with = "request")]
    input: Option<PathBuf>,

    /// JSON request file with source_language, target_language and text
    #[arg(short, long)]
    request: Option<PathBuf>,

    /// Source language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language code (e.g., 'en', 'es', 'fr')
    #[arg(short, long)]
    target_language: Option<String>,

    #[command(flatten)]
    provider: ProviderArgs,

    #[command(flatten)]
    cache: CacheArgs,

    /// Maximum sentences in flight
    #[arg(long)]
    max_in_flight: Option<usize>,

    /// Fail on malformed HTML instead of passing it through
    #[arg(long)]
    strict: bool,

    /// Disable the translation cache
    #[arg(long)]
    no_cache: bool,

    /// Print the JSON response envelope instead of bare text
    #[arg(long)]
    json: bool,

    /// Indent JSON output
    #[arg(long, requires = "json")]
    pretty: bool,

    /// Escape <, > and & in JSON output
    #[arg(long, requires = "json")]
    escape_markup: bool,
}

// Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // Install as the global logger; the max level can be raised later
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger::new(LevelFilter::Trace)))?;
        log::set_max_level(level);
        Ok(())
    }

    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }

    fn emoji_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "❌",
            Level::Warn => "🚧",
            Level::Info => " ",
            Level::Debug => "🔍",
            Level::Trace => "📋",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let level = record.level();

            let _ = writeln!(
                std::io::stderr(),
                "{}{} {} {}\x1B[0m",
                Self::color_for_level(level),
                now,
                Self::emoji_for_level(level),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "segtrans", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());
    debug!("Loaded configuration from {}", cli.config_path.display());

    match cli.command {
        Commands::Translate(args) => run_translate(config, args).await,
        Commands::Languages(args) => run_languages(config, &args).await,
        Commands::Check(args) => run_check(config, &args).await,
        Commands::Cache { action } => run_cache(config, action).await,
        Commands::Completions { .. } => Ok(()),
    }
}

fn apply_provider_overrides(config: &mut Config, args: &ProviderArgs) {
    if let Some(provider) = &args.provider {
        config.translation.provider = provider.clone().into();
    }

    let provider_config = config.translation.active_provider_config_mut();
    if let Some(model) = &args.model {
        provider_config.model = model.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        provider_config.endpoint = endpoint.clone();
    }
    if let Some(api_key) = &args.api_key {
        provider_config.api_key = api_key.clone();
    }
}

fn apply_cache_overrides(config: &mut Config, args: &CacheArgs) {
    if let Some(backend) = &args.cache_backend {
        config.cache.backend = backend.clone().into();
    }
    if let Some(path) = &args.cache_path {
        config.cache.database_path = Some(path.clone());
    }
    if let Some(table) = &args.cache_table {
        config.cache.table_name = table.clone();
    }
}

async fn run_translate(mut config: Config, args: TranslateArgs) -> Result<()> {
    apply_provider_overrides(&mut config, &args.provider);
    apply_cache_overrides(&mut config, &args.cache);
    if let Some(source_language) = &args.source_language {
        config.source_language = source_language.clone();
    }
    if let Some(target_language) = &args.target_language {
        config.target_language = target_language.clone();
    }
    if let Some(limit) = args.max_in_flight {
        config.translation.common.max_concurrent_requests = Some(limit);
    }
    if args.strict {
        config.markup.strict = true;
    }
    if args.no_cache {
        config.cache.enabled = false;
    }

    config.validate().context("Invalid configuration")?;

    let options = EncodeOptions {
        escape_markup: args.escape_markup,
        pretty: args.pretty,
    };
    let controller = Controller::with_config(config.clone())?;

    if let Some(path) = &args.request {
        let body = std::fs::read(path)
            .with_context(|| format!("Failed to read request file: {}", path.display()))?;
        let response = controller.handle(&body, options).await;
        if !response.is_success() {
            return Err(anyhow!("Request failed with status {}: {}", response.status, response.body));
        }
        println!("{}", response.body);
        return Ok(());
    }

    let text = match (&args.text, &args.input) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => markup::sanitize_utf8(
            &std::fs::read(path).with_context(|| format!("Failed to read input file: {}", path.display()))?,
        ),
        (None, None) => {
            let mut buffer = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buffer)
                .context("Failed to read text from stdin")?;
            markup::sanitize_utf8(&buffer)
        }
    };

    let start_time = std::time::Instant::now();
    let request = TranslateRequest::new(config.source_language, config.target_language, text);
    let response: TranslateResponse = controller.translate(&request).await?;
    info!("Translation completed in {:?}", start_time.elapsed());

    if args.json {
        println!("{}", encode_response(&response, options)?);
    } else {
        println!("{}", response.translated_text);
    }
    Ok(())
}

async fn run_languages(mut config: Config, args: &ProviderArgs) -> Result<()> {
    apply_provider_overrides(&mut config, args);
    let controller = Controller::with_config(config)?;

    for code in controller.supported_languages().await? {
        let name = segtrans::language_utils::get_language_name(&code).unwrap_or_default();
        println!("{:<8} {}", code, name);
    }
    Ok(())
}

async fn run_check(mut config: Config, args: &ProviderArgs) -> Result<()> {
    apply_provider_overrides(&mut config, args);
    let controller = Controller::with_config(config)?;
    controller.test_connection().await?;
    println!(
        "{} at {} is reachable",
        controller.config().translation.provider.display_name(),
        controller.config().translation.get_endpoint()
    );
    Ok(())
}

async fn run_cache(mut config: Config, action: CacheAction) -> Result<()> {
    let (CacheAction::Stats(args) | CacheAction::Clear(args)) = &action;
    apply_cache_overrides(&mut config, args);
    config.cache.enabled = true;
    if config.cache.backend == CacheBackend::Memory {
        return Err(anyhow!(
            "The memory cache does not outlive the process; use --cache-backend sqlite"
        ));
    }

    let controller = Controller::with_config(config)?;
    match action {
        CacheAction::Stats(_) => println!("{}", controller.cache().stats().await?),
        CacheAction::Clear(_) => {
            let removed = controller.cache().clear().await?;
            println!("Removed {} cached translations", removed);
        }
    }
    Ok(())
}
