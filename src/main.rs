//! page-i18n 命令行工具

use std::error::Error;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use page_i18n::config::ConfigManager;
use page_i18n::env::{self, EnvVar};
use page_i18n::locale::{detect_locale, LanguagePreferences, SwitchOutcome};
use page_i18n::{ConversionMode, Locale, Page};

#[derive(Parser)]
#[command(name = "page-i18n")]
#[command(version)]
#[command(about = "Localize static HTML pages: dictionary, Chinese script conversion and machine translation")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Localize an HTML page into the detected or requested locale
    Localize {
        /// Input HTML file
        #[arg(value_name = "INPUT")]
        input: PathBuf,

        /// Locale to switch to after detection (zh-Hant, zh-Hans, en, fr)
        #[arg(short, long)]
        locale: Option<Locale>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Charset used to decode the input
        #[arg(short, long)]
        encoding: Option<String>,

        /// Accept-Language style preferences used instead of the process environment
        #[arg(long)]
        accept_language: Option<String>,

        /// Do not read or write the stored locale preference
        #[arg(long)]
        no_persist: bool,
    },

    /// Convert text between Simplified and Traditional Chinese
    Convert {
        /// Text to convert (default: read stdin)
        #[arg(value_name = "TEXT")]
        text: Option<String>,

        /// Conversion direction: s2t or t2s
        #[arg(short, long, default_value = "s2t")]
        mode: ConversionMode,
    },

    /// Show which locale would be selected at startup
    Detect {
        /// Accept-Language style preferences used instead of the process environment
        #[arg(long)]
        accept_language: Option<String>,

        /// Ignore the stored locale preference
        #[arg(long)]
        no_persist: bool,
    },

    /// Write an example configuration file
    InitConfig {
        #[arg(value_name = "PATH", default_value = "page-i18n.toml")]
        path: PathBuf,
    },

    /// Print documentation for all environment variables
    EnvDocs,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(env::core::LogLevel::get_or_default("info".to_string())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn preferences(accept_language: Option<&str>) -> LanguagePreferences {
    match accept_language {
        Some(header) => LanguagePreferences::from_accept_language(header),
        None => LanguagePreferences::from_env(),
    }
}

fn describe(outcome: &SwitchOutcome) -> String {
    match outcome {
        SwitchOutcome::Unchanged => "unchanged".to_string(),
        SwitchOutcome::Reloaded { dictionary_updates } => {
            format!("reloaded, {} dictionary entries applied", dictionary_updates)
        }
        SwitchOutcome::Converted {
            dictionary_updates,
            converted,
        } => format!(
            "{} dictionary entries applied, {} text nodes converted",
            dictionary_updates, converted
        ),
        SwitchOutcome::Translated {
            dictionary_updates,
            report,
        } => format!(
            "{} dictionary entries applied, {} of {} text items translated ({} failed batches)",
            dictionary_updates, report.translated, report.items, report.failed_batches
        ),
        SwitchOutcome::TranslationFailed {
            dictionary_updates,
            reason,
        } => format!(
            "{} dictionary entries applied, translation failed: {}",
            dictionary_updates, reason
        ),
        SwitchOutcome::DictionaryOnly { dictionary_updates } => {
            format!("{} dictionary entries applied", dictionary_updates)
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing();

    match cli.command {
        Commands::Localize {
            input,
            locale,
            output,
            encoding,
            accept_language,
            no_persist,
        } => {
            let config = ConfigManager::load(cli.config.as_deref())?.into_config();
            let manager = config.build_manager(!no_persist)?;
            let page = Page::from_file(&input, encoding.as_deref())?;

            let initialized = manager
                .initialize(&page, &preferences(accept_language.as_deref()))
                .await?;
            eprintln!(
                "Detected {} ({:?}): {}",
                initialized.detection.locale,
                initialized.detection.source,
                describe(&initialized.outcome)
            );

            if let Some(locale) = locale {
                let outcome = manager.select_locale(&page, locale).await?;
                eprintln!("Switched to {}: {}", locale, describe(&outcome));
            }

            match output {
                Some(path) => page.write_to(&path)?,
                None => io::stdout().write_all(&page.serialize()?)?,
            }
        }
        Commands::Convert { text, mode } => {
            let config = ConfigManager::load(cli.config.as_deref())?.into_config();
            let converter = config.script_converter()?;

            let text = match text {
                Some(text) => text,
                None => {
                    let mut buffer = String::new();
                    io::stdin().read_to_string(&mut buffer)?;
                    buffer
                }
            };
            println!("{}", converter.convert_async(&text, mode).await);
        }
        Commands::Detect {
            accept_language,
            no_persist,
        } => {
            let config = ConfigManager::load(cli.config.as_deref())?.into_config();
            let store = config.locale_store(!no_persist);
            let detection = detect_locale(
                store.as_ref(),
                &preferences(accept_language.as_deref()),
                &config.locale_table(),
                config.locale.default,
            );
            println!("{} ({:?})", detection.locale, detection.source);
        }
        Commands::InitConfig { path } => {
            ConfigManager::generate_example_config(&path)?;
            println!("Wrote {}", path.display());
        }
        Commands::EnvDocs => {
            print!("{}", env::generate_env_docs());
        }
    }

    Ok(())
}
