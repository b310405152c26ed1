use std::io::Write;
use std::process;

use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use log::LevelFilter;
use praias::config::ExtractorConfig;
use praias::scraper::WebScraper;
use praias::session::{CatalogSession, Selection, SelectionPayload, SessionStore, select};
use praias::types::{BeachCatalog, Extraction};
use praias::utils::{CatalogStats, keyboard_rows};
use tokio::io::{AsyncBufReadExt, BufReader};

const APOLOGY: &str = "Não consegui acessar a Wikipedia 😢";
const LOCAL_SESSION: &str = "local";

#[derive(Parser)]
#[command(name = "praias")]
#[command(about = "Beaches of Pernambuco grouped by municipality, scraped from Wikipedia", long_about = None)]
struct Cli {
    #[arg(
        short = 'l',
        long = "log-level",
        value_enum,
        default_value = "info",
        global = true,
        help = "Set the logging level"
    )]
    log_level: LogLevel,

    #[arg(
        long,
        global = true,
        help = "Page to scrape [default: $PRAIAS_URL, or the pt.wikipedia list of beaches of Pernambuco]"
    )]
    url: Option<String>,

    #[arg(
        long = "exclude",
        value_name = "TITLE",
        global = true,
        help = "Section title that does not name a municipality (repeatable)"
    )]
    exclude: Vec<String>,

    #[arg(
        long,
        global = true,
        requires = "exclude",
        help = "Use only the --exclude titles instead of adding them to the defaults"
    )]
    replace_exclusions: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => LevelFilter::Off,
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the article's introductory paragraph
    Summary,
    /// List municipalities and how many beaches each one has
    List {
        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Show the beaches of one municipality
    Beaches {
        #[arg(help = "Municipality name, as listed by `praias list`")]
        municipality: String,

        #[arg(
            short = 'o',
            long = "output",
            value_enum,
            default_value = "text",
            help = "Output format"
        )]
        format: OutputFormat,
    },
    /// Pick municipalities interactively from the fetched catalog
    Browse,
}

fn serialize_json<T: serde::Serialize>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            log::error!("Error serializing to JSON: {}", e);
            process::exit(1);
        }
    }
}

fn extractor_config(exclude: Vec<String>, replace: bool) -> ExtractorConfig {
    let config = ExtractorConfig::default();
    let config = if replace {
        config.with_exclusions(exclude)
    } else {
        config.with_extra_exclusions(exclude)
    };
    config.validate().unwrap_or_else(|e| {
        log::error!("Invalid args: {e}");
        process::exit(1);
    })
}

async fn fetch_or_exit(scraper: &WebScraper) -> Extraction {
    log::info!("Fetching list of beaches from {}...", scraper.url());
    let extraction = scraper.fetch_catalog().await;
    if extraction.is_failure() {
        eprintln!("{}", APOLOGY);
        process::exit(1);
    }
    extraction
}

fn print_keyboard(catalog: &BeachCatalog) {
    if catalog.is_empty() {
        println!("No municipalities found on the page.");
        return;
    }
    println!("Selecione um município:");
    let mut index = 0;
    for row in keyboard_rows(catalog) {
        let cells: Vec<String> = row
            .iter()
            .map(|button| {
                index += 1;
                format!("[{:>2}] {:<28}", index, button.label)
            })
            .collect();
        println!("  {}", cells.join(" ").trim_end());
    }
}

/// Accepts a button number, a raw selection payload, or the name itself.
fn resolve_choice(catalog: Option<&BeachCatalog>, input: &str) -> String {
    if let Some(catalog) = catalog
        && let Ok(n) = input.parse::<usize>()
        && let Some(name) = n.checked_sub(1).and_then(|i| catalog.names().nth(i))
    {
        return name.to_string();
    }
    SelectionPayload::decode(input).unwrap_or(input).to_string()
}

async fn refresh(scraper: &WebScraper, sessions: &mut SessionStore<&'static str>) -> bool {
    println!("🔎 Buscando lista de praias...");
    let extraction = scraper.fetch_catalog().await;

    let Some(session) = CatalogSession::from_extraction(extraction, Utc::now()) else {
        println!("{}", APOLOGY);
        return false;
    };

    println!("\n🌊 {}\n", session.summary);
    print_keyboard(&session.catalog);
    if sessions.store(LOCAL_SESSION, session).is_some() {
        log::debug!("Replaced previous catalog session");
    }
    true
}

async fn browse(scraper: &WebScraper) {
    let mut sessions = SessionStore::new();
    if !refresh(scraper, &mut sessions).await {
        process::exit(1);
    }

    println!("\nType a municipality or its number, `refresh` to fetch again, `quit` to leave.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush().ok();

        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                break;
            }
        };

        match line.trim() {
            "" => continue,
            "quit" | "exit" | "sair" => break,
            "refresh" => {
                refresh(scraper, &mut sessions).await;
            }
            input => {
                let session = sessions.get(&LOCAL_SESSION);
                let name = resolve_choice(session.map(|s| &s.catalog), input);
                println!("{}\n", select(session, &name));
            }
        }
    }

    sessions.evict(&LOCAL_SESSION);
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level.clone().into())
        .init();

    let url = cli.url.clone().unwrap_or_else(|| {
        std::env::var("PRAIAS_URL").unwrap_or_else(|_| praias::DEFAULT_URL.into())
    });
    let config = extractor_config(cli.exclude, cli.replace_exclusions);

    let scraper = WebScraper::with_url(url)
        .unwrap_or_else(|e| {
            log::error!("Error creating scraper: {}", e);
            process::exit(1);
        })
        .with_config(config);

    match cli.command {
        Commands::Summary => {
            let extraction = fetch_or_exit(&scraper).await;
            println!("{}", extraction.summary);
        }

        Commands::List { format } => {
            let extraction = fetch_or_exit(&scraper).await;

            match format {
                OutputFormat::Json => serialize_json(&extraction),
                OutputFormat::Text => {
                    if extraction.catalog.is_empty() {
                        println!("No municipalities found on the page.");
                    } else {
                        print!("{}", extraction);
                        print!("{}", CatalogStats::from_catalog(&extraction.catalog));
                    }
                }
            }
        }

        Commands::Beaches {
            municipality,
            format,
        } => {
            let extraction = fetch_or_exit(&scraper).await;
            let session = CatalogSession::from_extraction(extraction, Utc::now());
            let selection = select(session.as_ref(), &municipality);

            match format {
                OutputFormat::Json => {
                    let beaches: &[String] = match selection {
                        Selection::Found { beaches, .. } => beaches,
                        Selection::NotFound(_) => &[],
                    };
                    serialize_json(&serde_json::json!({
                        "municipality": municipality,
                        "beaches": beaches,
                    }));
                }
                OutputFormat::Text => println!("{}", selection),
            }
        }

        Commands::Browse => browse(&scraper).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> BeachCatalog {
        let mut catalog = BeachCatalog::new();
        catalog.open("Goiana");
        catalog.open("Recife");
        catalog
    }

    #[test]
    fn test_resolve_choice_by_number() {
        let catalog = catalog();
        assert_eq!(resolve_choice(Some(&catalog), "2"), "Recife");
        assert_eq!(resolve_choice(Some(&catalog), "1"), "Goiana");
    }

    #[test]
    fn test_resolve_choice_out_of_range_number_is_a_name() {
        let catalog = catalog();
        assert_eq!(resolve_choice(Some(&catalog), "0"), "0");
        assert_eq!(resolve_choice(Some(&catalog), "3"), "3");
        assert_eq!(resolve_choice(None, "1"), "1");
    }

    #[test]
    fn test_resolve_choice_by_payload_or_name() {
        let catalog = catalog();
        assert_eq!(resolve_choice(Some(&catalog), "cidade_Recife"), "Recife");
        assert_eq!(resolve_choice(Some(&catalog), "Olinda"), "Olinda");
    }

    #[test]
    fn test_extractor_config_from_args() {
        let config = extractor_config(vec!["Notas".into()], false);
        assert!(config.is_excluded("Notas"));
        assert!(config.is_excluded("Referências"));

        let config = extractor_config(vec!["Notas".into()], true);
        assert!(config.is_excluded("Notas"));
        assert!(!config.is_excluded("Referências"));
    }

    #[test]
    fn test_cli_parses_global_flags() {
        let cli = Cli::try_parse_from([
            "praias",
            "beaches",
            "Recife",
            "--exclude",
            "Notas",
            "-o",
            "json",
        ])
        .expect("arguments should parse");

        assert_eq!(cli.exclude, vec!["Notas".to_string()]);
        assert!(!cli.replace_exclusions);
        assert!(matches!(
            cli.command,
            Commands::Beaches {
                ref municipality,
                format: OutputFormat::Json,
            } if municipality == "Recife"
        ));
    }

    #[test]
    fn test_cli_replace_exclusions_requires_exclude() {
        assert!(Cli::try_parse_from(["praias", "list", "--replace-exclusions"]).is_err());
    }
}
