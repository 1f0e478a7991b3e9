use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use brief_core::{Article, Storage};
use brief_inference::{BriefSynthesizer, Config, ModelBackend, SynthesisConfig};
use brief_web::AppState;
use chrono::{NaiveDate, Utc};
use clap::Parser;
use tracing::info;

mod logging;

#[derive(Debug, Clone, Copy, PartialEq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    /// Accepts `90`, `30s`, `2m`, `1h15m30s`; a bare number is seconds.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_value = false;

        for c in s.trim().chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                let unit = match c {
                    's' => 1,
                    'm' => 60,
                    'h' => 3600,
                    'd' => 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                };
                total_seconds = num
                    .checked_mul(unit)
                    .and_then(|seconds| total_seconds.checked_add(seconds))
                    .ok_or_else(|| "Duration is too large".to_string())?;
                current_number.clear();
                has_value = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        if !current_number.is_empty() {
            let seconds = current_number
                .parse::<u64>()
                .map_err(|_| "Invalid number in duration".to_string())?;
            total_seconds = total_seconds
                .checked_add(seconds)
                .ok_or_else(|| "Duration is too large".to_string())?;
            has_value = true;
        }

        if !has_value {
            return Err("Duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Synthesize daily intelligence briefs from collected articles", long_about = None)]
pub struct Cli {
    /// Storage backend: memory or sqlite
    #[arg(long, default_value = "memory")]
    storage: String,
    /// Backend location, e.g. the SQLite database path
    #[arg(long)]
    backend_url: Option<String>,
    #[arg(long, default_value = "ollama", help = "Model backend. Available: ollama (default), deepseek, anthropic, dummy")]
    model: ModelBackend,
    #[arg(long)]
    model_name: Option<String>,
    /// API base URL (for ollama: http://host:port/model)
    #[arg(long)]
    model_url: Option<String>,
    #[arg(long, env = "BRIEF_API_KEY", hide_env_values = true)]
    api_key: Option<String>,
    /// Domain label the brief is written for
    #[arg(long, default_value = "AI & Payments")]
    domain: String,
    /// Per-request model timeout (e.g. 30s, 2m)
    #[arg(long)]
    timeout: Option<HumanDuration>,
    /// JSON file overriding synthesis limits; omitted keys keep their defaults
    #[arg(long)]
    synthesis_config: Option<PathBuf>,
    #[arg(short, long)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Store articles from a JSON array file
    Import {
        file: PathBuf,
    },
    /// Produce the brief for a day and print it as JSON
    Synthesize {
        /// Day to synthesize (YYYY-MM-DD), defaults to today (UTC)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Use the articles in this JSON file instead of the stored ones
        #[arg(long)]
        input: Option<PathBuf>,
    },
    /// Print the most recent stored briefs
    History {
        #[arg(long, default_value_t = 7)]
        limit: usize,
    },
    /// Print the stored brief for a day
    Show {
        date: NaiveDate,
    },
    /// Serve the HTTP API
    Serve {
        #[arg(long, default_value = "127.0.0.1:3000")]
        addr: String,
    },
}

impl Cli {
    fn inference_config(&self) -> Config {
        Config {
            backend: self.model,
            api_key: self.api_key.clone(),
            model_name: self.model_name.clone(),
            model_url: self.model_url.clone(),
            timeout: self.timeout.map(|t| t.0),
        }
    }
}

fn read_synthesis_config(path: Option<&Path>) -> anyhow::Result<SynthesisConfig> {
    let Some(path) = path else {
        return Ok(SynthesisConfig::default());
    };
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a valid synthesis config", path.display()))
}

fn read_articles(path: &Path) -> anyhow::Result<Vec<Article>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("{} is not a JSON array of articles", path.display()))
}

async fn synthesize(
    storage: &dyn Storage,
    synthesizer: &BriefSynthesizer,
    domain: &str,
    date: NaiveDate,
    input: Option<&Path>,
) -> anyhow::Result<()> {
    let brief = match input {
        Some(path) => {
            let articles = read_articles(path)?;
            let history = storage
                .recent_briefs(date, synthesizer.config().context.history_days)
                .await?;
            let brief = synthesizer.synthesize(date, domain, &articles, &history).await;
            storage.store_brief(&brief).await?;
            brief
        }
        None => synthesizer.run_for_day(storage, date, domain).await?,
    };
    println!("{}", serde_json::to_string_pretty(&brief)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    let storage = brief_storage::create_storage(&cli.storage, cli.backend_url.as_deref()).await?;
    info!("✨ Storage initialized successfully (using {})", cli.storage);

    match cli.command {
        Commands::Import { ref file } => {
            let articles = read_articles(file)?;
            for article in &articles {
                storage.store_article(article).await?;
            }
            info!("📥 Imported {} articles from {}", articles.len(), file.display());
        }
        Commands::History { limit } => {
            let tomorrow = Utc::now().date_naive().succ_opt().context("date out of range")?;
            let briefs = storage.recent_briefs(tomorrow, limit).await?;
            println!("{}", serde_json::to_string_pretty(&briefs)?);
        }
        Commands::Show { date } => match storage.get_brief(date).await? {
            Some(brief) => println!("{}", serde_json::to_string_pretty(&brief)?),
            None => anyhow::bail!("No brief stored for {}", date),
        },
        Commands::Synthesize { date, ref input } => {
            let model = brief_inference::create_model(cli.inference_config()).await?;
            let config = read_synthesis_config(cli.synthesis_config.as_deref())?;
            let synthesizer = BriefSynthesizer::with_config(model, config);
            let date = date.unwrap_or_else(|| Utc::now().date_naive());
            synthesize(storage.as_ref(), &synthesizer, &cli.domain, date, input.as_deref()).await?;
        }
        Commands::Serve { ref addr } => {
            let model = brief_inference::create_model(cli.inference_config()).await?;
            let config = read_synthesis_config(cli.synthesis_config.as_deref())?;
            let state = AppState {
                storage: storage.clone(),
                synthesizer: Arc::new(BriefSynthesizer::with_config(model, config)),
                domain: cli.domain.clone(),
            };
            brief_web::serve(state, addr).await?;
        }
    }

    Ok(())
}
