use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info};

use nn_core::{RecordStore, TtsProvider};
use nn_ingest::{HtmlExtractor, Pipeline, RssFetcher};
use nn_speech::{Credentials, OpenRouterSummarizer, SpeechRouter};
use nn_storage::create_store;
use nn_web::AppState;

/// Duration with human units, e.g. `90s`, `5m`, `1h30m`.
#[derive(Debug, Clone, Copy)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut number = String::new();

        for c in s.chars() {
            if c.is_ascii_digit() {
                number.push(c);
            } else {
                let value: u64 = number
                    .parse()
                    .map_err(|_| format!("expected a number before '{}'", c))?;
                total_seconds += match c {
                    's' => value,
                    'm' => value * 60,
                    'h' => value * 3600,
                    'd' => value * 86400,
                    other => return Err(format!("invalid duration unit: {}", other)),
                };
                number.clear();
            }
        }

        // A trailing bare number counts as seconds.
        if !number.is_empty() {
            total_seconds += number
                .parse::<u64>()
                .map_err(|_| "invalid number in duration".to_string())?;
        } else if total_seconds == 0 && s.is_empty() {
            return Err("duration must include a number".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Fetch, summarize and narrate news articles", long_about = None)]
struct Cli {
    /// Storage backend to use (sqlite or memory).
    #[arg(long, default_value = "sqlite")]
    storage: String,
    /// Path of the sqlite database file.
    #[arg(long, default_value = "narrate_news.db")]
    db: PathBuf,
    /// Directory where narrated audio files are written.
    #[arg(long, default_value = "output")]
    output: PathBuf,
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run a processing pass, optionally repeating forever.
    Process {
        /// Repeat with this interval (e.g. 5m, 1h30m); one pass when absent.
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    /// Serve the HTTP API and keep processing in the background.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8000")]
        bind: SocketAddr,
    },
    /// List the voices a TTS provider offers.
    Voices { provider: String },
}

struct Components {
    store: Arc<dyn RecordStore>,
    pipeline: Arc<Pipeline>,
    speech: Arc<SpeechRouter>,
}

/// Wire up storage and providers, failing fast when a credential the
/// selected configuration needs is absent.
async fn build_components(cli: &Cli, credentials: &Credentials) -> anyhow::Result<Components> {
    let store = create_store(&cli.storage, &cli.db).await?;
    info!("💾 Storage initialized (using {})", cli.storage);

    let settings = store.ensure_default_settings().await?;
    let summarizer_key = credentials.require_summarizer()?.to_string();
    credentials.require_tts(settings.tts_provider)?;

    let speech = Arc::new(SpeechRouter::from_credentials(credentials));
    let pipeline = Arc::new(Pipeline::new(
        store.clone(),
        Arc::new(RssFetcher::new()),
        Arc::new(HtmlExtractor::new()),
        Arc::new(OpenRouterSummarizer::new(summarizer_key)),
        speech.clone(),
        cli.output.clone(),
    ));
    info!("🧠 Providers initialized (TTS via {})", settings.tts_provider);

    Ok(Components {
        store,
        pipeline,
        speech,
    })
}

async fn run_pass_logged(pipeline: &Pipeline) {
    match pipeline.run_pass().await {
        Ok(enriched) => info!("✅ Pass complete, {} articles enriched", enriched),
        Err(err) => error!("⚠️ Processing pass failed: {}", err),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    let cli = Cli::parse();
    let credentials = Credentials::from_env();

    match &cli.command {
        Commands::Process { interval } => {
            let components = build_components(&cli, &credentials).await?;
            match interval {
                Some(interval) => loop {
                    run_pass_logged(&components.pipeline).await;
                    info!("⏲️ Waiting {}s before next pass", interval.0.as_secs());
                    tokio::time::sleep(interval.0).await;
                },
                None => {
                    let enriched = components.pipeline.run_pass().await?;
                    info!("✅ Pass complete, {} articles enriched", enriched);
                }
            }
        }
        Commands::Serve { bind } => {
            let components = build_components(&cli, &credentials).await?;
            let settings = components.store.ensure_default_settings().await?;
            let interval = Duration::from_secs(settings.process_interval);

            let pipeline = components.pipeline.clone();
            tokio::spawn(async move {
                loop {
                    run_pass_logged(&pipeline).await;
                    tokio::time::sleep(interval).await;
                }
            });

            let state = AppState {
                store: components.store,
                pipeline: components.pipeline,
                speech: components.speech,
                audio_dir: cli.output.clone(),
            };
            nn_web::serve(state, *bind).await?;
        }
        Commands::Voices { provider } => {
            let provider: TtsProvider = provider.parse()?;
            let speech = SpeechRouter::from_credentials(&credentials);
            for voice in speech.provider(provider)?.voices().await? {
                println!("{}\t{}", voice.id, voice.name);
            }
        }
    }

    Ok(())
}
