// Hanzi practice command line interface
// Character insights, pronunciation, PCM decoding and an interactive practice console

mod console;
mod widget;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use hanzi_core::{ScriptVariant, TableConverter};
use hanzi_llm::{InsightCache, InsightService};
use hanzi_session::{AppConfig, PracticeSession, ResolvedWidget, WidgetRole};
use hanzi_spk::playback::{read_audio_file, write_wav};
use hanzi_spk::{AudioSink, PlaybackOrchestrator, PronounceOutcome, SpeechBackend, WavFileSink};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use console::PracticeConsole;
use widget::TerminalWidget;

#[derive(Parser)]
#[command(name = "hanzi")]
#[command(about = "Chinese character practice: insights, pronunciation and stroke order", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to <config dir>/hanzi/config.toml)
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch linguistic details for a character
    Insight {
        character: String,

        /// Ask for Traditional (Taiwan) framing
        #[arg(long, short)]
        traditional: bool,

        /// Print the raw JSON record
        #[arg(long)]
        json: bool,
    },

    /// Pronounce a character
    Speak {
        character: String,

        /// Use the platform speech engine instead of the cloud
        #[arg(long)]
        local: bool,

        #[arg(long, short)]
        traditional: bool,

        /// Write cloud audio to a WAV file instead of playing it
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Decode 16-bit PCM (raw or WAV) and report its shape
    Decode {
        input: PathBuf,

        /// Sample rate for raw input
        #[arg(long, default_value = "24000")]
        rate: u32,

        /// Channel count for raw input
        #[arg(long, default_value = "1")]
        channels: u16,

        /// Re-encode as WAV
        #[arg(long, short)]
        out: Option<PathBuf>,
    },

    /// Interactive practice console
    Practice {
        /// Characters to practice (defaults to the configured text)
        text: Option<String>,

        #[arg(long, short)]
        traditional: bool,

        /// Use cloud speech
        #[arg(long)]
        cloud: bool,

        /// Loop the stroke-order demonstration for the active character
        #[arg(long)]
        demo: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(cli.config.as_deref()).context("Failed to load configuration")?;

    match cli.command {
        Commands::Insight {
            character,
            traditional,
            json,
        } => insight(&config, &character, variant_flag(traditional, &config), json).await,
        Commands::Speak {
            character,
            local,
            traditional,
            out,
        } => speak(&config, &character, variant_flag(traditional, &config), local, out).await,
        Commands::Decode {
            input,
            rate,
            channels,
            out,
        } => decode(&input, rate, channels, out),
        Commands::Practice {
            text,
            traditional,
            cloud,
            demo,
        } => practice(config, text, traditional, cloud, demo).await,
    }
}

fn variant_flag(traditional: bool, config: &AppConfig) -> ScriptVariant {
    if traditional {
        ScriptVariant::Traditional
    } else {
        config.variant
    }
}

fn load_config(path: Option<&Path>) -> hanzi_core::Result<AppConfig> {
    Ok(AppConfig::load(path)?)
}

fn insight_service(config: &AppConfig) -> hanzi_core::Result<Arc<InsightService>> {
    let service = InsightService::gemini(
        &config.insight,
        Arc::new(InsightCache::new()),
        config.credential(),
    )?;
    Ok(Arc::new(service))
}

fn speech_service(
    config: &AppConfig,
    sink: Arc<dyn AudioSink>,
) -> hanzi_core::Result<PlaybackOrchestrator> {
    Ok(PlaybackOrchestrator::from_config(
        config.speech.clone(),
        config.credential(),
        sink,
    )?)
}

fn default_sink() -> Arc<dyn AudioSink> {
    #[cfg(feature = "audio-output")]
    {
        Arc::new(hanzi_spk::DeviceSink::new())
    }
    #[cfg(not(feature = "audio-output"))]
    {
        Arc::new(hanzi_spk::NullSink)
    }
}

async fn insight(
    config: &AppConfig,
    character: &str,
    variant: ScriptVariant,
    json: bool,
) -> anyhow::Result<()> {
    let service = insight_service(config)?;
    if !service.has_credential() {
        bail!("No API key configured. Set GEMINI_API_KEY or api_key in the config file.");
    }

    let info = match service.get_insights(character, variant).await {
        Some(info) => info,
        None => bail!("No insight available for {}", character),
    };

    if json {
        let rendered: hanzi_core::Result<String> =
            serde_json::to_string_pretty(info.as_ref()).map_err(Into::into);
        println!("{}", rendered?);
    } else {
        println!("{}", console::format_insight(&info));
    }
    Ok(())
}

async fn speak(
    config: &AppConfig,
    character: &str,
    variant: ScriptVariant,
    local: bool,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    let sink: Arc<dyn AudioSink> = match out {
        Some(path) => Arc::new(WavFileSink::new(path)),
        None => default_sink(),
    };

    let orchestrator = speech_service(config, sink)?;
    orchestrator.set_backend(if local {
        SpeechBackend::Local
    } else {
        SpeechBackend::Cloud
    });
    if local {
        orchestrator.refresh_voices(variant).await;
    }

    match orchestrator.pronounce(character, variant).await {
        PronounceOutcome::Spoken => Ok(()),
        PronounceOutcome::Skipped(reason) => bail!("Nothing to pronounce ({:?})", reason),
        PronounceOutcome::Failed(failure) => bail!("{}", failure),
    }
}

fn decode(input: &Path, rate: u32, channels: u16, out: Option<PathBuf>) -> anyhow::Result<()> {
    let buffer = read_audio_file(input, rate, channels)
        .with_context(|| format!("Failed to decode {}", input.display()))?;

    let peak = buffer
        .interleaved()
        .iter()
        .fold(0.0f32, |peak, sample| peak.max(sample.abs()));

    println!("Sample rate: {} Hz", buffer.sample_rate());
    println!("Channels:    {}", buffer.channel_count());
    println!("Frames:      {}", buffer.frames());
    println!("Duration:    {:.3}s", buffer.duration().as_secs_f64());
    println!("Peak:        {:.4}", peak);

    if let Some(path) = out {
        write_wav(&path, &buffer)?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

async fn practice(
    config: AppConfig,
    text: Option<String>,
    traditional: bool,
    cloud: bool,
    demo: bool,
) -> anyhow::Result<()> {
    let variant = variant_flag(traditional, &config);
    let insights = insight_service(&config)?;

    let speech = Arc::new(speech_service(&config, default_sink())?);
    if cloud {
        speech.set_backend(SpeechBackend::Cloud);
    }
    if speech.backend() == SpeechBackend::Local {
        speech.refresh_voices(variant).await;
    }

    let session = Arc::new(PracticeSession::new(
        variant,
        insights,
        speech,
        Arc::new(TableConverter::new()),
    ));
    let text = text
        .or_else(|| config.default_text.clone())
        .unwrap_or_else(|| "永和九年".to_string());
    session.set_text(&text);
    info!("Practicing {} characters", session.len());

    let widget = Arc::new(ResolvedWidget::new(Arc::new(TerminalWidget::new())));
    let widget_config = config.widget.clone().sized_for(360, WidgetRole::Main);

    let mut console = PracticeConsole::new(
        session,
        widget,
        widget_config,
        config.demo_pause(),
        demo,
    );
    console.run().await
}
