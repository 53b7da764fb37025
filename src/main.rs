use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

use pawtale_engine::{
    EventGenerator, GameConfig, Illustrator, NarrationConfig, NarrationService, Narrator, PetGame,
};
use pawtale_llm::{LlmProvider, OpenAiClient, OpenAiConfig, ReliableConfig, ReliableProvider};
use pawtale_settings::PawtaleSettings;
use pawtale_store::SessionStore;
use pawtale_telemetry::{init_telemetry, TelemetryConfig};

/// A virtual pet whose adventures are written by a language model.
#[derive(Debug, Parser)]
#[command(name = "pawtale", version)]
struct Args {
    /// Settings file (defaults to ~/.pawtale/settings.json).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Port to listen on.
    #[arg(long)]
    port: Option<u16>,

    /// Directory for session records and cached audio.
    #[arg(long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = match &args.config {
        Some(path) => pawtale_settings::load_settings_from_path(path),
        None => pawtale_settings::load_settings(),
    }
    .context("failed to load settings")?;
    if let Some(port) = args.port {
        settings.server.port = port;
    }
    if let Some(dir) = &args.data_dir {
        settings.storage.data_dir = Some(dir.display().to_string());
    }

    let telemetry = TelemetryConfig::from_level(&settings.telemetry.level, settings.telemetry.json)?;
    init_telemetry(&telemetry)?;

    tracing::info!("Starting pawtale");

    let game = build_game(&settings)?;
    let server_config = pawtale_server::ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
        request_timeout_secs: settings.server.request_timeout_secs,
        audio_dir: settings.storage.audio_dir(),
        assets_dir: settings.storage.assets_dir(),
    };
    let handle = pawtale_server::start(server_config, Arc::new(game))
        .await
        .context("failed to start server")?;

    tracing::info!(
        url = %format!("http://{}:{}", settings.server.host, handle.port),
        "pawtale ready"
    );

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result.context("failed to listen for ctrl+c")?;
            tracing::info!("Shutting down");
        }
        () = handle.wait() => {
            tracing::warn!("server exited");
        }
    }
    Ok(())
}

fn openai_config(settings: &PawtaleSettings) -> OpenAiConfig {
    let api_key = pawtale_settings::api_key_from_env();
    if api_key.is_none() {
        tracing::warn!(
            env = pawtale_settings::API_KEY_ENV,
            "no API key; stories fall back to canned events"
        );
    }
    OpenAiConfig {
        base_url: settings.llm.base_url.clone(),
        api_key,
        model: settings.llm.model.clone(),
        temperature: settings.llm.temperature,
        timeout: Duration::from_secs(settings.llm.timeout_secs),
        speech_model: settings.speech.model.clone(),
        image_model: settings.image.model.clone(),
        image_size: settings.image.size.clone(),
    }
}

fn build_game(settings: &PawtaleSettings) -> anyhow::Result<PetGame> {
    let config = openai_config(settings);
    let retry = ReliableConfig {
        max_attempts: settings.llm.retry.max_attempts,
        base_delay: Duration::from_millis(settings.llm.retry.base_delay_ms),
        max_delay: Duration::from_millis(settings.llm.retry.max_delay_ms),
    };
    let llm: Arc<dyn LlmProvider> = Arc::new(ReliableProvider::new(
        OpenAiClient::new(config.clone())?,
        retry,
    ));
    let media = Arc::new(OpenAiClient::new(config)?);

    let game_config = GameConfig {
        trigger: settings.game.trigger.clone(),
        summary_threshold: settings.game.summary_threshold,
        history_cap: settings.game.history_cap,
        title_every: settings.game.title_every,
    };
    let store = SessionStore::new(settings.storage.sessions_dir());
    tracing::info!(dir = %store.dir().display(), "session store ready");

    let mut game = PetGame::new(store, EventGenerator::new(llm.clone()), game_config);
    if settings.image.enabled {
        game = game.with_illustrator(Illustrator::new(media.clone()));
    }
    if settings.speech.enabled {
        let narration = NarrationConfig {
            audio_dir: settings.storage.audio_dir(),
            default_voice: settings.speech.default_voice.clone(),
            max_chars: settings.speech.max_chars,
            wait_timeout: Duration::from_secs(settings.speech.wait_timeout_secs),
        };
        game = game.with_narration(NarrationService::new(Narrator::new(
            media,
            Some(llm),
            narration,
        )));
    }
    Ok(game)
}
