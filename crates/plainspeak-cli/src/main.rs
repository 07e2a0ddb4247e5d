//! plainspeak CLI — reading-assistance server and client.
//!
//! ```text
//! plainspeak serve [--port 5000] [--host 127.0.0.1] [--upload-dir uploads]
//! plainspeak upload page.png [--server http://localhost:5000]
//! plainspeak health [--server ...]
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use plainspeak_lib::ocr::TesseractEngine;
use plainspeak_lib::pipeline::Pipeline;
use plainspeak_lib::plainspeak_core::types::{
    ApiKeySource, OcrConfig, ServerConfig, SimplifierConfig, TtsConfig, UPLOAD_FIELD,
};
use plainspeak_lib::simplify::ChatCompletionSimplifier;
use plainspeak_lib::storage::UploadStore;
use plainspeak_lib::tts::KokoroSynthesizer;

const DEFAULT_SERVER: &str = "http://localhost:5000";

/// plainspeak — turn scanned or typed text into simpler text and speech
#[derive(Parser)]
#[command(name = "plainspeak", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the upload server
    Serve {
        /// Listen port
        #[arg(long, env = "PLAINSPEAK_PORT", default_value = "5000")]
        port: u16,
        /// Listen host
        #[arg(long, env = "PLAINSPEAK_HOST", default_value = "127.0.0.1")]
        host: String,
        /// Where uploads and generated audio are written
        #[arg(long, env = "PLAINSPEAK_UPLOAD_DIR", default_value = "uploads")]
        upload_dir: PathBuf,
        /// Largest accepted request body, in megabytes
        #[arg(long, default_value = "16")]
        max_upload_mb: usize,
        /// Chat-completions API base URL
        #[arg(long, env = "PLAINSPEAK_API_BASE", default_value = "https://openrouter.ai/api/v1")]
        api_base: String,
        /// Model used for simplification
        #[arg(long, env = "PLAINSPEAK_MODEL", default_value = "mistralai/mistral-7b-instruct")]
        model: String,
        /// Sampling temperature
        #[arg(long, default_value = "0.7")]
        temperature: f32,
        /// Environment variable holding the API key, read on every request
        #[arg(long, default_value = "OPENROUTER_API_KEY")]
        api_key_env: String,
        /// Tesseract executable
        #[arg(long, env = "TESSERACT_CMD", default_value = "tesseract")]
        tesseract_cmd: String,
        /// Tesseract language code
        #[arg(long, default_value = "eng")]
        ocr_lang: String,
        /// Kokoro TTS server URL
        #[arg(long, env = "KOKORO_URL", default_value = "http://localhost:8880")]
        kokoro_url: String,
        /// TTS voice
        #[arg(long, default_value = "af_heart")]
        voice: String,
        /// TTS playback speed
        #[arg(long, default_value = "1.0")]
        speed: f32,
    },
    /// Upload a text file or image and print the server's reply
    Upload {
        /// File to send
        file: PathBuf,
        /// Server URL
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
    /// Check that the server is up
    Health {
        #[arg(long, default_value = DEFAULT_SERVER)]
        server: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "plainspeak_lib=debug,plainspeak=info".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve {
            port,
            host,
            upload_dir,
            max_upload_mb,
            api_base,
            model,
            temperature,
            api_key_env,
            tesseract_cmd,
            ocr_lang,
            kokoro_url,
            voice,
            speed,
        } => {
            let server = ServerConfig {
                host,
                port,
                upload_dir,
                max_upload_bytes: max_upload_mb * 1024 * 1024,
            };
            let simplifier = SimplifierConfig {
                api_base,
                model,
                temperature,
                api_key: ApiKeySource::Env(api_key_env),
            };
            let ocr = OcrConfig {
                tesseract_cmd,
                language: ocr_lang,
            };
            let tts = TtsConfig {
                kokoro_url,
                voice,
                speed,
            };
            serve(server, simplifier, ocr, tts).await?;
        }

        Command::Upload { file, server } => {
            let bytes = tokio::fs::read(&file).await?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mime = mime_guess::from_path(&file).first_or_octet_stream();

            let part = reqwest::multipart::Part::bytes(bytes)
                .file_name(file_name)
                .mime_str(mime.as_ref())?;
            let form = reqwest::multipart::Form::new().part(UPLOAD_FIELD, part);

            let resp = reqwest::Client::new()
                .post(format!("{server}/"))
                .multipart(form)
                .send()
                .await?;
            println!("{}", resp.text().await.unwrap_or_default());
        }

        Command::Health { server } => {
            let resp = reqwest::Client::new()
                .get(format!("{server}/"))
                .send()
                .await?;
            println!("{}", resp.text().await.unwrap_or_default());
        }
    }

    Ok(())
}

async fn serve(
    server: ServerConfig,
    simplifier: SimplifierConfig,
    ocr: OcrConfig,
    tts: TtsConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = UploadStore::open(&server.upload_dir).await?;
    info!(
        "model {} via {}, voice {} via {}",
        simplifier.model, simplifier.api_base, tts.voice, tts.kokoro_url
    );

    let pipeline = Pipeline::new(
        store,
        Arc::new(TesseractEngine::new(&ocr)),
        Arc::new(ChatCompletionSimplifier::new(simplifier)),
        Arc::new(KokoroSynthesizer::new(tts)),
    );
    let app = plainspeak_lib::server::router(pipeline, server.max_upload_bytes);

    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("plainspeak listening on {addr}, uploads in {}", server.upload_dir.display());

    axum::serve(listener, app).await?;
    Ok(())
}
