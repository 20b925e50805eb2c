// photo_meta - image metadata extractor
// Prints normalized metadata for image files, or serves it over a Unix Domain Socket

use anyhow::{Context, Result};
use clap::Parser;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{UnixListener, UnixStream};
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use photo_meta::organ::{MetadataOrgan, Organ, Response, Stimulus};
use photo_meta::{Extractor, ExtractorConfig, ImageMetadata, TagBag};

/// Largest request frame accepted on the socket
const MAX_FRAME_BYTES: usize = 64 * 1024 * 1024;

#[derive(Parser)]
#[command(name = "photo_meta", version, about = "Extract normalized photo metadata and GPS")]
struct Args {
    /// Image files to extract
    files: Vec<PathBuf>,

    /// JSON config file (ExtractorConfig)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Decode timeout per file in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Files decoded concurrently
    #[arg(long)]
    concurrency: Option<usize>,

    /// Pretty-print JSON output
    #[arg(long)]
    pretty: bool,

    /// Resolve a JSON tag dump instead of decoding images
    #[arg(long, value_name = "JSON_FILE")]
    tags: Option<PathBuf>,

    /// Serve requests on this Unix socket path
    #[arg(long, value_name = "SOCKET")]
    serve: Option<PathBuf>,
}

impl Args {
    fn extractor_config(&self) -> Result<ExtractorConfig> {
        let mut config = match &self.config {
            Some(path) => ExtractorConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ExtractorConfig::default(),
        };
        if let Some(ms) = self.timeout_ms {
            config.decode_timeout_ms = ms;
        }
        if let Some(n) = self.concurrency {
            config.max_concurrency = n;
        }
        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so stdout stays valid JSON
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = args.extractor_config()?;

    if let Some(socket) = &args.serve {
        return serve(socket, MetadataOrgan::with_config(config)).await;
    }

    let output = if let Some(tags_path) = &args.tags {
        resolve_dump(tags_path).await?
    } else {
        if args.files.is_empty() {
            anyhow::bail!("No input files given (pass paths, --tags or --serve)");
        }
        extract_files(Extractor::new(config), &args.files).await?
    };

    let text = if args.pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{}", text);
    Ok(())
}

async fn extract_files(extractor: Extractor, files: &[PathBuf]) -> Result<serde_json::Value> {
    let items = files
        .iter()
        .map(|p| (p.display().to_string(), p.clone()))
        .collect();
    let results: BTreeMap<String, ImageMetadata> = extractor.extract_batch(items).await.into_iter().collect();
    Ok(serde_json::to_value(results)?)
}

async fn resolve_dump(path: &Path) -> Result<serde_json::Value> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).context("Tag dump is not valid JSON")?;
    let bag = TagBag::from_json(&value).context("Tag dump must be a JSON object")?;
    let file_name = photo_meta::extractor::display_name(path);
    Ok(serde_json::to_value(ImageMetadata::from_tags(&file_name, &bag))?)
}

async fn serve(socket: &Path, organ: MetadataOrgan) -> Result<()> {
    info!("Starting photo_meta server");

    let start_time = std::time::Instant::now();
    let organ = Arc::new(organ);

    // Remove old socket if exists
    if socket.exists() {
        std::fs::remove_file(socket).context("Failed to remove old socket")?;
    }

    let listener = UnixListener::bind(socket).context("Failed to bind Unix socket")?;
    info!("Listening on {}", socket.display());

    loop {
        match listener.accept().await {
            Ok((stream, _addr)) => {
                let organ = Arc::clone(&organ);
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(stream, organ, start_time).await {
                        error!("Connection error: {}", e);
                    }
                });
            }
            Err(e) => {
                error!("Accept error: {}", e);
            }
        }
    }
}

/// Handle a single UDS connection: 4-byte big-endian length, then JSON.
async fn handle_connection(
    mut stream: UnixStream,
    organ: Arc<MetadataOrgan>,
    start_time: std::time::Instant,
) -> Result<()> {
    let mut buffer = vec![0u8; 65536];

    loop {
        let mut len_buf = [0u8; 4];
        match stream.read_exact(&mut len_buf).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                debug!("Client disconnected");
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        }

        let len = u32::from_be_bytes(len_buf) as usize;
        if len > MAX_FRAME_BYTES {
            anyhow::bail!("Request frame too large: {} bytes", len);
        }
        if len > buffer.len() {
            buffer.resize(len, 0);
        }
        stream.read_exact(&mut buffer[..len]).await?;

        let response = match serde_json::from_slice::<Stimulus>(&buffer[..len]) {
            Ok(stimulus) => {
                debug!("Received: op={}", stimulus.op);
                if stimulus.op == "health" || stimulus.op == "health.check" {
                    Response {
                        ok: true,
                        output: serde_json::json!({
                            "status": "healthy",
                            "organ": "photo_meta",
                            "version": env!("CARGO_PKG_VERSION"),
                            "uptime_ms": start_time.elapsed().as_millis() as u64,
                        }),
                        latency_ms: 0,
                        cost: None,
                    }
                } else {
                    match organ.stimulate(stimulus).await {
                        Ok(resp) => resp,
                        Err(e) => {
                            error!("Stimulate error: {}", e);
                            error_response(e.to_string())
                        }
                    }
                }
            }
            Err(e) => error_response(format!("Failed to parse stimulus: {}", e)),
        };

        let response_bytes = serde_json::to_vec(&response).context("Failed to serialize response")?;

        let len_bytes = (response_bytes.len() as u32).to_be_bytes();
        stream.write_all(&len_bytes).await?;
        stream.write_all(&response_bytes).await?;
        stream.flush().await?;

        debug!("Sent: ok={}, latency={}ms", response.ok, response.latency_ms);
    }
}

fn error_response(message: String) -> Response {
    Response {
        ok: false,
        output: serde_json::json!({ "error": message }),
        latency_ms: 0,
        cost: None,
    }
}
