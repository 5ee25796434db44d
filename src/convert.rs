//! Conversion entry points.
//!
//! Every entry point funnels into [`convert_bytes`], which performs exactly
//! one POST to the service and either returns the converted document or an
//! error. There is no retry and no fallback.
//!
//! ## Connection lifetime
//!
//! A fresh [`reqwest::Client`] is built for each call with an idle pool size
//! of zero, so the socket is never parked for reuse. Once the response (or
//! the error) has been produced the client is dropped, and with it the
//! connection, whether the service answered 200 or not.

use crate::config::ServiceConfig;
use crate::error::Html2XhtmlError;
use crate::input::{self, InputSource};
use crate::output::{ConversionOutput, ConversionStats};
use hyper::ext::ReasonPhrase;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::StatusCode;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Convert the HTML file at `path` to XHTML.
///
/// This is the primary entry point for the library.
///
/// # Errors
/// - File not found / permission denied / unreadable: returned before any
///   network activity
/// - Connection, DNS or transport failure
/// - [`Html2XhtmlError::ServiceError`] for any status other than 200
pub async fn convert(
    path: impl AsRef<Path>,
    config: &ServiceConfig,
) -> Result<ConversionOutput, Html2XhtmlError> {
    let path = path.as_ref();
    info!("Starting conversion: {}", path.display());

    let body = input::read_document(path).await?;
    convert_bytes(body, config).await
}

/// Convert a document from any [`InputSource`], including stdin.
pub async fn convert_source(
    source: &InputSource,
    config: &ServiceConfig,
) -> Result<ConversionOutput, Html2XhtmlError> {
    let body = source.read().await?;
    convert_bytes(body, config).await
}

/// Send an in-memory HTML document to the service.
pub async fn convert_bytes(
    body: impl Into<Vec<u8>>,
    config: &ServiceConfig,
) -> Result<ConversionOutput, Html2XhtmlError> {
    let body = body.into();
    let input_bytes = body.len();

    let url = config.endpoint_url()?;
    let url_str = url.to_string();
    let client = build_client(config)?;

    debug!("POST {} ({} bytes)", url_str, input_bytes);
    let start = Instant::now();

    let response = client
        .post(url)
        .header(CONTENT_TYPE, config.content_type.as_str())
        .header(ACCEPT, config.accept.as_str())
        .body(body)
        .send()
        .await
        .map_err(|e| transport_error(&url_str, config, e))?;

    let status = response.status();
    if status != StatusCode::OK {
        let reason = reason_phrase(&response);
        debug!("Service answered {} {} for {}", status.as_u16(), reason, url_str);
        return Err(Html2XhtmlError::ServiceError {
            status: status.as_u16(),
            reason,
        });
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    let xhtml = response
        .bytes()
        .await
        .map_err(|e| transport_error(&url_str, config, e))?
        .to_vec();

    let stats = ConversionStats {
        input_bytes,
        output_bytes: xhtml.len(),
        duration_ms: start.elapsed().as_millis() as u64,
    };

    info!(
        "Conversion complete: {} bytes in, {} bytes out, {}ms",
        stats.input_bytes, stats.output_bytes, stats.duration_ms
    );

    Ok(ConversionOutput {
        xhtml,
        content_type,
        stats,
    })
}

/// Convert and write the XHTML directly to a file.
///
/// Uses atomic write (temp file + rename) to prevent partial files.
pub async fn convert_to_file(
    path: impl AsRef<Path>,
    output_path: impl AsRef<Path>,
    config: &ServiceConfig,
) -> Result<ConversionStats, Html2XhtmlError> {
    let output = convert(path, config).await?;
    write_output(output_path.as_ref(), &output).await?;
    Ok(output.stats)
}

/// Synchronous wrapper around [`convert`].
///
/// Creates a temporary tokio runtime internally, so it must not be called
/// from inside an async context.
pub fn convert_sync(
    path: impl AsRef<Path>,
    config: &ServiceConfig,
) -> Result<ConversionOutput, Html2XhtmlError> {
    tokio::runtime::Runtime::new()
        .map_err(|e| Html2XhtmlError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert(path, config))
}

/// Write `output.xhtml` to `path` via a sibling `.tmp` file and a rename.
pub async fn write_output(path: &Path, output: &ConversionOutput) -> Result<(), Html2XhtmlError> {
    let write_err = |e: std::io::Error| Html2XhtmlError::OutputWriteFailed {
        path: path.to_path_buf(),
        source: e,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_err)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    tokio::fs::write(tmp_path, &output.xhtml)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(tmp_path, path).await.map_err(write_err)?;

    debug!("Wrote {} bytes to {}", output.xhtml.len(), path.display());
    Ok(())
}

// ── Internal helpers ─────────────────────────────────────────────────────

fn build_client(config: &ServiceConfig) -> Result<reqwest::Client, Html2XhtmlError> {
    // Always dial host:port directly; proxy environment variables are ignored.
    let mut builder = reqwest::Client::builder()
        .no_proxy()
        .pool_max_idle_per_host(0);
    if let Some(secs) = config.timeout_secs {
        builder = builder.timeout(Duration::from_secs(secs));
    }
    builder
        .build()
        .map_err(|e| Html2XhtmlError::Internal(format!("Failed to build HTTP client: {}", e)))
}

/// Reason phrase exactly as the service sent it.
///
/// hyper only records the phrase when it differs from the canonical one for
/// the status, so the canonical phrase fills in otherwise.
fn reason_phrase(response: &reqwest::Response) -> String {
    if let Some(phrase) = response.extensions().get::<ReasonPhrase>() {
        return String::from_utf8_lossy(phrase.as_bytes()).into_owned();
    }
    response
        .status()
        .canonical_reason()
        .unwrap_or("Unknown")
        .to_string()
}

/// Classify a reqwest failure into one of the network error variants.
fn transport_error(url: &str, config: &ServiceConfig, e: reqwest::Error) -> Html2XhtmlError {
    if e.is_timeout() {
        Html2XhtmlError::Timeout {
            url: url.to_string(),
            secs: config.timeout_secs.unwrap_or_default(),
        }
    } else if e.is_connect() {
        Html2XhtmlError::ConnectFailed {
            url: url.to_string(),
            reason: error_chain(&e),
        }
    } else {
        Html2XhtmlError::RequestFailed {
            url: url.to_string(),
            reason: error_chain(&e),
        }
    }
}

/// reqwest's top-level message omits the root cause; walk `source()` for it.
fn error_chain(e: &dyn std::error::Error) -> String {
    let mut msg = e.to_string();
    let mut cur = e.source();
    while let Some(inner) = cur {
        msg.push_str(": ");
        msg.push_str(&inner.to_string());
        cur = inner.source();
    }
    msg
}
