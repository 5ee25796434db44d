//! Result types returned by a successful conversion.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static CHARSET_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)charset\s*=\s*"?([^";\s]+)"?"#).unwrap());

/// The converted document plus a little metadata about the exchange.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionOutput {
    /// Response body exactly as received, in the charset the service chose.
    #[serde(serialize_with = "serialize_lossy")]
    pub xhtml: Vec<u8>,

    /// `Content-Type` header of the response, if any.
    pub content_type: Option<String>,

    pub stats: ConversionStats,
}

impl ConversionOutput {
    /// Charset declared in the response `Content-Type`, e.g. `UTF-8`.
    pub fn charset(&self) -> Option<&str> {
        self.content_type
            .as_deref()
            .and_then(charset_from_content_type)
    }

    /// Body decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.xhtml).into_owned()
    }
}

/// Sizes and timing of one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConversionStats {
    /// Bytes sent as the request body.
    pub input_bytes: usize,
    /// Bytes received in the response body.
    pub output_bytes: usize,
    /// Wall-clock time from send to fully-read body.
    pub duration_ms: u64,
}

/// Extract the `charset` parameter from a `Content-Type` value.
pub fn charset_from_content_type(content_type: &str) -> Option<&str> {
    CHARSET_RE
        .captures(content_type)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

fn serialize_lossy<S: serde::Serializer>(bytes: &[u8], s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&String::from_utf8_lossy(bytes))
}
