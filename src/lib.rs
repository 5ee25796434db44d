//! # html2xhtml-client
//!
//! Convert HTML documents to XHTML through the html2xhtml web service.
//!
//! The conversion itself happens remotely. This crate reads the document,
//! POSTs it to the service with the formatting options encoded in the query
//! string, and hands back the converted XHTML or a typed error.
//!
//! ## Request Flow
//!
//! ```text
//! HTML file
//!  │
//!  ├─ 1. Input    read the file (or stdin) into memory, no validation
//!  ├─ 2. Request  POST http://<host>:<port><path>?tablength=4&linelength=100&output-charset=UTF-8
//!  │               Content-Type: text/html
//!  │               Accept: application/xhtml+xml
//!  ├─ 3. Response 200 → XHTML body; anything else → ServiceError
//!  └─ 4. Close    connection released on every path
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use html2xhtml_client::{convert, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::default();
//!     let output = convert("page.html", &config).await?;
//!     println!("{}", output.text());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `html2xhtml` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod input;
pub mod output;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionOptions, ServiceConfig, ServiceConfigBuilder};
pub use convert::{convert, convert_bytes, convert_source, convert_sync, convert_to_file};
pub use error::{ErrorCategory, Html2XhtmlError};
pub use input::InputSource;
pub use output::{ConversionOutput, ConversionStats};
