//! CLI binary for html2xhtml-client.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ServiceConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use html2xhtml_client::convert::write_output;
use html2xhtml_client::{convert_source, Html2XhtmlError, InputSource, ServiceConfig};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert to stdout using the public service
  html2xhtml page.html

  # Convert to file
  html2xhtml page.html -o page.xhtml

  # Read from stdin, wider lines, strict doctype
  cat page.html | html2xhtml --line-length 120 --doctype strict -

  # Use a self-hosted service
  html2xhtml --host localhost --port 8080 page.html

  # Show the request URL without sending anything
  html2xhtml --print-url page.html

ENVIRONMENT VARIABLES:
  HTML2XHTML_HOST         Service host (default www.it.uc3m.es)
  HTML2XHTML_PORT         Service port (default 80)
  HTML2XHTML_PATH         CGI path (default /jaf/cgi-bin/html2xhtml.cgi)
  HTML2XHTML_TIMEOUT      Request timeout in seconds (default: none)
  RUST_LOG                Log filter, overrides -v / -q

EXIT STATUS:
  0  converted document written
  1  file, network or service error (service errors print "<status> <reason>")
"#;

/// Convert HTML to XHTML using the html2xhtml web service.
#[derive(Parser, Debug)]
#[command(
    name = "html2xhtml",
    version,
    about = "Convert HTML to XHTML using the html2xhtml web service",
    long_about = "Send an HTML document to the html2xhtml conversion service and print the \
XHTML it returns. The document is sent as-is in a single POST request; non-200 responses are \
reported on stderr as the status code and reason phrase.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// HTML file path, or `-` for stdin.
    input: String,

    /// Write XHTML to this file instead of stdout.
    #[arg(short, long, env = "HTML2XHTML_OUTPUT")]
    output: Option<PathBuf>,

    /// Service host name or address.
    #[arg(long, env = "HTML2XHTML_HOST", default_value = html2xhtml_client::config::DEFAULT_HOST)]
    host: String,

    /// Service TCP port.
    #[arg(long, env = "HTML2XHTML_PORT", default_value_t = html2xhtml_client::config::DEFAULT_PORT)]
    port: u16,

    /// Path of the conversion CGI.
    #[arg(long, env = "HTML2XHTML_PATH", default_value = html2xhtml_client::config::DEFAULT_PATH)]
    path: String,

    /// Spaces per indentation level (0–16).
    #[arg(long, env = "HTML2XHTML_TAB_LENGTH", default_value_t = 4,
          value_parser = clap::value_parser!(u8).range(0..=16))]
    tab_length: u8,

    /// Output line width (≥ 40).
    #[arg(long, env = "HTML2XHTML_LINE_LENGTH", default_value_t = 100,
          value_parser = clap::value_parser!(u32).range(40..))]
    line_length: u32,

    /// Output character set, or `auto` to keep the input's.
    #[arg(long, env = "HTML2XHTML_OUTPUT_CHARSET", default_value = "UTF-8")]
    output_charset: String,

    /// Input character set, or `auto` to let the service detect it.
    #[arg(long, env = "HTML2XHTML_INPUT_CHARSET")]
    input_charset: Option<String>,

    /// Target XHTML document type key (e.g. transitional, strict).
    #[arg(long, env = "HTML2XHTML_DOCTYPE")]
    doctype: Option<String>,

    /// Emit CRLF line endings.
    #[arg(long)]
    dos_eol: bool,

    /// Do not wrap script/style contents in CDATA sections.
    #[arg(long)]
    no_protect_cdata: bool,

    /// Write explicit end tags even for EMPTY elements.
    #[arg(long)]
    empty_elm_tags_always: bool,

    /// Do not break lines between consecutive block elements.
    #[arg(long)]
    compact_block_elements: bool,

    /// Keep whitespace inside comments untouched.
    #[arg(long)]
    preserve_space_comments: bool,

    /// Write `<br/>` instead of `<br />`.
    #[arg(long)]
    compact_empty_elem_tags: bool,

    /// Request timeout in seconds. Waits indefinitely when unset.
    #[arg(long, env = "HTML2XHTML_TIMEOUT",
          value_parser = clap::value_parser!(u64).range(1..))]
    timeout: Option<u64>,

    /// Output structured JSON (ConversionOutput) instead of raw XHTML.
    #[arg(long, env = "HTML2XHTML_JSON")]
    json: bool,

    /// Print the request URL and exit without contacting the service.
    #[arg(long)]
    print_url: bool,

    /// Disable the waiting spinner.
    #[arg(long, env = "HTML2XHTML_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "HTML2XHTML_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "HTML2XHTML_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // stdout carries the document, so logs always go to stderr.
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<Html2XhtmlError>() {
                Some(Html2XhtmlError::ServiceError { status, reason }) => {
                    eprintln!("{status} {reason}");
                }
                _ => eprintln!("Error: {err:?}"),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: &Cli) -> Result<()> {
    let config = build_config(cli)?;

    if cli.print_url {
        println!("{}", config.endpoint_url()?);
        return Ok(());
    }

    let source = InputSource::from_arg(&cli.input);

    let spinner = if !cli.quiet && !cli.no_progress && !cli.json {
        Some(waiting_spinner(&config))
    } else {
        None
    };

    let result = convert_source(&source, &config).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let output = result.context("Conversion failed")?;

    if let Some(ref output_path) = cli.output {
        write_output(output_path, &output)
            .await
            .context("Failed to write output")?;

        if !cli.quiet {
            eprintln!(
                "{}  {} → {} bytes  {}ms  →  {}",
                green("✔"),
                output.stats.input_bytes,
                output.stats.output_bytes,
                output.stats.duration_ms,
                bold(&output_path.display().to_string()),
            );
            if let Some(charset) = output.charset() {
                eprintln!("   {}", dim(&format!("charset {charset}")));
            }
        }
    } else if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else {
        // Byte-for-byte: the body may be in a non-UTF-8 output charset.
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(&output.xhtml)
            .context("Failed to write to stdout")?;
        handle.flush().context("Failed to write to stdout")?;
    }

    Ok(())
}

/// Map CLI args to `ServiceConfig`.
fn build_config(cli: &Cli) -> Result<ServiceConfig> {
    let mut builder = ServiceConfig::builder()
        .host(&cli.host)
        .port(cli.port)
        .path(&cli.path)
        .tab_length(cli.tab_length)
        .line_length(cli.line_length)
        .output_charset(&cli.output_charset)
        .dos_eol(cli.dos_eol)
        .protect_cdata(!cli.no_protect_cdata)
        .empty_elm_tags_always(cli.empty_elm_tags_always)
        .compact_block_elements(cli.compact_block_elements)
        .preserve_space_comments(cli.preserve_space_comments)
        .compact_empty_elem_tags(cli.compact_empty_elem_tags);

    if let Some(ref cs) = cli.input_charset {
        builder = builder.input_charset(cs);
    }
    if let Some(ref dt) = cli.doctype {
        builder = builder.doctype(dt);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.timeout_secs(secs);
    }

    builder.build().context("Invalid configuration")
}

/// Spinner on stderr while the request is in flight. Hidden automatically
/// when stderr is not a terminal.
fn waiting_spinner(config: &ServiceConfig) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  ⏱ {elapsed}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
    );
    bar.set_prefix("Converting");
    bar.set_message(config.host.clone());
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}
