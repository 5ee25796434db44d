//! Configuration types for HTML-to-XHTML conversion.
//!
//! Where the service lives and how it is asked to format its output are kept
//! apart: [`ServiceConfig`] holds the endpoint, headers and timeout, while
//! [`ConversionOptions`] holds the query parameters understood by the
//! html2xhtml CGI. Both are built through [`ServiceConfigBuilder`], which
//! validates every value against the ranges the service itself accepts.
//!
//! The defaults reproduce the public html2xhtml deployment, so
//! `ServiceConfig::default()` works out of the box; tests point the same
//! structure at a local mock.

use crate::error::Html2XhtmlError;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Host of the public html2xhtml deployment.
pub const DEFAULT_HOST: &str = "www.it.uc3m.es";
/// Port of the public html2xhtml deployment.
pub const DEFAULT_PORT: u16 = 80;
/// CGI path of the public html2xhtml deployment.
pub const DEFAULT_PATH: &str = "/jaf/cgi-bin/html2xhtml.cgi";
/// `Content-Type` sent with the HTML body.
pub const DEFAULT_CONTENT_TYPE: &str = "text/html";
/// `Accept` header asking for an XHTML response.
pub const DEFAULT_ACCEPT: &str = "application/xhtml+xml";

/// Largest tab length the service accepts.
pub const MAX_TAB_LENGTH: u8 = 16;
/// Smallest line length the service accepts.
pub const MIN_LINE_LENGTH: u32 = 40;

/// Where and how to reach the conversion service.
///
/// Built via [`ServiceConfig::builder()`] or using [`ServiceConfig::default()`].
///
/// # Example
/// ```rust
/// use html2xhtml_client::ServiceConfig;
///
/// let config = ServiceConfig::builder()
///     .host("localhost")
///     .port(8080)
///     .line_length(120)
///     .build()
///     .unwrap();
/// assert_eq!(
///     config.endpoint_url().unwrap().as_str(),
///     "http://localhost:8080/jaf/cgi-bin/html2xhtml.cgi?tablength=4&linelength=120&output-charset=UTF-8"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Host name or IP address of the service. Default: `www.it.uc3m.es`.
    pub host: String,

    /// TCP port. Default: 80.
    pub port: u16,

    /// Path of the conversion CGI, starting with `/`.
    pub path: String,

    /// `Content-Type` of the request body. Default: `text/html`.
    ///
    /// The service also accepts `application/xhtml+xml`; anything else is
    /// answered with `400 Bad request`.
    pub content_type: String,

    /// `Accept` header. Default: `application/xhtml+xml`.
    pub accept: String,

    /// Whole-request timeout in seconds. Default: `None` (wait forever).
    pub timeout_secs: Option<u64>,

    /// Formatting parameters sent in the query string.
    pub options: ConversionOptions,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            path: DEFAULT_PATH.to_string(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
            timeout_secs: None,
            options: ConversionOptions::default(),
        }
    }
}

impl ServiceConfig {
    /// Create a new builder for `ServiceConfig`.
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder {
            config: Self::default(),
        }
    }

    /// Full request URL: `http://host:port/path?query`.
    ///
    /// The default port 80 is elided from the rendered URL.
    /// An IPv6 literal such as `::1` may be given with or without brackets.
    pub fn endpoint_url(&self) -> Result<Url, Html2XhtmlError> {
        let invalid_host = |why: String| {
            Html2XhtmlError::InvalidConfig(format!("invalid host '{}': {}", self.host, why))
        };

        if let Some(c) = self
            .host
            .chars()
            .find(|c| matches!(c, '/' | '?' | '#' | '@' | '\\') || c.is_whitespace())
        {
            return Err(invalid_host(format!("'{c}' is not allowed in a host name")));
        }

        let host = if self.host.contains(':') && !self.host.starts_with('[') {
            format!("[{}]", self.host)
        } else {
            self.host.clone()
        };
        let base = format!("http://{}:{}", host, self.port);
        let mut url = Url::parse(&base).map_err(|e| invalid_host(e.to_string()))?;

        // The parser must have taken the whole string as the host. IP
        // literals and IDNs are normalised by the parser, so only plain
        // ASCII names are compared.
        let normalised = host.starts_with('[') || !host.is_ascii() || host.parse::<Ipv4Addr>().is_ok();
        if !normalised
            && !url
                .host_str()
                .is_some_and(|parsed| parsed.eq_ignore_ascii_case(&host))
        {
            return Err(invalid_host(format!(
                "parsed as '{}'",
                url.host_str().unwrap_or_default()
            )));
        }

        url.set_path(&self.path);
        {
            let mut query = url.query_pairs_mut();
            for (name, value) in self.options.query_pairs() {
                query.append_pair(name, &value);
            }
        }
        Ok(url)
    }

    fn validate(&self) -> Result<(), Html2XhtmlError> {
        if self.host.trim().is_empty() {
            return Err(Html2XhtmlError::InvalidConfig("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(Html2XhtmlError::InvalidConfig("port must be 1–65535".into()));
        }
        if !self.path.starts_with('/') {
            return Err(Html2XhtmlError::InvalidConfig(format!(
                "path must start with '/', got '{}'",
                self.path
            )));
        }
        if self.content_type.trim().is_empty() || self.accept.trim().is_empty() {
            return Err(Html2XhtmlError::InvalidConfig(
                "Content-Type and Accept headers must not be empty".into(),
            ));
        }
        if self.timeout_secs == Some(0) {
            return Err(Html2XhtmlError::InvalidConfig(
                "timeout must be at least 1 second".into(),
            ));
        }
        self.options.validate()?;
        // Catch hosts the URL parser rejects before any request is attempted.
        self.endpoint_url().map(|_| ())
    }
}

/// Builder for [`ServiceConfig`].
#[derive(Debug)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.path = path.into();
        self
    }

    pub fn content_type(mut self, content_type: impl Into<String>) -> Self {
        self.config.content_type = content_type.into();
        self
    }

    pub fn accept(mut self, accept: impl Into<String>) -> Self {
        self.config.accept = accept.into();
        self
    }

    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.config.timeout_secs = Some(secs);
        self
    }

    pub fn options(mut self, options: ConversionOptions) -> Self {
        self.config.options = options;
        self
    }

    pub fn tab_length(mut self, n: u8) -> Self {
        self.config.options.tab_length = n;
        self
    }

    pub fn line_length(mut self, n: u32) -> Self {
        self.config.options.line_length = n;
        self
    }

    pub fn output_charset(mut self, charset: impl Into<String>) -> Self {
        self.config.options.output_charset = charset.into();
        self
    }

    pub fn input_charset(mut self, charset: impl Into<String>) -> Self {
        self.config.options.input_charset = Some(charset.into());
        self
    }

    pub fn doctype(mut self, key: impl Into<String>) -> Self {
        self.config.options.doctype = Some(key.into());
        self
    }

    pub fn dos_eol(mut self, v: bool) -> Self {
        self.config.options.dos_eol = v;
        self
    }

    pub fn protect_cdata(mut self, v: bool) -> Self {
        self.config.options.protect_cdata = v;
        self
    }

    pub fn empty_elm_tags_always(mut self, v: bool) -> Self {
        self.config.options.empty_elm_tags_always = v;
        self
    }

    pub fn compact_block_elements(mut self, v: bool) -> Self {
        self.config.options.compact_block_elements = v;
        self
    }

    pub fn preserve_space_comments(mut self, v: bool) -> Self {
        self.config.options.preserve_space_comments = v;
        self
    }

    pub fn compact_empty_elem_tags(mut self, v: bool) -> Self {
        self.config.options.compact_empty_elem_tags = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServiceConfig, Html2XhtmlError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Formatting parameters understood by the html2xhtml CGI.
///
/// Only `tablength`, `linelength` and `output-charset` are always sent.
/// The remaining parameters are appended when they differ from the
/// service's own defaults, so a default configuration yields exactly
/// `tablength=4&linelength=100&output-charset=UTF-8`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConversionOptions {
    /// Spaces per indentation level, 0–16. Default: 4.
    pub tab_length: u8,

    /// Target line width of the output, at least 40. Default: 100.
    pub line_length: u32,

    /// Character set of the output document. Default: `UTF-8`.
    /// `auto` keeps the input charset.
    pub output_charset: String,

    /// Character set of the input document; `auto` or `None` lets the
    /// service detect it.
    pub input_charset: Option<String>,

    /// Target document type key (e.g. `transitional`, `strict`).
    /// `None` lets the service pick the closest match.
    pub doctype: Option<String>,

    /// Emit CRLF line endings.
    pub dos_eol: bool,

    /// Wrap `<script>`/`<style>` contents in CDATA sections. Default: true.
    pub protect_cdata: bool,

    /// Write `<x></x>` style tags even for elements declared EMPTY.
    pub empty_elm_tags_always: bool,

    /// Do not break lines between consecutive block elements.
    pub compact_block_elements: bool,

    /// Keep whitespace inside comments untouched.
    pub preserve_space_comments: bool,

    /// Write `<br/>` instead of `<br />`.
    pub compact_empty_elem_tags: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            tab_length: 4,
            line_length: 100,
            output_charset: "UTF-8".to_string(),
            input_charset: None,
            doctype: None,
            dos_eol: false,
            protect_cdata: true,
            empty_elm_tags_always: false,
            compact_block_elements: false,
            preserve_space_comments: false,
            compact_empty_elem_tags: false,
        }
    }
}

impl ConversionOptions {
    /// Query parameters in wire order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("tablength", self.tab_length.to_string()),
            ("linelength", self.line_length.to_string()),
            ("output-charset", self.output_charset.clone()),
        ];

        if let Some(ref cs) = self.input_charset {
            pairs.push(("input-charset", cs.clone()));
        }
        if let Some(ref dt) = self.doctype {
            pairs.push(("type", dt.clone()));
        }

        let flags = [
            ("dos-eol", self.dos_eol),
            ("no-protect-cdata", !self.protect_cdata),
            ("empty-elm-tags-always", self.empty_elm_tags_always),
            ("compact-block-elements", self.compact_block_elements),
            ("preserve-space-comments", self.preserve_space_comments),
            ("compact-empty-elem-tags", self.compact_empty_elem_tags),
        ];
        pairs.extend(
            flags
                .into_iter()
                .filter(|(_, on)| *on)
                .map(|(name, _)| (name, "1".to_string())),
        );

        pairs
    }

    fn validate(&self) -> Result<(), Html2XhtmlError> {
        if self.tab_length > MAX_TAB_LENGTH {
            return Err(Html2XhtmlError::InvalidConfig(format!(
                "tab length must be 0–{}, got {}",
                MAX_TAB_LENGTH, self.tab_length
            )));
        }
        if self.line_length < MIN_LINE_LENGTH {
            return Err(Html2XhtmlError::InvalidConfig(format!(
                "line length must be ≥ {}, got {}",
                MIN_LINE_LENGTH, self.line_length
            )));
        }
        if self.output_charset.trim().is_empty() {
            return Err(Html2XhtmlError::InvalidConfig(
                "output charset must not be empty".into(),
            ));
        }
        if matches!(self.input_charset.as_deref(), Some(cs) if cs.trim().is_empty()) {
            return Err(Html2XhtmlError::InvalidConfig(
                "input charset must not be empty".into(),
            ));
        }
        if matches!(self.doctype.as_deref(), Some(dt) if dt.trim().is_empty()) {
            return Err(Html2XhtmlError::InvalidConfig(
                "doctype must not be empty".into(),
            ));
        }
        Ok(())
    }
}
