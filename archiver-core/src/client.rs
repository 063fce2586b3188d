//! Thin wrapper around one shared [`reqwest::Client`] configured for a
//! single Medusa instance.
//!
//! Every helper maps failures into [`ArchiverError`]: transport problems
//! become `Transport`, non-2xx answers become `Server` (carrying the status
//! code and a snippet of the body) and undecodable JSON becomes `Decode`.
//! URLs that end up in errors or logs have the API key masked, since the
//! legacy API carries it in the path.

use std::fmt;

use archiver_config::{HttpConfig, TargetConfig};
use reqwest::{Client, Method, Request, Response, Url};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::error::{ArchiverError, Result};

const API_KEY_HEADER: &str = "x-api-key";
const BODY_SNIPPET_LEN: usize = 512;
const REDACTED: &str = "***";

/// Whether a request carries the `x-api-key` header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    ApiKey,
    Anonymous,
}

#[derive(Clone)]
pub struct MedusaClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl fmt::Debug for MedusaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MedusaClient")
            .field("base_url", &self.base_url)
            .field("has_api_key", &!self.api_key.is_empty())
            .finish()
    }
}

impl MedusaClient {
    pub fn new(target: &TargetConfig, http: &HttpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(http.timeout)
            .danger_accept_invalid_certs(http.accept_invalid_certs)
            .user_agent(concat!("medusa-archiver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(ArchiverError::ClientBuild)?;

        debug!(base_url = target.base(), "created Medusa client");

        Ok(Self {
            http: client,
            base_url: target.base().to_string(),
            api_key: target.api_key.clone(),
        })
    }

    pub(crate) fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Join `path` onto the base URL, keeping any path prefix the base has.
    pub fn build_url(&self, path: impl AsRef<str>) -> String {
        let path = path.as_ref().trim_start_matches('/');
        format!("{}/{path}", self.base_url)
    }

    /// `url` with the key segment of legacy `api/<key>/` paths masked.
    pub fn redact(&self, url: &str) -> String {
        match Url::parse(url) {
            Ok(parsed) => redact_url(&parsed),
            Err(_) => REDACTED.to_string(),
        }
    }

    /// GET `path` and return the body as text.
    pub async fn get_text(
        &self,
        path: &str,
        query: &[(&str, String)],
        auth: Auth,
    ) -> Result<String> {
        let request =
            self.prepare(Method::GET, path, query, auth, None::<&()>)?;
        let url = redact_url(request.url());
        let response = self.execute(request, &url).await?;
        response
            .text()
            .await
            .map_err(|source| transport(&url, source))
    }

    /// GET `path` and decode the body as `T`.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        auth: Auth,
    ) -> Result<T> {
        let request =
            self.prepare(Method::GET, path, query, auth, None::<&()>)?;
        let url = redact_url(request.url());
        let response = self.execute(request, &url).await?;
        let body = response
            .text()
            .await
            .map_err(|source| transport(&url, source))?;
        serde_json::from_str(&body).map_err(|err| ArchiverError::Decode {
            url,
            reason: err.to_string(),
        })
    }

    /// Send `body` as JSON with the API key; only the status code of the
    /// answer matters.
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<()> {
        let request =
            self.prepare(method, path, &[], Auth::ApiKey, Some(body))?;
        let url = redact_url(request.url());
        self.execute(request, &url).await?;
        Ok(())
    }

    fn prepare<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        auth: Auth,
        body: Option<&B>,
    ) -> Result<Request> {
        let url = self.build_url(path);
        let mut builder = self
            .http
            .request(method, &url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if auth == Auth::ApiKey {
            builder = builder.header(API_KEY_HEADER, &self.api_key);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        builder
            .build()
            .map_err(|source| transport(&self.redact(&url), source))
    }

    async fn execute(&self, request: Request, url: &str) -> Result<Response> {
        let method = request.method().clone();
        debug!(%method, url, "sending request");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|source| transport(url, source))?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .ok()
            .map(|text| snippet(&text))
            .filter(|text| !text.is_empty());

        Err(ArchiverError::Server {
            method: method.to_string(),
            url: url.to_string(),
            status: status.as_u16(),
            body,
        })
    }
}

/// Legacy API calls carry the key as the path segment after `api`; v2 routes
/// (`api/v2/...`) carry it in a header only.
fn redact_url(url: &Url) -> String {
    let Some(segments) = url.path_segments() else {
        return url.to_string();
    };
    let segments: Vec<&str> = segments.collect();
    let Some(key_idx) = segments
        .windows(2)
        .position(|pair| pair[0] == "api" && !matches!(pair[1], "" | "v2"))
        .map(|idx| idx + 1)
    else {
        return url.to_string();
    };

    let path: Vec<&str> = segments
        .iter()
        .enumerate()
        .map(|(idx, segment)| if idx == key_idx { REDACTED } else { *segment })
        .collect();
    let mut masked = url.clone();
    masked.set_path(&format!("/{}", path.join("/")));
    masked.to_string()
}

fn transport(url: &str, source: reqwest::Error) -> ArchiverError {
    ArchiverError::Transport {
        url: url.to_string(),
        source: source.without_url(),
    }
}

fn snippet(text: &str) -> String {
    let trimmed = text.trim();
    match trimmed.char_indices().nth(BODY_SNIPPET_LEN) {
        Some((idx, _)) => format!("{}…", &trimmed[..idx]),
        None => trimmed.to_string(),
    }
}
