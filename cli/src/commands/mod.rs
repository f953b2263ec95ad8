//! Command implementations for the clubpage CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod documents;
pub mod events;
pub mod gateway;
pub mod links;
pub mod notices;
pub mod reorder;

use anyhow::Result;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use uuid::Uuid;

/// Common error type for HTTP requests.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },
}

/// Connection settings shared by every command.
#[derive(Debug, Clone)]
pub struct Context {
    pub client: reqwest::Client,
    pub url: String,
    pub human: bool,
}

impl Context {
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.url.trim_end_matches('/'), path)
    }
}

/// Build an HTTP client with a Bearer token or, against a dev server, an
/// `X-User-Id` header.
pub fn build_client(token: Option<&str>, dev_user: Option<Uuid>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();

    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| anyhow::anyhow!("Invalid token value: {}", e))?;
        headers.insert(AUTHORIZATION, value);
    } else if let Some(user) = dev_user {
        headers.insert(
            HeaderName::from_static("x-user-id"),
            HeaderValue::from_str(&user.to_string())?,
        );
    }

    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

/// Pull `error.message` out of an API error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| {
            json.pointer("/error/message")
                .and_then(|v| v.as_str())
                .map(String::from)
        })
        .unwrap_or_else(|| body.to_string())
}

async fn check(response: reqwest::Response) -> Result<reqwest::Response, CliError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(CliError::Server {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Make an HTTP request and decode the JSON response.
pub async fn make_request<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CliError> {
    let response = check(request.send().await?).await?;
    Ok(response.json::<T>().await?)
}

/// Make an HTTP request whose response has no body.
pub async fn send_request(request: reqwest::RequestBuilder) -> Result<(), CliError> {
    check(request.send().await?).await?;
    Ok(())
}

/// Format a timestamp for human display.
pub fn format_timestamp(ts: &chrono::DateTime<chrono::Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Find an item by full id or unique id prefix.
pub fn resolve_id(arg: &str, ids: impl IntoIterator<Item = Uuid>) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(arg) {
        return Ok(id);
    }

    let prefix = arg.to_ascii_lowercase();
    let matches: Vec<Uuid> = ids
        .into_iter()
        .filter(|id| id.to_string().starts_with(&prefix))
        .collect();

    match matches.as_slice() {
        [id] => Ok(*id),
        [] => anyhow::bail!("No item matches '{}'", arg),
        _ => anyhow::bail!("'{}' matches {} items, use a longer prefix", arg, matches.len()),
    }
}
