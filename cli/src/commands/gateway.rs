//! HTTP order gateway and terminal notifier for the gesture driver.

use colored::Colorize;
use serde::Deserialize;

use clubpage_core::{CommitError, Confirmed, Notifier, OrderGateway, PositionUpdate, ReorderRequest};

use super::{CliError, Context, make_request};

/// Body of a successful reorder response.
#[derive(Debug, Deserialize)]
struct ReorderResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    updates: Vec<PositionUpdate>,
}

/// Sends reorder requests to the server endpoints.
pub struct HttpGateway {
    ctx: Context,
}

impl HttpGateway {
    pub fn new(ctx: Context) -> Self {
        Self { ctx }
    }

    fn path(request: &ReorderRequest) -> String {
        match request {
            ReorderRequest::Links { .. } => "/links/order".to_string(),
            ReorderRequest::Notice { id, .. } => format!("/notices/{}", id),
            ReorderRequest::Document { id, .. } => format!("/documents/{}", id),
        }
    }
}

/// Classify an HTTP failure for the gesture driver.
fn commit_error(err: CliError, request: &ReorderRequest) -> CommitError {
    match err {
        CliError::Http(e) => CommitError::Transient(e.to_string()),
        CliError::Server { status, message } => match status {
            401 | 403 => CommitError::Unauthorized(message),
            404 => match request.item_id() {
                Some(id) => CommitError::NotFound(id),
                None => CommitError::ValidationFailed(message),
            },
            400..=499 => CommitError::ValidationFailed(message),
            _ => CommitError::Transient(format!("server returned {}: {}", status, message)),
        },
    }
}

impl OrderGateway for HttpGateway {
    async fn commit(&self, request: &ReorderRequest) -> Result<Confirmed, CommitError> {
        let url = self.ctx.endpoint(&Self::path(request));
        tracing::debug!(%url, kind = %request.kind(), "Committing order");

        let response: ReorderResponse =
            make_request(self.ctx.client.put(&url).json(&request.body()))
                .await
                .map_err(|e| commit_error(e, request))?;

        if !response.success {
            return Err(CommitError::Transient(
                "server did not acknowledge the reorder".into(),
            ));
        }

        Ok(Confirmed {
            updates: response.updates,
        })
    }
}

/// Prints gesture failures to stderr.
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn error(&self, message: &str) {
        eprintln!("{} {}", "warning:".yellow().bold(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clubpage_core::LinkOrder;
    use uuid::Uuid;

    fn server(status: u16) -> CliError {
        CliError::Server {
            status,
            message: "nope".into(),
        }
    }

    #[test]
    fn test_paths() {
        let id = Uuid::nil();
        assert_eq!(
            HttpGateway::path(&ReorderRequest::Links {
                links: vec![LinkOrder { id, order: 0 }]
            }),
            "/links/order"
        );
        assert_eq!(
            HttpGateway::path(&ReorderRequest::Notice { id, sequence: 1 }),
            format!("/notices/{}", id)
        );
        assert_eq!(
            HttpGateway::path(&ReorderRequest::Document { id, order: 1 }),
            format!("/documents/{}", id)
        );
    }

    #[test]
    fn test_status_classification() {
        let id = Uuid::new_v4();
        let notice = ReorderRequest::Notice { id, sequence: 0 };

        assert_eq!(
            commit_error(server(400), &notice),
            CommitError::ValidationFailed("nope".into())
        );
        assert_eq!(
            commit_error(server(401), &notice),
            CommitError::Unauthorized("nope".into())
        );
        assert_eq!(commit_error(server(404), &notice), CommitError::NotFound(id));
        assert!(commit_error(server(503), &notice).is_retryable());
        assert!(!commit_error(server(400), &notice).is_retryable());
    }
}
