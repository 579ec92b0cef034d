//! Slack incoming-webhook notifier.
//!
//! The webhook URL is always supplied by the caller; there is no built-in
//! default.
//!
//! # Example
//!
//! ```ignore
//! let notifier = Notifier::new()?;
//! if let Err(err) = nightly_sync() {
//!     notifier.notify("nightly sync failed", &config.slack_webhook_url, Some(&err))?;
//! }
//! ```

use std::time::Duration;

use reqwest::blocking::Client as HttpClient;
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::error::Result;

#[derive(Serialize)]
struct WebhookMessage<'a> {
    text: &'a str,
}

/// Posts plain-text messages to Slack webhooks.
#[derive(Debug, Clone)]
pub struct Notifier {
    http: HttpClient,
}

impl Notifier {
    /// Notifier on a transport without request timeout, like [`Client::new`](crate::Client::new).
    pub fn new() -> Result<Self> {
        let http = HttpClient::builder().timeout(None::<Duration>).build()?;
        Ok(Self::with_http_client(http))
    }

    pub fn with_http_client(http: HttpClient) -> Self {
        Self { http }
    }

    /// Post `text` to `webhook_url`.
    ///
    /// With `traceback`, the error's cause chain (and backtrace, when one was
    /// captured) is appended in a code block. A non-success answer from the
    /// webhook is logged and otherwise ignored; nothing is retried.
    ///
    /// # Errors
    /// Returns [`OfsError::Transport`](crate::OfsError::Transport) if the
    /// webhook cannot be reached.
    #[instrument(skip_all)]
    pub fn notify(
        &self,
        text: &str,
        webhook_url: &str,
        traceback: Option<&anyhow::Error>,
    ) -> Result<()> {
        let text = format_message(text, traceback);
        let response = self
            .http
            .post(webhook_url)
            .json(&WebhookMessage { text: &text })
            .send()?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "Notification delivered");
        } else {
            let body = response.text().unwrap_or_default();
            warn!(%status, %body, "Webhook rejected notification");
        }
        Ok(())
    }
}

/// Post one message with a throwaway [`Notifier`].
pub fn notify(text: &str, webhook_url: &str, traceback: Option<&anyhow::Error>) -> Result<()> {
    Notifier::new()?.notify(text, webhook_url, traceback)
}

fn format_message(text: &str, traceback: Option<&anyhow::Error>) -> String {
    match traceback {
        Some(err) => format!("{text}\n```{err:?}```"),
        None => text.to_string(),
    }
}
