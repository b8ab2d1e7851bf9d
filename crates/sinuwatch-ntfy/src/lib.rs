// # ntfy Notifier
//
// `Notifier` implementation publishing to an [ntfy](https://ntfy.sh) topic.
//
// The publish API is a single POST per notification: the message is the
// request body, the title and tags travel as `Title` and `Tags` headers.
// Delivery is single-shot with no retry; the engine treats notification
// failures as non-fatal and logs them.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use sinuwatch_core::traits::Notifier;
use sinuwatch_core::{Error, Result};

/// HTTP timeout for publish requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Notifier publishing to a single ntfy topic URL
///
/// The topic URL is the full publish endpoint, e.g.
/// `https://ntfy.sh/my-grades-topic`. Anyone who knows the topic name can
/// subscribe to it, so the URL is treated as a secret and kept out of
/// error messages.
#[derive(Debug, Clone)]
pub struct NtfyNotifier {
    topic_url: String,
    client: reqwest::Client,
}

impl NtfyNotifier {
    /// Create a notifier for the given topic URL
    pub fn new(topic_url: impl Into<String>) -> Result<Self> {
        let topic_url = topic_url.into();
        if topic_url.is_empty() {
            return Err(Error::config("ntfy topic URL cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::notify(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { topic_url, client })
    }
}

#[async_trait]
impl Notifier for NtfyNotifier {
    async fn notify(&self, message: &str, title: &str, tags: &[&str]) -> Result<()> {
        debug!(title, tags = tags.join(","), "publishing notification");

        let mut request = self
            .client
            .post(&self.topic_url)
            .header("Title", title)
            .body(message.to_string());
        if !tags.is_empty() {
            request = request.header("Tags", tags.join(","));
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::notify(format!("publish request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::notify(format!(
                "publish rejected with status {status}"
            )));
        }

        Ok(())
    }

    fn notifier_name(&self) -> &'static str {
        "ntfy"
    }
}
