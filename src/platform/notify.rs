// PlayLens - platform/notify.rs
//
// Chat-webhook delivery of the run summary. One POST per run, no retries.

use crate::core::export::NotificationPayload;
use crate::util::error::NotifyError;
use std::time::Duration;

/// Blocking webhook client.
pub struct WebhookNotifier {
    url: String,
    http: reqwest::blocking::Client,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout_secs: u64) -> Result<Self, NotifyError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| NotifyError::Transport {
                url: url.clone(),
                source: e,
            })?;
        Ok(Self { url, http })
    }

    /// POST `payload` as JSON. Any non-2xx answer is an error.
    pub fn send(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        tracing::debug!(url = %self.url, "Sending webhook notification");
        let resp = self
            .http
            .post(&self.url)
            .json(payload)
            .send()
            .map_err(|e| NotifyError::Transport {
                url: self.url.clone(),
                source: e,
            })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(NotifyError::Rejected {
                url: self.url.clone(),
                status: status.as_u16(),
            });
        }
        tracing::info!(url = %self.url, status = status.as_u16(), "Webhook notification sent");
        Ok(())
    }
}
