use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::json;

use super::errors::EmailError;
use super::sender::EmailSender;

/// Mail delivery over a provider's HTTP API (JSON POST + bearer key).
pub struct HttpEmailSender {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from: String,
}

impl HttpEmailSender {
    pub fn new(endpoint: &str, api_key: &str, from: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            from: from.to_string(),
        }
    }

    async fn post(&self, url: &str, body: serde_json::Value) -> Result<(), EmailError> {
        let resp = self.client
            .post(url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EmailError::Transport(e.to_string()))?;

        let status = resp.status();
        if status.is_success() {
            return Ok(());
        }
        let message = resp.text().await.unwrap_or_default();
        Err(EmailError::Rejected { status: status.as_u16(), message })
    }
}

#[async_trait]
impl EmailSender for HttpEmailSender {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> Result<(), EmailError> {
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "html": html_body,
        });
        self.post(&self.endpoint, body).await
    }

    async fn send_templated(
        &self,
        to: &str,
        subject: &str,
        template_id: &str,
        data: &HashMap<String, String>,
    ) -> Result<(), EmailError> {
        let body = json!({
            "from": self.from,
            "to": to,
            "subject": subject,
            "template_id": template_id,
            "data": data,
        });
        self.post(&format!("{}/templated", self.endpoint), body).await
    }
}
