//! HTTP client for pushing announcements into a running herald.

use crate::objects::{NewPoolAnnouncement, WebhookAck, WinnerAnnouncement};
use reqwest::StatusCode;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("api error {status}: {body}")]
    Api { status: StatusCode, body: String },
    #[error("url error: {0}")]
    Url(#[from] url::ParseError),
}

pub struct HeraldClient {
    base_url: Url,
    http: reqwest::Client,
}

impl HeraldClient {
    pub fn new(base_url: Url) -> Self {
        HeraldClient {
            base_url,
            http: reqwest::Client::new(),
        }
    }

    pub async fn announce_winner(
        &self,
        body: &WinnerAnnouncement,
    ) -> Result<WebhookAck, ClientError> {
        self.post("webhook/winner", body).await
    }

    pub async fn announce_new_pool(
        &self,
        body: &NewPoolAnnouncement,
    ) -> Result<WebhookAck, ClientError> {
        self.post("webhook/new_pool", body).await
    }

    async fn post<T: serde::Serialize>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<WebhookAck, ClientError> {
        let url = self.base_url.join(path)?;
        let response = self.http.post(url).json(payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }
        Ok(response.json().await?)
    }
}
