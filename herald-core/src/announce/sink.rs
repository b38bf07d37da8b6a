use crate::announce::format::AnnouncementPayload;
use crate::events::Destination;
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;
use time::format_description::well_known::Rfc3339;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("webhook rejected with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

/// Delivery target for rendered announcements.
#[async_trait]
pub trait AnnouncementSink: Send + Sync {
    async fn send(
        &self,
        destination: Destination,
        payload: &AnnouncementPayload,
    ) -> Result<(), SinkError>;
}

#[async_trait]
impl<K: AnnouncementSink + ?Sized> AnnouncementSink for Arc<K> {
    async fn send(
        &self,
        destination: Destination,
        payload: &AnnouncementPayload,
    ) -> Result<(), SinkError> {
        (**self).send(destination, payload).await
    }
}

/// Posts announcements as embeds to Discord channel webhooks.
pub struct DiscordSink {
    winners_url: Url,
    new_pools_url: Url,
    http_client: Client,
}

impl DiscordSink {
    pub fn new(winners_url: Url, new_pools_url: Url) -> Result<Self, reqwest::Error> {
        let http_client = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()?;
        Ok(DiscordSink {
            winners_url,
            new_pools_url,
            http_client,
        })
    }

    fn url_for(&self, destination: Destination) -> &Url {
        match destination {
            Destination::Winners => &self.winners_url,
            Destination::NewPools => &self.new_pools_url,
        }
    }
}

#[derive(serde::Serialize)]
struct WebhookBody<'a> {
    embeds: [Embed<'a>; 1],
}

#[derive(serde::Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
    fields: Vec<EmbedField<'a>>,
    footer: EmbedFooter<'a>,
    timestamp: String,
}

#[derive(serde::Serialize)]
struct EmbedField<'a> {
    name: &'a str,
    value: &'a str,
    inline: bool,
}

#[derive(serde::Serialize)]
struct EmbedFooter<'a> {
    text: &'a str,
}

#[async_trait]
impl AnnouncementSink for DiscordSink {
    async fn send(
        &self,
        destination: Destination,
        payload: &AnnouncementPayload,
    ) -> Result<(), SinkError> {
        let body = WebhookBody {
            embeds: [Embed {
                title: &payload.title,
                description: &payload.description,
                color: payload.color,
                fields: payload
                    .fields
                    .iter()
                    .map(|f| EmbedField {
                        name: &f.name,
                        value: &f.value,
                        inline: f.inline,
                    })
                    .collect(),
                footer: EmbedFooter {
                    text: &payload.footer,
                },
                timestamp: payload
                    .occurred_at
                    .format(&Rfc3339)
                    .unwrap_or_default(),
            }],
        };
        let response = self
            .http_client
            .post(self.url_for(destination).clone())
            .json(&body)
            .send()
            .await?;
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(SinkError::Rejected { status, body });
        }
        Ok(())
    }
}
