use hindsight_core::transport::{ChatTransport, DeliveryError};
use hindsight_types::content::AttachmentKind;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// HTTP client for the transport bridge's send API.
///
/// The bridge owns the actual chat-platform session; this client only asks
/// it to deliver notifications. A 403 from the bridge means the recipient's
/// settings refused that particular send.
pub struct GatewayTransport {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Serialize)]
struct TextPayload<'a> {
    recipient: i64,
    body: &'a str,
    reply_to: Option<i64>,
}

#[derive(Serialize)]
struct AttachmentPayload<'a> {
    recipient: i64,
    kind: &'static str,
    attachment: &'a str,
    caption: Option<&'a str>,
    reply_to: Option<i64>,
}

#[derive(Serialize)]
struct ComparisonItem<'a> {
    kind: &'static str,
    attachment: &'a str,
}

#[derive(Serialize)]
struct ComparisonPayload<'a> {
    recipient: i64,
    items: Vec<ComparisonItem<'a>>,
    caption: &'a str,
}

#[derive(Deserialize)]
struct SentMessage {
    message_id: i64,
}

impl GatewayTransport {
    pub fn new(base_url: String, token: Option<String>) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    async fn post<B: Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, DeliveryError> {
        let mut request = self
            .client
            .post(format!("{}{path}", self.base_url))
            .json(body);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;

        if response.status() == StatusCode::FORBIDDEN {
            let reason = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Rejected(reason));
        }

        response
            .error_for_status()
            .map_err(|e| DeliveryError::Transport(e.to_string()))
    }
}

impl ChatTransport for GatewayTransport {
    async fn send_text(
        &self,
        recipient: i64,
        body: &str,
        reply_to: Option<i64>,
    ) -> Result<i64, DeliveryError> {
        let response = self
            .post(
                "/send_text",
                &TextPayload {
                    recipient,
                    body,
                    reply_to,
                },
            )
            .await?;
        let sent: SentMessage = response
            .json()
            .await
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(sent.message_id)
    }

    async fn send_attachment(
        &self,
        recipient: i64,
        kind: AttachmentKind,
        attachment: &str,
        caption: Option<&str>,
        reply_to: Option<i64>,
    ) -> Result<(), DeliveryError> {
        self.post(
            "/send_attachment",
            &AttachmentPayload {
                recipient,
                kind: kind.as_str(),
                attachment,
                caption,
                reply_to,
            },
        )
        .await?;
        Ok(())
    }

    async fn send_comparison_group(
        &self,
        recipient: i64,
        items: &[(AttachmentKind, String)],
        caption: &str,
    ) -> Result<(), DeliveryError> {
        let items = items
            .iter()
            .map(|(kind, attachment)| ComparisonItem {
                kind: kind.as_str(),
                attachment,
            })
            .collect();
        self.post(
            "/send_comparison_group",
            &ComparisonPayload {
                recipient,
                items,
                caption,
            },
        )
        .await?;
        Ok(())
    }
}
