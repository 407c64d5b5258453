//! WhatsApp Cloud API (Graph) client: template listing and template sends.

use crate::config::WhatsAppConfig;
use crate::template::model::Template;
use crate::template::wire::MessageComponent;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

pub const APPROVED_STATUS: &str = "APPROVED";

#[derive(Debug, thiserror::Error)]
pub enum CloudApiError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("whatsapp api error ({status}): {body}")]
    Api { status: StatusCode, body: String },
    #[error("missing {0}")]
    MissingCredential(&'static str),
    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// One template send, addressed to a single recipient.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateMessage {
    pub to: String,
    pub name: String,
    pub language: String,
    pub components: Vec<MessageComponent>,
}

impl TemplateMessage {
    pub fn to_payload(&self) -> Value {
        let mut template = json!({
            "name": self.name,
            "language": {"code": self.language},
        });
        if !self.components.is_empty() {
            template["components"] = json!(self.components);
        }
        json!({
            "messaging_product": "whatsapp",
            "recipient_type": "individual",
            "to": format_phone_number(&self.to),
            "type": "template",
            "template": template,
        })
    }
}

#[async_trait]
pub trait TemplateSender: Send + Sync {
    /// Returns the platform message id.
    async fn send_template(&self, message: &TemplateMessage) -> Result<String, CloudApiError>;
}

#[derive(Debug, Clone)]
pub struct CloudApiClient {
    http: Client,
    config: WhatsAppConfig,
}

impl CloudApiClient {
    pub fn new(http: Client, config: WhatsAppConfig) -> Self {
        Self { http, config }
    }

    fn endpoint(&self, node: &str, edge: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.graph_url.trim_end_matches('/'),
            self.config.api_version,
            node,
            edge
        )
    }

    fn access_token(&self) -> Result<&str, CloudApiError> {
        self.config
            .access_token
            .as_deref()
            .ok_or(CloudApiError::MissingCredential("access token"))
    }

    /// Fetches every template of the configured business account, following
    /// `paging.next` up to `max_pages`.
    pub async fn list_templates(&self) -> Result<Vec<Template>, CloudApiError> {
        let token = self.access_token()?;
        let waba_id = self
            .config
            .waba_id
            .as_deref()
            .or(self.config.phone_number_id.as_deref())
            .ok_or(CloudApiError::MissingCredential("business account id"))?;

        let mut templates = Vec::new();
        let mut next = Some(self.endpoint(waba_id, "message_templates"));
        let mut first = true;
        let mut pages = 0;

        while let Some(url) = next.take() {
            if pages >= self.config.max_pages {
                warn!(pages, "template listing truncated at page limit");
                break;
            }
            let mut req = self.http.get(&url).bearer_auth(token);
            if first {
                req = req.query(&[("limit", self.config.page_size.to_string())]);
                first = false;
            }
            let resp = req.send().await?;
            let status = resp.status();
            if !status.is_success() {
                let body = resp.text().await.unwrap_or_default();
                return Err(CloudApiError::Api { status, body });
            }
            let page: Value = resp.json().await?;
            let Some(data) = page.get("data").and_then(|v| v.as_array()) else {
                return Err(CloudApiError::UnexpectedResponse(
                    "template listing without data".to_string(),
                ));
            };
            for entry in data {
                match serde_json::from_value::<Template>(entry.clone()) {
                    Ok(template) => templates.push(template),
                    Err(err) => debug!("skipping undecodable template: {err}"),
                }
            }
            next = page
                .get("paging")
                .and_then(|p| p.get("next"))
                .and_then(|v| v.as_str())
                .map(|s| s.to_string());
            pages += 1;
        }

        Ok(templates)
    }
}

#[async_trait]
impl TemplateSender for CloudApiClient {
    async fn send_template(&self, message: &TemplateMessage) -> Result<String, CloudApiError> {
        let token = self.access_token()?;
        let phone_id = self
            .config
            .phone_number_id
            .as_deref()
            .ok_or(CloudApiError::MissingCredential("phone number id"))?;

        let resp = self
            .http
            .post(self.endpoint(phone_id, "messages"))
            .bearer_auth(token)
            .json(&message.to_payload())
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(CloudApiError::Api { status, body });
        }
        let value: Value = resp.json().await?;
        value
            .get("messages")
            .and_then(|m| m.get(0))
            .and_then(|m| m.get("id"))
            .and_then(|id| id.as_str())
            .map(|id| id.to_string())
            .ok_or_else(|| CloudApiError::UnexpectedResponse("send response without message id".to_string()))
    }
}

/// Keeps only the digits of a phone number.
pub fn format_phone_number(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Templates that can be offered for sending: approved and not excluded by name.
pub fn approved_templates(templates: Vec<Template>, excluded: &[String]) -> Vec<Template> {
    templates
        .into_iter()
        .filter(|t| t.status == APPROVED_STATUS && !excluded.iter().any(|name| *name == t.name))
        .collect()
}
