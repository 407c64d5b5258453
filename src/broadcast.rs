use crate::cloud::{TemplateMessage, TemplateSender};
use crate::template::{TemplateAnalysis, UserInputValues};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize)]
pub struct Recipient {
    pub to: String,
    #[serde(default)]
    pub values: UserInputValues,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipientOutcome {
    Sent { message_id: String },
    Invalid { errors: Vec<String> },
    Failed { error: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipientReport {
    pub to: String,
    #[serde(flatten)]
    pub outcome: RecipientOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BroadcastReport {
    pub id: String,
    pub template: String,
    pub sent: usize,
    pub failed: usize,
    pub recipients: Vec<RecipientReport>,
}

/// Sends `analysis`'s template to each recipient in turn, waiting `delay`
/// between sends. A failing recipient never stops the run.
///
/// Each recipient's values are `shared` overlaid with its own values, validated,
/// and built from a fresh copy of the skeleton.
pub async fn run_broadcast(
    sender: &dyn TemplateSender,
    analysis: &TemplateAnalysis,
    shared: &UserInputValues,
    recipients: &[Recipient],
    delay: Duration,
) -> BroadcastReport {
    let id = Uuid::new_v4().to_string();
    info!(broadcast = %id, template = %analysis.name, recipients = recipients.len(), "broadcast started");

    let mut reports = Vec::with_capacity(recipients.len());
    for (i, recipient) in recipients.iter().enumerate() {
        if i > 0 && !delay.is_zero() {
            sleep(delay).await;
        }
        let outcome = send_one(sender, analysis, shared, recipient).await;
        if let RecipientOutcome::Failed { error } = &outcome {
            warn!(broadcast = %id, to = %recipient.to, "send failed: {error}");
        }
        reports.push(RecipientReport {
            to: recipient.to.clone(),
            outcome,
        });
    }

    let sent = reports
        .iter()
        .filter(|r| matches!(r.outcome, RecipientOutcome::Sent { .. }))
        .count();
    let failed = reports.len() - sent;
    info!(broadcast = %id, sent, failed, "broadcast completed");

    BroadcastReport {
        id,
        template: analysis.name.clone(),
        sent,
        failed,
        recipients: reports,
    }
}

async fn send_one(
    sender: &dyn TemplateSender,
    analysis: &TemplateAnalysis,
    shared: &UserInputValues,
    recipient: &Recipient,
) -> RecipientOutcome {
    let values = shared.merged(&recipient.values);
    let report = analysis.validate(&values);
    if !report.valid {
        return RecipientOutcome::Invalid {
            errors: report.errors,
        };
    }

    let message = TemplateMessage {
        to: recipient.to.clone(),
        name: analysis.name.clone(),
        language: analysis.language.clone(),
        components: analysis.build(&values),
    };
    match sender.send_template(&message).await {
        Ok(message_id) => RecipientOutcome::Sent { message_id },
        Err(err) => RecipientOutcome::Failed {
            error: err.to_string(),
        },
    }
}
