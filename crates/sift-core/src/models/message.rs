use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::BODY_PREVIEW_CHARS;
use crate::models::confidence::Confidence;
use crate::models::label::{Label, LabelSource};

/// An email record as delivered by an ingestion collaborator, before it has
/// been assigned a database id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewMessage {
    /// Provider-assigned message id, unique within an account.
    pub provider_id: String,
    /// Account address the message was fetched for.
    pub account: String,
    pub thread_id: Option<String>,
    /// Provider-internal receive time, epoch milliseconds.
    pub internal_date: i64,
    pub from_addr: String,
    pub to_addr: String,
    pub subject: String,
    pub snippet: String,
    pub body: String,
    /// Labels the provider itself attached (folders, system flags).
    pub provider_labels: Vec<String>,
}

/// A stored, immutable email message. Uniquely keyed by (account, provider_id).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailMessage {
    pub id: i64,
    pub provider_id: String,
    pub account: String,
    pub thread_id: Option<String>,
    pub internal_date: i64,
    pub from_addr: String,
    pub to_addr: String,
    pub subject: String,
    pub snippet: String,
    pub body: String,
    pub provider_labels: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl EmailMessage {
    /// The feature representation shared by training, classification, and
    /// discovery: sender, subject, and a bounded body prefix.
    pub fn feature_text(&self) -> String {
        let body: String = self.body.chars().take(BODY_PREVIEW_CHARS).collect();
        format!("{} {} {}", self.from_addr, self.subject, body)
    }

    /// A shorter body preview for oracle prompts and review output.
    pub fn body_preview(&self, chars: usize) -> String {
        self.body.chars().take(chars).collect()
    }
}

/// A message joined with its current label, if any.
#[derive(Debug, Clone)]
pub struct MessageWithLabel {
    pub message: EmailMessage,
    pub label: Option<Label>,
}

/// A message that is known to be labeled; used as training input.
#[derive(Debug, Clone)]
pub struct LabeledMessage {
    pub message: EmailMessage,
    pub category: String,
    pub confidence: Confidence,
    pub source: LabelSource,
}
