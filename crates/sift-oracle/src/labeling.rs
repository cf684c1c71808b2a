//! Bootstrap labeling oracle: classifies message batches against the
//! taxonomy, returning one vote per message.

use serde::Deserialize;

use sift_core::errors::{OracleError, SiftResult};
use sift_core::taxonomy::Taxonomy;
use sift_core::traits::{ILabelOracle, LabelRequestItem, LabelVote};

use crate::client::{strip_code_fences, AnthropicClient};

#[derive(Debug, Deserialize)]
struct VoteReply {
    id: i64,
    label: String,
    #[serde(default)]
    confidence: f64,
}

impl ILabelOracle for AnthropicClient {
    fn label_batch(
        &self,
        taxonomy: &Taxonomy,
        items: &[LabelRequestItem],
    ) -> SiftResult<Vec<LabelVote>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }
        let system = build_system_prompt(taxonomy);
        let prompt = build_batch_prompt(items);
        let text = self.complete(Some(&system), &prompt)?;
        parse_votes(&text)
    }
}

fn build_system_prompt(taxonomy: &Taxonomy) -> String {
    let categories: Vec<String> = taxonomy
        .categories()
        .iter()
        .map(|c| format!("- {}: {}", c.name, c.description))
        .collect();

    format!(
        "You are an email classifier for a personal inbox.\n\
         Classify each email into exactly one category.\n\n\
         Categories:\n{}\n\n\
         Respond with ONLY a JSON array. Each element must have these fields:\n\
         {{\"id\": <email_id>, \"label\": \"<category>\", \"confidence\": <float 0.0 to 1.0>}}\n\n\
         Return ONLY the JSON array, no other text.",
        categories.join("\n"),
    )
}

fn build_batch_prompt(items: &[LabelRequestItem]) -> String {
    let blocks: Vec<String> = items
        .iter()
        .map(|item| {
            format!(
                "Email id {}:\n  From: {}\n  Subject: {}\n  Body preview: {}",
                item.message_id, item.from_addr, item.subject, item.body_preview
            )
        })
        .collect();
    format!("Classify these emails:\n\n{}", blocks.join("\n---\n"))
}

/// Parse the JSON-array reply into votes. A non-array or non-JSON reply is
/// malformed; individual votes are passed through as-is for the caller to
/// validate against the taxonomy.
fn parse_votes(text: &str) -> SiftResult<Vec<LabelVote>> {
    let payload = strip_code_fences(text);
    let replies: Vec<VoteReply> =
        serde_json::from_str(payload).map_err(|e| OracleError::MalformedResponse {
            detail: e.to_string(),
        })?;
    Ok(replies
        .into_iter()
        .map(|reply| LabelVote {
            message_id: reply.id,
            category: reply.label,
            confidence: reply.confidence,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_vote_array() {
        let votes = parse_votes(
            r#"[{"id": 1, "label": "marketing_promo", "confidence": 0.95},
                {"id": 2, "label": "personal", "confidence": 0.8}]"#,
        )
        .unwrap();
        assert_eq!(votes.len(), 2);
        assert_eq!(votes[0].message_id, 1);
        assert_eq!(votes[0].category, "marketing_promo");
        assert!((votes[1].confidence - 0.8).abs() < 1e-9);
    }

    #[test]
    fn parses_fenced_arrays() {
        let votes =
            parse_votes("```json\n[{\"id\": 3, \"label\": \"travel\", \"confidence\": 1.0}]\n```")
                .unwrap();
        assert_eq!(votes.len(), 1);
    }

    #[test]
    fn non_array_reply_is_malformed() {
        assert!(parse_votes(r#"{"id": 1, "label": "travel"}"#).is_err());
        assert!(parse_votes("Sure! Here are the labels:").is_err());
    }

    #[test]
    fn system_prompt_lists_every_category() {
        let taxonomy = Taxonomy::default();
        let system = build_system_prompt(&taxonomy);
        for name in taxonomy.names() {
            assert!(system.contains(name));
        }
    }
}
