//! Category-naming oracle: prompt construction and strict verdict parsing.

use serde::Deserialize;

use sift_core::errors::{OracleError, SiftResult};
use sift_core::traits::{INamingOracle, NamingRequest, NamingVerdict};

use crate::client::{strip_code_fences, AnthropicClient};

/// Sentinel category name the oracle uses to decline.
const NO_NEW_CATEGORY: &str = "no_new_category";

#[derive(Debug, Deserialize)]
struct OracleReply {
    new_category: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    reasoning: String,
}

impl INamingOracle for AnthropicClient {
    fn propose(&self, request: &NamingRequest) -> SiftResult<NamingVerdict> {
        let prompt = build_naming_prompt(request);
        let text = self.complete(None, &prompt)?;
        parse_verdict(&text)
    }
}

fn build_naming_prompt(request: &NamingRequest) -> String {
    let samples: Vec<String> = request
        .samples
        .iter()
        .map(|s| {
            format!(
                "  From: {}\n  Subject: {}\n  Body preview: {}",
                s.from_addr, s.subject, s.body_preview
            )
        })
        .collect();
    let distribution: Vec<String> = request
        .label_distribution
        .iter()
        .map(|(category, count)| format!("{category}: {count}"))
        .collect();

    format!(
        "I have a cluster of {size} emails that don't fit well into my existing \
         categories: {existing}.\n\n\
         Top terms in this cluster: {terms}\n\
         Current label distribution: {{{distribution}}}\n\n\
         Sample emails:\n{samples}\n\n\
         Based on these emails, should I create a new category?\n\
         If yes, respond with JSON: {{\"new_category\": \"category_name\", \
         \"description\": \"short description\", \"reasoning\": \"why this is distinct\"}}\n\
         If no (they belong in existing categories), respond with: \
         {{\"new_category\": \"{sentinel}\", \"reasoning\": \"why\"}}",
        size = request.cluster_size,
        existing = request.existing_categories.join(", "),
        terms = request.top_terms.join(", "),
        distribution = distribution.join(", "),
        samples = samples.join("\n---\n"),
        sentinel = NO_NEW_CATEGORY,
    )
}

/// Parse the oracle's reply. Anything that is not the expected JSON shape is
/// a malformed-response error.
fn parse_verdict(text: &str) -> SiftResult<NamingVerdict> {
    let payload = strip_code_fences(text);
    let reply: OracleReply =
        serde_json::from_str(payload).map_err(|e| OracleError::MalformedResponse {
            detail: e.to_string(),
        })?;

    if reply.new_category == NO_NEW_CATEGORY {
        return Ok(NamingVerdict::NoNewCategory {
            reasoning: reply.reasoning,
        });
    }
    if reply.new_category.trim().is_empty() {
        return Err(OracleError::MalformedResponse {
            detail: "empty category name".to_string(),
        }
        .into());
    }
    Ok(NamingVerdict::NewCategory {
        name: reply.new_category,
        description: reply.description,
        reasoning: reply.reasoning,
    })
}
