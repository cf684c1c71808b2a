//! The classification taxonomy: an explicit immutable configuration object
//! passed into every component that needs it. Updating the taxonomy is a
//! controlled configuration change, never a runtime mutation.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::{SiftError, SiftResult};

/// Broad handling group for a category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryGroup {
    /// Needs a user response or immediate attention.
    Action,
    /// Read at leisure, no urgency.
    Informational,
    /// Batch-archive or ignore.
    Noise,
}

impl CategoryGroup {
    pub fn as_str(self) -> &'static str {
        match self {
            CategoryGroup::Action => "action",
            CategoryGroup::Informational => "informational",
            CategoryGroup::Noise => "noise",
        }
    }
}

/// One category definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub description: String,
    pub group: CategoryGroup,
}

/// The full category taxonomy, with a name-to-group lookup table built once
/// at construction.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<CategoryDef>,
    priority: Vec<String>,
    group_index: HashMap<String, CategoryGroup>,
}

#[derive(Debug, Deserialize)]
struct TaxonomyFile {
    category: Vec<CategoryDef>,
    #[serde(default)]
    priority: Vec<String>,
}

impl Taxonomy {
    pub fn new(categories: Vec<CategoryDef>, priority: Vec<String>) -> Self {
        let group_index = categories
            .iter()
            .map(|c| (c.name.clone(), c.group))
            .collect();
        let priority = if priority.is_empty() {
            categories.iter().map(|c| c.name.clone()).collect()
        } else {
            priority
        };
        Self {
            categories,
            priority,
            group_index,
        }
    }

    /// Load a taxonomy from a TOML document with `[[category]]` tables and an
    /// optional `priority` array.
    pub fn from_toml_str(source: &str) -> SiftResult<Self> {
        let file: TaxonomyFile = toml::from_str(source).map_err(|e| SiftError::Config {
            message: format!("invalid taxonomy file: {e}"),
        })?;
        if file.category.is_empty() {
            return Err(SiftError::Config {
                message: "taxonomy file defines no categories".to_string(),
            });
        }
        let taxonomy = Self::new(file.category, file.priority);
        for name in &taxonomy.priority {
            if !taxonomy.contains(name) {
                return Err(SiftError::Config {
                    message: format!("priority entry '{name}' is not a defined category"),
                });
            }
        }
        Ok(taxonomy)
    }

    pub fn categories(&self) -> &[CategoryDef] {
        &self.categories
    }

    pub fn names(&self) -> Vec<&str> {
        self.categories.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.group_index.contains_key(name)
    }

    /// Exact-match group lookup.
    pub fn group_of(&self, name: &str) -> Option<CategoryGroup> {
        self.group_index.get(name).copied()
    }

    /// Categories in digest priority order, most important first.
    pub fn priority_order(&self) -> &[String] {
        &self.priority
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}

impl Default for Taxonomy {
    /// The built-in personal-email taxonomy: 15 categories across three
    /// handling groups.
    fn default() -> Self {
        fn def(name: &str, description: &str, group: CategoryGroup) -> CategoryDef {
            CategoryDef {
                name: name.to_string(),
                description: description.to_string(),
                group,
            }
        }

        use CategoryGroup::{Action, Informational, Noise};

        let categories = vec![
            def(
                "job_opportunity",
                "Recruiter outreach, job recommendations, referral messages, 'we found your profile' emails",
                Action,
            ),
            def(
                "job_interview",
                "Interview scheduling, coding challenges, take-home assignments, offer letters, rejection notices",
                Action,
            ),
            def(
                "personal",
                "Direct emails from friends/family, genuine 1:1 personal conversations",
                Action,
            ),
            def(
                "finance_alert",
                "Bank alerts, fraud warnings, bill due reminders, tax documents, large transaction notices",
                Action,
            ),
            def(
                "security_auth",
                "Password resets, 2FA codes, login alerts, breach notifications, account lockout",
                Action,
            ),
            def(
                "events_calendar",
                "Event invitations, RSVPs, calendar notifications, meetup/webinar invites",
                Action,
            ),
            def(
                "job_application_confirm",
                "'We received your application' confirmations, application portal links, status acknowledgments",
                Informational,
            ),
            def(
                "travel",
                "Flight/hotel bookings, itineraries, boarding passes, check-in reminders, trip notifications",
                Informational,
            ),
            def(
                "shopping_orders",
                "Order confirmations, shipping/delivery tracking, return/refund confirmations",
                Informational,
            ),
            def(
                "finance_receipt",
                "Payment receipts, subscription renewals, monthly statements; records only, no action needed",
                Informational,
            ),
            def(
                "newsletter_content",
                "Substantive content newsletters (Substack, industry blogs, curated digests) the user subscribed to",
                Informational,
            ),
            def(
                "education",
                "Online course updates, certifications, learning platform activity, academic communications",
                Informational,
            ),
            def(
                "social_notification",
                "Social media notifications: likes, comments, connection requests",
                Noise,
            ),
            def(
                "marketing_promo",
                "Sales announcements, discount codes, product launches, cold promotional outreach",
                Noise,
            ),
            def(
                "account_service",
                "Terms of service updates, privacy policy changes, product announcements, generic service emails",
                Noise,
            ),
        ];

        // Digest priority: interviews and security first, noise last.
        let priority = [
            "job_interview",
            "security_auth",
            "job_opportunity",
            "personal",
            "finance_alert",
            "events_calendar",
            "job_application_confirm",
            "travel",
            "shopping_orders",
            "finance_receipt",
            "newsletter_content",
            "education",
            "social_notification",
            "marketing_promo",
            "account_service",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        Self::new(categories, priority)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_taxonomy_has_fifteen_categories() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.len(), 15);
        assert_eq!(taxonomy.priority_order().len(), 15);
        assert!(taxonomy.contains("personal"));
        assert!(!taxonomy.contains("unknown_category"));
    }

    #[test]
    fn group_lookup_is_exact_match() {
        let taxonomy = Taxonomy::default();
        assert_eq!(taxonomy.group_of("security_auth"), Some(CategoryGroup::Action));
        assert_eq!(
            taxonomy.group_of("marketing_promo"),
            Some(CategoryGroup::Noise)
        );
        assert_eq!(taxonomy.group_of("Security_Auth"), None);
    }

    #[test]
    fn parses_taxonomy_from_toml() {
        let source = r#"
            priority = ["urgent", "misc"]

            [[category]]
            name = "urgent"
            description = "needs attention"
            group = "action"

            [[category]]
            name = "misc"
            description = "everything else"
            group = "noise"
        "#;
        let taxonomy = Taxonomy::from_toml_str(source).unwrap();
        assert_eq!(taxonomy.len(), 2);
        assert_eq!(taxonomy.group_of("urgent"), Some(CategoryGroup::Action));
        assert_eq!(taxonomy.priority_order().to_vec(), vec!["urgent", "misc"]);
    }

    #[test]
    fn rejects_priority_entry_for_unknown_category() {
        let source = r#"
            priority = ["missing"]

            [[category]]
            name = "urgent"
            description = "needs attention"
            group = "action"
        "#;
        assert!(Taxonomy::from_toml_str(source).is_err());
    }
}
