//! Response and request bodies for the operations in `skills`
//!
//! Only the fields those operations need are modeled; unknown fields are
//! ignored on decode.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::pagination::Paginated;

/// Error body returned by SMAPI for 4xx/5xx responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// Field-level problems reported with 400 responses
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<Violation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillSummary {
    pub skill_id: String,
    #[serde(default)]
    pub stage: Option<String>,
    #[serde(default)]
    pub apis: Vec<String>,
    #[serde(default)]
    pub name_by_locale: HashMap<String, String>,
    #[serde(default)]
    pub last_updated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListSkillResponse {
    #[serde(default)]
    pub skills: Vec<SkillSummary>,
    #[serde(default)]
    pub is_truncated: bool,
    #[serde(default)]
    pub next_token: Option<String>,
}

impl Paginated for ListSkillResponse {
    fn is_truncated(&self) -> bool {
        self.is_truncated
    }

    fn next_token(&self) -> Option<&str> {
        self.next_token.as_deref()
    }
}

/// Build/update status per skill resource.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillStatus {
    #[serde(default)]
    pub manifest: Option<serde_json::Value>,
    #[serde(default)]
    pub interaction_model: Option<HashMap<String, serde_json::Value>>,
}

/// Skill manifest wrapper as sent and received by the manifest endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillManifestEnvelope {
    pub manifest: serde_json::Value,
}

/// A value together with the entity tag it was read at.
#[derive(Debug, Clone, PartialEq)]
pub struct Versioned<T> {
    pub value: T,
    pub etag: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_body_decodes_violations() {
        let json = r#"{"message":"Invalid manifest","violations":[{"code":"MISSING_FIELD","message":"publishingInformation is required"}]}"#;
        let body: ErrorBody = serde_json::from_str(json).unwrap();
        assert_eq!(body.message.as_deref(), Some("Invalid manifest"));
        assert_eq!(body.violations.len(), 1);
        assert_eq!(body.violations[0].code.as_deref(), Some("MISSING_FIELD"));
    }

    #[test]
    fn list_response_reports_truncation() {
        let json = r#"{"skills":[{"skillId":"amzn1.ask.skill.1","stage":"development","apis":["custom"],"nameByLocale":{"en-US":"Trivia"}}],"isTruncated":true,"nextToken":"tok-2"}"#;
        let page: ListSkillResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.skills[0].skill_id, "amzn1.ask.skill.1");
        assert_eq!(page.skills[0].name_by_locale["en-US"], "Trivia");
        assert!(Paginated::is_truncated(&page));
        assert_eq!(Paginated::next_token(&page), Some("tok-2"));
    }

    #[test]
    fn list_response_defaults_to_last_page() {
        let page: ListSkillResponse = serde_json::from_str(r#"{"skills":[]}"#).unwrap();
        assert!(!page.is_truncated);
        assert!(page.next_token.is_none());
    }
}
