use serde::{Deserialize, Serialize};

use crate::domain::{Language, SimplificationLevel, UserId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Response of `/login` and `/signup`. Fields are optional so that a 2xx
/// without a token can be reported instead of failing to decode.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractTextResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extracted_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyRequest {
    pub text: String,
    pub level: SimplificationLevel,
}

/// A risk match located by code-point offsets into the text it was found in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskSpan {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimplifyResponse {
    pub simplified_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotated_simplified: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub simplified_risks: Vec<RiskSpan>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub original_risks: Vec<RiskSpan>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateRequest {
    pub text: String,
    pub language: Language,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslateResponse {
    pub translated_text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub risks: Vec<RiskSpan>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceInfo {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simplify_response_tolerates_missing_annotation_fields() {
        let response: SimplifyResponse =
            serde_json::from_str(r#"{"simplified_text":"This deal binds..."}"#).expect("decode");
        assert_eq!(response.simplified_text, "This deal binds...");
        assert!(response.annotated_simplified.is_none());
        assert!(response.simplified_risks.is_empty());
    }

    #[test]
    fn simplify_request_serializes_lowercase_level() {
        let body = serde_json::to_value(SimplifyRequest {
            text: "clause".into(),
            level: SimplificationLevel::Moderate,
        })
        .expect("encode");
        assert_eq!(body["level"], "moderate");
        assert_eq!(body["text"], "clause");
    }

    #[test]
    fn token_response_accepts_numeric_user_id() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"abc","token_type":"bearer","user_id":12}"#,
        )
        .expect("decode");
        assert_eq!(response.user_id, Some(UserId(12)));
        assert_eq!(response.access_token.as_deref(), Some("abc"));
    }
}
