//! Wire models for the scoring service
//!
//! Response types are lenient: optional fields default, and unknown
//! fields are kept in `extra` maps where the service is known to add them.

use chrono::NaiveDateTime;
use scoreguard_core::{Role, User};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Auth

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `/auth/login` response, in either shape the service emits
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum LoginResponse {
    Structured {
        user: User,
        token: String,
    },
    Flat {
        token: String,
        role: Role,
        #[serde(default)]
        user: Option<String>,
    },
}

impl LoginResponse {
    pub(crate) fn into_grant(self, email: &str) -> AuthGrant {
        match self {
            LoginResponse::Structured { user, token } => AuthGrant { user, token },
            LoginResponse::Flat { token, role, user } => {
                let email = email.trim().to_lowercase();
                let mut issued = User::new(email.clone(), email, role);
                issued.name = user;
                AuthGrant {
                    user: issued,
                    token,
                }
            }
        }
    }
}

/// Identity issued by a successful login
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub user: User,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedUser {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// `/auth/verify` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub valid: bool,
    #[serde(default)]
    pub user: Option<VerifiedUser>,
}

// ---------------------------------------------------------------------------
// Scoring requests

/// One bank statement line, forwarded untouched
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: String,
    pub amount: f64,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Statement payload: parsed lines or raw CSV text
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum StatementData {
    #[serde(rename = "transactions")]
    Transactions(Vec<Transaction>),
    #[serde(rename = "csv_content")]
    Csv(String),
}

#[derive(Debug, Serialize)]
pub(crate) struct BankScoreRequest<'a> {
    pub applicant_id: &'a str,
    #[serde(flatten)]
    pub data: &'a StatementData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchApplicant {
    pub applicant_id: String,
    pub transactions: Vec<Transaction>,
}

#[derive(Debug, Serialize)]
pub(crate) struct BatchRequest<'a> {
    pub applicants: &'a [BatchApplicant],
}

// ---------------------------------------------------------------------------
// Bank responses

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    ApproveWithConditions,
    ManualReview,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankRecommendation {
    pub decision: Decision,
    #[serde(default)]
    pub suggested_limit: f64,
    #[serde(default)]
    pub interest_rate_tier: String,
    #[serde(default)]
    pub monitoring_flags: Vec<String>,
    #[serde(default)]
    pub conditions: Vec<String>,
    #[serde(default)]
    pub confidence: f64,
}

/// `/bank/score` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankAssessment {
    pub applicant_id: String,
    pub score: i64,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub probability_of_default: f64,
    pub recommendation: BankRecommendation,
    #[serde(default)]
    pub risk_factors: Vec<String>,
    #[serde(default)]
    pub positive_factors: Vec<String>,
    #[serde(default)]
    pub feature_importance: BTreeMap<String, f64>,
}

/// One row of a batch result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Scored {
        applicant_id: String,
        score: i64,
        #[serde(default)]
        risk_level: String,
        decision: Decision,
        #[serde(default)]
        suggested_limit: f64,
        #[serde(default)]
        confidence: f64,
    },
    Failed {
        applicant_id: String,
        error: String,
    },
}

impl BatchEntry {
    pub fn applicant_id(&self) -> &str {
        match self {
            BatchEntry::Scored { applicant_id, .. } | BatchEntry::Failed { applicant_id, .. } => {
                applicant_id
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct BatchSummary {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub approved: u32,
    #[serde(default)]
    pub conditional: u32,
    #[serde(default)]
    pub review: u32,
}

/// `/bank/batch` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchAssessment {
    pub results: Vec<BatchEntry>,
    #[serde(default)]
    pub summary: BatchSummary,
}

/// `/bank/thresholds` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RiskThresholds {
    #[serde(default)]
    pub score_ranges: BTreeMap<String, (i64, i64)>,
    #[serde(default)]
    pub decision_criteria: BTreeMap<String, String>,
    #[serde(default)]
    pub rate_tiers: BTreeMap<String, String>,
    #[serde(default)]
    pub limit_multipliers: BTreeMap<String, String>,
}

// ---------------------------------------------------------------------------
// Admin

/// Filters for `/admin/audit`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Default)]
pub struct AuditQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub offset: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
}

impl AuditQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn role(mut self, role: Role) -> Self {
        self.role = Some(role);
        self
    }

    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: String,
    pub user: String,
    pub role: String,
    pub action: String,
    #[serde(default)]
    pub score: Option<i64>,
    #[serde(default)]
    pub risk_category: Option<String>,
    #[serde(default)]
    pub applicant_id: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl AuditEntry {
    /// Timestamp as logged by the service (ISO-8601, no offset)
    pub fn logged_at(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.timestamp, "%Y-%m-%dT%H:%M:%S%.f").ok()
    }
}

/// `/admin/audit` and `/admin/export` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditPage {
    pub logs: Vec<AuditEntry>,
    #[serde(default)]
    pub stats: BTreeMap<String, Value>,
}

/// `/admin/stats` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SystemStats {
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub avg_score: Option<f64>,
    #[serde(default)]
    pub min_score: Option<i64>,
    #[serde(default)]
    pub max_score: Option<i64>,
    #[serde(default)]
    pub requests_by_role: BTreeMap<String, u64>,
    #[serde(default)]
    pub requests_last_24h: Option<u64>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub email: String,
    pub role: Role,
    #[serde(default)]
    pub name: Option<String>,
}

/// `/admin/users` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDirectory {
    pub users: Vec<DirectoryUser>,
}

/// `/admin/health` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub status: String,
    #[serde(default)]
    pub components: BTreeMap<String, String>,
}

impl SystemHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}
