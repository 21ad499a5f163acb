//! HTTP client for the scoring service
//!
//! [`ApiClient`] implements one trait per endpoint group. The bearer token is
//! read from the [`SessionStore`] when each request is built, so a login or
//! logout between two calls is always honoured. Any 401 clears the session.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use scoreguard_core::config::ApiSettings;
use scoreguard_core::{ScoreResult, SessionStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::error::{ApiError, AuthFailure, Result};
use crate::models::{
    AuditPage, AuditQuery, AuthGrant, BankAssessment, BankScoreRequest, BatchApplicant,
    BatchAssessment, BatchRequest, LoginRequest, LoginResponse, RiskThresholds, StatementData,
    SystemHealth, SystemStats, UserDirectory, VerifyResponse,
};

/// `/auth/*`
#[async_trait::async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant>;
    async fn verify(&self) -> Result<VerifyResponse>;
}

/// `/citizen/*`
#[async_trait::async_trait]
pub trait CitizenApi: Send + Sync {
    async fn citizen_score(&self, data: &StatementData) -> Result<ScoreResult>;
    async fn citizen_sample_analysis(&self) -> Result<ScoreResult>;
}

/// `/bank/*`
#[async_trait::async_trait]
pub trait BankApi: Send + Sync {
    async fn bank_score(&self, applicant_id: &str, data: &StatementData)
        -> Result<BankAssessment>;
    async fn bank_batch(&self, applicants: &[BatchApplicant]) -> Result<BatchAssessment>;
    async fn bank_thresholds(&self) -> Result<RiskThresholds>;
}

/// `/admin/*`
#[async_trait::async_trait]
pub trait AdminApi: Send + Sync {
    async fn audit_logs(&self, query: &AuditQuery) -> Result<AuditPage>;
    async fn stats(&self) -> Result<SystemStats>;
    async fn users(&self) -> Result<UserDirectory>;
    async fn health(&self) -> Result<SystemHealth>;
    async fn export_audit(&self) -> Result<AuditPage>;
}

/// How failures of a call are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallKind {
    Login,
    Query,
    Upload,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    session: Arc<SessionStore>,
    http_client: reqwest::Client,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            session,
            http_client: reqwest::Client::new(),
        }
    }

    pub fn from_settings(settings: &ApiSettings, session: Arc<SessionStore>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(settings.timeout())
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(Self {
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            session,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Login is the only call sent without the bearer token
    fn request(&self, method: Method, path: &str, kind: CallKind) -> RequestBuilder {
        tracing::debug!("{} {}", method, path);
        let mut builder = self
            .http_client
            .request(method, self.endpoint(path))
            .header("Content-Type", "application/json");

        if kind != CallKind::Login {
            if let Some(token) = self.session.token() {
                builder = builder.header("Authorization", format!("Bearer {}", token));
            }
        }

        builder
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder, kind: CallKind) -> Result<T> {
        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Request failed: {}", e);
                return Err(match kind {
                    CallKind::Upload => ApiError::UploadFailure(e.to_string()),
                    _ => ApiError::Transport(e.to_string()),
                });
            }
        };

        let status = response.status();
        if !status.is_success() {
            return Err(self.failure(status, response, kind).await);
        }

        response.json::<T>().await.map_err(|e| match kind {
            CallKind::Upload => ApiError::UploadFailure(e.to_string()),
            _ => ApiError::Decode(e.to_string()),
        })
    }

    async fn failure(&self, status: StatusCode, response: Response, kind: CallKind) -> ApiError {
        if status == StatusCode::UNAUTHORIZED {
            // Every 401 ends the session, whichever endpoint produced it.
            self.session.expire();
            return ApiError::AuthFailure(match kind {
                CallKind::Login => AuthFailure::InvalidCredentials,
                _ => AuthFailure::SessionExpired,
            });
        }

        let message = error_message(response).await;
        tracing::warn!("API error ({}): {}", status, message);

        match (status, kind) {
            (StatusCode::FORBIDDEN, _) => ApiError::Forbidden(message),
            (_, CallKind::Upload) => ApiError::UploadFailure(message),
            _ => ApiError::Http {
                status: status.as_u16(),
                message,
            },
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(self.request(Method::GET, path, CallKind::Query), CallKind::Query)
            .await
    }

    async fn get_with<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        self.send(
            self.request(Method::GET, path, CallKind::Query).query(query),
            CallKind::Query,
        )
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        kind: CallKind,
    ) -> Result<T> {
        self.send(self.request(Method::POST, path, kind).json(body), kind)
            .await
    }
}

/// `{"error": "..."}` body if present, raw text otherwise
async fn error_message(response: Response) -> String {
    let text = response.text().await.unwrap_or_default();
    serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or(text)
}

#[async_trait::async_trait]
impl AuthApi for ApiClient {
    async fn login(&self, email: &str, password: &str) -> Result<AuthGrant> {
        let response: LoginResponse = self
            .post(
                "/auth/login",
                &LoginRequest { email, password },
                CallKind::Login,
            )
            .await?;
        Ok(response.into_grant(email))
    }

    async fn verify(&self) -> Result<VerifyResponse> {
        self.get("/auth/verify").await
    }
}

#[async_trait::async_trait]
impl CitizenApi for ApiClient {
    async fn citizen_score(&self, data: &StatementData) -> Result<ScoreResult> {
        self.post("/citizen/score", data, CallKind::Upload).await
    }

    async fn citizen_sample_analysis(&self) -> Result<ScoreResult> {
        self.get("/citizen/sample-analysis").await
    }
}

#[async_trait::async_trait]
impl BankApi for ApiClient {
    async fn bank_score(
        &self,
        applicant_id: &str,
        data: &StatementData,
    ) -> Result<BankAssessment> {
        self.post(
            "/bank/score",
            &BankScoreRequest { applicant_id, data },
            CallKind::Upload,
        )
        .await
    }

    async fn bank_batch(&self, applicants: &[BatchApplicant]) -> Result<BatchAssessment> {
        self.post("/bank/batch", &BatchRequest { applicants }, CallKind::Upload)
            .await
    }

    async fn bank_thresholds(&self) -> Result<RiskThresholds> {
        self.get("/bank/thresholds").await
    }
}

#[async_trait::async_trait]
impl AdminApi for ApiClient {
    async fn audit_logs(&self, query: &AuditQuery) -> Result<AuditPage> {
        self.get_with("/admin/audit", query).await
    }

    async fn stats(&self) -> Result<SystemStats> {
        self.get("/admin/stats").await
    }

    async fn users(&self) -> Result<UserDirectory> {
        self.get("/admin/users").await
    }

    async fn health(&self) -> Result<SystemHealth> {
        self.get("/admin/health").await
    }

    async fn export_audit(&self) -> Result<AuditPage> {
        self.get("/admin/export").await
    }
}
