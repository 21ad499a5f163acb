//! Scoreguard Client - typed access to the scoring service
//!
//! Wraps the REST endpoints behind one trait per role area and keeps the
//! shared [`SessionStore`](scoreguard_core::SessionStore) in step with what
//! the service says about the token.
//!
//! ```text
//!   LoginFlow ──► AuthApi ──┐
//!                           ├──► ApiClient ──► reqwest ──► /api/*
//!   CLI ──► Citizen/Bank/   │        │
//!           AdminApi ───────┘        └──► SessionStore (token in, 401 out)
//! ```

pub mod api;
pub mod error;
pub mod login;
pub mod models;

pub use api::{AdminApi, ApiClient, AuthApi, BankApi, CitizenApi};
pub use error::{ApiError, AuthFailure, Result};
pub use login::LoginFlow;
pub use models::{
    AuditEntry, AuditPage, AuditQuery, AuthGrant, BankAssessment, BankRecommendation,
    BatchApplicant, BatchAssessment, BatchEntry, BatchSummary, Decision, DirectoryUser,
    RiskThresholds, StatementData, SystemHealth, SystemStats, Transaction, UserDirectory,
    VerifiedUser, VerifyResponse,
};
