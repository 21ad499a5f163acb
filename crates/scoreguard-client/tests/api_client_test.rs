//! ApiClient against an in-process fake of the scoring service

use axum::extract::Query;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use scoreguard_client::{
    AdminApi, ApiClient, ApiError, AuditQuery, AuthApi, AuthFailure, BankApi, CitizenApi,
    LoginFlow, StatementData,
};
use scoreguard_core::persistence::{TOKEN_KEY, USER_KEY};
use scoreguard_core::{
    ClearReason, KeyValueStore, MemoryStore, Navigation, Role, SessionEvent, SessionStore, User,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}/api", addr)
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

fn scoring_service() -> Router {
    Router::new()
        .route(
            "/api/auth/login",
            post(|headers: HeaderMap, Json(body): Json<Value>| async move {
                if bearer(&headers).is_some() {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(json!({"error": "login must not carry a token"})),
                    );
                }
                match body["password"].as_str() {
                    Some("bank123") => (
                        StatusCode::OK,
                        Json(json!({"token": "jwt-bank", "role": "bank", "user": "Bank Officer"})),
                    ),
                    _ => (
                        StatusCode::UNAUTHORIZED,
                        Json(json!({"error": "Invalid credentials"})),
                    ),
                }
            }),
        )
        .route(
            "/api/auth/verify",
            get(|headers: HeaderMap| async move {
                Json(json!({"valid": bearer(&headers).as_deref() == Some("Bearer jwt-citizen")}))
            }),
        )
        .route(
            "/api/citizen/sample-analysis",
            get(|headers: HeaderMap| async move {
                if bearer(&headers).is_none() {
                    return (StatusCode::UNAUTHORIZED, Json(json!({"error": "Token missing"})));
                }
                (
                    StatusCode::OK,
                    Json(json!({
                        "score": 742,
                        "category": "Good",
                        "trend": "improving",
                        "explanations": {"positive": ["Regular income"], "negative": []},
                        "improvements": [{"action": "Build savings", "impact": "+20 points"}],
                        "recommendations": {"narrative": "Solid profile", "tips": []},
                        "sample_data": true
                    })),
                )
            }),
        )
        .route(
            "/api/citizen/score",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": "Invalid CSV: missing amount column"})),
                )
            }),
        )
        .route(
            "/api/bank/thresholds",
            get(|| async {
                (
                    StatusCode::FORBIDDEN,
                    Json(json!({"error": "Insufficient permissions"})),
                )
            }),
        )
        .route(
            "/api/admin/stats",
            get(|| async { (StatusCode::UNAUTHORIZED, Json(json!({"error": "Token expired"}))) }),
        )
        .route(
            "/api/admin/audit",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "logs": [{
                        "timestamp": "2024-01-15T10:30:00.123456",
                        "user": params.get("user").cloned().unwrap_or_default(),
                        "role": params.get("role").cloned().unwrap_or_default(),
                        "action": params.get("action").cloned().unwrap_or_default(),
                        "score": 700,
                        "limit": params.get("limit").cloned()
                    }],
                    "stats": {"total": 1}
                }))
            }),
        )
}

fn citizen() -> User {
    User::new("1", "citizen@test.com", Role::Citizen).with_name("John Doe")
}

async fn client_with_session() -> (ApiClient, Arc<SessionStore>, Arc<MemoryStore>) {
    let backing = Arc::new(MemoryStore::new());
    let session = Arc::new(SessionStore::new(backing.clone()));
    let base_url = spawn(scoring_service()).await;
    let client = ApiClient::new(base_url, session.clone());
    (client, session, backing)
}

#[tokio::test]
async fn token_is_read_from_the_session_per_request() {
    let (client, session, _) = client_with_session().await;

    assert!(!client.verify().await.unwrap().valid);

    session.establish(citizen(), "jwt-citizen").unwrap();
    assert!(client.verify().await.unwrap().valid);

    session.clear();
    assert!(!client.verify().await.unwrap().valid);
}

#[tokio::test]
async fn sample_analysis_decodes_score_result() {
    let (client, session, _) = client_with_session().await;
    session.establish(citizen(), "jwt-citizen").unwrap();

    let result = client.citizen_sample_analysis().await.unwrap();
    assert_eq!(result.score, 742);
    assert!(result.sample_data);
    assert_eq!(result.improvements[0].impact, "+20 points");
}

#[tokio::test]
async fn unauthorized_clears_memory_and_persistence() {
    let (client, session, backing) = client_with_session().await;
    session
        .establish(User::new("3", "admin@test.com", Role::Admin), "jwt-admin")
        .unwrap();
    let mut events = session.subscribe();

    let err = client.stats().await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::AuthFailure(AuthFailure::SessionExpired)
    ));
    assert_eq!(err.redirect(), Some("/login"));

    assert!(session.current().is_none());
    assert_eq!(backing.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(backing.get(USER_KEY).unwrap(), None);
    assert_eq!(
        events.recv().await.unwrap(),
        SessionEvent::Cleared {
            reason: ClearReason::Unauthorized
        }
    );
}

#[tokio::test]
async fn upload_failure_keeps_the_session() {
    let (client, session, backing) = client_with_session().await;
    session.establish(citizen(), "jwt-citizen").unwrap();

    let err = client
        .citizen_score(&StatementData::Csv("date,amount\n".to_string()))
        .await
        .unwrap_err();
    match err {
        ApiError::UploadFailure(message) => {
            assert_eq!(message, "Invalid CSV: missing amount column")
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(session.is_authenticated());
    assert_eq!(
        backing.get(TOKEN_KEY).unwrap().as_deref(),
        Some("jwt-citizen")
    );
}

#[tokio::test]
async fn forbidden_is_reported_locally() {
    let (client, session, _) = client_with_session().await;
    session.establish(citizen(), "jwt-citizen").unwrap();

    let err = client.bank_thresholds().await.unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(ref m) if m == "Insufficient permissions"));
    assert!(!err.escalates());
    assert!(session.is_authenticated());
}

#[tokio::test]
async fn audit_filters_are_sent_as_query_parameters() {
    let (client, session, _) = client_with_session().await;
    session
        .establish(User::new("3", "admin@test.com", Role::Admin), "jwt-admin")
        .unwrap();

    let page = client
        .audit_logs(
            &AuditQuery::new()
                .limit(25)
                .role(Role::Bank)
                .action("bank_score")
                .user("bank@test.com"),
        )
        .await
        .unwrap();

    let entry = &page.logs[0];
    assert_eq!(entry.user, "bank@test.com");
    assert_eq!(entry.role, "bank");
    assert_eq!(entry.action, "bank_score");
    assert_eq!(entry.extra.get("limit"), Some(&json!("25")));
    assert!(entry.logged_at().is_some());
}

#[tokio::test]
async fn login_flow_accepts_matching_portal_only() {
    let (client, session, backing) = client_with_session().await;
    let flow = LoginFlow::new(Arc::new(client), session.clone());

    let err = flow
        .submit(Role::Citizen, "Bank@Test.com", "bank123")
        .await
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "This account is not authorized for citizen access."
    );
    assert!(!session.is_authenticated());
    assert_eq!(backing.get(TOKEN_KEY).unwrap(), None);

    let nav = flow
        .submit(Role::Bank, "Bank@Test.com", "bank123")
        .await
        .unwrap();
    assert_eq!(nav, Navigation::Redirect("/bank".to_string()));

    let current = session.current().unwrap();
    assert_eq!(current.user.email, "bank@test.com");
    assert_eq!(current.user.display_name(), "Bank Officer");
}

#[tokio::test]
async fn rejected_login_is_generic() {
    let (client, session, _) = client_with_session().await;

    let err = client.login("nobody@test.com", "wrong").await.unwrap_err();
    assert!(matches!(
        err,
        ApiError::AuthFailure(AuthFailure::InvalidCredentials)
    ));
    assert!(!err.escalates());

    let flow = LoginFlow::new(Arc::new(client), session.clone());
    let err = flow
        .submit(Role::Admin, "nobody@test.com", "wrong")
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid email or password");
}

#[tokio::test]
async fn login_never_sends_the_stored_token() {
    let (client, session, _) = client_with_session().await;
    session.establish(citizen(), "jwt-citizen").unwrap();

    let grant = client.login("bank@test.com", "bank123").await.unwrap();
    assert_eq!(grant.user.role, Role::Bank);
    assert_eq!(grant.token, "jwt-bank");
}
