//! Session lifecycle driving the route guard, backed by a real session file

use scoreguard_core::persistence::{TOKEN_KEY, USER_KEY};
use scoreguard_core::{
    FileStore, KeyValueStore, KvOp, Navigation, Role, RouteGuard, SessionStore, User,
};
use std::sync::Arc;

fn bank_officer() -> User {
    User::new("7", "bank@test.com", Role::Bank).with_name("Bank Officer")
}

#[test]
fn restart_restores_session_before_first_navigation() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");

    {
        let store = SessionStore::new(Arc::new(FileStore::new(&path)));
        store.establish(bank_officer(), "jwt-bank").unwrap();
    }

    // A new process: restore, then navigate.
    let store = SessionStore::restored(Arc::new(FileStore::new(&path)));
    assert_eq!(
        RouteGuard::navigate_with(&store, "/bank"),
        Navigation::Render("/bank".to_string())
    );
    assert_eq!(
        RouteGuard::navigate_with(&store, "/citizen"),
        Navigation::Redirect("/bank".to_string())
    );
    assert_eq!(
        RouteGuard::navigate_with(&store, "/login/bank"),
        Navigation::Redirect("/bank".to_string())
    );
}

#[test]
fn logout_is_seen_by_the_next_navigation() {
    let dir = tempfile::tempdir().unwrap();
    let backing = Arc::new(FileStore::new(dir.path().join("session.json")));
    let store = SessionStore::new(backing.clone());
    store.establish(bank_officer(), "jwt-bank").unwrap();

    assert!(!RouteGuard::navigate_with(&store, "/bank").is_redirect());
    store.clear();
    assert_eq!(
        RouteGuard::navigate_with(&store, "/bank"),
        Navigation::Redirect("/login".to_string())
    );
    assert_eq!(backing.get(TOKEN_KEY).unwrap(), None);
    assert_eq!(backing.get(USER_KEY).unwrap(), None);
}

#[test]
fn tampered_role_is_never_authenticated() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let backing = Arc::new(FileStore::new(&path));
    backing
        .apply(&[
            KvOp::put(TOKEN_KEY, "jwt"),
            KvOp::put(
                USER_KEY,
                r#"{"id":"1","email":"x@test.com","role":"superadmin"}"#,
            ),
        ])
        .unwrap();

    let store = SessionStore::restored(backing.clone());
    assert!(!store.is_authenticated());
    assert_eq!(
        RouteGuard::navigate_with(&store, "/admin"),
        Navigation::Redirect("/login".to_string())
    );
    assert!(!path.exists());
}

#[test]
fn corrupt_session_file_is_treated_as_logged_out() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, "\u{0}\u{0}garbage").unwrap();

    let store = SessionStore::restored(Arc::new(FileStore::new(&path)));
    assert!(store.current().is_none());
    assert!(!path.exists());
}

#[test]
fn non_utf8_session_file_is_cleared_and_login_still_works() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

    let store = SessionStore::restored(Arc::new(FileStore::new(&path)));
    assert!(store.current().is_none());
    assert!(!path.exists());

    store.establish(bank_officer(), "jwt-bank").unwrap();
    assert_eq!(
        RouteGuard::navigate_with(&store, "/bank"),
        Navigation::Render("/bank".to_string())
    );
}
