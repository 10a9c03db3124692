// Unit tests for the file-backed session store

use herd_gate::client::session::{FileSessionStore, LoginIdentity, Session, SessionKey};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn test_session_file_uses_browser_key_names() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("session.json");
    let session = Session::new(Arc::new(FileSessionStore::open(&path).unwrap()));

    session
        .store_login(&LoginIdentity {
            token: "tok".to_string(),
            refresh_token: Some("ref".to_string()),
            user: json!({"id": 1}),
            user_name: Some("Ada".to_string()),
            user_role: Some("veterinarian".to_string()),
        })
        .unwrap();

    let raw: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    for key in SessionKey::ALL {
        assert!(raw.get(key.as_str()).is_some(), "missing {}", key.as_str());
    }
    assert_eq!(raw["authToken"], "tok");
    assert_eq!(raw["userRole"], "veterinarian");
}

#[test]
fn test_missing_file_opens_empty() {
    let dir = TempDir::new().unwrap();
    let store = FileSessionStore::open(dir.path().join("absent.json")).unwrap();
    let session = Session::new(Arc::new(store));
    assert!(!session.is_authenticated());
    assert!(session.user().is_none());
}
