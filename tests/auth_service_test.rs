//! Tests for AuthService: validation, token storage, refresh and restore

mod common;

use rstest::rstest;

use treectl::application::services::AuthService;
use treectl::application::ApplicationError;
use treectl::domain::{DomainError, Session};

use common::{client, logged_in_session, with_tree, BASE_URL};

const LOGIN_OK: &str = r#"{"email": "ada@example.com", "user_id": 1, "access_token": "a-1", "refresh_token": "r-1"}"#;

#[rstest]
#[case("not-an-email", "secret1", "secret1")]
#[case("ada@example.com", "short", "short")]
#[case("ada@example.com", "secret1", "secret2")]
fn given_invalid_registration_when_registering_then_no_request_sent(
    #[case] email: &str,
    #[case] password: &str,
    #[case] confirm: &str,
) {
    // Arrange
    let (api, transport, _) = client(Session::default());
    let auth = AuthService::new(api);

    // Act
    let result = auth.register(email, password, confirm);

    // Assert
    assert!(matches!(result, Err(ApplicationError::Domain(_))));
    assert!(transport.requests().is_empty());
}

#[test]
fn given_mismatched_confirmation_when_registering_then_password_mismatch() {
    let (api, _, _) = client(Session::default());
    let auth = AuthService::new(api);

    let result = auth.register("ada@example.com", "secret1", "secret2");

    assert!(matches!(
        result,
        Err(ApplicationError::Domain(DomainError::PasswordMismatch))
    ));
}

#[test]
fn given_valid_registration_when_registering_then_posts_credentials_and_stores_tokens() {
    // Arrange
    let (api, transport, store) = client(Session::default());
    transport.respond(200, LOGIN_OK);
    let auth = AuthService::new(api);

    // Act
    let user = auth.register(" ada@example.com ", "secret1", "secret1").unwrap();

    // Assert
    assert_eq!(user.email, "ada@example.com");
    assert_eq!(transport.request(0).url, format!("{}/auth/register", BASE_URL));
    let body = transport.body(0);
    assert_eq!(body["email"], "ada@example.com");
    assert_eq!(body["password"], "secret1");
    assert!(body.get("confirm").is_none());

    let session = store.snapshot();
    assert_eq!(session.access_token.as_deref(), Some("a-1"));
    assert_eq!(session.refresh_token.as_deref(), Some("r-1"));
    assert_eq!(session.user.map(|u| u.id), Some(1));
}

#[test]
fn given_wrong_credentials_when_logging_in_then_api_error_and_session_untouched() {
    let (api, transport, store) = client(Session::default());
    transport.respond(401, r#"{"detail": "Invalid credentials"}"#);
    let auth = AuthService::new(api);

    let result = auth.login("ada@example.com", "secret1");

    match result {
        Err(ApplicationError::Api { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "Invalid credentials");
        }
        other => panic!("unexpected: {:?}", other),
    }
    assert_eq!(transport.requests().len(), 1);
    assert_eq!(store.snapshot(), Session::default());
}

#[test]
fn given_stale_token_when_logging_in_then_no_bearer_sent() {
    let (api, transport, _) = client(logged_in_session());
    transport.respond(200, LOGIN_OK);
    let auth = AuthService::new(api);

    auth.login("ada@example.com", "secret1").unwrap();

    assert_eq!(transport.request(0).header("Authorization"), None);
}

#[test]
fn given_same_user_when_logging_in_again_then_keeps_tree_selection() {
    let (api, transport, store) = client(with_tree(logged_in_session(), 3, "demo"));
    transport.respond(200, LOGIN_OK);
    let auth = AuthService::new(api);

    auth.login("ada@example.com", "secret1").unwrap();

    assert_eq!(store.snapshot().current_tree.map(|t| t.id), Some(3));
}

#[test]
fn given_other_user_when_logging_in_then_tree_selection_cleared() {
    let (api, transport, store) = client(with_tree(logged_in_session(), 3, "demo"));
    transport.respond(
        200,
        r#"{"email": "bob@example.com", "user_id": 2, "access_token": "a-2"}"#,
    );
    let auth = AuthService::new(api);

    auth.login("bob@example.com", "secret1").unwrap();

    let session = store.snapshot();
    assert!(session.current_tree.is_none());
    assert_eq!(session.user.map(|u| u.email), Some("bob@example.com".to_string()));
}

#[test]
fn given_session_when_logging_out_then_everything_cleared() {
    let (api, transport, store) = client(with_tree(logged_in_session(), 3, "demo"));
    let auth = AuthService::new(api);

    auth.logout().unwrap();

    assert_eq!(store.snapshot(), Session::default());
    assert!(transport.requests().is_empty());
}

#[test]
fn given_no_refresh_token_when_refreshing_then_not_logged_in() {
    let (api, _, _) = client(Session::default());
    let auth = AuthService::new(api);

    assert!(matches!(auth.refresh(), Err(ApplicationError::NotLoggedIn)));
}

#[test]
fn given_refresh_token_when_refreshing_then_stores_new_pair() {
    let (api, transport, store) = client(logged_in_session());
    transport.respond(200, r#"{"access_token": "a-9", "refresh_token": "r-9"}"#);
    let auth = AuthService::new(api);

    auth.refresh().unwrap();

    let session = store.snapshot();
    assert_eq!(session.access_token.as_deref(), Some("a-9"));
    assert_eq!(session.refresh_token.as_deref(), Some("r-9"));
}

#[test]
fn given_no_credentials_when_restoring_then_nothing_sent() {
    let (api, transport, _) = client(Session::default());
    let auth = AuthService::new(api);

    assert_eq!(auth.restore().unwrap(), None);
    assert!(transport.requests().is_empty());
}

#[test]
fn given_valid_session_when_restoring_then_user_refreshed_from_me() {
    let (api, transport, store) = client(logged_in_session());
    transport.respond(200, r#"{"email": "ada@new.example.com", "id": 1}"#);
    let auth = AuthService::new(api);

    let user = auth.restore().unwrap().expect("user");

    assert_eq!(user.email, "ada@new.example.com");
    assert_eq!(transport.request(0).url, format!("{}/auth/me", BASE_URL));
    assert_eq!(store.snapshot().user, Some(user));
}

#[test]
fn given_only_refresh_token_when_restoring_then_refreshes_before_me() {
    let mut session = logged_in_session();
    session.access_token = None;
    let (api, transport, _) = client(session);
    transport
        .respond(200, r#"{"access_token": "a-2"}"#)
        .respond(200, r#"{"email": "ada@example.com", "id": 1}"#);
    let auth = AuthService::new(api);

    let user = auth.restore().unwrap();

    assert!(user.is_some());
    let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
    assert_eq!(
        urls,
        vec![format!("{}/auth/refresh", BASE_URL), format!("{}/auth/me", BASE_URL)]
    );
    assert_eq!(transport.request(1).header("Authorization"), Some("Bearer a-2"));
}

#[test]
fn given_server_rejects_session_when_restoring_then_logged_out() {
    let (api, transport, store) = client(with_tree(logged_in_session(), 3, "demo"));
    transport.respond(500, r#"{"message": "boom"}"#);
    let auth = AuthService::new(api);

    assert_eq!(auth.restore().unwrap(), None);
    assert_eq!(store.snapshot(), Session::default());
}
