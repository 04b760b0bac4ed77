// File: http_integration_tests.rs
// SPDX-License-Identifier: MIT OR Apache-2.0
//
// Copyright (c) 2025
// - Volker Schwaberow <volker@schwaberow.de>

mod common;

use acprobe::config::{LoginMethod, RunConfig};
use acprobe::digest::DigestChallenge;
use acprobe::errors::ProbeError;
use acprobe::login::LoginStrategy;
use acprobe::session::Session;
use common::*;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::json;
use serial_test::serial;
use wiremock::matchers::{body_json, body_string_contains, header, method, path};
use wiremock::{Match, Mock, Request, ResponseTemplate};

fn strategy(config: RunConfig) -> LoginStrategy {
    LoginStrategy::from_config(&config)
}

fn form_config() -> RunConfig {
    RunConfig::default()
}

#[tokio::test]
#[serial]
async fn test_session_keeps_cookies_between_requests() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/start"))
        .respond_with(ResponseTemplate::new(200).append_header("set-cookie", "sid=42; Path=/"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("cookie", "sid=42"))
        .respond_with(ResponseTemplate::new(200).set_body_string("it's you"))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    session.get("/start").await.unwrap();
    let response = session.get("/me").await.unwrap();
    assert_eq!(response.status(), 200);
    assert_eq!(response.body(), "it's you");

    session.reset().unwrap();
    assert_eq!(session.get("/me").await.unwrap().status(), 401);

    let mut fresh = session_for(&mock_server);
    assert_eq!(fresh.get("/me").await.unwrap().status(), 401);
}

#[tokio::test]
#[serial]
async fn test_query_string_is_sent_verbatim() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(wiremock::matchers::query_param("q", "admin"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    assert_eq!(session.get("/search?q=admin").await.unwrap().status(), 204);
}

#[tokio::test]
#[serial]
async fn test_redirects_follow_configuration() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(302).append_header("location", "/new"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    assert_eq!(session.get("/old").await.unwrap().status(), 302);

    let mut options = session_options(&mock_server);
    options.allow_redirect = true;
    let mut session = Session::new(options).unwrap();
    assert_eq!(session.get("/old").await.unwrap().status(), 200);
}

#[tokio::test]
#[serial]
async fn test_form_login_success_sets_cookie() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_string_contains("email=alice"))
        .and(body_string_contains("password=secret"))
        .respond_with(login_ok("alice"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("cookie", "session=alice"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    let accepted = strategy(form_config())
        .login(&mut session, "alice", "secret")
        .await
        .unwrap();

    assert!(accepted);
    assert!(session.is_authenticated());
    assert_eq!(session.get("/profile").await.unwrap().status(), 200);
}

#[tokio::test]
#[serial]
async fn test_form_login_rejected_by_status() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(401).append_header("set-cookie", "session=half; Path=/"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .and(header("cookie", "session=half"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/profile"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&mock_server)
        .await;

    let mut session = session_for(&mock_server);
    let accepted = strategy(form_config())
        .login(&mut session, "alice", "wrong")
        .await
        .unwrap();

    assert!(!accepted);
    assert!(!session.is_authenticated());
    // the rejected attempt's cookie must not survive
    assert_eq!(session.get("/profile").await.unwrap().status(), 403);
}

#[tokio::test]
#[serial]
async fn test_form_login_by_text_and_custom_fields() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/auth/signin"))
        .and(body_string_contains("user=bob"))
        .and(body_string_contains("pass=hunter2"))
        .respond_with(ResponseTemplate::new(302).set_body_string("Redirecting to Dashboard"))
        .mount(&mock_server)
        .await;

    let config = RunConfig {
        login_path: "/auth/signin".to_string(),
        id_field: "user".to_string(),
        pwd_field: "pass".to_string(),
        login_text: Some("Dashboard".to_string()),
        ..RunConfig::default()
    };

    let mut session = session_for(&mock_server);
    assert!(strategy(config.clone())
        .login(&mut session, "bob", "hunter2")
        .await
        .unwrap());

    let mut session = session_for(&mock_server);
    assert!(!strategy(config)
        .login(&mut session, "bob", "nope")
        .await
        .unwrap());
}

#[tokio::test]
#[serial]
async fn test_form_login_json_body() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({"email": "alice", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;

    let mut options = session_options(&mock_server);
    options.json_body = true;
    let mut session = Session::new(options).unwrap();

    assert!(strategy(form_config())
        .login(&mut session, "alice", "secret")
        .await
        .unwrap());
}

#[tokio::test]
#[serial]
async fn test_csrf_login_posts_scraped_token() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(login_page("tok123").append_header("set-cookie", "pre=1; Path=/"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(header("cookie", "pre=1"))
        .and(body_string_contains("csrf=tok123"))
        .and(body_string_contains("email=alice"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(419))
        .mount(&mock_server)
        .await;

    let config = RunConfig {
        login_method: LoginMethod::Csrf,
        ..RunConfig::default()
    };
    let mut session = session_for(&mock_server);
    assert!(strategy(config)
        .login(&mut session, "alice", "secret")
        .await
        .unwrap());
}

#[tokio::test]
#[serial]
async fn test_csrf_login_without_token_fails() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<form></form>"))
        .mount(&mock_server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = RunConfig {
        login_method: LoginMethod::Csrf,
        ..RunConfig::default()
    };
    let mut session = session_for(&mock_server);
    let err = strategy(config)
        .login(&mut session, "alice", "secret")
        .await
        .unwrap_err();

    assert!(matches!(err, ProbeError::TokenNotFound(ref name) if name == "csrf"));
    assert!(!session.is_authenticated());
}

#[tokio::test]
#[serial]
async fn test_basic_login_binds_header_to_later_requests() {
    let mock_server = setup_mock_server().await;

    // base64("alice:secret")
    Mock::given(method("GET"))
        .and(header("authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;

    let config = RunConfig {
        login_method: LoginMethod::Basic,
        login_path: "/protected".to_string(),
        ..RunConfig::default()
    };

    let mut session = session_for(&mock_server);
    assert!(strategy(config.clone())
        .login(&mut session, "alice", "secret")
        .await
        .unwrap());
    assert!(session.decorator().is_some());
    assert_eq!(session.get("/reports").await.unwrap().status(), 200);

    let mut session = session_for(&mock_server);
    assert!(!strategy(config)
        .login(&mut session, "alice", "wrong")
        .await
        .unwrap());
    assert!(session.decorator().is_none());
    assert_eq!(session.get("/reports").await.unwrap().status(), 401);
}

#[tokio::test]
#[serial]
async fn test_proxy_login_sends_proxy_authorization() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .and(header("proxy-authorization", "Basic YWxpY2U6c2VjcmV0"))
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(407))
        .mount(&mock_server)
        .await;

    let config = RunConfig {
        login_method: LoginMethod::Proxy,
        login_path: "/".to_string(),
        ..RunConfig::default()
    };
    let mut session = session_for(&mock_server);
    assert!(strategy(config)
        .login(&mut session, "alice", "secret")
        .await
        .unwrap());
}

static AUTH_PARAM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(\w+)=(?:"([^"]*)"|([^,\s]+))"#).unwrap());

/// Recomputes the Digest response from the client's own nc/cnonce and
/// compares the whole header.
struct ValidDigest {
    challenge: DigestChallenge,
    username: &'static str,
    password: &'static str,
}

impl Match for ValidDigest {
    fn matches(&self, request: &Request) -> bool {
        let Some(value) = request
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
        else {
            return false;
        };

        let param = |key: &str| {
            AUTH_PARAM
                .captures_iter(value)
                .find(|c| &c[1] == key)
                .and_then(|c| c.get(2).or_else(|| c.get(3)))
                .map(|m| m.as_str().to_string())
        };
        let (Some(uri), Some(nc), Some(cnonce)) = (param("uri"), param("nc"), param("cnonce")) else {
            return false;
        };
        let Ok(nc) = u32::from_str_radix(&nc, 16) else {
            return false;
        };

        let expected = self.challenge.authorization(
            self.username,
            self.password,
            request.method.as_str(),
            &uri,
            nc,
            &cnonce,
        );
        uri == request.url.path() && value == expected
    }
}

#[tokio::test]
#[serial]
async fn test_digest_login_answers_challenge() {
    let mock_server = setup_mock_server().await;
    let www_authenticate =
        r#"Digest realm="acp@test", qop="auth", nonce="dcd98b7102dd2f0e", opaque="5ccc069c""#;
    let challenge = DigestChallenge::parse(www_authenticate).unwrap();

    Mock::given(method("GET"))
        .and(ValidDigest {
            challenge,
            username: "alice",
            password: "secret",
        })
        .respond_with(ResponseTemplate::new(200))
        .with_priority(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(401).append_header("www-authenticate", www_authenticate),
        )
        .mount(&mock_server)
        .await;

    let config = RunConfig {
        login_method: LoginMethod::Digest,
        login_path: "/private".to_string(),
        ..RunConfig::default()
    };

    let mut session = session_for(&mock_server);
    assert!(strategy(config.clone())
        .login(&mut session, "alice", "secret")
        .await
        .unwrap());
    // bound credentials keep counting nonces on later requests
    assert_eq!(session.get("/private/reports").await.unwrap().status(), 200);
    assert_eq!(session.get("/private/users").await.unwrap().status(), 200);

    let mut session = session_for(&mock_server);
    assert!(!strategy(config)
        .login(&mut session, "alice", "wrong")
        .await
        .unwrap());
    assert!(session.decorator().is_none());
}

#[tokio::test]
#[serial]
async fn test_digest_login_without_challenge() {
    let mock_server = setup_mock_server().await;

    Mock::given(method("GET"))
        .and(path("/open"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/basic-only"))
        .respond_with(
            ResponseTemplate::new(401).append_header("www-authenticate", r#"Basic realm="x""#),
        )
        .mount(&mock_server)
        .await;

    let open = RunConfig {
        login_method: LoginMethod::Digest,
        login_path: "/open".to_string(),
        ..RunConfig::default()
    };
    let mut session = session_for(&mock_server);
    assert!(strategy(open).login(&mut session, "alice", "secret").await.unwrap());
    assert!(session.decorator().is_none());

    let basic_only = RunConfig {
        login_method: LoginMethod::Digest,
        login_path: "/basic-only".to_string(),
        ..RunConfig::default()
    };
    let mut session = session_for(&mock_server);
    assert!(!strategy(basic_only)
        .login(&mut session, "alice", "secret")
        .await
        .unwrap());
}
