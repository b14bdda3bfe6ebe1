/*
[INPUT]:  Mock platform and ledger responses, temporary data directories
[OUTPUT]: Test results for the CLI command flows
[POS]:    Integration tests - CLI application
[UPDATE]: When subcommands or their wiring change
*/

use std::path::PathBuf;

use scholarpay_cli::{App, CliConfig, describe_failure};
use scholarpay_core::auth::verify_challenge_signature;
use scholarpay_core::{ErrorKind, PublicKey, StellarKeypair, SubmissionResult, VerifyRequest};
use tokio_test::assert_ok;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

struct CheckSignature;

impl Respond for CheckSignature {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let body: VerifyRequest = match serde_json::from_slice(&request.body) {
            Ok(body) => body,
            Err(_) => return ResponseTemplate::new(400),
        };
        let valid = body
            .public_key
            .parse::<PublicKey>()
            .map(|key| verify_challenge_signature(&key, &body.challenge, &body.signature))
            .unwrap_or(false);
        if valid {
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"token": "cli-session"}))
        } else {
            ResponseTemplate::new(401).set_body_json(serde_json::json!({"detail": "bad signature"}))
        }
    }
}

fn temp_data_dir() -> PathBuf {
    std::env::temp_dir().join(format!("scholarpay-cli-{}", uuid::Uuid::new_v4()))
}

fn config_for(server: &MockServer, data_dir: &PathBuf) -> CliConfig {
    CliConfig {
        api_base_url: server.uri(),
        ledger_base_url: server.uri(),
        data_dir: Some(data_dir.clone()),
        ..CliConfig::default()
    }
}

async fn mount_auth(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/challenge"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"challenge": "cli-nonce"})))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/verify"))
        .respond_with(CheckSignature)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/verify-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"valid": true})))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_login_requires_key() {
    let server = MockServer::start().await;
    let data_dir = temp_data_dir();
    let app = assert_ok!(App::new(config_for(&server, &data_dir)));

    let err = app.login().await.unwrap_err();
    assert!(err.to_string().contains("keygen"));
}

#[tokio::test]
async fn test_keygen_login_status_logout() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    let data_dir = temp_data_dir();

    let public_key = {
        let app = assert_ok!(App::new(config_for(&server, &data_dir)));
        assert_ok!(app.keygen(false))
    };

    // A fresh process picks up the stored key and logs in with it
    let app = assert_ok!(App::new(config_for(&server, &data_dir)));
    let identity = assert_ok!(app.login().await);
    assert_eq!(identity.public_key(), Some(&public_key));

    // Another process restores the stored session
    let restored = assert_ok!(App::new(config_for(&server, &data_dir)));
    let identity = assert_ok!(restored.status().await);
    assert!(identity.is_authenticated());
    assert_eq!(identity.public_key(), Some(&public_key));

    restored.logout();
    let after = assert_ok!(App::new(config_for(&server, &data_dir)));
    assert!(!assert_ok!(after.status().await).is_authenticated());

    let _ = std::fs::remove_dir_all(&data_dir);
}

#[tokio::test]
async fn test_donate_requires_login() {
    let server = MockServer::start().await;
    let data_dir = temp_data_dir();
    let app = assert_ok!(App::new(config_for(&server, &data_dir)));

    let recipient = StellarKeypair::generate().public_key();
    let err = app
        .donate(recipient.as_str(), "5", None, None)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("not logged in"));
}

#[tokio::test]
async fn test_donate_after_login() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    let data_dir = temp_data_dir();

    let app = assert_ok!(App::new(config_for(&server, &data_dir)));
    let donor = assert_ok!(app.keygen(false));
    assert_ok!(app.login().await);

    Mock::given(method("GET"))
        .and(path(format!("/ledger/accounts/{donor}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"sequence": "12"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ledger/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"hash": "feedbeef"})))
        .expect(1)
        .mount(&server)
        .await;

    let recipient = StellarKeypair::generate().public_key();
    let result = assert_ok!(
        app.donate(recipient.as_str(), "2.5", Some("books"), Some(60))
            .await
    );
    assert_eq!(
        result,
        SubmissionResult::Success {
            hash: "feedbeef".to_string()
        }
    );

    let _ = std::fs::remove_dir_all(&data_dir);
}

#[tokio::test]
async fn test_rejected_donation_is_described_for_the_user() {
    let server = MockServer::start().await;
    mount_auth(&server).await;
    let data_dir = temp_data_dir();

    let app = assert_ok!(App::new(config_for(&server, &data_dir)));
    let donor = assert_ok!(app.keygen(false));
    assert_ok!(app.login().await);

    Mock::given(method("GET"))
        .and(path(format!("/ledger/accounts/{donor}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"sequence": "12"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/ledger/transactions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "errorDetail": "tx_failed: op_underfunded"
        })))
        .mount(&server)
        .await;

    let recipient = StellarKeypair::generate().public_key();
    let result = assert_ok!(app.donate(recipient.as_str(), "900", None, None).await);
    let SubmissionResult::Failure { kind, detail } = result else {
        panic!("expected a failed donation");
    };
    assert_eq!(kind, ErrorKind::LedgerRejected);

    let line = describe_failure(kind, &detail);
    assert!(line.starts_with(ErrorKind::LedgerRejected.user_message()));
    assert!(line.contains("tx_failed: op_underfunded"));

    let _ = std::fs::remove_dir_all(&data_dir);
}
