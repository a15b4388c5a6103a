// Integration tests for session management, the device cycle runner,
// and the fleet scheduler, using wiremock as the control API.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::json;
use wiremock::matchers::{body_json, body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use rigctl_api::{MinerAddr, MinerClient, TransportConfig};
use rigctl_core::{
    CurtailMode, CycleRunner, FleetConfig, FleetScheduler, Profile, ScheduleWindow,
    SessionManager, StepStatus,
};

// ── Helpers ─────────────────────────────────────────────────────────

const ATTEMPTS: u32 = 2;

fn transport() -> TransportConfig {
    TransportConfig {
        timeout: Duration::from_secs(5),
        backoff_unit: Duration::from_millis(5),
    }
}

fn api_client(server: &MockServer) -> Arc<MinerClient> {
    Arc::new(MinerClient::new(server.uri().parse().unwrap(), &transport()).unwrap())
}

fn runner(server: &MockServer) -> (CycleRunner, Arc<SessionManager>) {
    let client = api_client(server);
    let sessions = Arc::new(SessionManager::new(Arc::clone(&client), ATTEMPTS));
    (
        CycleRunner::new(client, Arc::clone(&sessions), ATTEMPTS),
        sessions,
    )
}

fn window() -> ScheduleWindow {
    ScheduleWindow {
        profile: Profile::Normal,
        curtail_mode: CurtailMode::Active,
        next_transition: Utc::now(),
    }
}

async fn mount_ok(server: &MockServer, endpoint: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/{endpoint}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(times)
        .mount(server)
        .await;
}

// ── Session manager ─────────────────────────────────────────────────

#[tokio::test]
async fn login_stores_and_returns_token() {
    let server = MockServer::start().await;
    let client = api_client(&server);
    let sessions = SessionManager::new(client, ATTEMPTS);
    let miner = MinerAddr::from("192.168.0.1");

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "miner_ip": "192.168.0.1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "t0k",
            "ttl": "2026-12-31T00:00:00Z",
        })))
        .expect(1)
        .mount(&server)
        .await;

    let token = sessions.login(&miner).await.expect("login should succeed");
    assert_eq!(token.value, "t0k");
    assert!(token.ttl.is_some());
    assert_eq!(sessions.token(&miner), Some(token));
    assert_eq!(sessions.live_sessions(), 1);
}

#[tokio::test]
async fn login_without_ttl_still_succeeds() {
    let server = MockServer::start().await;
    let client = api_client(&server);
    let sessions = SessionManager::new(client, ATTEMPTS);
    let miner = MinerAddr::from("192.168.0.1");

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t0k" })))
        .mount(&server)
        .await;

    let token = sessions.login(&miner).await.expect("login should succeed");
    assert_eq!(token.value, "t0k");
    assert!(token.ttl.is_none());
    assert!(sessions.token(&miner).is_some());
}

#[tokio::test]
async fn login_without_token_field_stores_nothing() {
    let server = MockServer::start().await;
    let client = api_client(&server);
    let sessions = SessionManager::new(client, ATTEMPTS);
    let miner = MinerAddr::from("192.168.0.1");

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ttl": null })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(sessions.login(&miner).await.is_none());
    assert!(sessions.token(&miner).is_none());
    assert_eq!(sessions.live_sessions(), 0);
}

#[tokio::test]
async fn logout_removes_token_and_is_idempotent() {
    let server = MockServer::start().await;
    let client = api_client(&server);
    let sessions = SessionManager::new(client, ATTEMPTS);
    let miner = MinerAddr::from("192.168.0.1");

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t0k" })))
        .mount(&server)
        .await;
    mount_ok(&server, "logout", 2).await;

    sessions.login(&miner).await.expect("login should succeed");
    assert!(sessions.logout(&miner).await);
    assert!(sessions.token(&miner).is_none());

    // No stored token -- still not an error.
    assert!(sessions.logout(&miner).await);
}

#[tokio::test]
async fn failed_logout_retains_token() {
    let server = MockServer::start().await;
    let client = api_client(&server);
    let sessions = SessionManager::new(client, ATTEMPTS);
    let miner = MinerAddr::from("192.168.0.1");

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t0k" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "boom" })))
        .expect(u64::from(ATTEMPTS))
        .mount(&server)
        .await;

    sessions.login(&miner).await.expect("login should succeed");
    assert!(!sessions.logout(&miner).await);
    assert!(sessions.token(&miner).is_some());
}

// ── Cycle runner ────────────────────────────────────────────────────

#[tokio::test]
async fn happy_path_cycle_is_clean() {
    let server = MockServer::start().await;
    let (runner, _) = runner(&server);
    let miner = MinerAddr::from("192.168.0.1");

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t0k" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_ok(&server, "curtail", 1).await;
    mount_ok(&server, "profileset", 1).await;
    mount_ok(&server, "logout", 1).await;

    let report = runner.run(&miner, &window()).await;
    assert!(report.is_clean(), "{report:?}");
}

#[tokio::test]
async fn failed_login_skips_all_remaining_steps() {
    let server = MockServer::start().await;
    let (runner, _) = runner(&server);
    let miner = MinerAddr::from("192.168.0.1");

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "down" })))
        .expect(u64::from(ATTEMPTS))
        .mount(&server)
        .await;
    mount_ok(&server, "curtail", 0).await;
    mount_ok(&server, "profileset", 0).await;
    mount_ok(&server, "logout", 0).await;

    let report = runner.run(&miner, &window()).await;
    assert_eq!(report.login, StepStatus::Failed);
    assert_eq!(report.curtail, StepStatus::Skipped);
    assert_eq!(report.profile, StepStatus::Skipped);
    assert_eq!(report.logout, StepStatus::Skipped);
}

#[tokio::test]
async fn unauthorized_setter_relogs_in_and_retries_once() {
    let server = MockServer::start().await;
    let (runner, sessions) = runner(&server);
    let miner = MinerAddr::from("192.168.0.1");

    // Initial login + one re-login triggered by the 401.
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "fresh" })))
        .expect(2)
        .mount(&server)
        .await;

    // First curtail call is rejected as unauthorized, the retry passes.
    Mock::given(method("POST"))
        .and(path("/curtail"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "bad token" })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_ok(&server, "curtail", 1).await;
    mount_ok(&server, "profileset", 1).await;
    mount_ok(&server, "logout", 1).await;

    let report = runner.run(&miner, &window()).await;
    assert!(report.is_clean(), "{report:?}");
    // Logout at the end of the cycle removed the re-login's token.
    assert_eq!(sessions.live_sessions(), 0);
}

#[tokio::test]
async fn failed_relogin_abandons_setter_but_not_siblings() {
    let server = MockServer::start().await;
    let (runner, _) = runner(&server);
    let miner = MinerAddr::from("192.168.0.1");

    // Initial login succeeds; the re-login attempt hits a dead server.
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t0k" })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "down" })))
        .mount(&server)
        .await;

    // Curtail is permanently unauthorized: the setter gives up after one
    // failed re-login instead of recursing.
    Mock::given(method("POST"))
        .and(path("/curtail"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({ "message": "bad token" })))
        .expect(1)
        .mount(&server)
        .await;
    mount_ok(&server, "profileset", 1).await;
    mount_ok(&server, "logout", 1).await;

    let report = runner.run(&miner, &window()).await;
    assert_eq!(report.curtail, StepStatus::Failed);
    assert_eq!(report.profile, StepStatus::Applied);
    assert_eq!(report.logout, StepStatus::Applied);
}

// ── Fleet scheduler ─────────────────────────────────────────────────

fn fleet_config(server: &MockServer, miners: &[&str]) -> FleetConfig {
    let mut config = FleetConfig::new(
        server.uri().parse().unwrap(),
        miners.iter().map(|m| MinerAddr::from(*m)).collect(),
    );
    config.max_attempts = ATTEMPTS;
    config.cycles = Some(1);
    config
}

#[tokio::test]
async fn one_cycle_makes_four_calls_per_device() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t0k" })))
        .expect(2)
        .mount(&server)
        .await;
    mount_ok(&server, "curtail", 2).await;
    mount_ok(&server, "profileset", 2).await;
    mount_ok(&server, "logout", 2).await;

    let config = fleet_config(&server, &["10.0.0.1", "10.0.0.2"]);
    let scheduler = FleetScheduler::with_transport(config, &transport()).unwrap();
    scheduler.run().await;

    // Mock expectations (2 x 4 calls, no retries) verify on drop.
}

#[tokio::test]
async fn one_failing_device_does_not_affect_the_other() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "miner_ip": "10.0.0.1" })))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "message": "down" })))
        .expect(u64::from(ATTEMPTS))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .and(body_json(json!({ "miner_ip": "10.0.0.2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "tokB" })))
        .expect(1)
        .mount(&server)
        .await;

    // Only the healthy device reaches the remaining three endpoints.
    Mock::given(method("POST"))
        .and(path("/curtail"))
        .and(body_partial_json(json!({ "token": "tokB" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/profileset"))
        .and(body_partial_json(json!({ "token": "tokB" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/logout"))
        .and(body_json(json!({ "miner_ip": "10.0.0.2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let config = fleet_config(&server, &["10.0.0.1", "10.0.0.2"]);
    let scheduler = FleetScheduler::with_transport(config, &transport()).unwrap();
    scheduler.run().await;
}

#[tokio::test]
async fn duplicate_inventory_entries_are_processed_independently() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": "t0k" })))
        .expect(2)
        .mount(&server)
        .await;
    mount_ok(&server, "curtail", 2).await;
    mount_ok(&server, "profileset", 2).await;
    mount_ok(&server, "logout", 2).await;

    let config = fleet_config(&server, &["10.0.0.1", "10.0.0.1"]);
    let scheduler = FleetScheduler::with_transport(config, &transport()).unwrap();
    scheduler.run().await;
}
