//! Integration tests for connection management and token acquisition

use strata_api::testing::MockStrataServer;
use strata_core::ConnectionManager;
use strata_core::config::{Config, Profile, ResilienceConfig, RetryConfig};
use strata_core::error::CoreError;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

fn clear_strata_env() {
    for key in ["STRATA_API_URL", "STRATA_ACCESS_KEY", "STRATA_SECRET_KEY"] {
        unsafe { std::env::remove_var(key) };
    }
}

fn config_for(server: &MockStrataServer) -> Config {
    let mut config = Config::default();
    config.profiles.insert(
        "test".to_string(),
        Profile {
            endpoint: server.uri(),
            access_key: "ak-123".to_string(),
            secret_key: "sk-456".to_string(),
            insecure: false,
            resilience: Some(ResilienceConfig {
                retry: RetryConfig {
                    enabled: true,
                    max_attempts: 3,
                    backoff_ms: 5,
                    max_backoff_ms: 20,
                },
                ..ResilienceConfig::default()
            }),
        },
    );
    config
}

async fn token_request_count(server: &MockStrataServer) -> usize {
    server
        .server()
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.url.path() == "/auth/token")
        .count()
}

#[tokio::test]
#[serial_test::serial]
async fn token_acquisition_retries_transient_failures() {
    clear_strata_env();
    let server = MockStrataServer::start().await;
    server.mock_token_flaky(2, "tok-1").await;

    let manager = ConnectionManager::new(config_for(&server));
    let client = manager.create_client(Some("test")).await.unwrap();

    assert_eq!(client.base_url(), server.uri().trim_end_matches('/'));
    // Two 503s, then success: exactly three attempts.
    assert_eq!(token_request_count(&server).await, 3);
}

#[tokio::test]
#[serial_test::serial]
async fn token_acquisition_gives_up_after_the_attempt_budget() {
    clear_strata_env();
    let server = MockStrataServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(server.server())
        .await;

    let manager = ConnectionManager::new(config_for(&server));
    let err = manager.create_client(Some("test")).await.unwrap_err();

    assert!(matches!(err, CoreError::Api(ref e) if e.is_server_error()));
    assert_eq!(token_request_count(&server).await, 3);
}

#[tokio::test]
#[serial_test::serial]
async fn permanent_auth_failure_is_not_retried() {
    clear_strata_env();
    let server = MockStrataServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/token"))
        .respond_with(
            ResponseTemplate::new(401)
                .set_body_json(serde_json::json!({ "message": "unknown access key" })),
        )
        .mount(server.server())
        .await;

    let manager = ConnectionManager::new(config_for(&server));
    let err = manager.create_client(Some("test")).await.unwrap_err();

    assert!(matches!(err, CoreError::Api(ref e) if e.is_unauthorized()));
    assert_eq!(token_request_count(&server).await, 1);
}

#[tokio::test]
#[serial_test::serial]
async fn environment_variables_bypass_profiles() {
    let server = MockStrataServer::start().await;
    server.mock_token("tok-env").await;

    unsafe {
        std::env::set_var("STRATA_API_URL", server.uri());
        std::env::set_var("STRATA_ACCESS_KEY", "env-ak");
        std::env::set_var("STRATA_SECRET_KEY", "env-sk");
    }

    // Empty config: the environment supplies everything.
    let manager = ConnectionManager::new(Config::default());
    let result = manager.create_client(None).await;
    clear_strata_env();

    result.unwrap();
    assert_eq!(token_request_count(&server).await, 1);
}

#[tokio::test]
#[serial_test::serial]
async fn missing_profile_is_a_config_error() {
    clear_strata_env();
    let manager = ConnectionManager::new(Config::default());
    let err = manager.create_client(Some("nope")).await.unwrap_err();
    assert!(matches!(err, CoreError::Config(_)));
}
