//! Commands against a mock ledger and service.

use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use tollgate_cli::commands;
use tollgate_cli::{CliConfig, CliError, OutputFormat};
use tollgate_gateway::ServiceTool;
use tollgate_types::{Address, Amount, Currency, ErrorKind, ServiceDescriptor, ServiceId, Url};
use wiremock::matchers::{header_exists, method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Config with a fresh key, the ledger at `server` and one static service.
fn config(dir: &TempDir, server: &MockServer, price: &str) -> CliConfig {
    let config_path = dir.path().join("config.toml");
    let key = dir.path().join("payer.key");
    commands::init(&config_path, OutputFormat::Json, false, Some(&key)).unwrap();

    let mut config = CliConfig::load(&config_path).unwrap();
    config.settlement.base_url = server.uri();
    config.settlement.confirmation_timeout = Duration::from_secs(2);
    config.settlement.poll.base_delay = Duration::from_millis(20);
    config.settlement.poll.max_delay = Duration::from_millis(20);
    config.directory.services = vec![
        descriptor(server, "tavily_search", price),
        descriptor(server, "gpt_researcher", price),
    ];
    config
}

fn descriptor(server: &MockServer, id: &str, price: &str) -> ServiceDescriptor {
    ServiceDescriptor::new(
        ServiceId::new(id).unwrap(),
        Url::parse(&format!("{}/services/{}", server.uri(), id)).unwrap(),
        Amount::parse(price).unwrap(),
        Currency::Usdc,
        Address::from_public_key(&[77u8; 32]),
    )
}

async fn mount_ledger(server: &MockServer, balance: &str) {
    Mock::given(method("GET"))
        .and(path_regex(r"^/accounts/[^/]+/balance$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "balance": balance })))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path_regex(r"^/accounts/[^/]+/nonce$"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "nonce": 0 })))
        .mount(server)
        .await;
}

fn parse(output: &str) -> Value {
    serde_json::from_str(output).unwrap()
}

#[tokio::test]
async fn test_balance_command() {
    let server = MockServer::start().await;
    mount_ledger(&server, "12.5").await;
    let dir = TempDir::new().unwrap();

    let output = commands::balance(config(&dir, &server, "0.01"), OutputFormat::Json, "usdc")
        .await
        .unwrap();
    let json = parse(&output);
    assert_eq!(json["balance"], "12.5");
    assert_eq!(json["currency"], "USDC");
}

#[tokio::test]
async fn test_balance_unknown_currency() {
    let server = MockServer::start().await;
    let dir = TempDir::new().unwrap();

    let err = commands::balance(config(&dir, &server, "0.01"), OutputFormat::Json, "DOGE")
        .await
        .unwrap_err();
    assert!(matches!(err, CliError::User(_)));
}

#[tokio::test]
async fn test_call_pays_then_calls() {
    let server = MockServer::start().await;
    mount_ledger(&server, "1").await;
    Mock::given(method("POST"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "confirmed" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/tavily_search"))
        .and(header_exists("X-Payment-Transaction"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": 42 })))
        .expect(1)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let output = commands::call(
        config(&dir, &server, "0.01"),
        OutputFormat::Json,
        "tavily_search",
        &["query=rust".to_string()],
        Some(10),
    )
    .await
    .unwrap();

    let json = parse(&output);
    assert_eq!(json["state"], "COMPLETED");
    assert_eq!(json["amount"], "0.01");
    assert_eq!(json["result"], json!({ "answer": 42 }));
    assert!(json["transaction_id"].is_string());
}

#[tokio::test]
async fn test_call_with_empty_balance() {
    let server = MockServer::start().await;
    mount_ledger(&server, "0").await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let err = commands::call(
        config(&dir, &server, "0.01"),
        OutputFormat::Human,
        "tavily_search",
        &[],
        None,
    )
    .await
    .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert_eq!(err.exit_code(), 4);
}

#[tokio::test]
async fn test_search_tool_renders_text() {
    let server = MockServer::start().await;
    mount_ledger(&server, "1").await;
    Mock::given(method("POST"))
        .and(path("/transactions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "confirmed" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/services/tavily_search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("Rust 1.0 shipped in 2015."))
        .mount(&server)
        .await;
    let dir = TempDir::new().unwrap();

    let output = commands::tool(
        config(&dir, &server, "0.01"),
        OutputFormat::Json,
        ServiceTool::TavilySearch,
        "when did rust ship",
    )
    .await
    .unwrap();

    let json = parse(&output);
    assert_eq!(json["tool"], "Tavily Search");
    assert_eq!(json["output"], "Rust 1.0 shipped in 2015.");
}

#[test]
fn test_init_then_load_from_disk() {
    let dir = TempDir::new().unwrap();
    let config_path = dir.path().join("config.toml");
    commands::init(&config_path, OutputFormat::Human, false, None).unwrap();
    assert!(Path::new(&config_path).exists());
    assert_eq!(CliConfig::load(&config_path).unwrap(), CliConfig::default());
}
