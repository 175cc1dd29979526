//! HTTP service calls against a mock server.

use std::time::Duration;

use serde_json::json;
use tollgate_gateway::{ExecutionError, HttpExecutor, ServiceExecutor, ServiceTool, PAYMENT_HEADER};
use tollgate_test_utils::{amount, test_payee};
use tollgate_types::{
    Address, Currency, PaymentReceipt, RequestId, ServiceDescriptor, ServiceId, TransactionId, Url,
};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn descriptor(server: &MockServer) -> ServiceDescriptor {
    ServiceDescriptor::new(
        ServiceId::new("tavily_search").unwrap(),
        Url::parse(&format!("{}/search", server.uri())).unwrap(),
        amount("0.01"),
        Currency::Usdc,
        test_payee(),
    )
}

fn confirmed_receipt() -> PaymentReceipt {
    let mut receipt = PaymentReceipt::pending(
        TransactionId::new("cafe".repeat(16)),
        RequestId::new(),
        Address::from_public_key(&[1u8; 32]),
        test_payee(),
        amount("0.01"),
        Currency::Usdc,
    );
    receipt.confirm().unwrap();
    receipt
}

#[tokio::test]
async fn test_posts_parameters_with_payment_proof() {
    let server = MockServer::start().await;
    let receipt = confirmed_receipt();
    let tx = receipt.transaction_id.as_str().to_string();

    Mock::given(method("POST"))
        .and(path("/search"))
        .and(header(PAYMENT_HEADER, tx.as_str()))
        .and(body_partial_json(json!({
            "parameters": { "query": "rust" },
            "transaction_id": tx,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "answer": 42 })))
        .expect(1)
        .mount(&server)
        .await;

    let result = HttpExecutor::new()
        .unwrap()
        .execute(&descriptor(&server), &ServiceTool::parameters("rust"), &receipt)
        .await
        .unwrap();
    assert_eq!(result, json!({ "answer": 42 }));
}

#[tokio::test]
async fn test_plain_text_body_becomes_string() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("plain answer"))
        .mount(&server)
        .await;

    let result = HttpExecutor::new()
        .unwrap()
        .execute(&descriptor(&server), &ServiceTool::parameters("q"), &confirmed_receipt())
        .await
        .unwrap();
    assert_eq!(result, json!("plain answer"));
}

#[tokio::test]
async fn test_non_success_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = HttpExecutor::new()
        .unwrap()
        .execute(&descriptor(&server), &ServiceTool::parameters("q"), &confirmed_receipt())
        .await
        .unwrap_err();
    match err {
        ExecutionError::Status { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected Status, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_service_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let err = HttpExecutor::with_timeout(Duration::from_millis(100))
        .unwrap()
        .execute(&descriptor(&server), &ServiceTool::parameters("q"), &confirmed_receipt())
        .await
        .unwrap_err();
    assert!(matches!(err, ExecutionError::Transport(_)));
}
