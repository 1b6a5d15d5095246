use futures::future::BoxFuture;
use mockito::{Matcher, Server};
use reqwest::{Client, StatusCode};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use stellar_paygate::{
    client::{fetch_with_payment, PaymentHandler},
    error::PaygateError,
    models::{Network, PaymentReceipt, PaymentTerms},
};

type PayFuture = BoxFuture<'static, anyhow::Result<Option<PaymentReceipt>>>;

fn paying(hash: &'static str, calls: Arc<AtomicUsize>) -> impl Fn(PaymentTerms) -> PayFuture {
    move |terms: PaymentTerms| -> PayFuture {
        calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            assert_eq!(terms.network, Network::Testnet);
            assert_eq!(terms.destination, "GDEST");
            Ok(Some(PaymentReceipt::without_timestamp(hash)))
        })
    }
}

fn declining() -> impl Fn(PaymentTerms) -> PayFuture {
    |_terms: PaymentTerms| -> PayFuture { Box::pin(async { Ok(None) }) }
}

async fn paywalled(server: &mut Server) -> mockito::Mock {
    server
        .mock("GET", "/premium")
        .match_header("x-402-transaction-hash", Matcher::Missing)
        .with_status(402)
        .with_header("X-402-Amount", "1")
        .with_header("X-402-Asset-Code", "XLM")
        .with_header("X-402-Network", "testnet")
        .with_header("X-402-Destination", "GDEST")
        .with_body(r#"{"error":"Payment Required"}"#)
        .expect(1)
        .create_async()
        .await
}

#[tokio::test]
async fn pays_and_retries_once_with_receipt() {
    let mut server = Server::new_async().await;
    let challenge = paywalled(&mut server).await;
    let paid = server
        .mock("GET", "/premium")
        .match_header("x-402-transaction-hash", "xyz")
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .expect(1)
        .create_async()
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let handler = paying("xyz", calls.clone());
    let client = Client::new();
    let request = client.get(format!("{}/premium", server.url())).build().unwrap();

    let response = fetch_with_payment(&client, request, Some(&handler)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), r#"{"ok":true}"#);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    challenge.assert_async().await;
    paid.assert_async().await;
}

#[tokio::test]
async fn non_402_passes_through_without_handler() {
    let mut server = Server::new_async().await;
    let _free = server
        .mock("GET", "/free")
        .with_status(200)
        .create_async()
        .await;

    let client = Client::new();
    let request = client.get(format!("{}/free", server.url())).build().unwrap();
    let response = fetch_with_payment(&client, request, None).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn incomplete_terms_return_original_402() {
    let mut server = Server::new_async().await;
    let _partial = server
        .mock("GET", "/premium")
        .with_status(402)
        .with_header("X-402-Amount", "1")
        .expect(1)
        .create_async()
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let handler = paying("xyz", calls.clone());
    let client = Client::new();
    let request = client.get(format!("{}/premium", server.url())).build().unwrap();

    let response = fetch_with_payment(&client, request, Some(&handler)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_handler_is_an_error() {
    let mut server = Server::new_async().await;
    let _challenge = paywalled(&mut server).await;

    let client = Client::new();
    let request = client.get(format!("{}/premium", server.url())).build().unwrap();
    let result = fetch_with_payment(&client, request, None).await;

    assert!(matches!(result, Err(PaygateError::MissingPaymentHandler)));
}

#[tokio::test]
async fn declined_payment_returns_original_402() {
    let mut server = Server::new_async().await;
    let challenge = paywalled(&mut server).await;

    let handler = declining();
    let client = Client::new();
    let request = client.get(format!("{}/premium", server.url())).build().unwrap();
    let response = fetch_with_payment(&client, request, Some(&handler)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    challenge.assert_async().await;
}

#[tokio::test]
async fn second_402_is_surfaced_without_another_payment() {
    let mut server = Server::new_async().await;
    let _challenge = paywalled(&mut server).await;
    let rejected = server
        .mock("GET", "/premium")
        .match_header("x-402-transaction-hash", "bogus")
        .with_status(402)
        .with_header("X-402-Amount", "1")
        .with_header("X-402-Asset-Code", "XLM")
        .with_header("X-402-Network", "testnet")
        .with_header("X-402-Destination", "GDEST")
        .expect(1)
        .create_async()
        .await;

    let calls = Arc::new(AtomicUsize::new(0));
    let handler = paying("bogus", calls.clone());
    let client = Client::new();
    let request = client.get(format!("{}/premium", server.url())).build().unwrap();
    let response = fetch_with_payment(&client, request, Some(&handler)).await.unwrap();

    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    rejected.assert_async().await;
}

#[tokio::test]
async fn handler_can_be_a_trait_object() {
    let mut server = Server::new_async().await;
    let _challenge = paywalled(&mut server).await;
    let _paid = server
        .mock("GET", "/premium")
        .match_header("x-402-transaction-hash", "xyz")
        .with_status(200)
        .create_async()
        .await;

    let handler: Box<dyn PaymentHandler> = Box::new(paying("xyz", Arc::new(AtomicUsize::new(0))));
    let client = Client::new();
    let request = client.get(format!("{}/premium", server.url())).build().unwrap();
    let response = fetch_with_payment(&client, request, Some(handler.as_ref())).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
