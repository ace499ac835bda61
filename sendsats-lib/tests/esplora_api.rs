//! Integration tests for the Esplora and mempool.space backends.
//!
//! All tests run against a mock HTTP server; no network access is needed.
//!
//! ```bash
//! cargo test -p sendsats-lib --test esplora_api
//! ```

use sendsats_lib::{
    BalanceProvider, BroadcastProvider, EsploraClient, EsploraConfig, FeeProvider, FeeTier,
    MempoolFeeProvider, SendsatsError, UtxoProvider,
};
use wiremock::{
    matchers::{body_string, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn client_for(server: &MockServer) -> EsploraClient {
    EsploraClient::new(EsploraConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn utxos_carry_confirmation_counts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/address/1SpendableAddr/utxo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {
                "txid": "aa".repeat(32),
                "vout": 0,
                "value": 150_000,
                "status": { "confirmed": true, "block_height": 800_000 }
            },
            {
                "txid": "bb".repeat(32),
                "vout": 1,
                "value": 25_000,
                "status": { "confirmed": false }
            }
        ])))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/blocks/tip/height"))
        .respond_with(ResponseTemplate::new(200).set_body_string("800005"))
        .mount(&server)
        .await;

    let utxos = client_for(&server).utxos("1SpendableAddr").await.unwrap();
    assert_eq!(utxos.len(), 2);
    assert_eq!(utxos[0].amount_sats, 150_000);
    assert_eq!(utxos[0].confirmations, 6);
    assert_eq!(utxos[1].confirmations, 0);
}

#[tokio::test]
async fn empty_utxo_set_skips_tip_lookup() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/address/1EmptyAddr/utxo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    // No tip-height mock mounted; an empty set must not need one.
    let utxos = client_for(&server).utxos("1EmptyAddr").await.unwrap();
    assert!(utxos.is_empty());
}

#[tokio::test]
async fn balance_is_funded_minus_spent() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/address/1RichAddr"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "chain_stats": { "funded_txo_sum": 100_000, "spent_txo_sum": 25_000 },
            "mempool_stats": { "funded_txo_sum": 0, "spent_txo_sum": 0 }
        })))
        .mount(&server)
        .await;

    let sats = client_for(&server).balance_sats("1RichAddr").await.unwrap();
    assert_eq!(sats, 75_000);
}

#[tokio::test]
async fn broadcast_posts_hex_and_trims_txid() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/tx"))
        .and(body_string("0200000001deadbeef"))
        .respond_with(ResponseTemplate::new(200).set_body_string("abc123\n"))
        .mount(&server)
        .await;

    let txid = client_for(&server)
        .broadcast("0200000001deadbeef")
        .await
        .unwrap();
    assert_eq!(txid, "abc123");
}

#[tokio::test]
async fn fee_estimates_map_tiers_to_targets() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fee-estimates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "1": 50.0,
            "3": 25.0,
            "6": 10.0,
            "144": 1.0
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.fee_rate(FeeTier::Fastest).await.unwrap(), 50.0);
    assert_eq!(client.fee_rate(FeeTier::HalfHour).await.unwrap(), 25.0);
    assert_eq!(client.fee_rate(FeeTier::Hour).await.unwrap(), 10.0);
}

#[tokio::test]
async fn fee_estimates_fall_back_to_closest_target() {
    let server = MockServer::start().await;

    // Only a slow target available; every tier resolves to it.
    Mock::given(method("GET"))
        .and(path("/fee-estimates"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "25": 3.5 })),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.fee_rate(FeeTier::Fastest).await.unwrap(), 3.5);
    assert_eq!(client.fee_rate(FeeTier::Hour).await.unwrap(), 3.5);
}

#[tokio::test]
async fn recommended_fees_map_tiers_to_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/fees/recommended"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "fastestFee": 42,
            "halfHourFee": 21,
            "hourFee": 10,
            "economyFee": 4,
            "minimumFee": 1
        })))
        .mount(&server)
        .await;

    let provider = MempoolFeeProvider::new(EsploraConfig::new(server.uri())).unwrap();
    assert_eq!(provider.fee_rate(FeeTier::Fastest).await.unwrap(), 42.0);
    assert_eq!(provider.fee_rate(FeeTier::HalfHour).await.unwrap(), 21.0);
    assert_eq!(provider.fee_rate(FeeTier::Hour).await.unwrap(), 10.0);
}

#[tokio::test]
async fn server_error_maps_to_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/fee-estimates"))
        .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .fee_rate(FeeTier::Fastest)
        .await
        .unwrap_err();
    assert!(matches!(err, SendsatsError::Network(_)), "got {err:?}");
}

#[tokio::test]
async fn malformed_body_maps_to_provider_response() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/address/1BadAddr"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .balance_sats("1BadAddr")
        .await
        .unwrap_err();
    assert!(matches!(err, SendsatsError::ProviderResponse(_)), "got {err:?}");
}
