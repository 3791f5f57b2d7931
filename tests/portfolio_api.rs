//! End-to-end tests for `POST /api/portfolio` against a mock upstream.

use serde_json::{json, Value};

mod common;

use common::{client, config_for, start_aggregator, start_mock_upstream, MockRequest};

const BTC_ADDRESS: &str = "bc1qxy2kgdygjrsqtzq2n0yrf2493p83kkfjhx0wlh";
const SOL_A: &str = "11111111111111111111111111111111";
const SOL_B: &str = "So11111111111111111111111111111111111111112";
const STAKE_ADDRESS: &str = "stake1u9ylzsgxaa6xctf4juup682ar3juj85n8tx3hthnljg47zctvm3rc";

fn prices(body: Value) -> (u16, String) {
    (200, body.to_string())
}

/// Healthy upstream: 0.5 BTC, 2.5 SOL per wallet, 10 ADA, fixed prices.
fn healthy(req: &MockRequest) -> (u16, String) {
    let path = req.path.as_str();
    if path.starts_with("/esplora/address/") && path.ends_with("/txs") {
        return (
            200,
            json!([
                {"txid": "b1", "status": {"confirmed": true, "block_time": 1704067200}},
                {"txid": "b2", "status": {"confirmed": false}}
            ])
            .to_string(),
        );
    }
    if path.starts_with("/esplora/address/") {
        return (
            200,
            json!({
                "chain_stats": {"funded_txo_sum": 60_000_000, "spent_txo_sum": 10_000_000},
                "mempool_stats": {"funded_txo_sum": 0, "spent_txo_sum": 0}
            })
            .to_string(),
        );
    }
    if path == "/solana" {
        let body = req.json_body();
        return match body["method"].as_str() {
            Some("getBalance") => (
                200,
                json!({"jsonrpc": "2.0", "id": 1, "result": {"context": {"slot": 1}, "value": 2_500_000_000u64}})
                    .to_string(),
            ),
            _ => (
                200,
                json!({"jsonrpc": "2.0", "id": 1, "result": [
                    {"signature": "s1", "err": null, "blockTime": 1704067200},
                    {"signature": "s2", "err": {"InstructionError": [0, "Custom"]}, "blockTime": null}
                ]})
                .to_string(),
            ),
        };
    }
    if path == "/koios/account_info" {
        return (200, json!([{"total_balance": "10000000"}]).to_string());
    }
    if path == "/koios/account_txs" {
        return (200, json!([{"tx_hash": "a1", "block_time": 1704067200}]).to_string());
    }
    if path == "/coingecko/simple/price" {
        return prices(json!({
            "bitcoin": {"usd": 60000.0, "eur": 55000.0, "chf": 53000.0},
            "solana": {"usd": 100.0, "eur": 90.0, "chf": 88.0},
            "cardano": {"usd": 0.5, "eur": 0.45, "chf": 0.44}
        }));
    }
    (404, json!({"error": "not found"}).to_string())
}

async fn post_portfolio(url: &str, body: Value) -> (u16, Value) {
    let res = client().post(url).json(&body).send().await.unwrap();
    let status = res.status().as_u16();
    (status, res.json().await.unwrap())
}

#[tokio::test]
async fn test_btc_valuation_alongside_unsupported_chain() {
    let (upstream, _hits) = start_mock_upstream(healthy).await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [
            {"chain": "BTC", "address": BTC_ADDRESS},
            {"chain": "XYZ", "address": "foo"}
        ]}),
    )
    .await;

    assert_eq!(status, 200);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 2);

    let btc = &entries[0];
    assert_eq!(btc["chain"], "BTC");
    assert_eq!(btc["address"], BTC_ADDRESS);
    assert_eq!(btc["balance"], 0.5);
    assert_eq!(btc["price"]["usd"], 60000.0);
    assert_eq!(btc["value"]["usd"], 30000.0);
    assert_eq!(btc["value"]["eur"], 27500.0);
    assert_eq!(btc["transactions"][0]["hash"], "b1");
    assert_eq!(btc["transactions"][0]["label"], "Confirmed");
    assert_eq!(btc["transactions"][0]["date"], "1/1/2024");
    assert_eq!(btc["transactions"][0]["kind"], "TX");
    assert_eq!(btc["transactions"][1]["label"], "Pending...");
    assert_eq!(btc["transactions"][1]["date"], "Mempool");

    assert_eq!(
        entries[1],
        json!({"chain": "XYZ", "address": "foo", "error": "Unsupported Chain"})
    );
}

#[tokio::test]
async fn test_missing_wallets_is_rejected() {
    let (upstream, hits) = start_mock_upstream(healthy).await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(&app.url("/api/portfolio"), json!({})).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Invalid input"}));
    assert!(hits.all().is_empty());
}

#[tokio::test]
async fn test_prices_fetched_once_per_request() {
    let (upstream, hits) = start_mock_upstream(healthy).await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [
            {"chain": "SOL", "address": SOL_A},
            {"chain": "SOL", "address": SOL_B}
        ]}),
    )
    .await;

    assert_eq!(status, 200);
    for entry in body.as_array().unwrap() {
        assert_eq!(entry["balance"], 2.5);
        assert_eq!(entry["value"]["usd"], 250.0);
        assert_eq!(entry["transactions"][0]["kind"], "Success");
        assert_eq!(entry["transactions"][1]["kind"], "Fail");
        assert_eq!(entry["transactions"][1]["date"], "Pending");
    }

    let price_calls = hits.with_prefix("/coingecko");
    assert_eq!(price_calls.len(), 1);
    assert!(price_calls[0].query.contains("ids=solana&"));
}

#[tokio::test]
async fn test_price_outage_reports_zero_values() {
    let (upstream, _hits) = start_mock_upstream(|req: &MockRequest| {
        if req.path.starts_with("/coingecko") {
            (500, "{}".to_string())
        } else {
            healthy(req)
        }
    })
    .await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [{"chain": "BTC", "address": BTC_ADDRESS}]}),
    )
    .await;

    assert_eq!(status, 200);
    let btc = &body[0];
    assert_eq!(btc["balance"], 0.5);
    assert_eq!(btc["price"], json!({"usd": 0.0, "eur": 0.0, "chf": 0.0}));
    assert_eq!(btc["value"], json!({"usd": 0.0, "eur": 0.0, "chf": 0.0}));
}

#[tokio::test]
async fn test_cardano_history_outage_keeps_balance() {
    let (upstream, _hits) = start_mock_upstream(|req: &MockRequest| {
        if req.path == "/koios/account_txs" {
            (500, "{}".to_string())
        } else {
            healthy(req)
        }
    })
    .await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [{"chain": "ADA", "address": STAKE_ADDRESS}]}),
    )
    .await;

    assert_eq!(status, 200);
    let ada = &body[0];
    assert_eq!(ada["balance"], 10.0);
    assert_eq!(ada["value"]["usd"], 5.0);
    assert_eq!(
        ada["transactions"],
        json!([{
            "hash": "",
            "label": "history temporarily unavailable",
            "date": "Info",
            "kind": "INFO"
        }])
    );
}

#[tokio::test]
async fn test_invalid_btc_characters_skip_upstream() {
    let (upstream, hits) = start_mock_upstream(healthy).await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [{"chain": "BTC", "address": "!"}]}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!([{"chain": "BTC", "address": "!", "error": "invalid characters"}])
    );
    assert!(hits.with_prefix("/esplora").is_empty());
    assert!(hits.with_prefix("/btcinfo").is_empty());
    assert!(hits.with_prefix("/coingecko").is_empty());
}

#[tokio::test]
async fn test_response_order_matches_request() {
    let (upstream, _hits) = start_mock_upstream(healthy).await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [
            {"chain": "ADA", "address": STAKE_ADDRESS},
            {"chain": "DOGE", "address": "d1"},
            {"chain": "SOL", "address": "not-base58-0OIl"},
            {"chain": "BTC", "address": BTC_ADDRESS},
            {"chain": "SOL", "address": SOL_A}
        ]}),
    )
    .await;

    assert_eq!(status, 200);
    let chains: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["chain"].as_str().unwrap())
        .collect();
    assert_eq!(chains, vec!["ADA", "DOGE", "SOL", "BTC", "SOL"]);
    assert_eq!(body[1]["error"], "Unsupported Chain");
    assert_eq!(body[2]["error"], "invalid address");
    assert_eq!(body[4]["address"], SOL_A);
    assert!(body[4].get("error").is_none());
}

#[tokio::test]
async fn test_request_id_header_and_health() {
    let (upstream, _hits) = start_mock_upstream(healthy).await;
    let app = start_aggregator(config_for(upstream)).await;

    let res = client()
        .post(app.url("/api/portfolio"))
        .json(&json!({"wallets": []}))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status().as_u16(), 200);
    assert!(res.headers().contains_key("x-request-id"));

    let res = client()
        .get(app.url("/health"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_malformed_elements_stay_in_their_slots() {
    let (upstream, hits) = start_mock_upstream(|req: &MockRequest| {
        if req.path == "/blockscout/api" {
            (200, json!({"status": "1", "result": "1000000000000000000"}).to_string())
        } else {
            healthy(req)
        }
    })
    .await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [
            {"chain": "ETH", "address": "0xabc"},
            {"chain": 7, "address": "x"},
            {"chain": "XYZ"}
        ]}),
    )
    .await;

    assert_eq!(status, 200);
    let entries = body.as_array().unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["chain"], "ETH");
    assert_eq!(entries[0]["balance"], 1.0);
    assert_eq!(
        entries[1],
        json!({"chain": "7", "address": "x", "error": "Unsupported Chain"})
    );
    assert_eq!(
        entries[2],
        json!({"chain": "XYZ", "address": "", "error": "Unsupported Chain"})
    );
    assert_eq!(hits.with_prefix("/blockscout").len(), 1);
}

#[tokio::test]
async fn test_non_array_wallets_is_rejected() {
    let (upstream, _hits) = start_mock_upstream(healthy).await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) =
        post_portfolio(&app.url("/api/portfolio"), json!({"wallets": {"chain": "BTC"}})).await;

    assert_eq!(status, 400);
    assert_eq!(body, json!({"error": "Invalid input"}));
}

#[tokio::test]
async fn test_xpub_reports_aggregate_activity() {
    const XPUB: &str = "xpub6CUGRUonZSQ4TWtTMmzXdrXDtypWKiKrhko4egpiMZbpiaQL2jkwSB1icqYh2cfDfVxdx4df189oLKnC5fSwqPfgyP3hooxujYzAu3fDVmz";

    let (upstream, hits) = start_mock_upstream(|req: &MockRequest| {
        if req.path == "/btcinfo/multiaddr" {
            let txs: Vec<Value> = (0..8)
                .map(|i| json!({"hash": format!("x{}", i), "time": 1704067200}))
                .collect();
            (200, json!({"wallet": {"final_balance": 150_000_000}, "txs": txs}).to_string())
        } else {
            healthy(req)
        }
    })
    .await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [{"chain": "BTC", "address": XPUB}]}),
    )
    .await;

    assert_eq!(status, 200);
    let btc = &body[0];
    assert_eq!(btc["balance"], 1.5);
    assert_eq!(btc["value"]["usd"], 90000.0);

    let txs = btc["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 5);
    for tx in txs {
        assert_eq!(tx["label"], "XPUB Activity");
        assert_eq!(tx["kind"], "MIXED");
        assert_eq!(tx["date"], "1/1/2024");
    }

    let calls = hits.with_prefix("/btcinfo");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].query.contains(&format!("active={}", XPUB)));
    assert!(calls[0].query.contains("n=5"));
    assert!(hits.with_prefix("/esplora").is_empty());
}

#[tokio::test]
async fn test_btc_history_capped_at_five() {
    let (upstream, _hits) = start_mock_upstream(|req: &MockRequest| {
        if req.path.starts_with("/esplora/address/") && req.path.ends_with("/txs") {
            let txs: Vec<Value> = (0..9)
                .map(|i| json!({"txid": format!("t{}", i), "status": {"confirmed": true, "block_time": 1704067200}}))
                .collect();
            (200, Value::Array(txs).to_string())
        } else {
            healthy(req)
        }
    })
    .await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [{"chain": "BTC", "address": BTC_ADDRESS}]}),
    )
    .await;

    assert_eq!(status, 200);
    let txs = body[0]["transactions"].as_array().unwrap();
    assert_eq!(txs.len(), 5);
    assert_eq!(txs[0]["hash"], "t0");
    assert_eq!(txs[4]["hash"], "t4");
}

#[tokio::test]
async fn test_eth_balance_from_blockscout() {
    let (upstream, hits) = start_mock_upstream(|req: &MockRequest| {
        if req.path == "/blockscout/api" {
            (200, json!({"status": "1", "message": "OK", "result": "2000000000000000000"}).to_string())
        } else if req.path == "/coingecko/simple/price" {
            (200, json!({"ethereum": {"usd": 3000.0, "eur": 2800.0, "chf": 2700.0}}).to_string())
        } else {
            healthy(req)
        }
    })
    .await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [{"chain": "ETH", "address": "0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae"}]}),
    )
    .await;

    assert_eq!(status, 200);
    let eth = &body[0];
    assert_eq!(eth["balance"], 2.0);
    assert_eq!(eth["transactions"], json!([]));
    assert_eq!(eth["value"]["usd"], 6000.0);

    let calls = hits.with_prefix("/blockscout");
    assert_eq!(calls.len(), 1);
    assert!(calls[0].query.contains("module=account"));
    assert!(calls[0].query.contains("action=balance"));
    assert!(calls[0].query.contains("address=0xde0b295669a9fd93d5f28d9ec85e40f4cb697bae"));
}

#[tokio::test]
async fn test_eth_upstream_failure_is_lookup_failed() {
    let (upstream, hits) = start_mock_upstream(|req: &MockRequest| {
        if req.path == "/blockscout/api" {
            (502, "{}".to_string())
        } else {
            healthy(req)
        }
    })
    .await;
    let app = start_aggregator(config_for(upstream)).await;

    let (status, body) = post_portfolio(
        &app.url("/api/portfolio"),
        json!({"wallets": [{"chain": "ETH", "address": "0xabc"}]}),
    )
    .await;

    assert_eq!(status, 200);
    assert_eq!(
        body,
        json!([{"chain": "ETH", "address": "0xabc", "error": "lookup failed"}])
    );
    assert!(hits.with_prefix("/coingecko").is_empty());
}
