//! `HttpLedgerClient` against a mock ledger server over real HTTP.

use std::time::Duration;

use satchel_core::crypto::PrivateKey;
use satchel_core::error::LedgerError;
use satchel_core::traits::LedgerService;
use satchel_core::types::Transaction;
use satchel_tests::helpers::{pkh, txid};
use satchel_tests::server::{Behavior, MockLedgerServer};
use satchel_wallet::{HttpLedgerClient, Wallet, WalletConfig, WalletError};

fn client(server: &MockLedgerServer) -> HttpLedgerClient {
    HttpLedgerClient::with_timeout(server.url(), Some(Duration::from_secs(10))).unwrap()
}

#[test]
fn utxos_and_balance() {
    let server = MockLedgerServer::spawn();
    server.fund(txid(1), 0, 70, pkh(0x10));
    server.fund(txid(2), 1, 30, pkh(0x10));
    server.fund(txid(3), 0, 999, pkh(0x20));

    let client = client(&server);
    let utxos = client.utxos(&pkh(0x10)).unwrap();
    assert_eq!(utxos.iter().map(|o| o.value).collect::<Vec<_>>(), vec![70, 30]);
    assert!(utxos.iter().all(|o| o.pubkey_hash == pkh(0x10)));
    assert_eq!(client.balance(&pkh(0x10)).unwrap(), 100);
    assert_eq!(client.balance(&pkh(0x30)).unwrap(), 0);
}

#[test]
fn spendable_utxos_query() {
    let server = MockLedgerServer::spawn();
    server.fund(txid(1), 0, 70, pkh(0x10));
    server.fund(txid(2), 1, 30, pkh(0x10));

    let answer = client(&server).spendable_utxos(&pkh(0x10), 50).unwrap();
    assert_eq!(answer.total, 70);
    assert_eq!(answer.spendable.len(), 1);
    assert_eq!(answer.spendable[&txid(1).to_hex()], vec![0]);
}

#[test]
fn wallet_send_over_http() {
    let server = MockLedgerServer::spawn();
    let wallet = Wallet::from_key("w", PrivateKey::generate());
    let dest = Wallet::from_key("b", PrivateKey::generate());
    server.fund(txid(5), 2, 200, wallet.pubkey_hash());

    let config = WalletConfig {
        rpc_endpoint: server.url().to_owned(),
        request_timeout: Some(Duration::from_secs(10)),
        ..WalletConfig::default()
    };
    let ledger = config.ledger_client().unwrap();

    let id = wallet.send(&ledger, &dest.address().encode(), 120).unwrap();

    let submitted = server.submitted();
    assert_eq!(submitted.len(), 1);
    let body = &submitted[0];
    assert_eq!(body["IsCoinbase"], false);
    assert!(body["Vin"][0]["Signature"].is_string());
    assert_eq!(body["Vout"][0]["Value"], 120);
    assert_eq!(body["Vout"][1]["Value"], 80);

    let tx: Transaction = serde_json::from_value(body.clone()).unwrap();
    assert_eq!(tx.id, id);
    assert_eq!(wallet.balance(&ledger).unwrap(), 80);
    assert_eq!(dest.balance(&ledger).unwrap(), 120);
}

#[test]
fn rejected_submission_carries_body() {
    let server = MockLedgerServer::spawn();
    let wallet = Wallet::from_key("w", PrivateKey::generate());
    server.fund(txid(5), 0, 200, wallet.pubkey_hash());
    let client = client(&server);

    let tx = wallet
        .build_transaction(&client, &Wallet::from_key("b", PrivateKey::generate()).address().encode(), 50)
        .unwrap();
    server.set_behavior(Behavior::Fail(400, "Transaction is invalid".into()));

    assert_eq!(
        client.submit_transaction(&tx).unwrap_err(),
        LedgerError::Status {
            status: 400,
            message: "Transaction is invalid".into()
        }
    );
    assert!(server.submitted().is_empty());
}

#[test]
fn double_spend_rejected_by_ledger() {
    let server = MockLedgerServer::spawn();
    let wallet = Wallet::from_key("w", PrivateKey::generate());
    server.fund(txid(5), 0, 200, wallet.pubkey_hash());
    let client = client(&server);

    let tx = wallet
        .build_transaction(&client, &Wallet::from_key("b", PrivateKey::generate()).address().encode(), 50)
        .unwrap();
    client.submit_transaction(&tx).unwrap();
    assert!(matches!(
        client.submit_transaction(&tx),
        Err(LedgerError::Status { status: 400, .. })
    ));
}

#[test]
fn read_error_status_is_surfaced() {
    let server = MockLedgerServer::spawn();
    server.set_behavior(Behavior::Fail(500, "index unavailable".into()));

    assert_eq!(
        client(&server).utxos(&pkh(1)).unwrap_err(),
        LedgerError::Status {
            status: 500,
            message: "index unavailable".into()
        }
    );
}

#[test]
fn malformed_body_is_malformed() {
    let server = MockLedgerServer::spawn();
    server.set_behavior(Behavior::Garbage);
    let client = client(&server);

    assert!(matches!(client.utxos(&pkh(1)), Err(LedgerError::Malformed(_))));
    assert!(matches!(
        client.spendable_utxos(&pkh(1), 10),
        Err(LedgerError::Malformed(_))
    ));
}

#[test]
fn unreachable_ledger_is_transport_error() {
    // A port that was free a moment ago and now has no listener.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let wallet = Wallet::from_key("w", PrivateKey::generate());
    let client = HttpLedgerClient::with_timeout(url, Some(Duration::from_secs(2))).unwrap();
    assert!(matches!(
        wallet.balance(&client),
        Err(WalletError::Ledger(LedgerError::Transport(_)))
    ));
}
