//! End-to-end wallet flows against the in-memory ledger.
//!
//! Each test funds a wallet on a [`FakeLedger`], runs selection, building,
//! signing and submission through the public wallet API, and checks the
//! resulting transaction and ledger state.

use satchel_core::address::Address;
use satchel_core::crypto::{verify_transaction_input, PrivateKey};
use satchel_core::error::LedgerError;
use satchel_core::traits::LedgerService;
use satchel_core::types::OutPoint;
use satchel_tests::helpers::*;
use satchel_wallet::{CoinSelector, KeyStore, Recipient, TransactionBuilder, Wallet, WalletError};

fn new_wallet(name: &str) -> Wallet {
    Wallet::from_key(name, PrivateKey::generate())
}

#[test]
fn send_200_pays_120_with_80_change() {
    let ledger = FakeLedger::new();
    let sender = new_wallet("w");
    let receiver = new_wallet("b");
    ledger.fund(txid(0xA1), 0, 200, sender.pubkey_hash());

    let tx = sender
        .build_transaction(&ledger, &receiver.address().encode(), 120)
        .unwrap();

    assert_eq!(
        tx.inputs.iter().map(|i| i.previous_output.clone()).collect::<Vec<_>>(),
        vec![OutPoint {
            txid: txid(0xA1),
            index: 0
        }]
    );
    assert_eq!(tx.outputs.len(), 2);
    assert_eq!((tx.outputs[0].value, tx.outputs[0].pubkey_hash), (120, receiver.pubkey_hash()));
    assert_eq!((tx.outputs[1].value, tx.outputs[1].pubkey_hash), (80, sender.pubkey_hash()));
    assert!(tx.is_fully_signed());
    verify_transaction_input(&tx, 0).unwrap();

    ledger.submit_transaction(&tx).unwrap();
    assert_eq!(ledger.balance(&sender.pubkey_hash()).unwrap(), 80);
    assert_eq!(ledger.balance(&receiver.pubkey_hash()).unwrap(), 120);
}

#[test]
fn send_returns_accepted_txid() {
    let ledger = FakeLedger::new();
    let sender = new_wallet("w");
    ledger.fund(txid(1), 0, 500, sender.pubkey_hash());

    let id = sender.send(&ledger, &new_wallet("b").address().encode(), 100).unwrap();

    let submitted = ledger.submitted();
    assert_eq!(submitted.len(), 1);
    assert_eq!(submitted[0].id, id);
    assert_eq!(submitted[0].txid().unwrap(), id);
}

#[test]
fn exact_amount_produces_no_change() {
    let ledger = FakeLedger::new();
    let sender = new_wallet("w");
    ledger.fund(txid(1), 0, 100, sender.pubkey_hash());

    let tx = sender
        .build_transaction(&ledger, &new_wallet("b").address().encode(), 100)
        .unwrap();
    assert_eq!(tx.outputs.len(), 1);
    assert_eq!(tx.outputs[0].value, 100);
}

#[test]
fn total_150_amount_100() {
    let ledger = FakeLedger::new();
    let sender = new_wallet("w");
    let dest = new_wallet("b");
    ledger.fund(txid(1), 0, 50, sender.pubkey_hash());
    ledger.fund(txid(2), 3, 100, sender.pubkey_hash());

    let tx = sender.build_transaction(&ledger, &dest.address().encode(), 100).unwrap();
    assert_eq!(tx.inputs.len(), 2);
    assert_eq!(tx.outputs[0].value, 100);
    assert_eq!(tx.outputs[0].pubkey_hash, dest.pubkey_hash());
    assert_eq!(tx.outputs[1].value, 50);
    assert_eq!(tx.outputs[1].pubkey_hash, sender.pubkey_hash());
    for i in 0..tx.inputs.len() {
        verify_transaction_input(&tx, i).unwrap();
    }
}

#[test]
fn insufficient_funds_builds_nothing() {
    let ledger = FakeLedger::new();
    let sender = new_wallet("w");
    ledger.fund(txid(1), 0, 40, sender.pubkey_hash());

    let err = sender
        .send(&ledger, &new_wallet("b").address().encode(), 100)
        .unwrap_err();
    assert_eq!(err, WalletError::InsufficientFunds { have: 40, need: 100 });
    assert!(ledger.submitted().is_empty());
    assert_eq!(ledger.balance(&sender.pubkey_hash()).unwrap(), 40);
}

#[test]
fn unfunded_wallet_has_no_utxos() {
    let ledger = FakeLedger::new();
    let sender = new_wallet("w");
    assert_eq!(sender.balance(&ledger).unwrap(), 0);
    assert_eq!(
        sender.send(&ledger, &new_wallet("b").address().encode(), 1).unwrap_err(),
        WalletError::NoUtxos
    );
}

#[test]
fn chained_payments_spend_change() {
    let ledger = FakeLedger::new();
    let alice = new_wallet("alice");
    let bob = new_wallet("bob");
    ledger.fund(txid(1), 0, 200, alice.pubkey_hash());

    alice.send(&ledger, &bob.address().encode(), 120).unwrap();
    // The second payment must spend the change output of the first.
    alice.send(&ledger, &bob.address().encode(), 30).unwrap();
    bob.send(&ledger, &alice.address().encode(), 150).unwrap();

    assert_eq!(alice.balance(&ledger).unwrap(), 50 + 150);
    assert_eq!(bob.balance(&ledger).unwrap(), 0);
    assert_eq!(ledger.submitted().len(), 3);
}

#[test]
fn rejected_submission_reports_ledger_message() {
    let ledger = FakeLedger::rejecting(LedgerError::Status {
        status: 400,
        message: "Transaction is invalid".into(),
    });
    let sender = new_wallet("w");
    ledger.fund(txid(1), 0, 200, sender.pubkey_hash());

    let err = sender
        .send(&ledger, &new_wallet("b").address().encode(), 10)
        .unwrap_err();
    assert_eq!(err.to_string(), "ledger returned 400: Transaction is invalid");
}

#[test]
fn tampered_transaction_is_refused_by_ledger() {
    let ledger = FakeLedger::new();
    let sender = new_wallet("w");
    ledger.fund(txid(1), 0, 200, sender.pubkey_hash());

    let mut tx = sender
        .build_transaction(&ledger, &new_wallet("b").address().encode(), 120)
        .unwrap();
    tx.outputs[0].value = 190;
    tx.outputs[1].value = 10;
    // Keep the id consistent so only the signatures are wrong.
    tx.id = tx.txid().unwrap();

    assert!(matches!(
        ledger.submit_transaction(&tx),
        Err(LedgerError::Status { status: 400, .. })
    ));
}

#[test]
fn builder_and_selector_compose_without_wallet() {
    let ledger = FakeLedger::new();
    let key = PrivateKey::generate();
    let builder = TransactionBuilder::new(key.public_key());
    let owner = builder.change_address().pubkey_hash();
    ledger.fund(txid(7), 1, 75, owner);

    let selection = CoinSelector::select(&ledger, &owner, 60).unwrap();
    assert_eq!(selection.total, 75);
    assert_eq!(selection.change(60), 15);

    let recipient = Recipient {
        address: Address::from_pubkey_hash(pkh(0xEE)),
        amount: 60,
    };
    let unsigned = builder.build(&selection, &recipient).unwrap();
    let id = unsigned.tx.id;
    let tx = TransactionBuilder::sign(unsigned, &key).unwrap();
    assert_eq!(tx.id, id);
    ledger.submit_transaction(&tx).unwrap();
    assert_eq!(ledger.balance(&pkh(0xEE)).unwrap(), 60);
}

#[test]
fn stored_wallet_can_spend_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store = KeyStore::new(dir.path().join("wallets"));
    let created = Wallet::create(&store, "saver").unwrap();

    let ledger = FakeLedger::new();
    ledger.fund(txid(9), 0, 300, created.pubkey_hash());
    drop(created);

    let reopened = Wallet::open(&store, "saver").unwrap();
    reopened
        .send(&ledger, &new_wallet("b").address().encode(), 100)
        .unwrap();
    assert_eq!(reopened.balance(&ledger).unwrap(), 200);
}
