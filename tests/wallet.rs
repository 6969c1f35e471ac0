use std::thread;

use rust_decimal::Decimal;
use wallet_service::error::Error;
use wallet_service::translog::TxKind;
use wallet_service::wallet::Wallet;

fn dec(n: i64) -> Decimal {
    Decimal::new(n, 0)
}

fn replayed_balance(wallet: &Wallet, player: &str) -> Decimal {
    wallet
        .history(player)
        .unwrap()
        .iter()
        .map(|record| record.delta())
        .sum()
}

// Scenario 1: first deposit on a fresh account.
#[test]
fn deposit_on_fresh_account() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();

    let balance = wallet.deposit("alice", "a1", dec(100)).unwrap();

    assert_eq!(balance, dec(100));
    let history = wallet.history("alice").unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].kind(), TxKind::Deposit);
    assert_eq!(history[0].amount(), dec(100));
}

// Scenario 2: the same request id replays, the balance moves only once.
#[test]
fn duplicate_deposit_is_replayed() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();
    wallet.deposit("alice", "a1", dec(100)).unwrap();

    let balance = wallet.deposit("alice", "a1", dec(100)).unwrap();

    assert_eq!(balance, dec(100));
    assert_eq!(wallet.balance("alice").unwrap(), dec(100));
    assert_eq!(wallet.history("alice").unwrap().len(), 1);
}

// Scenario 3: a refused withdrawal is itself idempotent.
#[test]
fn refused_withdrawal_replays_the_refusal() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();
    wallet.deposit("alice", "a1", dec(100)).unwrap();

    let first = wallet.withdraw("alice", "w1", dec(150));
    assert!(matches!(
        first,
        Err(Error::InsufficientFunds { ref available, .. }) if *available == dec(100)
    ));
    assert_eq!(wallet.balance("alice").unwrap(), dec(100));

    let retried = wallet.withdraw("alice", "w1", dec(150));
    assert!(matches!(
        retried,
        Err(Error::InsufficientFunds { ref available, .. }) if *available == dec(100)
    ));
    assert_eq!(wallet.balance("alice").unwrap(), dec(100));
}

// Scenario 4: a covered withdrawal extends the history in order.
#[test]
fn covered_withdrawal_appends_to_history() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();
    wallet.deposit("alice", "a1", dec(100)).unwrap();

    let balance = wallet.withdraw("alice", "w2", dec(40)).unwrap();

    assert_eq!(balance, dec(60));
    let history = wallet.history("alice").unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0].kind(), TxKind::Deposit);
    assert_eq!(history[1].kind(), TxKind::Withdrawal);
    assert_eq!(history[1].resulting_balance(), dec(60));
}

// Scenario 5: concurrent deposits with distinct ids both apply exactly once.
#[test]
fn concurrent_deposits_with_distinct_ids() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();
    wallet.deposit("alice", "seed", dec(60)).unwrap();

    thread::scope(|scope| {
        scope.spawn(|| wallet.deposit("alice", "c1", dec(10)).unwrap());
        scope.spawn(|| wallet.deposit("alice", "c2", dec(20)).unwrap());
    });

    assert_eq!(wallet.balance("alice").unwrap(), dec(90));
    let history = wallet.history("alice").unwrap();
    assert_eq!(history.len(), 3);

    // Order between the two concurrent deposits is unspecified, but each
    // record's resulting balance matches the running sum at its position.
    let mut running = Decimal::ZERO;
    for record in &history {
        running += record.delta();
        assert_eq!(record.resulting_balance(), running);
    }
}

#[test]
fn concurrent_retries_of_one_request_apply_once() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();
    wallet.deposit("alice", "seed", dec(50)).unwrap();

    let results = thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| wallet.deposit("alice", "dup", dec(10)).unwrap()))
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .collect::<Vec<_>>()
    });

    // Every caller saw the single recorded outcome.
    assert!(results.iter().all(|balance| *balance == dec(60)));
    assert_eq!(wallet.balance("alice").unwrap(), dec(60));
    assert_eq!(wallet.history("alice").unwrap().len(), 2);
}

#[test]
fn concurrent_mixed_operations_never_lose_updates() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();
    wallet.deposit("alice", "seed", dec(1000)).unwrap();

    let wallet = &wallet;
    thread::scope(|scope| {
        for i in 0..4 {
            scope.spawn(move || {
                wallet
                    .deposit("alice", &format!("d{}", i), dec(5))
                    .unwrap();
            });
            scope.spawn(move || {
                wallet
                    .withdraw("alice", &format!("w{}", i), dec(3))
                    .unwrap();
            });
        }
    });

    // 1000 + 4*5 - 4*3
    assert_eq!(wallet.balance("alice").unwrap(), dec(1008));
    assert_eq!(replayed_balance(wallet, "alice"), dec(1008));
}

#[test]
fn players_do_not_interfere() {
    let wallet = Wallet::new();
    for player in ["alice", "bob", "carol"] {
        wallet.register(player).unwrap();
    }

    let wallet = &wallet;
    thread::scope(|scope| {
        for player in ["alice", "bob", "carol"] {
            scope.spawn(move || {
                for i in 0..20 {
                    wallet
                        .deposit(player, &format!("d{}", i), dec(1))
                        .unwrap();
                }
            });
        }
    });

    for player in ["alice", "bob", "carol"] {
        assert_eq!(wallet.balance(player).unwrap(), dec(20));
        assert_eq!(wallet.history(player).unwrap().len(), 20);
    }
}

// Replaying the history from zero reproduces the balance exactly.
#[test]
fn history_is_prefix_consistent() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();
    wallet.deposit("alice", "a1", dec(100)).unwrap();
    let _ = wallet.withdraw("alice", "w1", dec(150));
    wallet.withdraw("alice", "w2", dec(40)).unwrap();
    wallet.deposit("alice", "a2", dec(7)).unwrap();

    assert_eq!(
        replayed_balance(&wallet, "alice"),
        wallet.balance("alice").unwrap()
    );
}

#[test]
fn balance_never_goes_negative() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();
    wallet.deposit("alice", "a1", dec(30)).unwrap();

    for (id, amount) in [("w1", 31), ("w2", 1000), ("w3", 31)] {
        let result = wallet.withdraw("alice", id, dec(amount));
        assert!(matches!(result, Err(Error::InsufficientFunds { .. })));
        assert!(wallet.balance("alice").unwrap() >= Decimal::ZERO);
    }

    assert_eq!(wallet.withdraw("alice", "w4", dec(30)).unwrap(), Decimal::ZERO);
}

#[test]
fn exact_decimal_arithmetic_does_not_drift() {
    let wallet = Wallet::new();
    wallet.register("alice").unwrap();

    // 0.1 repeated; binary floating point would accumulate error here.
    let tenth = Decimal::new(1, 1);
    for i in 0..100 {
        wallet.deposit("alice", &format!("d{}", i), tenth).unwrap();
    }

    assert_eq!(wallet.balance("alice").unwrap(), dec(10));
}
