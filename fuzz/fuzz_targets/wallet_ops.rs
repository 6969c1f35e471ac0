#![no_main]
use arbitrary::{Arbitrary, Unstructured};
use libfuzzer_sys::fuzz_target;
use rust_decimal::Decimal;

use wallet_service::translog::TxKind;
use wallet_service::wallet::Wallet;

#[derive(Debug, Clone)]
enum FuzzOp {
    Register { player: u8 },
    Deposit { player: u8, request: u16, amount: i64 },
    Withdraw { player: u8, request: u16, amount: i64 },
    Balance { player: u8 },
    History { player: u8 },
}

impl<'a> Arbitrary<'a> for FuzzOp {
    fn arbitrary(u: &mut Unstructured<'a>) -> Result<Self, libfuzzer_sys::arbitrary::Error> {
        // Small player and request spaces so collisions and replays happen
        let player: u8 = u.int_in_range(0..=7)?;
        let request: u16 = u.int_in_range(0..=63)?;
        let amount: i64 = u.int_in_range(-1_000_000..=1_000_000)?;

        match u.int_in_range(0..=4)? {
            0 => Ok(FuzzOp::Register { player }),
            1 => Ok(FuzzOp::Deposit { player, request, amount }),
            2 => Ok(FuzzOp::Withdraw { player, request, amount }),
            3 => Ok(FuzzOp::Balance { player }),
            _ => Ok(FuzzOp::History { player }),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct FuzzInput {
    ops: Vec<FuzzOp>,
}

fuzz_target!(|input: FuzzInput| {
    let wallet = Wallet::new();

    for op in &input.ops {
        match op {
            FuzzOp::Register { player } => {
                let _ = wallet.register(&player.to_string());
            }
            FuzzOp::Deposit { player, request, amount } => {
                let player = player.to_string();
                let _ = wallet.deposit(&player, &request.to_string(), Decimal::new(*amount, 4));
                check_invariants(&wallet, &player);
            }
            FuzzOp::Withdraw { player, request, amount } => {
                let player = player.to_string();
                let _ = wallet.withdraw(&player, &request.to_string(), Decimal::new(*amount, 4));
                check_invariants(&wallet, &player);
            }
            FuzzOp::Balance { player } => {
                let _ = wallet.balance(&player.to_string());
            }
            FuzzOp::History { player } => {
                let _ = wallet.history(&player.to_string());
            }
        }
    }
});

fn check_invariants(wallet: &Wallet, player: &str) {
    let Ok(balance) = wallet.balance(player) else {
        return;
    };
    assert!(balance >= Decimal::ZERO);

    // Replaying the history from zero reproduces the balance
    let replayed: Decimal = wallet
        .history(player)
        .unwrap()
        .iter()
        .map(|record| match record.kind() {
            TxKind::Deposit => record.amount(),
            TxKind::Withdrawal => -record.amount(),
        })
        .sum();
    assert_eq!(replayed, balance);
}
