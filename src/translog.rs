use std::collections::HashMap;
use std::fmt;

use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    Deposit,
    Withdrawal,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TxKind::Deposit => write!(f, "deposit"),
            TxKind::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

/// One applied balance change. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRecord {
    seq: u64,
    player: String,
    kind: TxKind,
    amount: Decimal,
    balance: Decimal,
}

impl TransactionRecord {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Balance immediately after this record was applied.
    pub fn resulting_balance(&self) -> Decimal {
        self.balance
    }

    /// The signed effect of this record on the balance.
    pub fn delta(&self) -> Decimal {
        match self.kind {
            TxKind::Deposit => self.amount,
            TxKind::Withdrawal => -self.amount,
        }
    }
}

#[derive(Serialize)]
pub struct StatementRow {
    seq: u64,
    player: String,
    #[serde(rename = "type")]
    kind: TxKind,
    amount: String,
    balance: String,
}

impl From<&TransactionRecord> for StatementRow {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            seq: record.seq,
            player: record.player.clone(),
            kind: record.kind,
            amount: format!("{:.4}", record.amount),
            balance: format!("{:.4}", record.balance),
        }
    }
}

/// Append-only history of applied mutations, ordered per player by sequence
/// number. Records are never rewritten or deleted.
#[derive(Default)]
pub struct TransactionLog {
    next_seq: u64,
    entries: HashMap<String, Vec<TransactionRecord>>,
}

impl TransactionLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, player: &str, kind: TxKind, amount: Decimal, balance: Decimal) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries
            .entry(player.to_string())
            .or_default()
            .push(TransactionRecord {
                seq,
                player: player.to_string(),
                kind,
                amount,
                balance,
            });
        seq
    }

    /// Full history for the player in application order. Empty for players
    /// with no applied transactions.
    pub fn history(&self, player: &str) -> &[TransactionRecord] {
        self.entries.get(player).map(Vec::as_slice).unwrap_or(&[])
    }
}
