use std::collections::HashMap;
use std::collections::hash_map::Entry;

use rust_decimal::Decimal;

use crate::translog::TxKind;

/// Identifies one logical client request. A retry carries the same key and
/// must be answered from the recorded outcome, never reprocessed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    player: String,
    request_id: String,
}

impl RequestKey {
    pub fn new(player: &str, request_id: &str) -> Self {
        Self {
            player: player.to_string(),
            request_id: request_id.to_string(),
        }
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }
}

/// Terminal result of the first processing of a request key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied {
        balance: Decimal,
    },
    Refused {
        available: Decimal,
        requested: Decimal,
    },
}

#[derive(Debug, Clone)]
pub struct IdempotencyRecord {
    kind: TxKind,
    amount: Decimal,
    outcome: Outcome,
}

impl IdempotencyRecord {
    pub fn new(kind: TxKind, amount: Decimal, outcome: Outcome) -> Self {
        Self {
            kind,
            amount,
            outcome,
        }
    }

    pub fn kind(&self) -> TxKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn outcome(&self) -> Outcome {
        self.outcome
    }
}

#[derive(thiserror::Error, Debug)]
#[error("Request {0:?} is already recorded for this player")]
pub struct AlreadyRecorded(pub String);

// Memory scales with the number of requests ever processed. Duplicate
// suppression must hold indefinitely, so nothing is evicted here; at scale
// this wants external storage with a unique index on the key.
pub trait RequestLedger {
    fn lookup(&self, key: &RequestKey) -> Option<&IdempotencyRecord>;
    fn record_once(
        &mut self,
        key: RequestKey,
        record: IdempotencyRecord,
    ) -> Result<(), AlreadyRecorded>;
}

impl RequestLedger for HashMap<RequestKey, IdempotencyRecord> {
    fn lookup(&self, key: &RequestKey) -> Option<&IdempotencyRecord> {
        self.get(key)
    }

    fn record_once(
        &mut self,
        key: RequestKey,
        record: IdempotencyRecord,
    ) -> Result<(), AlreadyRecorded> {
        match self.entry(key) {
            Entry::Occupied(entry) => Err(AlreadyRecorded(entry.key().request_id().to_string())),
            Entry::Vacant(slot) => {
                slot.insert(record);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    fn applied(balance: i64) -> IdempotencyRecord {
        IdempotencyRecord::new(
            TxKind::Deposit,
            dec(100),
            Outcome::Applied {
                balance: dec(balance),
            },
        )
    }

    #[test]
    fn lookup_misses_fresh_key() {
        let ledger: HashMap<RequestKey, IdempotencyRecord> = HashMap::new();

        assert!(ledger.lookup(&RequestKey::new("alice", "a1")).is_none());
    }

    #[test]
    fn record_then_lookup_returns_stored_outcome() {
        let mut ledger: HashMap<RequestKey, IdempotencyRecord> = HashMap::new();
        let key = RequestKey::new("alice", "a1");

        ledger.record_once(key.clone(), applied(100)).unwrap();

        let record = ledger.lookup(&key).unwrap();
        assert_eq!(record.kind(), TxKind::Deposit);
        assert_eq!(record.amount(), dec(100));
        assert_eq!(record.outcome(), Outcome::Applied { balance: dec(100) });
    }

    #[test]
    fn second_record_for_same_key_rejected() {
        let mut ledger: HashMap<RequestKey, IdempotencyRecord> = HashMap::new();
        let key = RequestKey::new("alice", "a1");
        ledger.record_once(key.clone(), applied(100)).unwrap();

        let result = ledger.record_once(key.clone(), applied(999));

        assert!(matches!(result, Err(AlreadyRecorded(id)) if id == "a1"));
        // First record untouched
        assert_eq!(
            ledger.lookup(&key).unwrap().outcome(),
            Outcome::Applied { balance: dec(100) }
        );
    }

    #[test]
    fn same_request_id_for_different_players_is_distinct() {
        let mut ledger: HashMap<RequestKey, IdempotencyRecord> = HashMap::new();

        ledger
            .record_once(RequestKey::new("alice", "a1"), applied(100))
            .unwrap();
        ledger
            .record_once(RequestKey::new("bob", "a1"), applied(50))
            .unwrap();

        assert_eq!(ledger.len(), 2);
    }

    #[test]
    fn refusal_outcome_round_trips() {
        let mut ledger: HashMap<RequestKey, IdempotencyRecord> = HashMap::new();
        let key = RequestKey::new("alice", "w1");
        let record = IdempotencyRecord::new(
            TxKind::Withdrawal,
            dec(150),
            Outcome::Refused {
                available: dec(100),
                requested: dec(150),
            },
        );

        ledger.record_once(key.clone(), record).unwrap();

        assert_eq!(
            ledger.lookup(&key).unwrap().outcome(),
            Outcome::Refused {
                available: dec(100),
                requested: dec(150),
            }
        );
    }
}
