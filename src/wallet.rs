use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::{Mutex, MutexGuard, PoisonError};

use bloomfilter::Bloom;
use log::{info, warn};
use rust_decimal::Decimal;

use crate::account::AccountStore;
use crate::error::Error;
use crate::ledger::{IdempotencyRecord, Outcome, RequestKey, RequestLedger};
use crate::translog::{TransactionLog, TransactionRecord, TxKind};

// A player always hashes to the same shard, so mutations for one player are
// serialized while different players rarely contend on a lock.
const SHARD_COUNT: usize = 16;
// Sized per shard; a bloom false positive only costs one extra map probe.
const EXPECTED_N_REQUESTS: usize = 1_000_000;
const BLOOM_FP_RATE: f64 = 0.00001;

/// Request ids are caller-chosen and bounded; the bound is generous on
/// purpose, clients are free to send much shorter tokens.
pub const MAX_REQUEST_ID_LEN: usize = 64;

struct Shard {
    accounts: AccountStore,
    ledger: HashMap<RequestKey, IdempotencyRecord>,
    log: TransactionLog,
    seen: Bloom<RequestKey>,
}

impl Shard {
    fn new() -> Self {
        Self {
            accounts: AccountStore::new(),
            ledger: HashMap::new(),
            log: TransactionLog::new(),
            seen: Bloom::new_for_fp_rate(EXPECTED_N_REQUESTS, BLOOM_FP_RATE)
                .expect("bloom filter parameters are valid"),
        }
    }
}

/// The only mutation path into accounts, the idempotency ledger, and the
/// transaction log. All three stores for a player live behind one shard
/// mutex, so a committed request advances them together or not at all.
pub struct Wallet {
    shards: Box<[Mutex<Shard>]>,
}

impl Wallet {
    pub fn new() -> Self {
        let shards = (0..SHARD_COUNT).map(|_| Mutex::new(Shard::new())).collect();
        Self { shards }
    }

    /// Opens the player's account with balance zero.
    pub fn register(&self, player: &str) -> Result<(), Error> {
        let mut shard = self.shard(player);
        shard.accounts.open(player)?;
        info!("account opened for {}", player);
        Ok(())
    }

    /// Credits `amount` to the player's balance, exactly once per request id.
    /// Returns the balance after the deposit, replayed verbatim on retries.
    pub fn deposit(&self, player: &str, request_id: &str, amount: Decimal) -> Result<Decimal, Error> {
        self.submit(player, request_id, TxKind::Deposit, amount)
    }

    /// Debits `amount` from the player's balance, exactly once per request
    /// id. A refusal for insufficient funds is recorded under the request id
    /// too, so a retry re-reports it without re-evaluating the balance.
    pub fn withdraw(&self, player: &str, request_id: &str, amount: Decimal) -> Result<Decimal, Error> {
        self.submit(player, request_id, TxKind::Withdrawal, amount)
    }

    pub fn balance(&self, player: &str) -> Result<Decimal, Error> {
        self.shard(player)
            .accounts
            .get(player)
            .map(|account| account.balance())
    }

    /// Snapshot of the player's transaction history in application order.
    pub fn history(&self, player: &str) -> Result<Vec<TransactionRecord>, Error> {
        let shard = self.shard(player);
        shard.accounts.get(player)?;
        Ok(shard.log.history(player).to_vec())
    }

    fn submit(
        &self,
        player: &str,
        request_id: &str,
        kind: TxKind,
        amount: Decimal,
    ) -> Result<Decimal, Error> {
        // Client input errors are rejected before any store is touched and
        // do not consume the request id.
        if request_id.is_empty() || request_id.len() > MAX_REQUEST_ID_LEN {
            return Err(Error::InvalidRequestId(request_id.to_string()));
        }
        if amount <= Decimal::ZERO {
            return Err(Error::InvalidAmount(amount));
        }

        let key = RequestKey::new(player, request_id);
        let mut shard = self.shard(player);

        // A bloom miss proves the key was never recorded; a hit defers to
        // the ledger for the authoritative answer.
        if shard.seen.check(&key) {
            if let Some(record) = shard.ledger.lookup(&key) {
                if record.kind() != kind || record.amount() != amount {
                    warn!(
                        "request {} for {} retried with different parameters - replaying original outcome",
                        request_id, player
                    );
                }
                return Self::conclude(player, record.outcome());
            }
        }

        let delta = match kind {
            TxKind::Deposit => amount,
            TxKind::Withdrawal => -amount,
        };

        // One atomic unit under the shard guard: balance first, then the
        // history record, with the ledger record committed last.
        let outcome = match shard.accounts.apply_delta(player, delta) {
            Ok(balance) => {
                shard.log.append(player, kind, amount, balance);
                info!("{} of {} applied for {}, balance {}", kind, amount, player, balance);
                Outcome::Applied { balance }
            }
            Err(Error::InsufficientFunds {
                available,
                requested,
                ..
            }) => {
                info!(
                    "{} of {} refused for {}, available {}",
                    kind, amount, player, available
                );
                Outcome::Refused {
                    available,
                    requested,
                }
            }
            Err(e) => return Err(e),
        };

        shard.seen.set(&key);
        shard
            .ledger
            .record_once(key, IdempotencyRecord::new(kind, amount, outcome))
            .expect("key was checked fresh under the same shard guard");

        Self::conclude(player, outcome)
    }

    fn conclude(player: &str, outcome: Outcome) -> Result<Decimal, Error> {
        match outcome {
            Outcome::Applied { balance } => Ok(balance),
            Outcome::Refused {
                available,
                requested,
            } => Err(Error::InsufficientFunds {
                player: player.to_string(),
                available,
                requested,
            }),
        }
    }

    fn shard(&self, player: &str) -> MutexGuard<'_, Shard> {
        let mut hasher = DefaultHasher::new();
        player.hash(&mut hasher);
        let idx = (hasher.finish() as usize) % self.shards.len();
        self.shards[idx].lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new()
    }
}
