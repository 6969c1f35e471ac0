use std::sync::{Mutex, PoisonError};

/// What a player did, independent of whether money moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Registration,
    Authorization,
    BalanceInquiry,
    Deposit,
    Withdrawal,
    HistoryView,
    Logout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionRecord {
    seq: u64,
    player: String,
    action: ActionKind,
}

impl ActionRecord {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn action(&self) -> ActionKind {
        self.action
    }
}

/// Append-only journal of player actions, sequenced across all players.
#[derive(Default)]
pub struct ActivityJournal {
    inner: Mutex<Journal>,
}

#[derive(Default)]
struct Journal {
    next_seq: u64,
    entries: Vec<ActionRecord>,
}

impl ActivityJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, player: &str, action: ActionKind) {
        let mut journal = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let seq = journal.next_seq;
        journal.next_seq += 1;
        journal.entries.push(ActionRecord {
            seq,
            player: player.to_string(),
            action,
        });
    }

    /// The player's actions in the order they happened.
    pub fn actions_for(&self, player: &str) -> Vec<ActionRecord> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .iter()
            .filter(|record| record.player == player)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
