use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::error::Error;

#[derive(Default)]
pub struct AccountStore {
    accounts: HashMap<String, Account>,
}

impl AccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Creates the account at player registration, with balance zero.
    pub fn open(&mut self, player: &str) -> Result<(), Error> {
        if self.accounts.contains_key(player) {
            return Err(Error::AccountExists(player.to_string()));
        }
        self.accounts.insert(player.to_string(), Account::new(player));
        Ok(())
    }

    pub fn get(&self, player: &str) -> Result<&Account, Error> {
        self.accounts
            .get(player)
            .ok_or_else(|| Error::AccountNotFound(player.to_string()))
    }

    pub fn apply_delta(&mut self, player: &str, delta: Decimal) -> Result<Decimal, Error> {
        self.accounts
            .get_mut(player)
            .ok_or_else(|| Error::AccountNotFound(player.to_string()))?
            .apply_delta(delta)
    }
}

#[derive(Debug)]
pub struct Account {
    player: String,
    balance: Decimal,
}

impl Account {
    pub fn new(player: &str) -> Self {
        Self {
            player: player.to_string(),
            balance: Decimal::ZERO,
        }
    }

    pub fn player(&self) -> &str {
        &self.player
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Commits `balance + delta` and returns the new balance. The balance
    /// never goes negative; a delta that would cross zero is rejected whole.
    pub fn apply_delta(&mut self, delta: Decimal) -> Result<Decimal, Error> {
        let next = self.balance + delta;
        if next < Decimal::ZERO {
            return Err(Error::InsufficientFunds {
                player: self.player.clone(),
                available: self.balance,
                requested: -delta,
            });
        }
        self.balance = next;
        Ok(next)
    }
}
