use std::io::{BufRead, Write};

use rust_decimal::Decimal;

use crate::audit::{ActionKind, ActivityJournal};
use crate::auth::CredentialStore;
use crate::error::Error;
use crate::translog::{StatementRow, TxKind};
use crate::wallet::Wallet;

/// Decimal places kept on user-entered amounts.
const AMOUNT_SCALE: u32 = 4;

/// Terminal session over the wallet. Generic over the input and output
/// streams so a whole session can run against in-memory buffers.
pub struct Console<'a, R, W> {
    input: R,
    output: W,
    wallet: &'a Wallet,
    credentials: &'a CredentialStore,
    journal: &'a ActivityJournal,
}

impl<'a, R: BufRead, W: Write> Console<'a, R, W> {
    pub fn new(
        input: R,
        output: W,
        wallet: &'a Wallet,
        credentials: &'a CredentialStore,
        journal: &'a ActivityJournal,
    ) -> Self {
        Self {
            input,
            output,
            wallet,
            credentials,
            journal,
        }
    }

    /// Runs the main menu until the user exits or input ends.
    pub fn run(&mut self) -> Result<(), Error> {
        loop {
            writeln!(self.output, "Select an action:")?;
            writeln!(self.output, "1. Register")?;
            writeln!(self.output, "2. Log in")?;
            writeln!(self.output, "3. Exit")?;
            let Some(choice) = self.read_line()? else {
                break;
            };
            match choice.as_str() {
                "1" => self.register()?,
                "2" => self.log_in()?,
                "3" => break,
                _ => writeln!(self.output, "Invalid selection.")?,
            }
        }
        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    fn register(&mut self) -> Result<(), Error> {
        let Some(login) = self.prompt("Enter a login:")? else {
            return Ok(());
        };
        let Some(password) = self.prompt("Enter a password:")? else {
            return Ok(());
        };
        if let Err(e) = self.credentials.register(&login, &password) {
            writeln!(self.output, "{}", e)?;
            return Ok(());
        }
        if let Err(e) = self.wallet.register(&login) {
            writeln!(self.output, "{}", e)?;
            return Ok(());
        }
        self.journal.record(&login, ActionKind::Registration);
        writeln!(self.output, "Registration complete. You can now log in.")?;
        Ok(())
    }

    fn log_in(&mut self) -> Result<(), Error> {
        let Some(login) = self.prompt("Enter your login:")? else {
            return Ok(());
        };
        let Some(password) = self.prompt("Enter your password:")? else {
            return Ok(());
        };
        match self.credentials.authenticate(&login, &password) {
            Ok(()) => {
                self.journal.record(&login, ActionKind::Authorization);
                writeln!(self.output, "Welcome, {}!", login)?;
                self.profile(&login)
            }
            Err(e) => {
                writeln!(self.output, "{}", e)?;
                Ok(())
            }
        }
    }

    fn profile(&mut self, player: &str) -> Result<(), Error> {
        loop {
            writeln!(self.output, "Select an action:")?;
            writeln!(self.output, "1. Show balance")?;
            writeln!(self.output, "2. Deposit funds")?;
            writeln!(self.output, "3. Withdraw funds")?;
            writeln!(self.output, "4. Transaction history")?;
            writeln!(self.output, "5. Log out")?;
            let Some(choice) = self.read_line()? else {
                return Ok(());
            };
            match choice.as_str() {
                "1" => self.show_balance(player)?,
                "2" => self.submit(player, TxKind::Deposit)?,
                "3" => self.submit(player, TxKind::Withdrawal)?,
                "4" => self.show_history(player)?,
                "5" => {
                    self.journal.record(player, ActionKind::Logout);
                    writeln!(self.output, "Logged out.")?;
                    return Ok(());
                }
                _ => writeln!(self.output, "Invalid selection.")?,
            }
        }
    }

    fn show_balance(&mut self, player: &str) -> Result<(), Error> {
        match self.wallet.balance(player) {
            Ok(balance) => {
                self.journal.record(player, ActionKind::BalanceInquiry);
                writeln!(self.output, "Current balance: {:.4}", balance)?;
            }
            Err(e) => writeln!(self.output, "{}", e)?,
        }
        Ok(())
    }

    fn submit(&mut self, player: &str, kind: TxKind) -> Result<(), Error> {
        let Some(request_id) = self.prompt("Enter a unique request id for this operation:")? else {
            return Ok(());
        };
        let Some(raw) = self.prompt("Enter the amount:")? else {
            return Ok(());
        };
        let Ok(amount) = raw.parse::<Decimal>() else {
            writeln!(self.output, "Amounts must be numeric.")?;
            return Ok(());
        };
        let amount = amount.round_dp(AMOUNT_SCALE);

        let result = match kind {
            TxKind::Deposit => self.wallet.deposit(player, &request_id, amount),
            TxKind::Withdrawal => self.wallet.withdraw(player, &request_id, amount),
        };
        match result {
            Ok(balance) => {
                let action = match kind {
                    TxKind::Deposit => ActionKind::Deposit,
                    TxKind::Withdrawal => ActionKind::Withdrawal,
                };
                self.journal.record(player, action);
                match kind {
                    TxKind::Deposit => writeln!(
                        self.output,
                        "Your account was credited {:.4}. New balance: {:.4}",
                        amount, balance
                    )?,
                    TxKind::Withdrawal => writeln!(
                        self.output,
                        "Your account was debited {:.4}. New balance: {:.4}",
                        amount, balance
                    )?,
                }
            }
            Err(e) => writeln!(self.output, "{}", e)?,
        }
        Ok(())
    }

    fn show_history(&mut self, player: &str) -> Result<(), Error> {
        match self.wallet.history(player) {
            Ok(records) if records.is_empty() => {
                writeln!(self.output, "No transactions yet.")?;
            }
            Ok(records) => {
                let mut wtr = csv::Writer::from_writer(&mut self.output);
                for record in &records {
                    wtr.serialize(StatementRow::from(record))?;
                }
                wtr.flush()?;
                drop(wtr);
                self.journal.record(player, ActionKind::HistoryView);
            }
            Err(e) => writeln!(self.output, "{}", e)?,
        }
        Ok(())
    }

    fn prompt(&mut self, text: &str) -> Result<Option<String>, Error> {
        writeln!(self.output, "{}", text)?;
        self.read_line()
    }

    /// `None` means end of input.
    fn read_line(&mut self) -> Result<Option<String>, Error> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}
