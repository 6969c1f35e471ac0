use std::io;

use log::info;

use wallet_service::audit::ActivityJournal;
use wallet_service::auth::CredentialStore;
use wallet_service::console::Console;
use wallet_service::error::Error;
use wallet_service::wallet::Wallet;

fn main() -> Result<(), Error> {
    env_logger::init();

    let wallet = Wallet::new();
    let credentials = CredentialStore::new();
    let journal = ActivityJournal::new();
    info!("wallet service ready");

    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut console = Console::new(
        stdin.lock(),
        stdout.lock(),
        &wallet,
        &credentials,
        &journal,
    );
    console.run()?;

    info!("session ended after {} recorded actions", journal.len());
    Ok(())
}
