use crate::bank::{Transfer, TransferStatus};
use crate::browser::Browser;
use crate::entries::EntrySet;
use crate::errors::{BankError, BankResult};
use async_trait::async_trait;
use std::fmt;
use tracing::warn;

/// Login data, handed to the adapter once per login.
#[derive(Clone)]
pub struct Credentials {
    pub user: String,
    pub password: String,
}

impl Credentials {
    pub fn new(user: &str, password: &str) -> Self {
        Self {
            user: user.to_string(),
            password: password.to_string(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Bank-specific click sequences.
///
/// Implementations script one institution's site using only
/// [`Browser::navigate`], [`Browser::post`], [`Browser::enter`],
/// [`Browser::click`] and [`EntrySet::add`]. A session drives its adapter from
/// a single task, so the futures need not be `Send`.
#[async_trait(?Send)]
pub trait BankAdapter {
    /// Log in; `true` when the site shows a logged-in page afterwards.
    async fn run_login(&mut self, browser: &mut Browser, credentials: &Credentials) -> bool;

    /// Read the statement of the logged-in account.
    async fn run_get_entries(&mut self, browser: &mut Browser) -> BankResult<EntrySet>;

    /// Fill in and send a transfer form.
    async fn run_start_transaction(
        &mut self,
        _browser: &mut Browser,
        _transfer: &Transfer,
    ) -> BankResult<TransferStatus> {
        Err(BankError::Unsupported("transfers".to_string()))
    }

    /// Second-factor confirmation of a transfer. Placeholder: no adapter
    /// confirms TANs automatically.
    async fn run_confirm_tan(&mut self, _browser: &mut Browser, transfer: &Transfer) -> bool {
        warn!(reference = %transfer.reference, "TAN confirmation is not automated");
        false
    }

    async fn run_logout(&mut self, browser: &mut Browser) -> bool;
}
