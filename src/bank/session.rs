use crate::bank::{Transfer, TransferStatus};
use crate::browser::Browser;
use crate::core::{BankAdapter, Config, Credentials};
use crate::entries::{Entry, EntrySet};
use crate::errors::{BankError, BankResult, Result};
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

/// Where a session stands. Entries only exist while logged in and are
/// fetched at most once per login.
#[derive(Debug)]
enum SessionState {
    LoggedOut,
    LoggedIn { entries: Option<EntrySet> },
}

/// One login lifetime against one bank: login, query or act, logout.
///
/// Owns its [`Browser`] exclusively; guarded operations called while logged
/// out fail with [`BankError::NotLoggedIn`] before any request is made.
pub struct BankSession<A: BankAdapter> {
    id: Uuid,
    adapter: A,
    browser: Browser,
    state: SessionState,
}

impl<A: BankAdapter> BankSession<A> {
    pub fn new(adapter: A, config: &Config) -> Result<Self> {
        let browser = Browser::new(config.browser.clone())?;
        Ok(Self::with_browser(adapter, browser))
    }

    pub fn with_browser(adapter: A, browser: Browser) -> Self {
        Self {
            id: Uuid::new_v4(),
            adapter,
            browser,
            state: SessionState::LoggedOut,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.id
    }

    pub fn is_logged_in(&self) -> bool {
        matches!(self.state, SessionState::LoggedIn { .. })
    }

    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    /// Log in through the adapter. Any cached entries are dropped first.
    pub async fn login(&mut self, user: &str, password: &str) -> bool {
        self.state = SessionState::LoggedOut;
        let credentials = Credentials::new(user, password);
        let logged_in = self.adapter.run_login(&mut self.browser, &credentials).await;

        if logged_in {
            self.state = SessionState::LoggedIn { entries: None };
            info!(session = %self.id, user, "logged in");
        } else {
            warn!(session = %self.id, user, "login failed");
        }
        logged_in
    }

    /// Statement entries, fetched on first use and cached until logout.
    ///
    /// A failed fetch caches nothing, so a later call tries again.
    pub async fn get_entries(&mut self) -> BankResult<&EntrySet> {
        let SessionState::LoggedIn { entries } = &mut self.state else {
            return Err(BankError::NotLoggedIn);
        };

        if entries.is_none() {
            match self.adapter.run_get_entries(&mut self.browser).await {
                Ok(fetched) => {
                    info!(session = %self.id, count = fetched.len(), "entries fetched");
                    *entries = Some(fetched);
                }
                Err(err) => {
                    warn!(session = %self.id, error = %err, "could not read entries");
                    return Err(err);
                }
            }
        }

        entries
            .as_ref()
            .ok_or_else(|| BankError::EntriesUnavailable("no entries cached".to_string()))
    }

    /// Find the entry paying `amount`, optionally mentioning `reference`.
    pub async fn find_payment(
        &mut self,
        amount: Decimal,
        reference: Option<&str>,
    ) -> BankResult<Option<&Entry>> {
        let entries = self.get_entries().await?;
        Ok(entries.find_payment(amount, reference))
    }

    /// Whether an entry of exactly `amount` exists and, if `reference` is
    /// given, mentions it.
    pub async fn is_paid(&mut self, amount: Decimal, reference: Option<&str>) -> BankResult<bool> {
        Ok(self.find_payment(amount, reference).await?.is_some())
    }

    /// Start a transfer. `Ok(true)` once the bank accepted it, including a
    /// successful TAN step; adapters without transfer support yield
    /// [`BankError::Unsupported`].
    pub async fn start_transaction(
        &mut self,
        amount: Decimal,
        iban: &str,
        bic: &str,
        name: &str,
        reference: &str,
    ) -> BankResult<bool> {
        if !self.is_logged_in() {
            return Err(BankError::NotLoggedIn);
        }
        let transfer = Transfer::new(amount, iban, bic, name, reference)?;
        self.start_transfer(&transfer).await
    }

    pub async fn start_transfer(&mut self, transfer: &Transfer) -> BankResult<bool> {
        if !self.is_logged_in() {
            return Err(BankError::NotLoggedIn);
        }

        let status = self
            .adapter
            .run_start_transaction(&mut self.browser, transfer)
            .await?;
        let accepted = match status {
            TransferStatus::Completed => true,
            TransferStatus::Rejected => false,
            TransferStatus::NeedsConfirmation => {
                self.adapter.run_confirm_tan(&mut self.browser, transfer).await
            }
        };
        info!(session = %self.id, ?status, accepted, amount = %transfer.amount, "transfer finished");
        Ok(accepted)
    }

    /// Log out through the adapter. The session is logged out afterwards
    /// whatever the adapter reports.
    pub async fn logout(&mut self) -> BankResult<bool> {
        if !self.is_logged_in() {
            return Err(BankError::NotLoggedIn);
        }
        let confirmed = self.adapter.run_logout(&mut self.browser).await;
        self.state = SessionState::LoggedOut;
        info!(session = %self.id, confirmed, "logged out");
        Ok(confirmed)
    }
}
