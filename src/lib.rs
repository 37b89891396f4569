//! Scripted HTTP browser for online-banking sites that only offer HTML pages.
//!
//! A [`Browser`] keeps one cookie-bearing session and exposes the primitives a
//! human would use: open a page, fill in a field, click a button or link.
//! Bank-specific [`BankAdapter`]s combine those primitives into login,
//! statement reading, transfers and logout; a [`BankSession`] runs an adapter
//! through its login lifetime and caches what it read.

pub mod bank;
pub mod browser;
pub mod core;
pub mod dom;
pub mod entries;
pub mod errors;
pub mod types;

#[cfg(test)]
pub(crate) mod testing;

pub use bank::{BankSession, Transfer, TransferStatus};
pub use browser::Browser;
pub use crate::core::{BankAdapter, BrowserConfig, Config, Credentials};
pub use dom::{Clickable, Document, Element, PageSummary};
pub use entries::{Account, Entry, EntrySet};
pub use errors::{BankError, BrowserError};
pub use types::*;
