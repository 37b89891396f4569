use super::normalize::{is_iban, normalize_account, normalize_amount, normalize_date};
use crate::dom::normalize_whitespace;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// Counterparty account of a statement entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub account_number: String,
    pub bank_code: String,
    pub is_iban: bool,
}

impl Account {
    pub fn new(raw_account: &str, raw_bank_code: &str) -> Self {
        let account_number = normalize_account(raw_account);
        Self {
            is_iban: is_iban(&account_number),
            bank_code: normalize_account(raw_bank_code),
            account_number,
        }
    }
}

/// One normalized statement line. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry {
    amount: Option<Decimal>,
    booking_date: Option<NaiveDate>,
    value_date: Option<NaiveDate>,
    text: Vec<String>,
    source: Account,
}

impl Entry {
    pub fn amount(&self) -> Option<Decimal> {
        self.amount
    }

    pub fn booking_date(&self) -> Option<NaiveDate> {
        self.booking_date
    }

    pub fn value_date(&self) -> Option<NaiveDate> {
        self.value_date
    }

    pub fn text(&self) -> &[String] {
        &self.text
    }

    pub fn source(&self) -> &Account {
        &self.source
    }

    /// Whether the description mentions `reference`, ignoring case and
    /// all whitespace (statement lines often wrap in the middle of a code).
    pub fn mentions(&self, reference: &str) -> bool {
        let needle: String = reference
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        let haystack: String = self
            .text
            .concat()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_uppercase();
        haystack.contains(&needle)
    }
}

/// Statement entries in the order they were read. Append-only.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct EntrySet {
    entries: Vec<Entry>,
}

impl EntrySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize one raw statement row and append it.
    ///
    /// Unreadable amounts or dates become absent on the entry; the entry is
    /// still recorded. `text` items may themselves contain line breaks.
    pub fn add<I, S>(
        &mut self,
        raw_amount: &str,
        raw_booking_date: &str,
        raw_value_date: &str,
        text: I,
        raw_source_account: &str,
        raw_source_bank_code: &str,
    ) -> &Entry
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let text = text
            .into_iter()
            .flat_map(|chunk| {
                chunk
                    .as_ref()
                    .lines()
                    .map(normalize_whitespace)
                    .collect::<Vec<_>>()
            })
            .filter(|line| !line.is_empty())
            .collect();

        let entry = Entry {
            amount: normalize_amount(raw_amount),
            booking_date: normalize_date(raw_booking_date),
            value_date: normalize_date(raw_value_date),
            text,
            source: Account::new(raw_source_account, raw_source_bank_code),
        };
        self.entries.push(entry);
        &self.entries[self.entries.len() - 1]
    }

    pub fn all(&self) -> &[Entry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry of exactly `amount` whose description mentions `reference`
    /// (when one is given).
    pub fn find_payment(&self, amount: Decimal, reference: Option<&str>) -> Option<&Entry> {
        let reference = reference.map(str::trim).filter(|r| !r.is_empty());
        self.entries.iter().find(|entry| {
            entry.amount == Some(amount)
                && reference.map(|r| entry.mentions(r)).unwrap_or(true)
        })
    }

    /// Sum of all readable amounts.
    pub fn total(&self) -> Decimal {
        self.entries.iter().filter_map(|e| e.amount).sum()
    }
}

impl<'a> IntoIterator for &'a EntrySet {
    type Item = &'a Entry;
    type IntoIter = std::slice::Iter<'a, Entry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
