use crate::entries::{is_iban, normalize_account};
use crate::errors::{BankError, BankResult};
use rust_decimal::Decimal;
use serde::Serialize;

/// An outgoing SEPA transfer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Transfer {
    pub amount: Decimal,
    pub iban: String,
    pub bic: String,
    pub name: String,
    pub reference: String,
}

/// How far a transfer got on the bank's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferStatus {
    Completed,
    Rejected,
    /// The bank asks for a TAN before executing it.
    NeedsConfirmation,
}

impl Transfer {
    pub fn new(
        amount: Decimal,
        iban: &str,
        bic: &str,
        name: &str,
        reference: &str,
    ) -> BankResult<Self> {
        if amount <= Decimal::ZERO {
            return Err(BankError::InvalidTransfer(format!(
                "amount must be positive, got {}",
                amount
            )));
        }
        let iban = normalize_account(iban);
        if !is_iban(&iban) {
            return Err(BankError::InvalidTransfer(format!("not an IBAN: {}", iban)));
        }
        let name = name.trim();
        if name.is_empty() {
            return Err(BankError::InvalidTransfer("recipient name is empty".to_string()));
        }

        Ok(Self {
            amount,
            iban,
            bic: normalize_account(bic),
            name: name.to_string(),
            reference: reference.trim().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields_are_normalized() {
        let transfer = Transfer::new(
            Decimal::new(4990, 2),
            "de89 3704 0044 0532 0130 00",
            "cobadeff xxx",
            "  Max Mustermann ",
            " RE-2024-17 ",
        )
        .unwrap();
        assert_eq!(transfer.iban, "DE89370400440532013000");
        assert_eq!(transfer.bic, "COBADEFFXXX");
        assert_eq!(transfer.name, "Max Mustermann");
        assert_eq!(transfer.reference, "RE-2024-17");
    }

    #[test]
    fn invalid_transfers_are_rejected() {
        let ok_iban = "DE89370400440532013000";
        assert!(matches!(
            Transfer::new(Decimal::ZERO, ok_iban, "", "X", ""),
            Err(BankError::InvalidTransfer(_))
        ));
        assert!(matches!(
            Transfer::new(Decimal::ONE, "37040044", "", "X", ""),
            Err(BankError::InvalidTransfer(_))
        ));
        assert!(matches!(
            Transfer::new(Decimal::ONE, ok_iban, "", " ", ""),
            Err(BankError::InvalidTransfer(_))
        ));
    }
}
