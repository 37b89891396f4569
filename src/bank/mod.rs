pub mod session;
pub mod transfer;

pub use session::BankSession;
pub use transfer::{Transfer, TransferStatus};
