pub mod entry;
pub mod normalize;

pub use entry::{Account, Entry, EntrySet};
pub use normalize::{is_iban, normalize_account, normalize_amount, normalize_date};
