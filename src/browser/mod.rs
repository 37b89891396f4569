pub mod navigation;
pub mod session;

pub use navigation::{fetch, PendingRequest};
pub use session::Browser;
