pub mod document;
pub mod element;
pub mod form;
pub mod state;

pub use document::{Clickable, Document};
pub use element::{normalize_whitespace, Element};
pub use form::FormSubmission;
pub use state::{FormSummary, LinkSummary, PageSummary};
