// Application layer - the ledger store facade used by every front end.
// The CLI talks only to LedgerService; the repository stays behind it.

pub mod error;
pub mod input;
pub mod reporting;
mod service;

pub use error::*;
pub use input::*;
pub use reporting::*;
pub use service::*;
