pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

pub use application::{AppError, LedgerService, TransactionFilter};
pub use domain::*;
pub use storage::Repository;
