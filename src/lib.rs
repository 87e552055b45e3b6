pub mod config;
pub mod document;
pub mod error;
pub mod finance;
pub mod pdf;

pub use config::{Company, Config, Customer, DocumentEntry, State};
pub use document::{load_draft, Draft, DocumentKind, DocumentModel};
pub use error::{DocError, Result};
