mod draft;
mod model;

pub use draft::{load_draft, Draft, DraftLineItem, DraftPayment};
pub use model::{sanitize_date, sanitize_name, DocumentKind, DocumentModel};
