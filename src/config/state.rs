use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::document::DocumentKind;
use crate::finance::{self, Payment, PaymentStatus};

#[derive(Debug, Deserialize, Serialize, Default)]
pub struct State {
    #[serde(default)]
    pub history: Vec<DocumentEntry>,
}

/// A generated document on disk. Payment status is never stored; it is
/// derived from `payments` against `total` whenever it is displayed.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DocumentEntry {
    pub kind: DocumentKind,
    pub customer: String,
    pub date: NaiveDate,
    pub total: f64,
    pub file: String,
    #[serde(default)]
    pub payments: Vec<Payment>,
}

impl DocumentEntry {
    pub fn paid_amount(&self) -> f64 {
        finance::settle(self.total, &self.payments).total_paid
    }

    pub fn outstanding(&self) -> f64 {
        finance::settle(self.total, &self.payments).remaining_balance
    }

    pub fn status(&self) -> PaymentStatus {
        finance::settle(self.total, &self.payments).status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::finance::PaymentMethod;

    fn entry(total: f64, amounts: &[f64]) -> DocumentEntry {
        DocumentEntry {
            kind: DocumentKind::Invoice,
            customer: "acme".into(),
            date: NaiveDate::from_ymd_opt(2026, 1, 10).unwrap(),
            total,
            file: "Invoice_Acme_2026-01-10.pdf".into(),
            payments: amounts
                .iter()
                .map(|&amount| Payment {
                    method: PaymentMethod::Cash,
                    amount,
                    check_number: None,
                    date: NaiveDate::from_ymd_opt(2026, 1, 12).unwrap(),
                })
                .collect(),
        }
    }

    #[test]
    fn status_is_derived_from_payments() {
        assert_eq!(entry(100.0, &[]).status(), PaymentStatus::Unpaid);
        assert_eq!(entry(100.0, &[40.0]).status(), PaymentStatus::Partial);
        assert_eq!(entry(100.0, &[60.0, 40.0]).status(), PaymentStatus::Paid);
    }

    #[test]
    fn outstanding_tracks_payments() {
        let e = entry(100.0, &[40.0]);
        assert!((e.outstanding() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn legacy_entries_deserialize_without_payments() {
        let toml = r#"
kind = "invoice"
customer = "acme"
date = "2026-01-10"
total = 250.0
file = "Invoice_Acme_2026-01-10.pdf"
"#;
        let e: DocumentEntry = toml::from_str(toml).unwrap();
        assert!(e.payments.is_empty());
        assert_eq!(e.status(), PaymentStatus::Unpaid);
    }
}
