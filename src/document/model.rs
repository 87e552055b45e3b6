use serde::{Deserialize, Serialize};

use crate::config::Company;
use crate::finance::{
    self, ChargeBreakdown, DepositSplit, LineItem, Payment, PaymentSummary,
};

/// The three document kinds, all driven through the same derivation engine
/// and renderer. A job report is the invoice generated from a job record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DocumentKind {
    #[default]
    Invoice,
    Contract,
    JobReport,
}

impl DocumentKind {
    pub fn title(&self) -> &'static str {
        match self {
            DocumentKind::Invoice | DocumentKind::JobReport => "INVOICE",
            DocumentKind::Contract => "SERVICE CONTRACT",
        }
    }

    /// Filename prefix. Job reports are saved under the invoice prefix.
    pub fn file_prefix(&self) -> &'static str {
        match self {
            DocumentKind::Invoice | DocumentKind::JobReport => "Invoice",
            DocumentKind::Contract => "Contract",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DocumentKind::Invoice => "invoice",
            DocumentKind::Contract => "contract",
            DocumentKind::JobReport => "job-report",
        }
    }
}

/// Fully-resolved input to the rendering step. Constructed fresh from a
/// draft on every generation; never mutated in place.
#[derive(Debug, Clone)]
pub struct DocumentModel {
    pub kind: DocumentKind,
    pub number: Option<String>,
    pub company: Company,
    pub customer_name: String,
    pub customer_address: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,
    /// Display form, e.g. "January 05, 2026".
    pub display_date: String,
    /// ISO form used for filenames, e.g. "2026-01-05".
    pub iso_date: String,
    pub due_date: Option<String>,
    pub line_items: Vec<LineItem>,
    pub charges: ChargeBreakdown,
    pub payments: Vec<Payment>,
    pub deposit_percent: Option<f64>,
    pub scope_of_work: Option<String>,
    pub warranty: Option<String>,
    pub terms: Option<String>,
    pub notes: Option<String>,
    pub payment_methods: Option<String>,
    /// Internal materials tracking, kept distinct from the billing
    /// material cost in `charges`. Neither defaults from the other.
    pub materials: Vec<LineItem>,
    pub show_itemized_list: bool,
    pub show_cost_breakdown: bool,
    pub show_materials_list: bool,
}

impl DocumentModel {
    pub fn filename(&self) -> String {
        format!(
            "{}_{}_{}.pdf",
            self.kind.file_prefix(),
            sanitize_name(&self.customer_name),
            sanitize_date(&self.iso_date)
        )
    }

    pub fn payment_summary(&self) -> PaymentSummary {
        finance::settle(self.charges.total, &self.payments)
    }

    pub fn deposit(&self) -> Option<DepositSplit> {
        self.deposit_percent
            .map(|percent| finance::deposit_split(self.charges.total, percent))
    }

    /// Sum of the internal materials list; informational only, never part
    /// of the billed charges.
    pub fn internal_material_cost(&self) -> f64 {
        self.materials.iter().map(LineItem::line_total).sum()
    }
}

/// Every character outside [A-Za-z0-9] becomes an underscore.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

/// Every character outside [A-Za-z0-9] becomes a dash.
pub fn sanitize_date(date: &str) -> String {
    date.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '-' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn model(kind: DocumentKind, customer: &str, iso_date: &str) -> DocumentModel {
        DocumentModel {
            kind,
            number: None,
            company: Company {
                name: "Rewixx LLC".into(),
                address: "1 Main St".into(),
                email: "office@rewixx.test".into(),
                phone: None,
                logo_url: None,
                license_number: None,
                id_number: None,
            },
            customer_name: customer.into(),
            customer_address: None,
            customer_phone: None,
            customer_email: None,
            display_date: "January 05, 2026".into(),
            iso_date: iso_date.into(),
            due_date: None,
            line_items: Vec::new(),
            charges: ChargeBreakdown::from_costs(None, None, false),
            payments: Vec::new(),
            deposit_percent: None,
            scope_of_work: None,
            warranty: None,
            terms: None,
            notes: None,
            payment_methods: None,
            materials: Vec::new(),
            show_itemized_list: true,
            show_cost_breakdown: false,
            show_materials_list: false,
        }
    }

    #[test]
    fn contract_filename_sanitizes_every_symbol() {
        let m = model(DocumentKind::Contract, "O'Brien & Sons, Inc.", "2026-01-05");
        assert_eq!(m.filename(), "Contract_O_Brien___Sons__Inc__2026-01-05.pdf");
    }

    #[test]
    fn invoice_filename_keeps_alphanumerics() {
        let m = model(DocumentKind::Invoice, "Acme42", "2026-03-01");
        assert_eq!(m.filename(), "Invoice_Acme42_2026-03-01.pdf");
    }

    #[test]
    fn job_report_saves_as_invoice() {
        let m = model(DocumentKind::JobReport, "Acme", "2026-03-01");
        assert!(m.filename().starts_with("Invoice_"));
    }

    #[test]
    fn internal_materials_stay_out_of_charges() {
        let mut m = model(DocumentKind::Invoice, "Acme", "2026-03-01");
        m.materials.push(LineItem {
            description: "Copper pipe".into(),
            quantity: 3,
            unit_price: 12.5,
        });
        assert!((m.internal_material_cost() - 37.5).abs() < 1e-9);
        assert_eq!(m.charges.total, 0.0);
    }
}
