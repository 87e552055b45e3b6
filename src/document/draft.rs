use chrono::{Local, NaiveDate};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::config::{Config, Customer};
use crate::document::model::{DocumentKind, DocumentModel};
use crate::error::{DocError, Result};
use crate::finance::{self, ChargeBreakdown, LineItem, Payment, PaymentMethod};

/// A form snapshot for one document, loaded from a TOML or JSON file.
///
/// Every field is optional: a half-filled draft resolves with zeroed
/// amounts and empty sections rather than failing. The only blocking
/// validation is the customer name.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Draft {
    pub kind: DocumentKind,
    /// Customer id from customers.toml; inline fields below override it.
    pub customer: Option<String>,
    pub customer_name: Option<String>,
    pub customer_address: Option<String>,
    pub customer_phone: Option<String>,
    pub customer_email: Option<String>,

    pub number: Option<String>,
    pub date: Option<String>,
    pub due_date: Option<String>,

    pub material_cost: Option<f64>,
    pub labor_price: Option<f64>,
    pub include_tax: Option<bool>,
    pub deposit_percent: Option<f64>,
    pub line_items: Vec<DraftLineItem>,
    pub materials: Vec<DraftLineItem>,
    pub payments: Vec<DraftPayment>,

    pub scope_of_work: Option<String>,
    pub warranty: Option<String>,
    pub terms: Option<String>,
    pub notes: Option<String>,
    pub payment_methods: Option<String>,

    pub show_itemized_list: Option<bool>,
    pub show_cost_breakdown: Option<bool>,
    pub show_materials_list: Option<bool>,

    // Company overrides; blank fields fall back to config.toml.
    pub company_name: Option<String>,
    pub company_address: Option<String>,
    pub company_phone: Option<String>,
    pub company_email: Option<String>,
    pub logo_url: Option<String>,
    pub license_number: Option<String>,
    pub id_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DraftLineItem {
    pub description: Option<String>,
    pub quantity: Option<u32>,
    pub unit_price: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DraftPayment {
    pub method: Option<String>,
    pub amount: Option<f64>,
    pub check_number: Option<String>,
    pub date: Option<NaiveDate>,
}

/// Load a draft file, picking the parser from the extension (.json is
/// JSON, everything else TOML).
pub fn load_draft(path: &Path) -> Result<Draft> {
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if is_json {
        serde_json::from_str(&content).map_err(|e| DocError::DraftParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    } else {
        toml::from_str(&content).map_err(|e| DocError::DraftParse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl Draft {
    /// Merge the draft with company defaults and the customer book into a
    /// fully-resolved DocumentModel.
    pub fn resolve(
        self,
        config: &Config,
        customers: &HashMap<String, Customer>,
    ) -> Result<DocumentModel> {
        let record = match self.customer.as_deref() {
            Some(id) => Some(
                customers
                    .get(id)
                    .cloned()
                    .ok_or_else(|| DocError::CustomerNotFound(id.to_string()))?,
            ),
            None => None,
        };

        let customer_name = self
            .customer_name
            .clone()
            .or_else(|| record.as_ref().map(|c| c.name.clone()))
            .filter(|n| !n.trim().is_empty())
            .ok_or(DocError::MissingCustomerName)?;
        let customer_address = self
            .customer_address
            .or_else(|| record.as_ref().and_then(|c| c.address.clone()));
        let customer_phone = self
            .customer_phone
            .or_else(|| record.as_ref().and_then(|c| c.phone.clone()));
        let customer_email = self
            .customer_email
            .or_else(|| record.as_ref().and_then(|c| c.email.clone()));

        let date = match self.date.as_deref() {
            Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .map_err(|_| DocError::InvalidDate(s.to_string()))?,
            None => Local::now().date_naive(),
        };

        let mut company = config.company.clone();
        if let Some(name) = self.company_name {
            company.name = name;
        }
        if let Some(address) = self.company_address {
            company.address = address;
        }
        if let Some(email) = self.company_email {
            company.email = email;
        }
        if self.company_phone.is_some() {
            company.phone = self.company_phone;
        }
        if self.logo_url.is_some() {
            company.logo_url = self.logo_url;
        }
        if self.license_number.is_some() {
            company.license_number = self.license_number;
        }
        if self.id_number.is_some() {
            company.id_number = self.id_number;
        }

        let line_items: Vec<LineItem> = self.line_items.into_iter().map(resolve_item).collect();
        let materials: Vec<LineItem> = self.materials.into_iter().map(resolve_item).collect();

        let include_tax = self.include_tax.unwrap_or(false);
        let charges = if line_items.is_empty() {
            ChargeBreakdown::from_costs(self.material_cost, self.labor_price, include_tax)
        } else {
            ChargeBreakdown::from_line_items(&line_items, include_tax)
        };

        let payments: Vec<Payment> = self
            .payments
            .into_iter()
            .filter_map(|p| resolve_payment(p, date))
            .collect();

        let is_contract = self.kind == DocumentKind::Contract;
        let deposit_percent = match self.deposit_percent {
            Some(p) => Some(p),
            None if is_contract => Some(50.0),
            None => None,
        };
        let warranty = self
            .warranty
            .or_else(|| is_contract.then(|| config.document.warranty.clone()));
        let payment_methods = self
            .payment_methods
            .or_else(|| (self.kind != DocumentKind::Invoice).then(|| config.document.payment_methods.clone()));

        Ok(DocumentModel {
            kind: self.kind,
            number: self.number,
            company,
            customer_name,
            customer_address,
            customer_phone,
            customer_email,
            display_date: date.format("%B %d, %Y").to_string(),
            iso_date: date.format("%Y-%m-%d").to_string(),
            due_date: self.due_date,
            line_items,
            charges,
            payments,
            deposit_percent,
            scope_of_work: self.scope_of_work,
            warranty,
            terms: self.terms,
            notes: self.notes,
            payment_methods,
            materials,
            show_itemized_list: self.show_itemized_list.unwrap_or(true),
            show_cost_breakdown: self.show_cost_breakdown.unwrap_or(false),
            show_materials_list: self.show_materials_list.unwrap_or(false),
        })
    }
}

fn resolve_item(item: DraftLineItem) -> LineItem {
    LineItem {
        description: item.description.unwrap_or_default(),
        quantity: item.quantity.unwrap_or(0),
        unit_price: finance::coerce(item.unit_price),
    }
}

/// Payments with a non-positive amount are dropped rather than rejected;
/// drafts are tolerant, the add-payment command is strict.
fn resolve_payment(payment: DraftPayment, fallback_date: NaiveDate) -> Option<Payment> {
    let amount = finance::coerce(payment.amount);
    if amount <= 0.0 {
        return None;
    }
    let method = match payment.method.as_deref() {
        Some(m) if m.eq_ignore_ascii_case("check") => PaymentMethod::Check,
        _ => PaymentMethod::Cash,
    };
    Some(Payment {
        method,
        amount,
        check_number: payment.check_number,
        date: payment.date.unwrap_or(fallback_date),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Company, DocumentSettings, PdfSettings};
    use crate::finance::PaymentStatus;

    fn test_config() -> Config {
        Config {
            company: Company {
                name: "Rewixx LLC".into(),
                address: "1 Main St, Springfield".into(),
                email: "office@rewixx.test".into(),
                phone: Some("555-0100".into()),
                logo_url: None,
                license_number: Some("C-100".into()),
                id_number: None,
            },
            document: DocumentSettings::default(),
            pdf: PdfSettings {
                output_dir: "output".into(),
            },
        }
    }

    fn customers() -> HashMap<String, Customer> {
        let mut map = HashMap::new();
        map.insert(
            "acme".to_string(),
            Customer {
                name: "Acme Corp".into(),
                contact: None,
                email: Some("ap@acme.test".into()),
                phone: None,
                address: Some("456 Client Ave".into()),
            },
        );
        map
    }

    #[test]
    fn empty_draft_needs_a_customer_name() {
        let err = Draft::default()
            .resolve(&test_config(), &customers())
            .unwrap_err();
        assert!(matches!(err, DocError::MissingCustomerName));
    }

    #[test]
    fn missing_amounts_resolve_to_zero_totals() {
        let draft = Draft {
            customer_name: Some("Walk-in".into()),
            ..Draft::default()
        };
        let model = draft.resolve(&test_config(), &customers()).unwrap();
        assert_eq!(model.charges.subtotal, 0.0);
        assert_eq!(model.charges.total, 0.0);
    }

    #[test]
    fn customer_record_fills_contact_fields() {
        let draft = Draft {
            customer: Some("acme".into()),
            date: Some("2026-01-05".into()),
            ..Draft::default()
        };
        let model = draft.resolve(&test_config(), &customers()).unwrap();
        assert_eq!(model.customer_name, "Acme Corp");
        assert_eq!(model.customer_address.as_deref(), Some("456 Client Ave"));
        assert_eq!(model.display_date, "January 05, 2026");
        assert_eq!(model.iso_date, "2026-01-05");
    }

    #[test]
    fn unknown_customer_id_is_rejected() {
        let draft = Draft {
            customer: Some("ghost".into()),
            ..Draft::default()
        };
        let err = draft.resolve(&test_config(), &customers()).unwrap_err();
        assert!(matches!(err, DocError::CustomerNotFound(id) if id == "ghost"));
    }

    #[test]
    fn itemized_invoice_with_partial_payment() {
        let draft: Draft = toml::from_str(
            r#"
kind = "invoice"
customer = "acme"
date = "2026-02-01"
include_tax = true

[[line_items]]
description = "Labor"
quantity = 1
unit_price = 500.0

[[line_items]]
description = "Materials"
quantity = 1
unit_price = 120.0

[[payments]]
amount = 300.0
date = "2026-02-10"
"#,
        )
        .unwrap();
        let model = draft.resolve(&test_config(), &customers()).unwrap();
        assert!((model.charges.subtotal - 620.0).abs() < 1e-9);
        assert!((model.charges.tax_amount - 37.2).abs() < 1e-9);
        assert!((model.charges.total - 657.2).abs() < 1e-9);

        let summary = model.payment_summary();
        assert_eq!(summary.status, PaymentStatus::Partial);
        assert!((summary.total_paid - 300.0).abs() < 1e-9);
        assert!((summary.remaining_balance - 357.2).abs() < 1e-9);
        assert_eq!(model.filename(), "Invoice_Acme_Corp_2026-02-01.pdf");
    }

    #[test]
    fn contract_defaults_deposit_and_boilerplate() {
        let draft: Draft = toml::from_str(
            r#"
kind = "contract"
customer = "acme"
material_cost = 400.0
labor_price = 600.0
"#,
        )
        .unwrap();
        let model = draft.resolve(&test_config(), &customers()).unwrap();
        assert_eq!(model.deposit_percent, Some(50.0));
        let split = model.deposit().unwrap();
        assert!((split.deposit_amount - 500.0).abs() < 1e-9);
        assert_eq!(model.warranty.as_deref(), Some("2 years on workmanship"));
        assert!(model.payment_methods.is_some());
    }

    #[test]
    fn invalid_date_is_rejected() {
        let draft = Draft {
            customer_name: Some("Acme".into()),
            date: Some("01/05/2026".into()),
            ..Draft::default()
        };
        let err = draft.resolve(&test_config(), &customers()).unwrap_err();
        assert!(matches!(err, DocError::InvalidDate(_)));
    }

    #[test]
    fn zero_amount_draft_payments_are_dropped() {
        let draft: Draft = toml::from_str(
            r#"
customer = "acme"

[[payments]]
amount = 0.0

[[payments]]
method = "check"
amount = 50.0
check_number = "1042"
"#,
        )
        .unwrap();
        let model = draft.resolve(&test_config(), &customers()).unwrap();
        assert_eq!(model.payments.len(), 1);
        assert_eq!(model.payments[0].method, PaymentMethod::Check);
        assert_eq!(model.payments[0].check_number.as_deref(), Some("1042"));
    }
}
