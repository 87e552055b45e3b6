use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed sales tax rate. Applied to the unrounded subtotal when a document
/// has tax enabled; there is no support for variable rates.
pub const TAX_RATE: f64 = 0.06;

/// Coerce an optional numeric field to a usable amount. Missing or
/// non-finite values become 0.0 rather than an error, so a half-filled
/// draft still derives a (zero) total.
pub fn coerce(value: Option<f64>) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// A single billable line on an invoice.
///
/// The line total is always recomputed from quantity and unit price; it is
/// never stored independently.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl LineItem {
    pub fn line_total(&self) -> f64 {
        self.quantity as f64 * self.unit_price
    }
}

/// Derived subtotal/tax/total for a job, contract, or invoice. Never
/// persisted; recomputed from its inputs on every use.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChargeBreakdown {
    pub material_cost: f64,
    pub labor_price: f64,
    pub subtotal: f64,
    pub tax_enabled: bool,
    pub tax_amount: f64,
    pub total: f64,
}

impl ChargeBreakdown {
    /// Derive charges from a billing material cost and a labor price.
    /// Tax is computed on the unrounded subtotal; rounding happens at
    /// formatting time only.
    pub fn from_costs(
        material_cost: Option<f64>,
        labor_price: Option<f64>,
        tax_enabled: bool,
    ) -> Self {
        let material_cost = coerce(material_cost);
        let labor_price = coerce(labor_price);
        Self::derive(material_cost, labor_price, tax_enabled)
    }

    /// Derive charges from an itemized list. The whole itemized subtotal is
    /// carried as labor; the material/labor split only applies to
    /// cost-based documents.
    pub fn from_line_items(items: &[LineItem], tax_enabled: bool) -> Self {
        let subtotal: f64 = items.iter().map(LineItem::line_total).sum();
        Self::derive(0.0, subtotal, tax_enabled)
    }

    fn derive(material_cost: f64, labor_price: f64, tax_enabled: bool) -> Self {
        let subtotal = material_cost + labor_price;
        let tax_amount = if tax_enabled { subtotal * TAX_RATE } else { 0.0 };
        Self {
            material_cost,
            labor_price,
            subtotal,
            tax_enabled,
            tax_amount,
            total: subtotal + tax_amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Check,
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMethod::Cash => write!(f, "Cash"),
            PaymentMethod::Check => write!(f, "Check"),
        }
    }
}

/// A recorded payment against a document. Check payments carry the check
/// number; cash payments leave it unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default)]
    pub method: PaymentMethod,
    pub amount: f64,
    #[serde(default)]
    pub check_number: Option<String>,
    pub date: NaiveDate,
}

/// Three-way payment classification, derived from total vs. sum of
/// payments. Recomputed on every use, never cached on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Unpaid,
    Partial,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentStatus::Unpaid => write!(f, "UNPAID"),
            PaymentStatus::Partial => write!(f, "PARTIAL"),
            PaymentStatus::Paid => write!(f, "PAID"),
        }
    }
}

/// Reconciliation of a total against recorded payments.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaymentSummary {
    pub total_paid: f64,
    /// May be negative when overpaid; callers clamp for display only.
    pub remaining_balance: f64,
    pub status: PaymentStatus,
}

pub fn settle(total: f64, payments: &[Payment]) -> PaymentSummary {
    let total_paid: f64 = payments.iter().map(|p| coerce(Some(p.amount))).sum();
    let status = if total_paid <= 0.0 {
        PaymentStatus::Unpaid
    } else if total_paid < total {
        PaymentStatus::Partial
    } else {
        PaymentStatus::Paid
    };
    PaymentSummary {
        total_paid,
        remaining_balance: total - total_paid,
        status,
    }
}

/// Contract deposit/balance split.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DepositSplit {
    pub percent: f64,
    pub deposit_amount: f64,
    pub balance_amount: f64,
}

pub fn deposit_split(total: f64, deposit_percent: f64) -> DepositSplit {
    let percent = deposit_percent.clamp(0.0, 100.0);
    let deposit_amount = total * percent / 100.0;
    DepositSplit {
        percent,
        deposit_amount,
        balance_amount: total - deposit_amount,
    }
}

/// Dollar formatting with two decimal places; the only place amounts are
/// rounded.
pub fn format_usd(amount: f64) -> String {
    format!("${:.2}", amount)
}
