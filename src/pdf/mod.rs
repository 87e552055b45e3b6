pub mod layout;
pub mod logo;

use std::fs;
use std::path::{Path, PathBuf};

use crate::document::{DocumentKind, DocumentModel};
use crate::error::Result;
use crate::finance::{format_usd, LineItem};
use layout::{Composer, CONTENT_WIDTH, MARGIN, PAGE_WIDTH};
use logo::Logo;

const HEADER_FILL: (f32, f32, f32) = (0.17, 0.24, 0.31);
const ALT_ROW_FILL: (f32, f32, f32) = (0.93, 0.94, 0.95);
const BLACK: (f32, f32, f32) = (0.0, 0.0, 0.0);
const WHITE: (f32, f32, f32) = (1.0, 1.0, 1.0);
const GRAY: (f32, f32, f32) = (0.6, 0.6, 0.6);

const ROW_HEIGHT: f32 = 8.0;
const LINE_HEIGHT: f32 = 5.0;
const RIGHT: f32 = PAGE_WIDTH - MARGIN;

// Column widths as fractions of the content width.
const COL_DESC: f32 = 0.50;
const COL_QTY: f32 = 0.12;
const COL_UNIT: f32 = 0.19;
const COL_TOTAL: f32 = 0.19;

/// Render a document to PDF bytes. The logo is fetched up front so a
/// slow or dead URL cannot interrupt layout mid-page.
pub fn render_document(model: &DocumentModel) -> Result<Vec<u8>> {
    let logo = model
        .company
        .logo_url
        .as_deref()
        .and_then(logo::fetch_logo);

    let mut composer = Composer::new(&format!(
        "{} - {}",
        model.kind.title(),
        model.customer_name
    ))?;

    render_header(&mut composer, model, logo.as_ref());
    render_title(&mut composer, model);
    render_parties(&mut composer, model);

    match model.kind {
        DocumentKind::Contract => {
            render_section(&mut composer, "SCOPE OF WORK", model.scope_of_work.as_deref());
            if model.show_cost_breakdown {
                render_cost_breakdown(&mut composer, model);
            } else {
                render_charge_table(&mut composer, model);
            }
            render_totals(&mut composer, model);
            render_section(&mut composer, "WARRANTY", model.warranty.as_deref());
            render_section(&mut composer, "TERMS", model.terms.as_deref());
            render_section(
                &mut composer,
                "PAYMENT METHODS",
                model.payment_methods.as_deref(),
            );
            render_signature_block(&mut composer, model);
        }
        DocumentKind::Invoice | DocumentKind::JobReport => {
            render_charge_table(&mut composer, model);
            render_totals(&mut composer, model);
            if model.kind == DocumentKind::JobReport && !model.payments.is_empty() {
                render_payment_history(&mut composer, model);
            }
            if model.show_materials_list && !model.materials.is_empty() {
                render_materials(&mut composer, model);
            }
            render_section(&mut composer, "NOTES", model.notes.as_deref());
            render_section(&mut composer, "TERMS", model.terms.as_deref());
            render_section(
                &mut composer,
                "PAYMENT METHODS",
                model.payment_methods.as_deref(),
            );
        }
    }

    render_footer(&mut composer);
    composer.save_to_bytes()
}

/// Render and write the document into `output_dir`, creating it as
/// needed. Returns the written path.
pub fn generate_document(model: &DocumentModel, output_dir: &Path) -> Result<PathBuf> {
    let bytes = render_document(model)?;
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(model.filename());
    fs::write(&path, bytes)?;
    Ok(path)
}

fn render_header(composer: &mut Composer, model: &DocumentModel, logo: Option<&Logo>) {
    let top = composer.cursor();
    let logo_w = 28.0;
    let logo_h = 18.0;

    if model.company.logo_url.is_some() {
        match logo {
            Some(logo) => composer.image(logo, MARGIN, top, logo_w, logo_h),
            None => {
                composer.set_stroke(GRAY.0, GRAY.1, GRAY.2, 0.5);
                composer.stroke_rect(MARGIN, top, logo_w, logo_h);
                composer.set_cursor(top + logo_h / 2.0 + 1.5);
                composer.set_fill_color(GRAY.0, GRAY.1, GRAY.2);
                composer.text_centered(MARGIN, MARGIN + logo_w, "LOGO", 8.0, false);
                composer.set_fill_color(BLACK.0, BLACK.1, BLACK.2);
            }
        }
    }

    composer.set_cursor(top + 7.0);
    composer.text_centered(MARGIN, RIGHT, &model.company.name, 16.0, true);
    composer.advance(6.0);
    composer.text_centered(MARGIN, RIGHT, &model.company.address, 10.0, false);
    composer.advance(5.0);

    let mut contact = Vec::new();
    if let Some(phone) = &model.company.phone {
        contact.push(phone.clone());
    }
    contact.push(model.company.email.clone());
    composer.text_centered(MARGIN, RIGHT, &contact.join(" | "), 10.0, false);

    let mut credentials = Vec::new();
    if let Some(license) = &model.company.license_number {
        credentials.push(format!("License #{license}"));
    }
    if let Some(id) = &model.company.id_number {
        credentials.push(format!("ID #{id}"));
    }
    if !credentials.is_empty() {
        composer.advance(5.0);
        composer.text_centered(MARGIN, RIGHT, &credentials.join("  "), 9.0, false);
    }

    let after_block = composer.cursor().max(top + logo_h);
    composer.set_cursor(after_block + 4.0);
    composer.set_stroke(BLACK.0, BLACK.1, BLACK.2, 0.8);
    composer.rule(MARGIN, RIGHT);
    composer.advance(8.0);
}

fn render_title(composer: &mut Composer, model: &DocumentModel) {
    composer.text(MARGIN, model.kind.title(), 14.0, true);
    if let Some(number) = &model.number {
        composer.text_right(RIGHT, &format!("#{number}"), 12.0, true);
    }
    composer.advance(6.0);
    composer.text_right(RIGHT, &format!("Date: {}", model.display_date), 10.0, false);
    if let Some(due) = &model.due_date {
        composer.advance(5.0);
        composer.text_right(RIGHT, &format!("Due: {due}"), 10.0, false);
    }
    composer.advance(9.0);
}

fn render_parties(composer: &mut Composer, model: &DocumentModel) {
    let mut client_lines = vec![model.customer_name.clone()];
    client_lines.extend(model.customer_address.clone());
    client_lines.extend(model.customer_phone.clone());
    client_lines.extend(model.customer_email.clone());

    if model.kind == DocumentKind::Contract {
        let mut contractor_lines = vec![
            model.company.name.clone(),
            model.company.address.clone(),
        ];
        contractor_lines.extend(model.company.phone.clone());
        contractor_lines.push(model.company.email.clone());

        let mid = MARGIN + CONTENT_WIDTH / 2.0;
        composer.ensure_space(
            6.0 + LINE_HEIGHT * contractor_lines.len().max(client_lines.len()) as f32,
        );
        composer.text(MARGIN, "CONTRACTOR", 10.0, true);
        composer.text(mid, "CLIENT", 10.0, true);
        composer.advance(6.0);
        for i in 0..contractor_lines.len().max(client_lines.len()) {
            if let Some(line) = contractor_lines.get(i) {
                composer.text(MARGIN, line, 10.0, false);
            }
            if let Some(line) = client_lines.get(i) {
                composer.text(mid, line, 10.0, false);
            }
            composer.advance(LINE_HEIGHT);
        }
    } else {
        composer.ensure_space(6.0 + LINE_HEIGHT * client_lines.len() as f32);
        composer.text(MARGIN, "BILL TO:", 10.0, true);
        composer.advance(6.0);
        for line in &client_lines {
            composer.text(MARGIN, line, 10.0, false);
            composer.advance(LINE_HEIGHT);
        }
    }
    composer.advance(5.0);
}

/// One row of the charges table, already formatted for display.
#[derive(Debug, PartialEq)]
pub(crate) struct ChargeRow {
    pub description: String,
    pub quantity: String,
    pub unit_price: String,
    pub line_total: String,
}

fn is_itemized(model: &DocumentModel) -> bool {
    model.show_itemized_list && !model.line_items.is_empty()
}

/// Build the table rows for a document. Itemized documents get one row
/// per line item; everything else collapses into a single summary row
/// carrying the grand total, tax included.
pub(crate) fn charge_rows(model: &DocumentModel) -> Vec<ChargeRow> {
    if is_itemized(model) {
        model.line_items.iter().map(item_row).collect()
    } else {
        vec![ChargeRow {
            description: "Labor and Materials".to_string(),
            quantity: String::new(),
            unit_price: String::new(),
            line_total: format_usd(model.charges.total),
        }]
    }
}

fn item_row(item: &LineItem) -> ChargeRow {
    ChargeRow {
        description: item.description.clone(),
        quantity: item.quantity.to_string(),
        unit_price: format_usd(item.unit_price),
        line_total: format_usd(item.line_total()),
    }
}

fn render_charge_table(composer: &mut Composer, model: &DocumentModel) {
    let rows = charge_rows(model);
    let x_desc = MARGIN;
    let x_qty = MARGIN + CONTENT_WIDTH * COL_DESC;
    let x_unit = x_qty + CONTENT_WIDTH * COL_QTY;
    let x_total = x_unit + CONTENT_WIDTH * COL_UNIT;

    composer.ensure_space(ROW_HEIGHT * 2.0);
    draw_table_header(composer, x_unit, x_total);

    for (i, row) in rows.iter().enumerate() {
        composer.ensure_space(ROW_HEIGHT);
        let top = composer.cursor();
        if i % 2 == 1 {
            composer.set_fill_color(ALT_ROW_FILL.0, ALT_ROW_FILL.1, ALT_ROW_FILL.2);
            composer.fill_rect(MARGIN, top, CONTENT_WIDTH, ROW_HEIGHT);
        }
        composer.set_fill_color(BLACK.0, BLACK.1, BLACK.2);
        composer.set_cursor(top + 5.5);
        let desc = layout::truncate_to_width(
            &row.description,
            CONTENT_WIDTH * COL_DESC - 4.0,
            9.0,
        );
        composer.text(x_desc + 2.0, &desc, 9.0, false);
        composer.text_right(x_unit - 2.0, &row.quantity, 9.0, false);
        composer.text_right(x_total - 2.0, &row.unit_price, 9.0, false);
        composer.text_right(RIGHT - 2.0, &row.line_total, 9.0, false);

        composer.set_stroke(GRAY.0, GRAY.1, GRAY.2, 0.3);
        for x in [x_qty, x_unit, x_total] {
            composer.line(x, top, x, top + ROW_HEIGHT);
        }
        composer.set_cursor(top + ROW_HEIGHT);
    }

    composer.set_stroke(BLACK.0, BLACK.1, BLACK.2, 0.5);
    composer.rule(MARGIN, RIGHT);
    composer.advance(6.0);
}

fn draw_table_header(composer: &mut Composer, x_unit: f32, x_total: f32) {
    let top = composer.cursor();
    composer.set_fill_color(HEADER_FILL.0, HEADER_FILL.1, HEADER_FILL.2);
    composer.fill_rect(MARGIN, top, CONTENT_WIDTH, ROW_HEIGHT);
    composer.set_fill_color(WHITE.0, WHITE.1, WHITE.2);
    composer.set_cursor(top + 5.5);
    composer.text(MARGIN + 2.0, "Description", 9.0, true);
    composer.text_right(x_unit - 2.0, "Qty", 9.0, true);
    composer.text_right(x_total - 2.0, "Unit Price", 9.0, true);
    composer.text_right(RIGHT - 2.0, "Total", 9.0, true);
    composer.set_fill_color(BLACK.0, BLACK.1, BLACK.2);
    composer.set_cursor(top + ROW_HEIGHT);
}

/// Contract cost summary in place of an itemized table.
fn render_cost_breakdown(composer: &mut Composer, model: &DocumentModel) {
    composer.ensure_space(6.0 + LINE_HEIGHT * 2.0);
    composer.text(MARGIN, "COST", 11.0, true);
    composer.advance(6.0);
    amount_line(
        composer,
        "Materials:",
        &format_usd(model.charges.material_cost),
        false,
    );
    amount_line(
        composer,
        "Labor:",
        &format_usd(model.charges.labor_price),
        false,
    );
    composer.advance(2.0);
}

fn amount_line(composer: &mut Composer, label: &str, value: &str, bold: bool) {
    composer.ensure_space(LINE_HEIGHT + 1.0);
    let size = if bold { 11.0 } else { 10.0 };
    composer.text_right(RIGHT - 30.0, label, size, bold);
    composer.text_right(RIGHT, value, size, bold);
    composer.advance(if bold { 7.0 } else { LINE_HEIGHT });
}

/// One right-aligned line of the totals block.
#[derive(Debug, PartialEq)]
pub(crate) struct TotalLine {
    pub label: String,
    pub value: String,
    pub bold: bool,
}

fn total_line(label: impl Into<String>, value: String, bold: bool) -> TotalLine {
    TotalLine {
        label: label.into(),
        value,
        bold,
    }
}

/// Build the totals block. The subtotal line only appears alongside an
/// itemized table; in summary mode the single charge row already
/// carries the grand total.
pub(crate) fn total_lines(model: &DocumentModel) -> Vec<TotalLine> {
    let charges = &model.charges;
    let mut lines = Vec::new();
    if is_itemized(model) {
        lines.push(total_line("Subtotal:", format_usd(charges.subtotal), false));
    }
    if charges.tax_enabled {
        lines.push(total_line("Tax (6%):", format_usd(charges.tax_amount), false));
    }
    lines.push(total_line("Total:", format_usd(charges.total), true));

    if model.kind == DocumentKind::Contract {
        if let Some(split) = model.deposit() {
            lines.push(total_line(
                format!("Deposit Due ({:.0}%):", split.percent),
                format_usd(split.deposit_amount),
                false,
            ));
            lines.push(total_line(
                "Balance on Completion:",
                format_usd(split.balance_amount),
                false,
            ));
        }
    }

    if model.kind == DocumentKind::JobReport && !model.payments.is_empty() {
        let summary = model.payment_summary();
        lines.push(total_line(
            "Payments Received:",
            format!("-{}", format_usd(summary.total_paid)),
            false,
        ));
        lines.push(total_line(
            "Balance Due:",
            format_usd(summary.remaining_balance.max(0.0)),
            true,
        ));
    }
    lines
}

fn render_totals(composer: &mut Composer, model: &DocumentModel) {
    for line in total_lines(model) {
        amount_line(composer, &line.label, &line.value, line.bold);
    }
    composer.advance(4.0);
}

fn render_payment_history(composer: &mut Composer, model: &DocumentModel) {
    composer.ensure_space(6.0 + LINE_HEIGHT);
    composer.text(MARGIN, "PAYMENT HISTORY", 11.0, true);
    composer.advance(6.0);
    for payment in &model.payments {
        composer.ensure_space(LINE_HEIGHT);
        let method = match &payment.check_number {
            Some(number) => format!("{} #{number}", payment.method),
            None => payment.method.to_string(),
        };
        composer.text(
            MARGIN,
            &payment.date.format("%m/%d/%Y").to_string(),
            10.0,
            false,
        );
        composer.text(MARGIN + 30.0, &method, 10.0, false);
        composer.text_right(RIGHT, &format_usd(payment.amount), 10.0, false);
        composer.advance(LINE_HEIGHT);
    }
    composer.advance(4.0);
}

/// Internal materials list; informational, never part of the billed
/// charges.
fn render_materials(composer: &mut Composer, model: &DocumentModel) {
    composer.ensure_space(6.0 + LINE_HEIGHT);
    composer.text(MARGIN, "MATERIALS", 11.0, true);
    composer.advance(6.0);
    for item in &model.materials {
        composer.ensure_space(LINE_HEIGHT);
        composer.text(
            MARGIN,
            &format!("{} x{}", item.description, item.quantity),
            10.0,
            false,
        );
        composer.text_right(RIGHT, &format_usd(item.line_total()), 10.0, false);
        composer.advance(LINE_HEIGHT);
    }
    composer.advance(4.0);
}

/// Heading plus wrapped body, skipped entirely when the body is missing
/// or blank. Each wrapped line gets its own break check so a long
/// paragraph flows across pages.
fn render_section(composer: &mut Composer, heading: &str, body: Option<&str>) {
    let Some(body) = body else { return };
    if body.trim().is_empty() {
        return;
    }
    composer.ensure_space(8.0 + LINE_HEIGHT);
    composer.text(MARGIN, heading, 11.0, true);
    composer.advance(2.0);
    composer.set_stroke(GRAY.0, GRAY.1, GRAY.2, 0.4);
    composer.rule(MARGIN, RIGHT);
    composer.advance(5.0);
    for line in layout::wrap_text(body, CONTENT_WIDTH, 10.0) {
        composer.ensure_space(LINE_HEIGHT);
        composer.text(MARGIN, &line, 10.0, false);
        composer.advance(LINE_HEIGHT);
    }
    composer.advance(4.0);
}

/// Contract signature area. Kept on one page; if it does not fit it
/// moves whole to the next page.
fn render_signature_block(composer: &mut Composer, model: &DocumentModel) {
    composer.ensure_space(55.0);
    composer.advance(8.0);
    composer.text(MARGIN, "ACCEPTANCE", 11.0, true);
    composer.advance(14.0);

    let mid = MARGIN + CONTENT_WIDTH / 2.0;
    let col_width = CONTENT_WIDTH / 2.0 - 10.0;
    composer.set_stroke(BLACK.0, BLACK.1, BLACK.2, 0.5);
    for (x, who) in [(MARGIN, model.company.name.as_str()), (mid, "Client")] {
        composer.rule(x, x + col_width);
        let y = composer.cursor();
        composer.advance(4.5);
        composer.text(x, &format!("Signature ({who})"), 8.0, false);
        composer.set_cursor(y);
    }
    composer.advance(16.0);
    for x in [MARGIN, mid] {
        composer.rule(x, x + col_width);
        let y = composer.cursor();
        composer.advance(4.5);
        composer.text(x, "Date", 8.0, false);
        composer.set_cursor(y);
    }
    composer.advance(10.0);
}

fn render_footer(composer: &mut Composer) {
    composer.ensure_space(12.0);
    composer.advance(6.0);
    composer.set_fill_color(GRAY.0, GRAY.1, GRAY.2);
    composer.text_centered(MARGIN, RIGHT, "Thank you for your business!", 10.0, false);
    composer.set_fill_color(BLACK.0, BLACK.1, BLACK.2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Company;
    use crate::document::DocumentKind;
    use crate::finance::ChargeBreakdown;

    fn model(kind: DocumentKind) -> DocumentModel {
        DocumentModel {
            kind,
            number: Some("1042".into()),
            company: Company {
                name: "Rewixx LLC".into(),
                address: "1 Main St, Springfield".into(),
                email: "office@rewixx.test".into(),
                phone: Some("555-0100".into()),
                logo_url: None,
                license_number: Some("C-100".into()),
                id_number: None,
            },
            customer_name: "Acme Corp".into(),
            customer_address: Some("456 Client Ave".into()),
            customer_phone: None,
            customer_email: None,
            display_date: "January 05, 2026".into(),
            iso_date: "2026-01-05".into(),
            due_date: None,
            line_items: vec![
                LineItem {
                    description: "Labor".into(),
                    quantity: 2,
                    unit_price: 250.0,
                },
                LineItem {
                    description: "Materials".into(),
                    quantity: 1,
                    unit_price: 120.0,
                },
            ],
            charges: ChargeBreakdown::from_line_items(
                &[
                    LineItem {
                        description: "Labor".into(),
                        quantity: 2,
                        unit_price: 250.0,
                    },
                    LineItem {
                        description: "Materials".into(),
                        quantity: 1,
                        unit_price: 120.0,
                    },
                ],
                true,
            ),
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
    fn itemized_rows_carry_computed_line_totals() {
        let rows = charge_rows(&model(DocumentKind::Invoice));
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].line_total, "$500.00");
        assert_eq!(rows[1].line_total, "$120.00");
    }

    #[test]
    fn summary_mode_collapses_to_one_row() {
        let mut m = model(DocumentKind::Invoice);
        m.show_itemized_list = false;
        let rows = charge_rows(&m);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].quantity.is_empty());
    }

    #[test]
    fn summary_row_carries_the_taxed_total() {
        // 620.00 subtotal + 6% tax; the single row shows the grand total.
        let mut m = model(DocumentKind::Invoice);
        m.show_itemized_list = false;
        let rows = charge_rows(&m);
        assert_eq!(rows[0].line_total, "$657.20");
    }

    #[test]
    fn subtotal_line_only_appears_when_itemized() {
        let m = model(DocumentKind::Invoice);
        let lines = total_lines(&m);
        let labels: Vec<&str> = lines.iter().map(|l| l.label.as_str()).collect();
        assert_eq!(labels, ["Subtotal:", "Tax (6%):", "Total:"]);

        let mut summary = model(DocumentKind::Invoice);
        summary.show_itemized_list = false;
        let labels: Vec<String> = total_lines(&summary)
            .into_iter()
            .map(|l| l.label)
            .collect();
        assert_eq!(labels, ["Tax (6%):", "Total:"]);
    }

    #[test]
    fn rendered_invoice_is_a_pdf() {
        let bytes = render_document(&model(DocumentKind::Invoice)).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn unreachable_logo_degrades_to_a_placeholder() {
        // Port 9 (discard) refuses connections immediately; the render
        // must still finish with a placeholder instead of failing.
        let mut m = model(DocumentKind::Invoice);
        m.company.logo_url = Some("http://127.0.0.1:9/logo.png".into());
        let bytes = render_document(&m).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn long_scope_spills_onto_extra_pages() {
        let mut m = model(DocumentKind::Contract);
        m.deposit_percent = Some(50.0);
        m.scope_of_work = Some(
            "Remove existing panel and rewire all circuits. "
                .repeat(120),
        );
        let bytes = render_document(&m).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        // A second page object shows up as another /Type /Page entry.
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.matches("/Type /Page").count() > 2);
    }

    #[test]
    fn generate_writes_the_sanitized_filename() {
        let dir = tempfile::tempdir().unwrap();
        let mut m = model(DocumentKind::Invoice);
        m.customer_name = "O'Brien & Sons".into();
        let path = generate_document(&m, dir.path()).unwrap();
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Invoice_O_Brien___Sons_2026-01-05.pdf"
        );
        assert!(path.exists());
    }
}
