mod config;
mod document;
mod error;
mod finance;
mod pdf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tabled::{settings::Style, Table, Tabled};

use crate::config::{
    config_dir, load_config, load_customers, load_state, resolve_output_dir, save_state,
    DocumentEntry, CONFIG_TEMPLATE, CUSTOMERS_TEMPLATE, DRAFT_TEMPLATE,
};
use crate::document::load_draft;
use crate::error::{DocError, Result};
use crate::finance::{format_usd, Payment, PaymentMethod};

#[derive(Parser)]
#[command(name = "jobdocs")]
#[command(version, about = "Invoices, contracts, and job reports from the command line", long_about = None)]
struct Cli {
    /// Path to config directory (default: ~/.jobdocs or XDG config)
    #[arg(short = 'C', long, global = true)]
    config_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize config directory with template files
    Init,

    /// List configured customers
    Customers,

    /// Show the derived totals for a draft without writing a PDF
    Preview {
        /// Path to a draft file (.toml or .json)
        draft: PathBuf,
    },

    /// Generate a PDF from a draft and record it in history
    Generate {
        /// Path to a draft file (.toml or .json)
        draft: PathBuf,

        /// Custom output file path (default: output_dir/<Kind>_<Customer>_<Date>.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Open generated PDF with system default viewer
        #[arg(long)]
        open: bool,
    },

    /// List generated documents
    List {
        /// Number of documents to show (default: all)
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Record a payment against a document
    AddPayment {
        /// Index from 'list' (e.g., 1) or generated file name
        document: String,

        /// Payment amount
        amount: f64,

        /// Payment method: cash or check (default: cash)
        #[arg(long, default_value = "cash")]
        method: String,

        /// Check number (required for check payments)
        #[arg(long)]
        check_number: Option<String>,

        /// Payment date (default: today)
        #[arg(long)]
        date: Option<String>,
    },

    /// Remove a payment from a document
    RemovePayment {
        /// Index from 'list' (e.g., 1) or generated file name
        document: String,

        /// 1-based index of payment to remove (default: last)
        #[arg(long)]
        index: Option<usize>,
    },

    /// Show payment history for a document
    Payments {
        /// Index from 'list' (e.g., 1) or generated file name
        document: String,
    },

    /// Show config summary and outstanding balances
    Status,
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let cfg_dir = match cli.config_dir {
        Some(p) => p,
        None => config_dir()?,
    };

    match cli.command {
        Commands::Init => cmd_init(&cfg_dir),
        Commands::Customers => cmd_customers(&cfg_dir),
        Commands::Preview { draft } => cmd_preview(&cfg_dir, &draft),
        Commands::Generate {
            draft,
            output,
            open,
        } => cmd_generate(&cfg_dir, &draft, output, open),
        Commands::List { limit } => cmd_list(&cfg_dir, limit),
        Commands::AddPayment {
            document,
            amount,
            method,
            check_number,
            date,
        } => cmd_add_payment(&cfg_dir, &document, amount, &method, check_number, date),
        Commands::RemovePayment { document, index } => {
            cmd_remove_payment(&cfg_dir, &document, index)
        }
        Commands::Payments { document } => cmd_payments(&cfg_dir, &document),
        Commands::Status => cmd_status(&cfg_dir),
    }
}

/// Initialize config directory with template files
fn cmd_init(cfg_dir: &PathBuf) -> Result<()> {
    use std::fs;

    if cfg_dir.exists() {
        return Err(DocError::AlreadyInitialized(cfg_dir.clone()));
    }

    fs::create_dir_all(cfg_dir)?;
    fs::create_dir_all(cfg_dir.join("output"))?;
    fs::create_dir_all(cfg_dir.join("drafts"))?;

    fs::write(cfg_dir.join("config.toml"), CONFIG_TEMPLATE)?;
    fs::write(cfg_dir.join("customers.toml"), CUSTOMERS_TEMPLATE)?;
    fs::write(cfg_dir.join("drafts").join("invoice.toml"), DRAFT_TEMPLATE)?;

    println!("Initialized jobdocs config at: {}", cfg_dir.display());
    println!();
    println!("Next steps:");
    println!(
        "  1. Edit your company details:  $EDITOR {}/config.toml",
        cfg_dir.display()
    );
    println!(
        "  2. Add your customers:         $EDITOR {}/customers.toml",
        cfg_dir.display()
    );
    println!(
        "  3. Adjust the starter draft:   $EDITOR {}/drafts/invoice.toml",
        cfg_dir.display()
    );
    println!();
    println!("Then generate your first document:");
    println!("  jobdocs generate {}/drafts/invoice.toml", cfg_dir.display());

    Ok(())
}

// Table row structs for tabled
#[derive(Tabled)]
struct CustomerRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "NAME")]
    name: String,
    #[tabled(rename = "CONTACT")]
    contact: String,
    #[tabled(rename = "EMAIL")]
    email: String,
}

#[derive(Tabled)]
struct DocumentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "KIND")]
    kind: String,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "TOTAL")]
    total: String,
    #[tabled(rename = "STATUS")]
    status: String,
    #[tabled(rename = "CUSTOMER")]
    customer: String,
}

#[derive(Tabled)]
struct PaymentRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "DATE")]
    date: String,
    #[tabled(rename = "METHOD")]
    method: String,
    #[tabled(rename = "AMOUNT")]
    amount: String,
}

fn format_whole_money(value: f64) -> String {
    let rounded = value.round() as i64;
    format!("${:>6}", format_grouped_int(rounded))
}

fn format_grouped_int(value: i64) -> String {
    let negative = value < 0;
    let digits = value.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);

    for (i, ch) in digits.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }

    let mut grouped: String = out.chars().rev().collect();
    if negative {
        grouped.insert(0, '-');
    }
    grouped
}

/// Append TOTAL / PAID / OUTSTANDING summary rows under the list table,
/// aligned with its TOTAL column. Falls back to the plain table if the
/// border layout is not the expected six columns.
fn add_financial_footer(table: &str, total: &str, paid: &str, outstanding: &str) -> String {
    let lines: Vec<&str> = table.lines().collect();
    if lines.len() < 4 {
        return table.to_string();
    }

    let top = lines[0];
    let Some(inner) = top.strip_prefix('╭').and_then(|s| s.strip_suffix('╮')) else {
        return table.to_string();
    };

    let widths: Vec<usize> = inner.split('┬').map(|p| p.chars().count()).collect();
    if widths.len() != 6 {
        return table.to_string();
    }

    // Merge #, KIND, DATE into one label cell; keep TOTAL; close off
    // STATUS and CUSTOMER.
    let label_width = widths[0] + widths[1] + widths[2] + 2;
    let total_width = widths[3];

    let mut out = lines[..lines.len() - 1].join("\n");
    out.push('\n');
    out.push_str(&format!(
        "├{}┴{}┴{}┼{}┼{}┴{}╯\n",
        "─".repeat(widths[0]),
        "─".repeat(widths[1]),
        "─".repeat(widths[2]),
        "─".repeat(total_width),
        "─".repeat(widths[4]),
        "─".repeat(widths[5]),
    ));

    let rows = [
        ("TOTAL", total),
        ("(-) PAID", paid),
        ("(=) OUTSTANDING", outstanding),
    ];
    for (idx, (label, value)) in rows.iter().enumerate() {
        out.push_str(&format!(
            "│ {:>label$} │ {:>total$} │\n",
            label,
            value,
            label = label_width - 2,
            total = total_width - 2
        ));
        if idx < rows.len() - 1 {
            out.push_str(&format!(
                "├{}┼{}┤\n",
                "─".repeat(label_width),
                "─".repeat(total_width)
            ));
        }
    }
    out.push_str(&format!(
        "╰{}┴{}╯",
        "─".repeat(label_width),
        "─".repeat(total_width)
    ));

    out
}

/// List configured customers
fn cmd_customers(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DocError::ConfigNotFound(cfg_dir.clone()));
    }

    let customers = load_customers(cfg_dir)?;

    if customers.is_empty() {
        println!("No customers configured.");
        println!("Add customers to: {}/customers.toml", cfg_dir.display());
        return Ok(());
    }

    let mut sorted: Vec<_> = customers.iter().collect();
    sorted.sort_by_key(|(k, _)| *k);

    let rows: Vec<CustomerRow> = sorted
        .iter()
        .map(|(id, customer)| CustomerRow {
            id: id.to_string(),
            name: customer.name.clone(),
            contact: customer.contact.clone().unwrap_or_default(),
            email: customer.email.clone().unwrap_or_default(),
        })
        .collect();

    let table = Table::new(rows).with(Style::rounded()).to_string();
    println!("{table}");

    Ok(())
}

/// Show the derived totals for a draft without generating anything
fn cmd_preview(cfg_dir: &PathBuf, draft_path: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DocError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let customers = load_customers(cfg_dir)?;
    let model = load_draft(draft_path)?.resolve(&config, &customers)?;

    println!("{} for {}", model.kind.title(), model.customer_name);
    println!("{}", "-".repeat(50));
    println!("Date:        {}", model.display_date);
    if let Some(due) = &model.due_date {
        println!("Due:         {due}");
    }

    if !model.line_items.is_empty() {
        println!();
        for item in &model.line_items {
            println!(
                "  {:<40} {:>3} x {:>10} = {:>10}",
                item.description,
                item.quantity,
                format_usd(item.unit_price),
                format_usd(item.line_total())
            );
        }
    }

    println!();
    println!("Subtotal:    {}", format_usd(model.charges.subtotal));
    if model.charges.tax_enabled {
        println!("Tax (6%):    {}", format_usd(model.charges.tax_amount));
    }
    println!("Total:       {}", format_usd(model.charges.total));

    if !model.materials.is_empty() {
        println!(
            "Materials:   {} (internal, not billed)",
            format_usd(model.internal_material_cost())
        );
    }

    if let Some(split) = model.deposit() {
        println!(
            "Deposit:     {} ({:.0}%)",
            format_usd(split.deposit_amount),
            split.percent
        );
        println!("Balance:     {}", format_usd(split.balance_amount));
    }

    if !model.payments.is_empty() {
        let summary = model.payment_summary();
        println!();
        println!("Paid:        {}", format_usd(summary.total_paid));
        println!("Remaining:   {}", format_usd(summary.remaining_balance));
        println!("Status:      {}", summary.status);
    }

    println!();
    println!("Would save as: {}", model.filename());

    Ok(())
}

/// Generate a PDF from a draft and record it in state
fn cmd_generate(
    cfg_dir: &PathBuf,
    draft_path: &PathBuf,
    output: Option<PathBuf>,
    open: bool,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DocError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let customers = load_customers(cfg_dir)?;
    let model = load_draft(draft_path)?.resolve(&config, &customers)?;

    let pdf_path = match output {
        Some(path) => {
            let bytes = pdf::render_document(&model)?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            std::fs::write(&path, bytes)?;
            path
        }
        None => {
            let output_dir = resolve_output_dir(&config.pdf.output_dir, cfg_dir);
            pdf::generate_document(&model, &output_dir)?
        }
    };

    let date = NaiveDate::parse_from_str(&model.iso_date, "%Y-%m-%d")
        .map_err(|_| DocError::InvalidDate(model.iso_date.clone()))?;
    let mut state = load_state(cfg_dir)?;
    state.history.push(DocumentEntry {
        kind: model.kind,
        customer: model.customer_name.clone(),
        date,
        total: model.charges.total,
        file: model.filename(),
        payments: model.payments.clone(),
    });
    save_state(cfg_dir, &state)?;

    println!("Generated {} for {}", model.kind.label(), model.customer_name);
    println!("  Total:  {}", format_usd(model.charges.total));
    println!("  Saved:  {}", pdf_path.display());

    if open {
        open_path(&pdf_path)?;
    }

    Ok(())
}

/// List generated documents with three-way status (UNPAID / PARTIAL / PAID)
fn cmd_list(cfg_dir: &PathBuf, limit: Option<usize>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DocError::ConfigNotFound(cfg_dir.clone()));
    }

    let state = load_state(cfg_dir)?;

    if state.history.is_empty() {
        println!("No documents generated yet.");
        return Ok(());
    }

    let documents: Vec<_> = state.history.iter().rev().enumerate().collect();
    let documents = match limit {
        Some(n) => &documents[..n.min(documents.len())],
        None => &documents[..],
    };

    let rows: Vec<DocumentRow> = documents
        .iter()
        .map(|(idx, entry)| DocumentRow {
            index: idx + 1,
            kind: entry.kind.label().to_string(),
            date: entry.date.to_string(),
            total: format_whole_money(entry.total),
            status: entry.status().to_string(),
            customer: entry.customer.clone(),
        })
        .collect();

    let shown_total: f64 = documents.iter().map(|(_, entry)| entry.total).sum();
    let shown_paid: f64 = documents.iter().map(|(_, entry)| entry.paid_amount()).sum();
    let shown_outstanding = shown_total - shown_paid;

    let table = Table::new(rows).with(Style::rounded()).to_string();
    let table = add_financial_footer(
        &table,
        &format_whole_money(shown_total),
        &format_whole_money(shown_paid),
        &format_whole_money(shown_outstanding),
    );

    println!("{table}");
    println!();
    println!("Total: {} documents", state.history.len());
    println!("Use index number with add-payment/remove-payment/payments (e.g., 'jobdocs payments 1')");

    Ok(())
}

/// Resolve a document reference to its index in history. Accepts either a
/// 1-based index from 'list' (newest first) or a generated file name.
fn resolve_document(state: &config::State, reference: &str) -> Result<usize> {
    if let Ok(idx) = reference.parse::<usize>() {
        if idx == 0 || idx > state.history.len() {
            return Err(DocError::InvalidDocumentIndex(reference.to_string()));
        }
        // 'list' shows newest first.
        return Ok(state.history.len() - idx);
    }

    state
        .history
        .iter()
        .position(|e| e.file == reference)
        .ok_or_else(|| DocError::DocumentNotFound(reference.to_string()))
}

/// Record a payment against a document
fn cmd_add_payment(
    cfg_dir: &PathBuf,
    reference: &str,
    amount: f64,
    method: &str,
    check_number: Option<String>,
    date_str: Option<String>,
) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DocError::ConfigNotFound(cfg_dir.clone()));
    }

    if amount <= 0.0 || !amount.is_finite() {
        return Err(DocError::InvalidPaymentAmount);
    }

    let method = if method.eq_ignore_ascii_case("check") {
        PaymentMethod::Check
    } else {
        PaymentMethod::Cash
    };
    if method == PaymentMethod::Check && check_number.is_none() {
        return Err(DocError::CheckNumberRequired);
    }

    let date = match date_str {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map_err(|_| DocError::InvalidDate(s.clone()))?,
        None => chrono::Local::now().date_naive(),
    };

    let mut state = load_state(cfg_dir)?;
    let idx = resolve_document(&state, reference)?;
    let entry = &mut state.history[idx];

    entry.payments.push(Payment {
        method,
        amount,
        check_number,
        date,
    });
    let remaining = entry.outstanding();
    let file = entry.file.clone();

    save_state(cfg_dir, &state)?;

    if remaining <= 0.001 {
        println!("Recorded {} payment for {} (fully paid)", format_usd(amount), file);
    } else {
        println!(
            "Recorded {} payment for {} ({} remaining)",
            format_usd(amount),
            file,
            format_usd(remaining)
        );
    }

    Ok(())
}

/// Remove a payment from a document
fn cmd_remove_payment(cfg_dir: &PathBuf, reference: &str, index: Option<usize>) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DocError::ConfigNotFound(cfg_dir.clone()));
    }

    let mut state = load_state(cfg_dir)?;
    let idx = resolve_document(&state, reference)?;
    let entry = &mut state.history[idx];

    if entry.payments.is_empty() {
        return Err(DocError::NoPayments(entry.file.clone()));
    }

    let remove_idx = match index {
        Some(i) => {
            if i == 0 || i > entry.payments.len() {
                return Err(DocError::InvalidPaymentIndex {
                    document: entry.file.clone(),
                    index: i,
                    count: entry.payments.len(),
                });
            }
            i - 1
        }
        None => entry.payments.len() - 1,
    };

    let removed = entry.payments.remove(remove_idx);
    let file = entry.file.clone();

    save_state(cfg_dir, &state)?;

    println!("Removed {} payment from {}", format_usd(removed.amount), file);

    Ok(())
}

/// Show payment history for a document
fn cmd_payments(cfg_dir: &PathBuf, reference: &str) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DocError::ConfigNotFound(cfg_dir.clone()));
    }

    let state = load_state(cfg_dir)?;
    let idx = resolve_document(&state, reference)?;
    let entry = &state.history[idx];

    println!("Payments for {}", entry.file);

    if entry.payments.is_empty() {
        println!("  No payments recorded.");
    } else {
        let rows: Vec<PaymentRow> = entry
            .payments
            .iter()
            .enumerate()
            .map(|(i, p)| PaymentRow {
                index: i + 1,
                date: p.date.to_string(),
                method: match &p.check_number {
                    Some(number) => format!("{} #{number}", p.method),
                    None => p.method.to_string(),
                },
                amount: format_usd(p.amount),
            })
            .collect();

        let table = Table::new(rows).with(Style::rounded()).to_string();
        println!("{table}");
    }

    println!(
        "Total paid: {} / {} (Status: {})",
        format_usd(entry.paid_amount()),
        format_usd(entry.total),
        entry.status()
    );

    Ok(())
}

/// Show config summary and outstanding balances
fn cmd_status(cfg_dir: &PathBuf) -> Result<()> {
    if !cfg_dir.exists() {
        return Err(DocError::ConfigNotFound(cfg_dir.clone()));
    }

    let config = load_config(cfg_dir)?;
    let customers = load_customers(cfg_dir)?;
    let state = load_state(cfg_dir)?;

    let outstanding: f64 = state.history.iter().map(|e| e.outstanding().max(0.0)).sum();

    println!("jobdocs Status");
    println!("{}", "-".repeat(50));
    println!("Config directory: {}", cfg_dir.display());
    println!("Company:          {}", config.company.name);
    println!("Customers:        {}", customers.len());
    println!("Documents:        {}", state.history.len());
    println!("Outstanding:      {}", format_usd(outstanding));

    if !state.history.is_empty() {
        println!();
        println!("Recent documents:");
        for entry in state.history.iter().rev().take(5) {
            println!(
                "  {} - {} - {} ({})",
                entry.file,
                entry.customer,
                format_usd(entry.total),
                entry.status()
            );
        }
    }

    Ok(())
}

fn open_path(pdf_path: &PathBuf) -> Result<()> {
    // Open with system default viewer
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(pdf_path)
            .spawn()
            .map_err(DocError::Io)?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(pdf_path)
            .spawn()
            .map_err(DocError::Io)?;
    }

    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", pdf_path.to_str().unwrap_or("")])
            .spawn()
            .map_err(DocError::Io)?;
    }
    Ok(())
}
