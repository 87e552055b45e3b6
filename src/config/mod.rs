mod company;
mod customer;
mod state;

pub use company::{Company, Config, DocumentSettings, PdfSettings};
pub use customer::Customer;
pub use state::{DocumentEntry, State};

use crate::error::{DocError, Result};
use directories::ProjectDirs;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.jobdocs or XDG config)
pub fn config_dir() -> Result<PathBuf> {
    if let Some(proj_dirs) = ProjectDirs::from("", "", "jobdocs") {
        return Ok(proj_dirs.config_dir().to_path_buf());
    }

    let home = dirs_home().ok_or_else(|| {
        DocError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "Could not determine home directory",
        ))
    })?;

    Ok(home.join(".jobdocs"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Expand ~ in paths
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs_home() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Resolve the configured output directory, relative paths landing inside
/// the config directory.
pub fn resolve_output_dir(output_dir: &str, config_dir: &Path) -> PathBuf {
    let expanded = expand_path(output_dir);
    if expanded.is_absolute() {
        expanded
    } else {
        config_dir.join(expanded)
    }
}

/// Load the main config.toml
pub fn load_config(config_dir: &Path) -> Result<Config> {
    let path = config_dir.join("config.toml");
    if !path.exists() {
        return Err(DocError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DocError::ConfigParse { path, source: e })
}

/// Load customers.toml as a HashMap
pub fn load_customers(config_dir: &Path) -> Result<HashMap<String, Customer>> {
    let path = config_dir.join("customers.toml");
    if !path.exists() {
        return Err(DocError::ConfigFileNotFound(path));
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DocError::ConfigParse { path, source: e })
}

/// Load state.toml (creates default if missing)
pub fn load_state(config_dir: &Path) -> Result<State> {
    let path = config_dir.join("state.toml");
    if !path.exists() {
        return Ok(State::default());
    }
    let content = fs::read_to_string(&path)?;
    toml::from_str(&content).map_err(|e| DocError::ConfigParse { path, source: e })
}

/// Save state.toml
pub fn save_state(config_dir: &Path, state: &State) -> Result<()> {
    let path = config_dir.join("state.toml");
    let content = toml::to_string_pretty(state).map_err(|e| {
        DocError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            e.to_string(),
        ))
    })?;
    fs::write(path, content)?;
    Ok(())
}

/// Template content for config.toml
pub const CONFIG_TEMPLATE: &str = r#"[company]
name = "Your Company Name"
address = "123 Business Street, San Francisco, CA 94102"
email = "office@yourcompany.com"
# phone = "+1-555-123-4567"          # optional
# logo_url = "https://yourcompany.com/logo.png"  # optional, shown in headers
# license_number = "C-12345"         # optional
# id_number = "12-3456789"           # optional

[document]
payment_methods = "Zelle, Cash App, Check, Credit Card (3% fee), or Cash"
warranty = "2 years on workmanship"

[pdf]
output_dir = "~/.jobdocs/output"
"#;

/// Template content for customers.toml
pub const CUSTOMERS_TEMPLATE: &str = r#"# Define your customers here. The table name (e.g., [acme]) is used
# as the customer identifier in drafts.

[example-customer]
name = "Example Customer Inc."
contact = "Jane Smith"              # optional
email = "jane@example.com"          # optional
phone = "+1-555-987-6543"           # optional
address = "456 Client Avenue, Los Angeles, CA 90001"
"#;

/// Template content for a starter draft, written to drafts/invoice.toml
pub const DRAFT_TEMPLATE: &str = r#"# A draft is a snapshot of one document. Run:
#   jobdocs preview drafts/invoice.toml
#   jobdocs generate drafts/invoice.toml

kind = "invoice"                    # invoice | contract | job-report
customer = "example-customer"       # id from customers.toml
include_tax = true

[[line_items]]
description = "Labor and Services"
quantity = 1
unit_price = 500.00

[[line_items]]
description = "Materials"
quantity = 1
unit_price = 120.00

# For contracts, set costs and a deposit instead of line items:
# kind = "contract"
# material_cost = 800.00
# labor_price = 2400.00
# deposit_percent = 50
# scope_of_work = "..."
"#;
