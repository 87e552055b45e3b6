use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub company: Company,
    #[serde(default)]
    pub document: DocumentSettings,
    pub pdf: PdfSettings,
}

/// Company identity printed in document headers.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Company {
    pub name: String,
    pub address: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub logo_url: Option<String>,
    #[serde(default)]
    pub license_number: Option<String>,
    #[serde(default)]
    pub id_number: Option<String>,
}

/// Boilerplate defaults merged into drafts that leave the field blank.
#[derive(Debug, Deserialize, Serialize)]
pub struct DocumentSettings {
    #[serde(default = "default_payment_methods")]
    pub payment_methods: String,
    #[serde(default = "default_warranty")]
    pub warranty: String,
}

impl Default for DocumentSettings {
    fn default() -> Self {
        Self {
            payment_methods: default_payment_methods(),
            warranty: default_warranty(),
        }
    }
}

fn default_payment_methods() -> String {
    "Zelle, Cash App, Check, Credit Card (3% fee), or Cash".to_string()
}

fn default_warranty() -> String {
    "2 years on workmanship".to_string()
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PdfSettings {
    pub output_dir: String,
}
