//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use phonebook_core::{fields, Document};

/// Fields shown first, in this order, when printing a record
const DISPLAY_ORDER: [&str; 6] = [
    fields::LAST_NAME,
    fields::FIRST_NAME,
    fields::PATRONYMIC,
    fields::COMPANY_NAME,
    fields::OFFICE_NUMBER,
    fields::PERSONAL_NUMBER,
];

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    Human,
    /// JSON output
    Json,
    /// Quiet mode - minimal output
    Quiet,
}

impl OutputFormat {
    /// Create format from CLI flags
    pub fn from_flags(json: bool, quiet: bool) -> Self {
        if quiet {
            OutputFormat::Quiet
        } else if json {
            OutputFormat::Json
        } else {
            OutputFormat::Human
        }
    }
}

/// Output helper for consistent formatting
pub struct Output {
    /// The output format
    pub format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Check if output is in JSON mode
    pub fn is_json(&self) -> bool {
        matches!(self.format, OutputFormat::Json)
    }

    /// Print a list of records
    pub fn print_documents(&self, docs: &[Document]) {
        match self.format {
            OutputFormat::Human => {
                for doc in docs {
                    println!("{}", format_document(doc));
                }
                println!("\n{} entr{}", docs.len(), if docs.len() == 1 { "y" } else { "ies" });
            }
            OutputFormat::Json => {
                println!("{}", to_json(docs));
            }
            OutputFormat::Quiet => {
                for doc in docs {
                    println!("{}", format_document(doc));
                }
            }
        }
    }

    /// Print one page of a listing
    pub fn print_page(&self, number: usize, docs: &[Document]) {
        match self.format {
            OutputFormat::Human => {
                println!("── Page {} ──", number);
                for doc in docs {
                    println!("{}", format_document(doc));
                }
            }
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"page": number, "documents": docs})
                );
            }
            OutputFormat::Quiet => {
                for doc in docs {
                    println!("{}", format_document(doc));
                }
            }
        }
    }

    /// Print a success message
    pub fn success(&self, message: &str) {
        match self.format {
            OutputFormat::Human => println!("✓ {}", message),
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::json!({"status": "success", "message": message})
                );
            }
            OutputFormat::Quiet => {}
        }
    }

    /// Check if we should prompt the user
    pub fn should_prompt(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Print an informational message
    pub fn message(&self, msg: &str) {
        match self.format {
            OutputFormat::Human => println!("{}", msg),
            OutputFormat::Json => {
                println!("{}", serde_json::json!({"message": msg}));
            }
            OutputFormat::Quiet => {}
        }
    }
}

/// One-line rendering of a record
///
/// Known fields come first in a fixed order, anything else follows by name.
pub fn format_document(doc: &Document) -> String {
    let known = DISPLAY_ORDER
        .iter()
        .filter_map(|&field| doc.get(field).map(|value| (field, value)));
    let extra = doc
        .fields()
        .filter(|(field, _)| !DISPLAY_ORDER.contains(field));

    known
        .chain(extra)
        .map(|(field, value)| format!("{}: {}", field, value))
        .collect::<Vec<_>>()
        .join(" | ")
}

fn to_json<T: serde::Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("{{\"error\": \"{}\"}}", e))
}
