//! Output formatting for CLI
//!
//! Provides consistent output formatting across all commands:
//! - Human-readable default output
//! - JSON output (--json flag)
//! - Quiet mode for scripting (--quiet flag)

use serde::Serialize;

use readlist_core::{ImportSummary, Record};

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

    /// Check if output is in quiet mode
    pub fn is_quiet(&self) -> bool {
        matches!(self.format, OutputFormat::Quiet)
    }

    /// Print a single record
    pub fn print_record(&self, record: &Record) {
        match self.format {
            OutputFormat::Human => {
                println!("ID:       {}", record.id);
                println!("Title:    {}", record.title);
                println!("URL:      {}", record.url);
                println!("Status:   {}", record.status);
                if !record.comment.is_empty() {
                    println!("Comment:  {}", record.comment);
                }
                println!("Added:    {}", added_display(record));
                if !record.extra.is_empty() {
                    let keys: Vec<&str> = record.extra.keys().map(String::as_str).collect();
                    println!("Other:    {}", keys.join(", "));
                }
            }
            OutputFormat::Json => print_json(record),
            OutputFormat::Quiet => {
                println!("{}", record.id);
            }
        }
    }

    /// Print a list of records
    pub fn print_records(&self, records: &[Record]) {
        match self.format {
            OutputFormat::Human => {
                if records.is_empty() {
                    println!("No saved pages found.");
                    return;
                }
                for record in records {
                    println!(
                        "{} | {:<7} | {} | {}",
                        short_id(&record.id),
                        record.status,
                        truncate(&record.title, 35),
                        truncate(&record.url, 45)
                    );
                }
                println!("\n{} page(s)", records.len());
            }
            OutputFormat::Json => print_json(&records),
            OutputFormat::Quiet => {
                for record in records {
                    println!("{}", record.id);
                }
            }
        }
    }

    /// Print the result of an import
    ///
    /// Skipped rows go to stderr in human mode so the summary stays the
    /// last line of stdout.
    pub fn print_import_summary(&self, summary: &ImportSummary) {
        match self.format {
            OutputFormat::Human => {
                for skip in &summary.skipped {
                    eprintln!("Skipped {}", skip);
                }
                println!("✓ {}", summary.message());
            }
            OutputFormat::Json => {
                let skipped: Vec<_> = summary
                    .skipped
                    .iter()
                    .map(|skip| serde_json::json!({"row": skip.row, "reason": skip.reason.to_string()}))
                    .collect();
                println!(
                    "{}",
                    serde_json::json!({
                        "status": "success",
                        "mode": summary.mode,
                        "added": summary.added,
                        "updated": summary.updated,
                        "skipped": skipped,
                        "message": summary.message()
                    })
                );
            }
            OutputFormat::Quiet => {}
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

    /// Check if we should prompt for confirmation
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

fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to format output as JSON: {}", e),
    }
}

/// First 8 characters of an id
pub fn short_id(id: &str) -> &str {
    match id.char_indices().nth(8) {
        Some((end, _)) => &id[..end],
        None => id,
    }
}

/// The saved time as `YYYY-MM-DD HH:MM` UTC, or the raw value if it doesn't parse
fn added_display(record: &Record) -> String {
    record
        .added_at_time()
        .map(|time| time.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| record.added_at.clone())
}

/// Truncate a string to max characters, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
