//! Colored terminal output helpers.
//!
//! All user-facing status messages go through these functions so we get
//! consistent styling across every command.  They write to stderr,
//! leaving stdout for envelope bytes and opened values.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::envelope::expiration::{format_timestamp, render_timestamp};
use crate::envelope::EnvelopeSummary;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    eprintln!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    eprintln!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    eprintln!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print the header fields of an envelope as a table on stdout.
pub fn print_summary_table(summary: &EnvelopeSummary) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Field", "Value"]);

    table.add_row(vec![
        "Digest length".to_string(),
        format!("{} bytes", summary.digest_len),
    ]);
    table.add_row(vec![
        "Expires".to_string(),
        match summary.expires_at {
            Some(ts) => format!("{} ({})", format_timestamp(ts), render_timestamp(ts)),
            None => "never".to_string(),
        },
    ]);
    table.add_row(vec![
        "Payload length".to_string(),
        format!("{} bytes", summary.payload_len),
    ]);

    println!("{table}");
}
