//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::vault::{SecretMetadata, VerifyReport};

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
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
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print a table of credential metadata (Name, Created, Updated).
pub fn print_secrets_table(secrets: &[SecretMetadata]) {
    if secrets.is_empty() {
        info("No credentials in this vault yet.");
        tip("Run `credvault set <NAME>` to add your first credential.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Created", "Updated"]);

    for s in secrets {
        table.add_row(vec![
            s.name.clone(),
            s.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            s.updated_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }

    println!("{table}");
}

/// Print the per-credential outcome of `verify`.
pub fn print_verify_table(report: &VerifyReport) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Name", "Status"]);

    let mut rows: Vec<(&str, bool)> = report
        .ok
        .iter()
        .map(|n| (n.as_str(), true))
        .chain(report.failed.iter().map(|n| (n.as_str(), false)))
        .collect();
    rows.sort_by(|a, b| a.0.cmp(b.0));

    for (name, ok) in rows {
        let status = if ok {
            style("ok").green().to_string()
        } else {
            style("integrity failure").red().to_string()
        };
        table.add_row(vec![name.to_string(), status]);
    }

    println!("{table}");
}
