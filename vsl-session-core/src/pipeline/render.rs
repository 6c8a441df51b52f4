use crate::session::{Field, FinishedSession};
use owo_colors::OwoColorize;

/// Human-readable block for one finished session: the field mapping, then
/// the raw history one line per entry.
pub fn render_pretty(session: &FinishedSession, color: bool) -> String {
    let mut out = String::new();

    let title = format!("session {}", session.id);
    if color {
        out.push_str(&format!("{}\n", title.bold()));
    } else {
        out.push_str(&format!("{title}\n"));
    }

    for field in Field::ALL {
        if let Some(value) = session.fields.get(field) {
            out.push_str(&format!("  {}: {}\n", field.name(), value));
        }
    }

    // BTreeMap: stable ordering by header name
    if let Some(headers) = &session.fields.headers {
        out.push_str("  headers:\n");
        for (name, value) in headers {
            out.push_str(&format!("    {name}: {value}\n"));
        }
    }

    for entry in &session.raw_history {
        match entry.split_once(' ') {
            Some((tag, payload)) if color => {
                out.push_str(&format!("{} {}\n", tag.cyan(), payload));
            }
            _ => {
                out.push_str(entry);
                out.push('\n');
            }
        }
    }

    out
}

pub fn render_summary(summary: &super::RunSummary) -> String {
    let mut out = format!(
        "lines: {} | finished: {} | open: {}",
        summary.lines, summary.finished, summary.open
    );

    if summary.skipped > 0 {
        out.push_str(&format!(" | skipped: {}", summary.skipped));
    }
    if summary.backend_skipped > 0 {
        out.push_str(&format!(" | backend: {}", summary.backend_skipped));
    }
    if summary.interrupted {
        out.push_str(" | interrupted");
    }

    out
}
