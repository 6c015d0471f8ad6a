//! Human-readable summary renderer for change logs.

use super::{ChangeKind, ChangeLog};

/// Render a Markdown summary of a [`ChangeLog`].
///
/// Intended for review output before or after a sync. Informational only;
/// the structured log stays authoritative.
pub fn render_summary(log: &ChangeLog) -> String {
    let mut out = String::new();

    out.push_str("## Configuration Changes\n\n");
    out.push_str(&format!(
        "**Run**: `{}`  \n**Started**: {}\n\n",
        log.run_id(),
        log.started_at().format("%Y-%m-%dT%H:%M:%SZ")
    ));

    if log.is_empty() {
        out.push_str("_No changes._\n");
        return out;
    }

    out.push_str(&format!(
        "| Created | Updated | Deleted |\n|---|---|---|\n| {} | {} | {} |\n\n",
        log.count(ChangeKind::Created),
        log.count(ChangeKind::Updated),
        log.count(ChangeKind::Deleted),
    ));

    for (kind, heading) in [
        (ChangeKind::Deleted, "Deleted"),
        (ChangeKind::Updated, "Updated"),
        (ChangeKind::Created, "Created"),
    ] {
        let records: Vec<_> = log.records().iter().filter(|r| r.kind == kind).collect();
        if records.is_empty() {
            continue;
        }
        out.push_str(&format!("### {}\n\n", heading));
        for record in records {
            out.push_str(&format!("- `{}` ({})\n", record.path, record.entity_type));
            for m in &record.mutations {
                if m.values().is_empty() {
                    out.push_str(&format!("  - {} `{}`\n", m.verb(), m.attribute()));
                } else {
                    out.push_str(&format!(
                        "  - {} `{}`: {}\n",
                        m.verb(),
                        m.attribute(),
                        m.values().join(", ")
                    ));
                }
            }
        }
        out.push('\n');
    }

    out
}
