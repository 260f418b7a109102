use super::{group_thousands, status_glyph};
use crate::models::{FleetReport, IndexStatus, ProbeOutcome};
use std::fmt::Write;

pub const CONSOLE_TITLE: &str = "RediSearch Index Statistics:";

/// `field: value` lines describing one index status.
pub fn status_fields(status: &IndexStatus) -> Vec<(&'static str, String)> {
    let mut fields = vec![("status", status.describe())];
    if let IndexStatus::Active(stats) = status {
        fields.push(("num_docs", group_thousands(stats.num_docs)));
        fields.push((
            "total_indexing_time",
            format!("{:.2}s", stats.total_indexing_time_secs),
        ));
        fields.push(("memory_used", format!("{}MB", stats.memory_used_mb)));
        fields.push(("indexing_failures", stats.indexing_failures.to_string()));
    }
    fields
}

/// Plain-text report, one block per instance in fleet order.
pub fn render_console(report: &FleetReport) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{CONSOLE_TITLE}");

    for result in &report.results {
        let _ = writeln!(out);
        let _ = writeln!(out, "{} (took {:.2}s):", result.label, result.elapsed_secs);
        match &result.outcome {
            ProbeOutcome::Error { message, .. } => {
                let _ = writeln!(out, "Error: {message}");
            }
            ProbeOutcome::Success { indexes } => {
                for index in indexes {
                    let _ = writeln!(out);
                    let _ = writeln!(
                        out,
                        "{} {}:",
                        status_glyph(index.status.is_active()),
                        index.name
                    );
                    for (field, value) in status_fields(&index.status) {
                        let _ = writeln!(out, "  - {field}: {value}");
                    }
                }
            }
        }
    }

    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Total execution time: {:.2} seconds",
        report.total_elapsed_secs
    );
    out
}
