//! Output formatting module
//!
//! This module handles rendering the replayed name history.

use crate::Result;
use crate::state_machine::{NameReport, NameStatus};
use serde_json::json;

/// Output the replay as JSON
pub fn output_json(
    w: &mut impl std::io::Write,
    processed_up_to: Option<u64>,
    reports: &[NameReport],
) -> Result<()> {
    let output = json!({
        "generated_at": chrono::Utc::now().to_rfc3339(),
        "processed_up_to": processed_up_to,
        "total_names": reports.len(),
        "names": reports,
    });

    serde_json::to_writer_pretty(&mut *w, &output)?;
    writeln!(w)?; // Add trailing newline
    Ok(())
}

/// Output the replay as plain text
pub fn output_text(
    w: &mut impl std::io::Write,
    processed_up_to: Option<u64>,
    reports: &[NameReport],
) -> Result<()> {
    match processed_up_to {
        Some(height) => writeln!(w, "Processed up to block: {}", height)?,
        None => writeln!(w, "No blocks processed")?,
    }
    writeln!(w, "Indexed history:")?;

    for report in reports {
        writeln!(w, "Space: {}", report.name)?;
        match &report.status {
            NameStatus::Active { events } => {
                for entry in events {
                    writeln!(w, "  {}", entry.event)?;
                }
            }
            NameStatus::Terminal { notice, reason, .. } => match reason {
                Some(reason) => writeln!(w, "  {} ({})", notice, reason)?,
                None => writeln!(w, "  {}", notice)?,
            },
        }
    }

    Ok(())
}
