use std::path::Path;

use aim_core::{BatchReport, Reporter, UpdateOutcome};
use anyhow::{Context, Result};

use super::{finish, parse_ids};
use crate::Session;
use crate::ui::theme::format_size;

/// Download new versions recorded by the last check
pub async fn update(home: Option<&Path>, raw: &[String]) -> Result<()> {
    let mut session = Session::open(home)?;
    let (ids, invalid) = parse_ids(raw, session.output.as_ref());
    if ids.is_empty() && invalid > 0 {
        return finish(&BatchReport::<()>::default(), invalid, "updates");
    }
    if raw.is_empty() && session.registry.is_empty() {
        session.output.info("Nothing tracked yet.");
        return Ok(());
    }

    let output = session.output.clone();
    let (orchestrator, registry) = session.split();
    let report = orchestrator
        .update_many(registry, &ids)
        .await
        .context("Failed to save registry")?;

    let downloaded: u64 = report
        .results
        .iter()
        .filter_map(|(_, r)| match r {
            Ok(UpdateOutcome::Updated { bytes, .. }) => Some(*bytes),
            _ => None,
        })
        .sum();
    let updated = report
        .results
        .iter()
        .filter(|(_, r)| matches!(r, Ok(UpdateOutcome::Updated { .. })))
        .count();
    if updated > 0 {
        output.success(&format!(
            "{updated} updated ({} downloaded)",
            format_size(downloaded)
        ));
    }

    finish(&report, invalid, "updates")
}
