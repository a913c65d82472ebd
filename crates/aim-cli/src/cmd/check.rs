use std::path::Path;

use aim_core::{BatchReport, Reporter};
use anyhow::{Context, Result};

use super::{finish, parse_ids};
use crate::Session;

/// Refresh the latest known release of tracked AppImages
pub async fn check(home: Option<&Path>, raw: &[String]) -> Result<()> {
    let mut session = Session::open(home)?;
    let (ids, invalid) = parse_ids(raw, session.output.as_ref());
    if ids.is_empty() && invalid > 0 {
        return finish(&BatchReport::<()>::default(), invalid, "checks");
    }
    if raw.is_empty() && session.registry.is_empty() {
        session.output.info("Nothing tracked yet.");
        return Ok(());
    }

    let output = session.output.clone();
    let (orchestrator, registry) = session.split();
    let report = orchestrator
        .check_many(registry, &ids)
        .await
        .context("Failed to save registry")?;

    let pending = report
        .results
        .iter()
        .filter(|(_, r)| r.as_ref().is_ok_and(|state| state.needs_update))
        .count();
    if pending > 0 {
        output.warning(&format!(
            "{pending} update{} available. Run 'aim update' to install.",
            if pending == 1 { "" } else { "s" }
        ));
    } else {
        output.success("Everything is up to date");
    }

    finish(&report, invalid, "checks")
}
