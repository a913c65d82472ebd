use std::path::Path;

use aim_core::Reporter;
use anyhow::{Context, Result};

use super::finish;
use crate::Session;

/// Check and update every tracked AppImage
pub async fn auto(home: Option<&Path>) -> Result<()> {
    let mut session = Session::open(home)?;
    if session.registry.is_empty() {
        session.output.info("Nothing tracked yet.");
        return Ok(());
    }

    let (orchestrator, registry) = session.split();
    let report = orchestrator
        .auto(registry)
        .await
        .context("Failed to save registry")?;

    finish(&report, 0, "updates")
}
