use std::path::Path;

use anyhow::{Context, Result};

use super::{finish, parse_ids};
use crate::Session;

/// Track and install AppImages
pub async fn install(home: Option<&Path>, raw: &[String]) -> Result<()> {
    let mut session = Session::open(home)?;
    let (ids, invalid) = parse_ids(raw, session.output.as_ref());

    let (orchestrator, registry) = session.split();
    let report = orchestrator
        .install_many(registry, &ids)
        .await
        .context("Failed to save registry")?;

    finish(&report, invalid, "installs")
}
