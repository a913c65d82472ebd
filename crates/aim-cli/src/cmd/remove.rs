use std::path::Path;

use anyhow::{Context, Result};

use super::{finish, parse_ids};
use crate::Session;

/// Delete installed AppImages and stop tracking them
pub fn remove(home: Option<&Path>, raw: &[String]) -> Result<()> {
    let mut session = Session::open(home)?;
    let (ids, invalid) = parse_ids(raw, session.output.as_ref());

    let (orchestrator, registry) = session.split();
    let report = orchestrator
        .remove_many(registry, &ids)
        .context("Failed to save registry")?;

    finish(&report, invalid, "removals")
}
