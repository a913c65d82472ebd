//! Command implementations

pub mod auto;
pub mod check;
pub mod install;
pub mod list;
pub mod remove;
pub mod search;
pub mod update;

use aim_core::{BatchReport, Reporter};
use aim_schema::ArtifactId;
use anyhow::{Result, bail};

/// Parse raw ids, reporting each invalid one. Returns the valid ids and the
/// number rejected.
pub fn parse_ids(raw: &[String], reporter: &dyn Reporter) -> (Vec<ArtifactId>, usize) {
    let mut ids = Vec::with_capacity(raw.len());
    let mut invalid = 0;
    for r in raw {
        match ArtifactId::parse(r) {
            Ok(id) if !ids.contains(&id) => ids.push(id),
            Ok(_) => {}
            Err(e) => {
                reporter.error(&e.to_string());
                invalid += 1;
            }
        }
    }
    (ids, invalid)
}

/// Turn per-id failures into a non-zero exit.
pub fn finish<T>(report: &BatchReport<T>, invalid: usize, action: &str) -> Result<()> {
    let failed = report.failed() + invalid;
    if failed > 0 {
        let total = report.results.len() + invalid;
        bail!("{failed} of {total} {action} failed");
    }
    Ok(())
}
