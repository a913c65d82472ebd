//! Search command

use std::io::{BufRead, Write};
use std::path::Path;
use std::time::Instant;

use aim_core::{Candidate, ProbeOutcome, Reporter};
use anyhow::{Context, Result};

use super::finish;
use crate::Session;
use crate::ui::list::print_candidate_row;

/// Discover repositories publishing AppImages and optionally install one.
pub async fn search(home: Option<&Path>, keywords: &[String], no_prompt: bool) -> Result<()> {
    let start = Instant::now();
    let query = keywords.join(" ");
    let mut session = Session::open(home)?;
    let output = session.output.clone();

    output.section(&format!("Searching '{query}'"));
    let aggregator = session.config.search_aggregator(&session.client);
    let report = aggregator
        .search(&query)
        .await
        .context("Repository search failed")?;

    let timed_out = report.count(|o| *o == ProbeOutcome::TimedOut);
    let errored = report.count(|o| matches!(o, ProbeOutcome::Failed(_)));
    if timed_out + errored > 0 {
        output.warning(&format!(
            "{timed_out} candidates timed out, {errored} could not be checked"
        ));
    }

    let candidates = report.candidates();
    if candidates.is_empty() {
        output.info(&format!("No AppImages found matching '{query}'"));
        return Ok(());
    }

    println!();
    for (i, candidate) in candidates.iter().enumerate() {
        print_candidate_row(i + 1, candidate, session.registry.get(candidate.id.as_str()));
    }
    println!();
    println!(
        "  {} found from {} candidates, elapsed {:.2}s",
        candidates.len(),
        report.probes.len(),
        start.elapsed().as_secs_f64()
    );

    if no_prompt {
        return Ok(());
    }

    print!("  Install which? (id or number, empty to skip): ");
    std::io::stdout().flush().ok();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read selection")?;

    let Some(choice) = pick_candidate(&line, &candidates) else {
        output.info("Nothing selected.");
        return Ok(());
    };
    if session.registry.contains(choice.id.as_str()) {
        output.info(&format!("{} is already tracked.", choice.id));
        return Ok(());
    }

    let ids = [choice.id.clone()];
    let (orchestrator, registry) = session.split();
    let installed = orchestrator
        .install_many(registry, &ids)
        .await
        .context("Failed to save registry")?;
    finish(&installed, 0, "installs")
}

/// Match user input against the listed candidates: a 1-based row number or
/// an exact id (case-insensitive).
pub fn pick_candidate<'a>(input: &str, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(n) = input.parse::<usize>() {
        return n.checked_sub(1).and_then(|i| candidates.get(i));
    }
    candidates
        .iter()
        .find(|c| c.id.as_str().eq_ignore_ascii_case(input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use aim_schema::ArtifactId;

    fn candidates() -> Vec<Candidate> {
        ["acme/notes", "zeta/Notes-App"]
            .iter()
            .map(|id| Candidate {
                id: ArtifactId::parse(id).unwrap(),
                tag: "v1".into(),
            })
            .collect()
    }

    #[test]
    fn test_pick_by_number() {
        let c = candidates();
        assert_eq!(pick_candidate("1\n", &c).unwrap().id.as_str(), "acme/notes");
        assert_eq!(pick_candidate(" 2 ", &c).unwrap().id.as_str(), "zeta/Notes-App");
        assert!(pick_candidate("0", &c).is_none());
        assert!(pick_candidate("3", &c).is_none());
    }

    #[test]
    fn test_pick_by_id() {
        let c = candidates();
        assert_eq!(
            pick_candidate("zeta/notes-app", &c).unwrap().id.as_str(),
            "zeta/Notes-App"
        );
        assert!(pick_candidate("other/notes", &c).is_none());
    }

    #[test]
    fn test_pick_nothing() {
        let c = candidates();
        assert!(pick_candidate("", &c).is_none());
        assert!(pick_candidate("\n", &c).is_none());
        assert!(pick_candidate("1", &[]).is_none());
    }
}
