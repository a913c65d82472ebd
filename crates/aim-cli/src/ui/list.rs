//! Status rows for `list`, `check`, `update` and `search`.

use std::path::Path;

use aim_core::Candidate;
use aim_schema::{AppEntry, DerivedState};
use crossterm::style::{Color, Stylize};

use super::theme::Theme;

pub fn installed_label(state: DerivedState) -> &'static str {
    if state.installed { "Installed" } else { "Pending" }
}

pub fn update_label(state: DerivedState) -> &'static str {
    if state.needs_update {
        "New version available"
    } else {
        "Up to date"
    }
}

/// Red when not installed, yellow when an update is waiting, green otherwise.
pub fn row_color(state: DerivedState, theme: &Theme) -> Color {
    if !state.installed {
        theme.colors.error
    } else if state.needs_update {
        theme.colors.warning
    } else {
        theme.colors.success
    }
}

/// Uncolored row: id, install state, update state, current tag, latest tag.
pub fn format_status_row(entry: &AppEntry, state: DerivedState, theme: &Theme) -> String {
    let l = &theme.layout;
    format!(
        "{:<idw$} {:<iw$} {:<uw$} {:<tw$} {}",
        entry.id().as_str(),
        installed_label(state),
        update_label(state),
        entry.current().tag_or_dash(),
        entry.latest().tag_or_dash(),
        idw = l.id_width,
        iw = l.installed_width,
        uw = l.update_width,
        tw = l.tag_width,
    )
}

pub fn print_status_row(entry: &AppEntry) {
    let theme = Theme::default();
    let state = entry.state();
    let row = format_status_row(entry, state, &theme);
    println!("  {}", row.trim_end().with(row_color(state, &theme)));
}

pub fn print_list_header(install_dir: &Path) {
    let theme = Theme::default();
    let l = &theme.layout;
    println!();
    println!(
        "  {}",
        format!("Tracked AppImages in {}", install_dir.display()).with(theme.colors.secondary)
    );
    println!();
    let header = format!(
        "{:<idw$} {:<iw$} {:<uw$} {:<tw$} {}",
        "ID",
        "STATE",
        "UPDATE",
        "CURRENT",
        "LATEST",
        idw = l.id_width,
        iw = l.installed_width,
        uw = l.update_width,
        tw = l.tag_width,
    );
    println!("  {}", header.with(theme.colors.secondary));
}

pub fn print_list_footer(count: usize) {
    println!();
    let msg = format!("{count} AppImage{} tracked", if count == 1 { "" } else { "s" });
    println!("  {}", msg.dark_grey());
}

/// Numbered search result. Tracked ids show their tracked state.
pub fn print_candidate_row(index: usize, candidate: &Candidate, tracked: Option<&AppEntry>) {
    let theme = Theme::default();
    let number = format!("{index:>3}.");
    match tracked {
        Some(entry) => {
            let state = entry.state();
            let row = format_status_row(entry, state, &theme);
            println!(
                "{} {}",
                number.with(theme.colors.secondary),
                row.trim_end().with(row_color(state, &theme))
            );
        }
        None => {
            let l = &theme.layout;
            let row = format!(
                "{:<idw$} {:<iw$} {:<uw$} {:<tw$} {}",
                candidate.id.as_str(),
                "Not installed",
                "Available",
                "-",
                candidate.tag,
                idw = l.id_width,
                iw = l.installed_width,
                uw = l.update_width,
                tw = l.tag_width,
            );
            println!(
                "{} {}",
                number.with(theme.colors.secondary),
                row.with(theme.colors.id)
            );
        }
    }
}
