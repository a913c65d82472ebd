//! Download progress rendering.

use super::theme::format_size;

/// `[######    ]  60%` for a known total, or just the byte count.
pub fn progress_bar(current: u64, total: Option<u64>, width: usize) -> String {
    match total.filter(|&t| t > 0) {
        Some(total) => {
            let pct = (current.min(total) * 100 / total) as usize;
            let filled = pct * width / 100;
            format!(
                "[{}{}] {pct:>3}%",
                "#".repeat(filled),
                " ".repeat(width - filled)
            )
        }
        None => format_size(current),
    }
}
