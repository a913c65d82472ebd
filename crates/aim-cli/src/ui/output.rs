//! Terminal reporter.
//!
//! Writes to stdout. While a check or download is in flight its line is
//! redrawn in place; any other message first settles that line. Live redraws
//! are skipped when stdout is not a terminal.

use std::io::{IsTerminal, Write};
use std::sync::Mutex;

use aim_core::Reporter;
use aim_schema::{AppEntry, ArtifactId};
use crossterm::cursor::MoveToColumn;
use crossterm::queue;
use crossterm::style::{Print, Stylize};
use crossterm::terminal::{Clear, ClearType};

use super::list::print_status_row;
use super::progress::progress_bar;
use super::theme::Theme;

#[derive(Debug)]
pub struct Output {
    theme: Theme,
    interactive: bool,
    /// A live line is currently drawn without a trailing newline.
    live: Mutex<bool>,
}

impl Default for Output {
    fn default() -> Self {
        Self::new()
    }
}

impl Output {
    pub fn new() -> Self {
        Self {
            theme: Theme::default(),
            interactive: std::io::stdout().is_terminal(),
            live: Mutex::new(false),
        }
    }

    fn redraw(&self, line: &str) {
        if !self.interactive {
            return;
        }
        let Ok(mut live) = self.live.lock() else {
            return;
        };
        let mut stdout = std::io::stdout().lock();
        let _ = queue!(
            stdout,
            MoveToColumn(0),
            Clear(ClearType::CurrentLine),
            Print(line)
        );
        let _ = stdout.flush();
        *live = true;
    }

    fn line(&self, line: &str) {
        self.emit(Some(line));
    }

    /// Clear a pending live line.
    fn settle(&self) {
        self.emit(None);
    }

    fn emit(&self, line: Option<&str>) {
        let Ok(mut live) = self.live.lock() else {
            return;
        };
        let mut stdout = std::io::stdout().lock();
        if *live {
            let _ = queue!(stdout, MoveToColumn(0), Clear(ClearType::CurrentLine));
            *live = false;
        }
        if let Some(line) = line {
            let _ = writeln!(stdout, "{line}");
        }
        let _ = stdout.flush();
    }
}

impl Reporter for Output {
    fn section(&self, title: &str) {
        self.line("");
        self.line(&format!("{}", title.with(self.theme.colors.secondary)));
    }

    fn checking(&self, id: &ArtifactId) {
        self.redraw(&format!(
            "  {} {} {}",
            self.theme.icons.active.with(self.theme.colors.active),
            id.as_str().with(self.theme.colors.id),
            "checking".with(self.theme.colors.secondary)
        ));
    }

    fn downloading(&self, id: &ArtifactId, tag: Option<&str>, current: u64, total: Option<u64>) {
        self.redraw(&format!(
            "  {} {} {} {}",
            self.theme.icons.active.with(self.theme.colors.active),
            id.as_str().with(self.theme.colors.id),
            tag.unwrap_or("-").with(self.theme.colors.tag),
            progress_bar(current, total, self.theme.layout.bar_width)
        ));
    }

    fn done(&self, id: &ArtifactId, detail: &str) {
        self.line(&format!(
            "  {} {} {}",
            self.theme.icons.success.with(self.theme.colors.success),
            id.as_str().with(self.theme.colors.id),
            detail.with(self.theme.colors.secondary)
        ));
    }

    fn failed(&self, id: &ArtifactId, reason: &str) {
        self.line(&format!(
            "  {} {} {}",
            self.theme.icons.error.with(self.theme.colors.error),
            id.as_str().with(self.theme.colors.id),
            reason.with(self.theme.colors.error)
        ));
    }

    fn status(&self, entry: &AppEntry) {
        self.settle();
        print_status_row(entry);
    }

    fn info(&self, msg: &str) {
        self.line(&format!(
            "  {} {msg}",
            self.theme.icons.info.with(self.theme.colors.active)
        ));
    }

    fn success(&self, msg: &str) {
        self.line(&format!(
            "  {} {msg}",
            self.theme.icons.success.with(self.theme.colors.success)
        ));
    }

    fn warning(&self, msg: &str) {
        self.line(&format!(
            "  {} {msg}",
            self.theme.icons.warning.with(self.theme.colors.warning)
        ));
    }

    fn error(&self, msg: &str) {
        self.line(&format!(
            "  {} {msg}",
            self.theme.icons.error.with(self.theme.colors.error)
        ));
    }
}
