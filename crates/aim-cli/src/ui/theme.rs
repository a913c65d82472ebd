//! UI Theme - colors, icons and column widths used by every command.

use crossterm::style::Color;

/// Default theme for aim output
#[derive(Debug, Clone, Default)]
pub struct Theme {
    pub colors: ColorScheme,
    pub icons: Icons,
    pub layout: Layout,
}

#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Artifact ids
    pub id: Color,
    /// Release tags
    pub tag: Color,
    /// Secondary info and section titles
    pub secondary: Color,
    /// Installed and up to date
    pub success: Color,
    /// New version available
    pub warning: Color,
    /// Not installed, failures
    pub error: Color,
    /// In-flight rows
    pub active: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            id: Color::Cyan,
            tag: Color::White,
            secondary: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            active: Color::Blue,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Icons {
    pub active: &'static str,
    pub success: &'static str,
    pub error: &'static str,
    pub warning: &'static str,
    pub info: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            active: "●",
            success: "✓",
            error: "✗",
            warning: "⚠",
            info: "ℹ",
        }
    }
}

/// Column widths for status rows
#[derive(Debug, Clone)]
pub struct Layout {
    pub id_width: usize,
    pub installed_width: usize,
    pub update_width: usize,
    pub tag_width: usize,
    /// Cells in the download progress bar
    pub bar_width: usize,
}

impl Default for Layout {
    fn default() -> Self {
        Self {
            id_width: 32,
            installed_width: 13,
            update_width: 21,
            tag_width: 14,
            bar_width: 10,
        }
    }
}

/// Format bytes for human-readable display
pub fn format_size(bytes: u64) -> String {
    let kb = bytes as f64 / 1024.0;
    let mb = kb / 1024.0;
    if mb >= 1024.0 {
        format!("{:.1} GB", mb / 1024.0)
    } else if kb >= 1024.0 {
        format!("{mb:.1} MB")
    } else if kb >= 1.0 {
        format!("{kb:.1} KB")
    } else {
        format!("{bytes} B")
    }
}
