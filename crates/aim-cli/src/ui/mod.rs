//! Terminal output

pub mod list;
pub mod output;
pub mod progress;
pub mod theme;

pub use output::Output;
pub use theme::Theme;
