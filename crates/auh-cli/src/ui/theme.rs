//! Colors, icons and column widths.

use crossterm::style::Color;

/// Everything the actor needs to style a line.
#[derive(Debug, Clone)]
pub struct Theme {
    /// Palette.
    pub colors: ColorScheme,
    /// Status glyphs.
    pub icons: Icons,
    /// Width the package name column is padded to.
    pub name_width: usize,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            colors: ColorScheme::default(),
            icons: Icons::default(),
            name_width: 28,
        }
    }
}

/// Colors by role.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    /// Package name column.
    pub package_name: Color,
    /// Dim status text.
    pub secondary: Color,
    /// Completed packages.
    pub success: Color,
    /// Skips and warnings.
    pub warning: Color,
    /// Failures.
    pub error: Color,
    /// Packages being fetched or built.
    pub active: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self {
            package_name: Color::Cyan,
            secondary: Color::DarkGrey,
            success: Color::Green,
            warning: Color::Yellow,
            error: Color::Red,
            active: Color::Blue,
        }
    }
}

/// Status glyphs.
#[derive(Debug, Clone)]
pub struct Icons {
    /// Queued (○)
    pub pending: &'static str,
    /// In progress (●)
    pub active: &'static str,
    /// Done (✓)
    pub success: &'static str,
    /// Failed (✗)
    pub error: &'static str,
    /// Skipped or warning (⚠)
    pub warning: &'static str,
    /// Info (ℹ)
    pub info: &'static str,
}

impl Default for Icons {
    fn default() -> Self {
        Self {
            pending: "○",
            active: "●",
            success: "✓",
            error: "✗",
            warning: "⚠",
            info: "ℹ",
        }
    }
}
