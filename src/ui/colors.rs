//! Color scheme system for the mdnav TUI.
//!
//! Provides dark, light, colorblind-friendly and monochrome palettes.

use ratatui::style::Color;

use crate::provider::FileKind;

/// Color scheme for the mdnav TUI application.
#[derive(Debug, Clone)]
pub struct ColorScheme {
    // Tree colors
    /// Color for folders
    pub folder: Color,
    /// Color for README files
    pub readme: Color,
    /// Color for other Markdown files
    pub markdown: Color,
    /// Color for the loading placeholder
    pub loading: Color,

    // UI element colors
    /// Color for selected/highlighted items
    pub selected: Color,

    // Text colors
    /// Primary text color
    pub text: Color,
    /// Dimmed/secondary text color
    pub text_dim: Color,
    /// Border color for panels/frames
    pub border: Color,

    // Header colors
    /// Header foreground color
    pub header_fg: Color,
    /// Header background color
    pub header_bg: Color,
    /// Accent color for highlights
    pub accent: Color,
    /// Path display color
    pub path_fg: Color,
    /// Hint text color
    pub hint_fg: Color,

    // Status bar colors
    /// Status bar foreground color
    pub status_fg: Color,
    /// Status bar background color
    pub status_bg: Color,
    /// File count color
    pub count_fg: Color,
    /// Scanning indicator color
    pub scanning_fg: Color,
    /// Key shortcut color
    pub key_fg: Color,
    /// Search input and match highlight color
    pub search_fg: Color,
    /// Error message color
    pub error_fg: Color,
    /// Informational message color
    pub info_fg: Color,
    /// Overlay background color
    pub overlay_bg: Color,
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::dark()
    }
}

impl ColorScheme {
    /// Pick a scheme by name; unknown names fall back to the dark theme.
    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            "colorblind" => Self::colorblind(),
            _ => Self::dark(),
        }
    }

    /// High-contrast theme for dark terminal backgrounds.
    pub fn dark() -> Self {
        Self {
            folder: Color::Rgb(100, 149, 237),  // Cornflower blue
            readme: Color::Rgb(255, 215, 0),    // Gold
            markdown: Color::Rgb(144, 238, 144), // Light green
            loading: Color::Rgb(241, 250, 140), // Yellow

            selected: Color::Rgb(255, 215, 0),

            text: Color::Rgb(248, 248, 242),
            text_dim: Color::Rgb(136, 136, 136),
            border: Color::Rgb(98, 114, 164),

            header_fg: Color::Rgb(248, 248, 242),
            header_bg: Color::Rgb(40, 42, 54),
            accent: Color::Rgb(189, 147, 249), // Purple accent
            path_fg: Color::Rgb(139, 233, 253), // Cyan for paths
            hint_fg: Color::Rgb(98, 114, 164),

            status_fg: Color::Rgb(248, 248, 242),
            status_bg: Color::Rgb(68, 71, 90),
            count_fg: Color::Rgb(80, 250, 123),
            scanning_fg: Color::Rgb(241, 250, 140),
            key_fg: Color::Rgb(255, 184, 108),
            search_fg: Color::Rgb(139, 233, 253),
            error_fg: Color::Rgb(255, 85, 85),
            info_fg: Color::Rgb(255, 184, 108),
            overlay_bg: Color::Rgb(30, 30, 40),
        }
    }

    /// Darker, saturated colors for light terminal backgrounds.
    pub fn light() -> Self {
        Self {
            folder: Color::Rgb(30, 80, 180),
            readme: Color::Rgb(184, 134, 11),
            markdown: Color::Rgb(34, 139, 34),
            loading: Color::Rgb(180, 140, 0),

            selected: Color::Rgb(0, 100, 200),

            text: Color::Rgb(30, 30, 30),
            text_dim: Color::Rgb(100, 100, 100),
            border: Color::Rgb(80, 80, 120),

            header_fg: Color::Rgb(30, 30, 30),
            header_bg: Color::Rgb(230, 230, 235),
            accent: Color::Rgb(100, 60, 180),
            path_fg: Color::Rgb(0, 100, 150),
            hint_fg: Color::Rgb(120, 120, 140),

            status_fg: Color::Rgb(30, 30, 30),
            status_bg: Color::Rgb(210, 210, 220),
            count_fg: Color::Rgb(22, 130, 80),
            scanning_fg: Color::Rgb(180, 140, 0),
            key_fg: Color::Rgb(180, 100, 50),
            search_fg: Color::Rgb(0, 100, 150),
            error_fg: Color::Rgb(180, 30, 30),
            info_fg: Color::Rgb(180, 100, 50),
            overlay_bg: Color::Rgb(240, 240, 245),
        }
    }

    /// Blue-orange palette that stays distinguishable under common forms of
    /// color vision deficiency.
    pub fn colorblind() -> Self {
        Self {
            folder: Color::Rgb(86, 180, 233),  // Sky blue
            readme: Color::Rgb(230, 159, 0),   // Orange
            markdown: Color::Rgb(0, 158, 115), // Bluish green
            loading: Color::Rgb(240, 228, 66), // Yellow

            selected: Color::Rgb(255, 255, 255),

            text: Color::Rgb(255, 255, 255),
            text_dim: Color::Rgb(170, 170, 170),
            border: Color::Rgb(136, 136, 136),

            header_fg: Color::Rgb(255, 255, 255),
            header_bg: Color::Rgb(40, 40, 50),
            accent: Color::Rgb(86, 180, 233),
            path_fg: Color::Rgb(240, 228, 66),
            hint_fg: Color::Rgb(153, 153, 153),

            status_fg: Color::Rgb(255, 255, 255),
            status_bg: Color::Rgb(60, 60, 70),
            count_fg: Color::Rgb(0, 158, 115),
            scanning_fg: Color::Rgb(240, 228, 66),
            key_fg: Color::Rgb(230, 159, 0),
            search_fg: Color::Rgb(86, 180, 233),
            error_fg: Color::Rgb(213, 94, 0), // Vermillion
            info_fg: Color::Rgb(230, 159, 0),
            overlay_bg: Color::Rgb(30, 30, 40),
        }
    }

    /// Terminal default colors everywhere, for `--no-color`.
    pub fn monochrome() -> Self {
        Self {
            folder: Color::Reset,
            readme: Color::Reset,
            markdown: Color::Reset,
            loading: Color::Reset,
            selected: Color::Reset,
            text: Color::Reset,
            text_dim: Color::Reset,
            border: Color::Reset,
            header_fg: Color::Reset,
            header_bg: Color::Reset,
            accent: Color::Reset,
            path_fg: Color::Reset,
            hint_fg: Color::Reset,
            status_fg: Color::Reset,
            status_bg: Color::Reset,
            count_fg: Color::Reset,
            scanning_fg: Color::Reset,
            key_fg: Color::Reset,
            search_fg: Color::Reset,
            error_fg: Color::Reset,
            info_fg: Color::Reset,
            overlay_bg: Color::Reset,
        }
    }

    pub fn file_color(&self, kind: FileKind) -> Color {
        match kind {
            FileKind::Readme => self.readme,
            FileKind::Markdown => self.markdown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name() {
        assert_eq!(ColorScheme::from_name("light").text, ColorScheme::light().text);
        assert_eq!(
            ColorScheme::from_name("colorblind").folder,
            ColorScheme::colorblind().folder
        );
        assert_eq!(ColorScheme::from_name("whatever").text, ColorScheme::dark().text);
    }

    #[test]
    fn test_file_color() {
        let scheme = ColorScheme::dark();
        assert_eq!(scheme.file_color(FileKind::Readme), scheme.readme);
        assert_eq!(scheme.file_color(FileKind::Markdown), scheme.markdown);
        assert_ne!(scheme.readme, scheme.markdown);
    }

    #[test]
    fn test_monochrome_uses_terminal_defaults() {
        let scheme = ColorScheme::monochrome();
        assert_eq!(scheme.folder, Color::Reset);
        assert_eq!(scheme.error_fg, Color::Reset);
    }
}
