//! ANSI color codes for disassembly output.
//!
//! Three semantic colors with a dim modifier:
//! - Blue: opcodes, member names, section headers
//! - Green: constants and string literals
//! - Yellow: branch targets and labels
//! - Dim: offsets, indexes, descriptors

/// ANSI color palette for CLI output.
///
/// Uses only standard 16-color ANSI codes so it reads on light and dark themes.
#[derive(Clone, Copy, Debug)]
pub struct Colors {
    pub blue: &'static str,
    pub green: &'static str,
    pub yellow: &'static str,
    pub dim: &'static str,
    pub reset: &'static str,
}

impl Default for Colors {
    fn default() -> Self {
        Self::OFF
    }
}

impl Colors {
    pub const ON: Self = Self {
        blue: "\x1b[34m",
        green: "\x1b[32m",
        yellow: "\x1b[33m",
        dim: "\x1b[2m",
        reset: "\x1b[0m",
    };

    pub const OFF: Self = Self {
        blue: "",
        green: "",
        yellow: "",
        dim: "",
        reset: "",
    };

    pub fn new(enabled: bool) -> Self {
        if enabled { Self::ON } else { Self::OFF }
    }

    pub fn is_enabled(&self) -> bool {
        !self.reset.is_empty()
    }

    /// Wrap `text` in `color` and a reset.
    pub fn paint(&self, color: &'static str, text: impl std::fmt::Display) -> String {
        if self.is_enabled() {
            format!("{color}{text}{}", self.reset)
        } else {
            text.to_string()
        }
    }
}
