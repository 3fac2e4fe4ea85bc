//! ANSI styling for layout dumps, traces and value output.
//!
//! Field names and object keys are blue, type names and pointers green,
//! offsets, padding notes and punctuation dim.

const BLUE: &str = "\x1b[34m";
const GREEN: &str = "\x1b[32m";
const DIM: &str = "\x1b[2m";
const RESET: &str = "\x1b[0m";

/// Whether rendered text carries ANSI escapes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Colors {
    enabled: bool,
}

impl Colors {
    pub const ON: Self = Self { enabled: true };

    /// Plain text. Used by snapshot tests.
    pub const OFF: Self = Self { enabled: false };

    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Wrap a field name or object key.
    pub fn field(&self, name: &str) -> String {
        self.paint(BLUE, name)
    }

    /// Wrap a type name.
    pub fn type_name(&self, name: &str) -> String {
        self.paint(GREEN, name)
    }

    /// Wrap metadata: offsets, padding notes, punctuation.
    pub fn meta(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.enabled {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}
