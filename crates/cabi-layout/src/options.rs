//! Schema configuration.

/// Options recognized when declaring a schema.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LayoutOptions {
    /// Suppress natural alignment padding between fields.
    pub(crate) packed: bool,
    /// Requested alignment. Stored and reported; the layout engines do not
    /// enforce it.
    pub(crate) alignment: Option<usize>,
}

impl LayoutOptions {
    /// Natural alignment, no override.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn packed(mut self, packed: bool) -> Self {
        self.packed = packed;
        self
    }

    pub fn alignment(mut self, alignment: Option<usize>) -> Self {
        self.alignment = alignment;
        self
    }

    pub fn is_packed(&self) -> bool {
        self.packed
    }

    pub fn get_alignment(&self) -> Option<usize> {
        self.alignment
    }
}
