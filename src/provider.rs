use crate::Tag;

/// A source of raw table data, typically a parsed font face.
///
/// The returned bytes are untrusted and must be validated before use.
pub trait TableProvider<'a> {
    /// Returns the raw bytes of the table with the given tag, if present.
    fn table(&self, tag: Tag) -> Option<&'a [u8]>;
}

/// The receiving end of a subsetting run.
///
/// It knows which glyphs survive and collects the rewritten tables.
pub trait TableSink {
    /// The old glyph IDs that are retained, in ascending order. The position
    /// of a glyph in this slice is its new glyph ID.
    fn retained_gids(&self) -> &[u16];

    /// Register an output table. Returns `false` if the table could not be
    /// stored, in which case nothing was registered.
    fn add_table(&mut self, tag: Tag, data: Vec<u8>) -> bool;
}
