use super::*;
use crate::provider::TableSink;
use rustc_hash::FxHashMap;
use std::collections::BTreeSet;

/// Decides which glyphs survive a subsetting run and collects the resulting
/// tables.
///
/// Glyphs keep their relative order. For example, if a font is subsetted to
/// the glyphs 4, 9 and 16, the new glyph IDs are:
/// 0 -> 0 (The .notdef glyph will always be included)
/// 4 -> 1
/// 9 -> 2
/// 16 -> 3
#[derive(Debug, Clone)]
pub struct Plan {
    /// The retained old glyph IDs, sorted. The index is the new glyph ID.
    gids: Vec<u16>,
    /// The tables produced so far.
    tables: FxHashMap<Tag, Vec<u8>>,
}

impl Plan {
    /// The maximum number of glyphs a font can have.
    pub const MAX_GLYPHS: usize = u16::MAX as usize;

    /// Create a new plan that retains the given glyphs.
    ///
    /// Fails if the resulting glyph count does not fit into 16 bits, which
    /// can only happen if every possible glyph ID is requested.
    pub fn new(gids: &[u16]) -> Result<Self> {
        let mut sorted = BTreeSet::from_iter(gids.iter().copied());
        // .notdef is always a part of a subset.
        sorted.insert(0);
        Self::from_sorted(sorted)
    }

    /// Create a plan for a font with `num_glyphs` glyphs.
    ///
    /// Glyph IDs that do not exist in the font are dropped. A font without
    /// any glyphs has no `.notdef` glyph either, so nothing is retained.
    pub fn for_font(gids: &[u16], num_glyphs: u16) -> Result<Self> {
        let mut sorted = BTreeSet::new();
        let mut unknown = 0;
        for &gid in gids {
            if gid < num_glyphs {
                sorted.insert(gid);
            } else {
                unknown += 1;
            }
        }

        if unknown > 0 {
            log::debug!(
                "ignoring {unknown} glyph ids that are out of range for {num_glyphs} glyphs"
            );
        }

        if num_glyphs > 0 {
            sorted.insert(0);
        }

        Self::from_sorted(sorted)
    }

    fn from_sorted(sorted: BTreeSet<u16>) -> Result<Self> {
        if sorted.len() > Self::MAX_GLYPHS {
            return Err(Error::TooManyGlyphs(sorted.len()));
        }

        Ok(Self {
            gids: sorted.into_iter().collect(),
            tables: FxHashMap::default(),
        })
    }

    /// The retained old glyph IDs, in the order of their new IDs.
    pub fn retained_gids(&self) -> &[u16] {
        &self.gids
    }

    /// The number of glyphs in the subsetted font.
    pub fn num_output_glyphs(&self) -> u16 {
        // Checked when creating the plan.
        self.gids.len() as u16
    }

    /// Register a subsetted table. Returns `false` without storing anything
    /// if a table with the same tag already exists or memory could not be
    /// reserved.
    pub fn add_table(&mut self, tag: Tag, data: Vec<u8>) -> bool {
        if self.tables.contains_key(&tag) {
            log::warn!("refusing duplicate {tag} table");
            return false;
        }

        if self.tables.try_reserve(1).is_err() {
            return false;
        }

        self.tables.insert(tag, data);
        true
    }

    /// A table that was registered before.
    pub fn table(&self, tag: Tag) -> Option<&[u8]> {
        self.tables.get(&tag).map(Vec::as_slice)
    }

    /// Consume the plan, returning all registered tables sorted by tag.
    pub fn into_tables(self) -> Vec<(Tag, Vec<u8>)> {
        let mut tables: Vec<_> = self.tables.into_iter().collect();
        tables.sort_by_key(|&(tag, _)| tag);
        tables
    }
}

impl TableSink for Plan {
    fn retained_gids(&self) -> &[u16] {
        Plan::retained_gids(self)
    }

    fn add_table(&mut self, tag: Tag, data: Vec<u8>) -> bool {
        Plan::add_table(self, tag, data)
    }
}
