/*!
Validates and subsets the maximum profile (`maxp`) table of OpenType fonts.

The `maxp` table records how many glyphs a font has. When a font is
subsetted, that count must be replaced with the number of glyphs that are
retained. This crate checks that the table is well-formed before touching it,
rewrites the glyph count and copies everything else verbatim.

# Example
In the example below, we keep the glyphs with IDs 68, 69 and 70. The `.notdef`
glyph is always kept, so the resulting font has four glyphs.

```no_run
use maxp_subset::subset;

# fn main() -> Result<(), Box<dyn std::error::Error>> {
// Read the raw font data.
let data = std::fs::read("fonts/NotoSans-Regular.ttf")?;

// Rewrite the maxp table for three glyphs.
let sub = subset(&data, 0, &[68, 69, 70])?;

// Write the resulting file.
std::fs::write("target/Noto-Small.ttf", sub)?;
# Ok(())
# }
```

Only the `maxp` table is rewritten, all other tables are copied unchanged. The
[`maxp`] module can also be driven by other subsetting pipelines through the
[`TableProvider`] and [`TableSink`] traits.
*/

#![deny(unsafe_code)]
#![deny(missing_docs)]

mod face;
pub mod maxp;
mod plan;
mod provider;
mod stream;

pub use crate::face::{Face, FontKind};
pub use crate::maxp::{Maxp, MaxpMut, Version16Dot16};
pub use crate::plan::Plan;
pub use crate::provider::{TableProvider, TableSink};

use crate::face::TableRecord;
use crate::stream::{Readable, Reader, Writeable, Writer};
use std::fmt::{self, Debug, Display, Formatter};

/// Subset a font face to the given glyphs.
///
/// - The `data` must be in the OpenType font format.
/// - The `index` is only relevant if the data contains a font collection
///   (`.ttc` or `.otc` file). Otherwise, it should be 0.
/// - Glyph IDs that do not exist in the font are ignored. The `.notdef`
///   glyph is always kept, unless the font has no glyphs at all.
pub fn subset(data: &[u8], index: u32, gids: &[u16]) -> Result<Vec<u8>> {
    let face = Face::parse(data, index)?;

    let maxp = face.table(Tag::MAXP).ok_or(Error::MissingTable(Tag::MAXP))?;
    let num_glyphs = Maxp::parse(maxp)
        .ok_or(Error::MalformedTable(Tag::MAXP))?
        .num_glyphs();

    let mut ctx = Context { face, plan: Plan::for_font(gids, num_glyphs)? };
    let tags: Vec<Tag> = ctx.face.tags().collect();
    for tag in tags {
        ctx.process(tag)?;
    }

    Ok(construct(ctx))
}

/// Construct a brand new font.
fn construct(ctx: Context) -> Vec<u8> {
    let kind = ctx.face.kind();
    let mut tables = ctx.plan.into_tables();

    let mut w = Writer::new();
    w.write::<FontKind>(kind);

    // Write table directory.
    let count = tables.len() as u16;
    let entry_selector = count.checked_ilog2().unwrap_or(0) as u16;
    let search_range = 2u16.pow(u32::from(entry_selector)).saturating_mul(16);
    let range_shift = count.saturating_mul(16).saturating_sub(search_range);
    w.write(count);
    w.write(search_range);
    w.write(entry_selector);
    w.write(range_shift);

    // This variable will hold the offset to the checksum adjustment field
    // in the head table, which we'll have to write in the end (after
    // checksumming the whole font).
    let mut checksum_adjustment_offset = None;

    // Write table records.
    let mut offset = 12 + tables.len() * 16;
    for (tag, data) in &mut tables {
        if *tag == Tag::HEAD {
            // Zero out checksum field in head table.
            if let Some(adjustment) = data.get_mut(8..12) {
                adjustment.fill(0);
                checksum_adjustment_offset = Some(offset + 8);
            }
        }

        let len = data.len();
        w.write(TableRecord {
            tag: *tag,
            checksum: checksum(data),
            offset: offset as u32,
            length: len as u32,
        });

        log::trace!("{tag}: {len} bytes at offset {offset}");

        // Increase offset, plus padding zeros to align to 4 bytes.
        offset += len;
        while offset % 4 != 0 {
            offset += 1;
        }
    }

    // Write tables.
    for (_, data) in &tables {
        // Write data plus padding zeros to align to 4 bytes.
        w.extend(data);
        w.align(4);
    }

    // Write checksum adjustment field in head table.
    let mut data = w.finish();
    if let Some(i) = checksum_adjustment_offset {
        let sum = checksum(&data);
        let val = 0xB1B0AFBA_u32.wrapping_sub(sum);
        data[i..i + 4].copy_from_slice(&val.to_be_bytes());
    }

    data
}

/// Calculate a checksum over the sliced data as a sum of u32s. If the data
/// length is not a multiple of four, it is treated as if padded with zero to a
/// length that is a multiple of four.
fn checksum(data: &[u8]) -> u32 {
    let mut sum = 0u32;
    for chunk in data.chunks(4) {
        let mut bytes = [0; 4];
        bytes[..chunk.len()].copy_from_slice(chunk);
        sum = sum.wrapping_add(u32::from_be_bytes(bytes));
    }
    sum
}

/// Subsetting context.
struct Context<'a> {
    /// Original face.
    face: Face<'a>,
    /// Retained glyphs and subsetted tables.
    plan: Plan,
}

impl Context<'_> {
    /// Process a table.
    fn process(&mut self, tag: Tag) -> Result<()> {
        match tag {
            Tag::MAXP => maxp::subset(&self.face, &mut self.plan)?,
            _ => {
                let data = self.face.table(tag).ok_or(Error::InvalidOffset)?;
                log::trace!("passing through {tag} table");
                if !self.plan.add_table(tag, data.to_vec()) {
                    return Err(Error::AllocationFailure(tag));
                }
            }
        }

        Ok(())
    }
}

/// A 4-byte OpenType tag.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct Tag(pub [u8; 4]);

impl Tag {
    /// The font header table.
    pub const HEAD: Self = Self(*b"head");
    /// The maximum profile table.
    pub const MAXP: Self = Self(*b"maxp");
}

impl Debug for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        write!(f, "Tag({self})")
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.pad(std::str::from_utf8(&self.0).unwrap_or("..."))
    }
}

/// The result type for everything.
pub type Result<T> = std::result::Result<T, Error>;

/// Subsetting failed.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Error {
    /// The file contains an unknown kind of font.
    UnknownKind,
    /// An offset pointed outside of the data.
    InvalidOffset,
    /// Parsing expected more data.
    MissingData,
    /// Parsed data was invalid.
    InvalidData,
    /// A table that is needed for subsetting is missing.
    MissingTable(Tag),
    /// A table is too short or has an unsupported version.
    MalformedTable(Tag),
    /// The output for a table could not be allocated or registered.
    AllocationFailure(Tag),
    /// More glyphs were retained than a font can hold.
    TooManyGlyphs(usize),
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            Self::UnknownKind => f.pad("unknown font kind"),
            Self::InvalidOffset => f.pad("invalid offset"),
            Self::MissingData => f.pad("missing more data"),
            Self::InvalidData => f.pad("invalid data"),
            Self::MissingTable(tag) => write!(f, "missing {tag} table"),
            Self::MalformedTable(tag) => write!(f, "malformed {tag} table"),
            Self::AllocationFailure(tag) => {
                write!(f, "failed to allocate {tag} table")
            }
            Self::TooManyGlyphs(count) => {
                write!(f, "{count} glyphs exceed the maximum of {}", Plan::MAX_GLYPHS)
            }
        }
    }
}

impl std::error::Error for Error {}
