//! The `maxp` table stores the number of glyphs in the font. Version 1.0 of
//! the table additionally contains a number of maximum values used by
//! TrueType rasterizers. None of those are needed for subsetting, so we only
//! ever look at the 6-byte header and copy everything after it verbatim.
//!
//! Note that this means the maximum values of a version 1.0 table still
//! describe the glyph set of the original font after subsetting.

use super::*;
use crate::provider::{TableProvider, TableSink};

/// The size of the header that is shared by both table versions.
const HEADER_SIZE: usize = 6;

/// The offset of the `numGlyphs` field.
const NUM_GLYPHS_OFFSET: usize = 4;

/// A 16.16 version number, as used by the `maxp` table.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Version16Dot16 {
    /// The major version in the high 16 bits.
    pub major: u16,
    /// The minor version in the low 16 bits.
    pub minor: u16,
}

impl Version16Dot16 {
    /// Version 0.5, which only contains the number of glyphs.
    pub const VERSION_0_5: Self = Self { major: 0, minor: 0x5000 };
    /// Version 1.0, which additionally contains TrueType maximum values.
    pub const VERSION_1_0: Self = Self { major: 1, minor: 0 };

    /// Whether a `maxp` table with this version may be read.
    pub fn is_supported(self) -> bool {
        self.major == 1 || self == Self::VERSION_0_5
    }
}

impl From<u32> for Version16Dot16 {
    fn from(raw: u32) -> Self {
        Self { major: (raw >> 16) as u16, minor: raw as u16 }
    }
}

impl Readable<'_> for Version16Dot16 {
    const SIZE: usize = 4;

    fn read(r: &mut Reader) -> Option<Self> {
        r.read::<u32>().map(Self::from)
    }
}

impl Writeable for Version16Dot16 {
    fn write(&self, w: &mut Writer) {
        w.write::<u32>((u32::from(self.major) << 16) | u32::from(self.minor));
    }
}

/// Check whether `data` holds a `maxp` table we can work with.
///
/// The data must be long enough for the header, and the version must either
/// be 0.5 or have a major version of 1.
pub fn sanitize(data: &[u8]) -> bool {
    if data.len() < HEADER_SIZE {
        return false;
    }

    Reader::new(data)
        .read::<Version16Dot16>()
        .is_some_and(Version16Dot16::is_supported)
}

/// A read-only view of a validated `maxp` table.
#[derive(Debug, Copy, Clone)]
pub struct Maxp<'a> {
    data: &'a [u8],
}

impl<'a> Maxp<'a> {
    /// Parse a table, returning `None` if it does not pass [`sanitize`].
    pub fn parse(data: &'a [u8]) -> Option<Self> {
        sanitize(data).then_some(Self { data })
    }

    /// The version of the table.
    pub fn version(&self) -> Version16Dot16 {
        let raw = [self.data[0], self.data[1], self.data[2], self.data[3]];
        Version16Dot16::from(u32::from_be_bytes(raw))
    }

    /// The number of glyphs in the font.
    pub fn num_glyphs(&self) -> u16 {
        read_num_glyphs(self.data)
    }

    /// Whether this is a version 1.0 table.
    pub fn is_long_form(&self) -> bool {
        self.version().major == 1
    }

    /// Everything after the header. Only non-empty for long form tables.
    pub fn tail(&self) -> &'a [u8] {
        &self.data[HEADER_SIZE..]
    }
}

/// A mutable view of a validated `maxp` table.
#[derive(Debug)]
pub struct MaxpMut<'a> {
    data: &'a mut [u8],
}

impl<'a> MaxpMut<'a> {
    /// Wrap a table, returning `None` if it does not pass [`sanitize`].
    pub fn new(data: &'a mut [u8]) -> Option<Self> {
        if sanitize(data) {
            Some(Self { data })
        } else {
            None
        }
    }

    /// The number of glyphs in the font.
    pub fn num_glyphs(&self) -> u16 {
        read_num_glyphs(self.data)
    }

    /// Overwrite the number of glyphs in the font.
    pub fn set_num_glyphs(&mut self, num_glyphs: u16) {
        self.data[NUM_GLYPHS_OFFSET..HEADER_SIZE]
            .copy_from_slice(&num_glyphs.to_be_bytes());
    }
}

fn read_num_glyphs(data: &[u8]) -> u16 {
    u16::from_be_bytes([data[NUM_GLYPHS_OFFSET], data[NUM_GLYPHS_OFFSET + 1]])
}

/// Write a fresh version 0.5 table.
pub fn short_form(num_glyphs: u16) -> Vec<u8> {
    let mut w = Writer::with_capacity(HEADER_SIZE);
    w.write(Version16Dot16::VERSION_0_5);
    w.write::<u16>(num_glyphs);
    w.finish()
}

/// Subset the `maxp` table of `source` and register the result with `plan`.
///
/// The whole table is copied, only the number of glyphs is replaced. If
/// anything fails, nothing is registered.
pub fn subset<'a>(
    source: &impl TableProvider<'a>,
    plan: &mut impl TableSink,
) -> Result<()> {
    let maxp = source.table(Tag::MAXP).ok_or(Error::MissingTable(Tag::MAXP))?;
    if !sanitize(maxp) {
        log::warn!("rejecting malformed maxp table ({} bytes)", maxp.len());
        return Err(Error::MalformedTable(Tag::MAXP));
    }

    let retained = plan.retained_gids().len();
    let num_glyphs = u16::try_from(retained).map_err(|_| Error::TooManyGlyphs(retained))?;

    let mut sub_maxp = Vec::new();
    sub_maxp
        .try_reserve_exact(maxp.len())
        .map_err(|_| Error::AllocationFailure(Tag::MAXP))?;
    sub_maxp.extend_from_slice(maxp);

    let mut view = MaxpMut::new(&mut sub_maxp).ok_or(Error::MalformedTable(Tag::MAXP))?;
    log::debug!("maxp: {} -> {} glyphs", view.num_glyphs(), num_glyphs);
    view.set_num_glyphs(num_glyphs);

    if sub_maxp.len() > HEADER_SIZE {
        log::debug!(
            "maxp: keeping {} bytes of maximum values from the original font",
            sub_maxp.len() - HEADER_SIZE
        );
    }

    if !plan.add_table(Tag::MAXP, sub_maxp) {
        return Err(Error::AllocationFailure(Tag::MAXP));
    }

    Ok(())
}
