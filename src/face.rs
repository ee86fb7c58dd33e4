use super::*;
use crate::provider::TableProvider;

/// A font face with OpenType tables.
#[derive(Debug, Clone)]
pub struct Face<'a> {
    data: &'a [u8],
    kind: FontKind,
    records: Vec<TableRecord>,
}

impl<'a> Face<'a> {
    /// Parse a font face from OpenType data.
    ///
    /// The `index` is only relevant if the data contains a font collection
    /// (`.ttc` or `.otc` file). Otherwise, it should be 0.
    pub fn parse(data: &'a [u8], index: u32) -> Result<Self> {
        let mut r = Reader::new(data);
        let mut kind = r.read::<FontKind>().ok_or(Error::UnknownKind)?;

        // Parse font collection header if necessary.
        if kind == FontKind::Collection {
            let offset = 12 + 4 * (index as usize);
            let offset = Reader::new_at(data, offset)
                .read::<u32>()
                .ok_or(Error::InvalidOffset)?;
            let subdata = data.get(offset as usize..).ok_or(Error::InvalidOffset)?;
            r = Reader::new(subdata);
            kind = r.read::<FontKind>().ok_or(Error::UnknownKind)?;
            if kind == FontKind::Collection {
                return Err(Error::UnknownKind);
            }
        }

        // Read number of table records.
        let count = r.read::<u16>().ok_or(Error::MissingData)?;
        r.skip::<u16>(); // search range
        r.skip::<u16>(); // entry selector
        r.skip::<u16>(); // range shift

        // Read table records.
        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            records.push(r.read::<TableRecord>().ok_or(Error::MissingData)?);
        }

        // The directory should be sorted, but not all fonts are.
        records.sort_by_key(|record| record.tag);
        if let Some(pair) = records.windows(2).find(|pair| pair[0].tag == pair[1].tag) {
            log::warn!("table directory lists {} twice", pair[0].tag);
            return Err(Error::InvalidData);
        }

        Ok(Face { data, kind, records })
    }

    /// What kind of outlines the face has.
    pub fn kind(&self) -> FontKind {
        self.kind
    }

    /// The raw data of a table, if it exists and lies within the font data.
    pub fn table(&self, tag: Tag) -> Option<&'a [u8]> {
        let i = self.records.binary_search_by(|record| record.tag.cmp(&tag)).ok()?;
        let record = self.records.get(i)?;
        let start = record.offset as usize;
        let end = start.checked_add(record.length as usize)?;
        self.data.get(start..end)
    }

    /// The tags of all tables in the face, sorted.
    pub fn tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.records.iter().map(|record| record.tag)
    }
}

impl<'a> TableProvider<'a> for Face<'a> {
    fn table(&self, tag: Tag) -> Option<&'a [u8]> {
        Face::table(self, tag)
    }
}

/// What kind of contents the font has.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FontKind {
    /// TrueType outlines.
    TrueType,
    /// CFF outlines.
    Cff,
    /// A font collection.
    Collection,
}

impl Readable<'_> for FontKind {
    const SIZE: usize = 4;

    fn read(r: &mut Reader) -> Option<Self> {
        match r.read::<u32>()? {
            0x00010000 | 0x74727565 => Some(FontKind::TrueType),
            0x4F54544F => Some(FontKind::Cff),
            0x74746366 => Some(FontKind::Collection),
            _ => None,
        }
    }
}

impl Writeable for FontKind {
    fn write(&self, w: &mut Writer) {
        w.write::<u32>(match self {
            FontKind::TrueType => 0x00010000,
            FontKind::Cff => 0x4F54544F,
            FontKind::Collection => 0x74746366,
        })
    }
}

/// Locates a table in the font file.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) struct TableRecord {
    pub tag: Tag,
    pub checksum: u32,
    pub offset: u32,
    pub length: u32,
}

impl Readable<'_> for TableRecord {
    const SIZE: usize = 16;

    fn read(r: &mut Reader) -> Option<Self> {
        Some(TableRecord {
            tag: r.read::<Tag>()?,
            checksum: r.read::<u32>()?,
            offset: r.read::<u32>()?,
            length: r.read::<u32>()?,
        })
    }
}

impl Writeable for TableRecord {
    fn write(&self, w: &mut Writer) {
        w.write::<Tag>(self.tag);
        w.write::<u32>(self.checksum);
        w.write::<u32>(self.offset);
        w.write::<u32>(self.length);
    }
}
