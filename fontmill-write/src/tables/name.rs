//! The [name (Naming)](https://docs.microsoft.com/en-us/typography/opentype/spec/name) table

use read::{
    tables::name::{self as read_name, Encoding, MacRomanMapping},
    ReadError, TopLevelTable,
};
use types::{NameId, Tag};

use crate::{error::Error, FontWrite, TableWriter};

const RECORD_LEN: usize = 12;
const HEADER_LEN: usize = 6;

/// The [name](https://docs.microsoft.com/en-us/typography/opentype/spec/name)
/// table, always written in format 0.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Name {
    name_record: Vec<NameRecord>,
}

/// A single name entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NameRecord {
    pub platform_id: u16,
    pub encoding_id: u16,
    pub language_id: u16,
    pub name_id: NameId,
    pub value: NameValue,
}

/// The string of a name entry.
///
/// Entries in encodings we can't decode are carried through as bytes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NameValue {
    Text(String),
    Raw(Vec<u8>),
}

impl NameRecord {
    fn sort_key(&self) -> (u16, u16, u16, NameId) {
        (
            self.platform_id,
            self.encoding_id,
            self.language_id,
            self.name_id,
        )
    }

    fn encoded(&self) -> Result<Vec<u8>, Error> {
        let text = match &self.value {
            NameValue::Raw(bytes) => return Ok(bytes.clone()),
            NameValue::Text(text) => text,
        };
        match Encoding::new(self.platform_id, self.encoding_id) {
            Encoding::Utf16Be => Ok(text.encode_utf16().flat_map(u16::to_be_bytes).collect()),
            Encoding::MacRoman => Ok(text
                .chars()
                .map(|c| MacRomanMapping.encode(c).unwrap_or(b'?'))
                .collect()),
            Encoding::Unknown => Err(Error::InvalidTable("cannot encode text for this platform")),
        }
    }
}

impl TopLevelTable for Name {
    const TAG: Tag = Tag::new(b"name");
}

impl Name {
    /// Copy all the records of an existing table.
    ///
    /// Language-tag records of format 1 tables are not carried over.
    pub fn from_read(name: &read_name::Name) -> Result<Self, ReadError> {
        let string_data = name.string_data();
        let name_record = name
            .name_record()
            .iter()
            .map(|record| {
                let string = record.string(string_data)?;
                let value = match string.encoding() {
                    Encoding::Unknown => {
                        let start = record.string_offset() as usize;
                        let end = start + record.length() as usize;
                        let bytes = string_data
                            .as_bytes()
                            .get(start..end)
                            .ok_or(ReadError::OutOfBounds)?;
                        NameValue::Raw(bytes.to_vec())
                    }
                    _ => NameValue::Text(string.to_string()),
                };
                Ok(NameRecord {
                    platform_id: record.platform_id(),
                    encoding_id: record.encoding_id(),
                    language_id: record.language_id(),
                    name_id: record.name_id(),
                    value,
                })
            })
            .collect::<Result<_, ReadError>>()?;
        Ok(Name { name_record })
    }

    pub fn records(&self) -> &[NameRecord] {
        &self.name_record
    }

    /// The text of the matching record, if there is one and it is decoded.
    pub fn get(
        &self,
        platform_id: u16,
        encoding_id: u16,
        language_id: u16,
        name_id: NameId,
    ) -> Option<&str> {
        self.name_record
            .iter()
            .find(|rec| rec.sort_key() == (platform_id, encoding_id, language_id, name_id))
            .and_then(|rec| match &rec.value {
                NameValue::Text(text) => Some(text.as_str()),
                NameValue::Raw(_) => None,
            })
    }

    /// Replace the text of the matching record, adding it if missing.
    pub fn set(
        &mut self,
        platform_id: u16,
        encoding_id: u16,
        language_id: u16,
        name_id: NameId,
        text: impl Into<String>,
    ) {
        let value = NameValue::Text(text.into());
        let key = (platform_id, encoding_id, language_id, name_id);
        match self.name_record.iter_mut().find(|rec| rec.sort_key() == key) {
            Some(record) => record.value = value,
            None => self.name_record.push(NameRecord {
                platform_id,
                encoding_id,
                language_id,
                name_id,
                value,
            }),
        }
    }

    fn compile_records(&self) -> Result<(Vec<(&NameRecord, u16, u16)>, Vec<u8>), Error> {
        let mut records = self.name_record.iter().collect::<Vec<_>>();
        records.sort_by_key(|rec| rec.sort_key());
        let mut storage = Vec::new();
        let mut compiled = Vec::with_capacity(records.len());
        for record in records {
            let bytes = record.encoded()?;
            let offset = find_subslice(&storage, &bytes).unwrap_or_else(|| {
                storage.extend_from_slice(&bytes);
                storage.len() - bytes.len()
            });
            let length = u16::try_from(bytes.len())
                .map_err(|_| Error::ValueOutOfRange("name string too long"))?;
            let offset = u16::try_from(offset)
                .map_err(|_| Error::ValueOutOfRange("name storage too large"))?;
            compiled.push((record, length, offset));
        }
        Ok((compiled, storage))
    }
}

fn find_subslice(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

impl FontWrite for Name {
    fn write_into(&self, writer: &mut TableWriter) {
        // validated before writing
        let Ok((records, storage)) = self.compile_records() else {
            return;
        };
        0u16.write_into(writer);
        (records.len() as u16).write_into(writer);
        ((HEADER_LEN + records.len() * RECORD_LEN) as u16).write_into(writer);
        for (record, length, offset) in records {
            record.platform_id.write_into(writer);
            record.encoding_id.write_into(writer);
            record.language_id.write_into(writer);
            record.name_id.write_into(writer);
            length.write_into(writer);
            offset.write_into(writer);
        }
        writer.write_slice(&storage);
    }

    fn validate(&self) -> Result<(), Error> {
        if HEADER_LEN + self.name_record.len() * RECORD_LEN > u16::MAX as usize {
            return Err(Error::ValueOutOfRange("too many name records"));
        }
        self.compile_records().map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use read::{FontData, FontRead};

    #[test]
    fn round_trip_and_rename() {
        let mut name = Name::default();
        name.set(3, 1, 0x409, NameId::FAMILY_NAME, "Mill Sans");
        name.set(1, 0, 0, NameId::FAMILY_NAME, "Mill Sans");
        name.set(3, 1, 0x409, NameId::SUBFAMILY_NAME, "Regular");
        name.set(3, 1, 0x409, NameId::SUBFAMILY_NAME, "wght650");
        name.set(1, 0, 0, NameId::FULL_NAME, "Mill Sans \u{e9}");
        assert_eq!(name.records().len(), 4);

        let bytes = crate::dump_table(&name).unwrap();
        let read = read_name::Name::read(FontData::new(&bytes)).unwrap();
        assert_eq!(read.count(), 4);
        // sorted by platform first
        assert_eq!(read.name_record()[0].platform_id(), 1);
        assert_eq!(
            read.find(3, 1, 0x409, NameId::SUBFAMILY_NAME).as_deref(),
            Some("wght650")
        );
        assert_eq!(
            read.find(1, 0, 0, NameId::FULL_NAME).as_deref(),
            Some("Mill Sans \u{e9}")
        );

        let owned = Name::from_read(&read).unwrap();
        assert_eq!(owned.get(1, 0, 0, NameId::FAMILY_NAME), Some("Mill Sans"));
        assert_eq!(crate::dump_table(&owned).unwrap(), bytes);
    }

    #[test]
    fn unknown_platform_text_is_an_error() {
        let mut name = Name::default();
        name.set(2, 0, 0, NameId::FAMILY_NAME, "ISO");
        assert!(crate::dump_table(&name).is_err());
    }
}
