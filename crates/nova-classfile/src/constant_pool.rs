use crate::error::{Error, Result};
use crate::reader::Reader;

const TAG_UTF8: u8 = 1;
const TAG_INTEGER: u8 = 3;
const TAG_FLOAT: u8 = 4;
const TAG_LONG: u8 = 5;
const TAG_DOUBLE: u8 = 6;
const TAG_CLASS: u8 = 7;
const TAG_STRING: u8 = 8;
const TAG_FIELDREF: u8 = 9;
const TAG_METHODREF: u8 = 10;
const TAG_INTERFACE_METHODREF: u8 = 11;
const TAG_NAME_AND_TYPE: u8 = 12;
const TAG_METHOD_HANDLE: u8 = 15;
const TAG_METHOD_TYPE: u8 = 16;
const TAG_DYNAMIC: u8 = 17;
const TAG_INVOKE_DYNAMIC: u8 = 18;
const TAG_MODULE: u8 = 19;
const TAG_PACKAGE: u8 = 20;

#[derive(Debug, Clone)]
enum Entry {
    /// Slot 0, and the second slot of long/double constants.
    Unusable,
    Utf8(String),
    Class { name_index: u16 },
    /// Any constant the reader does not need to decode further.
    Other(&'static str),
}

impl Entry {
    fn kind(&self) -> &'static str {
        match self {
            Entry::Unusable => "unusable",
            Entry::Utf8(_) => "Utf8",
            Entry::Class { .. } => "Class",
            Entry::Other(kind) => kind,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct ConstantPool {
    entries: Vec<Entry>,
}

impl ConstantPool {
    pub(crate) fn parse(reader: &mut Reader<'_>) -> Result<Self> {
        let count = reader.read_u2()? as usize;
        let mut entries = Vec::with_capacity(count);
        entries.push(Entry::Unusable);

        while entries.len() < count {
            let tag = reader.read_u1()?;
            let entry = match tag {
                TAG_UTF8 => {
                    let len = reader.read_u2()? as usize;
                    let bytes = reader.read_bytes(len)?;
                    Entry::Utf8(decode_modified_utf8(bytes)?)
                }
                TAG_INTEGER | TAG_FLOAT => {
                    reader.read_u4()?;
                    Entry::Other("Numeric")
                }
                TAG_LONG | TAG_DOUBLE => {
                    reader.read_u4()?;
                    reader.read_u4()?;
                    entries.push(Entry::Other("Wide"));
                    // Long and double constants occupy two slots.
                    Entry::Unusable
                }
                TAG_CLASS => Entry::Class {
                    name_index: reader.read_u2()?,
                },
                TAG_STRING | TAG_METHOD_TYPE | TAG_MODULE | TAG_PACKAGE => {
                    reader.read_u2()?;
                    Entry::Other("Ref")
                }
                TAG_FIELDREF | TAG_METHODREF | TAG_INTERFACE_METHODREF | TAG_NAME_AND_TYPE
                | TAG_DYNAMIC | TAG_INVOKE_DYNAMIC => {
                    reader.read_u4()?;
                    Entry::Other("MemberRef")
                }
                TAG_METHOD_HANDLE => {
                    reader.read_u1()?;
                    reader.read_u2()?;
                    Entry::Other("MethodHandle")
                }
                other => return Err(Error::InvalidConstantPoolTag(other)),
            };
            entries.push(entry);
        }

        Ok(Self { entries })
    }

    fn entry(&self, index: u16) -> Result<&Entry> {
        match self.entries.get(index as usize) {
            Some(Entry::Unusable) | None => Err(Error::InvalidConstantPoolIndex(index)),
            Some(entry) => Ok(entry),
        }
    }

    pub(crate) fn get_utf8(&self, index: u16) -> Result<&str> {
        match self.entry(index)? {
            Entry::Utf8(text) => Ok(text),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Utf8",
                found: other.kind(),
            }),
        }
    }

    /// Internal name (`java/lang/String`) of a `CONSTANT_Class` entry.
    pub(crate) fn get_class_name(&self, index: u16) -> Result<String> {
        match self.entry(index)? {
            Entry::Class { name_index } => Ok(self.get_utf8(*name_index)?.to_string()),
            other => Err(Error::ConstantPoolTypeMismatch {
                index,
                expected: "Class",
                found: other.kind(),
            }),
        }
    }
}

/// Decode the JVM's "modified UTF-8" (JVMS 4.4.7).
///
/// Differs from standard UTF-8 in encoding NUL as two bytes and supplementary
/// characters as surrogate pairs, each encoded separately.
fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(text.to_string());
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b0 = bytes[i] as u16;
        if b0 & 0x80 == 0 {
            units.push(b0);
            i += 1;
        } else if b0 & 0xE0 == 0xC0 {
            let b1 = *bytes.get(i + 1).ok_or(Error::InvalidModifiedUtf8)? as u16;
            units.push(((b0 & 0x1F) << 6) | (b1 & 0x3F));
            i += 2;
        } else if b0 & 0xF0 == 0xE0 {
            let b1 = *bytes.get(i + 1).ok_or(Error::InvalidModifiedUtf8)? as u16;
            let b2 = *bytes.get(i + 2).ok_or(Error::InvalidModifiedUtf8)? as u16;
            units.push(((b0 & 0x0F) << 12) | ((b1 & 0x3F) << 6) | (b2 & 0x3F));
            i += 3;
        } else {
            return Err(Error::InvalidModifiedUtf8);
        }
    }

    String::from_utf16(&units).map_err(|_| Error::InvalidModifiedUtf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_encoded_nul() {
        assert_eq!(decode_modified_utf8(&[b'a', 0xC0, 0x80, b'b']).unwrap(), "a\0b");
    }

    #[test]
    fn long_constants_take_two_slots() {
        // count=4: #1 Long, (#2 unusable), #3 Utf8 "x"
        let bytes = [
            0x00, 0x04, TAG_LONG, 0, 0, 0, 0, 0, 0, 0, 1, TAG_UTF8, 0x00, 0x01, b'x',
        ];
        let mut reader = Reader::new(&bytes);
        let cp = ConstantPool::parse(&mut reader).unwrap();
        assert_eq!(cp.get_utf8(3).unwrap(), "x");
        assert!(matches!(
            cp.get_utf8(2),
            Err(Error::InvalidConstantPoolIndex(2))
        ));
    }
}
