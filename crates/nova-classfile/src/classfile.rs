use crate::constant_pool::ConstantPool;
use crate::error::{Error, Result};
use crate::reader::Reader;

/// JVM access flags used when building reflective models.
pub mod access {
    pub const ACC_PUBLIC: u16 = 0x0001;
    pub const ACC_PRIVATE: u16 = 0x0002;
    pub const ACC_PROTECTED: u16 = 0x0004;
    pub const ACC_STATIC: u16 = 0x0008;
    pub const ACC_FINAL: u16 = 0x0010;
    /// Methods only; shares its bit with `ACC_SUPER` on classes.
    pub const ACC_BRIDGE: u16 = 0x0040;
    /// Methods only.
    pub const ACC_VARARGS: u16 = 0x0080;
    pub const ACC_INTERFACE: u16 = 0x0200;
    pub const ACC_ABSTRACT: u16 = 0x0400;
    pub const ACC_SYNTHETIC: u16 = 0x1000;
    pub const ACC_ANNOTATION: u16 = 0x2000;
    pub const ACC_ENUM: u16 = 0x4000;
}

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub access_flags: u16,
    /// Internal name (`com/example/Outer$Inner`).
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<ClassMember>,
    pub methods: Vec<ClassMember>,
    pub signature: Option<String>,
    pub inner_classes: Vec<InnerClassInfo>,
}

#[derive(Debug, Clone)]
pub struct ClassMember {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
}

impl ClassMember {
    pub fn has_flag(&self, flag: u16) -> bool {
        self.access_flags & flag != 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClassInfo {
    pub inner_class: String,
    pub outer_class: Option<String>,
    /// `None` for anonymous classes.
    pub inner_name: Option<String>,
    pub access_flags: u16,
}

impl ClassFile {
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut reader = Reader::new(bytes);
        let magic = reader.read_u4()?;
        if magic != 0xCAFEBABE {
            return Err(Error::InvalidMagic(magic));
        }
        let minor_version = reader.read_u2()?;
        let major_version = reader.read_u2()?;
        let cp = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u2()?;
        let this_class = cp.get_class_name(reader.read_u2()?)?;
        let super_class = optional(reader.read_u2()?, |idx| cp.get_class_name(idx))?;
        let interfaces = table(&mut reader, |r| cp.get_class_name(r.read_u2()?))?;
        let fields = table(&mut reader, |r| ClassMember::read(r, &cp))?;
        let methods = table(&mut reader, |r| ClassMember::read(r, &cp))?;

        let mut signature = None;
        let mut inner_classes = Vec::new();
        for attribute in table(&mut reader, |r| Attribute::read(r, &cp, true))? {
            match attribute {
                Attribute::Signature(text) => signature = Some(text),
                Attribute::InnerClasses(entries) => inner_classes.extend(entries),
                Attribute::Skipped => {}
            }
        }
        reader.ensure_empty()?;

        Ok(Self {
            minor_version,
            major_version,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            signature,
            inner_classes,
        })
    }

    pub fn has_flag(&self, flag: u16) -> bool {
        self.access_flags & flag != 0
    }

    /// The `InnerClasses` entry describing this class itself, if it is nested.
    pub fn own_inner_class_info(&self) -> Option<&InnerClassInfo> {
        self.inner_classes
            .iter()
            .find(|info| info.inner_class == self.this_class)
    }

    /// Internal names of member classes declared directly in this class.
    pub fn member_classes(&self) -> impl Iterator<Item = &str> {
        self.inner_classes.iter().filter_map(move |info| {
            (info.outer_class.as_deref() == Some(self.this_class.as_str())
                && info.inner_name.is_some())
            .then_some(info.inner_class.as_str())
        })
    }
}

impl ClassMember {
    fn read(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let access_flags = reader.read_u2()?;
        let name = cp.get_utf8(reader.read_u2()?)?.to_string();
        let descriptor = cp.get_utf8(reader.read_u2()?)?.to_string();
        let signature = table(reader, |r| Attribute::read(r, cp, false))?
            .into_iter()
            .filter_map(|attribute| match attribute {
                Attribute::Signature(text) => Some(text),
                _ => None,
            })
            .last();
        Ok(Self {
            access_flags,
            name,
            descriptor,
            signature,
        })
    }
}

impl InnerClassInfo {
    fn read(reader: &mut Reader<'_>, cp: &ConstantPool) -> Result<Self> {
        let inner_class = cp.get_class_name(reader.read_u2()?)?;
        let outer_class = optional(reader.read_u2()?, |idx| cp.get_class_name(idx))?;
        let inner_name = optional(reader.read_u2()?, |idx| cp.get_utf8(idx).map(str::to_string))?;
        let access_flags = reader.read_u2()?;
        Ok(Self {
            inner_class,
            outer_class,
            inner_name,
            access_flags,
        })
    }
}

/// The attributes the type model reads. Anything else, bytecode included,
/// is skipped by its length.
enum Attribute {
    Signature(String),
    InnerClasses(Vec<InnerClassInfo>),
    Skipped,
}

impl Attribute {
    /// `InnerClasses` only counts on the class itself.
    fn read(reader: &mut Reader<'_>, cp: &ConstantPool, on_class: bool) -> Result<Self> {
        let name = cp.get_utf8(reader.read_u2()?)?;
        let length = reader.read_u4()? as usize;
        let mut body = Reader::new(reader.read_bytes(length)?);
        let (attribute, kind) = match name {
            "Signature" => (Attribute::Signature(cp.get_utf8(body.read_u2()?)?.to_string()), "Signature"),
            "InnerClasses" if on_class => (
                Attribute::InnerClasses(table(&mut body, |r| InnerClassInfo::read(r, cp))?),
                "InnerClasses",
            ),
            _ => return Ok(Attribute::Skipped),
        };
        body.ensure_empty()
            .map_err(|_| Error::MalformedAttribute(kind))?;
        Ok(attribute)
    }
}

/// Reads a table prefixed by its `u2` entry count.
fn table<'a, T>(reader: &mut Reader<'a>, mut entry: impl FnMut(&mut Reader<'a>) -> Result<T>) -> Result<Vec<T>> {
    let count = reader.read_u2()? as usize;
    (0..count).map(|_| entry(reader)).collect()
}

/// Constant-pool index `0` means absent.
fn optional<T>(index: u16, resolve: impl FnOnce(u16) -> Result<T>) -> Result<Option<T>> {
    match index {
        0 => Ok(None),
        idx => resolve(idx).map(Some),
    }
}
