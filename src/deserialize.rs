//! Decoding of the class file format.
//!
//! https://docs.oracle.com/javase/specs/jvms/se11/html/jvms-4.html
//!
//! Only the constant pool and the `Code` attribute of each method are kept.
//! Interfaces, fields and every other attribute are stepped over using their
//! counts and lengths, and decoding stops right after the methods section.

use std::{fmt, fs, path::Path};

use log::debug;

use crate::{constant_pool::ConstantPool, cursor::ByteCursor, errors::ClassFileError, Error};

pub const MAGIC: u32 = 0xcafebabe;

const CODE_ATTRIBUTE: &str = "Code";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Code(CodeAttribute),
    /// Any attribute other than `Code`; its bytes were skipped
    Other,
}

impl Attribute {
    pub fn as_code(&self) -> Option<&CodeAttribute> {
        if let Self::Code(code) = self {
            Some(code)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub attributes: Vec<Attribute>,
}

impl MethodInfo {
    /// The method body, absent for abstract and native methods.
    pub fn code(&self) -> Option<&CodeAttribute> {
        self.attributes.iter().find_map(Attribute::as_code)
    }
}

impl fmt::Display for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name, self.descriptor)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassFile {
    pub constant_pool: ConstantPool,
    pub methods: Vec<MethodInfo>,
}

impl ClassFile {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<ClassFile, Error> {
        let bytes = fs::read(path.as_ref())?;
        debug!("read {} bytes from {}", bytes.len(), path.as_ref().display());
        Ok(deserialize_class_file(&bytes)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<ClassFile, ClassFileError> {
        deserialize_class_file(bytes)
    }

    pub fn methods(&self) -> &[MethodInfo] {
        &self.methods
    }

    /// First method whose name and descriptor both match exactly.
    pub fn find_method(&self, name: &str, descriptor: &str) -> Option<&MethodInfo> {
        self.methods
            .iter()
            .find(|method| method.name == name && method.descriptor == descriptor)
    }
}

pub fn deserialize_class_file(bytes: &[u8]) -> Result<ClassFile, ClassFileError> {
    let mut rdr = ByteCursor::new(bytes);

    let magic = rdr.read_u32()?;
    if magic != MAGIC {
        return Err(ClassFileError::BadMagic(magic));
    }

    // minor_version, major_version
    rdr.skip(4)?;

    let constant_pool = ConstantPool::deserialize(&mut rdr)?;

    // access_flags, this_class, super_class
    rdr.skip(6)?;

    let interfaces_count = rdr.read_u16()?;
    rdr.skip(2 * interfaces_count as usize)?;

    // field_info and method_info share the same layout
    let fields = deserialize_members(&mut rdr, &constant_pool)?;
    debug!("skipped {} field(s)", fields.len());

    let methods = deserialize_members(&mut rdr, &constant_pool)?;
    for method in methods.iter() {
        debug!("method: {method} (access_flags: 0x{:04x})", method.access_flags);
    }

    Ok(ClassFile {
        constant_pool,
        methods,
    })
}

fn deserialize_members(
    rdr: &mut ByteCursor,
    constant_pool: &ConstantPool,
) -> Result<Vec<MethodInfo>, ClassFileError> {
    let count = rdr.read_u16()?;
    let mut members = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access_flags = rdr.read_u16()?;
        let name = constant_pool.utf8(rdr.read_u16()?)?.to_owned();
        let descriptor = constant_pool.utf8(rdr.read_u16()?)?.to_owned();
        let attributes = deserialize_attributes(rdr, constant_pool)?;

        members.push(MethodInfo {
            access_flags,
            name,
            descriptor,
            attributes,
        })
    }
    Ok(members)
}

fn deserialize_attributes(
    rdr: &mut ByteCursor,
    constant_pool: &ConstantPool,
) -> Result<Vec<Attribute>, ClassFileError> {
    let attributes_count = rdr.read_u16()?;
    let mut attributes = Vec::with_capacity(attributes_count as usize);
    for _ in 0..attributes_count {
        let attribute_name = constant_pool.utf8(rdr.read_u16()?)?;
        let attribute_length = rdr.read_u32()?;

        if attribute_name == CODE_ATTRIBUTE {
            attributes.push(Attribute::Code(deserialize_code(rdr, constant_pool)?));
        } else {
            rdr.skip(attribute_length as usize)?;
            attributes.push(Attribute::Other);
        }
    }
    Ok(attributes)
}

fn deserialize_code(
    rdr: &mut ByteCursor,
    constant_pool: &ConstantPool,
) -> Result<CodeAttribute, ClassFileError> {
    let max_stack = rdr.read_u16()?;
    let max_locals = rdr.read_u16()?;
    let code_length = rdr.read_u32()?;
    let code = rdr.read_bytes(code_length as usize)?.to_vec();

    // start_pc, end_pc, handler_pc, catch_type
    let exception_table_length = rdr.read_u16()?;
    rdr.skip(8 * exception_table_length as usize)?;

    // LineNumberTable, StackMapTable, ...
    skip_attributes(rdr, constant_pool)?;

    Ok(CodeAttribute {
        max_stack,
        max_locals,
        code,
    })
}

/// Step over an attribute list by its lengths alone, without looking inside
/// any entry.
fn skip_attributes(
    rdr: &mut ByteCursor,
    constant_pool: &ConstantPool,
) -> Result<(), ClassFileError> {
    let attributes_count = rdr.read_u16()?;
    for _ in 0..attributes_count {
        constant_pool.utf8(rdr.read_u16()?)?;
        let attribute_length = rdr.read_u32()?;
        rdr.skip(attribute_length as usize)?;
    }
    Ok(())
}
