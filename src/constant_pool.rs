use log::{debug, trace};

use crate::{
    cursor::ByteCursor,
    errors::{ClassFileError, ConstantPoolError},
};

const CONSTANT_UTF8: u8 = 1;
const CONSTANT_CLASS: u8 = 7;
const CONSTANT_METHODREF: u8 = 10;
const CONSTANT_NAME_AND_TYPE: u8 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CPInfo {
    // https://docs.oracle.com/javase/specs/jvms/se11/html/jvms-4.html#jvms-4.4.7
    Utf8(String),
    // https://docs.oracle.com/javase/specs/jvms/se11/html/jvms-4.html#jvms-4.4.1
    ClassRef {
        name_index: u16,
    },
    // https://docs.oracle.com/javase/specs/jvms/se11/html/jvms-4.html#jvms-4.4.2
    MethodRef {
        class_index: u16,
        name_and_type_index: u16,
    },
    // https://docs.oracle.com/javase/specs/jvms/se11/html/jvms-4.html#jvms-4.4.6
    NameAndType {
        name_index: u16,
        descriptor_index: u16,
    },
}

/// The 1-indexed constant table of one class file. Slot 0 is never populated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConstantPool {
    entries: Vec<Option<CPInfo>>,
}

impl ConstantPool {
    /// Decode `constant_pool_count` followed by `constant_pool_count - 1` entries.
    pub fn deserialize(rdr: &mut ByteCursor) -> Result<ConstantPool, ClassFileError> {
        let constant_pool_count = rdr.read_u16()?;
        debug!("constant_pool_count: {constant_pool_count}");

        let mut entries = Vec::with_capacity(constant_pool_count as usize);
        entries.push(None);
        for index in 1..constant_pool_count {
            let cp_info = deserialize_cp_info(rdr, index)?;
            trace!("#{index} = {cp_info:?}");
            entries.push(Some(cp_info));
        }

        Ok(ConstantPool { entries })
    }

    /// Number of slots, including the unused slot 0.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn get(&self, index: u16) -> Option<&CPInfo> {
        self.entries.get(index as usize).and_then(Option::as_ref)
    }

    pub fn utf8(&self, index: u16) -> Result<&str, ConstantPoolError> {
        match self.get(index) {
            Some(CPInfo::Utf8(text)) => Ok(text),
            _ => Err(ConstantPoolError::NotUtf8(index)),
        }
    }
}

impl FromIterator<CPInfo> for ConstantPool {
    /// Collect entries into slots 1, 2, ...
    fn from_iter<I: IntoIterator<Item = CPInfo>>(iter: I) -> Self {
        let mut entries = vec![None];
        entries.extend(iter.into_iter().map(Some));
        ConstantPool { entries }
    }
}

fn deserialize_cp_info(rdr: &mut ByteCursor, index: u16) -> Result<CPInfo, ClassFileError> {
    let tag = rdr.read_u8()?;

    match tag {
        CONSTANT_UTF8 => {
            let length = rdr.read_u16()?;
            let bytes = rdr.read_bytes(length.into())?;
            let text = std::str::from_utf8(bytes).map_err(|_| ClassFileError::InvalidUtf8(index))?;
            Ok(CPInfo::Utf8(text.to_owned()))
        }
        CONSTANT_CLASS => {
            let name_index = rdr.read_u16()?;
            Ok(CPInfo::ClassRef { name_index })
        }
        CONSTANT_METHODREF => {
            let class_index = rdr.read_u16()?;
            let name_and_type_index = rdr.read_u16()?;
            Ok(CPInfo::MethodRef {
                class_index,
                name_and_type_index,
            })
        }
        CONSTANT_NAME_AND_TYPE => {
            let name_index = rdr.read_u16()?;
            let descriptor_index = rdr.read_u16()?;
            Ok(CPInfo::NameAndType {
                name_index,
                descriptor_index,
            })
        }
        _ => Err(ClassFileError::UnsupportedConstantTag { tag, index }),
    }
}
