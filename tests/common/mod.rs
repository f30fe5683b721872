//! A small class file writer for building test inputs byte by byte.

#![allow(dead_code)]

use byteorder::{BigEndian, WriteBytesExt};

pub const ACC_PUBLIC_STATIC: u16 = 0x0009;
pub const ACC_PUBLIC_ABSTRACT: u16 = 0x0401;

/// An attribute body, written after its name index and length.
pub struct RawAttribute {
    pub name: String,
    pub info: Vec<u8>,
}

pub struct Code {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table_length: u16,
    pub attributes: Vec<RawAttribute>,
}

impl Code {
    pub fn new(max_stack: u16, max_locals: u16, code: Vec<u8>) -> Code {
        Code {
            max_stack,
            max_locals,
            code,
            exception_table_length: 0,
            attributes: vec![],
        }
    }
}

struct Member {
    access_flags: u16,
    name_index: u16,
    descriptor_index: u16,
    attributes: Vec<(u16, Vec<u8>)>,
}

pub struct ClassFileWriter {
    constant_pool_count: u16,
    constant_pool: Vec<u8>,
    this_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Member>,
    methods: Vec<Member>,
}

impl ClassFileWriter {
    pub fn new(class_name: &str) -> ClassFileWriter {
        let mut writer = ClassFileWriter {
            constant_pool_count: 1,
            constant_pool: vec![],
            this_class: 0,
            interfaces: vec![],
            fields: vec![],
            methods: vec![],
        };
        writer.this_class = writer.class(class_name);
        writer
    }

    fn next_index(&mut self) -> u16 {
        let index = self.constant_pool_count;
        self.constant_pool_count += 1;
        index
    }

    pub fn utf8(&mut self, text: &str) -> u16 {
        self.constant_pool.write_u8(1).unwrap();
        self.constant_pool
            .write_u16::<BigEndian>(text.len() as u16)
            .unwrap();
        self.constant_pool.extend_from_slice(text.as_bytes());
        self.next_index()
    }

    pub fn class(&mut self, name: &str) -> u16 {
        let name_index = self.utf8(name);
        self.constant_pool.write_u8(7).unwrap();
        self.constant_pool.write_u16::<BigEndian>(name_index).unwrap();
        self.next_index()
    }

    pub fn name_and_type(&mut self, name: &str, descriptor: &str) -> u16 {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        self.constant_pool.write_u8(12).unwrap();
        self.constant_pool.write_u16::<BigEndian>(name_index).unwrap();
        self.constant_pool
            .write_u16::<BigEndian>(descriptor_index)
            .unwrap();
        self.next_index()
    }

    pub fn method_ref(&mut self, name: &str, descriptor: &str) -> u16 {
        let class_index = self.this_class;
        let name_and_type_index = self.name_and_type(name, descriptor);
        self.constant_pool.write_u8(10).unwrap();
        self.constant_pool.write_u16::<BigEndian>(class_index).unwrap();
        self.constant_pool
            .write_u16::<BigEndian>(name_and_type_index)
            .unwrap();
        self.next_index()
    }

    /// Append raw bytes to the constant pool, counting them as one entry.
    pub fn raw_constant(&mut self, bytes: &[u8]) -> u16 {
        self.constant_pool.extend_from_slice(bytes);
        self.next_index()
    }

    pub fn interface(&mut self, name: &str) {
        let index = self.class(name);
        self.interfaces.push(index);
    }

    fn attribute(&mut self, attribute: RawAttribute) -> (u16, Vec<u8>) {
        (self.utf8(&attribute.name), attribute.info)
    }

    fn code_attribute(&mut self, code: Code) -> (u16, Vec<u8>) {
        let mut info = vec![];
        info.write_u16::<BigEndian>(code.max_stack).unwrap();
        info.write_u16::<BigEndian>(code.max_locals).unwrap();
        info.write_u32::<BigEndian>(code.code.len() as u32).unwrap();
        info.extend_from_slice(&code.code);
        info.write_u16::<BigEndian>(code.exception_table_length)
            .unwrap();
        for i in 0..code.exception_table_length {
            for _ in 0..4 {
                info.write_u16::<BigEndian>(i).unwrap();
            }
        }
        let nested: Vec<(u16, Vec<u8>)> = code
            .attributes
            .into_iter()
            .map(|attribute| self.attribute(attribute))
            .collect();
        write_attributes(&mut info, &nested);
        (self.utf8("Code"), info)
    }

    pub fn field(&mut self, name: &str, descriptor: &str, attributes: Vec<RawAttribute>) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let attributes = attributes
            .into_iter()
            .map(|attribute| self.attribute(attribute))
            .collect();
        self.fields.push(Member {
            access_flags: 0x0002,
            name_index,
            descriptor_index,
            attributes,
        });
    }

    pub fn method(
        &mut self,
        access_flags: u16,
        name: &str,
        descriptor: &str,
        code: Option<Code>,
        extra_attributes: Vec<RawAttribute>,
    ) {
        let name_index = self.utf8(name);
        let descriptor_index = self.utf8(descriptor);
        let mut attributes: Vec<(u16, Vec<u8>)> = extra_attributes
            .into_iter()
            .map(|attribute| self.attribute(attribute))
            .collect();
        if let Some(code) = code {
            attributes.push(self.code_attribute(code));
        }
        self.methods.push(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        });
    }

    /// A method whose constant pool references are taken as given.
    pub fn raw_method(
        &mut self,
        access_flags: u16,
        name_index: u16,
        descriptor_index: u16,
        attributes: Vec<(u16, Vec<u8>)>,
    ) {
        self.methods.push(Member {
            access_flags,
            name_index,
            descriptor_index,
            attributes,
        });
    }

    /// A public static method with a single `Code` attribute.
    pub fn static_method(&mut self, name: &str, descriptor: &str, code: Code) {
        self.method(ACC_PUBLIC_STATIC, name, descriptor, Some(code), vec![]);
    }

    pub fn finish(&self) -> Vec<u8> {
        let mut out = vec![];
        out.write_u32::<BigEndian>(0xcafebabe).unwrap();
        out.write_u16::<BigEndian>(0).unwrap();
        out.write_u16::<BigEndian>(55).unwrap();

        out.write_u16::<BigEndian>(self.constant_pool_count).unwrap();
        out.extend_from_slice(&self.constant_pool);

        out.write_u16::<BigEndian>(0x0021).unwrap();
        out.write_u16::<BigEndian>(self.this_class).unwrap();
        out.write_u16::<BigEndian>(0).unwrap();

        out.write_u16::<BigEndian>(self.interfaces.len() as u16)
            .unwrap();
        for interface in &self.interfaces {
            out.write_u16::<BigEndian>(*interface).unwrap();
        }

        write_members(&mut out, &self.fields);
        write_members(&mut out, &self.methods);

        // class attributes: a SourceFile-shaped entry that the decoder never reads
        out.write_u16::<BigEndian>(1).unwrap();
        out.write_u16::<BigEndian>(0xffff).unwrap();
        out.write_u32::<BigEndian>(2).unwrap();
        out.write_u16::<BigEndian>(0xffff).unwrap();
        out
    }
}

fn write_attributes(out: &mut Vec<u8>, attributes: &[(u16, Vec<u8>)]) {
    out.write_u16::<BigEndian>(attributes.len() as u16).unwrap();
    for (name_index, info) in attributes {
        out.write_u16::<BigEndian>(*name_index).unwrap();
        out.write_u32::<BigEndian>(info.len() as u32).unwrap();
        out.extend_from_slice(info);
    }
}

fn write_members(out: &mut Vec<u8>, members: &[Member]) {
    out.write_u16::<BigEndian>(members.len() as u16).unwrap();
    for member in members {
        out.write_u16::<BigEndian>(member.access_flags).unwrap();
        out.write_u16::<BigEndian>(member.name_index).unwrap();
        out.write_u16::<BigEndian>(member.descriptor_index).unwrap();
        write_attributes(out, &member.attributes);
    }
}

/// `static int sum(int n)`: adds up `0..n`.
///
/// ```text
///  0: iconst_0
///  1: istore_1          // sum = 0
///  2: iconst_0
///  3: istore_2          // i = 0
///  4: iload_0           // loop:
///  5: iload_2
///  6: if_icmpgt +6      // n > i -> body
///  9: iload_1
/// 10: ireturn
/// 11: nop
/// 12: iload_1           // body:
/// 13: iload_2
/// 14: iadd
/// 15: istore_1          // sum += i
/// 16: iinc 2, 1         // i += 1
/// 19: goto -15          // -> loop
/// ```
pub fn sum_code() -> Code {
    Code::new(
        2,
        3,
        vec![
            0x03, 0x3c, 0x03, 0x3d, 0x1a, 0x1c, 0xa3, 0x00, 0x06, 0x1b, 0xac, 0x00, 0x1b, 0x1c,
            0x60, 0x3c, 0x84, 0x02, 0x01, 0xa7, 0xff, 0xf1,
        ],
    )
}
