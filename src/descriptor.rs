//! Method descriptors, e.g. `(II)I`.
//!
//! https://docs.oracle.com/javase/specs/jvms/se11/html/jvms-4.html#jvms-4.3

use std::{iter::Peekable, str::Chars};

use crate::errors::RuntimeError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    Byte,
    Char,
    Double,
    Float,
    Integer,
    LongInteger,
    ClassInstance(String),
    Short,
    Boolean,
    Array(Box<FieldType>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReturnDescriptor {
    FieldType(FieldType),
    VoidDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub parameter_descriptors: Vec<FieldType>,
    pub return_descriptor: ReturnDescriptor,
}

impl MethodDescriptor {
    /// Number of arguments an invocation pops off the caller's operand stack.
    pub fn argument_count(&self) -> usize {
        self.parameter_descriptors.len()
    }
}

pub fn parse_method_descriptor(method_descriptor: &str) -> Result<MethodDescriptor, RuntimeError> {
    let bad = || RuntimeError::BadDescriptor(method_descriptor.to_owned());
    let mut chars = method_descriptor.chars().peekable();

    if chars.next() != Some('(') {
        return Err(bad());
    }

    let mut parameter_descriptors = vec![];
    loop {
        match chars.peek() {
            Some(')') => {
                chars.next();
                break;
            }
            Some(_) => parameter_descriptors.push(parse_field_type(&mut chars).ok_or_else(bad)?),
            None => return Err(bad()),
        }
    }

    let return_descriptor = if chars.peek() == Some(&'V') {
        chars.next();
        ReturnDescriptor::VoidDescriptor
    } else {
        ReturnDescriptor::FieldType(parse_field_type(&mut chars).ok_or_else(bad)?)
    };

    if chars.next().is_some() {
        return Err(bad());
    }

    Ok(MethodDescriptor {
        parameter_descriptors,
        return_descriptor,
    })
}

fn parse_field_type(chars: &mut Peekable<Chars>) -> Option<FieldType> {
    let field_type = match chars.next()? {
        'B' => FieldType::Byte,
        'C' => FieldType::Char,
        'D' => FieldType::Double,
        'F' => FieldType::Float,
        'I' => FieldType::Integer,
        'J' => FieldType::LongInteger,
        'S' => FieldType::Short,
        'Z' => FieldType::Boolean,
        'L' => {
            let mut name = String::new();
            loop {
                match chars.next()? {
                    ';' => break,
                    c => name.push(c),
                }
            }
            if name.is_empty() {
                return None;
            }
            FieldType::ClassInstance(name)
        }
        '[' => FieldType::Array(Box::new(parse_field_type(chars)?)),
        _ => return None,
    };
    Some(field_type)
}
