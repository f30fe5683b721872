//! Semantics of the supported opcodes, looked up through a 256-slot table.
//!
//! https://docs.oracle.com/javase/specs/jvms/se11/html/jvms-6.html
//!
//! Integer arithmetic wraps on overflow.

use std::fmt;

use log::trace;

use crate::{
    errors::RuntimeError,
    run::{thread::Thread, value::Value},
};

use self::opcode::*;

pub mod opcode {
    pub const NOP: u8 = 0x00;
    pub const ICONST_0: u8 = 0x03;
    pub const ICONST_1: u8 = 0x04;
    pub const ILOAD_0: u8 = 0x1a;
    pub const ILOAD_1: u8 = 0x1b;
    pub const ILOAD_2: u8 = 0x1c;
    pub const ISTORE_1: u8 = 0x3c;
    pub const ISTORE_2: u8 = 0x3d;
    pub const IADD: u8 = 0x60;
    pub const IINC: u8 = 0x84;
    pub const IF_ICMPGT: u8 = 0xa3;
    pub const GOTO: u8 = 0xa7;
    pub const IRETURN: u8 = 0xac;
}

/// Executes one instruction against the current frame of a thread. The
/// opcode byte has already been consumed; operands have not.
pub type Instruction = fn(&mut Thread<'_>) -> Result<(), RuntimeError>;

#[derive(Clone, Copy)]
struct Entry {
    mnemonic: &'static str,
    execute: Instruction,
}

pub struct InstructionSet {
    table: [Option<Entry>; 256],
}

impl InstructionSet {
    pub fn new() -> InstructionSet {
        let mut set = InstructionSet { table: [None; 256] };

        set.register(NOP, "nop", nop);

        set.register(ICONST_0, "iconst_0", iconst::<0>);
        set.register(ICONST_1, "iconst_1", iconst::<1>);

        set.register(ILOAD_0, "iload_0", iload::<0>);
        set.register(ILOAD_1, "iload_1", iload::<1>);
        set.register(ILOAD_2, "iload_2", iload::<2>);

        set.register(ISTORE_1, "istore_1", istore::<1>);
        set.register(ISTORE_2, "istore_2", istore::<2>);

        set.register(IADD, "iadd", iadd);
        set.register(IINC, "iinc", iinc);

        set.register(IF_ICMPGT, "if_icmpgt", if_icmpgt);
        set.register(GOTO, "goto", goto);

        set.register(IRETURN, "ireturn", ireturn);

        set
    }

    fn register(&mut self, opcode: u8, mnemonic: &'static str, execute: Instruction) {
        self.table[opcode as usize] = Some(Entry { mnemonic, execute });
    }

    pub fn get(&self, opcode: u8) -> Option<Instruction> {
        self.table[opcode as usize].map(|entry| entry.execute)
    }

    pub fn mnemonic(&self, opcode: u8) -> Option<&'static str> {
        self.table[opcode as usize].map(|entry| entry.mnemonic)
    }

    /// Fetch the next opcode of the current frame and execute it.
    pub fn step(&self, thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
        let frame = thread.current_frame()?;
        let opcode = frame.next_instruction()?;
        let entry = self.table[opcode as usize].ok_or(RuntimeError::UnimplementedOpcode(opcode))?;
        trace!(
            "{:>4}: {:<10} {:?}",
            frame.pc(),
            entry.mnemonic,
            frame.operand_stack()
        );
        (entry.execute)(thread)
    }
}

impl Default for InstructionSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for InstructionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.table.iter().flatten().map(|entry| entry.mnemonic))
            .finish()
    }
}

fn nop(_thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
    Ok(())
}

// iconst_<n>
fn iconst<const N: i32>(thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
    thread.current_frame()?.push_operand(Value::Int(N));
    Ok(())
}

// iload_<n>
fn iload<const N: usize>(thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
    let frame = thread.current_frame()?;
    let value = frame.local(N)?;
    value.as_int()?;
    frame.push_operand(value);
    Ok(())
}

// istore_<n>
fn istore<const N: usize>(thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
    let frame = thread.current_frame()?;
    let value = frame.pop_int()?;
    frame.set_local(N, Value::Int(value))
}

fn iadd(thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
    let frame = thread.current_frame()?;
    let value2 = frame.pop_int()?;
    let value1 = frame.pop_int()?;
    frame.push_operand(Value::Int(value1.wrapping_add(value2)));
    Ok(())
}

fn iinc(thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
    let frame = thread.current_frame()?;
    let index = frame.next_param_u8()? as usize;
    let increment = frame.next_param_i8()? as i32;
    let value = frame.local(index)?.as_int()?;
    frame.set_local(index, Value::Int(value.wrapping_add(increment)))
}

fn if_icmpgt(thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
    let frame = thread.current_frame()?;
    let offset = frame.next_param_i16()?;
    let value2 = frame.pop_int()?;
    let value1 = frame.pop_int()?;
    if value1 > value2 {
        frame.branch(offset)?;
    }
    Ok(())
}

fn goto(thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
    let frame = thread.current_frame()?;
    let offset = frame.next_param_i16()?;
    frame.branch(offset)
}

fn ireturn(thread: &mut Thread<'_>) -> Result<(), RuntimeError> {
    let value = thread.current_frame()?.pop_int()?;
    thread.pop_frame()?;
    thread.current_frame()?.push_operand(Value::Int(value));
    Ok(())
}
