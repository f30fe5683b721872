use thiserror::Error;

/// A cursor read or seek that would leave the underlying buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("out of range: {requested} byte(s) at position {position} in buffer of length {len}")]
pub struct OutOfRange {
    pub position: usize,
    pub requested: usize,
    pub len: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstantPoolError {
    /// The slot is empty, out of range, or holds something other than `CONSTANT_Utf8`
    #[error("constant pool entry #{0} is not a Utf8 entry")]
    NotUtf8(u16),
}

/// Failures while decoding a class file. Decoding is all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassFileError {
    #[error("bad magic number {0:#010x}")]
    BadMagic(u32),

    #[error("truncated class file: {0}")]
    TruncatedClassFile(#[from] OutOfRange),

    #[error("unsupported constant pool tag {tag} at index {index}")]
    UnsupportedConstantTag { tag: u8, index: u16 },

    #[error("malformed constant reference: {0}")]
    MalformedConstantReference(#[from] ConstantPoolError),

    #[error("constant pool entry #{0} is not valid UTF-8")]
    InvalidUtf8(u16),
}

/// Failures while interpreting bytecode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("method {0} has no Code attribute")]
    MethodHasNoCode(String),

    #[error("operand stack underflow")]
    OperandStackUnderflow,

    #[error("type mismatch: expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("opcode {0:#04x} is not implemented")]
    UnimplementedOpcode(u8),

    #[error("call stack is empty")]
    EmptyCallStack,

    #[error("local variable index {index} out of range (max_locals = {max_locals})")]
    LocalOutOfRange { index: usize, max_locals: usize },

    #[error("local variable {0} read before it was written")]
    UninitializedLocal(usize),

    #[error("branch from pc {pc} by {offset} leaves the method body of {len} byte(s)")]
    BranchOutOfRange { pc: usize, offset: i16, len: usize },

    #[error("instruction stream ended unexpectedly: {0}")]
    InstructionOutOfRange(#[from] OutOfRange),

    #[error("malformed method descriptor {0:?}")]
    BadDescriptor(String),
}

/// Anything that can go wrong during one top-level `Vm::execute` call.
#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read class file: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    ClassFile(#[from] ClassFileError),

    #[error("method {name}{descriptor} not found")]
    MethodNotFound { name: String, descriptor: String },

    #[error(transparent)]
    Runtime(#[from] RuntimeError),
}
