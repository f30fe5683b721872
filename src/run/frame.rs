use crate::{
    cursor::ByteCursor,
    deserialize::MethodInfo,
    errors::RuntimeError,
    run::value::Value,
};

/// One method activation.
///
/// Locals start out unset; reading one before it is written is a
/// `RuntimeError::UninitializedLocal` rather than a garbage value.
#[derive(Debug, Clone)]
pub struct Frame<'a> {
    local_variables: Vec<Option<Value>>,
    operand_stack: Vec<Value>,
    code: ByteCursor<'a>,
    /// Offset of the opcode being executed; the cursor may already be past
    /// its operands.
    pc: usize,
}

impl<'a> Frame<'a> {
    pub fn new(method: &'a MethodInfo) -> Result<Frame<'a>, RuntimeError> {
        let code = method
            .code()
            .ok_or_else(|| RuntimeError::MethodHasNoCode(method.to_string()))?;

        Ok(Frame {
            local_variables: vec![None; code.max_locals as usize],
            operand_stack: Vec::with_capacity(code.max_stack as usize),
            code: ByteCursor::new(&code.code),
            pc: 0,
        })
    }

    /// A frame without code or locals, whose operand stack carries the
    /// arguments of a top-level invocation and receives its result.
    pub fn invoker() -> Frame<'a> {
        Frame {
            local_variables: vec![],
            operand_stack: vec![],
            code: ByteCursor::new(&[]),
            pc: 0,
        }
    }

    pub fn pc(&self) -> usize {
        self.pc
    }

    pub fn max_locals(&self) -> usize {
        self.local_variables.len()
    }

    pub fn operand_stack(&self) -> &[Value] {
        &self.operand_stack
    }

    pub fn local(&self, index: usize) -> Result<Value, RuntimeError> {
        self.local_variables
            .get(index)
            .copied()
            .ok_or(RuntimeError::LocalOutOfRange {
                index,
                max_locals: self.max_locals(),
            })?
            .ok_or(RuntimeError::UninitializedLocal(index))
    }

    pub fn set_local(&mut self, index: usize, value: Value) -> Result<(), RuntimeError> {
        let max_locals = self.max_locals();
        let slot = self
            .local_variables
            .get_mut(index)
            .ok_or(RuntimeError::LocalOutOfRange { index, max_locals })?;
        *slot = Some(value);
        Ok(())
    }

    /// Assign `values` to slots 0, 1, ...
    pub fn set_locals(&mut self, values: Vec<Value>) -> Result<(), RuntimeError> {
        for (index, value) in values.into_iter().enumerate() {
            self.set_local(index, value)?;
        }
        Ok(())
    }

    pub fn push_operand(&mut self, value: Value) {
        self.operand_stack.push(value);
    }

    pub fn pop_operand(&mut self) -> Result<Value, RuntimeError> {
        self.operand_stack
            .pop()
            .ok_or(RuntimeError::OperandStackUnderflow)
    }

    pub fn pop_int(&mut self) -> Result<i32, RuntimeError> {
        self.pop_operand()?.as_int()
    }

    /// Pop `n` values, returned in the order they were pushed.
    pub fn pop_operands(&mut self, n: usize) -> Result<Vec<Value>, RuntimeError> {
        let len = self.operand_stack.len();
        if n > len {
            return Err(RuntimeError::OperandStackUnderflow);
        }
        Ok(self.operand_stack.split_off(len - n))
    }

    /// Read the next opcode, remembering its offset as the new pc.
    pub fn next_instruction(&mut self) -> Result<u8, RuntimeError> {
        self.pc = self.code.position();
        Ok(self.code.read_u8()?)
    }

    pub fn next_param_u8(&mut self) -> Result<u8, RuntimeError> {
        Ok(self.code.read_u8()?)
    }

    pub fn next_param_i8(&mut self) -> Result<i8, RuntimeError> {
        Ok(self.code.read_i8()?)
    }

    pub fn next_param_u16(&mut self) -> Result<u16, RuntimeError> {
        Ok(self.code.read_u16()?)
    }

    pub fn next_param_i16(&mut self) -> Result<i16, RuntimeError> {
        Ok(self.code.read_i16()?)
    }

    /// Move both the pc and the code cursor to `pc`.
    pub fn jump_to(&mut self, pc: usize) -> Result<(), RuntimeError> {
        self.code.seek(pc)?;
        self.pc = pc;
        Ok(())
    }

    /// Jump relative to the address of the current opcode.
    pub fn branch(&mut self, offset: i16) -> Result<(), RuntimeError> {
        let out_of_range = RuntimeError::BranchOutOfRange {
            pc: self.pc,
            offset,
            len: self.code.len(),
        };
        let target = self
            .pc
            .checked_add_signed(offset as isize)
            .filter(|target| *target < self.code.len())
            .ok_or(out_of_range)?;
        self.jump_to(target)
    }
}
