use log::trace;

use crate::{
    deserialize::MethodInfo,
    descriptor::parse_method_descriptor,
    errors::RuntimeError,
    run::{frame::Frame, instruction::InstructionSet},
};

/// One interpreted call stack. The innermost frame is the current one.
#[derive(Debug)]
pub struct Thread<'a> {
    jvm_stack: Vec<Frame<'a>>,
    instructions: &'a InstructionSet,
}

impl<'a> Thread<'a> {
    pub fn new(instructions: &'a InstructionSet) -> Thread<'a> {
        Thread {
            jvm_stack: vec![],
            instructions,
        }
    }

    pub fn depth(&self) -> usize {
        self.jvm_stack.len()
    }

    pub fn current_frame(&mut self) -> Result<&mut Frame<'a>, RuntimeError> {
        self.jvm_stack
            .last_mut()
            .ok_or(RuntimeError::EmptyCallStack)
    }

    pub fn push_frame(&mut self, frame: Frame<'a>) {
        self.jvm_stack.push(frame);
    }

    pub fn pop_frame(&mut self) -> Result<Frame<'a>, RuntimeError> {
        self.jvm_stack.pop().ok_or(RuntimeError::EmptyCallStack)
    }

    /// Fetch and execute a single instruction of the current frame.
    pub fn step(&mut self) -> Result<(), RuntimeError> {
        let instructions = self.instructions;
        instructions.step(self)
    }

    /// Call `method` with arguments taken from the current frame's operand
    /// stack and run it until it returns into that frame.
    ///
    /// On failure the call stack is unwound back to the caller.
    pub fn invoke(&mut self, method: &'a MethodInfo) -> Result<(), RuntimeError> {
        let descriptor = parse_method_descriptor(&method.descriptor)?;
        let mut frame = Frame::new(method)?;

        let argument_count = descriptor.argument_count();
        if argument_count > frame.max_locals() {
            return Err(RuntimeError::LocalOutOfRange {
                index: frame.max_locals(),
                max_locals: frame.max_locals(),
            });
        }

        let caller_depth = self.depth();
        let arguments = self.current_frame()?.pop_operands(argument_count)?;
        trace!("invoke {method} with {arguments:?}");
        frame.set_locals(arguments)?;
        self.push_frame(frame);

        while self.depth() > caller_depth {
            if let Err(err) = self.step() {
                self.jvm_stack.truncate(caller_depth);
                return Err(err);
            }
        }

        Ok(())
    }
}
