//! Execution of decoded methods.

use std::path::Path;

use log::{debug, info};

use crate::{deserialize::ClassFile, errors::Error};

pub mod frame;
pub mod instruction;
pub mod thread;
pub mod value;

use self::{frame::Frame, instruction::InstructionSet, thread::Thread, value::Value};

/// Runs one top-level method invocation per `execute` call, each on a fresh
/// thread. The instruction table is built once and shared by every thread.
#[derive(Debug, Default)]
pub struct Vm {
    instructions: InstructionSet,
}

impl Vm {
    pub fn new() -> Vm {
        Vm {
            instructions: InstructionSet::new(),
        }
    }

    /// Decode the class file at `path` and run `name` + `descriptor` with
    /// integer `arguments`.
    pub fn execute<P: AsRef<Path>>(
        &self,
        path: P,
        name: &str,
        descriptor: &str,
        arguments: &[i32],
    ) -> Result<Value, Error> {
        let class_file = ClassFile::from_path(path)?;
        self.execute_class(&class_file, name, descriptor, arguments)
    }

    pub fn execute_class(
        &self,
        class_file: &ClassFile,
        name: &str,
        descriptor: &str,
        arguments: &[i32],
    ) -> Result<Value, Error> {
        let method = class_file
            .find_method(name, descriptor)
            .ok_or_else(|| Error::MethodNotFound {
                name: name.to_owned(),
                descriptor: descriptor.to_owned(),
            })?;
        info!("executing {method} with {arguments:?}");

        let mut thread = Thread::new(&self.instructions);
        let mut invoker = Frame::invoker();
        for argument in arguments {
            invoker.push_operand(Value::Int(*argument));
        }
        thread.push_frame(invoker);

        thread.invoke(method)?;

        let result = thread.current_frame()?.pop_operand()?;
        debug!("{method} returned {result}");
        Ok(result)
    }
}
