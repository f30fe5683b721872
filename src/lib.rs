//! A minimal bytecode virtual machine.
//!
//! Decodes a class file into its constant pool and method table, then
//! interprets a small subset of the integer instruction set:
//!
//! ```no_run
//! use minijvm::{Value, Vm};
//!
//! # fn main() -> Result<(), minijvm::Error> {
//! let vm = Vm::new();
//! let result = vm.execute("Sum.class", "sum", "(I)I", &[10])?;
//! assert_eq!(result, Value::Int(45));
//! # Ok(())
//! # }
//! ```

pub mod constant_pool;
pub mod cursor;
pub mod descriptor;
pub mod deserialize;
mod errors;
pub mod run;

pub use deserialize::{ClassFile, CodeAttribute, MethodInfo};
pub use errors::*;
pub use run::{value::Value, Vm};
