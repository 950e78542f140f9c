//! # reckon
//!
//! A small embeddable calculator language: scalar real arithmetic, booleans,
//! short bounded strings, variables, control flow, and a fixed library of
//! math intrinsics, with predictable cost and no dynamic code generation.
//!
//! The pipeline is deliberately a single pass:
//!
//! - the **scanner** turns the source into a lazy token stream (lexemes are
//!   slices into the source, nothing allocates per token);
//! - the **compiler** is a Pratt parser that emits bytecode straight into a
//!   [`chunk::Chunk`] while it parses — there is no syntax tree. Local
//!   variables are resolved to stack slots on the spot and forward jumps are
//!   back-patched in the emitted buffer;
//! - the **VM** executes the chunk on an operand stack, with a persistent,
//!   insertion-ordered globals table keyed by name.
//!
//! Globals outlive the chunk that defined them, so successive
//! [`VM::interpret`] calls on one VM see each other's state — that is what
//! makes the REPL and host embedding work. A host can also seed globals with
//! [`VM::set_global`] or thread a read-only binding table through a single
//! call with [`VM::interpret_with`].
//!
//! ```
//! use reckon::{Value, VM};
//!
//! let mut vm = VM::new();
//! vm.interpret("var x = 2 ** 10;", ';').unwrap();
//! assert_eq!(vm.globals().get("x"), Some(&Value::Number(1024.0)));
//! ```

pub mod chunk;
pub mod cli;
mod compiler;
pub mod error;
mod scanner;
pub mod vm;

pub use error::{ReckonError, RuntimeError};
pub use vm::{value::Value, VTable, VM};

/// Alias for results carrying the crate-level error.
pub type Result<T> = std::result::Result<T, ReckonError>;
