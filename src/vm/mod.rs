//! The virtual machine.
//!
//! A `VM` owns the operand stack and the globals table. Each `interpret`
//! call compiles its source into a fresh chunk, executes it, and throws the
//! chunk away; the globals persist, which is what makes the REPL and
//! repeated host calls on one VM useful.
//!
//! The embedding surface also lives here: `interpret_with` threads a
//! read-only table of host bindings through variable reads, `repl` runs the
//! interactive prompt, and `run_file` executes a whole file in `;` mode.

pub mod math;
pub mod value;

use std::{
	fs::read_to_string,
	io::{self, Write},
	path::Path,
};

use anyhow::anyhow;
use indexmap::IndexMap;
use value::{concat, Value};

use crate::{
	chunk::{Chunk, OpCode},
	compiler::Compiler,
	error::{ReckonError, RuntimeError, RuntimeErrorKind},
};

/// Name → value table used for the globals and for host-injected lookups.
pub type VTable = IndexMap<String, Value>;

/// Operand stack capacity.
pub const STACK_MAX: usize = 256;

pub struct VM {
	stack:   Vec<Value>,
	globals: VTable,
}

impl VM {
	pub fn new() -> Self { Self { stack: Vec::with_capacity(STACK_MAX), globals: VTable::new() } }

	/// Compiles and runs one unit of source. Globals survive into the next
	/// call.
	pub fn interpret(&mut self, source: &str, end_line: char) -> crate::Result<()> {
		self.interpret_with(source, end_line, &VTable::new())
	}

	/// Like [`VM::interpret`], but variable reads consult `locals` before
	/// the globals. Writes never escape into it.
	pub fn interpret_with(&mut self, source: &str, end_line: char, locals: &VTable) -> crate::Result<()> {
		let chunk = Compiler::compile(source, end_line).map_err(ReckonError::CompileErrors)?;
		self.run(&chunk, locals).map_err(|e| {
			eprintln!("{e}");
			e
		})
	}

	/// Reads and runs a whole file in ';' mode.
	pub fn run_file(&mut self, path: &Path) -> crate::Result<()> {
		let source =
			read_to_string(path).map_err(|source| ReckonError::File { path: path.to_path_buf(), source })?;
		self.interpret(&source, ';')
	}

	/// The interactive prompt. A unit is interpreted when a line ends in
	/// `end_line` (or `;`), or, once a block has been opened, when a blank
	/// line closes it. EOF leaves the loop.
	pub fn repl(&mut self, end_line: char) {
		let stdin = io::stdin();
		let mut source = String::new();
		let mut block = false;
		loop {
			print!("{}", if block { "... " } else { ">>> " });
			if let Err(e) = io::stdout().flush() {
				eprintln!("Failed flush: {e}");
			}
			let mut line = String::new();
			match stdin.read_line(&mut line) {
				Ok(0) => {
					println!();
					break;
				}
				Ok(_) => {}
				Err(e) => {
					eprintln!("Failed read line: {e}");
					continue;
				}
			}
			source.push_str(&line);

			let last = line.trim_end().chars().last();
			if line.trim().is_empty() {
				let _ = self.interpret(&source, end_line);
				source.clear();
				block = false;
			} else if !block && last.is_some_and(|c| c == end_line || c == ';') {
				// A `;` line compiles in `;` mode even under a REPL endline.
				let unit_end = if last == Some(';') { ';' } else { end_line };
				let _ = self.interpret(&source, unit_end);
				source.clear();
			} else {
				block = true;
			}
		}
	}

	/// Seeds or overwrites a global from the host. The name is truncated
	/// the same way identifier constants are.
	pub fn set_global(&mut self, name: &str, value: Value) {
		self.globals.insert(value::inline(name).to_string(), value);
	}

	/// The current globals, in insertion order.
	pub fn globals(&self) -> &VTable { &self.globals }

	fn run(&mut self, chunk: &Chunk, locals: &VTable) -> Result<(), ReckonError> {
		let result = self.execute(chunk, locals);
		if result.is_err() {
			self.stack.clear();
		}
		result
	}

	fn execute(&mut self, chunk: &Chunk, locals: &VTable) -> Result<(), ReckonError> {
		let mut ip = 0usize;
		loop {
			let op = OpCode::from(chunk.code[ip]);
			let line = chunk.lines[ip];
			ip += 1;
			match op {
				OpCode::Constant => {
					let index = chunk.code[ip] as usize;
					ip += 1;
					let value =
						*chunk.constants.get(index).ok_or_else(|| anyhow!("constant {index} out of range"))?;
					self.push(value, line)?;
				}
				OpCode::Nil => self.push(Value::Nil, line)?,
				OpCode::True => self.push(Value::Bool(true), line)?,
				OpCode::False => self.push(Value::Bool(false), line)?,
				OpCode::Negate => self.unary_number(line, |n| -n)?,
				OpCode::UnaryPlus => self.unary_number(line, |n| n)?,
				OpCode::Add => self.add(line)?,
				OpCode::Subtract => self.binary_number(line, |a, b| a - b)?,
				OpCode::Multiply => self.binary_number(line, |a, b| a * b)?,
				OpCode::Divide => self.binary_number(line, |a, b| a / b)?,
				// Truncating forms; a zero divisor propagates NaN/Inf just
				// like the floating-point operators.
				OpCode::IntDivide => self.binary_number(line, |a, b| (a / b).trunc())?,
				OpCode::Modulo => self.binary_number(line, |a, b| a.trunc() % b.trunc())?,
				OpCode::Power => self.binary_number(line, f64::powf)?,
				OpCode::Not => {
					let value = self.pop(line)?;
					self.push(Value::Bool(value.is_falsey()), line)?;
				}
				OpCode::Xor => self.binary_integer(line, |a, b| a ^ b)?,
				OpCode::BitOr => self.binary_integer(line, |a, b| a | b)?,
				OpCode::BitAnd => self.binary_integer(line, |a, b| a & b)?,
				OpCode::BitNot => self.unary_integer(line, |n| !n)?,
				// Shift counts are masked into 0..63.
				OpCode::ShiftLeft => self.binary_integer(line, |a, b| a << (b & 63))?,
				OpCode::ShiftRight => self.binary_integer(line, |a, b| a >> (b & 63))?,
				OpCode::Equal => {
					let b = self.pop(line)?;
					let a = self.pop(line)?;
					self.push(Value::Bool(a == b), line)?;
				}
				OpCode::Greater => self.binary_compare(line, |a, b| a > b)?,
				OpCode::Less => self.binary_compare(line, |a, b| a < b)?,
				OpCode::Exp => self.unary_number(line, f64::exp)?,
				OpCode::Sin => self.unary_number(line, math::sin)?,
				OpCode::Cos => self.unary_number(line, math::cos)?,
				OpCode::Tan => self.unary_number(line, math::tan)?,
				OpCode::Abs => self.unary_number(line, f64::abs)?,
				OpCode::Log => self.unary_number(line, f64::ln)?,
				OpCode::Log10 => self.unary_number(line, f64::log10)?,
				OpCode::Sign => self.unary_number(line, |n| if n < 0.0 { -1.0 } else { 1.0 })?,
				OpCode::Sqrt => self.unary_number(line, f64::sqrt)?,
				OpCode::Acos => self.unary_number(line, f64::acos)?,
				OpCode::Asin => self.unary_number(line, f64::asin)?,
				OpCode::Atan => self.unary_number(line, f64::atan)?,
				OpCode::Ceil => self.unary_number(line, f64::ceil)?,
				OpCode::Floor => self.unary_number(line, f64::floor)?,
				OpCode::Atan2 => self.binary_number(line, f64::atan2)?,
				OpCode::Min => self.binary_number(line, f64::min)?,
				OpCode::Max => self.binary_number(line, f64::max)?,
				OpCode::Print => {
					let value = self.pop(line)?;
					print!("{value}");
				}
				OpCode::Newline => println!(),
				OpCode::List => {
					for (name, value) in &self.globals {
						println!("{name} = {value}");
					}
				}
				OpCode::Pop => {
					self.pop(line)?;
				}
				OpCode::DefineGlobal => {
					let index = chunk.code[ip] as usize;
					ip += 1;
					let name = Self::global_name(chunk, index)?;
					let value = *self.peek(0, line)?;
					self.globals.insert(name, value);
					self.pop(line)?;
				}
				OpCode::SetGlobal => {
					let index = chunk.code[ip] as usize;
					ip += 1;
					let name = Self::global_name(chunk, index)?;
					let value = *self.peek(0, line)?;
					// Assignment requires a prior definition; no implicit
					// declaration at runtime.
					match self.globals.get_mut(&name) {
						Some(slot) => *slot = value,
						None => {
							return Err(
								RuntimeError::new(line, RuntimeErrorKind::UndefinedVariable(name)).into()
							);
						}
					}
				}
				OpCode::GetGlobal => {
					let index = chunk.code[ip] as usize;
					ip += 1;
					let name = Self::global_name(chunk, index)?;
					// Host-injected bindings shadow globals on reads.
					let value = locals.get(&name).or_else(|| self.globals.get(&name)).copied();
					match value {
						Some(value) => self.push(value, line)?,
						None => {
							return Err(
								RuntimeError::new(line, RuntimeErrorKind::UndefinedVariable(name)).into()
							);
						}
					}
				}
				OpCode::GetLocal => {
					let slot = chunk.code[ip] as usize;
					ip += 1;
					let value =
						*self.stack.get(slot).ok_or_else(|| anyhow!("local slot {slot} out of range"))?;
					self.push(value, line)?;
				}
				OpCode::SetLocal => {
					let slot = chunk.code[ip] as usize;
					ip += 1;
					let value = *self.peek(0, line)?;
					*self.stack.get_mut(slot).ok_or_else(|| anyhow!("local slot {slot} out of range"))? =
						value;
				}
				OpCode::JumpIfFalse => {
					let offset = read_u16(chunk, ip);
					ip += 2;
					if self.peek(0, line)?.is_falsey() {
						ip += offset;
					}
				}
				OpCode::Jump => {
					let offset = read_u16(chunk, ip);
					ip += 2;
					ip += offset;
				}
				OpCode::Loop => {
					let offset = read_u16(chunk, ip);
					ip += 2;
					ip -= offset;
				}
				OpCode::Return => return Ok(()),
			}
		}
	}

	// ---- stack primitives ----

	fn push(&mut self, value: Value, line: usize) -> Result<(), RuntimeError> {
		if self.stack.len() == STACK_MAX {
			return Err(RuntimeError::new(line, RuntimeErrorKind::StackOverflow));
		}
		self.stack.push(value);
		Ok(())
	}

	fn pop(&mut self, line: usize) -> Result<Value, RuntimeError> {
		self.stack.pop().ok_or_else(|| RuntimeError::new(line, RuntimeErrorKind::StackUnderflow))
	}

	fn peek(&self, distance: usize, line: usize) -> Result<&Value, RuntimeError> {
		let index = self
			.stack
			.len()
			.checked_sub(1 + distance)
			.ok_or_else(|| RuntimeError::new(line, RuntimeErrorKind::StackUnderflow))?;
		Ok(&self.stack[index])
	}

	// ---- instruction helpers ----

	fn unary_number(&mut self, line: usize, f: impl FnOnce(f64) -> f64) -> Result<(), RuntimeError> {
		match self.pop(line)? {
			Value::Number(n) => self.push(Value::Number(f(n)), line),
			_ => Err(RuntimeError::new(line, RuntimeErrorKind::NumberOperand)),
		}
	}

	fn binary_number(&mut self, line: usize, f: impl FnOnce(f64, f64) -> f64) -> Result<(), RuntimeError> {
		let (a, b) = self.pop_number_pair(line)?;
		self.push(Value::Number(f(a, b)), line)
	}

	fn binary_compare(&mut self, line: usize, f: impl FnOnce(f64, f64) -> bool) -> Result<(), RuntimeError> {
		let (a, b) = self.pop_number_pair(line)?;
		self.push(Value::Bool(f(a, b)), line)
	}

	fn pop_number_pair(&mut self, line: usize) -> Result<(f64, f64), RuntimeError> {
		let b = self.pop(line)?;
		let a = self.pop(line)?;
		match (a.as_number(), b.as_number()) {
			(Some(a), Some(b)) => Ok((a, b)),
			_ => Err(RuntimeError::new(line, RuntimeErrorKind::NumberOperands)),
		}
	}

	fn unary_integer(&mut self, line: usize, f: impl FnOnce(i64) -> i64) -> Result<(), RuntimeError> {
		match self.pop(line)?.as_integer() {
			Some(n) => self.push(Value::Number(f(n) as f64), line),
			None => Err(RuntimeError::new(line, RuntimeErrorKind::NumberOperand)),
		}
	}

	fn binary_integer(&mut self, line: usize, f: impl FnOnce(i64, i64) -> i64) -> Result<(), RuntimeError> {
		let b = self.pop(line)?;
		let a = self.pop(line)?;
		match (a.as_integer(), b.as_integer()) {
			(Some(a), Some(b)) => self.push(Value::Number(f(a, b) as f64), line),
			_ => Err(RuntimeError::new(line, RuntimeErrorKind::NumberOperands)),
		}
	}

	/// `+` adds numbers and concatenates strings; anything else is an error.
	fn add(&mut self, line: usize) -> Result<(), RuntimeError> {
		let b = self.pop(line)?;
		let a = self.pop(line)?;
		match (a, b) {
			(Value::Number(a), Value::Number(b)) => self.push(Value::Number(a + b), line),
			(Value::Str(a), Value::Str(b)) => self.push(Value::Str(concat(&a, &b)), line),
			_ => Err(RuntimeError::new(line, RuntimeErrorKind::AddOperands)),
		}
	}

	fn global_name(chunk: &Chunk, index: usize) -> Result<String, ReckonError> {
		let constant = chunk.constants.get(index).ok_or_else(|| anyhow!("constant {index} out of range"))?;
		let name =
			constant.as_str().ok_or_else(|| anyhow!("global name constant {index} is not a string"))?;
		Ok(name.to_string())
	}
}

impl Default for VM {
	fn default() -> Self { Self::new() }
}

fn read_u16(chunk: &Chunk, ip: usize) -> usize {
	((chunk.code[ip] as usize) << 8) | chunk.code[ip + 1] as usize
}

#[cfg(test)]
mod tests {
	use super::*;

	fn run(vm: &mut VM, source: &str) -> crate::Result<()> { vm.interpret(source, ';') }

	fn global(vm: &VM, name: &str) -> Value { *vm.globals().get(name).expect(name) }

	#[test]
	fn globals_persist_across_units() {
		let mut vm = VM::new();
		run(&mut vm, "var x = 10;").unwrap();
		run(&mut vm, "x = x + 5;").unwrap();
		assert_eq!(global(&vm, "x"), Value::Number(15.0));
	}

	#[test]
	fn stack_balances_after_each_unit() {
		let mut vm = VM::new();
		for source in [
			"1 + 2;",
			"var a = 3;",
			"{ var b = 4; b = b + 1; }",
			"if (a > 1) a = 2; else a = 5;",
			"while (a < 6) a = a + 1;",
			"var s = 0; for (var i = 0; i < 4; i = i + 1) { s = s + i; }",
			"true and false or 1 > 2;",
			"(1 > 0) ? \"y\" : \"n\";",
		] {
			run(&mut vm, source).unwrap();
			assert!(vm.stack.is_empty(), "stack not balanced after {source:?}");
		}
		assert_eq!(global(&vm, "s"), Value::Number(6.0));
	}

	#[test]
	fn block_scoping_shadows_and_restores() {
		let mut vm = VM::new();
		run(&mut vm, "var x = 1; var seen = 0; { var x = 2; seen = x; } var outer = x;").unwrap();
		assert_eq!(global(&vm, "seen"), Value::Number(2.0));
		assert_eq!(global(&vm, "outer"), Value::Number(1.0));
	}

	#[test]
	fn short_circuit_skips_rhs() {
		let mut vm = VM::new();
		run(&mut vm, "var a = 0; var l = false and (a = 1); var r = true or (a = 2);").unwrap();
		assert_eq!(global(&vm, "a"), Value::Number(0.0));
		assert_eq!(global(&vm, "l"), Value::Bool(false));
		assert_eq!(global(&vm, "r"), Value::Bool(true));
	}

	#[test]
	fn and_or_evaluate_rhs_when_reached() {
		let mut vm = VM::new();
		run(&mut vm, "var a = 0; true and (a = 1); false or (a = a + 10);").unwrap();
		assert_eq!(global(&vm, "a"), Value::Number(11.0));
	}

	#[test]
	fn arithmetic_operators() {
		let mut vm = VM::new();
		run(&mut vm, "var p = 2 ** 10; var m = 17 % 5; var q = 17 // 5; var x = 7 xor 2;").unwrap();
		assert_eq!(global(&vm, "p"), Value::Number(1024.0));
		assert_eq!(global(&vm, "m"), Value::Number(2.0));
		assert_eq!(global(&vm, "q"), Value::Number(3.0));
		assert_eq!(global(&vm, "x"), Value::Number(5.0));
	}

	#[test]
	fn power_chains_right_to_left() {
		let mut vm = VM::new();
		run(&mut vm, "var p = 2 ** 3 ** 2;").unwrap();
		assert_eq!(global(&vm, "p"), Value::Number(512.0));
	}

	#[test]
	fn ieee_conditions_are_not_errors() {
		let mut vm = VM::new();
		run(&mut vm, "var d = 1 / 0; var n = 0 / 0; var m = 17 % 0; var q = 5 // 0; var l = log(-1);")
			.unwrap();
		assert_eq!(global(&vm, "d"), Value::Number(f64::INFINITY));
		assert!(global(&vm, "n").as_number().unwrap().is_nan());
		assert!(global(&vm, "m").as_number().unwrap().is_nan());
		assert_eq!(global(&vm, "q"), Value::Number(f64::INFINITY));
		assert!(global(&vm, "l").as_number().unwrap().is_nan());
	}

	#[test]
	fn trig_snaps_to_exact_values() {
		let mut vm = VM::new();
		run(&mut vm, "var s = sin(pi); var c = cos(pi/2); var o = cos(0); var t = tan pi;").unwrap();
		assert_eq!(global(&vm, "s"), Value::Number(0.0));
		assert_eq!(global(&vm, "c"), Value::Number(0.0));
		assert_eq!(global(&vm, "o"), Value::Number(1.0));
		assert_eq!(global(&vm, "t"), Value::Number(0.0));
	}

	#[test]
	fn sign_of_zero_is_positive() {
		let mut vm = VM::new();
		run(&mut vm, "var z = sign 0; var n = sign(-3); var p = sign 12;").unwrap();
		assert_eq!(global(&vm, "z"), Value::Number(1.0));
		assert_eq!(global(&vm, "n"), Value::Number(-1.0));
		assert_eq!(global(&vm, "p"), Value::Number(1.0));
	}

	#[test]
	fn binary_intrinsics() {
		let mut vm = VM::new();
		run(&mut vm, "var lo = min(3, 7); var hi = max(3, 7); var a = atan2(0, 1);").unwrap();
		assert_eq!(global(&vm, "lo"), Value::Number(3.0));
		assert_eq!(global(&vm, "hi"), Value::Number(7.0));
		assert_eq!(global(&vm, "a"), Value::Number(0.0));
	}

	#[test]
	fn ternary_selects_branch() {
		let mut vm = VM::new();
		run(&mut vm, "var t = (3 > 2) ? \"a\" : \"b\"; var u = (1 > 2) ? \"a\" : \"b\";").unwrap();
		assert_eq!(global(&vm, "t"), Value::string("a"));
		assert_eq!(global(&vm, "u"), Value::string("b"));
	}

	#[test]
	fn string_concat_and_truncation() {
		let mut vm = VM::new();
		run(&mut vm, "var s = \"hel\" + \"lo\";").unwrap();
		assert_eq!(global(&vm, "s"), Value::string("hello"));

		let a = "a".repeat(40);
		let b = "b".repeat(40);
		run(&mut vm, &format!("var t = \"{a}\" + \"{b}\";")).unwrap();
		assert_eq!(global(&vm, "t").as_str().map(str::len), Some(63));
	}

	#[test]
	fn equality_is_structural() {
		let mut vm = VM::new();
		run(
			&mut vm,
			"var a = 1 == 1; var b = \"x\" == \"x\"; var c = nil == nil; var d = 0 == false; var e = 1 != 2;",
		)
		.unwrap();
		assert_eq!(global(&vm, "a"), Value::Bool(true));
		assert_eq!(global(&vm, "b"), Value::Bool(true));
		assert_eq!(global(&vm, "c"), Value::Bool(true));
		assert_eq!(global(&vm, "d"), Value::Bool(false));
		assert_eq!(global(&vm, "e"), Value::Bool(true));
	}

	#[test]
	fn undefined_variable_read_and_write() {
		let mut vm = VM::new();
		assert!(matches!(run(&mut vm, "y = 1;"), Err(ReckonError::Runtime(_))));
		assert!(vm.globals().get("y").is_none());
		assert!(vm.stack.is_empty());

		assert!(matches!(run(&mut vm, "var z = missing + 1;"), Err(ReckonError::Runtime(_))));
	}

	#[test]
	fn runtime_error_carries_the_line() {
		let mut vm = VM::new();
		let err = vm.interpret("var ok = 1;\nboom = 2;", ';').unwrap_err();
		let ReckonError::Runtime(e) = err else { panic!("expected runtime error") };
		assert_eq!(e.line(), 2);
		assert!(matches!(e.kind(), RuntimeErrorKind::UndefinedVariable(name) if name == "boom"));
	}

	#[test]
	fn type_mismatches_are_runtime_errors() {
		let mut vm = VM::new();
		for source in ["1 + \"x\";", "-\"x\";", "\"a\" < \"b\";", "nil + nil;", "sqrt \"x\";"] {
			assert!(matches!(run(&mut vm, source), Err(ReckonError::Runtime(_))), "{source}");
			assert!(vm.stack.is_empty());
		}
	}

	#[test]
	fn injected_locals_shadow_globals_on_read() {
		let mut vm = VM::new();
		run(&mut vm, "var q = 1;").unwrap();

		let mut locals = VTable::new();
		locals.insert("q".to_string(), Value::Number(5.0));
		vm.interpret_with("var r = q * 2;", ';', &locals).unwrap();
		assert_eq!(global(&vm, "r"), Value::Number(10.0));

		// Writes land in the globals, never in the injected table.
		vm.interpret_with("q = 7;", ';', &locals).unwrap();
		assert_eq!(locals.get("q"), Some(&Value::Number(5.0)));
		assert_eq!(global(&vm, "q"), Value::Number(7.0));
	}

	#[test]
	fn set_global_seeds_state_for_scripts() {
		let mut vm = VM::new();
		vm.set_global("rate", Value::Number(0.25));
		run(&mut vm, "var price = 100 * (1 + rate);").unwrap();
		assert_eq!(global(&vm, "price"), Value::Number(125.0));
	}

	#[test]
	fn globals_keep_insertion_order() {
		let mut vm = VM::new();
		run(&mut vm, "var b = 1; var a = 2; b = 3;").unwrap();
		let names: Vec<&str> = vm.globals().keys().map(String::as_str).collect();
		assert_eq!(names, vec!["b", "a"]);
	}

	#[test]
	fn push_past_capacity_overflows_the_stack() {
		// More pushes than STACK_MAX before anything pops: a runtime error,
		// not unchecked growth.
		let mut chunk = Chunk::default();
		for _ in 0..=STACK_MAX {
			chunk.write(OpCode::Nil as u8, 1);
		}
		chunk.write(OpCode::Return as u8, 1);

		let mut vm = VM::new();
		let result = vm.run(&chunk, &VTable::new());
		let Err(ReckonError::Runtime(e)) = result else { panic!("expected overflow") };
		assert!(matches!(e.kind(), RuntimeErrorKind::StackOverflow));
		assert!(vm.stack.is_empty());
	}

	#[test]
	fn bitwise_opcodes_execute_on_hand_built_chunks() {
		// Only `xor` and `~` are reachable from source; the rest of the
		// integer family is exercised directly.
		let cases = [
			(OpCode::BitOr, 6.0, 3.0, 7.0),
			(OpCode::BitAnd, 6.0, 3.0, 2.0),
			(OpCode::Xor, 6.0, 3.0, 5.0),
			(OpCode::ShiftLeft, 1.0, 4.0, 16.0),
			(OpCode::ShiftRight, 16.0, 2.0, 4.0),
		];
		for (op, a, b, expected) in cases {
			let mut chunk = Chunk::default();
			let ka = chunk.add_constant(Value::Number(a)) as u8;
			let kb = chunk.add_constant(Value::Number(b)) as u8;
			chunk.write(OpCode::Constant as u8, 1);
			chunk.write(ka, 1);
			chunk.write(OpCode::Constant as u8, 1);
			chunk.write(kb, 1);
			chunk.write(op as u8, 1);
			chunk.write(OpCode::Return as u8, 1);

			let mut vm = VM::new();
			vm.run(&chunk, &VTable::new()).unwrap();
			assert_eq!(vm.stack, vec![Value::Number(expected)], "{op:?}");
		}
	}

	#[test]
	fn booleans_coerce_in_integer_ops() {
		let mut vm = VM::new();
		run(&mut vm, "var a = true xor 0; var b = ~true;").unwrap();
		assert_eq!(global(&vm, "a"), Value::Number(1.0));
		assert_eq!(global(&vm, "b"), Value::Number(-2.0));
	}

	#[test]
	fn repl_mode_units_compile_without_semicolons() {
		let mut vm = VM::new();
		vm.interpret("var x = 1\nx = x + 1", '\n').unwrap();
		assert_eq!(global(&vm, "x"), Value::Number(2.0));
	}
}
