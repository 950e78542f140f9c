//! The single-pass compiler: a Pratt parser that emits bytecode directly.
//!
//! There is no syntax tree. Each grammar rule runs while its tokens are
//! current and appends instructions to the chunk on the spot. Scope
//! resolution happens in the same pass: the `locals` table mirrors the
//! runtime stack, so a local's index in the table is the stack slot the VM
//! will address. Forward jumps are emitted with a two-byte placeholder and
//! patched in place once the target offset is known.
//!
//! Diagnostics print to stderr as they are found. After an error the
//! compiler enters panic mode, swallowing further diagnostics until it can
//! resynchronize at a statement boundary, so one mistake reports once.

mod rules;

use rules::{get_rule, Precedence};

use crate::{
	chunk::{Chunk, OpCode},
	scanner::{Scanner, Token, TokenKind},
	vm::value::Value,
};

/// Hard cap on locals per compilation unit; slot operands are one byte.
pub(crate) const MAX_LOCALS: usize = u8::MAX as usize + 1;

/// A block-scoped variable and the depth of the block that declared it.
/// Depth -1 marks a declaration whose initializer is still compiling.
struct Local<'src> {
	name:  Token<'src>,
	depth: i32,
}

pub(crate) struct Compiler<'src> {
	scanner:     Scanner<'src>,
	current:     Token<'src>,
	previous:    Token<'src>,
	had_error:   bool,
	panic_mode:  bool,
	error_count: usize,
	chunk:       Chunk,
	locals:      Vec<Local<'src>>,
	scope_depth: i32,
	/// ';' means semicolons are enforced; any other char makes them
	/// optional (REPL mode).
	end_line:    char,
}

impl<'src> Compiler<'src> {
	/// Compiles one unit of source into a chunk. On failure returns the
	/// number of errors; the diagnostics themselves have already been
	/// printed to stderr.
	pub fn compile(source: &'src str, end_line: char) -> Result<Chunk, usize> {
		let mut compiler = Compiler {
			scanner: Scanner::new(source),
			current: Token::empty(),
			previous: Token::empty(),
			had_error: false,
			panic_mode: false,
			error_count: 0,
			chunk: Chunk::default(),
			locals: Vec::new(),
			scope_depth: 0,
			end_line,
		};
		compiler.advance();
		while !compiler.matches(TokenKind::Eof) {
			compiler.declaration();
		}
		compiler.emit_op(OpCode::Return);
		if compiler.had_error {
			Err(compiler.error_count)
		} else {
			Ok(compiler.chunk)
		}
	}

	// ---- token pump ----

	fn advance(&mut self) {
		self.previous = self.current;
		loop {
			self.current = self.scanner.scan_token();
			if self.current.kind != TokenKind::Error {
				break;
			}
			self.error_at_current(self.current.lexeme);
		}
	}

	fn consume(&mut self, kind: TokenKind, msg: &str) {
		if self.current.kind == kind {
			self.advance();
		} else {
			self.error_at_current(msg);
		}
	}

	fn check(&self, kind: TokenKind) -> bool { self.current.kind == kind }

	fn matches(&mut self, kind: TokenKind) -> bool {
		if !self.check(kind) {
			return false;
		}
		self.advance();
		true
	}

	/// Statement terminator: enforced in ';' mode, skipped if present
	/// otherwise.
	fn consume_endline(&mut self, msg: &str) {
		if self.end_line == ';' {
			self.consume(TokenKind::Semicolon, msg);
		} else {
			self.matches(TokenKind::Semicolon);
		}
	}

	// ---- diagnostics ----

	fn error(&mut self, msg: &str) {
		let token = self.previous;
		self.error_at(&token, msg);
	}

	fn error_at_current(&mut self, msg: &str) {
		let token = self.current;
		self.error_at(&token, msg);
	}

	fn error_at(&mut self, token: &Token, msg: &str) {
		if self.panic_mode {
			return;
		}
		self.panic_mode = true;
		self.had_error = true;
		self.error_count += 1;
		match token.kind {
			TokenKind::Eof => eprintln!("[line {}] Error at end: {msg}", token.line),
			TokenKind::Error => eprintln!("[line {}] Error: {msg}", token.line),
			_ => eprintln!("[line {}] Error at '{}': {msg}", token.line, token.lexeme),
		}
	}

	/// Skips forward to the next statement boundary and leaves panic mode.
	fn synchronize(&mut self) {
		self.panic_mode = false;
		while self.current.kind != TokenKind::Eof {
			if self.previous.kind == TokenKind::Semicolon {
				return;
			}
			match self.current.kind {
				TokenKind::Class
				| TokenKind::Fun
				| TokenKind::Var
				| TokenKind::For
				| TokenKind::If
				| TokenKind::While
				| TokenKind::Print
				| TokenKind::List
				| TokenKind::Return => return,
				_ => {}
			}
			self.advance();
		}
	}

	// ---- emission ----

	fn emit_byte(&mut self, byte: u8) { self.chunk.write(byte, self.previous.line); }

	fn emit_op(&mut self, op: OpCode) { self.emit_byte(op as u8); }

	fn emit_ops(&mut self, first: OpCode, second: OpCode) {
		self.emit_op(first);
		self.emit_op(second);
	}

	fn emit_with_operand(&mut self, op: OpCode, operand: u8) {
		self.emit_op(op);
		self.emit_byte(operand);
	}

	fn make_constant(&mut self, value: Value) -> u8 {
		let index = self.chunk.add_constant(value);
		if index > u8::MAX as usize {
			self.error("Too many constants in one chunk.");
			return 0;
		}
		index as u8
	}

	fn emit_constant(&mut self, value: Value) {
		let index = self.make_constant(value);
		self.emit_with_operand(OpCode::Constant, index);
	}

	/// Emits a jump with a placeholder offset and returns where the
	/// placeholder lives, for `patch_jump`.
	fn emit_jump(&mut self, op: OpCode) -> usize {
		self.emit_op(op);
		self.emit_byte(0xff);
		self.emit_byte(0xff);
		self.chunk.code.len() - 2
	}

	/// Overwrites the placeholder at `offset` with the distance from the
	/// instruction after it to the current end of code.
	fn patch_jump(&mut self, offset: usize) {
		let jump = self.chunk.code.len() - offset - 2;
		if jump > u16::MAX as usize {
			self.error("Too much code to jump over.");
		}
		self.chunk.code[offset] = (jump >> 8) as u8;
		self.chunk.code[offset + 1] = jump as u8;
	}

	/// Backward jumps know their target up front, no patching needed.
	fn emit_loop(&mut self, loop_start: usize) {
		self.emit_op(OpCode::Loop);
		let offset = self.chunk.code.len() - loop_start + 2;
		if offset > u16::MAX as usize {
			self.error("Loop body too large.");
		}
		self.emit_byte((offset >> 8) as u8);
		self.emit_byte(offset as u8);
	}

	// ---- expressions ----

	/// The Pratt core: run the prefix rule of the token just consumed, then
	/// fold in infix rules while they bind at least as strongly as
	/// `precedence`.
	fn parse_precedence(&mut self, precedence: Precedence) {
		self.advance();
		let Some(prefix) = get_rule(self.previous.kind).prefix else {
			self.error("Expect expression");
			return;
		};
		let can_assign = precedence <= Precedence::Assignment;
		prefix(self, can_assign);

		while precedence <= get_rule(self.current.kind).precedence {
			self.advance();
			if let Some(infix) = get_rule(self.previous.kind).infix {
				infix(self, can_assign);
			}
		}

		if can_assign && self.matches(TokenKind::Equal) {
			self.error("Invalid assignment target.");
		}
	}

	fn expression(&mut self) { self.parse_precedence(Precedence::Assignment); }

	// ---- declarations and statements ----

	fn declaration(&mut self) {
		if self.matches(TokenKind::Var) {
			self.var_declaration(false);
		} else {
			self.statement();
		}
		if self.panic_mode {
			self.synchronize();
		}
	}

	/// `var name (= initializer)?`. Inside a `for` clause the trailing `;`
	/// is structural and required even when semicolons are otherwise
	/// optional.
	fn var_declaration(&mut self, in_for_clause: bool) {
		let global = self.parse_variable("Expect variable name.");
		if self.matches(TokenKind::Equal) {
			self.expression();
		} else {
			self.emit_op(OpCode::Nil);
		}
		if in_for_clause {
			self.consume(TokenKind::Semicolon, "Expect ';' after loop initializer.");
		} else {
			self.consume_endline("Expect ';' after variable declaration.");
		}
		self.define_variable(global);
	}

	fn statement(&mut self) {
		if self.matches(TokenKind::Print) {
			self.print_statement();
		} else if self.matches(TokenKind::List) {
			self.list_statement();
		} else if self.matches(TokenKind::LeftBrace) {
			self.begin_scope();
			self.block();
			self.end_scope();
		} else if self.matches(TokenKind::If) {
			self.if_statement();
		} else if self.matches(TokenKind::While) {
			self.while_statement();
		} else if self.matches(TokenKind::For) {
			self.for_statement();
		} else {
			self.expression_statement();
		}
	}

	fn print_statement(&mut self) {
		self.consume(TokenKind::LeftParen, "Expect '(' after 'print'.");
		loop {
			self.expression();
			self.emit_op(OpCode::Print);
			if !self.matches(TokenKind::Comma) {
				break;
			}
		}
		self.consume(TokenKind::RightParen, "Expect ')' after value.");
		self.emit_op(OpCode::Newline);
		self.consume_endline("Expect ';' after statement.");
	}

	fn list_statement(&mut self) {
		self.emit_op(OpCode::List);
		self.consume_endline("Expect ';' after statement.");
	}

	fn expression_statement(&mut self) {
		self.expression();
		self.consume_endline("Expect ';' after value.");
		self.emit_op(OpCode::Pop);
	}

	fn if_statement(&mut self) {
		self.consume(TokenKind::LeftParen, "Expect '(' after 'if'.");
		self.expression();
		self.consume(TokenKind::RightParen, "Expect ')' after condition.");

		let then_jump = self.emit_jump(OpCode::JumpIfFalse);
		self.emit_op(OpCode::Pop);
		self.statement();
		let else_jump = self.emit_jump(OpCode::Jump);
		self.patch_jump(then_jump);
		self.emit_op(OpCode::Pop);
		if self.matches(TokenKind::Else) {
			self.statement();
		}
		self.patch_jump(else_jump);
	}

	fn while_statement(&mut self) {
		let loop_start = self.chunk.code.len();
		self.consume(TokenKind::LeftParen, "Expect '(' after 'while'.");
		self.expression();
		self.consume(TokenKind::RightParen, "Expect ')' after condition.");

		let exit_jump = self.emit_jump(OpCode::JumpIfFalse);
		self.emit_op(OpCode::Pop);
		self.statement();
		self.emit_loop(loop_start);

		self.patch_jump(exit_jump);
		self.emit_op(OpCode::Pop);
	}

	fn for_statement(&mut self) {
		self.begin_scope();
		self.consume(TokenKind::LeftParen, "Expect '(' after 'for'.");
		if self.matches(TokenKind::Semicolon) {
			// no initializer
		} else if self.matches(TokenKind::Var) {
			self.var_declaration(true);
		} else {
			self.expression();
			self.consume(TokenKind::Semicolon, "Expect ';' after loop initializer.");
			self.emit_op(OpCode::Pop);
		}

		let mut loop_start = self.chunk.code.len();
		let mut exit_jump = None;
		if !self.matches(TokenKind::Semicolon) {
			self.expression();
			self.consume(TokenKind::Semicolon, "Expect ';' after loop condition.");
			exit_jump = Some(self.emit_jump(OpCode::JumpIfFalse));
			self.emit_op(OpCode::Pop);
		}

		if !self.matches(TokenKind::RightParen) {
			// The increment textually precedes the body but runs after it:
			// hop over it into the body, and loop back through it.
			let body_jump = self.emit_jump(OpCode::Jump);
			let increment_start = self.chunk.code.len();
			self.expression();
			self.emit_op(OpCode::Pop);
			self.consume(TokenKind::RightParen, "Expect ')' after for clauses.");
			self.emit_loop(loop_start);
			loop_start = increment_start;
			self.patch_jump(body_jump);
		}

		self.statement();
		self.emit_loop(loop_start);
		if let Some(exit_jump) = exit_jump {
			self.patch_jump(exit_jump);
			self.emit_op(OpCode::Pop);
		}
		self.end_scope();
	}

	fn block(&mut self) {
		while !self.check(TokenKind::RightBrace) && !self.check(TokenKind::Eof) {
			self.declaration();
		}
		self.consume(TokenKind::RightBrace, "Expect '}' after block.");
	}

	// ---- scopes and variables ----

	fn begin_scope(&mut self) { self.scope_depth += 1; }

	fn end_scope(&mut self) {
		self.scope_depth -= 1;
		while self.locals.last().is_some_and(|local| local.depth > self.scope_depth) {
			self.emit_op(OpCode::Pop);
			self.locals.pop();
		}
	}

	/// Consumes the identifier; at top level returns its pool index for the
	/// global-define, in a block registers a local and returns 0.
	fn parse_variable(&mut self, msg: &str) -> u8 {
		self.consume(TokenKind::Identifier, msg);
		self.declare_variable();
		if self.scope_depth > 0 {
			return 0;
		}
		self.identifier_constant(self.previous)
	}

	fn identifier_constant(&mut self, name: Token) -> u8 { self.make_constant(Value::string(name.lexeme)) }

	fn declare_variable(&mut self) {
		if self.scope_depth == 0 {
			return;
		}
		let name = self.previous;
		let mut duplicate = false;
		for local in self.locals.iter().rev() {
			if local.depth != -1 && local.depth < self.scope_depth {
				break;
			}
			if local.name.lexeme == name.lexeme {
				duplicate = true;
				break;
			}
		}
		if duplicate {
			self.error("Already a variable with this name in this scope.");
		}
		self.add_local(name);
	}

	fn add_local(&mut self, name: Token<'src>) {
		if self.locals.len() == MAX_LOCALS {
			self.error("Too many local variables.");
			return;
		}
		self.locals.push(Local { name, depth: -1 });
	}

	fn mark_initialized(&mut self) {
		if let Some(local) = self.locals.last_mut() {
			local.depth = self.scope_depth;
		}
	}

	fn define_variable(&mut self, global: u8) {
		if self.scope_depth > 0 {
			self.mark_initialized();
			return;
		}
		self.emit_with_operand(OpCode::DefineGlobal, global);
	}

	/// Innermost local with this name, or None for a global.
	fn resolve_local(&mut self, name: &Token) -> Option<u8> {
		let mut found = None;
		for (slot, local) in self.locals.iter().enumerate().rev() {
			if local.name.lexeme == name.lexeme {
				found = Some((slot as u8, local.depth == -1));
				break;
			}
		}
		let (slot, uninitialized) = found?;
		if uninitialized {
			self.error("Can't read local variable in its own initializer.");
		}
		Some(slot)
	}

	fn named_variable(&mut self, name: Token<'src>, can_assign: bool) {
		let (get_op, set_op, arg) = match self.resolve_local(&name) {
			Some(slot) => (OpCode::GetLocal, OpCode::SetLocal, slot),
			None => (OpCode::GetGlobal, OpCode::SetGlobal, self.identifier_constant(name)),
		};
		if can_assign && self.matches(TokenKind::Equal) {
			self.expression();
			self.emit_with_operand(set_op, arg);
		} else {
			self.emit_with_operand(get_op, arg);
		}
	}
}

// ---- parse rules (free functions referenced by the dispatch table) ----

fn grouping(c: &mut Compiler, _can_assign: bool) {
	c.expression();
	c.consume(TokenKind::RightParen, "Expect ')' after expression");
}

fn number(c: &mut Compiler, _can_assign: bool) {
	let value = parse_number(c.previous.lexeme);
	c.emit_constant(Value::Number(value));
}

fn string(c: &mut Compiler, _can_assign: bool) {
	let lexeme = c.previous.lexeme;
	// Strip the surrounding quotes.
	c.emit_constant(Value::string(&lexeme[1..lexeme.len() - 1]));
}

fn pi(c: &mut Compiler, _can_assign: bool) { c.emit_constant(Value::Number(std::f64::consts::PI)); }

fn literal(c: &mut Compiler, _can_assign: bool) {
	match c.previous.kind {
		TokenKind::False => c.emit_op(OpCode::False),
		TokenKind::True => c.emit_op(OpCode::True),
		TokenKind::Nil => c.emit_op(OpCode::Nil),
		_ => {}
	}
}

fn variable<'src>(c: &mut Compiler<'src>, can_assign: bool) {
	let name = c.previous;
	c.named_variable(name, can_assign);
}

fn unary(c: &mut Compiler, _can_assign: bool) {
	let operator = c.previous.kind;
	c.parse_precedence(Precedence::Unary);
	match operator {
		TokenKind::Minus => c.emit_op(OpCode::Negate),
		TokenKind::Plus => c.emit_op(OpCode::UnaryPlus),
		TokenKind::Bang => c.emit_op(OpCode::Not),
		TokenKind::Tilde => c.emit_op(OpCode::BitNot),
		_ => {}
	}
}

fn binary(c: &mut Compiler, _can_assign: bool) {
	let operator = c.previous.kind;
	let precedence = get_rule(operator).precedence;
	// `**` binds its right operand at its own level (right-associative),
	// everything else one level up.
	let rhs = if operator == TokenKind::StarStar { precedence } else { precedence.next() };
	c.parse_precedence(rhs);
	match operator {
		TokenKind::Plus => c.emit_op(OpCode::Add),
		TokenKind::Minus => c.emit_op(OpCode::Subtract),
		TokenKind::Star => c.emit_op(OpCode::Multiply),
		TokenKind::Slash => c.emit_op(OpCode::Divide),
		TokenKind::SlashSlash => c.emit_op(OpCode::IntDivide),
		TokenKind::Percent => c.emit_op(OpCode::Modulo),
		TokenKind::StarStar => c.emit_op(OpCode::Power),
		TokenKind::Xor => c.emit_op(OpCode::Xor),
		TokenKind::EqualEqual => c.emit_op(OpCode::Equal),
		TokenKind::BangEqual => c.emit_ops(OpCode::Equal, OpCode::Not),
		TokenKind::Greater => c.emit_op(OpCode::Greater),
		TokenKind::GreaterEqual => c.emit_ops(OpCode::Less, OpCode::Not),
		TokenKind::Less => c.emit_op(OpCode::Less),
		TokenKind::LessEqual => c.emit_ops(OpCode::Greater, OpCode::Not),
		_ => {}
	}
}

fn ternary(c: &mut Compiler, _can_assign: bool) {
	let then_jump = c.emit_jump(OpCode::JumpIfFalse);
	c.emit_op(OpCode::Pop);
	c.parse_precedence(Precedence::Ternary);
	let else_jump = c.emit_jump(OpCode::Jump);
	c.patch_jump(then_jump);
	c.emit_op(OpCode::Pop);
	c.consume(TokenKind::Colon, "Expect ':' after then branch of '?'.");
	c.parse_precedence(Precedence::Ternary);
	c.patch_jump(else_jump);
}

fn and(c: &mut Compiler, _can_assign: bool) {
	let end_jump = c.emit_jump(OpCode::JumpIfFalse);
	c.emit_op(OpCode::Pop);
	c.parse_precedence(Precedence::And);
	c.patch_jump(end_jump);
}

fn or(c: &mut Compiler, _can_assign: bool) {
	let else_jump = c.emit_jump(OpCode::JumpIfFalse);
	let end_jump = c.emit_jump(OpCode::Jump);
	c.patch_jump(else_jump);
	c.emit_op(OpCode::Pop);
	c.parse_precedence(Precedence::Or);
	c.patch_jump(end_jump);
}

/// Unary math intrinsics; no parentheses required, `sin x` is legal.
fn intrinsic(c: &mut Compiler, _can_assign: bool) {
	let op = match c.previous.kind {
		TokenKind::Exp => OpCode::Exp,
		TokenKind::Sin => OpCode::Sin,
		TokenKind::Cos => OpCode::Cos,
		TokenKind::Tan => OpCode::Tan,
		TokenKind::Abs => OpCode::Abs,
		TokenKind::Log => OpCode::Log,
		TokenKind::Log10 => OpCode::Log10,
		TokenKind::Sign => OpCode::Sign,
		TokenKind::Sqrt => OpCode::Sqrt,
		TokenKind::Acos => OpCode::Acos,
		TokenKind::Asin => OpCode::Asin,
		TokenKind::Atan => OpCode::Atan,
		TokenKind::Ceil => OpCode::Ceil,
		TokenKind::Floor => OpCode::Floor,
		_ => return,
	};
	c.parse_precedence(Precedence::Unary);
	c.emit_op(op);
}

/// Two-argument intrinsics take a parenthesized, comma-separated pair.
fn intrinsic_pair(c: &mut Compiler, _can_assign: bool) {
	let op = match c.previous.kind {
		TokenKind::Atan2 => OpCode::Atan2,
		TokenKind::Min => OpCode::Min,
		TokenKind::Max => OpCode::Max,
		_ => return,
	};
	c.consume(TokenKind::LeftParen, "Expect '(' after function name.");
	c.expression();
	c.consume(TokenKind::Comma, "Expect ',' between arguments.");
	c.expression();
	c.consume(TokenKind::RightParen, "Expect ')' after arguments.");
	c.emit_op(op);
}

/// Fortran-style `d`/`D` exponents read as `e`; a dangling exponent parses
/// as its valid prefix, matching strtod.
fn parse_number(lexeme: &str) -> f64 {
	let normalized = lexeme.replace(['d', 'D'], "e");
	normalized.parse().unwrap_or_else(|_| {
		let prefix = normalized.trim_end_matches(['+', '-']).trim_end_matches(['e', 'E']);
		prefix.parse().unwrap_or(0.0)
	})
}
