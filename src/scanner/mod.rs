//! Lexical analysis.
//!
//! The scanner hands out one token at a time, on demand, so the single-pass
//! compiler never needs the whole token stream in memory. Lexemes are slices
//! into the source buffer and nothing is allocated per token.
//!
//! `#` starts a comment running to the end of the line. Numbers accept a
//! Fortran-style `d`/`D` exponent introducer alongside `e`/`E`. An identifier
//! may contain `[`/`]` and dotted segments, so host-style names like `a.b[1]`
//! come through as a single token.

mod token;

use TokenKind::*;
pub(crate) use token::*;

/// On-demand tokenizer over a source buffer.
pub(crate) struct Scanner<'a> {
	/// Full source text
	source:  &'a str,
	/// Byte offset of the first character of the lexeme being scanned
	start:   usize,
	/// Byte offset of the character currently being considered
	current: usize,
	/// Source line `current` is on
	line:    usize,
}

fn is_alpha(c: u8) -> bool { c.is_ascii_alphabetic() || c == b'_' }

fn is_ident_part(c: u8) -> bool { c.is_ascii_alphanumeric() || c == b'_' || c == b'[' || c == b']' }

impl<'a> Scanner<'a> {
	pub fn new(source: &'a str) -> Self { Self { source, start: 0, current: 0, line: 1 } }

	/// Scan the next token, skipping leading whitespace and comments.
	pub fn scan_token(&mut self) -> Token<'a> {
		self.skip_whitespace();
		self.start = self.current;
		if self.is_at_end() {
			return self.make_token(Eof);
		}

		let c = self.advance();
		if is_alpha(c) {
			return self.identifier();
		}
		if c.is_ascii_digit() {
			return self.number();
		}
		if c == b'.' && self.peek().is_ascii_digit() {
			return self.number();
		}

		match c {
			b'(' => self.make_token(LeftParen),
			b')' => self.make_token(RightParen),
			b'{' => self.make_token(LeftBrace),
			b'}' => self.make_token(RightBrace),
			b',' => self.make_token(Comma),
			b'.' => self.make_token(Dot),
			b'-' => self.make_token(Minus),
			b'+' => self.make_token(Plus),
			b';' => self.make_token(Semicolon),
			b'%' => self.make_token(Percent),
			b'?' => self.make_token(Question),
			b':' => self.make_token(Colon),
			b'~' => self.make_token(Tilde),
			b'*' => {
				let kind = if self.matches(b'*') { StarStar } else { Star };
				self.make_token(kind)
			}
			b'/' => {
				let kind = if self.matches(b'/') { SlashSlash } else { Slash };
				self.make_token(kind)
			}
			b'!' => {
				let kind = if self.matches(b'=') { BangEqual } else { Bang };
				self.make_token(kind)
			}
			b'=' => {
				let kind = if self.matches(b'=') { EqualEqual } else { Equal };
				self.make_token(kind)
			}
			b'<' => {
				let kind = if self.matches(b'=') { LessEqual } else { Less };
				self.make_token(kind)
			}
			b'>' => {
				let kind = if self.matches(b'=') { GreaterEqual } else { Greater };
				self.make_token(kind)
			}
			b'"' => self.string(),
			_ => self.error_token("Unexpected character!"),
		}
	}

	fn is_at_end(&self) -> bool { self.current >= self.source.len() }

	fn advance(&mut self) -> u8 {
		let c = self.source.as_bytes()[self.current];
		self.current += 1;
		c
	}

	/// The byte under the cursor, or 0 at the end of input.
	fn peek(&self) -> u8 { self.source.as_bytes().get(self.current).copied().unwrap_or(0) }

	fn peek_next(&self) -> u8 { self.source.as_bytes().get(self.current + 1).copied().unwrap_or(0) }

	fn matches(&mut self, expected: u8) -> bool {
		if self.peek() != expected {
			return false;
		}
		self.current += 1;
		true
	}

	fn make_token(&self, kind: TokenKind) -> Token<'a> {
		Token::new(kind, &self.source[self.start..self.current], self.line)
	}

	fn error_token(&self, msg: &'static str) -> Token<'a> { Token::new(Error, msg, self.line) }

	fn skip_whitespace(&mut self) {
		loop {
			match self.peek() {
				b' ' | b'\r' | b'\t' => {
					self.advance();
				}
				b'\n' => {
					self.line += 1;
					self.advance();
				}
				b'#' => {
					while !self.is_at_end() && self.peek() != b'\n' {
						self.advance();
					}
				}
				_ => return,
			}
		}
	}

	fn string(&mut self) -> Token<'a> {
		while !self.is_at_end() && self.peek() != b'"' {
			if self.peek() == b'\n' {
				self.line += 1;
			}
			self.advance();
		}
		if self.is_at_end() {
			return self.error_token("Unterminated string.");
		}
		self.advance(); // the closing quote
		self.make_token(Str)
	}

	fn number(&mut self) -> Token<'a> {
		while self.peek().is_ascii_digit() {
			self.advance();
		}
		if self.peek() == b'.' {
			self.advance();
			while self.peek().is_ascii_digit() {
				self.advance();
			}
		}
		if matches!(self.peek(), b'e' | b'E' | b'd' | b'D') {
			self.advance();
			if matches!(self.peek(), b'+' | b'-') {
				self.advance();
			}
			while self.peek().is_ascii_digit() {
				self.advance();
			}
			if self.peek() == b'.' && self.peek_next().is_ascii_digit() {
				return self.error_token("Cannot have decimal powers!");
			}
		}
		self.make_token(Number)
	}

	fn identifier(&mut self) -> Token<'a> {
		while is_ident_part(self.peek()) {
			self.advance();
		}
		// Dotted segments fold into the same token: `a.b[1]` is one name.
		while self.peek() == b'.' && is_ident_part(self.peek_next()) {
			self.advance();
			while is_ident_part(self.peek()) {
				self.advance();
			}
		}
		let lexeme = &self.source[self.start..self.current];
		Token::new(TokenKind::keyword_or_identifier(lexeme), lexeme, self.line)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Collects the token kinds of an input, excluding the final Eof.
	fn kinds(input: &str) -> Vec<TokenKind> {
		let mut scanner = Scanner::new(input);
		let mut kinds = Vec::new();
		loop {
			let token = scanner.scan_token();
			if token.kind == Eof {
				return kinds;
			}
			kinds.push(token.kind);
		}
	}

	fn first(input: &str) -> Token<'_> { Scanner::new(input).scan_token() }

	#[test]
	fn scan_operators() {
		assert_eq!(
			kinds("( ) { } , . ; % ? : ~"),
			vec![
				LeftParen, RightParen, LeftBrace, RightBrace, Comma, Dot, Semicolon, Percent, Question,
				Colon, Tilde
			]
		);
		assert_eq!(kinds("- + * ** / //"), vec![Minus, Plus, Star, StarStar, Slash, SlashSlash]);
		assert_eq!(kinds("! != = == < <= > >="), vec![
			Bang,
			BangEqual,
			Equal,
			EqualEqual,
			Less,
			LessEqual,
			Greater,
			GreaterEqual
		]);
	}

	#[test]
	fn scan_keywords() {
		assert_eq!(kinds("and or xor nil true false"), vec![And, Or, Xor, Nil, True, False]);
		assert_eq!(kinds("var if else while for"), vec![Var, If, Else, While, For]);
		assert_eq!(kinds("print list return class fun super this"), vec![
			Print, List, Return, Class, Fun, Super, This
		]);
	}

	#[test]
	fn scan_intrinsics() {
		assert_eq!(kinds("exp sin cos tan abs log log10 sign sqrt acos asin atan ceil floor"), vec![
			Exp, Sin, Cos, Tan, Abs, Log, Log10, Sign, Sqrt, Acos, Asin, Atan, Ceil, Floor
		]);
		assert_eq!(kinds("atan2 min max"), vec![Atan2, Min, Max]);
	}

	#[test]
	fn pi_is_exact() {
		assert_eq!(kinds("pi"), vec![Pi]);
		assert_eq!(kinds("pip"), vec![Identifier]);
		assert_eq!(kinds("p"), vec![Identifier]);
	}

	#[test]
	fn scan_identifiers() {
		for name in ["x", "_name", "myVariable123", "snake_case", "CamelCase", "and123"] {
			let token = first(name);
			assert_eq!(token.kind, Identifier);
			assert_eq!(token.lexeme, name);
		}
	}

	#[test]
	fn bracketed_and_dotted_identifiers_are_one_token() {
		for name in ["a[1]", "grid[i][j]", "a.b", "a.b[1]", "node.next.value"] {
			let token = first(name);
			assert_eq!(token.kind, Identifier, "{name}");
			assert_eq!(token.lexeme, name);
		}
		// A trailing dot is not part of the identifier.
		assert_eq!(kinds("a."), vec![Identifier, Dot]);
	}

	#[test]
	fn scan_numbers() {
		for input in ["0", "42", "3.14", "0.5", "123.456", "1.", ".5"] {
			let token = first(input);
			assert_eq!(token.kind, Number, "{input}");
			assert_eq!(token.lexeme, input);
		}
	}

	#[test]
	fn scan_exponents() {
		for input in ["1e5", "1E5", "1d5", "1D5", "1e+5", "1e-5", "2.5d-3"] {
			assert_eq!(first(input).kind, Number, "{input}");
		}
		let token = first("1e2.5");
		assert_eq!(token.kind, Error);
		assert_eq!(token.lexeme, "Cannot have decimal powers!");
	}

	#[test]
	fn scan_strings() {
		let token = first(r#""hello world""#);
		assert_eq!(token.kind, Str);
		assert_eq!(token.lexeme, r#""hello world""#);

		let token = first("\"hello\nworld\"");
		assert_eq!(token.kind, Str);

		let token = first(r#""unterminated"#);
		assert_eq!(token.kind, Error);
		assert_eq!(token.lexeme, "Unterminated string.");
	}

	#[test]
	fn strings_advance_the_line_counter() {
		let mut scanner = Scanner::new("\"a\nb\" x");
		assert_eq!(scanner.scan_token().kind, Str);
		assert_eq!(scanner.scan_token().line, 2);
	}

	#[test]
	fn scan_comments_and_whitespace() {
		assert_eq!(kinds("# a comment"), vec![]);
		assert_eq!(kinds("1 # trailing\n2"), vec![Number, Number]);
		assert_eq!(kinds("  \t\r\n  "), vec![]);
	}

	#[test]
	fn comments_do_not_swallow_the_next_line() {
		let mut scanner = Scanner::new("# comment\nx");
		let token = scanner.scan_token();
		assert_eq!(token.kind, Identifier);
		assert_eq!(token.line, 2);
	}

	#[test]
	fn unknown_character() {
		let token = first("@");
		assert_eq!(token.kind, Error);
		assert_eq!(token.lexeme, "Unexpected character!");
	}

	#[test]
	fn scan_combined() {
		assert_eq!(kinds("var x = 42;"), vec![Var, Identifier, Equal, Number, Semicolon]);
		assert_eq!(kinds("sin x ** 2"), vec![Sin, Identifier, StarStar, Number]);
		assert_eq!(kinds("print(1 + 2);"), vec![
			Print, LeftParen, Number, Plus, Number, RightParen, Semicolon
		]);
	}
}
