/// A runtime error, carrying the source line the VM was executing. The
/// display form is the two diagnostic lines the user sees on stderr.
#[derive(thiserror::Error, Debug)]
#[error("{kind}\n[line {line}] in script")]
pub struct RuntimeError {
	/// The source line of the instruction that failed.
	line: usize,
	/// What went wrong.
	kind: RuntimeErrorKind,
}

impl RuntimeError {
	pub fn new(line: usize, kind: RuntimeErrorKind) -> Self { Self { line, kind } }

	pub fn kind(&self) -> &RuntimeErrorKind { &self.kind }

	pub fn line(&self) -> usize { self.line }
}

/// Types of runtime errors. IEEE conditions (division by zero, domain errors)
/// are not here on purpose: they propagate as Inf/NaN values instead.
#[derive(Debug)]
pub enum RuntimeErrorKind {
	/// A unary numeric instruction found a non-number.
	NumberOperand,
	/// A binary numeric instruction found a non-number.
	NumberOperands,
	/// `+` applies to two numbers or two strings only.
	AddOperands,
	/// Read or assignment of a name that was never defined.
	UndefinedVariable(String),
	/// More pops than pushes; only possible with hand-built chunks.
	StackUnderflow,
	/// The operand stack hit its fixed capacity.
	StackOverflow,
}

impl std::fmt::Display for RuntimeErrorKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		use RuntimeErrorKind::*;
		match self {
			NumberOperand => write!(f, "Operand must be a number."),
			NumberOperands => write!(f, "Operands must be numbers."),
			AddOperands => write!(f, "Operands must be two numbers or two strings."),
			UndefinedVariable(name) => write!(f, "Undefined variable '{name}'."),
			StackUnderflow => write!(f, "Stack underflow."),
			StackOverflow => write!(f, "Stack overflow."),
		}
	}
}
