use std::{io::Write, process};

use palc::Parser;
use reckon::{cli::Cli, ReckonError, VM};

fn main() {
	let cli = Cli::parse();
	let mut vm = VM::new();

	if cli.script.is_empty() && cli.code.is_empty() {
		vm.repl('\n');
		return;
	}

	let snippet = (!cli.code.is_empty()).then(|| join_snippets(&cli.code));

	if cli.verbose {
		println!("Running:");
		for path in &cli.script {
			match std::fs::read_to_string(path) {
				Ok(source) => println!("\n{source}\n################################"),
				Err(e) => {
					eprintln!("Could not open file \"{}\": {e}", path.display());
					exit(74);
				}
			}
		}
		if let Some(snippet) = &snippet {
			println!("\n{snippet}\n################################");
		}
	}

	for path in &cli.script {
		check(vm.run_file(path));
	}
	if let Some(snippet) = &snippet {
		check(vm.interpret(snippet, ';'));
	}

	if cli.repl {
		if cli.verbose {
			println!("Entering REPL mode");
		}
		vm.repl('\n');
	}
}

/// One trailing `;` per snippet is dropped, then each becomes a
/// `;`-terminated line of a single unit.
fn join_snippets(snippets: &[String]) -> String {
	snippets.iter().map(|s| format!("{};\n", s.strip_suffix(';').unwrap_or(s))).collect()
}

fn check(result: reckon::Result<()>) {
	let Err(e) = result else { return };
	let code = match &e {
		ReckonError::File { .. } => {
			eprintln!("{e}");
			74
		}
		ReckonError::CompileErrors(_) => {
			eprintln!("{e}");
			65
		}
		// The runtime diagnostic was already printed where it happened.
		ReckonError::Runtime(_) => 70,
		ReckonError::Internal(_) => {
			eprintln!("{e}");
			70
		}
	};
	exit(code);
}

/// Exit that does not lose buffered program output.
fn exit(code: i32) -> ! {
	let _ = std::io::stdout().flush();
	process::exit(code);
}
