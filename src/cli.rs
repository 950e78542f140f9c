use std::path::PathBuf;

use palc::Parser;

/// CLI arguments
#[derive(Parser)]
#[command(name = "reckon", after_long_help = "Without any flags, reckon starts the interactive prompt.")]
pub struct Cli {
	/// Script file to run (repeatable)
	#[arg(short = 'i', value_name = "SCRIPT")]
	pub script: Vec<PathBuf>,

	/// Code snippets, joined and run as one unit after any scripts
	#[arg(short = 'c', value_name = "LINE")]
	pub code: Vec<String>,

	/// Echo each source before running it
	#[arg(short = 'v')]
	pub verbose: bool,

	/// Enter the REPL after scripts and snippets
	#[arg(short = 'r')]
	pub repl: bool,
}
