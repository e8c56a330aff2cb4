//! CLI argument parsing, exported from the library so integration tests
//! can exercise it.

use std::path::PathBuf;

/// Fully-parsed CLI arguments for a compile-and-run request.
#[derive(Debug)]
pub struct CliArgs {
    pub path: PathBuf,
    /// Write the textual IR to stdout instead of executing.
    pub dump_ir: bool,
    /// Reserved: AST dumping is not implemented yet.
    pub dump_ast: bool,
}

/// Result of `parse_args`.
#[derive(Debug)]
pub enum ParseArgsResult {
    /// Normal compile-and-run (or dump) request.
    Args(CliArgs),
    /// `--help` was present (or no arguments at all); caller should print
    /// usage and exit 0.
    Help,
    /// `--version` was present; caller should print the version and exit 0.
    Version,
}

/// Parses command-line arguments (the full `std::env::args()` slice
/// including `argv[0]`). Unknown flags and missing/extra positional
/// arguments are errors.
pub fn parse_args(args: &[String]) -> Result<ParseArgsResult, String> {
    if args.len() <= 1 {
        return Ok(ParseArgsResult::Help);
    }

    let mut path: Option<PathBuf> = None;
    let mut dump_ir = false;
    let mut dump_ast = false;

    for arg in &args[1..] {
        match arg.as_str() {
            "--help" | "-h" => return Ok(ParseArgsResult::Help),
            "--version" | "-v" => return Ok(ParseArgsResult::Version),
            "--dump-ir" => dump_ir = true,
            "--dump-ast" => dump_ast = true,
            s if s.starts_with('-') => return Err(format!("Unknown option: {}", s)),
            s => {
                if path.is_some() {
                    return Err(format!("Unexpected extra input file: {}", s));
                }
                path = Some(PathBuf::from(s));
            }
        }
    }

    let path = path.ok_or_else(|| "No input file specified".to_owned())?;
    Ok(ParseArgsResult::Args(CliArgs {
        path,
        dump_ir,
        dump_ast,
    }))
}

pub fn help_text() -> String {
    let mut out = String::new();
    out.push_str(&format!("zeroc {} (Zero compiler)\n\n", env!("CARGO_PKG_VERSION")));
    out.push_str("Usage:\n");
    out.push_str("  zeroc <file.zero>            Compile and execute\n");
    out.push_str("  zeroc --dump-ir <file.zero>  Dump IR\n");
    out.push_str("  zeroc --dump-ast <file.zero> Dump AST (reserved)\n");
    out.push_str("  zeroc --help                 Show this help\n");
    out.push_str("  zeroc --version              Show version\n");
    out
}

pub fn version_text() -> String {
    format!("zeroc {}\n", env!("CARGO_PKG_VERSION"))
}
