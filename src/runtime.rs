//! Built-in runtime functions.
//!
//! The host registers these with the interpreter before `execute`; Zero
//! programs reach them as ordinary calls (`print(...)`, `log(...)`).
//! Formatting lives in pure `format_*` helpers so the exact output is
//! testable; the externals stringify their arguments, format, and write to
//! stdout. Missing inputs degrade to a diagnostic on stderr, never a
//! crash.

use crate::error::InterpError;
use crate::interp::{Interpreter, RuntimeValue};

/// Registers the default built-ins (`print`, `log`, `print_traced`,
/// `print_piped`, `print_fstring`, `print_ex`) on an interpreter.
pub fn install(interp: &mut Interpreter) {
    interp.register_external("print", Box::new(print_external));
    interp.register_external("log", Box::new(log_external));
    interp.register_external("print_traced", Box::new(print_traced_external));
    interp.register_external("print_piped", Box::new(print_piped_external));
    interp.register_external("print_fstring", Box::new(print_fstring_external));
    interp.register_external("print_ex", Box::new(print_ex_external));
}

// ---------------------------------------------------------------------------
// Pure formatting helpers
// ---------------------------------------------------------------------------

/// ANSI escape sequence for a color name, or `None` for unknown names.
pub fn color_code(name: &str) -> Option<&'static str> {
    match name {
        "red" => Some("\x1b[31m"),
        "green" => Some("\x1b[32m"),
        "yellow" => Some("\x1b[33m"),
        "blue" => Some("\x1b[34m"),
        "magenta" => Some("\x1b[35m"),
        "cyan" => Some("\x1b[36m"),
        "white" => Some("\x1b[37m"),
        "reset" => Some("\x1b[0m"),
        _ => None,
    }
}

/// `log` formatting: wraps the message in color escapes when `ansi` is set
/// and the color name is known.
pub fn format_log(message: &str, color: Option<&str>, ansi: bool) -> String {
    if ansi {
        if let Some(code) = color.and_then(color_code) {
            return format!("{}{}\x1b[0m", code, message);
        }
    }
    message.to_owned()
}

/// `print_traced` formatting: prepends a `[TRACE] ` tag when the flag is
/// set.
pub fn format_traced(message: &str, trace: bool) -> String {
    if trace {
        format!("[TRACE] {}", message)
    } else {
        message.to_owned()
    }
}

/// `print_piped` formatting: `label: value` when a non-empty label is
/// present.
pub fn format_piped(value: &str, label: Option<&str>) -> String {
    match label {
        Some(label) if !label.is_empty() => format!("{}: {}", label, value),
        _ => value.to_owned(),
    }
}

/// `print_fstring` formatting: parts concatenated in order.
pub fn format_fstring(parts: &[String]) -> String {
    parts.concat()
}

/// `print_ex` formatting: selects plain (0), traced (1), or piped (2).
/// Unknown modes fall back to plain.
pub fn format_ex(message: &str, mode: i64, extra: Option<&str>) -> String {
    match mode {
        1 => format_traced(message, true),
        2 => format_piped(message, extra),
        _ => message.to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Externals
// ---------------------------------------------------------------------------

/// The string form of an argument, or `None` when it is absent or unit.
fn arg_text(args: &[RuntimeValue], index: usize) -> Option<String> {
    match args.get(index) {
        None | Some(RuntimeValue::Unit) => None,
        Some(value) => Some(value.to_string()),
    }
}

fn missing_input(name: &str) -> Result<RuntimeValue, InterpError> {
    eprintln!("[RUNTIME ERROR] {}: missing message argument", name);
    Ok(RuntimeValue::Unit)
}

fn print_external(args: &[RuntimeValue]) -> Result<RuntimeValue, InterpError> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.to_string());
    }
    println!("{}", out);
    Ok(RuntimeValue::Unit)
}

fn log_external(args: &[RuntimeValue]) -> Result<RuntimeValue, InterpError> {
    let Some(message) = arg_text(args, 0) else {
        return missing_input("log");
    };
    let color = arg_text(args, 1);
    let ansi = args.get(2).map_or(false, |v| v.to_int() != 0);
    println!("{}", format_log(&message, color.as_deref(), ansi));
    Ok(RuntimeValue::Unit)
}

fn print_traced_external(args: &[RuntimeValue]) -> Result<RuntimeValue, InterpError> {
    let Some(message) = arg_text(args, 0) else {
        return missing_input("print_traced");
    };
    let trace = args.get(1).map_or(false, |v| v.to_int() != 0);
    println!("{}", format_traced(&message, trace));
    Ok(RuntimeValue::Unit)
}

fn print_piped_external(args: &[RuntimeValue]) -> Result<RuntimeValue, InterpError> {
    let Some(value) = arg_text(args, 0) else {
        return missing_input("print_piped");
    };
    let label = arg_text(args, 1);
    println!("{}", format_piped(&value, label.as_deref()));
    Ok(RuntimeValue::Unit)
}

fn print_fstring_external(args: &[RuntimeValue]) -> Result<RuntimeValue, InterpError> {
    let parts: Vec<String> = args.iter().map(|v| v.to_string()).collect();
    println!("{}", format_fstring(&parts));
    Ok(RuntimeValue::Unit)
}

fn print_ex_external(args: &[RuntimeValue]) -> Result<RuntimeValue, InterpError> {
    let Some(message) = arg_text(args, 0) else {
        return missing_input("print_ex");
    };
    let mode = args.get(1).map_or(0, |v| v.to_int());
    let extra = arg_text(args, 2);
    println!("{}", format_ex(&message, mode, extra.as_deref()));
    Ok(RuntimeValue::Unit)
}
