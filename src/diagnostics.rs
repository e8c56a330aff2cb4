//! "Frame & Focus" diagnostic rendering.
//!
//! Resolves a span through the [`SourceManager`] and produces a framed
//! source excerpt with a caret run under the offending range, followed by
//! a `[ Focus ]` message and an optional `[ Help ]` suggestion:
//!
//! ```text
//! [ ERROR ] SyntaxError in 'file.zero'
//!   --> Line 3, Col 5
//!
//!    2 | let x = 10
//!    3 | let y =
//!      |        ^
//!      | [ Focus ]: Expected expression
//!      | [ Help ]: every let binding needs an initializer
//! ```
//!
//! Output is plain text; terminal coloring belongs to the host runtime.

use std::fmt::Write;

use crate::source::{SourceFile, SourceManager, Span};

/// Category printed in the report header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Lexical,
    Syntax,
    Type,
    Runtime,
}

impl ReportKind {
    pub fn name(self) -> &'static str {
        match self {
            ReportKind::Lexical => "LexicalError",
            ReportKind::Syntax => "SyntaxError",
            ReportKind::Type => "TypeError",
            ReportKind::Runtime => "RuntimeError",
        }
    }
}

/// Renders one diagnostic. When the span cannot be resolved the header and
/// focus line are emitted alone.
pub fn render(
    sm: &SourceManager,
    kind: ReportKind,
    message: &str,
    span: Span,
    help: Option<&str>,
) -> String {
    let mut out = String::new();

    let filename = sm
        .get_path(span.source_id)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<unknown>".to_owned());

    let _ = writeln!(out, "[ ERROR ] {} in '{}'", kind.name(), filename);

    let (line, col) = sm.get_line_col(span);
    match sm.get(span.source_id) {
        Some(file) if line > 0 => {
            render_frame(&mut out, file, span, line, col, message, help);
        }
        _ => {
            let _ = writeln!(out, "  [ Focus ]: {}", message);
            if let Some(help) = help {
                let _ = writeln!(out, "  [ Help ]: {}", help);
            }
        }
    }

    out
}

fn render_frame(
    out: &mut String,
    file: &SourceFile,
    span: Span,
    line: u32,
    col: u32,
    message: &str,
    help: Option<&str>,
) {
    let _ = writeln!(out, "  --> Line {}, Col {}\n", line, col);

    let width = line.to_string().len();
    let gutter = format!(" {:>width$} | ", "", width = width);

    // One line of leading context when available.
    if line > 1 {
        let _ = writeln!(
            out,
            " {:>width$} | {}",
            line - 1,
            file.line(line - 1),
            width = width
        );
    }
    let source_line = file.line(line);
    let _ = writeln!(out, " {:>width$} | {}", line, source_line, width = width);

    // Caret run under the offending range; at least one caret, clipped to
    // the end of the line.
    let indent = (col as usize).saturating_sub(1);
    let remaining = source_line.len().saturating_sub(indent).max(1);
    let carets = (span.len() as usize).clamp(1, remaining);
    let _ = writeln!(out, "{}{}{}", gutter, " ".repeat(indent), "^".repeat(carets));

    let _ = writeln!(out, "{}[ Focus ]: {}", gutter, message);
    if let Some(help) = help {
        let _ = writeln!(out, "{}[ Help ]: {}", gutter, help);
    }
}
