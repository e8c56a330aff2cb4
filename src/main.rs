use std::process;

use zeroc::cli::{help_text, parse_args, version_text, CliArgs, ParseArgsResult};
use zeroc::diagnostics::{render, ReportKind};
use zeroc::interp::Interpreter;
use zeroc::ir::print_module;
use zeroc::parser::Parser;
use zeroc::sema::Sema;
use zeroc::source::{SourceManager, Span};
use zeroc::{lower, runtime};

fn main() {
    let args: Vec<String> = std::env::args().collect();

    match parse_args(&args) {
        Ok(ParseArgsResult::Help) => {
            print!("{}", help_text());
        }
        Ok(ParseArgsResult::Version) => {
            print!("{}", version_text());
        }
        Ok(ParseArgsResult::Args(cli)) => {
            process::exit(run(cli));
        }
        Err(message) => {
            eprintln!("error: {}", message);
            process::exit(1);
        }
    }
}

fn run(cli: CliArgs) -> i32 {
    let mut sm = SourceManager::new();
    let id = match sm.load(&cli.path) {
        Ok(id) => id,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", cli.path.display(), e);
            return 1;
        }
    };

    // 1. Parse.
    let mut parser = Parser::new(&sm, id);
    let program = parser.parse();
    if parser.had_error() {
        for diag in parser.errors() {
            let kind = if diag.lexical {
                ReportKind::Lexical
            } else {
                ReportKind::Syntax
            };
            eprint!("{}", render(&sm, kind, &diag.message, diag.span, None));
        }
        return 1;
    }

    // 2. Semantic analysis.
    let mut sema = Sema::new();
    zeroc::register_default_builtins(&mut sema);
    sema.analyze(&program);
    if sema.had_error() {
        for err in sema.errors() {
            eprint!("{}", render(&sm, ReportKind::Type, &err.message, err.span, None));
        }
        return 1;
    }

    // 3. Lower to IR.
    let module = lower::lower(&program);

    if cli.dump_ir {
        print!("{}", print_module(&module));
        return 0;
    }
    if cli.dump_ast {
        println!("AST dump not yet implemented");
        return 0;
    }

    // 4. Execute. The program's int return value becomes the exit code.
    let mut interp = Interpreter::new();
    runtime::install(&mut interp);

    match interp.execute(&module, "main") {
        Ok(_) => interp.exit_code(),
        Err(e) => {
            eprint!(
                "{}",
                render(&sm, ReportKind::Runtime, &e.to_string(), Span::invalid(), None)
            );
            1
        }
    }
}
