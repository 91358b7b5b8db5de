use anyhow::Context;
use stackcc::backend::assembler::Lowering;
use stackcc::backend::codegen::codegen;
use stackcc::frontend::ast::Function;
use stackcc::frontend::ast_printer::AstPrinter;
use stackcc::frontend::diagnostic::Diagnostic;
use stackcc::frontend::lexer::Lexer;
use stackcc::frontend::parser::Parser;
use stackcc::frontend::source::SourceFile;
use stackcc::frontend::token::Token;
use stackcc::metrics;
use stackcc::{CompileError, CompileOptions, lower};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::fs;
use std::io::{self, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Ord, PartialOrd, Eq, PartialEq, Debug, Clone, Copy)]
enum CommandArg {
    Lex,
    Parse,
    Codegen,
    CodeEmit,
}

#[derive(Debug)]
struct MainError {
    message: &'static str,
}

impl Display for MainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl Error for MainError {}

fn main() -> Result<(), anyhow::Error> {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    let executable_name = args.first().map_or("stackcc", String::as_str);
    let mut rest: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();

    if rest.first() == Some(&"stats") {
        return match rest.as_slice() {
            [_] => run_stats(Path::new(".")),
            [_, dir] => run_stats(Path::new(dir)),
            _ => {
                print_usage(executable_name)?;
                Err(MainError {
                    message: "Invalid number of arguments.",
                }
                .into())
            }
        };
    }

    let strict = match rest.iter().position(|arg| *arg == "--strict") {
        Some(index) => {
            rest.remove(index);
            true
        }
        None => false,
    };

    let (command, input_file) = match rest.as_slice() {
        [input_file] => (CommandArg::CodeEmit, *input_file),
        [flag, input_file] => {
            let command = match *flag {
                "--lex" => CommandArg::Lex,
                "--parse" => CommandArg::Parse,
                "--codegen" => CommandArg::Codegen,
                _ => {
                    print_usage(executable_name)?;
                    return Err(MainError {
                        message: "Unknown command.",
                    }
                    .into());
                }
            };
            (command, *input_file)
        }
        _ => {
            print_usage(executable_name)?;
            return Err(MainError {
                message: "Invalid number of arguments.",
            }
            .into());
        }
    };

    let source = read_source(Path::new(input_file))?;
    tracing::debug!(file = input_file, ?command, strict, "starting compilation");

    let tokens = report(run_lexer(&source), &source)?;
    if command == CommandArg::Lex {
        let mut stdout = stdout().lock();
        for token in &tokens {
            writeln!(stdout, "{:?} {}..{}", token.kind, token.span.start, token.span.end)?;
        }
        return Ok(());
    }

    let function = report(run_parser(tokens), &source)?;
    if command == CommandArg::Parse {
        AstPrinter::new(stdout().lock()).print_function(&function)?;
        return Ok(());
    }

    let assembly = report(run_compiler(&function, &source, strict), &source)?;
    if command == CommandArg::Codegen {
        print!("{}", assembly);
        return Ok(());
    }

    let assembly_file = PathBuf::from(input_file).with_extension("asm");
    run_codegen(&assembly, &assembly_file)?;
    tracing::info!(output = %assembly_file.display(), "wrote assembly");

    Ok(())
}

/// `RUST_LOG` picks the level; `warn` otherwise.
fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn read_source(path: &Path) -> anyhow::Result<Arc<SourceFile>> {
    let mut buffer = fs::read_to_string(path)
        .with_context(|| format!("Unable to read {}", path.display()))?;
    if buffer.starts_with('\u{FEFF}') {
        // Skip BOM
        buffer.remove(0);
    }
    Ok(SourceFile::new(path.to_path_buf(), buffer))
}

/// Prints a compile error against its source and turns it into the process error.
fn report<T>(result: Result<T, CompileError>, source: &Arc<SourceFile>) -> anyhow::Result<T> {
    result.map_err(|err| {
        eprint!("{}", err.to_diagnostic(source.clone()));
        MainError {
            message: "Compilation failed.",
        }
        .into()
    })
}

fn run_lexer(source: &SourceFile) -> Result<Vec<Token>, CompileError> {
    Ok(Lexer::new(&source.content).to_tokens()?)
}

fn run_parser(tokens: Vec<Token>) -> Result<Function, CompileError> {
    let mut parser = Parser::new(tokens);
    Ok(parser.parse()?)
}

fn run_compiler(
    function: &Function,
    source: &Arc<SourceFile>,
    strict: bool,
) -> Result<String, CompileError> {
    let lowering = lower(function, CompileOptions { strict })?;
    if let Lowering::Stub(unsupported) = &lowering {
        let message = format!("{}; emitting `halt`", unsupported);
        eprint!("{}", Diagnostic::warning(message, source.clone(), unsupported.span));
    }
    Ok(codegen(&lowering))
}

fn run_codegen(assembly: &str, assembly_file: &Path) -> anyhow::Result<()> {
    fs::write(assembly_file, assembly)
        .with_context(|| format!("Unable to write {}", assembly_file.display()))
}

fn run_stats(dir: &Path) -> anyhow::Result<()> {
    let users = metrics::load_data(dir)
        .with_context(|| format!("Unable to load user data from {}", dir.display()))?;

    let mut stdout = stdout().lock();
    for (label, value) in [
        ("average age", metrics::average_age(&users)),
        ("average payment", metrics::average_payment_amount(&users)),
        ("payment stddev", metrics::stddev_payment_amount(&users)),
    ] {
        match value {
            Some(value) => writeln!(stdout, "{:<16} {:.2}", label, value)?,
            None => writeln!(stdout, "{:<16} n/a", label)?,
        }
    }
    Ok(())
}

fn print_usage(arg0: &str) -> io::Result<()> {
    let mut stdout = stdout().lock();
    let name = arg0.rsplit('/').next().unwrap_or(arg0);
    writeln!(
        stdout,
        "Usage: {name} [--strict] [--lex | --parse | --codegen] <input file>\n       {name} stats [data dir]"
    )?;
    Ok(())
}
