mod test_runner;

use std::io;
use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::EnvFilter;

use bmx::{Document, ParseError};

const SUBCOMMANDS: &[&str] = &["check", "show", "get", "test", "help"];

/// Path that selects standard input.
const STDIN_PATH: &str = "-";

#[derive(Parser)]
#[command(name = "bmx", version, about = "Block Mixture (BMX) reader and writer")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log parser activity to stderr (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse a BMX file and report syntax errors
    Check(FileArgs),

    /// Print a BMX file in normalized form
    Show(ShowArgs),

    /// Print one block or one attribute value
    Get(GetArgs),

    /// Run .test.bmx conformance files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct FileArgs {
    /// BMX source file, or - for stdin
    file: String,
}

#[derive(clap::Args)]
struct ShowArgs {
    /// BMX source file, or - for stdin
    file: String,

    /// Dump the parsed document structure
    #[arg(long)]
    ast: bool,

    /// List all block names with their kinds
    #[arg(long)]
    list_blocks: bool,
}

#[derive(clap::Args)]
struct GetArgs {
    /// BMX source file, or - for stdin
    file: String,

    /// Block name
    block: String,

    /// Attribute key (attribute blocks only)
    key: Option<String>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.bmx file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    // `bmx file.bmx` is shorthand for `bmx show file.bmx`.
    let mut args: Vec<String> = std::env::args().collect();
    if let Some(pos) = args
        .iter()
        .skip(1)
        .position(|a| !a.starts_with('-') || a == STDIN_PATH)
        .map(|i| i + 1)
    {
        if !SUBCOMMANDS.contains(&args[pos].as_str()) {
            args.insert(pos, "show".to_string());
        }
    }

    let cli = Cli::parse_from(&args);
    init_tracing(cli.verbose);

    let color_choice = if cli.no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    match cli.command {
        Command::Check(args) => {
            load_or_exit(&args.file, color_choice);
            eprintln!("ok: {} parsed successfully", args.file);
        }
        Command::Show(args) => do_show(args, color_choice),
        Command::Get(args) => do_get(args, color_choice),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn do_show(args: ShowArgs, color_choice: ColorChoice) {
    let document = load_or_exit(&args.file, color_choice);

    if args.ast {
        println!("{:#?}", document);
        return;
    }

    if args.list_blocks {
        for name in document.block_names() {
            if let Some(text) = document.text(name) {
                println!("[{}] text ({} lines)", name, text.lines().count());
            } else if let Some(entries) = document.attribute_block(name) {
                println!("[@{}] attribute ({} entries)", name, entries.len());
            }
        }
        return;
    }

    print!("{}", bmx::dumps(&document));
}

fn do_get(args: GetArgs, color_choice: ColorChoice) {
    let document = load_or_exit(&args.file, color_choice);

    let found = match &args.key {
        Some(key) => match document.attribute(&args.block, key) {
            Some(value) => {
                println!("{}", value);
                true
            }
            None => false,
        },
        None => {
            if let Some(text) = document.text(&args.block) {
                print!("{}", text);
                true
            } else if let Some(entries) = document.attribute_block(&args.block) {
                for (key, value) in entries {
                    println!("{} = {}", key, value);
                }
                true
            } else {
                false
            }
        }
    };

    if !found {
        match &args.key {
            Some(key) => eprintln!("error: no attribute '{}' in block '{}'", key, args.block),
            None => eprintln!("error: no block named '{}'", args.block),
        }
        process::exit(1);
    }
}

/// Load `file` (or stdin for `-`), printing diagnostics and exiting on failure.
fn load_or_exit(file: &str, color_choice: ColorChoice) -> Document {
    if file == STDIN_PATH {
        return match bmx::loads(io::stdin().lock()) {
            Ok(document) => document,
            Err(error) => {
                emit_plain_error(STDIN_PATH, &error);
                process::exit(1);
            }
        };
    }

    let source = match std::fs::read_to_string(file) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", file, e);
            process::exit(1);
        }
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(file.to_string(), source.clone());

    match bmx::load(&source) {
        Ok(document) => document,
        Err(error) => {
            let writer = StandardStream::stderr(color_choice);
            let config = term::Config::default();
            let diagnostic = error.to_diagnostic(&files, file_id);
            let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
            process::exit(1);
        }
    }
}

/// Report an error without a file database: message plus the pointer hint.
fn emit_plain_error(name: &str, error: &ParseError) {
    eprintln!("error: {}: {}", name, error);
    if let Some(hint) = error.hint() {
        for line in hint.lines() {
            eprintln!("  {}", line);
        }
    }
}
