use clap::Parser;
use gomeo::config::{HELP_TEXT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use gomeo::{builtins, new_root_environment};
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::process::ExitCode;

/// A small dynamically-typed, expression-oriented scripting language
#[derive(Parser, Debug)]
#[command(name = "gomeo")]
#[command(version = VERSION)]
#[command(about = "An interpreter for the gomeo scripting language")]
struct CliArgs {
    /// Script file to run (omit to start the REPL)
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let root = new_root_environment();
    builtins::register_run(&root);

    match args.script {
        Some(path) => run_script(&path, &root),
        None => {
            run_repl(&root);
            ExitCode::SUCCESS
        }
    }
}

/// Reads and evaluates a script file, exiting 1 with the diagnostic on
/// stderr if it fails - the non-interactive counterpart to the REPL that
/// the original shell did not offer, but which the library's `run` entry
/// point supports directly.
fn run_script(path: &PathBuf, root: &std::rc::Rc<gomeo::env::Environment>) -> ExitCode {
    let source_name = path.display().to_string();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("Cannot read script file {source_name}: {e}");
            return ExitCode::FAILURE;
        }
    };

    match gomeo::run(&source_name, &text, root) {
        Ok(_) => ExitCode::SUCCESS,
        Err(diagnostic) => {
            eprintln!("{diagnostic}");
            ExitCode::FAILURE
        }
    }
}

const HISTORY_FILE: &str = ".gomeo_history";

/// The interactive read-eval-print loop. The root environment (and its
/// `ans` binding) persists for the whole session, so later lines can
/// refer to earlier results and to bindings `run` pulled in from files.
fn run_repl(root: &std::rc::Rc<gomeo::env::Environment>) {
    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");
    println!("{HELP_TEXT}");

    let config = Config::builder().auto_add_history(true).build();
    let mut rl = match Editor::<(), _>::with_config(config) {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to initialize REPL: {e}");
            return;
        }
    };
    let _ = rl.load_history(HISTORY_FILE);

    loop {
        match rl.readline("gomeo> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                match gomeo::run("<stdin>", &line, root) {
                    Ok(value) => println!("{value}"),
                    Err(diagnostic) => eprintln!("{diagnostic}"),
                }
            }
            // Ctrl-C restarts the prompt loop in place rather than
            // recursing into the whole program again.
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{e}");
                break;
            }
        }
    }

    let _ = rl.save_history(HISTORY_FILE);
}
