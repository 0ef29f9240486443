//! Version and banner text for the CLI/REPL.

pub const VERSION: &str = "0.1.0";
pub const WELCOME_MESSAGE: &str = "gomeo 0.1.0";
pub const WELCOME_SUBTITLE: &str = "a small dynamically-typed, expression-oriented scripting language";

pub const HELP_TEXT: &str = r#"
Enter an expression to evaluate it. `ans` holds the last result.
Use Ctrl-D to exit.
"#;
