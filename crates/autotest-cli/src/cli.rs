//! Argument definitions

use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;

/// Build the `autotest` command
#[must_use]
pub fn command() -> Command {
    Command::new("autotest")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Generate pytest suites for Python functions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level (RUST_LOG takes precedence)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("generate")
                .about("Plan and write tests for one function")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("Python source file containing the function"),
                )
                .arg(
                    Arg::new("function")
                        .required(true)
                        .help("Name of the top-level function to test"),
                )
                .arg(
                    Arg::new("tests-dir")
                        .long("tests-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Root directory for generated test files"),
                )
                .arg(
                    Arg::new("prompts-dir")
                        .long("prompts-dir")
                        .value_parser(value_parser!(PathBuf))
                        .help("Directory holding <name>_prompt.md templates"),
                )
                .arg(
                    Arg::new("model")
                        .long("model")
                        .help("Chat model to use"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("TOML configuration file (default: ./autotest.toml if present)"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the generated module instead of saving it"),
                )
                .arg(
                    Arg::new("dump-state")
                        .long("dump-state")
                        .value_parser(value_parser!(PathBuf))
                        .help("Write the final pipeline state as JSON to this path"),
                ),
        )
        .subcommand(
            Command::new("list")
                .about("List top-level functions of a Python file")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
        .subcommand(Command::new("graph").about("Print the pipeline graph as Mermaid text"))
}

/// Parsed `generate` arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateArgs {
    pub file: PathBuf,
    pub function: String,
    pub tests_dir: Option<PathBuf>,
    pub prompts_dir: Option<PathBuf>,
    pub model: Option<String>,
    pub config: Option<PathBuf>,
    pub dry_run: bool,
    pub dump_state: Option<PathBuf>,
}

impl GenerateArgs {
    /// Extract from the `generate` subcommand matches
    ///
    /// Returns `None` if a required argument is absent, which clap already
    /// rejects during parsing.
    #[must_use]
    pub fn from_matches(args: &ArgMatches) -> Option<Self> {
        Some(Self {
            file: args.get_one::<PathBuf>("file")?.clone(),
            function: args.get_one::<String>("function")?.clone(),
            tests_dir: args.get_one::<PathBuf>("tests-dir").cloned(),
            prompts_dir: args.get_one::<PathBuf>("prompts-dir").cloned(),
            model: args.get_one::<String>("model").cloned(),
            config: args.get_one::<PathBuf>("config").cloned(),
            dry_run: args.get_flag("dry-run"),
            dump_state: args.get_one::<PathBuf>("dump-state").cloned(),
        })
    }
}
