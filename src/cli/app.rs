//! Main CLI application

use crate::cli::completion::write_completions;
use crate::config::{parse_config_auto, parse_config_file, validate_config, Config, Overrides};
use crate::error::{ConfigError, GitDistError};
use crate::runner::{invoke, Context, Phase, ProcessExecutor, Verbosity};
use crate::VERSION;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use std::io;
use std::path::PathBuf;
use std::time::Duration;

/// CLI application
pub struct App {
    /// The clap command
    command: Command,
    /// Parsed configuration
    config: Config,
    /// Config file path
    config_path: PathBuf,
}

impl App {
    /// Create a new app from the discovered configuration file
    pub fn new() -> Result<Self, GitDistError> {
        let (config, config_path) = parse_config_auto()?;
        Self::from_config(config, config_path)
    }

    /// Create app with a specific config file
    pub fn with_config_file(path: PathBuf) -> Result<Self, GitDistError> {
        let config = parse_config_file(&path)?;
        Self::from_config(config, path)
    }

    fn from_config(config: Config, config_path: PathBuf) -> Result<Self, GitDistError> {
        validate_config(&config)?;
        let command = build_command(&config);

        Ok(App {
            command,
            config,
            config_path,
        })
    }

    /// Run the application with command line arguments
    pub fn run(mut self) -> Result<(), GitDistError> {
        let matches = self.command.clone().get_matches();

        if let Some(shell) = matches.get_one::<Shell>("completions") {
            write_completions(*shell, &mut self.command, &mut io::stdout());
            return Ok(());
        }

        let (target, target_matches) = match matches.subcommand() {
            Some((name, sub_matches)) => (name.to_string(), sub_matches),
            None => {
                self.command.print_help()?;
                println!();
                return Ok(());
            }
        };

        let phase = target_matches
            .get_one::<String>("phase")
            .ok_or_else(|| ConfigError::Invalid("No phase given".to_string()))?;

        let overrides = parse_overrides(&matches)?;
        let options = self.config.target_options(&target)?;

        let timeout = matches
            .get_one::<u64>("timeout")
            .copied()
            .map(Duration::from_secs)
            .or_else(|| self.config.timeout_for(&target));

        let ctx = Context::new(target)
            .with_task_name(self.config.task_name())
            .with_config_path(self.config_path.clone())
            .with_timeout(timeout)
            .with_verbosity(get_verbosity(&matches));

        let executor = ProcessExecutor::new(ctx.config_dir()).with_timeout(ctx.timeout);

        ctx.print_phase_start(phase);
        let report = invoke(phase, &options, &overrides, &ctx, &executor)?;
        ctx.print_ok(&report);

        Ok(())
    }
}

/// Build the clap command from configuration
pub fn build_command(config: &Config) -> Command {
    let mut cmd = Command::new("git-dist")
        .version(VERSION)
        .about(
            config
                .usage
                .clone()
                .unwrap_or_else(|| "Release a build directory through git".to_string()),
        )
        .arg(
            Arg::new("file")
                .short('f')
                .long("file")
                .value_name("FILE")
                .help("Path to git-dist.yml config file")
                .global(true),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Only print the report and errors")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("silent")
                .short('s')
                .long("silent")
                .help("Print no output")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print resolved options and every command")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .arg(
            Arg::new("set")
                .long("set")
                .value_name("KEY=VALUE")
                .help("Override an option (task.target.key, task.key or key)")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .value_name("SECS")
                .help("Kill any step running longer than this")
                .value_parser(value_parser!(u64).range(1..))
                .global(true),
        )
        .arg(
            Arg::new("completions")
                .long("completions")
                .value_name("SHELL")
                .help("Print a shell completion script")
                .value_parser(value_parser!(Shell)),
        );

    let phases = Phase::ALL
        .iter()
        .map(Phase::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    for (target_name, target) in &config.targets {
        let mut target_cmd = Command::new(target_name.clone())
            .about(target.usage.clone().unwrap_or_default())
            .arg(
                Arg::new("phase")
                    .value_name("PHASE")
                    .required(true)
                    .help(format!("Phase to run ({})", phases)),
            );

        if let Some(desc) = &target.description {
            target_cmd = target_cmd.long_about(desc.clone());
        }

        cmd = cmd.subcommand(target_cmd);
    }

    cmd
}

/// Get verbosity level from matches
fn get_verbosity(matches: &ArgMatches) -> Verbosity {
    if matches.get_flag("silent") {
        Verbosity::Silent
    } else if matches.get_flag("quiet") {
        Verbosity::Quiet
    } else if matches.get_flag("verbose") {
        Verbosity::Verbose
    } else {
        Verbosity::Normal
    }
}

/// Collect `--set` overrides
fn parse_overrides(matches: &ArgMatches) -> Result<Overrides, GitDistError> {
    let pairs = matches
        .get_many::<String>("set")
        .into_iter()
        .flatten()
        .map(String::as_str);
    Ok(Overrides::from_pairs(pairs)?)
}

/// Run the CLI application with provided arguments
pub fn run() -> Result<(), GitDistError> {
    // Check if --file flag is provided first
    let args: Vec<String> = std::env::args().collect();
    let file_path = extract_file_arg(&args);

    let app = if let Some(path) = file_path {
        App::with_config_file(path)?
    } else {
        App::new()?
    };

    app.run()
}

/// Extract --file argument before clap parsing
fn extract_file_arg(args: &[String]) -> Option<PathBuf> {
    for i in 0..args.len() {
        if (args[i] == "--file" || args[i] == "-f") && i + 1 < args.len() {
            return Some(PathBuf::from(&args[i + 1]));
        }
        if let Some(path) = args[i].strip_prefix("--file=") {
            return Some(PathBuf::from(path));
        }
    }
    None
}
