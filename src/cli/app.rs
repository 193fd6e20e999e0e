//! Main CLI application

use crate::cli::scripts;
use crate::config::{Config, Locator};
use crate::profile::{FileNotifier, Root, RootProvider, NOTIFY_LOG_FILE_NAME};
use crate::runner::{RunOptions, RunResult, Runtime, SystemRunner};
use crate::ui;
use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use clap_complete::Shell;
use log::LevelFilter;
use std::env;
use std::ffi::OsString;
use std::io;
use std::sync::Arc;

/// Environment variable overriding the log filter
pub const LOG_ENV_VAR: &str = "WEBDASH_LOG";

/// Commands handled by the client itself rather than by a config
pub mod native {
    pub const HELP: &str = "help";
    pub const LIST: &str = "list";
    pub const LIST_DEFINITIONS: &str = "list-definitions";
    pub const COMPLETIONS: &str = "completions";
    pub const CREATE_BUILD_INIT: &str = "_internal_:create-build-init";
    pub const CREATE_PROJECT_CLONER: &str = "_internal_:create-project-cloner";

    pub const INTERNAL_PREFIX: &str = "_internal_:";

    pub const ALL: &[&str] = &[
        HELP,
        LIST,
        LIST_DEFINITIONS,
        COMPLETIONS,
        CREATE_BUILD_INIT,
        CREATE_PROJECT_CLONER,
    ];

    /// Native commands shown to users
    pub fn public() -> Vec<&'static str> {
        ALL.iter()
            .copied()
            .filter(|c| !c.starts_with(INTERNAL_PREFIX))
            .collect()
    }
}

/// Parsed command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct App {
    /// Positional arguments: a native command or a config/command reference
    pub args: Vec<String>,

    /// Number of `-v` flags
    pub verbose: u8,

    /// Suppress banners and logging
    pub quiet: bool,

    pub options: RunOptions,
}

impl App {
    /// Parse from clap matches
    pub fn from_matches(matches: &ArgMatches) -> Self {
        App {
            args: matches
                .get_many::<String>("args")
                .map(|values| values.cloned().collect())
                .unwrap_or_default(),
            verbose: matches.get_count("verbose"),
            quiet: matches.get_flag("quiet"),
            options: RunOptions::default()
                .with_capture_output(matches.get_flag("capture"))
                .with_frequency_only(matches.get_flag("frequency-only")),
        }
    }

    /// Default log level for the verbosity flags
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Off;
        }

        match self.verbose {
            0 => LevelFilter::Error,
            1 => LevelFilter::Warn,
            2 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        }
    }

    /// Run the application, returning the process exit code
    pub fn run(self) -> Result<i32> {
        let first = self.args.first().map(String::as_str);

        match first {
            Some(native::HELP) => {
                build_command().print_help()?;
                println!();
                return Ok(0);
            }
            Some(native::COMPLETIONS) => return self.print_completions(),
            _ => {}
        }

        let cwd = env::current_dir().context("Failed to get current directory")?;
        let root = Arc::new(Root::discover(&cwd).context("WebDash root not found")?);
        let provider: Arc<dyn RootProvider> = root.clone();
        let locator = Locator::new(cwd, provider);

        log::info!(
            "WebDash: Client (root: {})",
            root.root_directory().display()
        );
        log::info!("> args[{}] = {:?}", self.args.len(), self.args);

        let rest = self.args.get(1..).unwrap_or_default();
        match first {
            Some(native::LIST) => self.list(&locator, rest),
            Some(native::LIST_DEFINITIONS) => self.list_definitions(&locator, rest),
            Some(native::CREATE_BUILD_INIT) if rest.is_empty() => {
                let path = scripts::write_terminal_init(&root)
                    .context("Failed to write the terminal init script")?;
                println!("{}", path.display());
                Ok(0)
            }
            Some(native::CREATE_PROJECT_CLONER) if rest.is_empty() => {
                let path = scripts::write_project_cloner(&root)
                    .context("Failed to write the project cloner script")?;
                println!("{}", path.display());
                Ok(0)
            }
            _ => self.run_config_command(locator, &root),
        }
    }

    fn print_completions(&self) -> Result<i32> {
        let Some(name) = self.args.get(1) else {
            bail!("Usage: webdash completions <shell>");
        };
        let shell: Shell = name
            .parse()
            .map_err(|e| anyhow::anyhow!("Unknown shell '{}': {}", name, e))?;

        let mut command = build_command();
        clap_complete::generate(shell, &mut command, "webdash", &mut io::stdout());
        Ok(0)
    }

    fn list(&self, locator: &Locator, args: &[String]) -> Result<i32> {
        match locator.locate(args) {
            Some((config, _)) => {
                ui::print_task_list(config.path(), &config.task_list());
                Ok(0)
            }
            None => Ok(self.no_match(locator)),
        }
    }

    fn list_definitions(&self, locator: &Locator, args: &[String]) -> Result<i32> {
        match locator.locate(args) {
            Some((config, _)) => {
                ui::print_definitions(&config.substitutions());
                Ok(0)
            }
            None => Ok(self.no_match(locator)),
        }
    }

    fn run_config_command(&self, locator: Locator, root: &Root) -> Result<i32> {
        let Some((mut config, command)) = locator.locate(&self.args) else {
            return Ok(self.no_match(&locator));
        };

        let notify_log = root
            .log_dir()
            .context("Failed to create the log directory")?
            .join(NOTIFY_LOG_FILE_NAME);

        let runtime = Runtime::new(locator)
            .with_runner(SystemRunner::new().with_quiet(self.quiet))
            .with_notifier(FileNotifier::new(notify_log))
            .with_options(self.options);

        let results = config
            .run(&command, &runtime)
            .with_context(|| format!("Failed to run '{}'", command))?;

        if results.is_empty() {
            print_no_match(Some(&config));
            return Ok(1);
        }

        if self.options.capture_output {
            for result in &results {
                ui::print_captured(&result.output);
            }
        }

        Ok(exit_code(&results))
    }

    fn no_match(&self, locator: &Locator) -> i32 {
        let located = locator.locate(&self.args).map(|(config, _)| config);
        print_no_match(located.as_ref());
        1
    }
}

fn print_no_match(config: Option<&Config>) {
    let tasks = config.map(Config::task_list);
    let listing = config.zip(tasks.as_deref()).map(|(c, t)| (c.path(), t));
    ui::print_no_match(listing, &native::public());
}

/// 0 when every task succeeded, 1 otherwise
pub fn exit_code(results: &[RunResult]) -> i32 {
    if results.iter().all(RunResult::is_success) {
        0
    } else {
        1
    }
}

/// Build the clap command
pub fn build_command() -> Command {
    Command::new("webdash")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Run tasks defined in webdash.config.json files")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Print more log output (repeat for more)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .help("Print no banners or log output")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("capture")
                .long("capture")
                .help("Collect task output and print it after the run")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("frequency-only")
                .long("frequency-only")
                .help("Only run tasks that declare a frequency")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("args")
                .value_name("ARGS")
                .help("[<path>][:<command>], <path> <command>, or a native command")
                .num_args(0..)
                .action(ArgAction::Append),
        )
}

/// Initialize env_logger with `level` unless WEBDASH_LOG is set
pub fn init_logger(level: LevelFilter) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    if let Ok(filters) = env::var(LOG_ENV_VAR) {
        builder.parse_filters(&filters);
    }
    builder.format_timestamp(None);

    // A logger may already be installed when running inside tests.
    let _ = builder.try_init();
}

/// Run the CLI application with the process arguments
pub fn run() -> Result<i32> {
    run_from(env::args_os())
}

/// Run the CLI application with provided arguments
pub fn run_from<I, T>(args: I) -> Result<i32>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command().get_matches_from(args);
    let app = App::from_matches(&matches);

    init_logger(app.log_level());
    app.run()
}
