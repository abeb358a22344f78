// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{info, warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::PathBuf;
use std::io::Write;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use scriptcut::app_config::{self, Config};
use scriptcut::app_controller::Controller;
use scriptcut::file_utils::FileManager;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Import a screenplay PDF, or every PDF in a directory
    Import {
        /// Input PDF file or directory to process
        #[arg(value_name = "INPUT_PATH")]
        input_path: PathBuf,

        /// Also save the imported scenes as a named project
        #[arg(short, long)]
        project: Option<String>,

        /// Force overwrite of existing output files (directory mode)
        #[arg(short, long)]
        force_overwrite: bool,
    },

    /// List the scenes of the current session
    Scenes,

    /// Replace the content of a scene with the contents of a file
    Edit {
        /// Scene id as shown by `scenes`
        scene_id: String,

        /// File holding the new scene content
        #[arg(long, value_name = "FILE")]
        from_file: PathBuf,

        /// Position of the scene, for ids that appear more than once
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Revert the last edit of a scene
    Undo {
        /// Scene id as shown by `scenes`
        scene_id: String,

        /// Position of the scene, for ids that appear more than once
        #[arg(short, long)]
        index: Option<usize>,
    },

    /// Export the current session (`.json` scene list, `.docx` document, anything else text)
    Export {
        /// Output file
        #[arg(value_name = "OUTPUT")]
        output: PathBuf,
    },

    /// Attach analysis results (creative, marketing, summary) from a JSON file
    Analysis {
        /// JSON file with the analysis results
        #[arg(long, value_name = "FILE")]
        from_file: PathBuf,
    },

    /// Show the action plan, or attach a new one from a JSON file
    Plan {
        /// JSON array of plan tasks
        #[arg(long, value_name = "FILE", requires = "strategy")]
        from_file: Option<PathBuf>,

        /// Strategy the plan serves
        #[arg(short, long)]
        strategy: Option<String>,
    },

    /// Mark the plan subtask of a scene as done
    Task {
        /// Scene id as listed in the plan
        scene_id: String,

        /// Mark as not done instead
        #[arg(long)]
        reopen: bool,
    },

    /// List saved projects
    Projects,

    /// Load a saved project into the current session
    Open {
        /// Project id as shown by `projects`
        project_id: String,
    },

    /// Save the current session to its project
    Save {
        /// Project name (new projects, or rename)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Generate shell completions for scriptcut
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// scriptcut - screenplay scene segmentation
///
/// Splits screenplay PDFs into numbered scenes and keeps an editable
/// session of the result.
#[derive(Parser, Debug)]
#[command(name = "scriptcut")]
#[command(version)]
#[command(about = "Split screenplay PDFs into scenes")]
#[command(long_about = "scriptcut extracts the text of a screenplay PDF and splits it into scenes.

EXAMPLES:
    scriptcut import script.pdf                    # Segment into the current session
    scriptcut import script.pdf -p \"Pilot\"         # Also save as a project
    scriptcut import scripts/                      # Write <name>.scenes.json per PDF
    scriptcut scenes                               # List scenes (* edited, ? check heading)
    scriptcut edit 12 --from-file scene12.txt      # Replace a scene's content
    scriptcut undo 12                              # Revert that edit
    scriptcut export draft.txt                     # Write the screenplay back out
    scriptcut export draft.docx                    # ... as a formatted Word document
    scriptcut plan --from-file plan.json -s \"Scarier act two\"
    scriptcut task 12                              # Tick scene 12 off the plan
    scriptcut completions bash > scriptcut.bash    # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum)]
    log_level: Option<CliLogLevel>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "1;31",
            Level::Warn => "1;33",
            Level::Info => "1;32",
            Level::Debug => "1;36",
            Level::Trace => "1;35",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let mut stderr = std::io::stderr();
            let _ = writeln!(
                stderr,
                "\x1B[{}m{} {:<5} {}\x1B[0m",
                Self::color_for_level(record.level()),
                now,
                record.level(),
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // The logger accepts everything; the effective level is set through max_level
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(*shell, &mut cmd, "scriptcut", &mut std::io::stdout());
        return Ok(());
    }

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &cli.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&cli.config_path)?;
    if let Some(log_level) = &cli.log_level {
        config.log_level = log_level.clone().into();
    } else {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;
    run_command(&controller, cli.command).await
}

async fn run_command(controller: &Controller, command: Commands) -> Result<()> {
    match command {
        Commands::Import { input_path, project, force_overwrite } => {
            if input_path.is_dir() {
                controller.run_folder(&input_path, force_overwrite).await?;
            } else if input_path.is_file() {
                let session = controller.import_file(&input_path, project.as_deref()).await?;
                if !session.needs_review.is_empty() {
                    warn!(
                        "{} scene heading(s) need review, marked with '?' in `scriptcut scenes`",
                        session.needs_review.len()
                    );
                }
            } else {
                return Err(anyhow::anyhow!("Input path does not exist: {:?}", input_path));
            }
        }
        Commands::Scenes => {
            let session = controller.load_session()?;
            for line in Controller::describe_scenes(&session) {
                println!("{}", line);
            }
        }
        Commands::Edit { scene_id, from_file, index } => {
            let content = FileManager::read_to_string(&from_file)
                .with_context(|| format!("Failed to read new content from {:?}", from_file))?;
            controller.edit_scene(&scene_id, index, content.trim())?;
        }
        Commands::Undo { scene_id, index } => {
            controller.undo_scene(&scene_id, index)?;
        }
        Commands::Export { output } => {
            controller.export(&output)?;
        }
        Commands::Analysis { from_file } => {
            let results = controller.attach_analysis(&from_file)?;
            for point in results.summary {
                println!("{}: {}", point.kind, point.detail);
            }
        }
        Commands::Plan { from_file, strategy } => {
            if let Some(path) = from_file {
                controller.attach_plan(&path, strategy.as_deref().unwrap_or_default())?;
            }
            let session = controller.load_session()?;
            match Controller::describe_plan(&session) {
                Some(lines) => {
                    for line in lines {
                        println!("{}", line);
                    }
                    if let Some(progress) = session.plan_progress() {
                        println!("{}", progress);
                    }
                }
                None => info!("No action plan; attach one with `scriptcut plan --from-file`"),
            }
        }
        Commands::Task { scene_id, reopen } => {
            controller.mark_task(&scene_id, !reopen).await?;
        }
        Commands::Projects => {
            let projects = controller.list_projects().await?;
            if projects.is_empty() {
                info!("No saved projects");
            }
            for project in projects {
                println!("{}", project);
            }
        }
        Commands::Open { project_id } => {
            controller.open_project(&project_id).await?;
        }
        Commands::Save { name } => {
            let project = controller.save_project(name.as_deref()).await?;
            println!("{}", project);
        }
        Commands::Completions { .. } => {}
    }

    Ok(())
}
