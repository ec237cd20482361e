use std::path::PathBuf;

use clap::{Args, CommandFactory, Parser, Subcommand, error::ErrorKind};

use mctl_core::prelude::{EXIT_FAILURE, EXIT_SUCCESS};
use mctl_observe::{LoggerFormat, LoggerLevel};

#[derive(Debug, Parser)]
#[command(name = "mctl", version, about = "Run tasks on Mesos")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log filter, for example `warn` or `mctl_core=debug,warn`
    #[arg(long, global = true, env = "MCTL_LOG")]
    pub log_level: Option<LoggerLevel>,

    /// Log output format: text, json or journald
    #[arg(long, global = true, env = "MCTL_LOG_FORMAT")]
    pub log_format: Option<LoggerFormat>,

    /// JSON profile with defaults for master, user, framework and logger settings
    #[arg(long, global = true, env = "MCTL_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run tasks on Mesos
    Run(RunArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Command to run
    #[arg(value_name = "CMD")]
    pub command: Option<String>,

    /// User to run as [default: root]
    #[arg(long)]
    pub user: Option<String>,

    /// Run as a shell command
    #[arg(long)]
    pub shell: bool,

    /// Mesos master; the leader is discovered when empty
    #[arg(long)]
    pub master: Option<String>,

    /// JSON file of task descriptors, as written by --json
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// Print the compiled tasks as JSON instead of running them
    #[arg(long)]
    pub json: bool,

    /// Run as a Docker container
    #[arg(long)]
    pub docker: bool,

    /// Image to run
    #[arg(long)]
    pub image: Option<String>,

    /// Restart the task when it fails
    #[arg(long)]
    pub restart: bool,

    /// Run in privileged mode [docker only]
    #[arg(long)]
    pub privileged: bool,

    /// Environment variable, KEY=VALUE
    #[arg(short = 'e', long = "env", value_name = "KEY=VALUE")]
    pub env: Vec<String>,

    /// Volume mapping, HOST:CONTAINER[:RO|RW]
    #[arg(short = 'v', long = "volume", value_name = "HOST:CONTAINER[:MODE]")]
    pub volumes: Vec<String>,

    /// Network mode: BRIDGE, HOST, NONE or USER [docker only]
    #[arg(long = "net", value_name = "MODE")]
    pub net: Vec<String>,

    /// Freeform Docker parameter, KEY=VALUE [docker only]
    #[arg(long = "param", value_name = "KEY=VALUE")]
    pub params: Vec<String>,

    /// Port mapping, HOST:CONTAINER[/tcp|udp] [docker only]
    #[arg(short = 'p', long = "port", value_name = "HOST:CONTAINER[/PROTO]")]
    pub ports: Vec<String>,

    /// CPUs to allocate [default: 0.1]
    #[arg(long)]
    pub cpus: Option<f64>,

    /// Memory to allocate in MiB [default: 64]
    #[arg(long)]
    pub mem: Option<f64>,

    /// Task name [default: mctl]
    #[arg(long)]
    pub name: Option<String>,
}

impl RunArgs {
    /// Nothing to run: no command, no image and no descriptor file.
    pub fn is_missing_input(&self) -> bool {
        let blank = |v: &Option<String>| v.as_deref().is_none_or(|s| s.trim().is_empty());
        blank(&self.command) && blank(&self.image) && self.path.is_none()
    }
}

/// Exit code for a command line clap refused. Help and version output count as success.
pub fn usage_exit_code(err: &clap::Error) -> i32 {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => EXIT_SUCCESS,
        _ => EXIT_FAILURE,
    }
}

/// Long help of `run`, with usage lines naming the full `mctl run` invocation.
pub fn run_help() -> String {
    let mut cmd = Cli::command();
    cmd.build();
    cmd.find_subcommand_mut("run")
        .map(|run| run.render_long_help().to_string())
        .unwrap_or_default()
}
