//! The `run` command: compile or load tasks, then dump or drive them.
use std::{io, sync::Arc};

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use mctl_core::prelude::*;
use mctl_model::{
    CommandSpec, ContainerSpec, DEFAULT_CPUS, DEFAULT_MEM_MB, DEFAULT_TASK_NAME, Env, EnvVar, Flag,
    ModelResult, NetworkMode, Parameter, PortMapping, Profile, RepeatedOption, Resources,
    TaskDescriptor, TaskId, TaskOverrides, Volume,
};

use crate::{cli::RunArgs, config::Config, tasks};

/// Build the profile described by the flags, falling back to `config`.
pub fn profile(args: &RunArgs, config: &Config) -> ModelResult<Profile> {
    let env = RepeatedOption::<EnvVar>::parse_all(&args.env)?;
    let volumes = RepeatedOption::<Volume>::parse_all(&args.volumes)?;
    let params = RepeatedOption::<Parameter>::parse_all(&args.params)?;
    let ports = RepeatedOption::<PortMapping>::parse_all(&args.ports)?;
    let net = RepeatedOption::<NetworkMode>::parse_all(&args.net)?;

    let image = args.image.clone().unwrap_or_default();
    let command = CommandSpec {
        value: args.command.clone().unwrap_or_default(),
        user: args.user.clone().unwrap_or_else(|| config.user.clone()),
        shell: Flag::from(args.shell),
        env: Env::from(env.into_vec()),
    };
    let container = ContainerSpec {
        // An image is only usable inside a container.
        enabled: Flag::from(args.docker || !image.trim().is_empty()),
        image,
        privileged: Flag::from(args.privileged),
        network_mode: net.as_slice().last().copied().unwrap_or_default(),
        parameters: params.into_vec(),
        volumes: volumes.into_vec(),
        port_mappings: ports.into_vec(),
    };

    Ok(Profile::new()
        .with_master(master(args, config))
        .with_restart(args.restart)
        .with_command(command)
        .with_container(container))
}

fn master(args: &RunArgs, config: &Config) -> String {
    args.master.clone().unwrap_or_else(|| config.master.clone())
}

/// The profile plus the tasks to run: loaded from `--path`, or one descriptor compiled
/// from the profile.
pub fn compile(args: &RunArgs, config: &Config) -> anyhow::Result<(Profile, Vec<TaskDescriptor>)> {
    let profile = profile(args, config)?;
    if let Some(path) = &args.path {
        return Ok((profile, tasks::load(path)?));
    }
    let overrides = TaskOverrides::new(TaskId::generate())
        .with_name(args.name.as_deref().unwrap_or(DEFAULT_TASK_NAME))
        .with_resources(Resources::new(
            args.cpus.unwrap_or(DEFAULT_CPUS),
            args.mem.unwrap_or(DEFAULT_MEM_MB),
        ));
    let task = profile.task(overrides)?;
    Ok((profile, vec![task]))
}

/// Run the command and return the process exit code.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<i32> {
    let (profile, tasks) = compile(&args, &config)?;

    if args.json {
        tasks::dump(&tasks, io::stdout().lock())?;
        return Ok(EXIT_SUCCESS);
    }

    let master = profile.master();
    let restart = profile.restart();
    let transport = HttpTransport::new(master).context("building http client")?;
    let mut driver = SchedulerDriver::new(Arc::new(transport), config.framework.clone())
        .with_restart(restart);
    info!(%master, tasks = tasks.len(), restart = restart.is_enabled(), "running tasks");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, killing tasks");
            on_signal.cancel();
        }
        // A second interrupt skips the cleanup the first one started.
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("second interrupt, exiting");
            std::process::exit(EXIT_FAILURE);
        }
    });

    let mut reporter = StatusReporter::new(io::stdout());
    let outcome = driver.run(tasks, &mut reporter, cancel).await?;
    debug!(?outcome, state = %driver.state(), "driver finished");

    Ok(match outcome {
        DriverOutcome::Done => reporter.exit_code(),
        DriverOutcome::Interrupted => EXIT_FAILURE,
    })
}
