//! Descriptor to `TaskInfo` and Mesos task state to [`TaskStatus`].
use mctl_model::{Container, Entrypoint, Invocation, ModelResult, TaskDescriptor, TaskStatus};

use super::wire::{
    CommandInfo, ContainerInfo, DockerInfo, Environment, Id, ParameterInfo, PortMappingInfo,
    Resource, TaskInfo, Variable, VolumeInfo,
};

/// Build the `TaskInfo` launched on `agent_id` for one submission of `task`.
pub fn to_task_info(
    manager_id: &str,
    agent_id: &str,
    task: &TaskDescriptor,
) -> ModelResult<TaskInfo> {
    let entrypoint = task.entrypoint()?;
    let invocation = match &entrypoint {
        Entrypoint::Process(inv) => Some(inv),
        Entrypoint::Image { command, .. } => command.as_ref(),
    };

    let (shell, value, arguments) = match invocation {
        Some(Invocation::Shell(script)) => (true, Some(script.clone()), Vec::new()),
        Some(Invocation::Exec(argv)) => (false, argv.first().cloned(), argv.clone()),
        None => (false, None, Vec::new()),
    };

    let environment = (!task.command.env.is_empty()).then(|| Environment {
        variables: task
            .command
            .env
            .iter()
            .map(|v| Variable {
                name: v.name().to_string(),
                value: v.value().to_string(),
            })
            .collect(),
    });

    Ok(TaskInfo {
        name: task.name.clone(),
        task_id: Id::new(manager_id),
        agent_id: Id::new(agent_id),
        resources: vec![
            Resource::scalar("cpus", task.resources.cpus),
            Resource::scalar("mem", task.resources.mem),
        ],
        command: CommandInfo {
            shell,
            value,
            arguments,
            user: task.command.user.clone(),
            environment,
        },
        container: task.container.as_ref().map(container_info),
    })
}

fn container_info(container: &Container) -> ContainerInfo {
    let volumes = container
        .volumes()
        .iter()
        .map(|v| VolumeInfo {
            host_path: v.host_path.clone(),
            container_path: v.container_path.clone(),
            mode: v.mode.as_str(),
        })
        .collect();

    match container {
        Container::Mesos { .. } => ContainerInfo {
            kind: "MESOS",
            volumes,
            docker: None,
        },
        Container::Docker {
            image,
            privileged,
            network,
            parameters,
            port_mappings,
            ..
        } => ContainerInfo {
            kind: "DOCKER",
            volumes,
            docker: Some(DockerInfo {
                image: image.clone(),
                network: network.as_str(),
                privileged: privileged.is_enabled(),
                port_mappings: port_mappings
                    .iter()
                    .map(|p| PortMappingInfo {
                        host_port: p.host_port,
                        container_port: p.container_port,
                        protocol: p.protocol.as_str(),
                    })
                    .collect(),
                parameters: parameters
                    .iter()
                    .map(|p| ParameterInfo {
                        key: p.key().to_string(),
                        value: p.value().to_string(),
                    })
                    .collect(),
            }),
        },
    }
}

/// Map a Mesos `TaskState` name onto [`TaskStatus`].
///
/// States this client does not know are treated as lost.
pub fn task_status(state: &str) -> TaskStatus {
    match state {
        "TASK_STAGING" => TaskStatus::Staging,
        "TASK_STARTING" => TaskStatus::Starting,
        "TASK_RUNNING" | "TASK_KILLING" => TaskStatus::Running,
        "TASK_FINISHED" => TaskStatus::Finished,
        "TASK_FAILED" => TaskStatus::Failed,
        "TASK_KILLED" => TaskStatus::Killed,
        "TASK_ERROR" => TaskStatus::Error,
        _ => TaskStatus::Lost,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mctl_model::{
        CommandSpec, Env, EnvVar, Flag, NetworkMode, PortMapping, Resources, TaskId, Volume,
        VolumeMode,
    };

    fn descriptor(command: CommandSpec, container: Option<Container>) -> TaskDescriptor {
        TaskDescriptor {
            id: TaskId::generate(),
            name: "mctl".into(),
            resources: Resources::default(),
            command,
            container,
        }
    }

    #[test]
    fn exec_command_keeps_argv() {
        let task = descriptor(CommandSpec::new("echo hi"), None);
        let info = to_task_info("t.0", "agent-1", &task).unwrap();
        assert!(!info.command.shell);
        assert_eq!(info.command.value.as_deref(), Some("echo"));
        assert_eq!(info.command.arguments, vec!["echo", "hi"]);
        assert_eq!(info.command.user, "root");
        assert!(info.container.is_none());
        assert_eq!(info.agent_id.value, "agent-1");
        assert_eq!(info.resources[0].name, "cpus");
        assert_eq!(info.resources[1].scalar.value, 64.0);
    }

    #[test]
    fn shell_command_and_env() {
        let mut command = CommandSpec::new("echo $A | wc -c");
        command.shell = Flag::enabled();
        command.env = Env::from(vec![EnvVar::new("A", "1"), EnvVar::new("A", "2")]);
        let info = to_task_info("t.0", "a", &descriptor(command, None)).unwrap();

        assert!(info.command.shell);
        assert_eq!(info.command.value.as_deref(), Some("echo $A | wc -c"));
        assert!(info.command.arguments.is_empty());
        let vars = info.command.environment.unwrap().variables;
        assert_eq!(vars.len(), 2);
        assert_eq!(vars[1].value, "2");
    }

    #[test]
    fn docker_container_maps_every_field() {
        let container = Container::Docker {
            image: "nginx".into(),
            privileged: Flag::enabled(),
            network: NetworkMode::Host,
            parameters: vec![],
            volumes: vec![Volume::new("/srv", "/data", VolumeMode::ReadWrite)],
            port_mappings: vec![PortMapping::tcp(8080, 80)],
        };
        let info = to_task_info("t.1", "a", &descriptor(CommandSpec::default(), Some(container)))
            .unwrap();

        assert_eq!(info.command.value, None);
        let c = info.container.unwrap();
        assert_eq!(c.kind, "DOCKER");
        assert_eq!(c.volumes[0].mode, "RW");
        let docker = c.docker.unwrap();
        assert_eq!(docker.network, "HOST");
        assert!(docker.privileged);
        assert_eq!(docker.port_mappings[0].protocol, "tcp");

        let json = serde_json::to_value(&docker).unwrap();
        assert!(json.get("parameters").is_none());
    }

    #[test]
    fn plain_volumes_use_mesos_container() {
        let container = Container::Mesos {
            volumes: vec![Volume::new("/srv", "/data", VolumeMode::ReadOnly)],
        };
        let info =
            to_task_info("t.0", "a", &descriptor(CommandSpec::new("ls"), Some(container))).unwrap();
        let c = info.container.unwrap();
        assert_eq!(c.kind, "MESOS");
        assert!(c.docker.is_none());
    }

    #[test]
    fn descriptor_without_entrypoint_is_refused() {
        assert!(to_task_info("t.0", "a", &descriptor(CommandSpec::default(), None)).is_err());
    }

    #[test]
    fn states_map_onto_status() {
        assert_eq!(task_status("TASK_STAGING"), TaskStatus::Staging);
        assert_eq!(task_status("TASK_KILLING"), TaskStatus::Running);
        assert_eq!(task_status("TASK_FINISHED"), TaskStatus::Finished);
        assert_eq!(task_status("TASK_KILLED"), TaskStatus::Killed);
        assert_eq!(task_status("TASK_ERROR"), TaskStatus::Error);
        for lost in ["TASK_LOST", "TASK_DROPPED", "TASK_GONE", "TASK_UNREACHABLE", "TASK_UNKNOWN"] {
            assert_eq!(task_status(lost), TaskStatus::Lost);
        }
    }
}
