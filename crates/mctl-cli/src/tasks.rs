//! Descriptor files: the `--json` dump and the `--path` loader read the same format.
use std::{fs, io::Write, path::Path};

use anyhow::Context;

use mctl_model::TaskDescriptor;

/// Write `tasks` as an indented JSON array followed by a newline.
pub fn dump<W: Write>(tasks: &[TaskDescriptor], mut out: W) -> anyhow::Result<()> {
    serde_json::to_writer_pretty(&mut out, tasks)?;
    writeln!(out)?;
    Ok(())
}

/// Load and validate descriptors written by [`dump`].
pub fn load(path: &Path) -> anyhow::Result<Vec<TaskDescriptor>> {
    let raw =
        fs::read_to_string(path).with_context(|| format!("reading tasks {}", path.display()))?;
    let tasks: Vec<TaskDescriptor> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing tasks {}", path.display()))?;
    for task in &tasks {
        task.validate()
            .with_context(|| format!("task {} in {}", task.id, path.display()))?;
    }
    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use mctl_model::{
        CommandSpec, ContainerSpec, Flag, NetworkMode, PortMapping, Profile, TaskId, TaskOverrides,
    };

    fn tasks() -> Vec<TaskDescriptor> {
        let plain = Profile::new()
            .with_command(CommandSpec::new("echo hi"))
            .task(TaskOverrides::new(TaskId::generate()))
            .unwrap();
        let docker = Profile::new()
            .with_container(ContainerSpec {
                enabled: Flag::enabled(),
                image: "nginx".into(),
                network_mode: NetworkMode::Host,
                port_mappings: vec![PortMapping::tcp(8080, 80)],
                ..ContainerSpec::default()
            })
            .task(TaskOverrides::new(TaskId::generate()).with_name("web"))
            .unwrap();
        vec![plain, docker]
    }

    #[test]
    fn dump_then_load_reproduces_descriptors() {
        let tasks = tasks();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        dump(&tasks, &mut file).unwrap();

        let loaded = load(file.path()).unwrap();
        assert_eq!(loaded, tasks);
    }

    #[test]
    fn dump_is_an_indented_array() {
        let mut out = Vec::new();
        dump(&tasks(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("[\n  {"));
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn invalid_descriptor_is_refused() {
        let mut bad = tasks().remove(0);
        bad.command.value.clear();
        let mut file = tempfile::NamedTempFile::new().unwrap();
        dump(&[bad], &mut file).unwrap();
        assert!(load(file.path()).is_err());
    }
}
