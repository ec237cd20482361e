use serde::{Deserialize, Serialize};

use crate::{Flag, NetworkMode, Parameter, PortMapping, Volume};

/// Container options as collected from the command line.
///
/// Docker-only fields are validated when parsed but only reach a descriptor when `enabled` is set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContainerSpec {
    pub enabled: Flag,
    pub image: String,
    pub privileged: Flag,
    pub network_mode: NetworkMode,
    pub parameters: Vec<Parameter>,
    pub volumes: Vec<Volume>,
    pub port_mappings: Vec<PortMapping>,
}

impl ContainerSpec {
    /// Materialize the container part of a descriptor.
    ///
    /// - enabled: a Docker container carrying every field;
    /// - disabled with volumes: a plain sandbox that only mounts the volumes;
    /// - disabled without volumes: no container at all.
    pub fn materialize(&self) -> Option<Container> {
        if self.enabled.is_enabled() {
            return Some(Container::Docker {
                image: self.image.clone(),
                privileged: self.privileged,
                network: self.network_mode,
                parameters: self.parameters.clone(),
                volumes: self.volumes.clone(),
                port_mappings: self.port_mappings.clone(),
            });
        }
        if self.volumes.is_empty() {
            None
        } else {
            Some(Container::Mesos {
                volumes: self.volumes.clone(),
            })
        }
    }
}

/// Container part of a compiled descriptor.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum Container {
    /// Manager-native sandbox; only host/container path mounts apply.
    Mesos {
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        volumes: Vec<Volume>,
    },
    /// Docker container started from `image`.
    Docker {
        image: String,
        #[serde(default)]
        privileged: Flag,
        #[serde(default)]
        network: NetworkMode,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        parameters: Vec<Parameter>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        volumes: Vec<Volume>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        port_mappings: Vec<PortMapping>,
    },
}

impl Container {
    /// Returns the kind as a static string.
    pub fn kind(&self) -> &'static str {
        match self {
            Container::Mesos { .. } => "mesos",
            Container::Docker { .. } => "docker",
        }
    }

    pub fn volumes(&self) -> &[Volume] {
        match self {
            Container::Mesos { volumes } | Container::Docker { volumes, .. } => volumes,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Container::Docker { image, .. } => Some(image),
            Container::Mesos { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VolumeMode;

    fn docker_only_fields() -> ContainerSpec {
        ContainerSpec {
            image: "nginx".into(),
            privileged: Flag::enabled(),
            network_mode: NetworkMode::Host,
            parameters: vec![Parameter::new("memory-swap", "1g")],
            port_mappings: vec![PortMapping::tcp(8080, 80)],
            ..ContainerSpec::default()
        }
    }

    #[test]
    fn disabled_container_drops_docker_fields() {
        assert_eq!(docker_only_fields().materialize(), None);
    }

    #[test]
    fn disabled_container_keeps_plain_volumes() {
        let spec = ContainerSpec {
            volumes: vec![Volume::new("/srv", "/data", VolumeMode::ReadOnly)],
            ..docker_only_fields()
        };
        let container = spec.materialize().unwrap();
        assert_eq!(container.kind(), "mesos");
        assert_eq!(container.volumes().len(), 1);
        assert_eq!(container.image(), None);
    }

    #[test]
    fn enabled_container_carries_everything() {
        let spec = ContainerSpec {
            enabled: Flag::enabled(),
            ..docker_only_fields()
        };
        match spec.materialize() {
            Some(Container::Docker {
                image,
                privileged,
                network,
                parameters,
                port_mappings,
                ..
            }) => {
                assert_eq!(image, "nginx");
                assert!(privileged.is_enabled());
                assert_eq!(network, NetworkMode::Host);
                assert_eq!(parameters.len(), 1);
                assert_eq!(port_mappings, vec![PortMapping::tcp(8080, 80)]);
            }
            other => panic!("expected docker container, got {other:?}"),
        }
    }

    #[test]
    fn serde_is_internally_tagged() {
        let c = Container::Mesos { volumes: vec![] };
        assert_eq!(serde_json::to_string(&c).unwrap(), r#"{"type":"mesos"}"#);

        let json = r#"{"type":"docker","image":"redis","portMappings":[{"hostPort":1,"containerPort":2}]}"#;
        let back: Container = serde_json::from_str(json).unwrap();
        assert_eq!(back.image(), Some("redis"));
    }
}
