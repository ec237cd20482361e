mod domain;
pub use domain::{
    DEFAULT_CPUS, DEFAULT_MEM_MB, DEFAULT_TASK_NAME, DEFAULT_USER, Env, EnvVar, Flag, NetworkMode,
    Parameter, PortMapping, Protocol, RepeatedOption, Resources, TaskId, TaskStatus, Volume,
    VolumeMode,
};

mod error;
pub use error::{ModelError, ModelResult, ValidationError};

mod profile;
pub use profile::{DescriptorBuilder, Profile, TaskOverrides};

mod spec;
pub use spec::{CommandSpec, Container, ContainerSpec, Entrypoint, Invocation, TaskDescriptor};

mod strategy;
pub use strategy::RestartPolicy;
