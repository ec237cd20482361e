mod command;
pub use command::CommandSpec;

mod container;
pub use container::{Container, ContainerSpec};

mod descriptor;
pub use descriptor::{Entrypoint, Invocation, TaskDescriptor};
