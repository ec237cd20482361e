mod kv;
pub use kv::{EnvVar, Parameter};

mod env;
pub use env::Env;

mod flag;
pub use flag::Flag;

mod network;
pub use network::NetworkMode;

mod port;
pub use port::{PortMapping, Protocol};

mod volume;
pub use volume::{Volume, VolumeMode};

mod repeated;
pub use repeated::RepeatedOption;

mod id;
pub use id::TaskId;

mod status;
pub use status::TaskStatus;

mod resources;
pub use resources::{DEFAULT_CPUS, DEFAULT_MEM_MB, Resources};

/// Default user a task runs as.
pub const DEFAULT_USER: &str = "root";

/// Default task name.
pub const DEFAULT_TASK_NAME: &str = "mctl";
