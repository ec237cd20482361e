//! Mesos v1 scheduler HTTP API transport.
mod leader;
mod map;
mod recordio;
mod transport;
mod wire;

pub use leader::{DEFAULT_MASTER, MASTER_ENV, normalize_master, resolve_leader};
pub use map::task_status;
pub use recordio::{MAX_RECORD_LEN, RecordIo};
pub use transport::{DEFAULT_REFUSE_SECONDS, HttpTransport};
