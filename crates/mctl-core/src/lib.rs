pub mod config;
pub mod driver;
pub mod error;
pub mod mesos;
pub mod reporter;
pub mod supervisor;
pub mod transport;

#[cfg(test)]
mod testing;

pub mod prelude {
    pub use crate::config::FrameworkConfig;
    pub use crate::driver::{DriverEvent, DriverOutcome, DriverState, SchedulerDriver};
    pub use crate::error::{CoreError, TransportError};
    pub use crate::mesos::HttpTransport;
    pub use crate::reporter::{EXIT_FAILURE, EXIT_SUCCESS, Report, StatusReporter};
    pub use crate::transport::{ManagerEvent, StatusUpdate, Transport};
}
