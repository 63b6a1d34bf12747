pub mod cluster;
pub mod config;
pub mod control;
pub mod error;
pub mod policy;
pub mod reconcile;
pub mod schedule;

pub use cluster::{ClusterError, Namespace, NamespaceApi};
pub use config::{LoopConfig, ReaperConfig};
pub use control::{Clock, ControlLoop, ScheduleState, SystemClock, Termination};
pub use error::{ReaperError, Result};
pub use policy::{RetentionPolicy, NEVER_DELETE, PRESERVE_LABEL};
pub use reconcile::{reconcile, ReconcileReport};
pub use schedule::{next_occurrence, Schedule};
