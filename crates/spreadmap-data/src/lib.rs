#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/spreadmap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod contract;
pub mod error;
pub mod loader;
pub mod snapshot;

pub use config::LoaderConfig;
pub use contract::ContractId;
pub use error::{DataError, Result};
pub use loader::{DateColumn, DefaultedCell, LoadedSnapshots, SheetKind, load_snapshots};
pub use snapshot::{Snapshot, SnapshotTable};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
