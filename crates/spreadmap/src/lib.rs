#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/spreadmap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod analysis;
pub mod config;

// Re-export main types from sub-crates
pub use spreadmap_data as data;
pub use spreadmap_engine as engine;
pub use spreadmap_output as output;

pub use analysis::{Analysis, AnalysisError, ExportedFile};
pub use config::AppConfig;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
