#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/spreadmap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod export;
pub mod format;
pub mod report;
pub mod tables;

pub use config::OutputConfig;
pub use export::{ExportError, ExportFormat, Exporter};
pub use format::{format_amount, format_cell, format_price};
pub use report::{Report, ReportBuilder, ReportError};
pub use tables::{MatrixTable, PositionsTable, SpreadTable, StrategyTable};
