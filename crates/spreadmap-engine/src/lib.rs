#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/spreadmap/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod config;
pub mod decomposition;
pub mod error;
pub mod matrix;
pub mod position;
pub mod ranking;
pub mod spread;
pub mod strategy;

// Re-export main types
pub use config::EngineConfig;
pub use decomposition::{
    ContractEffect, Measure, Reconciliation, StrategyDecomposition, WaterfallStage, WaterfallStep,
};
pub use error::{EngineError, Result};
pub use matrix::{ContributionMatrix, MatrixMode, PairContribution};
pub use position::{PositionChange, QuantityCheck, compute_all};
pub use ranking::{RankedPair, rank};
pub use spread::{
    Direction, SpreadComparison, SpreadPl, effective_quantity, find_cash_three_month,
};
pub use strategy::Strategy;
