//! One-call attribution pipeline.
//!
//! [`Analysis::run`] takes loaded snapshots through every engine stage:
//! per-contract P/L, the quantity check, the strategy decomposition, the
//! Cash/3M spread, the three contribution matrices and their
//! reconciliation. The result serializes as the payload of a JSON report.

use crate::config::AppConfig;
use serde::Serialize;
use spreadmap_data::{
    ContractId, DataError, DateColumn, DefaultedCell, LoadedSnapshots, SnapshotTable,
};
use spreadmap_engine::{
    ContributionMatrix, EngineError, MatrixMode, PositionChange, QuantityCheck, RankedPair,
    Reconciliation, SpreadComparison, Strategy, StrategyDecomposition, WaterfallStep, compute_all,
    find_cash_three_month, rank,
};
use spreadmap_output::{ExportError, ExportFormat, Exporter, Report, ReportBuilder, ReportError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while running or exporting an analysis.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Loading the input sheets failed.
    #[error(transparent)]
    Data(#[from] DataError),

    /// An engine precondition was violated.
    #[error(transparent)]
    Engine(#[from] EngineError),

    /// Writing an export failed.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Building the report failed.
    #[error(transparent)]
    Report(#[from] ReportError),

    /// The config document is not valid JSON for [`AppConfig`].
    #[error("Invalid config: {0}")]
    Config(serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A file written by [`Analysis::export`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedFile {
    /// What the file holds, e.g. `matrix_delta`.
    pub name: String,
    /// Where it was written.
    pub path: PathBuf,
}

/// Results of every attribution stage for one start/end pair.
#[derive(Debug, Clone, Serialize)]
pub struct Analysis {
    /// Start observation column.
    pub start: DateColumn,

    /// End observation column.
    pub end: DateColumn,

    /// Contract universe in sheet order.
    pub contracts: Vec<ContractId>,

    /// Per-contract Hold and Actual P/L.
    pub positions: Vec<PositionChange>,

    /// Net quantity diagnostic.
    pub quantity_check: QuantityCheck,

    /// Strategy totals and breakdown.
    pub decomposition: StrategyDecomposition,

    /// Hold → effect → Actual bars.
    pub waterfall: [WaterfallStep; 3],

    /// Cash/3M spread, when both prompts are present.
    pub cash_three_month: Option<SpreadComparison>,

    /// Hold contribution matrix.
    pub hold: ContributionMatrix,

    /// Actual contribution matrix.
    pub actual: ContributionMatrix,

    /// `actual - hold`.
    pub delta: ContributionMatrix,

    /// Matrix effect vs strategy effect.
    pub reconciliation: Reconciliation,

    /// Delta cells ranked by magnitude.
    pub ranked_delta: Vec<RankedPair>,

    /// Input cells that defaulted to zero.
    pub defaulted: Vec<DefaultedCell>,

    #[serde(skip)]
    start_table: SnapshotTable,

    #[serde(skip)]
    end_table: SnapshotTable,
}

impl Analysis {
    /// Run every stage over loaded snapshots.
    ///
    /// # Errors
    ///
    /// Propagates [`EngineError`]s; with a loader-produced universe these
    /// only occur when the universe is empty.
    pub fn run(loaded: LoadedSnapshots, config: &AppConfig) -> Result<Self, AnalysisError> {
        let LoadedSnapshots {
            start,
            end,
            start_table,
            end_table,
            contracts,
            defaulted,
        } = loaded;
        tracing::debug!(
            start = %start,
            end = %end,
            contracts = contracts.len(),
            "running attribution"
        );

        let positions = compute_all(&start_table, &end_table, &contracts);
        let quantity_check =
            QuantityCheck::from_positions(&positions, config.engine.quantity_tolerance);
        let decomposition = StrategyDecomposition::compute(&positions);

        let cash_three_month = find_cash_three_month(&contracts)
            .map(|(cash, three_month)| {
                SpreadComparison::compute(&start_table, &end_table, &cash, &three_month)
            })
            .transpose()?;

        let hold = ContributionMatrix::from_positions(&positions, Strategy::Hold)?;
        let actual = ContributionMatrix::from_positions(&positions, Strategy::Actual)?;
        let delta = ContributionMatrix::difference(&actual, &hold)?;
        let reconciliation =
            decomposition.reconcile(&hold, &actual, config.engine.reconciliation_tolerance)?;
        let ranked_delta = rank(&delta);
        tracing::debug!(
            hold_total = hold.total(),
            actual_total = actual.total(),
            "matrices built"
        );

        Ok(Self {
            waterfall: decomposition.waterfall(),
            start,
            end,
            contracts,
            positions,
            quantity_check,
            decomposition,
            cash_three_month,
            hold,
            actual,
            delta,
            reconciliation,
            ranked_delta,
            defaulted,
            start_table,
            end_table,
        })
    }

    /// Load both sheets from disk and run.
    pub fn from_paths(
        prices: impl AsRef<Path>,
        quantities: impl AsRef<Path>,
        config: &AppConfig,
    ) -> Result<Self, AnalysisError> {
        let loaded = LoadedSnapshots::from_paths(prices, quantities, &config.loader)?;
        Self::run(loaded, config)
    }

    /// Matrix for `mode`.
    pub const fn matrix(&self, mode: MatrixMode) -> &ContributionMatrix {
        match mode {
            MatrixMode::Hold => &self.hold,
            MatrixMode::Actual => &self.actual,
            MatrixMode::Delta => &self.delta,
        }
    }

    /// Cells of the `mode` matrix ranked by magnitude.
    pub fn ranked(&self, mode: MatrixMode) -> Vec<RankedPair> {
        match mode {
            MatrixMode::Delta => self.ranked_delta.clone(),
            _ => rank(self.matrix(mode)),
        }
    }

    /// Hold vs Actual for any named pair in the universe.
    ///
    /// # Errors
    ///
    /// [`EngineError::SameContract`] or [`EngineError::UnknownContract`].
    pub fn spread(
        &self,
        near: &ContractId,
        far: &ContractId,
    ) -> Result<SpreadComparison, AnalysisError> {
        Ok(SpreadComparison::compute(
            &self.start_table,
            &self.end_table,
            near,
            far,
        )?)
    }

    /// JSON report with the period labels and this analysis as contents.
    pub fn report(&self) -> Result<Report, AnalysisError> {
        Ok(ReportBuilder::new()
            .period(self.start.label.clone(), self.end.label.clone())
            .contents(self)?
            .build())
    }

    /// Write positions, ranked Delta pairs and all three matrices to `dir`.
    pub fn export(
        &self,
        dir: &Path,
        format: ExportFormat,
    ) -> Result<Vec<ExportedFile>, AnalysisError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(5);
        write_export(dir, "positions", self.positions.as_slice(), format, &mut written)?;
        write_export(dir, "pairs_delta", self.ranked_delta.as_slice(), format, &mut written)?;
        write_export(dir, "matrix_hold", &self.hold, format, &mut written)?;
        write_export(dir, "matrix_actual", &self.actual, format, &mut written)?;
        write_export(dir, "matrix_delta", &self.delta, format, &mut written)?;
        Ok(written)
    }
}

fn write_export<E: Exporter + ?Sized>(
    dir: &Path,
    name: &str,
    data: &E,
    format: ExportFormat,
    written: &mut Vec<ExportedFile>,
) -> Result<(), AnalysisError> {
    let path = dir.join(format!("{name}.{}", format.extension()));
    data.export_to_file(&path, format)?;
    tracing::debug!(path = %path.display(), "exported");
    written.push(ExportedFile {
        name: name.to_string(),
        path,
    });
    Ok(())
}
