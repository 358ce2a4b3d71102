//! Loading snapshot tables from wide price and quantity sheets.
//!
//! Both sheets share one layout: the first column holds the contract label
//! and every other header names an observation date. The loader picks two
//! date columns present in both sheets and builds a start and an end
//! [`SnapshotTable`] from them.
//!
//! Cells that are blank or do not parse become `0.0`. Each one is recorded
//! as a [`DefaultedCell`] so callers can tell missing data from real zeros.

use crate::config::LoaderConfig;
use crate::contract::ContractId;
use crate::error::{DataError, Result};
use crate::snapshot::{Snapshot, SnapshotTable};
use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Number of leading values inspected when deciding if a column is numeric.
const NUMERIC_SAMPLE: usize = 5;

/// Date formats tried when ordering column headers.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"];

/// Which input sheet a value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SheetKind {
    /// Settlement prices
    Prices,
    /// Position quantities
    Quantities,
}

impl fmt::Display for SheetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Prices => write!(f, "prices"),
            Self::Quantities => write!(f, "quantities"),
        }
    }
}

/// An observation date column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateColumn {
    /// Header text as it appears in the sheet.
    pub label: String,

    /// Calendar date, when the header parses as one.
    pub date: Option<NaiveDate>,
}

impl DateColumn {
    /// Create a column, parsing the label as a date where possible.
    pub fn new(label: impl Into<String>) -> Self {
        let label = label.into();
        let date = parse_date(&label);
        Self { label, date }
    }
}

impl fmt::Display for DateColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label)
    }
}

/// A cell that was blank or unparseable and defaulted to zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultedCell {
    /// Sheet holding the cell.
    pub sheet: SheetKind,
    /// Row label.
    pub contract: ContractId,
    /// Column header.
    pub column: String,
}

/// Start and end snapshot tables resolved from two sheets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoadedSnapshots {
    /// Start observation column.
    pub start: DateColumn,

    /// End observation column.
    pub end: DateColumn,

    /// Quantities and prices at the start date.
    pub start_table: SnapshotTable,

    /// Quantities and prices at the end date.
    pub end_table: SnapshotTable,

    /// Contracts present in both sheets, in price-sheet order.
    pub contracts: Vec<ContractId>,

    /// Cells that defaulted to zero.
    pub defaulted: Vec<DefaultedCell>,
}

impl LoadedSnapshots {
    /// Load from two CSV files on disk.
    pub fn from_paths(
        prices: impl AsRef<Path>,
        quantities: impl AsRef<Path>,
        config: &LoaderConfig,
    ) -> Result<Self> {
        let prices = File::open(prices.as_ref())?;
        let quantities = File::open(quantities.as_ref())?;
        load_snapshots(prices, quantities, config)
    }
}

/// A parsed wide sheet.
#[derive(Debug)]
struct Sheet {
    kind: SheetKind,
    headers: Vec<String>,
    rows: Vec<(ContractId, Vec<String>)>,
}

impl Sheet {
    fn read<R: Read>(reader: R, kind: SheetKind) -> Result<Self> {
        let mut csv = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = csv.headers()?.iter().map(str::to_string).collect();
        if headers.len() < 2 {
            return Err(DataError::MissingHeader {
                sheet: kind.to_string(),
            });
        }

        let mut rows = Vec::new();
        for record in csv.records() {
            let record = record?;
            let label = record.get(0).unwrap_or_default();
            if label.is_empty() {
                continue;
            }
            let values = record.iter().skip(1).map(str::to_string).collect();
            rows.push((ContractId::new(label), values));
        }

        if rows.is_empty() {
            return Err(DataError::EmptySheet {
                sheet: kind.to_string(),
            });
        }

        Ok(Self {
            kind,
            headers: headers.into_iter().skip(1).collect(),
            rows,
        })
    }

    fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    fn usable_columns(&self, config: &LoaderConfig) -> Vec<String> {
        self.headers
            .iter()
            .filter(|h| config.is_usable_column(h))
            .cloned()
            .collect()
    }

    fn is_numeric_column(&self, idx: usize, config: &LoaderConfig) -> bool {
        let sample: Vec<&str> = self
            .rows
            .iter()
            .filter_map(|(_, values)| values.get(idx).map(String::as_str))
            .filter(|v| !v.is_empty())
            .take(NUMERIC_SAMPLE)
            .collect();
        !sample.is_empty() && sample.iter().all(|v| config.parse_number(v).is_some())
    }

    fn numeric_columns(&self, config: &LoaderConfig) -> Vec<String> {
        self.headers
            .iter()
            .enumerate()
            .filter(|(idx, h)| config.is_usable_column(h) && self.is_numeric_column(*idx, config))
            .map(|(_, h)| h.clone())
            .collect()
    }

    fn find_row(&self, contract: &ContractId) -> Option<&[String]> {
        self.rows
            .iter()
            .find(|(c, _)| c == contract)
            .map(|(_, values)| values.as_slice())
    }

    fn value(
        &self,
        contract: &ContractId,
        column: &str,
        config: &LoaderConfig,
        defaulted: &mut Vec<DefaultedCell>,
    ) -> f64 {
        let parsed = self
            .column_index(column)
            .and_then(|idx| self.find_row(contract).and_then(|row| row.get(idx)))
            .and_then(|raw| config.parse_number(raw));

        parsed.unwrap_or_else(|| {
            tracing::debug!(
                sheet = %self.kind,
                contract = %contract,
                column,
                "missing or unparseable value, defaulting to 0"
            );
            defaulted.push(DefaultedCell {
                sheet: self.kind,
                contract: contract.clone(),
                column: column.to_string(),
            });
            0.0
        })
    }
}

/// Load start and end snapshot tables from price and quantity CSV readers.
///
/// # Errors
///
/// Returns a [`DataError`] when a sheet is empty or headerless, when fewer
/// than two date columns are common to both sheets, or when a configured
/// column is missing from either sheet.
///
/// # Examples
///
/// ```
/// use spreadmap_data::{LoaderConfig, load_snapshots};
///
/// let prices = "Prompt,2024-01-31,2024-02-29\nCash,1000,1050\n3M,980,1000\n";
/// let quantities = "Prompt,2024-01-31,2024-02-29\nCash,100,50\n3M,-100,-50\n";
///
/// let loaded = load_snapshots(prices.as_bytes(), quantities.as_bytes(), &LoaderConfig::default())
///     .unwrap();
///
/// assert_eq!(loaded.start.label, "2024-01-31");
/// assert_eq!(loaded.end_table.quantity(&"Cash".into()), 50.0);
/// assert!(loaded.defaulted.is_empty());
/// ```
pub fn load_snapshots<P: Read, Q: Read>(
    prices: P,
    quantities: Q,
    config: &LoaderConfig,
) -> Result<LoadedSnapshots> {
    let prices = Sheet::read(prices, SheetKind::Prices)?;
    let quantities = Sheet::read(quantities, SheetKind::Quantities)?;

    let (start, end) = select_date_columns(&prices, &quantities, config)?;
    tracing::debug!(start = %start, end = %end, "selected date columns");

    let qty_labels: HashSet<&ContractId> = quantities.rows.iter().map(|(c, _)| c).collect();
    let mut seen = HashSet::new();
    let contracts: Vec<ContractId> = prices
        .rows
        .iter()
        .map(|(c, _)| c)
        .filter(|c| qty_labels.contains(c) && seen.insert(*c))
        .cloned()
        .collect();

    let mut defaulted = Vec::new();
    let mut table_for = |column: &DateColumn| -> SnapshotTable {
        contracts
            .iter()
            .map(|contract| {
                let quantity = quantities.value(contract, &column.label, config, &mut defaulted);
                let price = prices.value(contract, &column.label, config, &mut defaulted);
                (contract.clone(), Snapshot::new(quantity, price))
            })
            .collect()
    };
    let start_table = table_for(&start);
    let end_table = table_for(&end);

    if !defaulted.is_empty() {
        tracing::warn!(
            count = defaulted.len(),
            "some cells were missing or unparseable and defaulted to 0"
        );
    }

    Ok(LoadedSnapshots {
        start,
        end,
        start_table,
        end_table,
        contracts,
        defaulted,
    })
}

fn select_date_columns(
    prices: &Sheet,
    quantities: &Sheet,
    config: &LoaderConfig,
) -> Result<(DateColumn, DateColumn)> {
    let price_usable = prices.usable_columns(config);
    let qty_usable = quantities.usable_columns(config);

    let mut common = intersect(
        &prices.numeric_columns(config),
        &quantities.numeric_columns(config),
    );
    if common.len() < 2 {
        common = intersect(&price_usable, &qty_usable);
    }
    if common.len() < 2 {
        return Err(DataError::InsufficientDateColumns {
            found: common.len(),
            price_columns: price_usable.join(", "),
            quantity_columns: qty_usable.join(", "),
        });
    }

    let mut candidates: Vec<DateColumn> = common.into_iter().map(DateColumn::new).collect();
    let by_date = candidates.iter().all(|c| c.date.is_some());
    if by_date {
        candidates.sort_by_key(|c| c.date);
    } else {
        candidates.sort_by(|a, b| a.label.cmp(&b.label));
    }
    let precedes = |a: &DateColumn, b: &DateColumn| match (by_date, a.date, b.date) {
        (true, Some(a), Some(b)) => a < b,
        _ => a.label < b.label,
    };

    let available = |label: &str| {
        price_usable.iter().any(|c| c == label) && qty_usable.iter().any(|c| c == label)
    };
    let resolve = |requested: &Option<String>| -> Result<Option<DateColumn>> {
        match requested {
            Some(label) if available(label) => Ok(Some(DateColumn::new(label.clone()))),
            Some(label) => Err(DataError::UnknownColumn(label.clone())),
            None => Ok(None),
        }
    };

    let (start, end) = match (resolve(&config.start_column)?, resolve(&config.end_column)?) {
        (Some(start), Some(end)) => (start, end),
        (Some(start), None) => {
            let end = candidates
                .iter()
                .find(|c| precedes(&start, c))
                .cloned()
                .ok_or_else(|| DataError::NoLaterColumn(start.label.clone()))?;
            (start, end)
        }
        (None, Some(end)) => {
            let start = candidates
                .iter()
                .rev()
                .find(|c| precedes(c, &end))
                .cloned()
                .ok_or_else(|| DataError::NoEarlierColumn(end.label.clone()))?;
            (start, end)
        }
        (None, None) => (candidates[0].clone(), candidates[1].clone()),
    };

    if start.label == end.label {
        return Err(DataError::SameColumn(start.label));
    }
    Ok((start, end))
}

fn intersect(left: &[String], right: &[String]) -> Vec<String> {
    left.iter().filter(|c| right.contains(c)).cloned().collect()
}

fn parse_date(label: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(label.trim(), fmt).ok())
}
