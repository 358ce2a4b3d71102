//! Per-date snapshot tables.
//!
//! A [`SnapshotTable`] holds one observation date: for every contract, the
//! position quantity and the settlement price. Tables are built once and
//! never mutated. Lookups of contracts the table does not know resolve to
//! zero rather than failing; positions routinely open or close between the
//! two observation dates.

use crate::contract::ContractId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Quantity and price of one contract on one date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Signed position size. Positive is long, negative is short.
    pub quantity: f64,

    /// Price of the contract.
    pub price: f64,
}

impl Snapshot {
    /// Create a new snapshot.
    pub const fn new(quantity: f64, price: f64) -> Self {
        Self { quantity, price }
    }
}

/// Immutable contract → [`Snapshot`] table for a single date.
///
/// Iteration follows insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SnapshotTable {
    entries: Vec<(ContractId, Snapshot)>,
    #[serde(skip)]
    index: HashMap<ContractId, usize>,
}

impl SnapshotTable {
    /// Build a table from `(contract, snapshot)` pairs.
    ///
    /// A contract listed twice keeps its first position in iteration order
    /// and its last snapshot.
    ///
    /// # Examples
    ///
    /// ```
    /// use spreadmap_data::{Snapshot, SnapshotTable};
    ///
    /// let table = SnapshotTable::from_entries([
    ///     ("Cash", Snapshot::new(100.0, 1000.0)),
    ///     ("3M", Snapshot::new(-100.0, 980.0)),
    /// ]);
    ///
    /// assert_eq!(table.len(), 2);
    /// assert_eq!(table.quantity(&"3M".into()), -100.0);
    /// assert_eq!(table.price(&"M+4".into()), 0.0);
    /// ```
    pub fn from_entries<I, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (C, Snapshot)>,
        C: Into<ContractId>,
    {
        let mut table = Self::default();
        for (contract, snapshot) in entries {
            let contract = contract.into();
            match table.index.get(&contract) {
                Some(&pos) => table.entries[pos].1 = snapshot,
                None => {
                    table.index.insert(contract.clone(), table.entries.len());
                    table.entries.push((contract, snapshot));
                }
            }
        }
        table
    }

    /// Snapshot for a contract, if the table has one.
    pub fn get(&self, contract: &ContractId) -> Option<&Snapshot> {
        self.lookup(contract).map(|pos| &self.entries[pos].1)
    }

    /// Snapshot for a contract, defaulting to zero quantity and price.
    pub fn get_or_default(&self, contract: &ContractId) -> Snapshot {
        self.get(contract).copied().unwrap_or_default()
    }

    /// Quantity for a contract, `0.0` when absent.
    pub fn quantity(&self, contract: &ContractId) -> f64 {
        self.get_or_default(contract).quantity
    }

    /// Price for a contract, `0.0` when absent.
    pub fn price(&self, contract: &ContractId) -> f64 {
        self.get_or_default(contract).price
    }

    /// Whether the table has an entry for the contract.
    pub fn contains(&self, contract: &ContractId) -> bool {
        self.lookup(contract).is_some()
    }

    /// Contracts in insertion order.
    pub fn contracts(&self) -> impl Iterator<Item = &ContractId> + '_ {
        self.entries.iter().map(|(c, _)| c)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&ContractId, &Snapshot)> + '_ {
        self.entries.iter().map(|(c, s)| (c, s))
    }

    /// Number of contracts.
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all quantities in the table.
    pub fn total_quantity(&self) -> f64 {
        self.entries.iter().map(|(_, s)| s.quantity).sum()
    }

    // The index is skipped by serde, so fall back to a scan after deserializing.
    fn lookup(&self, contract: &ContractId) -> Option<usize> {
        if self.index.len() == self.entries.len() {
            self.index.get(contract).copied()
        } else {
            self.entries.iter().position(|(c, _)| c == contract)
        }
    }
}

impl PartialEq for SnapshotTable {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl<C: Into<ContractId>> FromIterator<(C, Snapshot)> for SnapshotTable {
    fn from_iter<T: IntoIterator<Item = (C, Snapshot)>>(iter: T) -> Self {
        Self::from_entries(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SnapshotTable {
        SnapshotTable::from_entries([
            ("Cash", Snapshot::new(100.0, 1000.0)),
            ("3M", Snapshot::new(-100.0, 980.0)),
            ("M+4", Snapshot::new(0.0, 975.0)),
        ])
    }

    #[test]
    fn test_lookup_and_default() {
        let table = sample();
        assert_eq!(table.quantity(&"Cash".into()), 100.0);
        assert_eq!(table.price(&"3M".into()), 980.0);
        assert!(table.get(&"M+5".into()).is_none());
        assert_eq!(table.get_or_default(&"M+5".into()), Snapshot::default());
    }

    #[test]
    fn test_insertion_order_preserved() {
        let table = sample();
        let labels: Vec<&str> = table.contracts().map(ContractId::as_str).collect();
        assert_eq!(labels, vec!["Cash", "3M", "M+4"]);
    }

    #[test]
    fn test_duplicate_keeps_first_position_last_value() {
        let table = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(1.0, 1.0)),
            ("3M", Snapshot::new(2.0, 2.0)),
            ("Cash", Snapshot::new(3.0, 3.0)),
        ]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.contracts().next().map(ContractId::as_str), Some("Cash"));
        assert_eq!(table.quantity(&"Cash".into()), 3.0);
    }

    #[test]
    fn test_total_quantity() {
        assert_eq!(sample().total_quantity(), 0.0);
    }

    #[test]
    fn test_lookup_after_deserialize() {
        let table = without_index(&sample());
        assert!(table.contains(&"Cash".into()));
        assert_eq!(table.price(&"M+4".into()), 975.0);
    }

    // Mimics a deserialized table: entries present, index empty.
    fn without_index(table: &SnapshotTable) -> SnapshotTable {
        SnapshotTable {
            entries: table.entries.clone(),
            index: HashMap::new(),
        }
    }
}
