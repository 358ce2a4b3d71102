//! Terminal and Markdown tables for attribution results.
//!
//! Each table borrows engine results and renders them two ways:
//! [`to_ascii_table`](PositionsTable::to_ascii_table) for the terminal and
//! [`to_markdown`](PositionsTable::to_markdown) for documents. `Display`
//! uses the ASCII form.

use crate::format::{format_amount, format_cell, format_price};
use spreadmap_engine::{
    ContributionMatrix, PositionChange, QuantityCheck, RankedPair, Reconciliation,
    SpreadComparison, SpreadPl, StrategyDecomposition,
};
use std::fmt;

const WIDTH: usize = 80;

fn rule(output: &mut String, ch: &str, width: usize) {
    output.push_str(&ch.repeat(width));
    output.push('\n');
}

/// Per-contract positions with a total row.
#[derive(Debug, Clone, Copy)]
pub struct PositionsTable<'a> {
    positions: &'a [PositionChange],
    check: &'a QuantityCheck,
}

impl<'a> PositionsTable<'a> {
    /// Create a positions table.
    pub const fn new(positions: &'a [PositionChange], check: &'a QuantityCheck) -> Self {
        Self { positions, check }
    }

    fn warning(&self) -> Option<String> {
        (!self.check.is_balanced()).then(|| {
            format!(
                "Warning: net quantity is not zero (start {}, end {})",
                format_amount(self.check.total_start),
                format_amount(self.check.total_end)
            )
        })
    }

    fn total_pl(&self) -> (f64, f64) {
        self.positions
            .iter()
            .fold((0.0, 0.0), |(h, a), p| (h + p.hold_pl, a + p.actual_pl))
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let mut output = String::new();

        output.push_str("\nPositions\n");
        rule(&mut output, "=", WIDTH + 10);
        output.push_str(&format!(
            "{:<10} {:>10} {:>10} {:>11} {:>11} {:>9} {:>12} {:>12}\n",
            "Contract", "Qty Start", "Qty End", "Px Start", "Px End", "Px Chg", "Hold P/L",
            "Actual P/L"
        ));
        rule(&mut output, "-", WIDTH + 10);

        for p in self.positions {
            output.push_str(&format!(
                "{:<10} {:>10} {:>10} {:>11} {:>11} {:>9} {:>12} {:>12}\n",
                p.contract.as_str(),
                format_amount(p.qty_start),
                format_amount(p.qty_end),
                format_price(p.price_start),
                format_price(p.price_end),
                format_price(p.price_change),
                format_amount(p.hold_pl),
                format_amount(p.actual_pl)
            ));
        }

        rule(&mut output, "-", WIDTH + 10);
        let (hold, actual) = self.total_pl();
        output.push_str(&format!(
            "{:<10} {:>10} {:>10} {:>11} {:>11} {:>9} {:>12} {:>12}\n",
            "Total",
            format_amount(self.check.total_start),
            format_amount(self.check.total_end),
            "",
            "",
            "",
            format_amount(hold),
            format_amount(actual)
        ));
        rule(&mut output, "=", WIDTH + 10);

        if let Some(warning) = self.warning() {
            output.push_str(&warning);
            output.push('\n');
        }
        output
    }

    /// Format as Markdown table for documentation.
    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str("## Positions\n\n");
        output.push_str(
            "| Contract | Qty Start | Qty End | Px Start | Px End | Px Chg | Hold P/L | Actual P/L |\n",
        );
        output.push_str(
            "|----------|----------:|--------:|---------:|-------:|-------:|---------:|-----------:|\n",
        );
        for p in self.positions {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} | {} | {} |\n",
                p.contract.as_str(),
                format_amount(p.qty_start),
                format_amount(p.qty_end),
                format_price(p.price_start),
                format_price(p.price_end),
                format_price(p.price_change),
                format_amount(p.hold_pl),
                format_amount(p.actual_pl)
            ));
        }
        let (hold, actual) = self.total_pl();
        output.push_str(&format!(
            "| **Total** | {} | {} | | | | {} | {} |\n",
            format_amount(self.check.total_start),
            format_amount(self.check.total_end),
            format_amount(hold),
            format_amount(actual)
        ));

        if let Some(warning) = self.warning() {
            output.push_str(&format!("\n> {warning}\n"));
        }
        output
    }
}

impl fmt::Display for PositionsTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

/// Hold vs Actual for one named spread.
#[derive(Debug, Clone, Copy)]
pub struct SpreadTable<'a> {
    spread: Option<&'a SpreadComparison>,
}

impl<'a> SpreadTable<'a> {
    /// Create a spread table; `None` renders an unavailable notice.
    pub const fn new(spread: Option<&'a SpreadComparison>) -> Self {
        Self { spread }
    }

    fn rows(spread: &SpreadComparison) -> [(&'static str, &SpreadPl); 2] {
        [("Hold", &spread.hold), ("Actual", &spread.actual)]
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let Some(spread) = self.spread else {
            return "\nSpread: Cash/3M pair unavailable\n".to_string();
        };
        let mut output = String::new();

        output.push_str(&format!(
            "\nSpread: {} / {}\n",
            spread.hold.near.as_str(),
            spread.hold.far.as_str()
        ));
        rule(&mut output, "=", WIDTH);
        output.push_str(&format!(
            "{:<10} {:>12} {:>12} {:>12} {:>14} {:>14}\n",
            "Strategy", "Spread Start", "Spread End", "Change", "Eff. Qty", "P/L"
        ));
        rule(&mut output, "-", WIDTH);
        for (name, leg) in Self::rows(spread) {
            output.push_str(&format!(
                "{:<10} {:>12} {:>12} {:>12} {:>14} {:>14}\n",
                name,
                format_price(leg.spread_start),
                format_price(leg.spread_end),
                format_price(leg.spread_delta),
                format_amount(leg.effective_qty),
                format_amount(leg.pl)
            ));
        }
        rule(&mut output, "-", WIDTH);
        output.push_str(&format!(
            "{:<10} {:>66}\n",
            "Effect",
            format_amount(spread.effect())
        ));
        rule(&mut output, "=", WIDTH);
        output
    }

    /// Format as Markdown table for documentation.
    pub fn to_markdown(&self) -> String {
        let Some(spread) = self.spread else {
            return "## Spread\n\n_Cash/3M pair unavailable._\n".to_string();
        };
        let mut output = String::new();

        output.push_str(&format!(
            "## Spread: {} / {}\n\n",
            spread.hold.near.as_str(),
            spread.hold.far.as_str()
        ));
        output.push_str("| Strategy | Spread Start | Spread End | Change | Eff. Qty | P/L |\n");
        output.push_str("|----------|-------------:|-----------:|-------:|---------:|----:|\n");
        for (name, leg) in Self::rows(spread) {
            output.push_str(&format!(
                "| {} | {} | {} | {} | {} | {} |\n",
                name,
                format_price(leg.spread_start),
                format_price(leg.spread_end),
                format_price(leg.spread_delta),
                format_amount(leg.effective_qty),
                format_amount(leg.pl)
            ));
        }
        output.push_str(&format!(
            "\n- **Effect:** {}\n",
            format_amount(spread.effect())
        ));
        output
    }
}

impl fmt::Display for SpreadTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

/// Strategy totals, waterfall and per-contract breakdown.
#[derive(Debug, Clone, Copy)]
pub struct StrategyTable<'a> {
    decomposition: &'a StrategyDecomposition,
    reconciliation: Option<&'a Reconciliation>,
}

impl<'a> StrategyTable<'a> {
    /// Create a strategy table.
    pub const fn new(
        decomposition: &'a StrategyDecomposition,
        reconciliation: Option<&'a Reconciliation>,
    ) -> Self {
        Self {
            decomposition,
            reconciliation,
        }
    }

    fn reconciliation_line(&self) -> Option<String> {
        self.reconciliation.map(|r| {
            format!(
                "Matrix effect {} vs strategy effect {} (residual {}){}",
                format_amount(r.matrix_effect),
                format_amount(r.strategy_effect),
                format_amount(r.residual),
                if r.is_reconciled() {
                    ""
                } else {
                    ": not reconciled"
                }
            )
        })
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let d = self.decomposition;
        let mut output = String::new();

        output.push_str("\nStrategy Decomposition\n");
        rule(&mut output, "=", WIDTH);
        output.push_str(&format!("{:<20} {:>14}\n", "Hold P/L", format_amount(d.total_hold)));
        output.push_str(&format!(
            "{:<20} {:>14}\n",
            "Actual P/L",
            format_amount(d.total_actual)
        ));
        output.push_str(&format!(
            "{:<20} {:>14}\n",
            "Strategy Effect",
            format_amount(d.effect)
        ));
        rule(&mut output, "-", WIDTH);

        output.push_str("Waterfall:\n");
        for step in d.waterfall() {
            output.push_str(&format!(
                "  {:<18} {:>14}  ({:?})\n",
                step.stage,
                format_amount(step.value),
                step.measure
            ));
        }
        rule(&mut output, "-", WIDTH);

        output.push_str(&format!(
            "{:<10} {:>14} {:>14} {:>14}\n",
            "Contract", "Hold P/L", "Actual P/L", "Effect"
        ));
        for c in &d.breakdown {
            output.push_str(&format!(
                "{:<10} {:>14} {:>14} {:>14}\n",
                c.contract.as_str(),
                format_amount(c.hold_pl),
                format_amount(c.actual_pl),
                format_amount(c.effect)
            ));
        }
        rule(&mut output, "=", WIDTH);

        if let Some(line) = self.reconciliation_line() {
            output.push_str(&line);
            output.push('\n');
        }
        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let d = self.decomposition;
        let mut output = String::new();

        output.push_str("## Strategy Decomposition\n\n");
        output.push_str(&format!("- **Hold P/L:** {}\n", format_amount(d.total_hold)));
        output.push_str(&format!("- **Actual P/L:** {}\n", format_amount(d.total_actual)));
        output.push_str(&format!("- **Strategy Effect:** {}\n\n", format_amount(d.effect)));

        output.push_str("| Contract | Hold P/L | Actual P/L | Effect |\n");
        output.push_str("|----------|---------:|-----------:|-------:|\n");
        for c in &d.breakdown {
            output.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                c.contract.as_str(),
                format_amount(c.hold_pl),
                format_amount(c.actual_pl),
                format_amount(c.effect)
            ));
        }

        if let Some(line) = self.reconciliation_line() {
            output.push_str(&format!("\n{line}\n"));
        }
        output
    }
}

impl fmt::Display for StrategyTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

/// Contribution grid followed by the top ranked pairs.
#[derive(Debug, Clone, Copy)]
pub struct MatrixTable<'a> {
    matrix: &'a ContributionMatrix,
    ranked: &'a [RankedPair],
    top: usize,
}

impl<'a> MatrixTable<'a> {
    /// Create a matrix table listing at most `top` ranked pairs.
    pub const fn new(matrix: &'a ContributionMatrix, ranked: &'a [RankedPair], top: usize) -> Self {
        Self {
            matrix,
            ranked,
            top,
        }
    }

    fn top_pairs(&self) -> &'a [RankedPair] {
        &self.ranked[..self.top.min(self.ranked.len())]
    }

    /// Format as ASCII table for terminal display.
    pub fn to_ascii_table(&self) -> String {
        let m = self.matrix;
        let width = (11 + 12 * m.len()).max(WIDTH);
        let mut output = String::new();

        output.push_str(&format!("\nSpread Contribution Matrix ({})\n", m.mode()));
        rule(&mut output, "=", width);
        output.push_str(&format!("{:<10} ", ""));
        for c in m.contracts() {
            output.push_str(&format!("{:>11} ", c.as_str()));
        }
        output.push('\n');
        rule(&mut output, "-", width);

        for (row, contract) in m.contracts().iter().enumerate() {
            output.push_str(&format!("{:<10} ", contract.as_str()));
            for col in 0..m.len() {
                output.push_str(&format!("{:>11} ", format_cell(m.get(row, col))));
            }
            output.push('\n');
        }
        rule(&mut output, "=", width);
        output.push_str(&format!(
            "Total spread P/L (each pair once): {}\n",
            format_amount(m.total())
        ));
        output.push_str(&format!(
            "Sum over both orders:              {}\n",
            format_amount(m.ordered_total())
        ));

        let top = self.top_pairs();
        if !top.is_empty() {
            output.push_str(&format!("\nTop {} pairs by |P/L|\n", top.len()));
            rule(&mut output, "-", WIDTH);
            output.push_str(&format!(
                "{:>5}  {:<12} {:<12} {:>14}\n",
                "Rank", "From", "To", "P/L"
            ));
            for pair in top {
                output.push_str(&format!(
                    "{:>5}  {:<12} {:<12} {:>14}\n",
                    pair.rank,
                    pair.from.as_str(),
                    pair.to.as_str(),
                    format_amount(pair.pl)
                ));
            }
        }
        output
    }

    /// Format as Markdown for documentation.
    pub fn to_markdown(&self) -> String {
        let m = self.matrix;
        let mut output = String::new();

        output.push_str(&format!("## Spread Contribution Matrix ({})\n\n", m.mode()));
        output.push_str("| |");
        for c in m.contracts() {
            output.push_str(&format!(" {} |", c.as_str()));
        }
        output.push_str("\n|---|");
        output.push_str(&"---:|".repeat(m.len()));
        output.push('\n');
        for (row, contract) in m.contracts().iter().enumerate() {
            output.push_str(&format!("| **{}** |", contract.as_str()));
            for col in 0..m.len() {
                output.push_str(&format!(" {} |", format_cell(m.get(row, col))));
            }
            output.push('\n');
        }
        output.push_str(&format!(
            "\n**Total spread P/L (each pair once):** {}  \n**Sum over both orders:** {}\n",
            format_amount(m.total()),
            format_amount(m.ordered_total())
        ));

        let top = self.top_pairs();
        if !top.is_empty() {
            output.push_str("\n| Rank | From | To | P/L |\n");
            output.push_str("|-----:|------|----|----:|\n");
            for pair in top {
                output.push_str(&format!(
                    "| {} | {} | {} | {} |\n",
                    pair.rank,
                    pair.from.as_str(),
                    pair.to.as_str(),
                    format_amount(pair.pl)
                ));
            }
        }
        output
    }
}

impl fmt::Display for MatrixTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_ascii_table())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spreadmap_data::{ContractId, Snapshot, SnapshotTable};
    use spreadmap_engine::{MatrixMode, compute_all, rank};

    fn tables() -> (SnapshotTable, SnapshotTable, Vec<ContractId>) {
        let start = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(1000.0, 2310.0)),
            ("3M", Snapshot::new(-1000.0, 2290.0)),
        ]);
        let end = SnapshotTable::from_entries([
            ("Cash", Snapshot::new(500.0, 2360.0)),
            ("3M", Snapshot::new(-400.0, 2310.0)),
        ]);
        let contracts = start.contracts().cloned().collect();
        (start, end, contracts)
    }

    #[test]
    fn test_positions_table_total_and_warning() {
        let (start, end, contracts) = tables();
        let positions = compute_all(&start, &end, &contracts);
        let check = QuantityCheck::from_positions(&positions, 0.01);
        let table = PositionsTable::new(&positions, &check).to_ascii_table();

        assert!(table.contains("Total"));
        assert!(table.contains("50,000"));
        // End quantities net to 100.
        assert!(table.contains("Warning: net quantity is not zero"));
        assert!(table.contains("2,310.00"));
    }

    #[test]
    fn test_positions_markdown() {
        let (start, end, contracts) = tables();
        let positions = compute_all(&start, &end, &contracts);
        let check = QuantityCheck::from_positions(&positions, 0.01);
        let md = PositionsTable::new(&positions, &check).to_markdown();
        assert!(md.starts_with("## Positions"));
        assert!(md.contains("| **Total** |"));
        assert!(md.contains("> Warning"));
    }

    #[test]
    fn test_spread_table_unavailable() {
        let table = SpreadTable::new(None);
        assert!(table.to_ascii_table().contains("unavailable"));
        assert!(table.to_markdown().contains("unavailable"));
    }

    #[test]
    fn test_spread_table() {
        let (start, end, _) = tables();
        let spread =
            SpreadComparison::compute(&start, &end, &"Cash".into(), &"3M".into()).unwrap();
        let table = SpreadTable::new(Some(&spread)).to_ascii_table();
        assert!(table.contains("Cash / 3M"));
        // Hold: 1000 * 30
        assert!(table.contains("30,000"));
        // Actual: 400 * 30
        assert!(table.contains("12,000"));
        assert!(table.contains("-18,000"));
    }

    #[test]
    fn test_matrix_table_uses_dash_on_diagonal() {
        let (start, end, contracts) = tables();
        let m = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Delta).unwrap();
        let ranked = rank(&m);
        let table = MatrixTable::new(&m, &ranked, 1).to_ascii_table();

        assert!(table.contains("(Actual - Hold)"));
        assert!(table.contains(" - "));
        assert!(table.contains("Total spread P/L (each pair once): -18,000"));
        assert!(table.contains("Top 1 pairs"));
    }

    #[test]
    fn test_matrix_total_matches_sum_of_listed_pairs() {
        let (start, end, contracts) = tables();
        let m = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        let ranked = rank(&m);
        let listed: f64 = ranked.iter().map(|p| p.pl).sum();
        let table = MatrixTable::new(&m, &ranked, ranked.len());

        let expected = format!("Sum over both orders:              {}", format_amount(listed));
        assert!(table.to_ascii_table().contains(&expected));
        assert!(table.to_markdown().contains(&format!(
            "**Sum over both orders:** {}",
            format_amount(listed)
        )));
        assert!(table.to_markdown().contains(&format!(
            "**Total spread P/L (each pair once):** {}",
            format_amount(listed / 2.0)
        )));
    }

    #[test]
    fn test_matrix_table_top_zero_skips_ranking() {
        let (start, end, contracts) = tables();
        let m = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
        let ranked = rank(&m);
        let md = MatrixTable::new(&m, &ranked, 0).to_markdown();
        assert!(md.contains("| **Cash** | - |"));
        assert!(!md.contains("| Rank |"));
    }

    #[test]
    fn test_strategy_table() {
        let (start, end, contracts) = tables();
        let d = StrategyDecomposition::compute(&compute_all(&start, &end, &contracts));
        let table = StrategyTable::new(&d, None).to_string();
        assert!(table.contains("Strategy Effect"));
        assert!(table.contains("Waterfall"));
        assert!(table.contains("(Relative)"));
    }
}
