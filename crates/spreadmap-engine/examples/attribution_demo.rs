//! Walkthrough of the spreadmap engine on a small outright/spread book.
//!
//! Builds two snapshot tables by hand, then prints:
//! - per-contract Hold and Actual P/L
//! - the Cash/3M spread under both strategies
//! - the Hold, Actual and Delta contribution matrices
//! - the largest pair contributions

use spreadmap_data::{ContractId, Snapshot, SnapshotTable};
use spreadmap_engine::{
    ContributionMatrix, EngineConfig, MatrixMode, SpreadComparison, StrategyDecomposition,
    compute_all, find_cash_three_month, rank,
};

fn main() {
    println!("==========================================================");
    println!("              Spreadmap Engine - Demo");
    println!("==========================================================\n");

    let start = SnapshotTable::from_entries([
        ("Cash", Snapshot::new(250.0, 2310.0)),
        ("3M", Snapshot::new(-150.0, 2335.0)),
        ("Dec", Snapshot::new(-100.0, 2352.0)),
    ]);
    let end = SnapshotTable::from_entries([
        ("Cash", Snapshot::new(150.0, 2344.5)),
        ("3M", Snapshot::new(-50.0, 2351.0)),
        ("Dec", Snapshot::new(-100.0, 2360.0)),
    ]);
    let contracts: Vec<ContractId> = start.contracts().cloned().collect();
    let config = EngineConfig::default();

    let positions = compute_all(&start, &end, &contracts);
    println!("{:<8} {:>10} {:>10} {:>12} {:>12}", "Contract", "Qty S", "Qty E", "Hold", "Actual");
    for p in &positions {
        println!(
            "{:<8} {:>10.0} {:>10.0} {:>12.0} {:>12.0}",
            p.contract.as_str(), p.qty_start, p.qty_end, p.hold_pl, p.actual_pl
        );
    }

    let decomposition = StrategyDecomposition::compute(&positions);
    println!();
    for step in decomposition.waterfall() {
        println!("{:<16} {:>12.0}", step.stage, step.value);
    }

    if let Some((cash, three_month)) = find_cash_three_month(&contracts) {
        match SpreadComparison::compute(&start, &end, &cash, &three_month) {
            Ok(spread) => {
                println!("\n{cash}/{three_month} spread");
                println!("  delta:  {:>10.1}", spread.hold.spread_delta);
                println!("  hold:   {:>10.0}", spread.hold.pl);
                println!("  actual: {:>10.0}", spread.actual.pl);
            }
            Err(e) => println!("\nCash/3M spread unavailable: {e}"),
        }
    }

    let mut matrices = Vec::new();
    for mode in [MatrixMode::Hold, MatrixMode::Actual, MatrixMode::Delta] {
        match ContributionMatrix::build(&start, &end, &contracts, mode) {
            Ok(matrix) => {
                print_matrix(&matrix);
                matrices.push(matrix);
            }
            Err(e) => {
                println!("Failed to build {mode} matrix: {e}");
                return;
            }
        }
    }

    if let [hold, actual, delta] = matrices.as_slice() {
        match decomposition.reconcile(hold, actual, config.reconciliation_tolerance) {
            Ok(r) => println!(
                "\nMatrix effect {:.0} vs strategy effect {:.0} (reconciled: {})",
                r.matrix_effect,
                r.strategy_effect,
                r.is_reconciled()
            ),
            Err(e) => println!("\nReconciliation failed: {e}"),
        }

        println!("\nTop Delta pairs");
        for pair in rank(delta).iter().step_by(2).take(3) {
            println!(
                "  {:>2}. {:<4} / {:<4} {:>10.0}",
                pair.rank,
                pair.from.as_str(),
                pair.to.as_str(),
                pair.pl
            );
        }
    }

    println!("\n==========================================================");
}

fn print_matrix(matrix: &ContributionMatrix) {
    println!("\n{} matrix", matrix.mode());
    print!("{:<8}", "");
    for c in matrix.contracts() {
        print!("{:>10}", c.as_str());
    }
    println!();
    for (i, row) in matrix.contracts().iter().enumerate() {
        print!("{:<8}", row.as_str());
        for j in 0..matrix.len() {
            match matrix.get(i, j) {
                Some(v) => print!("{v:>10.0}"),
                None => print!("{:>10}", "-"),
            }
        }
        println!();
    }
}
