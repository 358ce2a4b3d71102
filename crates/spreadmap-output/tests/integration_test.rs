//! Integration tests for tables and export over a small three-prompt book.

use spreadmap_data::{ContractId, Snapshot, SnapshotTable};
use spreadmap_engine::{
    ContributionMatrix, MatrixMode, QuantityCheck, SpreadComparison, StrategyDecomposition,
    compute_all, find_cash_three_month, rank,
};
use spreadmap_output::{
    ExportFormat, Exporter, MatrixTable, OutputConfig, PositionsTable, ReportBuilder,
    SpreadTable, StrategyTable,
};

fn book() -> (SnapshotTable, SnapshotTable, Vec<ContractId>) {
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
    let contracts = start.contracts().cloned().collect();
    (start, end, contracts)
}

#[test]
fn test_full_text_workflow() {
    let (start, end, contracts) = book();
    let positions = compute_all(&start, &end, &contracts);
    let check = QuantityCheck::from_positions(&positions, 0.01);
    let decomposition = StrategyDecomposition::compute(&positions);

    let hold = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Hold).unwrap();
    let actual = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Actual).unwrap();
    let reconciliation = decomposition.reconcile(&hold, &actual, 1e-6).unwrap();

    let positions_text = PositionsTable::new(&positions, &check).to_ascii_table();
    assert!(positions_text.contains("Cash"));
    assert!(positions_text.contains("Dec"));
    assert!(!positions_text.contains("Warning"));

    let strategy_text = StrategyTable::new(&decomposition, Some(&reconciliation)).to_ascii_table();
    assert!(strategy_text.contains("Strategy Effect"));
    assert!(strategy_text.contains("Matrix effect"));
    assert!(!strategy_text.contains("not reconciled"));

    let (cash, three_month) = find_cash_three_month(&contracts).unwrap();
    let spread = SpreadComparison::compute(&start, &end, &cash, &three_month).unwrap();
    let spread_md = SpreadTable::new(Some(&spread)).to_markdown();
    assert!(spread_md.contains("## Spread: Cash / 3M"));

    let ranked = rank(&hold);
    let top = OutputConfig::default().top_pairs;
    let matrix_md = MatrixTable::new(&hold, &ranked, top).to_markdown();
    assert!(matrix_md.contains("| Rank | From | To | P/L |"));
    assert_eq!(matrix_md.matches("| **").count(), 3);
}

#[test]
fn test_export_files() {
    let (start, end, contracts) = book();
    let positions = compute_all(&start, &end, &contracts);
    let delta = ContributionMatrix::build(&start, &end, &contracts, MatrixMode::Delta).unwrap();
    let ranked = rank(&delta);

    let dir = std::env::temp_dir().join(format!("spreadmap-output-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let positions_path = dir.join("positions.csv");
    positions
        .export_to_file(&positions_path, ExportFormat::Csv)
        .unwrap();
    let written = std::fs::read_to_string(&positions_path).unwrap();
    assert_eq!(written.lines().count(), 4);

    let matrix_path = dir.join("matrix_delta.json");
    delta
        .export_to_file(&matrix_path, ExportFormat::PrettyJson)
        .unwrap();
    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&matrix_path).unwrap()).unwrap();
    assert_eq!(value["mode"], "delta");
    assert!(value["cells"][2][2].is_null());

    let pairs = ranked.export_to_string(ExportFormat::Csv).unwrap();
    assert!(pairs.starts_with("rank,from,to,pl"));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_report_payload() {
    let (start, end, contracts) = book();
    let positions = compute_all(&start, &end, &contracts);
    let decomposition = StrategyDecomposition::compute(&positions);

    let report = ReportBuilder::new()
        .period("2024-01-31", "2024-02-29")
        .contents(&decomposition)
        .unwrap()
        .build();
    assert_eq!(report.contents["breakdown"].as_array().unwrap().len(), 3);
    assert!(report.to_json().unwrap().contains("\"effect\""));
}
