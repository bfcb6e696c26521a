mod common;

use anyhow::Result;
use common::TestApp;
use spendwise::application::AppError;
use spendwise::io::{ExportKind, Exporter};

fn export(app: &TestApp, kind: ExportKind) -> Result<String, AppError> {
    let mut out = Vec::new();
    Exporter::new(&app.ledger).export_csv(kind, &mut out)?;
    Ok(String::from_utf8(out).unwrap())
}

#[test]
fn test_export_income_of_sample_data() -> Result<()> {
    let mut app = TestApp::new();
    app.sign_up("Alice")?;
    app.ledger.load_sample_data();

    let csv = export(&app, ExportKind::Income)?;
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines[0], "Date,Title,Category,Amount,Type");
    assert_eq!(lines[1], "2023-06-01,Salary,Salary,5000.00,income");
    assert_eq!(lines.len(), 1 + app.ledger.income_of().len());
    assert!(lines[1..].iter().all(|l| l.ends_with(",income")));

    Ok(())
}

#[test]
fn test_export_all_keeps_insertion_order() -> Result<()> {
    let mut app = TestApp::new();
    app.sign_up("Alice")?;
    app.ledger.load_sample_data();

    let csv = export(&app, ExportKind::All)?;

    assert_eq!(csv.lines().count(), 15);
    assert_eq!(
        csv.lines().nth(2),
        Some("2023-06-05,Rent,Housing,1200.00,expense")
    );

    Ok(())
}

#[test]
fn test_export_without_data_fails() -> Result<()> {
    let mut app = TestApp::new();
    app.sign_up("Alice")?;

    let err = export(&app, ExportKind::Expense).unwrap_err();

    assert!(matches!(err, AppError::NoDataToExport));
    assert_eq!(err.to_string(), "No data to export");

    Ok(())
}
