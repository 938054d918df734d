mod common;

use anyhow::Result;
use common::{date, register, test_service, JanuaryHistory};
use finplan::application::TransactionFilter;
use finplan::domain::TransactionKind;
use finplan::io::Exporter;

#[tokio::test]
async fn test_export_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account_id = register(&service, "ana").await?;
    JanuaryHistory::record(&service, account_id).await?;
    let account = service.log_in("ana", "secret").await?;

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_transactions_csv(&account, &TransactionFilter::default(), &mut buffer)
        .await?;
    assert_eq!(count, 5);

    let output = String::from_utf8(buffer)?;
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 6);
    assert_eq!(lines[0], "id,date,kind,category,amount,description");
    assert!(lines[1].contains("2024-02-01,expense,Knjige,5.00"));
    assert!(lines[2].contains("2024-01-31,expense,Prevoz,25.00,monthly pass"));
    assert!(lines[5].contains("2023-12-28,income,Džeparac,50.00"));

    Ok(())
}

#[tokio::test]
async fn test_export_csv_respects_filter() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account_id = register(&service, "ana").await?;
    JanuaryHistory::record(&service, account_id).await?;
    let account = service.log_in("ana", "secret").await?;

    let filter = TransactionFilter::new()
        .with_kind(TransactionKind::Income)
        .between(date("2024-01-01"), date("2024-01-31"));

    let mut buffer = Vec::new();
    let count = Exporter::new(&service)
        .export_transactions_csv(&account, &filter, &mut buffer)
        .await?;
    assert_eq!(count, 1);
    assert!(String::from_utf8(buffer)?.contains("Stipendija,100.00"));

    Ok(())
}

#[tokio::test]
async fn test_export_json_includes_summary() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account_id = register(&service, "ana").await?;
    JanuaryHistory::record(&service, account_id).await?;
    let account = service.log_in("ana", "secret").await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&service)
        .export_transactions_json(&account, &TransactionFilter::default(), &mut buffer)
        .await?;

    assert_eq!(snapshot.login, "ana");
    assert_eq!(snapshot.transactions.len(), 5);
    assert_eq!(snapshot.summary.balance, 15000 - 4500);

    let value: serde_json::Value = serde_json::from_slice(&buffer)?;
    assert_eq!(value["summary"]["balance"], 10500);
    assert_eq!(value["transactions"][0]["kind"], "expense");
    assert_eq!(value["transactions"][0]["recorded_date"], "2024-02-01");
    assert!(value.get("credential").is_none());

    Ok(())
}
