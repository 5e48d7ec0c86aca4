//! History command implementation.

use anyhow::Result;
use console::style;

use qqms_hal::DecayModel;
use qqms_history::{HistoryRecord, RecordFilter};
use qqms_sweep::{StoreSpec, open_store};

/// Execute the history command.
pub async fn execute(
    table: &str,
    store: Option<StoreSpec>,
    qubit: Option<u32>,
    model: Option<DecayModel>,
    limit: Option<usize>,
    format: &str,
) -> Result<()> {
    let spec = store.unwrap_or(StoreSpec::Sqlite(None));
    let store = open_store(&spec).await?;

    let filter = build_filter(qubit, model, limit);
    let records = store.query(table, &filter).await?;

    match format.to_lowercase().as_str() {
        "json" => println!("{}", serde_json::to_string_pretty(&records)?),
        "table" => print_table(table, &spec, &records),
        other => anyhow::bail!("Unknown format: '{other}'. Available: table, json"),
    }

    Ok(())
}

fn build_filter(qubit: Option<u32>, model: Option<DecayModel>, limit: Option<usize>) -> RecordFilter {
    let mut filter = RecordFilter::all();
    if let Some(q) = qubit {
        filter = filter.qubit(q);
    }
    if let Some(m) = model {
        filter = filter.model(m);
    }
    if let Some(n) = limit {
        filter = filter.limit(n);
    }
    filter
}

fn print_table(table: &str, spec: &StoreSpec, records: &[HistoryRecord]) {
    println!(
        "{} {} ({}): {} record(s)\n",
        style("History").cyan().bold(),
        style(table).green(),
        spec,
        records.len()
    );

    if records.is_empty() {
        return;
    }

    println!(
        "  {:<6} {:<6} {:<28} {:>12} {:>10}",
        "Qubit", "Model", "Timestamp", "Value (µs)", "σ (µs)"
    );
    println!("  {}", "-".repeat(66));
    for record in records {
        println!(
            "  {:<6} {:<6} {:<28} {:>12.3} {:>10.3}",
            record.qubit,
            record.model.to_string(),
            record
                .timestamp
                .to_rfc3339_opts(chrono::SecondsFormat::Micros, true),
            record.value * 1e6,
            record.std_dev * 1e6
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qqms_history::{HistoryWriter, SqliteStore};

    #[test]
    fn test_filter_from_flags() {
        let filter = build_filter(Some(2), Some(DecayModel::Dephasing), Some(5));
        assert_eq!(filter.qubit, Some(2));
        assert_eq!(filter.model, Some(DecayModel::Dephasing));
        assert_eq!(filter.limit, Some(5));

        let all = build_filter(None, None, None);
        assert!(all.qubit.is_none() && all.model.is_none() && all.limit.is_none());
    }

    #[tokio::test]
    async fn test_reads_sqlite_history() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.db");
        {
            let store = SqliteStore::new(&path).unwrap();
            let writer = HistoryWriter::new();
            writer
                .record("T1History", 0, 12.3e-6, 0.4e-6, DecayModel::Relaxation, &store)
                .await
                .unwrap();
        }

        let spec = StoreSpec::Sqlite(Some(path));
        execute("T1History", Some(spec.clone()), None, None, None, "json")
            .await
            .unwrap();
        assert!(
            execute("T1History", Some(spec), None, None, None, "xml")
                .await
                .is_err()
        );
    }
}
