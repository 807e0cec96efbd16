use crate::support::{fail, print_json, site_at};
use folio_store::HistoryLog;
use serde_json::json;

pub fn run(data_dir: String, json_output: bool) {
    let log = HistoryLog::open(site_at(&data_dir).history_path());
    let entries = log.read_all().unwrap_or_else(|e| fail(e));

    if json_output {
        print_json(&json!({
            "count": entries.len(),
            "entries": entries,
        }));
        return;
    }

    println!("comics served: {}", entries.len());
    for entry in &entries {
        println!(
            "  {} #{} {}",
            entry.recorded_at.to_rfc3339(),
            entry.number,
            entry.title
        );
    }
}
