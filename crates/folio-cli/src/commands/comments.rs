use crate::support::{fail, parse_id_or_exit, print_json, site_at};
use folio_store::{AnnotationLog, PageId};
use serde_json::json;

pub fn run(id: String, data_dir: String, json_output: bool) {
    let id = parse_id_or_exit(&id);
    let Some(number) = id.comic_number() else {
        fail(format!("`{id}` is not a comic number"));
    };
    let key = PageId::from_number(number);
    let log = AnnotationLog::open(site_at(&data_dir).annotations_dir());
    let entries = log.read_all(&key).unwrap_or_else(|e| fail(e));

    if json_output {
        print_json(&json!({
            "id": key.as_str(),
            "count": entries.len(),
            "comments": entries,
        }));
        return;
    }

    println!("comments for #{number}: {}", entries.len());
    for entry in &entries {
        println!("  [{}] {}", entry.recorded_at.to_rfc3339(), entry.text.escape_debug());
    }
}
