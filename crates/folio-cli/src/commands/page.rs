use crate::support::{fail, parse_id_or_exit, print_json, site_at};
use folio_store::DocumentStore;
use serde_json::json;

pub fn run(id: String, data_dir: String, json_output: bool) {
    let id = parse_id_or_exit(&id);
    let store = DocumentStore::open(site_at(&data_dir).documents_dir());

    let page = match store.load(&id) {
        Ok(Some(page)) => page,
        Ok(None) => fail(format!("page `{id}` not found")),
        Err(e) => fail(e),
    };

    if json_output {
        print_json(&json!({
            "id": page.id.as_str(),
            "title": page.title,
            "body": page.body_text(),
        }));
    } else {
        print!("{}", page.body_text());
    }
}
