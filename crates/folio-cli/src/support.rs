use folio_store::PageId;
use folio_web::SiteConfig;
use std::fmt::Display;
use std::path::PathBuf;
use std::process;

pub fn fail(message: impl Display) -> ! {
    eprintln!("error: {message}");
    process::exit(1);
}

pub fn parse_id_or_exit(token: &str) -> PageId {
    PageId::parse(token).unwrap_or_else(|e| fail(format!("invalid identifier `{token}`: {e}")))
}

/// Site layout rooted at `data_dir`, everything else defaulted.
pub fn site_at(data_dir: &str) -> SiteConfig {
    SiteConfig {
        data_dir: PathBuf::from(data_dir),
        ..SiteConfig::default()
    }
}

pub fn print_json(value: &serde_json::Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => fail(format!("failed to render json: {e}")),
    }
}
