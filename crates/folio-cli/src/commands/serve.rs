use crate::support::fail;
use folio_web::SiteConfig;
use std::net::SocketAddr;
use std::path::PathBuf;

pub struct Args {
    pub config: Option<String>,
    pub bind: Option<String>,
    pub data_dir: Option<String>,
}

pub fn run(args: Args) {
    let mut config = match &args.config {
        Some(path) => SiteConfig::load(path).unwrap_or_else(|e| fail(e)),
        None => SiteConfig::default(),
    };
    if let Some(bind) = &args.bind {
        config.bind = bind
            .parse::<SocketAddr>()
            .unwrap_or_else(|e| fail(format!("invalid --bind address `{bind}`: {e}")));
    }
    if let Some(data_dir) = &args.data_dir {
        config.data_dir = PathBuf::from(data_dir);
    }

    tracing::debug!(config = ?args.config, "site config resolved");

    println!("folio serve");
    println!("  bind: {}", config.bind);
    println!("  data dir: {}", config.data_dir.display());
    println!("  provider: {}", config.provider.base_url);
    println!("  history: {}", config.record_history);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| fail(format!("failed to create tokio runtime: {e}")));

    runtime.block_on(async move {
        if let Err(e) = folio_web::serve(config).await {
            fail(format!("server failed: {e}"));
        }
    });
}
