use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "folio",
    about = "Folio: wiki documents and annotated comics over one validated dispatch layer",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server
    Serve {
        /// Path to a TOML site config (defaults apply when omitted)
        #[arg(long)]
        config: Option<String>,

        /// Listen address, overrides the config file
        #[arg(long)]
        bind: Option<String>,

        /// Data directory, overrides the config file
        #[arg(long)]
        data_dir: Option<String>,
    },

    /// Print a stored document
    Page {
        /// Document identifier
        id: String,

        /// Data directory
        #[arg(long, default_value = ".folio")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the comment log of a comic
    Comments {
        /// Comic number
        id: String,

        /// Data directory
        #[arg(long, default_value = ".folio")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the comics served so far
    History {
        /// Data directory
        #[arg(long, default_value = ".folio")]
        data_dir: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
