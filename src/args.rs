use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use unfurl::Source;
use unfurl::capture::file::file_url;
use unfurl::error::CaptureError;

#[derive(Parser, Debug)]
#[command(name = "unfurl")]
#[command(about = "Reads pages into summaries and link graphs for a knowledge server")]
#[command(version)]
pub struct Args {
    /// Page to read: a URL, or with --file the URL the file is served as
    pub uri: String,

    /// Read the HTML from this file instead of loading the page
    #[arg(short, long)]
    pub file: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// What to do with the page
    #[arg(short, long, value_enum, default_value_t = Mode::Read)]
    pub mode: Mode,

    /// WebDriver server (overrides configuration and WEBDRIVER_URL)
    #[arg(long)]
    pub webdriver: Option<String>,

    /// Knowledge server GraphQL endpoint (overrides configuration and UNFURL_ENDPOINT)
    #[arg(long)]
    pub endpoint: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Mode {
    /// Print the scraped summary
    Read,
    /// Print the outbound links with their context
    Links,
    /// Send the page to the knowledge server and print its backlinks and siblinks
    Ingest,
    /// Print what the knowledge server knows about the page
    Lookup,
}

/// Convert the command line into the source to capture
pub fn source_of(args: &Args) -> Result<Source, CaptureError> {
    match &args.file {
        Some(path) => {
            let url = if args.uri.is_empty() || args.uri == "-" {
                file_url(path)?
            } else {
                args.uri.clone()
            };
            Ok(Source::File {
                path: path.clone(),
                url,
            })
        }
        None => Ok(Source::Web(args.uri.clone())),
    }
}
