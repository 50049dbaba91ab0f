use clap::Parser;
use serde::Serialize;
use std::time::Duration;
use unfurl::client::KnowledgeClient;
use unfurl::filter::parse_normalized;
use unfurl::{Capture, CaptureConfig, Source};

mod args;
use args::{Args, Mode, source_of};

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => CaptureConfig::from_file(path)?,
        None => CaptureConfig::default(),
    }
    .with_env_overrides();

    if let Some(webdriver) = &args.webdriver {
        config.webdriver_url = webdriver.clone();
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }

    let source = source_of(&args)?;
    if let Source::Web(_) = &source {
        if args.mode != Mode::Lookup {
            ::log::info!(
                "Web pages are loaded through WebDriver at {} (set WEBDRIVER_URL to change)",
                config.webdriver_url
            );
        }
    }

    let start_time = std::time::Instant::now();
    ::log::info!("Reading {} ({:?})", args.uri, args.mode);

    match args.mode {
        Mode::Read => {
            let page = Capture::new(source).with_config(config).read().await?;
            print_json(&page.scrape)?;
        }
        Mode::Links => {
            let page = Capture::new(source).with_config(config).read().await?;
            print_json(&page.links())?;
        }
        Mode::Ingest => {
            let client = client_for(&config)?;
            let page = Capture::new(source).with_config(config).read().await?;
            let ingest = client.ingest(&page.resource).await?;
            ::log::info!(
                "{} backlink(s), {} siblink(s)",
                ingest.back_links.len(),
                ingest.sib_links.len()
            );
            print_json(&ingest)?;
        }
        Mode::Lookup => {
            let client = client_for(&config)?;
            let url = parse_normalized(&args.uri)?;
            let resource = client.lookup(url.as_str()).await?;
            print_json(&resource)?;
        }
    }

    ::log::info!(
        "Done in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn client_for(config: &CaptureConfig) -> Result<KnowledgeClient, unfurl::ClientError> {
    KnowledgeClient::new(
        &config.endpoint,
        Duration::from_secs(config.request_timeout_secs),
    )
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
