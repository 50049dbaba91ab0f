use crate::capture::{ImageSizes, Snapshot};
use crate::error::CaptureError;
use fantoccini::{Client, ClientBuilder};
use serde_json::Value;
use std::time::Duration;
use tokio::time::timeout;

/// Reads the natural size of every image once the page has loaded
const IMAGE_SIZES_SCRIPT: &str = r#"
return Array.from(document.images).map(function (img) {
    return [img.currentSrc || img.src, img.naturalWidth, img.naturalHeight];
});
"#;

/// Loads `url` in a WebDriver session and snapshots its live DOM.
///
/// The whole capture, navigation included, is bounded by `limit`.
pub async fn capture(
    url: &str,
    webdriver_url: &str,
    limit: Duration,
) -> Result<Snapshot, CaptureError> {
    ::log::info!("Capturing {} through WebDriver", url);
    let started = std::time::Instant::now();

    let client = connect_to_webdriver(webdriver_url).await?;

    let result = match timeout(limit, snapshot_page(&client, url)).await {
        Ok(result) => result,
        Err(_) => {
            ::log::error!("Timeout capturing: {}", url);
            Err(CaptureError::Timeout(url.to_string()))
        }
    };

    if let Err(e) = client.close().await {
        ::log::warn!("Failed to close WebDriver session: {}", e);
    }

    if let Ok(snapshot) = &result {
        ::log::debug!(
            "Captured {} ({} bytes, {} image size(s)) in {:.2} seconds",
            snapshot.url,
            snapshot.html.len(),
            snapshot.image_sizes.len(),
            started.elapsed().as_secs_f64()
        );
    }

    result
}

/// Connects to the WebDriver instance, trying common alternatives when the
/// configured one is not reachable.
async fn connect_to_webdriver(webdriver_url: &str) -> Result<Client, CaptureError> {
    match ClientBuilder::native().connect(webdriver_url).await {
        Ok(client) => {
            ::log::debug!("Connected to WebDriver at {}", webdriver_url);
            return Ok(client);
        }
        Err(e) => {
            ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
        }
    }

    let fallback_urls = [
        "http://localhost:9515", // ChromeDriver default
        "http://localhost:4723", // Appium default
        "http://localhost:9222", // Chrome debug port default
        "http://127.0.0.1:4444", // Try with IP instead of localhost
    ];

    let mut tried = vec![webdriver_url.to_string()];
    for url in fallback_urls.iter() {
        if *url == webdriver_url {
            continue;
        }

        ::log::info!("Trying fallback WebDriver URL: {}", url);
        tried.push(url.to_string());
        if let Ok(client) = ClientBuilder::native().connect(url).await {
            ::log::debug!("Connected to fallback WebDriver at {}", url);
            return Ok(client);
        }
    }

    ::log::error!(
        "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
    );
    Err(CaptureError::WebDriver(tried.join(", ")))
}

async fn snapshot_page(client: &Client, url: &str) -> Result<Snapshot, CaptureError> {
    client
        .goto(url)
        .await
        .map_err(|e| navigation_error(e, "accessing", url))?;

    let html = client
        .source()
        .await
        .map_err(|e| navigation_error(e, "getting source for", url))?;

    // Redirects change the document URL the page's links resolve against
    let final_url = match client.current_url().await {
        Ok(current) => current.to_string(),
        Err(e) => {
            ::log::warn!("Could not read current URL of {}: {}", url, e);
            url.to_string()
        }
    };

    let image_sizes = match client.execute(IMAGE_SIZES_SCRIPT, Vec::new()).await {
        Ok(value) => parse_image_sizes(&value),
        Err(e) => {
            ::log::warn!("Could not measure images of {}: {}", url, e);
            ImageSizes::new()
        }
    };

    Ok(Snapshot::new(final_url, html).with_image_sizes(image_sizes))
}

/// Decodes `[[src, width, height], ...]` as returned by the size script
fn parse_image_sizes(value: &Value) -> ImageSizes {
    let mut sizes = ImageSizes::new();
    let Some(entries) = value.as_array() else {
        return sizes;
    };

    for entry in entries {
        let dimension = |index: usize| {
            entry
                .get(index)
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
        };
        let (Some(src), Some(width), Some(height)) = (
            entry.get(0).and_then(Value::as_str),
            dimension(1),
            dimension(2),
        ) else {
            continue;
        };
        if src.is_empty() {
            continue;
        }
        sizes.insert(src, width, height);
    }

    sizes
}

fn navigation_error(
    error: fantoccini::error::CmdError,
    context: &'static str,
    url: &str,
) -> CaptureError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost session while {} {}", context, url);
    } else {
        ::log::error!("Failed {} {}: {}", context, url, error);
    }
    CaptureError::Navigation {
        context,
        url: url.to_string(),
        message: error.to_string(),
    }
}
