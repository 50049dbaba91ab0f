pub mod browser;
pub mod file;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Where a page comes from
#[derive(Debug, Clone)]
pub enum Source {
    /// A live page loaded through WebDriver
    Web(String),
    /// An HTML file on disk, served as if from `url`
    File { path: PathBuf, url: String },
    /// HTML already in memory
    Html { html: String, url: String },
}

/// Natural sizes of the images of a page, keyed by absolute `src`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSizes(HashMap<String, (u32, u32)>);

impl ImageSizes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, src: impl Into<String>, width: u32, height: u32) {
        self.0.insert(src.into(), (width, height));
    }

    pub fn get(&self, src: &str) -> Option<(u32, u32)> {
        self.0.get(src).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Serialized DOM of a page at one point in time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    /// URL of the document (after redirects)
    pub url: String,

    /// Serialized DOM
    pub html: String,

    /// Image sizes measured in the live page, empty for static sources
    #[serde(default)]
    pub image_sizes: ImageSizes,
}

impl Snapshot {
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            image_sizes: ImageSizes::new(),
        }
    }

    pub fn with_image_sizes(mut self, image_sizes: ImageSizes) -> Self {
        self.image_sizes = image_sizes;
        self
    }
}
