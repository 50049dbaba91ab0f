//! Wire types exchanged with the knowledge server.
//!
//! Field names follow the server's GraphQL schema, so everything is
//! camelCase on the wire.

use serde::{Deserialize, Serialize};

/// How a link appears in its referrer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LinkKind {
    /// `[text](url)`
    #[default]
    Inline,
    /// `[text][identifier]`
    Reference,
}

/// A captured page, as sent to the `Ingest` mutation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputResource {
    pub url: String,
    pub cid: Option<String>,
    pub icon: Option<String>,
    pub image: Option<String>,
    pub title: String,
    pub description: String,
    pub links: Option<Vec<InputLink>>,
    pub tags: Option<Vec<InputTag>>,
}

/// An outbound link found on a captured page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputLink {
    #[serde(rename = "targetURL")]
    pub target_url: String,
    pub referrer_fragment: Option<String>,
    pub referrer_location: Option<String>,
    pub kind: LinkKind,
    pub name: String,
    pub title: String,
    pub identifier: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputTag {
    pub name: String,
    pub target_fragment: Option<String>,
    pub target_location: Option<String>,
}

/// Metadata the server keeps about a resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceInfo {
    pub title: String,
    pub description: String,
    pub cid: Option<String>,
    pub icon: Option<String>,
    pub image: Option<String>,
}

/// A resource as returned by the server.
///
/// Nested resources are usually partial: a backlink's referrer typically
/// carries its `url` and `info` but not its own links.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Resource {
    pub url: String,
    pub info: ResourceInfo,
    pub links: Vec<Link>,
    pub back_links: Vec<Link>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Link {
    pub kind: LinkKind,
    pub name: String,
    pub title: String,
    pub identifier: Option<String>,
    pub fragment: Option<String>,
    pub location: Option<String>,
    pub target: Resource,
    pub referrer: Resource,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Tag {
    pub name: String,
    pub target_fragment: Option<String>,
    pub target_location: Option<String>,
}

/// Result of the `Ingest` mutation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Ingest {
    /// Links from other pages to the targets this page links to
    pub sib_links: Vec<Link>,
    /// Links from other pages to this one
    pub back_links: Vec<Link>,
}

/// Input of the `Similar` query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSimilar {
    pub content: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarResources {
    pub keywords: Vec<String>,
    pub similar: Vec<SimilarResource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarResource {
    pub score: f64,
    pub resource: Resource,
}

/// Result of asking the server to open a resource locally
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpenResult {
    pub open_ok: bool,
    pub exit_ok: bool,
    pub code: Option<i32>,
}
