//! Read-side view of the knowledge server's resource graph.
//!
//! The server answers with trees of `Resource` values whose links point back
//! at other resources, so the same page shows up many times at different
//! depths. `ResourceGraph` flattens them into one table keyed by URL; links
//! refer to their ends by key and `ResourceView`/`LinkView` walk the cycles
//! by lookup.

use crate::protocol::{Ingest, Link, LinkKind, Resource, ResourceInfo, Tag};
use std::collections::HashMap;

/// Index of a link in the graph
pub type LinkId = usize;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceRecord {
    pub url: String,
    pub info: ResourceInfo,
    pub links: Vec<LinkId>,
    pub back_links: Vec<LinkId>,
    pub tags: Vec<Tag>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub kind: LinkKind,
    pub name: String,
    pub title: String,
    pub identifier: Option<String>,
    pub fragment: Option<String>,
    pub location: Option<String>,
    /// URL of the linked resource
    pub target: String,
    /// URL of the resource the link appears on
    pub referrer: String,
}

impl LinkRecord {
    fn key(&self) -> (&str, &str, &str, Option<&str>) {
        (
            &self.referrer,
            &self.target,
            &self.name,
            self.fragment.as_deref(),
        )
    }
}

/// Flat table of resources and the links between them
#[derive(Debug, Clone, Default)]
pub struct ResourceGraph {
    resources: HashMap<String, ResourceRecord>,
    links: Vec<LinkRecord>,
}

impl ResourceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Graph of a `Lookup` answer
    pub fn from_resource(resource: &Resource) -> Self {
        let mut graph = Self::new();
        graph.add_resource(resource);
        graph
    }

    /// Graph of an `Ingest` answer for the page at `url`.
    ///
    /// Backlinks target the page itself; siblinks come with their target
    /// resource, whose backlinks are the interesting part.
    pub fn from_ingest(url: &str, ingest: &Ingest) -> Self {
        let mut graph = Self::new();
        graph.ensure(url);
        for link in ingest.back_links.iter().chain(&ingest.sib_links) {
            graph.add_link(link);
        }
        graph
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn contains(&self, url: &str) -> bool {
        self.resources.contains_key(url)
    }

    pub fn resource(&self, url: &str) -> Option<ResourceView<'_>> {
        self.resources.get(url).map(|record| ResourceView {
            graph: self,
            record,
        })
    }

    /// Adds a resource and everything reachable from it, returning its key
    pub fn add_resource(&mut self, resource: &Resource) -> String {
        let url = resource.url.clone();
        let record = self.ensure(&url);
        if record.info == ResourceInfo::default() {
            record.info = resource.info.clone();
        }
        for tag in &resource.tags {
            if !record.tags.contains(tag) {
                record.tags.push(tag.clone());
            }
        }

        for link in resource.links.iter().chain(&resource.back_links) {
            self.add_link_between(link, &url);
        }
        url
    }

    /// Adds a link and both of its ends
    pub fn add_link(&mut self, link: &Link) -> LinkId {
        self.add_link_between(link, "")
    }

    /// Adds a link found while walking the resource at `owner`. Nested
    /// resources on the wire often leave the owning end empty.
    fn add_link_between(&mut self, link: &Link, owner: &str) -> LinkId {
        let mut target = link.target.url.as_str();
        let mut referrer = link.referrer.url.as_str();
        if target.is_empty() {
            target = owner;
        }
        if referrer.is_empty() {
            referrer = owner;
        }

        let record = LinkRecord {
            kind: link.kind,
            name: link.name.clone(),
            title: link.title.clone(),
            identifier: link.identifier.clone(),
            fragment: link.fragment.clone(),
            location: link.location.clone(),
            target: target.to_string(),
            referrer: referrer.to_string(),
        };

        if let Some(id) = self.links.iter().position(|l| l.key() == record.key()) {
            return id;
        }

        let id = self.links.len();
        let (target, referrer) = (record.target.clone(), record.referrer.clone());
        self.links.push(record);
        self.ensure(&referrer).links.push(id);
        self.ensure(&target).back_links.push(id);

        // Recurse into the ends, skipping the side we came from
        if !link.target.url.is_empty() && link.target.url != owner {
            self.add_resource(&link.target);
        }
        if !link.referrer.url.is_empty() && link.referrer.url != owner {
            self.add_resource(&link.referrer);
        }

        id
    }

    fn ensure(&mut self, url: &str) -> &mut ResourceRecord {
        self.resources
            .entry(url.to_string())
            .or_insert_with(|| ResourceRecord {
                url: url.to_string(),
                ..ResourceRecord::default()
            })
    }

    fn link(&self, id: LinkId) -> LinkView<'_> {
        LinkView {
            graph: self,
            record: &self.links[id],
        }
    }
}

/// A resource inside a graph
#[derive(Debug, Clone, Copy)]
pub struct ResourceView<'a> {
    graph: &'a ResourceGraph,
    record: &'a ResourceRecord,
}

impl<'a> ResourceView<'a> {
    pub fn url(&self) -> &'a str {
        &self.record.url
    }

    pub fn info(&self) -> &'a ResourceInfo {
        &self.record.info
    }

    /// Title, or the URL when the server knows no title
    pub fn display_name(&self) -> &'a str {
        if self.record.info.title.trim().is_empty() {
            &self.record.url
        } else {
            &self.record.info.title
        }
    }

    pub fn tags(&self) -> &'a [Tag] {
        &self.record.tags
    }

    pub fn links(&self) -> impl Iterator<Item = LinkView<'a>> + 'a {
        let (graph, record) = (self.graph, self.record);
        record.links.iter().map(move |id| graph.link(*id))
    }

    pub fn back_links(&self) -> impl Iterator<Item = LinkView<'a>> + 'a {
        let (graph, record) = (self.graph, self.record);
        record.back_links.iter().map(move |id| graph.link(*id))
    }

    /// Backlinks grouped by the page they appear on, in order of first
    /// appearance
    pub fn back_links_by_referrer(&self) -> Vec<(ResourceView<'a>, Vec<LinkView<'a>>)> {
        let mut groups: Vec<(ResourceView<'a>, Vec<LinkView<'a>>)> = Vec::new();
        for link in self.back_links() {
            let Some(referrer) = link.referrer() else {
                continue;
            };
            match groups.iter_mut().find(|(r, _)| r.url() == referrer.url()) {
                Some((_, links)) => links.push(link),
                None => groups.push((referrer, vec![link])),
            }
        }
        groups
    }
}

/// A link inside a graph
#[derive(Debug, Clone, Copy)]
pub struct LinkView<'a> {
    graph: &'a ResourceGraph,
    record: &'a LinkRecord,
}

impl<'a> LinkView<'a> {
    pub fn record(&self) -> &'a LinkRecord {
        self.record
    }

    pub fn kind(&self) -> LinkKind {
        self.record.kind
    }

    pub fn name(&self) -> &'a str {
        &self.record.name
    }

    pub fn fragment(&self) -> Option<&'a str> {
        self.record.fragment.as_deref()
    }

    pub fn target(&self) -> Option<ResourceView<'a>> {
        self.graph.resource(&self.record.target)
    }

    pub fn referrer(&self) -> Option<ResourceView<'a>> {
        self.graph.resource(&self.record.referrer)
    }
}
