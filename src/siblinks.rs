//! Siblinks: what other pages say about the pages this one links to.

use crate::graph::{LinkRecord, ResourceGraph};
use crate::mailbox::HoveredLink;
use crate::protocol::Tag;
use std::collections::HashMap;
use std::sync::Arc;

/// Links from other pages to one of this page's link targets
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Siblink {
    pub links: Vec<LinkRecord>,
    pub tags: Vec<Tag>,
}

pub type Siblinks = HashMap<String, Siblink>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub hovered: Option<HoveredLink>,
    pub active: Option<Siblink>,
    pub sib_links: Option<Arc<Siblinks>>,
}

/// Collects the siblinks of the page at `url` from an ingest graph.
///
/// Each target this page links to contributes the backlinks that come from
/// other pages, plus its tags. Targets with neither are left out.
pub fn ingested(state: &Model, url: &str, graph: &ResourceGraph) -> Model {
    let mut map = Siblinks::new();

    if let Some(page) = graph.resource(url) {
        for link in page.links() {
            let Some(target) = link.target() else {
                continue;
            };
            let links: Vec<LinkRecord> = target
                .back_links()
                .map(|back| back.record())
                .filter(|back| back.referrer != url)
                .cloned()
                .collect();
            let tags = target.tags().to_vec();
            if !links.is_empty() || !tags.is_empty() {
                map.insert(target.url().to_string(), Siblink { links, tags });
            }
        }
    }

    ::log::debug!("{} target(s) with siblinks", map.len());
    let active = state
        .hovered
        .as_ref()
        .and_then(|hovered| active_siblink(Some(&map), hovered));

    Model {
        hovered: state.hovered.clone(),
        active,
        sib_links: Some(Arc::new(map)),
    }
}

/// Tracks the link under the pointer. Hovering the same link again keeps
/// the state as is.
pub fn hover(state: &Arc<Model>, link: Option<HoveredLink>) -> Arc<Model> {
    match link {
        Some(link) if state.hovered.as_ref() == Some(&link) => state.clone(),
        Some(link) => {
            let active = active_siblink(state.sib_links.as_deref(), &link);
            Arc::new(Model {
                hovered: Some(link),
                active,
                sib_links: state.sib_links.clone(),
            })
        }
        None if state.hovered.is_none() => state.clone(),
        None => Arc::new(Model {
            hovered: None,
            ..Model::clone(state)
        }),
    }
}

pub fn active_siblink(sib_links: Option<&Siblinks>, link: &HoveredLink) -> Option<Siblink> {
    sib_links.and_then(|map| map.get(&link.url)).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{Ingest, Link, Resource};

    const PAGE: &str = "https://me.org/";

    fn resource(url: &str) -> Resource {
        Resource {
            url: url.to_string(),
            ..Resource::default()
        }
    }

    fn link(referrer: &str, target: Resource) -> Link {
        Link {
            name: "link".to_string(),
            referrer: resource(referrer),
            target,
            ..Link::default()
        }
    }

    fn graph() -> ResourceGraph {
        let mut shared = resource("https://shared.org/");
        shared.back_links = vec![
            link(PAGE, resource("https://shared.org/")),
            link("https://other.org/", resource("https://shared.org/")),
        ];
        let lonely = resource("https://lonely.org/");
        let ingest = Ingest {
            sib_links: vec![link(PAGE, shared), link(PAGE, lonely)],
            back_links: vec![],
        };
        ResourceGraph::from_ingest(PAGE, &ingest)
    }

    #[test]
    fn test_ingested_excludes_own_links() {
        let model = ingested(&Model::default(), PAGE, &graph());
        let map = model.sib_links.unwrap();
        assert_eq!(map.len(), 1);
        let siblink = &map["https://shared.org/"];
        assert_eq!(siblink.links.len(), 1);
        assert_eq!(siblink.links[0].referrer, "https://other.org/");
    }

    #[test]
    fn test_hover() {
        let state = Arc::new(ingested(&Model::default(), PAGE, &graph()));
        let shared = HoveredLink {
            url: "https://shared.org/".to_string(),
        };

        let hovered = hover(&state, Some(shared.clone()));
        assert!(hovered.active.is_some());

        let again = hover(&hovered, Some(shared));
        assert!(Arc::ptr_eq(&hovered, &again));

        let left = hover(&again, None);
        assert!(left.hovered.is_none());
    }

    #[test]
    fn test_hover_before_ingest() {
        let state = Arc::new(Model::default());
        let link = HoveredLink {
            url: "https://shared.org/".to_string(),
        };
        let hovered = hover(&state, Some(link.clone()));
        assert!(hovered.active.is_none());

        let model = ingested(&hovered, PAGE, &graph());
        assert!(model.active.is_some());
        assert_eq!(model.hovered, Some(link));
    }
}
