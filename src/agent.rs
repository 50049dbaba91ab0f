//! The content-script application.
//!
//! Scans the page it runs in, sends the result to the extension for
//! ingestion, and keeps what comes back (backlinks, siblinks, similar
//! resources) in its model for the surface to render.

use crate::capture::Snapshot;
use crate::config::ExtractorConfig;
use crate::error::SelectorError;
use crate::feedback::Badge;
use crate::filter::parse_normalized;
use crate::graph::ResourceGraph;
use crate::mailbox::{
    Address, Envelope, ExtensionInbox, HoveredLink, ScriptInbox, SelectionData, Transport,
    deliver,
};
use crate::parsers::{Document, links};
use crate::program::{App, Effect, effect};
use crate::protocol::{InputSimilar, OpenResult};
use crate::selector::{self, Selector, TextRange};
use crate::{model, siblinks, similar};
use scraper::Html;
use std::sync::Arc;
use std::time::Instant;

pub struct AgentConfig {
    pub snapshot: Snapshot,
    pub extractor: ExtractorConfig,
    /// Scan and ingest the page as soon as the agent starts
    pub ingest_on_start: bool,
}

/// Where a highlight ended up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Highlight {
    Range(TextRange),
    /// The selector no longer matches; the surface scrolls to the top of
    /// the annotation list instead
    Fallback(SelectorError),
}

#[derive(Debug, Clone)]
pub struct Model {
    /// Identity of the page (no query, no fragment)
    pub url: String,
    pub snapshot: Arc<Snapshot>,
    pub extractor: Arc<ExtractorConfig>,
    pub enabled: bool,
    pub visible: bool,
    pub graph: Arc<ResourceGraph>,
    pub siblinks: Arc<siblinks::Model>,
    pub similar: Arc<similar::Model>,
    pub badge: Badge,
    pub ingest_sequence: Option<u64>,
    pub next_query_id: u64,
    pub highlight: Option<Highlight>,
    pub opened: Option<OpenResult>,
    pub error: Option<String>,
}

#[derive(Debug, Clone)]
pub enum Message {
    /// From the extension
    Inbox(ScriptInbox),
    Ingest,
    Lookup,
    Open(String),
    SelectionChange(Option<SelectionData>),
    Hover(Option<HoveredLink>),
    Highlight(Selector),
    Tick(Instant),
}

/// What the page reports to the agent
#[derive(Debug, Clone)]
pub enum Event {
    Received(ScriptInbox),
    Selection(Option<SelectionData>),
    Pointer(Option<HoveredLink>),
    Frame(Instant),
}

/// Draws the agent's model on the page
pub trait Surface {
    fn render(&mut self, model: &Model);
}

/// Surface that writes a summary of each render to the log
#[derive(Debug, Default)]
pub struct LogSurface;

impl Surface for LogSurface {
    fn render(&mut self, model: &Model) {
        let back_links = model
            .graph
            .resource(&model.url)
            .map_or(0, |resource| resource.back_links().count());
        let siblinks = model.siblinks.sib_links.as_ref().map_or(0, |map| map.len());
        let similar = model.similar.result().map_or(0, |result| result.similar.len());

        ::log::info!(
            "[{}] {} backlink(s), {} siblink target(s), {} similar{}",
            model.badge.text(),
            back_links,
            siblinks,
            similar,
            if model.visible { "" } else { " (hidden)" }
        );
        if let Some(error) = &model.error {
            ::log::warn!("{}", error);
        }
    }
}

pub struct Agent {
    transport: Arc<dyn Transport>,
    surface: Box<dyn Surface + Send>,
}

impl Agent {
    pub fn new(transport: Arc<dyn Transport>, surface: Box<dyn Surface + Send>) -> Self {
        Self { transport, surface }
    }

    /// Sends `message` to the extension and turns the reply into a message
    /// for this agent. Delivery failures become the reply `on_failure`
    /// builds.
    fn request<F>(&self, message: ExtensionInbox, on_failure: F) -> Option<Effect<Message>>
    where
        F: FnOnce(String) -> ScriptInbox + Send + 'static,
    {
        let transport = self.transport.clone();
        effect(async move {
            let reply = match deliver(transport.as_ref(), &Address::Extension, message.into()).await
            {
                Ok(Some(Envelope::Script(reply))) => reply,
                Ok(Some(other)) => on_failure(format!("unexpected reply: {:?}", other)),
                Ok(None) => return None,
                Err(e) => on_failure(e.to_string()),
            };
            Some(Message::Inbox(reply))
        })
    }

    fn ingest(&self, state: &Arc<Model>) -> (Arc<Model>, Option<Effect<Message>>) {
        if !state.enabled {
            return (state.clone(), None);
        }

        let resource = match model::read(&state.snapshot, &state.extractor) {
            Ok(resource) => resource,
            Err(e) => {
                return (
                    Arc::new(Model {
                        error: Some(format!("cannot read page: {}", e)),
                        ..Model::clone(state)
                    }),
                    None,
                );
            }
        };

        let mut next = Model::clone(state);
        next.ingest_sequence = Some(next.badge.start(Instant::now()));
        next.error = None;

        let fx = self.request(ExtensionInbox::IngestRequest { resource }, |e| {
            ScriptInbox::IngestResponse { response: Err(e) }
        });
        (Arc::new(next), fx)
    }

    fn inspect_links(&self, state: &Model) -> Option<Effect<Message>> {
        let document = match Document::parse(&state.snapshot) {
            Ok(document) => document,
            Err(e) => {
                ::log::error!("Cannot inspect links of {}: {}", state.url, e);
                return None;
            }
        };
        let links = links::scan(&document, &state.extractor);

        let transport = self.transport.clone();
        let message = ExtensionInbox::InspectLinksResponse {
            url: state.url.clone(),
            links,
        };
        effect(async move {
            if let Err(e) = deliver(transport.as_ref(), &Address::Extension, message.into()).await {
                ::log::warn!("Could not report links: {}", e);
            }
            None
        })
    }

    fn select(
        &self,
        data: Option<SelectionData>,
        state: &Arc<Model>,
    ) -> (Arc<Model>, Option<Effect<Message>>) {
        let Some(data) = data else {
            return with_similar(state, similar::idle(&state.similar), None);
        };
        if !state.enabled {
            return (state.clone(), None);
        }

        let id = state.next_query_id;
        let query = similar::Query {
            id,
            input: InputSimilar {
                content: data.content,
                url: data.url,
            },
            rect: data.rect,
        };

        let (next_similar, issued) = similar::query(query, &state.similar);
        let Some(query) = issued else {
            return with_similar(state, next_similar, None);
        };
        let fx = self.request(
            ExtensionInbox::SimilarRequest {
                id: query.id,
                input: query.input,
                rect: query.rect,
            },
            move |e| ScriptInbox::SimilarResponse {
                id,
                response: Err(e),
            },
        );

        let next = Model {
            similar: next_similar,
            next_query_id: id + 1,
            ..Model::clone(state)
        };
        (Arc::new(next), fx)
    }

    fn receive(
        &self,
        message: ScriptInbox,
        state: &Arc<Model>,
    ) -> (Arc<Model>, Option<Effect<Message>>) {
        match message {
            ScriptInbox::IngestResponse { response } => {
                let mut next = Model::clone(state);
                let ok = response.is_ok();
                match response {
                    Ok(ingest) => {
                        let graph = ResourceGraph::from_ingest(&state.url, &ingest);
                        next.siblinks =
                            Arc::new(siblinks::ingested(&state.siblinks, &state.url, &graph));
                        next.graph = Arc::new(graph);
                        next.error = None;
                    }
                    Err(e) => {
                        ::log::error!("Ingest of {} failed: {}", state.url, e);
                        next.error = Some(e);
                    }
                }
                if let Some(sequence) = state.ingest_sequence {
                    next.badge.complete(sequence, ok, Instant::now());
                }
                (Arc::new(next), None)
            }
            ScriptInbox::LookupResponse { response } => {
                let next = match response {
                    Ok(resource) => Model {
                        graph: Arc::new(ResourceGraph::from_resource(&resource)),
                        error: None,
                        ..Model::clone(state)
                    },
                    Err(e) => Model {
                        error: Some(e),
                        ..Model::clone(state)
                    },
                };
                (Arc::new(next), None)
            }
            ScriptInbox::SimilarResponse { id, response } => {
                let next_similar = similar::complete(id, response, &state.similar);
                with_similar(state, next_similar, None)
            }
            ScriptInbox::OpenResponse { response } => {
                let next = match response {
                    Ok(result) if result.open_ok => Model {
                        opened: Some(result),
                        error: None,
                        ..Model::clone(state)
                    },
                    Ok(result) => Model {
                        opened: Some(result),
                        error: Some(format!("open failed with code {:?}", result.code)),
                        ..Model::clone(state)
                    },
                    Err(e) => Model {
                        error: Some(e),
                        ..Model::clone(state)
                    },
                };
                (Arc::new(next), None)
            }
            ScriptInbox::InspectLinksRequest => (state.clone(), self.inspect_links(state)),
            ScriptInbox::Toggle => (
                Arc::new(Model {
                    visible: !state.visible,
                    ..Model::clone(state)
                }),
                None,
            ),
            ScriptInbox::Show => (set_flags(state, state.enabled, true), None),
            ScriptInbox::Hide => (set_flags(state, state.enabled, false), None),
            ScriptInbox::Enable => (set_flags(state, true, state.visible), None),
            ScriptInbox::Disable => {
                let next = set_flags(state, false, state.visible);
                let (next, _) = with_similar(&next, similar::idle(&next.similar), None);
                (next, None)
            }
            ScriptInbox::CloseRequest => (set_flags(state, false, false), None),
        }
    }
}

fn set_flags(state: &Arc<Model>, enabled: bool, visible: bool) -> Arc<Model> {
    if state.enabled == enabled && state.visible == visible {
        state.clone()
    } else {
        Arc::new(Model {
            enabled,
            visible,
            ..Model::clone(state)
        })
    }
}

fn with_similar(
    state: &Arc<Model>,
    next: Arc<similar::Model>,
    fx: Option<Effect<Message>>,
) -> (Arc<Model>, Option<Effect<Message>>) {
    if Arc::ptr_eq(&state.similar, &next) {
        (state.clone(), fx)
    } else {
        (
            Arc::new(Model {
                similar: next,
                ..Model::clone(state)
            }),
            fx,
        )
    }
}

impl App for Agent {
    type Config = AgentConfig;
    type Message = Message;
    type Model = Model;
    type Event = Event;

    fn init(&self, config: AgentConfig) -> (Arc<Model>, Option<Effect<Message>>) {
        let url = match parse_normalized(&config.snapshot.url) {
            Ok(url) => url.to_string(),
            Err(_) => config.snapshot.url.clone(),
        };

        let state = Arc::new(Model {
            url,
            snapshot: Arc::new(config.snapshot),
            extractor: Arc::new(config.extractor),
            enabled: true,
            visible: true,
            graph: Arc::new(ResourceGraph::new()),
            siblinks: Arc::new(siblinks::Model::default()),
            similar: Arc::new(similar::Model::Idle),
            badge: Badge::new(),
            ingest_sequence: None,
            next_query_id: 1,
            highlight: None,
            opened: None,
            error: None,
        });

        if config.ingest_on_start {
            self.ingest(&state)
        } else {
            (state, None)
        }
    }

    fn update(
        &self,
        message: Message,
        state: &Arc<Model>,
    ) -> (Arc<Model>, Option<Effect<Message>>) {
        match message {
            Message::Inbox(message) => self.receive(message, state),
            Message::Ingest => self.ingest(state),
            Message::Lookup => {
                let fx = self.request(
                    ExtensionInbox::LookupRequest {
                        url: state.url.clone(),
                    },
                    |e| ScriptInbox::LookupResponse { response: Err(e) },
                );
                (state.clone(), fx)
            }
            Message::Open(url) => {
                let fx = self.request(ExtensionInbox::OpenRequest { url }, |e| {
                    ScriptInbox::OpenResponse { response: Err(e) }
                });
                (state.clone(), fx)
            }
            Message::SelectionChange(data) => self.select(data, state),
            Message::Hover(link) => {
                let next = siblinks::hover(&state.siblinks, link);
                if Arc::ptr_eq(&next, &state.siblinks) {
                    (state.clone(), None)
                } else {
                    (
                        Arc::new(Model {
                            siblinks: next,
                            ..Model::clone(state)
                        }),
                        None,
                    )
                }
            }
            Message::Highlight(selector) => {
                let document = Html::parse_document(&state.snapshot.html);
                let highlight = match selector::resolve(&selector, &document) {
                    Ok(range) => Highlight::Range(range),
                    Err(e) => {
                        ::log::debug!("Highlight falls back: {}", e);
                        Highlight::Fallback(e)
                    }
                };
                (
                    Arc::new(Model {
                        highlight: Some(highlight),
                        ..Model::clone(state)
                    }),
                    None,
                )
            }
            Message::Tick(now) => {
                let mut badge = state.badge.clone();
                if badge.tick(now) {
                    (
                        Arc::new(Model {
                            badge,
                            ..Model::clone(state)
                        }),
                        None,
                    )
                } else {
                    (state.clone(), None)
                }
            }
        }
    }

    fn render(&mut self, model: &Model) {
        self.surface.render(model);
    }

    fn on_event(&self, event: &Event) -> Option<Message> {
        match event {
            Event::Received(message) => Some(Message::Inbox(message.clone())),
            Event::Selection(data) => Some(Message::SelectionChange(data.clone())),
            Event::Pointer(link) => Some(Message::Hover(link.clone())),
            Event::Frame(now) => Some(Message::Tick(*now)),
        }
    }
}
