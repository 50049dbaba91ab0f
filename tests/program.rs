use serde_json::json;
use std::sync::{Arc, Mutex};
use unfurl::agent::{Agent, AgentConfig, Event, LogSurface, Message};
use unfurl::error::TransportError;
use unfurl::feedback::{FAILURE_TEXT, Phase, SUCCESS_TEXT};
use unfurl::mailbox::{
    Address, Envelope, ExtensionInbox, HoveredLink, Rect, ScriptInbox, SelectionData, Transport,
};
use unfurl::program::{App, Effect, Program, effect};
use unfurl::protocol::{Ingest, SimilarResources};
use unfurl::{ExtractorConfig, Snapshot};

use futures::future::BoxFuture;
use tokio::sync::mpsc;

struct Counter {
    rendered: Vec<i32>,
}

enum Step {
    Add(i32),
    Noop,
    Later(i32),
}

impl App for Counter {
    type Config = i32;
    type Message = Step;
    type Model = i32;
    type Event = i32;

    fn init(&self, start: i32) -> (Arc<i32>, Option<Effect<Step>>) {
        (Arc::new(start), None)
    }

    fn update(&self, step: Step, model: &Arc<i32>) -> (Arc<i32>, Option<Effect<Step>>) {
        match step {
            Step::Add(n) => (Arc::new(**model + n), None),
            Step::Noop => (model.clone(), None),
            Step::Later(n) => (
                model.clone(),
                effect(async move {
                    tokio::task::yield_now().await;
                    Some(Step::Add(n))
                }),
            ),
        }
    }

    fn render(&mut self, model: &i32) {
        self.rendered.push(*model);
    }

    fn on_event(&self, event: &i32) -> Option<Step> {
        (*event != 0).then_some(Step::Add(*event))
    }
}

fn counter() -> Program<Counter> {
    Program::new(Counter { rendered: vec![] }, 10)
}

#[tokio::test]
async fn test_unchanged_model_skips_render() {
    let mut program = counter();
    assert_eq!(program.renders(), 1);

    program.send(Step::Noop);
    program.handle_event(&0);
    assert_eq!(program.renders(), 1);

    program.send(Step::Add(5));
    program.handle_event(&1);
    assert_eq!(**program.model(), 16);
    assert_eq!(program.app().rendered, vec![10, 15, 16]);
}

#[tokio::test]
async fn test_effects_feed_back_messages() {
    let mut program = counter();
    program.send(Step::Later(3));
    // the effect is scheduled even though the model did not change
    assert_eq!(program.renders(), 1);
    assert_eq!(program.pending(), 1);

    program.settle().await;
    assert_eq!(program.pending(), 0);
    assert_eq!(**program.model(), 13);
    assert_eq!(program.renders(), 2);
}

#[tokio::test]
async fn test_run_until_inbox_closes() {
    let mut program = counter();
    let (tx, rx) = mpsc::channel(8);
    tx.send(Step::Add(1)).await.unwrap();
    tx.send(Step::Later(2)).await.unwrap();
    tx.send(Step::Noop).await.unwrap();
    drop(tx);

    program.run(rx).await;
    assert_eq!(**program.model(), 13);
    assert_eq!(program.pending(), 0);
}

type Reply = Result<Option<ScriptInbox>, TransportError>;

type Responder = dyn Fn(ExtensionInbox) -> Reply + Send + Sync;

/// Extension stand-in answering requests with a fixed function
struct ScriptedExtension {
    sent: Mutex<Vec<ExtensionInbox>>,
    respond: Box<Responder>,
}

impl ScriptedExtension {
    fn new<F>(respond: F) -> Arc<Self>
    where
        F: Fn(ExtensionInbox) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            sent: Mutex::new(vec![]),
            respond: Box::new(respond),
        })
    }

    fn sent(&self) -> Vec<ExtensionInbox> {
        self.sent.lock().unwrap().clone()
    }
}

impl Transport for ScriptedExtension {
    fn request<'a>(
        &'a self,
        address: &'a Address,
        envelope: Envelope,
    ) -> BoxFuture<'a, Result<Option<Envelope>, TransportError>> {
        Box::pin(async move {
            assert_eq!(*address, Address::Extension);
            let Envelope::Extension(message) = envelope else {
                panic!("Expected an extension message, got {:?}", envelope);
            };
            self.sent.lock().unwrap().push(message.clone());
            (self.respond)(message).map(|reply| reply.map(Envelope::Script))
        })
    }

    fn inject<'a>(&'a self, _address: &'a Address) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(async { Ok(()) })
    }
}

const PAGE: &str = "https://me.org/post";

const HTML: &str = r#"<html><head><title>A post about sharing things</title></head>
<body><p>I keep coming back to <a href="https://shared.org/">this article</a> lately.</p></body></html>"#;

fn config(ingest_on_start: bool) -> AgentConfig {
    AgentConfig {
        snapshot: Snapshot::new("https://me.org/post?utm_source=feed#top", HTML),
        extractor: ExtractorConfig::default(),
        ingest_on_start,
    }
}

fn agent(transport: Arc<ScriptedExtension>) -> Agent {
    Agent::new(transport, Box::new(LogSurface))
}

fn ingest_reply() -> Ingest {
    serde_json::from_value(json!({
        "backLinks": [{
            "name": "a post",
            "referrer": { "url": "https://blog.org/", "info": { "title": "Blog" } },
            "target": { "url": PAGE }
        }],
        "sibLinks": [{
            "name": "this article",
            "referrer": { "url": PAGE },
            "target": {
                "url": "https://shared.org/",
                "tags": [{ "name": "reading" }],
                "backLinks": [{
                    "name": "shared",
                    "referrer": { "url": "https://other.org/" }
                }]
            }
        }]
    }))
    .unwrap()
}

#[tokio::test]
async fn test_agent_ingests_on_start() {
    let extension = ScriptedExtension::new(|message| match message {
        ExtensionInbox::IngestRequest { .. } => Ok(Some(ScriptInbox::IngestResponse {
            response: Ok(ingest_reply()),
        })),
        other => panic!("Unexpected request {:?}", other),
    });

    let mut program = Program::new(agent(extension.clone()), config(true));
    assert_eq!(program.model().url, PAGE);
    assert!(matches!(program.model().badge.phase(), Phase::Busy { .. }));

    program.settle().await;

    let sent = extension.sent();
    assert_eq!(sent.len(), 1);
    let ExtensionInbox::IngestRequest { resource } = &sent[0] else {
        panic!("Expected an ingest request");
    };
    assert_eq!(resource.url, PAGE);
    assert_eq!(resource.title, "A post about sharing things");
    assert_eq!(resource.links.as_ref().map(Vec::len), Some(1));

    let model = program.model();
    assert_eq!(model.badge.text(), SUCCESS_TEXT);
    assert_eq!(model.error, None);

    let page = model.graph.resource(PAGE).unwrap();
    assert_eq!(page.back_links().count(), 1);

    let sib_links = model.siblinks.sib_links.as_ref().unwrap();
    let shared = sib_links["https://shared.org/"].clone();
    assert_eq!(shared.links.len(), 1);
    assert_eq!(shared.links[0].referrer, "https://other.org/");
    assert_eq!(shared.tags[0].name, "reading");

    program.handle_event(&Event::Pointer(Some(HoveredLink {
        url: "https://shared.org/".to_string(),
    })));
    assert_eq!(program.model().siblinks.active.as_ref(), Some(&shared));
}

#[tokio::test]
async fn test_agent_reports_failed_ingest() {
    let extension = ScriptedExtension::new(|_| {
        Err(TransportError::Disconnected("extension reloaded".to_string()))
    });

    let mut program = Program::new(agent(extension), config(false));
    assert_eq!(program.model().badge.phase(), Phase::Idle);

    program.send(Message::Ingest);
    program.settle().await;

    let model = program.model();
    assert_eq!(model.badge.text(), FAILURE_TEXT);
    assert!(model.error.as_deref().unwrap().contains("extension reloaded"));
    assert!(model.graph.is_empty());
}

#[tokio::test]
async fn test_agent_keeps_latest_similarity_answer() {
    let extension = ScriptedExtension::new(|message| match message {
        ExtensionInbox::SimilarRequest { id, input, .. } => Ok(Some(ScriptInbox::SimilarResponse {
            id,
            response: Ok(SimilarResources {
                keywords: vec![input.content],
                similar: vec![],
            }),
        })),
        other => panic!("Unexpected request {:?}", other),
    });

    let mut program = Program::new(agent(extension.clone()), config(false));
    let selection = |content: &str| {
        Event::Selection(Some(SelectionData {
            content: content.to_string(),
            url: PAGE.to_string(),
            rect: Rect::default(),
        }))
    };

    program.handle_event(&selection("ownership"));
    program.handle_event(&selection("borrowing rules"));
    program.handle_event(&selection("borrowing rules"));
    // too short to query
    program.handle_event(&selection("ab"));
    program.handle_event(&selection("lifetimes"));
    program.settle().await;

    assert_eq!(extension.sent().len(), 3);
    let similar = &program.model().similar;
    assert_eq!(similar.query().map(|query| query.id), Some(3));
    assert_eq!(
        similar.result().map(|result| result.keywords.clone()),
        Some(vec!["lifetimes".to_string()])
    );
}

#[tokio::test]
async fn test_agent_visibility_messages() {
    let extension = ScriptedExtension::new(|_| Ok(None));
    let mut program = Program::new(agent(extension.clone()), config(false));

    let renders = program.renders();
    program.handle_event(&Event::Received(ScriptInbox::Show));
    assert_eq!(program.renders(), renders);

    program.handle_event(&Event::Received(ScriptInbox::Toggle));
    assert!(!program.model().visible);

    program.handle_event(&Event::Received(ScriptInbox::Disable));
    program.send(Message::Ingest);
    program.settle().await;
    assert!(extension.sent().is_empty());

    program.handle_event(&Event::Received(ScriptInbox::InspectLinksRequest));
    program.settle().await;
    match extension.sent().as_slice() {
        [ExtensionInbox::InspectLinksResponse { url, links }] => {
            assert_eq!(url, PAGE);
            assert_eq!(links[0].target_url, "https://shared.org/");
        }
        other => panic!("Expected one link report, got {:?}", other),
    }
}
