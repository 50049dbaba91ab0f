//! Messages exchanged between the extension, its content scripts and its UI.
//!
//! Each surface has its own inbox type. Responses carry `Result<_, String>`
//! so that a failed round-trip reaches the receiver as a message instead of
//! getting lost on the way.

use crate::client::KnowledgeClient;
use crate::error::TransportError;
use crate::protocol::{
    Ingest, InputLink, InputResource, InputSimilar, OpenResult, Resource, SimilarResources,
};
use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};

/// Screen rectangle of a selection or an element
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

/// Text the user selected on the page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionData {
    pub content: String,
    pub url: String,
    pub rect: Rect,
}

/// A link under the pointer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HoveredLink {
    pub url: String,
}

/// Messages handled by the extension's background page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ExtensionInbox {
    LookupRequest {
        url: String,
    },
    IngestRequest {
        resource: InputResource,
    },
    SimilarRequest {
        id: u64,
        input: InputSimilar,
        rect: Rect,
    },
    OpenRequest {
        url: String,
    },
    InspectLinksResponse {
        url: String,
        links: Vec<InputLink>,
    },
    CloseRequest,
}

/// Messages handled by a content script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ScriptInbox {
    LookupResponse {
        response: Result<Resource, String>,
    },
    IngestResponse {
        response: Result<Ingest, String>,
    },
    SimilarResponse {
        id: u64,
        response: Result<SimilarResources, String>,
    },
    OpenResponse {
        response: Result<OpenResult, String>,
    },
    InspectLinksRequest,
    Toggle,
    Enable,
    Disable,
    Show,
    Hide,
    CloseRequest,
}

/// Messages handled by the extension UI (popup or sidebar)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum UiInbox {
    CloseRequest,
    Show,
    Hide,
}

/// Where a message goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "to", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Address {
    Extension,
    Tab { tab_id: u32 },
    Frame { tab_id: u32, frame_id: u32 },
}

/// A message for any surface
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Envelope {
    Extension(ExtensionInbox),
    Script(ScriptInbox),
    Ui(UiInbox),
}

impl From<ExtensionInbox> for Envelope {
    fn from(message: ExtensionInbox) -> Self {
        Envelope::Extension(message)
    }
}

impl From<ScriptInbox> for Envelope {
    fn from(message: ScriptInbox) -> Self {
        Envelope::Script(message)
    }
}

impl From<UiInbox> for Envelope {
    fn from(message: UiInbox) -> Self {
        Envelope::Ui(message)
    }
}

/// The host's messaging channel
pub trait Transport: Send + Sync {
    /// Sends `envelope` to `address` and waits for the reply, if any
    fn request<'a>(
        &'a self,
        address: &'a Address,
        envelope: Envelope,
    ) -> BoxFuture<'a, Result<Option<Envelope>, TransportError>>;

    /// Injects the content script into the tab or frame at `address`
    fn inject<'a>(&'a self, address: &'a Address) -> BoxFuture<'a, Result<(), TransportError>>;
}

/// Sends a message, injecting the content script and retrying once when
/// nothing is listening at `address` yet.
pub async fn deliver<T: Transport + ?Sized>(
    transport: &T,
    address: &Address,
    envelope: Envelope,
) -> Result<Option<Envelope>, TransportError> {
    match transport.request(address, envelope.clone()).await {
        Err(TransportError::NoReceiver) => {
            ::log::debug!("No receiver at {:?}, injecting content script", address);
            transport.inject(address).await?;
            transport.request(address, envelope).await
        }
        result => result,
    }
}

/// Serves the extension inbox against the knowledge server
#[derive(Debug, Clone)]
pub struct Background {
    client: KnowledgeClient,
}

impl Background {
    pub fn new(client: KnowledgeClient) -> Self {
        Self { client }
    }

    /// Handles one request, returning the reply for the sender
    pub async fn handle(&self, message: ExtensionInbox) -> Option<ScriptInbox> {
        match message {
            ExtensionInbox::LookupRequest { url } => Some(ScriptInbox::LookupResponse {
                response: self.client.lookup(&url).await.map_err(|e| e.to_string()),
            }),
            ExtensionInbox::IngestRequest { resource } => Some(ScriptInbox::IngestResponse {
                response: self.client.ingest(&resource).await.map_err(|e| e.to_string()),
            }),
            ExtensionInbox::SimilarRequest { id, input, .. } => {
                Some(ScriptInbox::SimilarResponse {
                    id,
                    response: self.client.similar(&input).await.map_err(|e| e.to_string()),
                })
            }
            ExtensionInbox::OpenRequest { url } => Some(ScriptInbox::OpenResponse {
                response: self.client.open(&url).await.map_err(|e| e.to_string()),
            }),
            ExtensionInbox::InspectLinksResponse { url, links } => {
                ::log::info!("{} has {} link(s)", url, links.len());
                None
            }
            ExtensionInbox::CloseRequest => None,
        }
    }
}

/// Transport for a content script running in the same process as the
/// background: extension-bound requests are served directly, nothing else
/// has a receiver.
#[derive(Debug, Clone)]
pub struct LocalTransport {
    background: Background,
}

impl LocalTransport {
    pub fn new(background: Background) -> Self {
        Self { background }
    }
}

impl Transport for LocalTransport {
    fn request<'a>(
        &'a self,
        address: &'a Address,
        envelope: Envelope,
    ) -> BoxFuture<'a, Result<Option<Envelope>, TransportError>> {
        Box::pin(async move {
            match (address, envelope) {
                (Address::Extension, Envelope::Extension(message)) => {
                    Ok(self.background.handle(message).await.map(Envelope::Script))
                }
                (Address::Extension, other) => Err(TransportError::Disconnected(format!(
                    "the extension does not accept {:?}",
                    other
                ))),
                _ => Err(TransportError::NoReceiver),
            }
        })
    }

    fn inject<'a>(&'a self, address: &'a Address) -> BoxFuture<'a, Result<(), TransportError>> {
        Box::pin(async move {
            Err(TransportError::Disconnected(format!(
                "cannot inject into {:?} from a local transport",
                address
            )))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_inbox_wire_shape() {
        let message = ExtensionInbox::LookupRequest {
            url: "https://example.com/".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&message).unwrap(),
            json!({ "type": "LookupRequest", "url": "https://example.com/" })
        );

        let close: UiInbox = serde_json::from_value(json!({ "type": "CloseRequest" })).unwrap();
        assert_eq!(close, UiInbox::CloseRequest);

        let failed = ScriptInbox::OpenResponse {
            response: Err("offline".to_string()),
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["response"], json!({ "Err": "offline" }));
    }

    #[test]
    fn test_address_wire_shape() {
        let address = Address::Frame {
            tab_id: 3,
            frame_id: 7,
        };
        assert_eq!(
            serde_json::to_value(address).unwrap(),
            json!({ "to": "frame", "tabId": 3, "frameId": 7 })
        );
        assert_eq!(
            serde_json::to_value(Address::Extension).unwrap(),
            json!({ "to": "extension" })
        );
    }

    /// Fails with `NoReceiver` until injected
    struct LazyTab {
        injected: Mutex<bool>,
        attempts: Mutex<usize>,
        injections: Mutex<usize>,
    }

    impl LazyTab {
        fn new(injected: bool) -> Self {
            Self {
                injected: Mutex::new(injected),
                attempts: Mutex::new(0),
                injections: Mutex::new(0),
            }
        }
    }

    impl Transport for LazyTab {
        fn request<'a>(
            &'a self,
            _address: &'a Address,
            envelope: Envelope,
        ) -> BoxFuture<'a, Result<Option<Envelope>, TransportError>> {
            Box::pin(async move {
                *self.attempts.lock().unwrap() += 1;
                if *self.injected.lock().unwrap() {
                    Ok(Some(envelope))
                } else {
                    Err(TransportError::NoReceiver)
                }
            })
        }

        fn inject<'a>(
            &'a self,
            _address: &'a Address,
        ) -> BoxFuture<'a, Result<(), TransportError>> {
            Box::pin(async move {
                *self.injections.lock().unwrap() += 1;
                *self.injected.lock().unwrap() = true;
                Ok(())
            })
        }
    }

    #[tokio::test]
    async fn test_deliver_injects_and_retries_once() {
        let tab = LazyTab::new(false);
        let address = Address::Tab { tab_id: 1 };
        let reply = deliver(&tab, &address, ScriptInbox::Show.into())
            .await
            .unwrap();

        assert_eq!(reply, Some(Envelope::Script(ScriptInbox::Show)));
        assert_eq!(*tab.attempts.lock().unwrap(), 2);
        assert_eq!(*tab.injections.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn test_deliver_without_injection() {
        let tab = LazyTab::new(true);
        let address = Address::Tab { tab_id: 1 };
        deliver(&tab, &address, ScriptInbox::Hide.into())
            .await
            .unwrap();

        assert_eq!(*tab.attempts.lock().unwrap(), 1);
        assert_eq!(*tab.injections.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_deliver_gives_up_after_one_retry() {
        struct NeverListens(Mutex<usize>);

        impl Transport for NeverListens {
            fn request<'a>(
                &'a self,
                _address: &'a Address,
                _envelope: Envelope,
            ) -> BoxFuture<'a, Result<Option<Envelope>, TransportError>> {
                Box::pin(async move {
                    *self.0.lock().unwrap() += 1;
                    Err(TransportError::NoReceiver)
                })
            }

            fn inject<'a>(
                &'a self,
                _address: &'a Address,
            ) -> BoxFuture<'a, Result<(), TransportError>> {
                Box::pin(async { Ok(()) })
            }
        }

        let transport = NeverListens(Mutex::new(0));
        let result = deliver(&transport, &Address::Tab { tab_id: 2 }, UiInbox::Show.into()).await;
        assert_eq!(result, Err(TransportError::NoReceiver));
        assert_eq!(*transport.0.lock().unwrap(), 2);
    }
}
