//! A small model/update/render loop.
//!
//! An [`App`] owns the logic: `update` maps a message and the current model
//! to the next model and, optionally, an effect. Effects are futures that
//! resolve to at most one follow-up message. [`Program`] owns the state:
//! it applies messages, re-renders when the model changes, and feeds effect
//! results back in as they complete.

use futures::future::BoxFuture;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinSet;

/// Asynchronous work requested by an update
pub type Effect<M> = BoxFuture<'static, Option<M>>;

/// Wraps a future as an effect
pub fn effect<M, F>(future: F) -> Option<Effect<M>>
where
    F: Future<Output = Option<M>> + Send + 'static,
{
    Some(Box::pin(future))
}

pub trait App {
    type Config;
    type Message: Send + 'static;
    type Model;
    type Event;

    fn init(&self, config: Self::Config) -> (Arc<Self::Model>, Option<Effect<Self::Message>>);

    /// Computes the next model. Returning the same `Arc` means nothing
    /// changed and skips rendering.
    fn update(
        &self,
        message: Self::Message,
        model: &Arc<Self::Model>,
    ) -> (Arc<Self::Model>, Option<Effect<Self::Message>>);

    fn render(&mut self, model: &Self::Model);

    fn on_event(&self, event: &Self::Event) -> Option<Self::Message>;
}

/// Runs an [`App`]. Must be created inside a tokio runtime.
pub struct Program<A: App> {
    app: A,
    model: Arc<A::Model>,
    effects: JoinSet<Option<A::Message>>,
    renders: usize,
}

impl<A: App> Program<A> {
    /// Initializes the app, renders once and starts the initial effect
    pub fn new(app: A, config: A::Config) -> Self {
        let (model, fx) = app.init(config);
        let mut program = Self {
            app,
            model,
            effects: JoinSet::new(),
            renders: 0,
        };
        program.render();
        program.wait(fx);
        program
    }

    pub fn model(&self) -> &Arc<A::Model> {
        &self.model
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    /// How many times the app has rendered
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Effects still in flight
    pub fn pending(&self) -> usize {
        self.effects.len()
    }

    pub fn send(&mut self, message: A::Message) {
        let (model, fx) = self.app.update(message, &self.model);
        self.transact(model, fx);
    }

    pub fn handle_event(&mut self, event: &A::Event) {
        if let Some(message) = self.app.on_event(event) {
            self.send(message);
        }
    }

    /// Applies effect results until no effect is in flight
    pub async fn settle(&mut self) {
        while let Some(joined) = self.effects.join_next().await {
            self.complete(joined);
        }
    }

    /// Applies messages from `inbox` and effect results as they arrive,
    /// until the inbox is closed and every effect has completed.
    pub async fn run(&mut self, mut inbox: mpsc::Receiver<A::Message>) {
        let mut open = true;
        loop {
            tokio::select! {
                message = inbox.recv(), if open => match message {
                    Some(message) => self.send(message),
                    None => {
                        ::log::debug!("Program inbox closed");
                        open = false;
                    }
                },
                Some(joined) = self.effects.join_next(), if !self.effects.is_empty() => {
                    self.complete(joined);
                }
                else => break,
            }
        }
    }

    fn transact(&mut self, model: Arc<A::Model>, fx: Option<Effect<A::Message>>) {
        if !Arc::ptr_eq(&self.model, &model) {
            self.model = model;
            self.render();
        }
        self.wait(fx);
    }

    fn render(&mut self) {
        self.renders += 1;
        self.app.render(&self.model);
    }

    fn wait(&mut self, fx: Option<Effect<A::Message>>) {
        if let Some(fx) = fx {
            self.effects.spawn(fx);
        }
    }

    fn complete(&mut self, joined: Result<Option<A::Message>, tokio::task::JoinError>) {
        match joined {
            Ok(Some(message)) => self.send(message),
            Ok(None) => {}
            Err(e) => ::log::error!("Effect failed: {}", e),
        }
    }
}
