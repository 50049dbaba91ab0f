//! Similarity search for the current selection.
//!
//! Every query carries an id from a monotonic counter. Responses are applied
//! only when they answer the pending query; anything older is dropped.

use crate::mailbox::Rect;
use crate::protocol::{InputSimilar, SimilarResources};
use std::sync::Arc;

/// Selections shorter than this do not trigger a search
pub const MIN_QUERY_LENGTH: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub id: u64,
    pub input: InputSimilar,
    pub rect: Rect,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum Model {
    #[default]
    Idle,
    Pending {
        query: Query,
    },
    Ready {
        query: Query,
        result: SimilarResources,
    },
}

impl Model {
    pub fn query(&self) -> Option<&Query> {
        match self {
            Model::Idle => None,
            Model::Pending { query } | Model::Ready { query, .. } => Some(query),
        }
    }

    pub fn result(&self) -> Option<&SimilarResources> {
        match self {
            Model::Ready { result, .. } => Some(result),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, Model::Pending { .. })
    }
}

pub fn idle(state: &Arc<Model>) -> Arc<Model> {
    match state.as_ref() {
        Model::Idle => state.clone(),
        _ => Arc::new(Model::Idle),
    }
}

/// Starts a search for `query`, returning the next state and the query to
/// send, if one needs to go out.
///
/// Short selections reset to idle. A query with the same input as the
/// current one leaves the state alone.
pub fn query(query: Query, state: &Arc<Model>) -> (Arc<Model>, Option<Query>) {
    if query.input.content.trim().chars().count() < MIN_QUERY_LENGTH {
        return (idle(state), None);
    }

    if state.query().is_some_and(|current| current.input == query.input) {
        return (state.clone(), None);
    }

    ::log::debug!("Similarity query {} issued", query.id);
    let next = Model::Pending {
        query: query.clone(),
    };
    (Arc::new(next), Some(query))
}

/// Applies the answer to query `id`
pub fn complete(
    id: u64,
    response: Result<SimilarResources, String>,
    state: &Arc<Model>,
) -> Arc<Model> {
    let Model::Pending { query } = state.as_ref() else {
        ::log::trace!("Dropping similarity response {}: nothing pending", id);
        return state.clone();
    };

    if query.id != id {
        ::log::debug!(
            "Dropping stale similarity response {} (pending {})",
            id,
            query.id
        );
        return state.clone();
    }

    match response {
        Ok(result) => Arc::new(Model::Ready {
            query: query.clone(),
            result,
        }),
        Err(e) => {
            ::log::warn!("Similarity query {} failed: {}", id, e);
            Arc::new(Model::Idle)
        }
    }
}
