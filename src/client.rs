//! GraphQL client for the knowledge server.

use crate::error::ClientError;
use crate::protocol::{Ingest, InputResource, InputSimilar, OpenResult, Resource, SimilarResources};
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8080/graphql";

const USER_AGENT: &str = concat!("unfurl/", env!("CARGO_PKG_VERSION"));

const RESOURCE_INFO_FIELDS: &str = r#"
fragment ResourceInfoFields on Resource {
  url
  info { title description cid icon image }
}
"#;

const LINK_FIELDS: &str = r#"
fragment LinkFields on Link {
  kind
  name
  title
  identifier
  fragment
  location
}
"#;

const RESOURCE_FIELDS: &str = r#"
fragment ResourceFields on Resource {
  ...ResourceInfoFields
  tags { name targetFragment targetLocation }
  links {
    ...LinkFields
    target { ...ResourceInfoFields }
  }
  backLinks {
    ...LinkFields
    referrer { ...ResourceInfoFields }
  }
}
"#;

/// Fragment definitions by name. A fragment only spreads fragments listed
/// after it, so one pass in this order collects everything a document uses.
const FRAGMENTS: &[(&str, &str)] = &[
    ("ResourceFields", RESOURCE_FIELDS),
    ("LinkFields", LINK_FIELDS),
    ("ResourceInfoFields", RESOURCE_INFO_FIELDS),
];

const LOOKUP_QUERY: &str = r#"
query Lookup($url: String!) {
  lookup(url: $url) { ...ResourceFields }
}
"#;

const INGEST_MUTATION: &str = r#"
mutation Ingest($resource: InputResource!) {
  ingest(resource: $resource) {
    backLinks {
      ...LinkFields
      referrer { ...ResourceInfoFields }
    }
    sibLinks {
      ...LinkFields
      referrer { ...ResourceInfoFields }
      target { ...ResourceFields }
    }
  }
}
"#;

const SIMILAR_QUERY: &str = r#"
query Similar($input: InputSimilar!) {
  similar(input: $input) {
    keywords
    similar {
      score
      resource { ...ResourceInfoFields }
    }
  }
}
"#;

const OPEN_MUTATION: &str = r#"
mutation Open($url: String!) {
  open(url: $url) { openOk exitOk code }
}
"#;

/// The operation followed by the definitions of the fragments it spreads,
/// directly or through other fragments. Servers reject unused fragments.
fn document(operation: &str) -> String {
    let mut document = operation.to_string();
    for (name, definition) in FRAGMENTS {
        if document.contains(&format!("...{}", name)) {
            document.push_str(definition);
        }
    }
    document
}

#[derive(Debug, Deserialize)]
struct GraphQLResponse {
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQLError>,
}

#[derive(Debug, Deserialize)]
struct GraphQLError {
    message: String,
}

/// Client for the knowledge server
#[derive(Debug, Clone)]
pub struct KnowledgeClient {
    http: Client,
    endpoint: Url,
}

impl KnowledgeClient {
    /// Create a client for the GraphQL endpoint at `endpoint`
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self, ClientError> {
        let endpoint = Url::parse(endpoint)?;
        let http = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Everything the server knows about the resource at `url`
    pub async fn lookup(&self, url: &str) -> Result<Resource, ClientError> {
        self.execute(LOOKUP_QUERY, json!({ "url": url }), "lookup")
            .await
    }

    /// Stores a scanned page and returns its backlinks and siblinks
    pub async fn ingest(&self, resource: &InputResource) -> Result<Ingest, ClientError> {
        ::log::info!(
            "Ingesting {} with {} link(s)",
            resource.url,
            resource.links.as_ref().map_or(0, Vec::len)
        );
        self.execute(INGEST_MUTATION, json!({ "resource": resource }), "ingest")
            .await
    }

    /// Resources whose content is similar to `input`
    pub async fn similar(&self, input: &InputSimilar) -> Result<SimilarResources, ClientError> {
        self.execute(SIMILAR_QUERY, json!({ "input": input }), "similar")
            .await
    }

    /// Asks the server to open `url` in the local editor
    pub async fn open(&self, url: &str) -> Result<OpenResult, ClientError> {
        self.execute(OPEN_MUTATION, json!({ "url": url }), "open")
            .await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &str,
        variables: Value,
        field: &'static str,
    ) -> Result<T, ClientError> {
        let query = document(operation);

        ::log::debug!("POST {} ({})", self.endpoint, field);
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            ::log::error!("Knowledge server answered {} to {}", status, field);
            return Err(ClientError::Status(status.as_u16()));
        }

        let body: GraphQLResponse = response.json().await?;
        if !body.errors.is_empty() {
            let messages: Vec<String> = body.errors.into_iter().map(|e| e.message).collect();
            ::log::warn!("GraphQL errors from {}: {:?}", field, messages);
            return Err(ClientError::GraphQL(messages));
        }

        let data = body
            .data
            .and_then(|mut data| data.get_mut(field).map(Value::take))
            .filter(|value| !value.is_null())
            .ok_or(ClientError::MissingData(field))?;

        Ok(serde_json::from_value(data)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    fn names(document: &str, pattern: &str) -> Vec<String> {
        let mut names: Vec<String> = Regex::new(pattern)
            .unwrap()
            .captures_iter(document)
            .map(|c| c[1].to_string())
            .collect();
        names.sort();
        names.dedup();
        names
    }

    #[test]
    fn test_documents_define_exactly_the_spread_fragments() {
        for operation in [LOOKUP_QUERY, INGEST_MUTATION, SIMILAR_QUERY, OPEN_MUTATION] {
            let sent = document(operation);
            let defined = names(&sent, r"fragment (\w+) on");
            let spread = names(&sent, r"\.\.\.(\w+)");
            assert_eq!(defined, spread, "in document:\n{}", sent);
        }
    }

    #[test]
    fn test_similar_document_only_carries_info_fragment() {
        let sent = document(SIMILAR_QUERY);
        assert!(sent.contains("fragment ResourceInfoFields on Resource"));
        assert!(!sent.contains("fragment ResourceFields"));
        assert!(!sent.contains("fragment LinkFields"));

        assert_eq!(document(OPEN_MUTATION), OPEN_MUTATION);
    }

    #[test]
    fn test_invalid_endpoint() {
        let result = KnowledgeClient::new("not an endpoint", Duration::from_secs(1));
        assert!(matches!(result, Err(ClientError::InvalidEndpoint(_))));
    }
}
