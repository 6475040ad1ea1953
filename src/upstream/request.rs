//! Dependency identity and per-call requests.

use std::sync::Arc;

use url::Url;

/// An external service the core calls but does not control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    /// Name used in server error messages (e.g. "MoviesInfoService").
    pub name: String,
    /// Resource noun used in not-found messages (e.g. "movieInfo").
    pub resource: String,
    /// Collection URL; ids and the stream path are appended as segments.
    pub base_url: Url,
}

impl Dependency {
    pub fn new(name: &str, resource: &str, base_url: &str) -> Result<Self, url::ParseError> {
        Ok(Self {
            name: name.to_string(),
            resource: resource.to_string(),
            base_url: Url::parse(base_url)?,
        })
    }
}

/// Logical operation against a dependency.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// `GET <base>/<id>`
    FetchById(String),
    /// `GET <base>?<field>=<value>`
    FetchByQuery { field: String, value: String },
    /// `GET <base>/stream`
    FetchStream,
}

/// One outbound call. Built per call and never mutated.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    pub dependency: Arc<Dependency>,
    pub operation: Operation,
}

impl UpstreamRequest {
    pub fn new(dependency: Arc<Dependency>, operation: Operation) -> Self {
        Self { dependency, operation }
    }

    /// Target URL of this call.
    pub fn url(&self) -> Url {
        let mut url = self.dependency.base_url.clone();
        match &self.operation {
            Operation::FetchById(id) => push_segment(&mut url, id),
            Operation::FetchByQuery { field, value } => {
                url.query_pairs_mut().append_pair(field, value);
            }
            Operation::FetchStream => push_segment(&mut url, "stream"),
        }
        url
    }
}

fn push_segment(url: &mut Url, segment: &str) {
    if let Ok(mut segments) = url.path_segments_mut() {
        segments.pop_if_empty().push(segment);
    }
}
