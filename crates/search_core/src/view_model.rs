use crate::{BlobRef, SearchRequest, SetCreationOutcome};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub title: &'static str,
    pub search_text: String,
    pub checked_count: usize,
    pub results: Vec<BlobRef>,
    pub last_search: Option<SearchRequest>,
    pub search_error: Option<String>,
    pub pending_sets: usize,
    pub last_set: Option<SetCreationOutcome>,
    pub dirty: bool,
}
