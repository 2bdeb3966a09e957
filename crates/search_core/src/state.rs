use std::collections::BTreeMap;
use std::fmt;

use crate::view_model::AppViewModel;
use crate::{SearchRequest, SetCreationJob, SetCreationOutcome};

pub type JobId = u64;
pub type RequestId = u64;

/// Content identifier of a blob, e.g. `sha224-…`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BlobRef(String);

impl BlobRef {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BlobRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BlobRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for BlobRef {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    search_text: String,
    checked: Vec<BlobRef>,
    results: Vec<BlobRef>,
    last_search: Option<SearchRequest>,
    search_error: Option<String>,
    latest_request: RequestId,
    next_job_id: JobId,
    jobs: BTreeMap<JobId, SetCreationJob>,
    last_set: Option<SetCreationOutcome>,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            search_text: String::new(),
            checked: Vec::new(),
            results: Vec::new(),
            last_search: None,
            search_error: None,
            latest_request: 0,
            next_job_id: 1,
            jobs: BTreeMap::new(),
            last_set: None,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            title: "Search",
            search_text: self.search_text.clone(),
            checked_count: self.checked.len(),
            results: self.results.clone(),
            last_search: self.last_search.clone(),
            search_error: self.search_error.clone(),
            pending_sets: self.jobs.len(),
            last_set: self.last_set.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    pub fn checked(&self) -> &[BlobRef] {
        &self.checked
    }

    pub fn job(&self, job_id: JobId) -> Option<&SetCreationJob> {
        self.jobs.get(&job_id)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn set_search_text(&mut self, text: String) {
        if self.search_text != text {
            self.search_text = text;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_checked(&mut self, checked: Vec<BlobRef>) {
        if self.checked != checked {
            self.checked = checked;
            self.mark_dirty();
        }
    }

    pub(crate) fn clear_checked(&mut self) {
        self.set_checked(Vec::new());
    }

    /// Issues the id of a new search; responses to older ids become stale.
    pub(crate) fn begin_search(&mut self, request: Option<SearchRequest>) -> RequestId {
        self.latest_request += 1;
        self.last_search = request;
        self.mark_dirty();
        self.latest_request
    }

    pub(crate) fn is_latest_request(&self, request_id: RequestId) -> bool {
        request_id == self.latest_request
    }

    pub(crate) fn apply_results(&mut self, results: Vec<BlobRef>) {
        self.results = results;
        self.search_error = None;
        self.mark_dirty();
    }

    pub(crate) fn apply_search_error(&mut self, error: String) {
        self.search_error = Some(error);
        self.mark_dirty();
    }

    pub(crate) fn start_job(&mut self) -> JobId {
        let job_id = self.next_job_id;
        self.next_job_id += 1;
        self.jobs
            .insert(job_id, SetCreationJob::new(self.checked.clone()));
        self.mark_dirty();
        job_id
    }

    pub(crate) fn job_mut(&mut self, job_id: JobId) -> Option<&mut SetCreationJob> {
        self.jobs.get_mut(&job_id)
    }

    pub(crate) fn finish_job(&mut self, job_id: JobId, outcome: SetCreationOutcome) {
        self.jobs.remove(&job_id);
        self.last_set = Some(outcome);
        self.mark_dirty();
    }
}
