use crate::{BlobRef, ClaimResult, JobId, RequestId};

/// Discrete events emitted by the page toolbar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolbarEvent {
    Bigger,
    Smaller,
    Roots,
    Home,
    CreateSetFromChecked,
}

/// Events emitted by the results grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// The set of checked items changed; carries all checked items in grid order.
    ItemsChosen(Vec<BlobRef>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User edited the search text box.
    SearchInputChanged(String),
    /// User submitted the search form.
    SearchSubmitted,
    Toolbar(ToolbarEvent),
    Grid(GridEvent),
    /// Engine answered a search or roots query.
    SearchResults {
        request_id: RequestId,
        result: Result<Vec<BlobRef>, String>,
    },
    /// Engine finished creating the permanode for a set job.
    PermanodeCreated {
        job_id: JobId,
        result: Result<BlobRef, String>,
    },
    /// Engine finished one attribute claim of a set job.
    ClaimSettled {
        job_id: JobId,
        claim_index: usize,
        result: ClaimResult,
    },
}
