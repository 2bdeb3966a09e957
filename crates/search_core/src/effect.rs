use crate::{AttributeClaim, BlobRef, JobId, RequestId, SearchRequest};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Enable or disable the search text box and submit button.
    SetSearchControlsEnabled(bool),
    /// Run a permanode attribute search as the configured signer.
    ShowWithAttr {
        request_id: RequestId,
        request: SearchRequest,
    },
    /// List root permanodes of the configured signer.
    ShowRoots { request_id: RequestId },
    /// Replace the grid contents.
    PopulateGrid { items: Vec<BlobRef> },
    GridBigger,
    GridSmaller,
    UnselectAll,
    SetCheckedCount(usize),
    OpenHome { location: String },
    CreatePermanode { job_id: JobId },
    AddAttributeClaims {
        job_id: JobId,
        permanode: BlobRef,
        claims: Vec<AttributeClaim>,
    },
}
