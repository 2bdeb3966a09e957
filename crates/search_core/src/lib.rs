//! Search page core: pure state machine, query translation and the
//! set-creation join.
mod collection;
mod effect;
mod msg;
mod query;
mod state;
mod update;
mod view_model;

pub use collection::{
    AttributeClaim, ClaimResult, SetCreationJob, SetCreationOutcome, MEMBER_ATTRIBUTE,
    NEW_SET_TITLE, TITLE_ATTRIBUTE,
};
pub use effect::Effect;
pub use msg::{GridEvent, Msg, ToolbarEvent};
pub use query::{translate_query, SearchAttribute, SearchRequest, MAX_IN_RESPONSE};
pub use state::{AppState, BlobRef, JobId, RequestId};
pub use update::{update, HOME_LOCATION};
pub use view_model::AppViewModel;
