//! Search page engine: server connection and effect execution.
mod connection;
mod discovery;
mod engine;
mod schema;
mod sets;
mod types;

pub use connection::{AttrQuery, Clock, ConnectionSettings, HttpConnection, ServerConnection};
pub use discovery::{fetch_discovery, DiscoveryDocument, SigningConfig};
pub use engine::{EngineError, EngineHandle};
pub use schema::{claim_blob, permanode_blob, BlobHash};
pub use sets::{add_claims, create_permanode, search, ChannelEventSink, EventSink};
pub use types::{
    ClaimRequest, ConnectionError, EngineEvent, FailureKind, JobId, RequestId,
};
