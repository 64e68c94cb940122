//! Timebook GraphQL API: transport, typed client and wire types

mod client;
mod transport;
mod types;

pub use client::{GraphqlTrackingClient, TrackingApi};
pub use transport::{GraphqlRequest, GraphqlTransport, ReqwestGraphqlTransport};
pub use types::{CurrentTracking, Project, RemoteError, StoppedTracking, Task};
