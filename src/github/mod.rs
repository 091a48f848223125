//! GitHub repository discovery
//!
//! Pages through the GraphQL search API with an opaque cursor, retrying each
//! page with exponential backoff, and writes the matches to a flat table.
//!
//! # Example
//!
//! ```no_run
//! use ck_harvest::github::{Discovery, DiscoveryRequest, RetryPolicy, UreqTransport};
//! use std::time::Duration;
//!
//! let transport = UreqTransport::new("https://api.github.com/graphql", "ghp_...", Duration::from_secs(60));
//! let discovery = Discovery::with_default_query(transport, RetryPolicy::default());
//! let request = DiscoveryRequest { search: "language:java".into(), page_size: 25, max_repos: 100 };
//! let records = discovery.collect(&request, |n| println!("{} so far", n)).unwrap();
//! ```

mod discovery;
mod query;
mod retry;
mod transport;

pub use discovery::{discover_to_csv, load_query, Discovery, DiscoveryError, DiscoveryRequest};
pub use query::DEFAULT_QUERY;
pub use retry::{Exhausted, RetryPolicy};
pub use transport::{GraphqlTransport, TransportError, UreqTransport};
