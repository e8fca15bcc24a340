//! # Causeway Collect
//!
//! The knowledge-collection boundary of the pipeline. Its only contract
//! obligation is: return zero or more text snippets per search term. The
//! pipeline treats every channel of the resulting [`EvidenceBundle`] as
//! possibly empty, so a failed or offline source degrades silently.
//!
//! - [`KnowledgeSource`]: the trait the pipeline consumes.
//! - [`WikipediaSource`]: a rate-limited, cached REST summary client.
//! - [`StaticSource`]: fixed snippets for offline runs and tests.

pub mod source;
pub mod wikipedia;

pub use source::{CollectError, KnowledgeSource, StaticSource};
pub use wikipedia::{WikipediaConfig, WikipediaSource};
