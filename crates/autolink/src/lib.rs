pub mod backlinks;
pub mod blocks;
pub mod builder;
pub mod corpus;
pub mod debounce;
pub mod destination;
pub mod engine;
pub mod error;
pub mod front_matter;
pub mod index;
pub mod linker;
pub mod persist;
pub mod refresh;
pub mod resolver;
pub mod scanner;
pub mod settings;
pub mod status;
pub mod terms;
pub mod vault;

pub use backlinks::{Mention, unlinked_mentions};
pub use blocks::{block_ids, is_editing_block_id};
pub use builder::{BuildOptions, IndexBuilder, RebuildStats, document_destinations};
pub use corpus::{Corpus, CorpusDocument, FilesystemCorpus, InMemoryCorpus};
pub use debounce::Debouncer;
pub use destination::{DestinationKind, LinkDestination, Suggestion};
pub use engine::{LinkEngine, RebuildOutcome};
pub use error::AutolinkError;
pub use index::{DestinationIndex, TermCountRange};
pub use linker::{
    AutoLink, LineSpans, LinkedDocument, auto_link, link_document, link_line, render_wikilink,
    scan_document,
};
pub use persist::write_atomic;
pub use refresh::{AutoRefresh, CorpusEvent, RefreshAction, RefreshPolicy};
pub use resolver::{SuggestionResolver, TieBreak};
pub use scanner::{Span, TextScanner};
pub use settings::Settings;
pub use status::{RebuildObserver, RebuildStatus, TracingObserver};
pub use terms::{Normalizer, count_terms, split_boundaries, words};
pub use vault::{InitReport, VaultPaths, discover as discover_vault, vault_relative_path};
