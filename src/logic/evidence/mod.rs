//! Evidence Module
//!
//! Collects per-process facts from external collaborators and normalizes
//! them into `EvidenceRecord`s for the scoring engine.
//!
//! ## Structure
//! - `types`: Evidence record, tri-states, hook entries
//! - `sources`: Collaborator traits
//! - `collector`: One collection pass
//! - `mock`, `hooks_file`, `process`, `signature`: Collaborator adapters

pub mod types;
pub mod sources;
pub mod collector;
pub mod mock;
pub mod hooks_file;
pub mod process;
pub mod signature;

pub use types::{
    CollectorIssue,
    EvidenceRecord,
    HookEntry,
    HookSnapshot,
    HookType,
    ProcessDetails,
    Publisher,
    SignatureInfo,
    SignatureState,
};

pub use sources::{EvidenceSources, HookSource, ProcessSource, SignatureSource};
pub use collector::{collect, CollectionOutcome};
pub use mock::{MockProcess, MockSources};
pub use hooks_file::{JsonHookSource, UnavailableHookSource};
pub use process::SysinfoProcessSource;
pub use signature::AuthenticodeSignatureSource;
