//! Trust Module
//!
//! Whitelist and indicator reference data consulted by every classifier.
//!
//! ## Structure
//! - `defaults`: Built-in lists
//! - `types`: On-disk policy format
//! - `store`: Normalized, immutable lookup structure
//!
//! ## Usage
//! ```ignore
//! use crate::logic::trust::{load_trust_store, TrustStore};
//!
//! let store = TrustStore::builtin()?;
//! assert!(store.is_trusted_publisher("Logitech"));
//! ```

pub mod defaults;
pub mod types;
pub mod store;

pub use types::{TrustPolicy, TrustSummary};

pub use store::{
    load_trust_store,
    normalize_name,
    normalize_path,
    normalize_publisher,
    path_has_prefix,
    TrustStore,
};
