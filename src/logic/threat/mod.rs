//! Threat Module
//!
//! Turns evidence records into verdicts. This is the core step: the place
//! where a hooked process becomes CLEAN/LOW/MEDIUM/HIGH.
//!
//! ## Structure
//! - `types`: Core types (RiskTier, Indicator, Verdict, engine selection)
//! - `rules`: Weights and threshold tables
//! - `whitelist`: Tier 1 short-circuit shared by both engines
//! - `classifier`: Tiered engine
//! - `legacy`: Weighted heuristic engine
//! - `engine`: `ScoringEngine` contract, selection and batch classification
//!
//! ## Usage
//! ```ignore
//! use crate::logic::threat::{classify, RiskTier};
//!
//! let verdict = classify(&record, &trust_store);
//! match verdict.risk_tier {
//!     RiskTier::High => println!("Detected"),
//!     _ => println!("Informational"),
//! }
//! ```

pub mod types;
pub mod rules;
pub mod whitelist;
pub mod classifier;
pub mod legacy;
pub mod engine;

#[cfg(test)]
mod tests;

// Re-export main types for convenience
pub use types::{
    EngineVariant,
    Indicator,
    RiskTier,
    RuleInfo,
    Sensitivity,
    Verdict,
};

pub use rules::{legacy_tier_for_score, tier_for_score, HIGH_THRESHOLD};

pub use classifier::{classify, evaluate_indicators, TieredEngine};
pub use legacy::LegacyHeuristicEngine;
pub use engine::{build_engine, classify_batch, ScoringEngine};
