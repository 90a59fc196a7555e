//! Scoring Engine contract
//!
//! Both engines sit behind `ScoringEngine`; `build_engine` is the single
//! configuration-driven selection point.

use std::thread;

use super::classifier::TieredEngine;
use super::legacy::LegacyHeuristicEngine;
use super::types::{EngineVariant, RuleInfo, Sensitivity, Verdict};
use crate::logic::evidence::EvidenceRecord;
use crate::logic::trust::TrustStore;

/// Below this many records a batch is classified on the calling thread
const PARALLEL_MIN_BATCH: usize = 32;

/// Stateless classifier. Implementations must be pure: no state survives a call.
pub trait ScoringEngine: Send + Sync {
    fn classify(&self, evidence: &EvidenceRecord, trust: &TrustStore) -> Verdict;
    fn variant(&self) -> EngineVariant;
    fn rules(&self) -> Vec<RuleInfo>;
}

pub fn build_engine(variant: EngineVariant, sensitivity: Sensitivity) -> Box<dyn ScoringEngine> {
    match variant {
        EngineVariant::Tiered => Box::new(TieredEngine),
        EngineVariant::Legacy => Box::new(LegacyHeuristicEngine::new(sensitivity)),
    }
}

/// Classify a batch, in parallel for large inputs. Output order matches input order.
pub fn classify_batch(
    engine: &dyn ScoringEngine,
    records: &[EvidenceRecord],
    trust: &TrustStore,
) -> Vec<Verdict> {
    if records.len() < PARALLEL_MIN_BATCH {
        return records.iter().map(|r| engine.classify(r, trust)).collect();
    }

    let workers = thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
        .min(records.len());
    let chunk_size = records.len().div_ceil(workers);

    thread::scope(|scope| {
        let handles: Vec<_> = records
            .chunks(chunk_size)
            .map(|chunk| {
                scope.spawn(move || {
                    chunk.iter().map(|r| engine.classify(r, trust)).collect::<Vec<_>>()
                })
            })
            .collect();

        handles
            .into_iter()
            .flat_map(|h| match h.join() {
                Ok(verdicts) => verdicts,
                Err(panic) => std::panic::resume_unwind(panic),
            })
            .collect()
    })
}
