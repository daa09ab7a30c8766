//! End-to-end orchestration of one scoring invocation.

use std::sync::Arc;

use tracing::{debug, info};

use crate::align::{Aligner, DurationPriors, ProportionalAligner};
use crate::audio::preprocess::AudioPreprocessor;
use crate::audio::RawAudio;
use crate::config::PipelineConfig;
use crate::error::{Result, ScoreError};
use crate::features::FeatureExtractor;
use crate::phoneme::Phoneme;
use crate::reference::ReferenceStore;
use crate::score::{ScoreResult, SimilarityScorer};

/// Runs preprocess → align → extract → score for one utterance against one
/// target phoneme sequence.
///
/// Synchronous, single-invocation, CPU-bound; any stage failure
/// short-circuits and no partial result is emitted. Independent invocations
/// may run on separate threads; the only shared resource is the reference
/// store, which each invocation binds to via one immutable snapshot.
pub struct ScoringPipeline {
    config: PipelineConfig,
    preprocessor: AudioPreprocessor,
    aligner: Box<dyn Aligner + Send + Sync>,
    extractor: FeatureExtractor,
    scorer: SimilarityScorer,
    store: Arc<ReferenceStore>,
}

impl ScoringPipeline {
    /// Pipeline over the bundled reference table.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_store(config, Arc::new(ReferenceStore::builtin()))
    }

    pub fn with_store(config: PipelineConfig, store: Arc<ReferenceStore>) -> Result<Self> {
        config.validate()?;
        let preprocessor = AudioPreprocessor::new(config.clone());
        let aligner = Box::new(ProportionalAligner::new(config.min_segment_samples()));
        let extractor = FeatureExtractor::new(config.sample_rate, config.analysis);
        let scorer = SimilarityScorer::new(
            config.thresholds,
            config.silence_floor,
            config.difficulty_weights.clone(),
        );
        Ok(Self {
            config,
            preprocessor,
            aligner,
            extractor,
            scorer,
            store,
        })
    }

    /// Swaps the alignment policy, e.g. for a future forced aligner.
    pub fn with_aligner(mut self, aligner: Box<dyn Aligner + Send + Sync>) -> Self {
        self.aligner = aligner;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<ReferenceStore> {
        &self.store
    }

    /// Scores one recorded attempt at the target phoneme sequence.
    pub fn score_utterance(
        &self,
        raw: &RawAudio,
        phonemes: &[Phoneme],
        priors: Option<&DurationPriors>,
    ) -> Result<ScoreResult> {
        // One snapshot for the whole run; concurrent reloads cannot be
        // observed mid-invocation.
        let snapshot = self.store.snapshot();
        if snapshot.dim() != self.config.analysis.mfcc_count {
            return Err(ScoreError::invalid_config(format!(
                "reference vectors are {}-dimensional but the extractor produces {}",
                snapshot.dim(),
                self.config.analysis.mfcc_count
            )));
        }

        let signal = self.preprocessor.preprocess(raw)?;
        debug!(
            voiced_ms = signal.duration_ms(),
            phonemes = phonemes.len(),
            "signal ready for alignment"
        );

        let segments = self.aligner.align(&signal, phonemes, priors)?;
        let vectors = self.extractor.extract_all(&signal, &segments)?;
        let result = self
            .scorer
            .score(&segments, &vectors, &snapshot, signal.sample_rate())?;

        info!(
            aggregate = result.aggregate_score,
            fluency = result.fluency_score,
            weak = result.weak_phonemes.len(),
            "utterance scored"
        );
        Ok(result)
    }
}
