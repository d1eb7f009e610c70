use rand::Rng;
use validator::Validate;

use crate::classifier::ClassifierProvider;
use crate::error::Result;
use crate::models::{rank_emotions, EmotionAnalysis, EmotionScore, JournalEntry};
use crate::recommendations;

use super::validation_error;

/// Classify an entry and attach recommendations for its top emotion.
#[derive(Clone)]
pub struct AnalysisService {
    classifier: ClassifierProvider,
}

impl AnalysisService {
    pub fn new(classifier: ClassifierProvider) -> Self {
        Self { classifier }
    }

    pub async fn analyze(&self, entry: &JournalEntry) -> Result<EmotionAnalysis> {
        entry.validate().map_err(validation_error)?;

        let scores = self.classifier.classify(&entry.text).await?;
        let analysis = build_analysis(scores, &mut rand::rng());

        tracing::info!(
            top_emotion = %analysis.top_emotion,
            labels = analysis.emotions.len(),
            "Analyzed journal entry"
        );

        Ok(analysis)
    }
}

/// Rank `scores` and sample recommendations for the winner.
///
/// `scores` must be non-empty; the classifier guarantees this.
pub fn build_analysis<R: Rng + ?Sized>(mut scores: Vec<EmotionScore>, rng: &mut R) -> EmotionAnalysis {
    rank_emotions(&mut scores);
    let top_emotion = scores
        .first()
        .map(|s| s.label.clone())
        .unwrap_or_default();
    let recs = recommendations::recommend(&top_emotion, rng);

    EmotionAnalysis {
        emotions: scores,
        top_emotion,
        activities: recs.activities,
        prompts: recs.prompts,
    }
}
