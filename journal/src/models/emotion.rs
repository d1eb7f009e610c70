use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

/// One (label, confidence) pair produced by the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EmotionScore {
    /// Label from the model's vocabulary, verbatim.
    pub label: String,
    /// Confidence in `[0, 1]`.
    pub score: f32,
}

impl EmotionScore {
    pub fn new(label: impl Into<String>, score: f32) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Result of analyzing one entry; also the `/analyze_emotion` response body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct EmotionAnalysis {
    /// Every label the classifier scored, highest first.
    pub emotions: Vec<EmotionScore>,
    /// Label of `emotions[0]`, as the classifier spelled it.
    pub top_emotion: String,
    pub activities: Vec<String>,
    pub prompts: Vec<String>,
}

/// Emotions the recommendation tables know about.
///
/// The classifier may emit labels outside this set; those have no entry
/// and fall back to the generic recommendations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emotion {
    Joy,
    Sadness,
    Anger,
    Fear,
    Love,
    Surprise,
}

impl Emotion {
    pub const ALL: [Emotion; 6] = [
        Emotion::Joy,
        Emotion::Sadness,
        Emotion::Anger,
        Emotion::Fear,
        Emotion::Love,
        Emotion::Surprise,
    ];

    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|emotion| emotion.as_str().eq_ignore_ascii_case(label))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Emotion::Joy => "joy",
            Emotion::Sadness => "sadness",
            Emotion::Anger => "anger",
            Emotion::Fear => "fear",
            Emotion::Love => "love",
            Emotion::Surprise => "surprise",
        }
    }
}

impl fmt::Display for Emotion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Descending by score; equal scores ordered by label ascending.
pub fn compare_scores(a: &EmotionScore, b: &EmotionScore) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.label.cmp(&b.label))
}

/// Sort scores in place so the top emotion comes first.
pub fn rank_emotions(scores: &mut [EmotionScore]) {
    scores.sort_by(compare_scores);
}
