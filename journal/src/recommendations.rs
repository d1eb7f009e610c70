//! Coping activities and writing prompts keyed by emotion.
//!
//! Both tables are compiled in. Lookups for labels outside [`Emotion`]
//! fall back to [`DEFAULT_ACTIVITIES`] and [`DEFAULT_PROMPTS`].

use rand::seq::IndexedRandom;
use rand::Rng;
use serde::Serialize;

use crate::models::Emotion;

pub const DEFAULT_ACTIVITIES: &[&str] = &["Take a deep breath", "Practice mindfulness"];
pub const DEFAULT_PROMPTS: &[&str] = &["How are you feeling right now?"];

/// How many activities a response carries at most.
pub const ACTIVITY_SAMPLE_SIZE: usize = 2;
/// How many prompts a response carries at most.
pub const PROMPT_SAMPLE_SIZE: usize = 1;

pub fn activities_for(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Joy => &[
            "Share your happiness with a friend",
            "Try a new hobby that excites you",
        ],
        Emotion::Sadness => &[
            "Take a gentle walk in nature",
            "Practice self-compassion meditation",
        ],
        Emotion::Anger => &[
            "Try box breathing (4-4-4-4 count)",
            "Write a letter expressing your feelings (without sending it)",
        ],
        Emotion::Fear => &[
            "Progressive muscle relaxation",
            "Make a list of what you can control",
        ],
        Emotion::Love => &[
            "Reach out to someone you care about",
            "Practice acts of kindness",
        ],
        Emotion::Surprise => &[
            "Journal about what you learned from this experience",
            "Explore the new perspective this gives you",
        ],
    }
}

pub fn prompts_for(emotion: Emotion) -> &'static [&'static str] {
    match emotion {
        Emotion::Joy => &[
            "What made you happy today and why?",
            "Describe a moment that brought you joy recently.",
        ],
        Emotion::Sadness => &[
            "Write about something you're finding difficult right now.",
            "What would help you feel better today?",
        ],
        Emotion::Anger => &[
            "What triggered your frustration today?",
            "How could you respond differently next time?",
        ],
        Emotion::Fear => &[
            "What's causing you anxiety right now?",
            "Write about a time you overcame a similar challenge.",
        ],
        Emotion::Love => &[
            "Who are you grateful for today and why?",
            "Describe a meaningful connection in your life.",
        ],
        Emotion::Surprise => &[
            "What unexpected event impacted you recently?",
            "How did this surprise change your perspective?",
        ],
    }
}

/// Activity table for a raw classifier label, or the default list.
pub fn activities_for_label(label: &str) -> &'static [&'static str] {
    Emotion::from_label(label).map_or(DEFAULT_ACTIVITIES, activities_for)
}

/// Prompt table for a raw classifier label, or the default list.
pub fn prompts_for_label(label: &str) -> &'static [&'static str] {
    Emotion::from_label(label).map_or(DEFAULT_PROMPTS, prompts_for)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Recommendations {
    pub activities: Vec<String>,
    pub prompts: Vec<String>,
}

/// Sample activities and prompts for `label` without replacement.
pub fn recommend<R: Rng + ?Sized>(label: &str, rng: &mut R) -> Recommendations {
    Recommendations {
        activities: sample(activities_for_label(label), ACTIVITY_SAMPLE_SIZE, rng),
        prompts: sample(prompts_for_label(label), PROMPT_SAMPLE_SIZE, rng),
    }
}

fn sample<R: Rng + ?Sized>(items: &[&str], amount: usize, rng: &mut R) -> Vec<String> {
    items
        .choose_multiple(rng, amount.min(items.len()))
        .map(|item| (*item).to_string())
        .collect()
}
