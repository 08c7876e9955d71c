use crate::{config::ScoreKind, labels};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub class: String,
    pub confidence: f32,
    pub symptoms: String,
    pub treatment: String,
}

#[derive(Error, Debug, PartialEq)]
pub enum ReductionError {
    #[error("Model returned an empty score vector")]
    EmptyScores,
    #[error("Model returned a non-finite score: {0}")]
    NonFinite(f32),
    #[error("Class index {0} is outside the label set")]
    UnknownClass(usize),
    #[error("Confidence {confidence:.3} for {class} is below {threshold}")]
    LowConfidence {
        class: &'static str,
        confidence: f32,
        threshold: f32,
    },
}

/// Whether a top class under the threshold is turned away instead of
/// reported.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidencePolicy {
    pub min_confidence: Option<f32>,
}

impl ConfidencePolicy {
    pub fn reject_below(threshold: f32) -> Self {
        Self {
            min_confidence: Some(threshold),
        }
    }

    pub fn accept_all() -> Self {
        Self {
            min_confidence: None,
        }
    }

    fn accepts(&self, confidence: f32) -> bool {
        self.min_confidence
            .map_or(true, |threshold| confidence >= threshold)
    }
}

fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|v| (v - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|v| v / sum).collect()
}

/// Index and value of the highest score. Confidence is clamped into [0, 1].
pub fn reduce_scores(scores: &[f32], kind: ScoreKind) -> Result<(usize, f32), ReductionError> {
    let probabilities = match kind {
        ScoreKind::Probabilities => scores.to_vec(),
        ScoreKind::Logits => softmax(scores),
    };

    let (index, confidence) = probabilities
        .iter()
        .copied()
        .enumerate()
        .reduce(|accum, row| if row.1 > accum.1 { row } else { accum })
        .ok_or(ReductionError::EmptyScores)?;

    if !confidence.is_finite() {
        return Err(ReductionError::NonFinite(confidence));
    }

    Ok((index, confidence.clamp(0.0, 1.0)))
}

pub fn build_prediction(
    scores: &[f32],
    kind: ScoreKind,
    policy: ConfidencePolicy,
) -> Result<Prediction, ReductionError> {
    let (index, confidence) = reduce_scores(scores, kind)?;
    let class = labels::label_at(index).ok_or(ReductionError::UnknownClass(index))?;

    if !policy.accepts(confidence) {
        return Err(ReductionError::LowConfidence {
            class,
            confidence,
            threshold: policy.min_confidence.unwrap_or_default(),
        });
    }

    let (symptoms, treatment) = labels::details_for(class);

    Ok(Prediction {
        class: class.to_string(),
        confidence,
        symptoms: symptoms.to_string(),
        treatment: treatment.to_string(),
    })
}
