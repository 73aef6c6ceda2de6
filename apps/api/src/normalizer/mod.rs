//! Response Normalizer — coerces free-form model output into the answer shape:
//!
//! ```text
//! Risco: <frase>
//! • <dica 1>
//! • <dica 2>
//! Plano B: <frase>
//! ```
//!
//! Best effort. The pipeline never fails; an uncooperative model can still
//! produce output without a risk line or with zero tips.
//!
//! Order matters: later stages assume the earlier cleanup (canonical bullets,
//! rewritten vocabulary) has already happened.

pub mod rules;
pub mod stages;

use tracing::trace;

use crate::chat::context::Place;
use crate::normalizer::rules::{NormalizerRules, BULLET};
use crate::normalizer::stages::{
    CollapseDuplicateTips, EnforceTipCount, EnsureFallbackPlan, InsertPlace, LineStage,
    NormalizeLines, RewriteVocabulary, StripReasoning,
};

/// Non-empty, trimmed lines of a completion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lines(Vec<String>);

impl Lines {
    pub fn from_text(text: &str) -> Self {
        Self(
            text.replace('\r', "")
                .split('\n')
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn join(&self) -> String {
        self.0.join("\n").trim().to_string()
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    /// Positions of the lines that start with the canonical bullet.
    pub fn tip_indices(&self) -> Vec<usize> {
        self.0
            .iter()
            .enumerate()
            .filter(|(_, line)| line.starts_with(BULLET))
            .map(|(i, _)| i)
            .collect()
    }
}

/// The ordered normalization pipeline. Built once at startup and shared.
pub struct ResponseNormalizer {
    reasoning: StripReasoning,
    stages: Vec<Box<dyn LineStage>>,
}

impl ResponseNormalizer {
    pub fn new(rules: NormalizerRules) -> Self {
        let stages: Vec<Box<dyn LineStage>> = vec![
            Box::new(NormalizeLines::new()),
            Box::new(RewriteVocabulary::new()),
            Box::new(EnforceTipCount::new(rules.second_tip.clone())),
            Box::new(EnsureFallbackPlan::new(rules.fallback_plan.clone())),
            Box::new(InsertPlace),
            Box::new(CollapseDuplicateTips::new(
                rules.tip_families.clone(),
                rules.duplicate_replacement.clone(),
            )),
        ];
        Self {
            reasoning: StripReasoning::new(),
            stages,
        }
    }

    /// Normalizes an answer about `place`, the place the request's context named.
    pub fn normalize_at(&self, raw: &str, place: &Place) -> String {
        let visible = self.reasoning.apply(raw);
        let mut lines = Lines::from_text(&visible);
        for stage in &self.stages {
            stage.apply(&mut lines, place);
            trace!("normalizer stage {}: {} lines", stage.name(), lines.0.len());
        }
        lines.join()
    }
}

impl Default for ResponseNormalizer {
    fn default() -> Self {
        Self::new(NormalizerRules::default())
    }
}
