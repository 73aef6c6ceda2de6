//! Individual normalizer stages. Each one is independent and order is decided
//! by `ResponseNormalizer::new`.

use regex::Regex;

use crate::chat::context::Place;
use crate::normalizer::rules::{
    has_marker, TipFamily, ALT_BULLET, BULLET, MAX_TIPS, PLAN_MARKER, RISK_MARKER,
};
use crate::normalizer::Lines;

/// A rewrite over the structured list of lines.
///
/// `place` is the place the current request is about; most stages ignore it.
pub trait LineStage: Send + Sync {
    fn name(&self) -> &'static str;
    fn apply(&self, lines: &mut Lines, place: &Place);
}

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("hard-coded normalizer pattern must compile")
}

// ────────────────────────────────────────────────────────────────────────────
// 1. Hidden reasoning (text level, runs before the text is split)
// ────────────────────────────────────────────────────────────────────────────

/// Removes every `<think>…</think>` span, across newlines, any case.
///
/// Blocks are removed innermost first, then unmatched tags are dropped. This
/// repeats until nothing changes, since a removal can splice the surrounding
/// text into a new tag (`<thi<think>x</think>nk>`).
pub struct StripReasoning {
    open: Regex,
    close: Regex,
    stray: Regex,
}

impl StripReasoning {
    pub fn new() -> Self {
        Self {
            open: pattern(r"(?i)<think>"),
            close: pattern(r"(?i)</think>"),
            stray: pattern(r"(?i)</?think>"),
        }
    }

    pub fn apply(&self, text: &str) -> String {
        let mut current = text.to_string();
        loop {
            let mut next = current.clone();
            while let Some((start, end)) = self.innermost_block(&next) {
                next.replace_range(start..end, "");
            }
            let next = self.stray.replace_all(&next, "").into_owned();
            if next == current {
                break;
            }
            current = next;
        }
        current.trim().to_string()
    }

    /// Byte range of the last opening tag together with the first closing tag after it.
    fn innermost_block(&self, text: &str) -> Option<(usize, usize)> {
        self.open
            .find_iter(text)
            .filter_map(|open| {
                self.close
                    .find_at(text, open.end())
                    .map(|close| (open.start(), close.end()))
            })
            .last()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 2. Line normalization
// ────────────────────────────────────────────────────────────────────────────

/// `- tip` becomes `• tip`; on the risk line `no amanhã` becomes `amanhã`.
pub struct NormalizeLines {
    in_tomorrow: Regex,
}

impl NormalizeLines {
    pub fn new() -> Self {
        Self {
            in_tomorrow: pattern(r"(?i)\bno\s+amanh[ãa]o?\b"),
        }
    }
}

impl LineStage for NormalizeLines {
    fn name(&self) -> &'static str {
        "normalize_lines"
    }

    fn apply(&self, lines: &mut Lines, _place: &Place) {
        for line in lines.0.iter_mut() {
            if let Some(rest) = line.strip_prefix(ALT_BULLET) {
                *line = format!("{BULLET}{}", rest.trim());
            }
            if has_marker(line, RISK_MARKER) {
                *line = self.in_tomorrow.replace_all(line, "amanhã").into_owned();
            }
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 3. Vocabulary
// ────────────────────────────────────────────────────────────────────────────

/// Forecast phrasing, exact clock times and the vague "colete".
pub struct RewriteVocabulary {
    substitutions: Vec<(Regex, &'static str)>,
}

impl RewriteVocabulary {
    pub fn new() -> Self {
        Self {
            substitutions: vec![
                (pattern(r"(?i)\bprevist[oa]\b"), "Chance de"),
                (pattern(r"(?i)\bap[oó]s\s+as\s+\d{1,2}h\b"), "à tarde"),
                (
                    pattern(r"(?i)\bentre\s+\d{1,2}h\s+e\s+\d{1,2}h\b"),
                    "no período da tarde",
                ),
                (pattern(r"(?i)\bcolete\b"), "local interno"),
            ],
        }
    }

    pub fn rewrite(&self, line: &str) -> String {
        self.substitutions
            .iter()
            .fold(line.to_string(), |acc, (re, replacement)| {
                re.replace_all(&acc, *replacement).into_owned()
            })
    }
}

impl LineStage for RewriteVocabulary {
    fn name(&self) -> &'static str {
        "rewrite_vocabulary"
    }

    fn apply(&self, lines: &mut Lines, _place: &Place) {
        for line in lines.0.iter_mut() {
            *line = self.rewrite(line);
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 4. Tip count
// ────────────────────────────────────────────────────────────────────────────

/// More than two tips: keep the first two. Exactly one: add the default second tip.
/// Zero tips are left alone.
pub struct EnforceTipCount {
    second_tip: String,
}

impl EnforceTipCount {
    pub fn new(second_tip: impl Into<String>) -> Self {
        Self {
            second_tip: second_tip.into(),
        }
    }
}

impl LineStage for EnforceTipCount {
    fn name(&self) -> &'static str {
        "enforce_tip_count"
    }

    fn apply(&self, lines: &mut Lines, _place: &Place) {
        let tips = lines.tip_indices();
        match tips.len() {
            n if n > MAX_TIPS => {
                let mut seen = 0;
                lines.0.retain(|line| {
                    if !line.starts_with(BULLET) {
                        return true;
                    }
                    seen += 1;
                    seen <= MAX_TIPS
                });
            }
            1 => lines.0.insert(tips[0] + 1, self.second_tip.clone()),
            _ => {}
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 5. Fallback plan
// ────────────────────────────────────────────────────────────────────────────

pub struct EnsureFallbackPlan {
    plan: String,
}

impl EnsureFallbackPlan {
    pub fn new(plan: impl Into<String>) -> Self {
        Self { plan: plan.into() }
    }
}

impl LineStage for EnsureFallbackPlan {
    fn name(&self) -> &'static str {
        "ensure_fallback_plan"
    }

    fn apply(&self, lines: &mut Lines, _place: &Place) {
        if !lines.0.iter().any(|line| has_marker(line, PLAN_MARKER)) {
            lines.0.push(self.plan.clone());
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 6. Place on the risk line
// ────────────────────────────────────────────────────────────────────────────

/// Splices `<city>, <UF> —` after the marker of the first risk line when the
/// city is missing from it. The place comes from the request, not from config.
pub struct InsertPlace;

impl LineStage for InsertPlace {
    fn name(&self) -> &'static str {
        "insert_place"
    }

    fn apply(&self, lines: &mut Lines, place: &Place) {
        let Some(line) = lines.0.iter_mut().find(|line| has_marker(line, RISK_MARKER)) else {
            return;
        };
        if line.to_lowercase().contains(&place.city.to_lowercase()) {
            return;
        }
        let label = place.label();
        let (marker, rest) = line.split_at(RISK_MARKER.len());
        let rest = rest.trim_start();
        *line = if rest.is_empty() {
            format!("{marker} {label} —")
        } else {
            format!("{marker} {label} — {rest}")
        };
    }
}

// ────────────────────────────────────────────────────────────────────────────
// 7. Near-duplicate tips
// ────────────────────────────────────────────────────────────────────────────

/// Replaces the second tip when it repeats the first, either verbatim
/// (ignoring case) or by hitting the same tip family.
pub struct CollapseDuplicateTips {
    families: Vec<TipFamily>,
    replacement: String,
}

impl CollapseDuplicateTips {
    pub fn new(families: Vec<TipFamily>, replacement: impl Into<String>) -> Self {
        Self {
            families,
            replacement: replacement.into(),
        }
    }

    fn is_duplicate(&self, first: &str, second: &str) -> bool {
        first.to_lowercase() == second.to_lowercase()
            || self
                .families
                .iter()
                .any(|family| family.matches(first) && family.matches(second))
    }
}

impl LineStage for CollapseDuplicateTips {
    fn name(&self) -> &'static str {
        "collapse_duplicate_tips"
    }

    fn apply(&self, lines: &mut Lines, _place: &Place) {
        let tips = lines.tip_indices();
        if tips.len() < 2 {
            return;
        }
        let (first, second) = (tips[0], tips[1]);
        if self.is_duplicate(&lines.0[first], &lines.0[second]) {
            lines.0[second] = self.replacement.clone();
        }
    }
}
