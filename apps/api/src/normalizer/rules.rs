//! Markers, default wording and tunable synonym sets used by the normalizer stages.
//!
//! The place name is not here: it comes with each request's context.

pub const RISK_MARKER: &str = "Risco:";
pub const PLAN_MARKER: &str = "Plano B:";
/// Canonical bullet. Tips are the lines starting with it.
pub const BULLET: &str = "• ";
/// Bullet style models fall back to; rewritten to `BULLET`.
pub const ALT_BULLET: &str = "- ";

pub const MAX_TIPS: usize = 2;

pub const DEFAULT_SECOND_TIP: &str = "• Consulte o app de clima/radar antes de sair.";
pub const DEFAULT_FALLBACK_PLAN: &str =
    "Plano B: considere atividade em local interno ou rotas cobertas.";
pub const DUPLICATE_REPLACEMENT_TIP: &str = "• Verifique o app de clima antes de sair.";

/// Keywords for a family of tips that say the same thing in different words.
/// Two tips that both hit the same family count as duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TipFamily {
    keywords: Vec<String>,
}

impl TipFamily {
    pub fn new<S: AsRef<str>>(keywords: impl IntoIterator<Item = S>) -> Self {
        Self {
            keywords: keywords
                .into_iter()
                .map(|kw| kw.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// Umbrella / raincoat tips.
    pub fn rain_gear() -> Self {
        Self::new(["guarda", "capa"])
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// Substring match on the lowercased tip.
    pub fn matches(&self, tip: &str) -> bool {
        let tip = tip.to_lowercase();
        self.keywords.iter().any(|kw| tip.contains(kw.as_str()))
    }
}

/// Everything the pipeline needs that is not a hard-coded pattern.
#[derive(Debug, Clone)]
pub struct NormalizerRules {
    pub second_tip: String,
    pub fallback_plan: String,
    pub duplicate_replacement: String,
    pub tip_families: Vec<TipFamily>,
}

impl NormalizerRules {
    pub fn with_tip_families(mut self, families: Vec<TipFamily>) -> Self {
        self.tip_families = families;
        self
    }
}

impl Default for NormalizerRules {
    fn default() -> Self {
        Self {
            second_tip: DEFAULT_SECOND_TIP.to_string(),
            fallback_plan: DEFAULT_FALLBACK_PLAN.to_string(),
            duplicate_replacement: DUPLICATE_REPLACEMENT_TIP.to_string(),
            tip_families: vec![TipFamily::rain_gear()],
        }
    }
}

/// Case-insensitive prefix check that never splits a multi-byte char.
pub fn has_marker(line: &str, marker: &str) -> bool {
    line.get(..marker.len())
        .is_some_and(|prefix| prefix.eq_ignore_ascii_case(marker))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rain_gear_family_matches_umbrella_and_raincoat() {
        let family = TipFamily::rain_gear();
        assert!(family.matches("• Leve GUARDA-chuva"));
        assert!(family.matches("• Use capa de chuva"));
        assert!(!family.matches("• Beba água"));
    }

    #[test]
    fn test_family_keywords_lowercased() {
        let family = TipFamily::new(["Protetor", "SOL"]);
        assert_eq!(family.keywords(), &["protetor", "sol"]);
        assert!(family.matches("• Passe protetor solar"));
    }

    #[test]
    fn test_has_marker_case_insensitive() {
        assert!(has_marker("RISCO: chuva", RISK_MARKER));
        assert!(has_marker("plano b: ficar em casa", PLAN_MARKER));
        assert!(!has_marker("Risc", RISK_MARKER));
        assert!(!has_marker("• Risco: não", RISK_MARKER));
    }

    #[test]
    fn test_has_marker_multibyte_boundary() {
        // byte 6 falls inside 'é'; must not panic
        assert!(!has_marker("Riscoé: x", RISK_MARKER));
    }

    #[test]
    fn test_default_rules_use_rain_gear_family() {
        let rules = NormalizerRules::default();
        assert_eq!(rules.second_tip, DEFAULT_SECOND_TIP);
        assert_eq!(rules.tip_families, vec![TipFamily::rain_gear()]);
    }
}
