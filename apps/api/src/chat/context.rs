//! Situational context for the prompt (where and when).
//!
//! `StaticContextProvider` returns the configured place and day. A real
//! weather/location source implements `ContextProvider` and is swapped in at
//! startup; assembler and normalizer do not change.

use async_trait::async_trait;

/// A city and its state (UF), e.g. `Vilhena, RO`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Place {
    pub city: String,
    pub state: String,
}

impl Place {
    pub fn new(city: impl Into<String>, state: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: state.into(),
        }
    }

    /// `Vilhena, RO`
    pub fn label(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }
}

/// Per-request context, rendered into the `Contexto:` line.
#[derive(Debug, Clone)]
pub struct PromptContext {
    pub place: Place,
    pub day: String,
}

impl PromptContext {
    pub fn render(&self) -> String {
        format!("Local: {}. Data: {}.", self.place.label(), self.day)
    }
}

/// Source of the situational context. Carried in `AppState` as `Arc<dyn ContextProvider>`.
#[async_trait]
pub trait ContextProvider: Send + Sync {
    async fn context(&self) -> PromptContext;
}

/// Fixed place and day from configuration.
pub struct StaticContextProvider {
    place: Place,
    day: String,
}

impl StaticContextProvider {
    pub fn new(place: Place, day: impl Into<String>) -> Self {
        Self {
            place,
            day: day.into(),
        }
    }
}

#[async_trait]
impl ContextProvider for StaticContextProvider {
    async fn context(&self) -> PromptContext {
        PromptContext {
            place: self.place.clone(),
            day: self.day.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_default_context() {
        let ctx = PromptContext {
            place: Place::new("Vilhena", "RO"),
            day: "amanhã".to_string(),
        };
        assert_eq!(ctx.render(), "Local: Vilhena, RO. Data: amanhã.");
    }

    #[tokio::test]
    async fn test_static_provider_returns_fresh_copy() {
        let provider = StaticContextProvider::new(Place::new("Porto Velho", "RO"), "hoje");
        let first = provider.context().await;
        let second = provider.context().await;
        assert_eq!(first.place, second.place);
        assert_eq!(first.render(), "Local: Porto Velho, RO. Data: hoje.");
    }
}
