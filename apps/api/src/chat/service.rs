//! Chat pipeline: context → prompt → completion → normalized answer.
//!
//! This is the fail-soft boundary. A gateway failure becomes an answer that
//! starts with `ERROR_MARKER`; it is never propagated and never normalized.

use tracing::{debug, info, warn};

use crate::chat::context::ContextProvider;
use crate::chat::prompts::assemble_prompt;
use crate::llm_client::{LlmError, OllamaClient};
use crate::normalizer::ResponseNormalizer;

pub const ERROR_MARKER: &str = "[ERRO]";

/// Runs one chat turn. Always returns an answer string.
pub async fn answer_message(
    message: &str,
    context: &dyn ContextProvider,
    llm: &OllamaClient,
    normalizer: &ResponseNormalizer,
) -> String {
    let ctx = context.context().await;
    let prompt = assemble_prompt(&ctx, message);
    debug!("Assembled prompt: {} chars", prompt.as_str().chars().count());

    match llm.generate(prompt).await {
        Ok(raw) => {
            let answer = normalizer.normalize_at(&raw, &ctx.place);
            info!(
                "Chat answered: model={}, raw_chars={}, answer_chars={}",
                llm.model(),
                raw.chars().count(),
                answer.chars().count()
            );
            answer
        }
        Err(e) => {
            warn!("Ollama call failed, returning degraded answer: {e}");
            degraded_answer(&e)
        }
    }
}

/// User-visible text for a failed completion.
pub fn degraded_answer(error: &LlmError) -> String {
    format!("{ERROR_MARKER} Não consegui falar com o Ollama: {error}")
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::chat::context::{Place, StaticContextProvider};
    use crate::llm_client::tests::{client_for, client_with_timeout, spawn_stub, start_stub};
    use axum::http::StatusCode;

    fn provider() -> StaticContextProvider {
        StaticContextProvider::new(Place::new("Vilhena", "RO"), "amanhã")
    }

    #[tokio::test]
    async fn test_unreachable_gateway_degrades() {
        let answer = answer_message(
            "Vai chover?",
            &provider(),
            &client_for("http://127.0.0.1:1"),
            &ResponseNormalizer::default(),
        )
        .await;
        assert!(answer.starts_with(ERROR_MARKER), "{answer}");
        assert!(answer.contains("Não consegui falar com o Ollama"));
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out_and_degrades() {
        let stub = start_stub(
            StatusCode::OK,
            r#"{"response":"Risco: tarde demais"}"#,
            Duration::from_secs(3),
        )
        .await;
        let answer = answer_message(
            "Vai chover?",
            &provider(),
            &client_with_timeout(&stub.url, 1),
            &ResponseNormalizer::default(),
        )
        .await;
        assert!(answer.starts_with(ERROR_MARKER), "{answer}");
    }

    #[tokio::test]
    async fn test_context_place_reaches_prompt_and_answer() {
        let stub = start_stub(
            StatusCode::OK,
            r#"{"response":"Risco: chuva amanhã.\n• leve guarda-chuva\n• saia cedo\nPlano B: fique em casa"}"#,
            Duration::ZERO,
        )
        .await;
        let cacoal = StaticContextProvider::new(Place::new("Cacoal", "RO"), "hoje");
        let answer = answer_message(
            "  Vai chover?  ",
            &cacoal,
            &client_for(&stub.url),
            &ResponseNormalizer::default(),
        )
        .await;

        let prompt = stub.last_request()["prompt"].as_str().unwrap().to_string();
        assert!(prompt.contains("Contexto: Local: Cacoal, RO. Data: hoje."));
        assert!(prompt.contains("Usuário: Vai chover?\nRESPOSTA:"));
        assert!(
            answer.starts_with("Risco: Cacoal, RO — chuva amanhã."),
            "{answer}"
        );
        assert!(!answer.contains("Vilhena"));
    }

    #[tokio::test]
    async fn test_upstream_error_status_degrades_without_normalizing() {
        let url = spawn_stub(StatusCode::INTERNAL_SERVER_ERROR, r#"{"error":"boom"}"#).await;
        let answer = answer_message(
            "Vai chover?",
            &provider(),
            &client_for(&url),
            &ResponseNormalizer::default(),
        )
        .await;
        assert_eq!(
            answer,
            "[ERRO] Não consegui falar com o Ollama: API error (status 500): boom"
        );
    }

    #[tokio::test]
    async fn test_successful_completion_is_normalized() {
        let url = spawn_stub(
            StatusCode::OK,
            r#"{"response":"<think>hmm</think>Risco: previsto chuva.\n- leve capa\nPlano B: nenhum","done":true}"#,
        )
        .await;
        let answer = answer_message(
            "Vai chover?",
            &provider(),
            &client_for(&url),
            &ResponseNormalizer::default(),
        )
        .await;
        assert!(answer.starts_with("Risco: Vilhena, RO — Chance de chuva."));
        assert!(!answer.contains("<think>"));
        assert_eq!(answer.lines().filter(|l| l.starts_with("• ")).count(), 2);
    }
}
