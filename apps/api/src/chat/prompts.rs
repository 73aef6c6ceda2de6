//! Prompt assembly for the weather-advice chat.
//!
//! The instruction block is kept in PT-BR because the model answers in the
//! language of the instructions. The normalizer enforces the same shape
//! afterwards for models that ignore it.

use crate::chat::context::PromptContext;

/// System instruction block. Sent verbatim at the top of every prompt.
pub const WEATHER_SYSTEM: &str = "\
Você é um assistente de CLIMA do Meetyo.
Regras:
- Escreva SOMENTE em português do Brasil, claro e natural.
- Seja curto e direto. NÃO use <think>. NÃO explique o processo.
- NUNCA repita dicas.
- Use “amanhã em <cidade/UF>”.
- Evite horários exatos; prefira períodos (manhã/tarde/noite).
- Use SEMPRE “Chance de ...” (não use “Previsto ...”).
- Evite termos vagos (ex.: “colete”); prefira “local interno” ou “rotas cobertas”.

Formato (preencha com conteúdo real, não copie o texto do formato):
Risco: (1 frase simples sobre chance de chuva, calor ou vento em <cidade/UF>)
• (dica prática 1, curta e específica)
• (dica prática 2, curta e diferente da primeira)
Plano B: (1 frase curta, ex.: considere atividade em local interno)";

const CONTEXT_LABEL: &str = "Contexto:";
const USER_LABEL: &str = "Usuário:";
/// Where the model should start writing.
pub const ANSWER_MARKER: &str = "RESPOSTA:";

/// A fully assembled completion prompt. Built once, consumed once by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledPrompt(String);

impl AssembledPrompt {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    #[cfg(test)]
    pub fn from_raw(raw: String) -> Self {
        Self(raw)
    }
}

/// Joins instructions, context, user message and the answer marker.
/// The message is trimmed; an empty message passes through as-is.
pub fn assemble_prompt(context: &PromptContext, message: &str) -> AssembledPrompt {
    AssembledPrompt(format!(
        "{WEATHER_SYSTEM}\n\n{CONTEXT_LABEL} {}\n{USER_LABEL} {}\n{ANSWER_MARKER}",
        context.render(),
        message.trim()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::context::Place;

    fn vilhena() -> PromptContext {
        PromptContext {
            place: Place::new("Vilhena", "RO"),
            day: "amanhã".to_string(),
        }
    }

    #[test]
    fn test_prompt_sections_in_order() {
        let prompt = assemble_prompt(&vilhena(), "Vai chover?");
        let text = prompt.as_str();

        let system_at = text.find("Você é um assistente de CLIMA").unwrap();
        let context_at = text.find("Contexto: Local: Vilhena, RO. Data: amanhã.").unwrap();
        let user_at = text.find("Usuário: Vai chover?").unwrap();
        let marker_at = text.rfind(ANSWER_MARKER).unwrap();

        assert!(system_at < context_at);
        assert!(context_at < user_at);
        assert!(user_at < marker_at);
        assert!(text.ends_with(ANSWER_MARKER));
    }

    #[test]
    fn test_message_is_trimmed() {
        let prompt = assemble_prompt(&vilhena(), "  \n Vai chover?\t ");
        assert!(prompt.as_str().contains("\nUsuário: Vai chover?\nRESPOSTA:"));
    }

    #[test]
    fn test_empty_message_passes_through() {
        let prompt = assemble_prompt(&vilhena(), "");
        assert!(prompt.as_str().contains("\nUsuário: \nRESPOSTA:"));
    }

    #[test]
    fn test_system_block_forbids_think_and_previsto() {
        assert!(WEATHER_SYSTEM.contains("NÃO use <think>"));
        assert!(WEATHER_SYSTEM.contains("não use “Previsto ...”"));
    }
}
