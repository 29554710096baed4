//! Registry of the topic-specific recycling assistants.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::chat::ChatSession;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifier for an assistant.
pub struct AssistantId(pub String);

impl fmt::Display for AssistantId {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Built-in assistants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assistants {
    /// Waste disposal and its health impact.
    WasteManagement,
    /// Sorting and recycling practice.
    Recycling,
    /// Environmental factors and personal health.
    EnvironmentalHealth,
}

impl fmt::Display for Assistants {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slug = match self {
            Assistants::WasteManagement => "waste",
            Assistants::Recycling => "recycling",
            Assistants::EnvironmentalHealth => "environmental",
        };
        write!(formatter, "{slug}")
    }
}

impl From<Assistants> for AssistantId {
    fn from(assistant: Assistants) -> Self {
        AssistantId(assistant.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
/// Static description of an assistant.
pub struct Assistant {
    /// Unique identifier.
    pub id: AssistantId,
    /// Title shown above the transcript.
    pub title: String,
    /// One-line summary of what to ask.
    pub description: String,
    /// First assistant message of every transcript.
    pub greeting: String,
    /// Instruction prepended to every prompt.
    pub focus: String,
}

impl Assistant {
    /// Fresh transcript for this assistant.
    #[must_use]
    pub fn session(&self) -> ChatSession {
        ChatSession::new(self.focus.clone(), self.greeting.clone())
    }
}

impl From<Assistants> for Assistant {
    fn from(kind: Assistants) -> Self {
        let (title, description, greeting, focus) = match kind {
            Assistants::WasteManagement => (
                "Environmental Health Assistant",
                "Ask questions about environmental health impacts",
                "Hello! I'm your waste management AI assistant. Ask me about proper waste disposal, health impacts of waste, or community waste reduction programs.",
                "Focus on waste management health impacts and safe disposal techniques.",
            ),
            Assistants::Recycling => (
                "Recycling Assistant",
                "Get guidance on proper recycling techniques and material sorting",
                "Hello! I'm your recycling AI assistant. Ask me about sorting recyclables, recycling best practices, or finding recycling centers near you.",
                "Focus on recycling best practices and material sorting information.",
            ),
            Assistants::EnvironmentalHealth => (
                "Health Impact Assistant",
                "Learn about connections between environment and personal health",
                "Hello! I'm your environmental health AI assistant. Ask me about pollution impacts, environmental health threats, or creating healthier living spaces.",
                "Focus on environmental factors affecting human health and wellbeing.",
            ),
        };
        Self {
            id: kind.into(),
            title: title.to_owned(),
            description: description.to_owned(),
            greeting: greeting.to_owned(),
            focus: focus.to_owned(),
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Registry lookup failures.
pub enum AssistantError {
    /// No assistant is registered under the identifier.
    #[error("Unknown assistant: {0}")]
    Unknown(AssistantId),
}

/// Registry that resolves assistants by identifier.
pub struct AssistantRegistry {
    order: Vec<AssistantId>,
    assistants: HashMap<AssistantId, Assistant>,
}

impl AssistantRegistry {
    /// Build a registry from the provided assistants, keeping their order.
    #[must_use]
    pub fn new(assistants: Vec<Assistant>) -> Self {
        let order = assistants
            .iter()
            .map(|assistant| assistant.id.clone())
            .collect();
        let assistants = assistants
            .into_iter()
            .map(|assistant| (assistant.id.clone(), assistant))
            .collect();
        Self { order, assistants }
    }

    /// Registry holding the three built-in assistants.
    #[must_use]
    pub fn builtin() -> Self {
        Self::new(vec![
            Assistants::WasteManagement.into(),
            Assistants::Recycling.into(),
            Assistants::EnvironmentalHealth.into(),
        ])
    }

    /// Assistants in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Assistant> {
        self.order
            .iter()
            .filter_map(|id| self.assistants.get(id))
    }

    /// Look up an assistant.
    ///
    /// # Errors
    ///
    /// Returns [`AssistantError::Unknown`] when no assistant is registered.
    pub fn get(&self, id: &AssistantId) -> Result<&Assistant, AssistantError> {
        self.assistants
            .get(id)
            .ok_or_else(|| AssistantError::Unknown(id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_keeps_order() {
        let registry = AssistantRegistry::builtin();
        let ids: Vec<String> = registry.iter().map(|assistant| assistant.id.0.clone()).collect();
        assert_eq!(ids, vec!["waste", "recycling", "environmental"]);
    }

    #[test]
    fn unknown_assistant_is_an_error() {
        let registry = AssistantRegistry::builtin();
        let missing = AssistantId("weather".to_owned());
        assert_eq!(
            registry.get(&missing).map(|assistant| assistant.id.clone()),
            Err(AssistantError::Unknown(missing))
        );
    }

    #[test]
    fn session_starts_with_greeting() {
        let registry = AssistantRegistry::builtin();
        let assistant = registry
            .get(&Assistants::Recycling.into())
            .expect("recycling assistant");

        let session = assistant.session();

        assert_eq!(session.messages().len(), 1);
        assert!(
            session
                .messages()
                .first()
                .is_some_and(|message| message.content.starts_with("Hello! I'm your recycling"))
        );
    }
}
