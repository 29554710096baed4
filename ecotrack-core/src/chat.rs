//! Assistant transcripts with a single-request-in-flight guard.

use tracing::{debug, warn};

use crate::model::ChatMessage;
use crate::ports::{GenerationConfig, GenerationRequest, PortError, TextGenerator};

/// Reply appended to the transcript when generation fails.
pub const APOLOGY: &str =
    "Sorry, I encountered an error while generating a response. Please try again.";

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
/// Reasons a chat submission is refused.
pub enum ChatError {
    /// Input was blank.
    #[error("Message is empty")]
    EmptyPrompt,
    /// A reply is still being generated.
    #[error("Still waiting for the previous reply")]
    Busy,
    /// No request is in flight to complete.
    #[error("No request in flight")]
    Idle,
}

/// Transcript and in-flight state for one assistant.
#[derive(Debug, Clone)]
pub struct ChatSession {
    focus: String,
    config: GenerationConfig,
    messages: Vec<ChatMessage>,
    generating: bool,
}

impl ChatSession {
    /// Start a transcript with the assistant's greeting.
    ///
    /// `focus` is prepended to every prompt to keep replies on topic.
    #[must_use]
    pub fn new<F: Into<String>, G: Into<String>>(focus: F, greeting: G) -> Self {
        Self {
            focus: focus.into(),
            config: GenerationConfig::default(),
            messages: vec![ChatMessage::assistant(greeting)],
            generating: false,
        }
    }

    /// Override the sampling parameters.
    #[must_use]
    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = config;
        self
    }

    /// Messages so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Whether a reply is being generated.
    #[must_use]
    pub fn is_generating(&self) -> bool {
        self.generating
    }

    /// Record the user's message and build the request to send.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::EmptyPrompt`] for blank input and
    /// [`ChatError::Busy`] while a previous request is in flight.
    pub fn begin(&mut self, input: &str) -> Result<GenerationRequest, ChatError> {
        if self.generating {
            return Err(ChatError::Busy);
        }
        if input.trim().is_empty() {
            return Err(ChatError::EmptyPrompt);
        }

        self.messages.push(ChatMessage::user(input));
        self.generating = true;
        debug!(chars = input.len(), "chat request started");

        Ok(GenerationRequest {
            prompt: format!("{} {input}", self.focus),
            config: self.config,
        })
    }

    /// Record the outcome of the in-flight request.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::Idle`] when nothing was in flight.
    pub fn finish(&mut self, outcome: Result<String, PortError>) -> Result<(), ChatError> {
        if !self.generating {
            return Err(ChatError::Idle);
        }
        self.generating = false;

        let reply = match outcome {
            Ok(text) => text,
            Err(err) => {
                warn!(error = %err, "chat request failed");
                APOLOGY.to_owned()
            }
        };
        self.messages.push(ChatMessage::assistant(reply));
        Ok(())
    }

    /// Submit `input` and wait for the reply.
    ///
    /// # Errors
    ///
    /// Same as [`ChatSession::begin`]. Backend failures are not errors; they
    /// end up as an apology in the transcript.
    pub async fn submit<G: TextGenerator + ?Sized>(
        &mut self,
        generator: &G,
        input: &str,
    ) -> Result<(), ChatError> {
        let request = self.begin(input)?;
        let outcome = generator.generate(&request).await;
        self.finish(outcome)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::model::ChatRole;

    struct Scripted {
        reply: Option<String>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for Scripted {
        async fn generate(&self, request: &GenerationRequest) -> Result<String, PortError> {
            self.prompts
                .lock()
                .expect("prompt lock")
                .push(request.prompt.clone());
            self.reply
                .clone()
                .ok_or_else(|| PortError::Api("status 500".to_owned()))
        }
    }

    fn session() -> ChatSession {
        ChatSession::new("Focus on recycling.", "Hello!")
    }

    #[test]
    fn second_submission_is_rejected_while_in_flight() {
        let mut chat = session();
        chat.begin("How do I sort glass?").expect("first submission");

        assert_eq!(chat.begin("And paper?"), Err(ChatError::Busy));
        assert_eq!(chat.messages().len(), 2);

        chat.finish(Ok("Rinse it.".to_owned())).expect("finish");
        assert!(chat.begin("And paper?").is_ok());
    }

    #[test]
    fn blank_input_is_rejected() {
        let mut chat = session();
        assert_eq!(chat.begin("   "), Err(ChatError::EmptyPrompt));
        assert!(!chat.is_generating());
        assert_eq!(chat.messages().len(), 1);
    }

    #[test]
    fn finish_without_request_is_an_error() {
        let mut chat = session();
        assert_eq!(chat.finish(Ok("stray".to_owned())), Err(ChatError::Idle));
    }

    #[test]
    fn request_carries_focus_and_defaults() {
        let mut chat = session();
        let request = chat.begin("Can I recycle pizza boxes?").expect("begin");

        assert_eq!(request.prompt, "Focus on recycling. Can I recycle pizza boxes?");
        assert_eq!(request.config, GenerationConfig::default());
        assert_eq!(request.config.top_k, 40);
        assert_eq!(request.config.max_output_tokens, 1024);
    }

    #[tokio::test]
    async fn submit_appends_reply() {
        let generator = Scripted {
            reply: Some("Yes, if clean.".to_owned()),
            prompts: Mutex::new(Vec::new()),
        };
        let mut chat = session();

        chat.submit(&generator, "Pizza boxes?").await.expect("submit");

        let last = chat.messages().last().expect("reply");
        assert_eq!(last.role, ChatRole::Assistant);
        assert_eq!(last.content, "Yes, if clean.");
        assert!(!chat.is_generating());
        assert_eq!(generator.prompts.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn failure_appends_apology_and_reenables_input() {
        let generator = Scripted {
            reply: None,
            prompts: Mutex::new(Vec::new()),
        };
        let mut chat = session();

        chat.submit(&generator, "Anything?").await.expect("submit");

        assert_eq!(chat.messages().last().map(|msg| msg.content.as_str()), Some(APOLOGY));
        assert!(!chat.is_generating());
    }
}
