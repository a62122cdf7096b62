pub mod llm;

use log::{debug, warn};

use crate::{error::RelayError, persona::Persona};

pub use llm::{ChatClient, Completion, Message, Role};

/// Role instruction first, then the question exactly as typed.
pub fn build_messages(query: &str, persona: Persona) -> [Message; 2] {
    [
        Message::new(Role::System, persona.instruction()),
        Message::new(Role::User, query),
    ]
}

pub struct ResponseService<C> {
    completion: C,
}

impl<C: Completion> ResponseService<C> {
    pub fn new(completion: C) -> Self {
        Self { completion }
    }

    /// One completion call per question. The query is not validated here.
    pub fn get_response(&self, query: &str, persona: Persona) -> Result<String, RelayError> {
        let messages = build_messages(query, persona);
        debug!(
            "Requesting completion as {} with {} messages",
            persona.id(),
            messages.len()
        );

        self.completion.complete(&messages).map_err(|e| {
            warn!("Completion failed for {}: {:#}", persona.id(), e);
            RelayError::Service(format!("{e:#}"))
        })
    }

    pub fn get_response_for(&self, query: &str, persona: &str) -> Result<String, RelayError> {
        let persona = persona.parse::<Persona>()?;
        self.get_response(query, persona)
    }

    #[cfg(test)]
    pub(crate) fn completion(&self) -> &C {
        &self.completion
    }
}
