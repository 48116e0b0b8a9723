//! Chat session state machine.
//!
//! `NotStarted --start--> Active --reset--> NotStarted`. While active the
//! session loops through send/receive cycles with at most one request in
//! flight. The state machine knows nothing about rendering; the terminal UI
//! and the line-oriented CLI both drive it.

mod error;

pub use error::SessionError;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::chat::{BackendError, ChatRequest, ChatResponse, TutorBackend};
use crate::types::{Message, MessageId};

/// Tutor text appended whenever a request does not produce a reply
pub const APOLOGY: &str = "I'm sorry, I encountered an error. Please try again.";

/// Opening tutor message of a session
pub fn welcome_text(question: &str) -> String {
    format!(
        "Welcome to IteratED! I'm here to help you with your question: \"{}\". \
         Let's work through this together using the Socratic method. \
         What would you like to start with?",
        question
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    NotStarted,
    Active,
}

/// Per-client settings that shape validation and outbound requests
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    /// Refuse to start without an answer
    pub require_answer: bool,
    /// Forwarded as `model_type`
    pub model_type: Option<String>,
    /// Forwarded as `api_key`
    pub api_key: Option<String>,
}

/// An outbound request produced by [`ChatSession::begin_send`].
///
/// Hand it back to [`ChatSession::complete`] together with the backend's
/// outcome.
#[derive(Debug)]
pub struct PendingRequest {
    request: ChatRequest,
    token: CancellationToken,
    user_message: MessageId,
}

impl PendingRequest {
    pub fn request(&self) -> &ChatRequest {
        &self.request
    }

    /// Id of the optimistic user message this request answers
    pub fn user_message(&self) -> MessageId {
        self.user_message
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Send the request, giving up as soon as the owning session is reset.
    pub async fn dispatch(&self, backend: &dyn TutorBackend) -> Result<ChatResponse, BackendError> {
        tokio::select! {
            _ = self.token.cancelled() => Err(BackendError::Cancelled),
            outcome = backend.send(&self.request) => outcome,
        }
    }
}

/// What [`ChatSession::complete`] did with an outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The tutor's reply was appended
    Reply(MessageId),
    /// The request failed and the apology was appended
    Apology(MessageId),
    /// The session was reset before the outcome arrived; nothing changed
    Discarded,
}

impl Completion {
    pub fn message_id(&self) -> Option<MessageId> {
        match self {
            Completion::Reply(id) | Completion::Apology(id) => Some(*id),
            Completion::Discarded => None,
        }
    }
}

/// Client-side chat state: the transcript, the form fields and the busy flag.
#[derive(Debug)]
pub struct ChatSession {
    options: SessionOptions,
    transcript: Vec<Message>,
    question: String,
    answer: String,
    input: String,
    started: bool,
    loading: bool,
    session_id: Option<String>,
    next_id: u64,
    scope: CancellationToken,
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl ChatSession {
    pub fn new(options: SessionOptions) -> Self {
        Self {
            options,
            transcript: Vec::new(),
            question: String::new(),
            answer: String::new(),
            input: String::new(),
            started: false,
            loading: false,
            session_id: None,
            next_id: 0,
            scope: CancellationToken::new(),
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    pub fn phase(&self) -> SessionPhase {
        if self.started {
            SessionPhase::Active
        } else {
            SessionPhase::NotStarted
        }
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn set_question(&mut self, question: impl Into<String>) {
        self.question = question.into();
    }

    pub fn set_answer(&mut self, answer: impl Into<String>) {
        self.answer = answer.into();
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        self.input = input.into();
    }

    pub fn question_mut(&mut self) -> &mut String {
        &mut self.question
    }

    pub fn answer_mut(&mut self) -> &mut String {
        &mut self.answer
    }

    pub fn input_mut(&mut self) -> &mut String {
        &mut self.input
    }

    /// Whether the start action is currently allowed
    pub fn can_start(&self) -> bool {
        self.check_form(&self.question, &self.answer).is_ok()
    }

    /// Whether the send action is currently allowed for the input text
    pub fn can_send(&self) -> bool {
        self.started && !self.loading && !self.input.trim().is_empty()
    }

    /// Begin a session for a question/answer pair.
    ///
    /// Any previous transcript is discarded and any in-flight request is
    /// invalidated. The transcript is seeded with the welcome message.
    pub fn start_session(
        &mut self,
        question: impl Into<String>,
        answer: impl Into<String>,
    ) -> Result<(), SessionError> {
        let question = question.into();
        let answer = answer.into();
        self.check_form(&question, &answer)?;

        self.invalidate_requests();
        self.transcript.clear();
        self.input.clear();
        self.loading = false;

        let session_id = Uuid::new_v4().to_string();
        debug!(session_id = %session_id, "starting tutoring session");

        let welcome = Message::tutor(self.allocate_id(), welcome_text(&question));
        self.transcript.push(welcome);
        self.question = question;
        self.answer = answer;
        self.session_id = Some(session_id);
        self.started = true;

        Ok(())
    }

    /// Start a session from the current form fields
    pub fn start_from_form(&mut self) -> Result<(), SessionError> {
        let question = self.question.clone();
        let answer = self.answer.clone();
        self.start_session(question, answer)
    }

    /// First half of a send: validate, append the user message, mark the
    /// session busy and build the outbound request.
    pub fn begin_send(&mut self, text: &str) -> Result<PendingRequest, SessionError> {
        if !self.started {
            return Err(SessionError::NotStarted);
        }
        if text.trim().is_empty() {
            return Err(SessionError::EmptyMessage);
        }
        if self.loading {
            return Err(SessionError::RequestInFlight);
        }

        let user_message = self.allocate_id();
        self.transcript.push(Message::user(user_message, text));
        self.input.clear();
        self.loading = true;

        let request = ChatRequest::new(text)
            .with_problem(self.question.clone(), self.answer.clone())
            .with_session(self.session_id.clone().unwrap_or_default())
            .with_model_type(self.options.model_type.clone())
            .with_api_key(self.options.api_key.clone());

        Ok(PendingRequest {
            request,
            token: self.scope.child_token(),
            user_message,
        })
    }

    /// Send whatever is in the input field
    pub fn begin_send_input(&mut self) -> Result<PendingRequest, SessionError> {
        let text = self.input.clone();
        self.begin_send(&text)
    }

    /// Second half of a send: append exactly one tutor message and clear the
    /// busy flag, unless the request belongs to a session that has since been
    /// reset.
    pub fn complete(
        &mut self,
        pending: PendingRequest,
        outcome: Result<ChatResponse, BackendError>,
    ) -> Completion {
        if pending.is_cancelled() {
            debug!(
                user_message = %pending.user_message,
                "discarding response for a reset session"
            );
            return Completion::Discarded;
        }

        let reply = match &outcome {
            Ok(response) => match response.reply_text() {
                Some(text) => Some(text.to_string()),
                None => {
                    warn!(
                        error = response.error.as_deref().unwrap_or("Failed to get response"),
                        "tutor backend reported a failure"
                    );
                    None
                }
            },
            Err(e) => {
                warn!(error = %e, "error sending message");
                None
            }
        };

        let id = self.allocate_id();
        let completion = match reply {
            Some(text) => {
                self.transcript.push(Message::tutor(id, text));
                Completion::Reply(id)
            }
            None => {
                self.transcript.push(Message::tutor(id, APOLOGY));
                Completion::Apology(id)
            }
        };

        self.loading = false;
        completion
    }

    /// Run a whole send/receive cycle against `backend`.
    pub async fn send_message(
        &mut self,
        backend: &dyn TutorBackend,
        text: &str,
    ) -> Result<Completion, SessionError> {
        let pending = self.begin_send(text)?;
        let outcome = pending.dispatch(backend).await;
        Ok(self.complete(pending, outcome))
    }

    /// Return to the pre-session state.
    ///
    /// Returns the id of the session that ended, if one was active, so the
    /// caller can notify the backend.
    pub fn reset_session(&mut self) -> Option<String> {
        self.invalidate_requests();
        self.transcript.clear();
        self.question.clear();
        self.answer.clear();
        self.input.clear();
        self.started = false;
        self.loading = false;

        let ended = self.session_id.take();
        if let Some(ref id) = ended {
            debug!(session_id = %id, "session reset");
        }
        ended
    }

    fn check_form(&self, question: &str, answer: &str) -> Result<(), SessionError> {
        if question.trim().is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        if self.options.require_answer && answer.trim().is_empty() {
            return Err(SessionError::EmptyAnswer);
        }
        Ok(())
    }

    fn invalidate_requests(&mut self) {
        self.scope.cancel();
        self.scope = CancellationToken::new();
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_id += 1;
        MessageId::new(self.next_id)
    }
}
