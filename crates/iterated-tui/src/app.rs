use std::sync::Arc;

use iterated_client::TutorClient;
use iterated_core::{
    BackendError, ChatResponse, ChatSession, Completion, PendingRequest, SessionOptions,
    SessionPhase,
};
use tokio::sync::mpsc;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Connected => write!(f, "● Connected"),
            ConnectionStatus::Disconnected => write!(f, "○ Disconnected"),
        }
    }
}

/// Field of the setup form that receives typed characters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FormField {
    Question,
    Answer,
}

/// A request that finished, waiting to be applied on the UI loop
struct Settled {
    pending: PendingRequest,
    outcome: Result<ChatResponse, BackendError>,
}

pub struct App {
    pub client: Arc<TutorClient>,
    pub session: ChatSession,
    pub focus: FormField,
    pub status: ConnectionStatus,
    pub full_screen: bool,
    /// Lines scrolled up from the bottom of the transcript
    pub scroll_offset: usize,
    /// Largest offset the last drawn transcript allows
    max_scroll: usize,
    pub tick: usize,
    settled_tx: mpsc::Sender<Settled>,
    settled_rx: mpsc::Receiver<Settled>,
}

impl App {
    pub fn new(server_url: &str, options: SessionOptions) -> Self {
        let (settled_tx, settled_rx) = mpsc::channel(16);

        Self {
            client: Arc::new(TutorClient::new(server_url)),
            session: ChatSession::new(options),
            focus: FormField::Question,
            status: ConnectionStatus::Disconnected,
            full_screen: false,
            scroll_offset: 0,
            max_scroll: 0,
            tick: 0,
            settled_tx,
            settled_rx,
        }
    }

    pub fn phase(&self) -> SessionPhase {
        self.session.phase()
    }

    pub async fn check_connection(&mut self) {
        self.status = if self.client.health_check().await {
            ConnectionStatus::Connected
        } else {
            log::warn!("tutor backend at {} is not reachable", self.client.base_url());
            ConnectionStatus::Disconnected
        };
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FormField::Question => FormField::Answer,
            FormField::Answer => FormField::Question,
        };
    }

    pub fn toggle_full_screen(&mut self) {
        self.full_screen = !self.full_screen;
    }

    /// Type a character into whichever field is active
    pub fn push_char(&mut self, c: char) {
        match self.phase() {
            SessionPhase::NotStarted => match self.focus {
                FormField::Question => self.session.question_mut().push(c),
                FormField::Answer => self.session.answer_mut().push(c),
            },
            // the input box is disabled while a reply is pending
            SessionPhase::Active if !self.session.is_loading() => {
                self.session.input_mut().push(c)
            }
            SessionPhase::Active => {}
        }
    }

    pub fn pop_char(&mut self) {
        match self.phase() {
            SessionPhase::NotStarted => match self.focus {
                FormField::Question => {
                    self.session.question_mut().pop();
                }
                FormField::Answer => {
                    self.session.answer_mut().pop();
                }
            },
            SessionPhase::Active if !self.session.is_loading() => {
                self.session.input_mut().pop();
            }
            SessionPhase::Active => {}
        }
    }

    pub fn start_session(&mut self) {
        if let Err(e) = self.session.start_from_form() {
            log::debug!("start ignored: {}", e);
            return;
        }
        self.scroll_offset = 0;
        self.focus = FormField::Question;
    }

    /// Send the input text; the reply is applied later by `process_events`
    pub fn send_message(&mut self) {
        let pending = match self.session.begin_send_input() {
            Ok(pending) => pending,
            Err(e) => {
                log::debug!("send ignored: {}", e);
                return;
            }
        };
        self.scroll_offset = 0;

        let client = Arc::clone(&self.client);
        let tx = self.settled_tx.clone();
        tokio::spawn(async move {
            let outcome = pending.dispatch(&*client).await;
            if tx.send(Settled { pending, outcome }).await.is_err() {
                log::debug!("UI closed before the reply arrived");
            }
        });
    }

    /// Apply every finished request
    pub fn process_events(&mut self) {
        while let Ok(settled) = self.settled_rx.try_recv() {
            let completion = self.session.complete(settled.pending, settled.outcome);
            match completion {
                Completion::Reply(_) => {
                    self.status = ConnectionStatus::Connected;
                    self.scroll_offset = 0;
                }
                Completion::Apology(_) => {
                    self.scroll_offset = 0;
                }
                Completion::Discarded => {}
            }
        }
    }

    pub fn reset_session(&mut self) {
        let Some(session_id) = self.session.reset_session() else {
            return;
        };
        self.scroll_offset = 0;
        self.focus = FormField::Question;

        let client = Arc::clone(&self.client);
        tokio::spawn(async move {
            if let Err(e) = client.end_session(&session_id).await {
                log::debug!("failed to end session {}: {}", session_id, e);
            }
        });
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    /// Record how far the transcript can scroll at the current size
    pub fn set_scroll_limit(&mut self, max_scroll: usize) {
        self.max_scroll = max_scroll;
        self.scroll_offset = self.scroll_offset.min(max_scroll);
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = (self.scroll_offset + 1).min(self.max_scroll);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_page_up(&mut self) {
        self.scroll_offset = (self.scroll_offset + 10).min(self.max_scroll);
    }

    pub fn scroll_page_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(10);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use iterated_core::{Sender, APOLOGY};
    use std::time::Duration;

    fn offline_app() -> App {
        App::new("http://127.0.0.1:1", SessionOptions::default())
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.push_char(c);
        }
    }

    #[tokio::test]
    async fn test_form_typing_follows_focus() {
        let mut app = offline_app();
        type_text(&mut app, "What is 2+2?");
        app.toggle_focus();
        type_text(&mut app, "5");
        app.pop_char();
        type_text(&mut app, "4");

        assert_eq!(app.session.question(), "What is 2+2?");
        assert_eq!(app.session.answer(), "4");
    }

    #[tokio::test]
    async fn test_start_requires_question() {
        let mut app = offline_app();
        app.start_session();
        assert_eq!(app.phase(), SessionPhase::NotStarted);

        type_text(&mut app, "Why?");
        app.start_session();
        assert_eq!(app.phase(), SessionPhase::Active);
        assert_eq!(app.session.transcript().len(), 1);
    }

    #[tokio::test]
    async fn test_unreachable_backend_settles_with_apology() {
        let mut app = offline_app();
        type_text(&mut app, "Why?");
        app.start_session();

        type_text(&mut app, "Because");
        app.send_message();
        assert!(app.session.is_loading());

        // typing is ignored while waiting
        type_text(&mut app, "x");
        assert_eq!(app.session.input(), "");

        tokio::time::timeout(Duration::from_secs(10), async {
            while app.session.is_loading() {
                app.process_events();
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();

        let transcript = app.session.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1].sender(), Sender::User);
        assert_eq!(transcript[2].content(), APOLOGY);
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_disconnected() {
        let mut app = offline_app();
        app.check_connection().await;
        assert_eq!(app.status, ConnectionStatus::Disconnected);
    }

    #[tokio::test]
    async fn test_scrolling_stops_at_transcript_top() {
        let mut app = offline_app();
        app.set_scroll_limit(3);

        app.scroll_page_up();
        assert_eq!(app.scroll_offset, 3);
        app.scroll_up();
        assert_eq!(app.scroll_offset, 3);

        // one press down moves the view right away
        app.scroll_down();
        assert_eq!(app.scroll_offset, 2);

        // a shorter transcript pulls the offset back in
        app.set_scroll_limit(1);
        assert_eq!(app.scroll_offset, 1);
        app.scroll_page_down();
        assert_eq!(app.scroll_offset, 0);
    }

    #[tokio::test]
    async fn test_reset_returns_to_form() {
        let mut app = offline_app();
        type_text(&mut app, "Why?");
        app.start_session();
        app.toggle_full_screen();

        app.reset_session();

        assert_eq!(app.phase(), SessionPhase::NotStarted);
        assert_eq!(app.session.question(), "");
        assert!(app.session.transcript().is_empty());
        assert!(app.full_screen);
    }
}
