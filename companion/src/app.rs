//! Main application state and logic

use std::collections::VecDeque;
use std::time::Instant;

use companion_core::ReplyKind;
use tokio::sync::mpsc;
use tracing::debug;

use crate::ui::theme::CompanionTheme;
use crate::ui::widgets::conversation::{ConversationItem, EntryKind};
use crate::ui::Overlay;
use crate::worker::{WorkerRequest, WorkerResponse};

/// Vim-style input modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputMode {
    /// Normal mode - navigation and hotkeys (default)
    #[default]
    Normal,
    /// Insert mode - free text input
    Insert,
    /// Command mode - entering : commands
    Command,
}

const WELCOME: &str = "Hi, I'm here to listen. How are you feeling today?";

/// Status shown when a message is submitted before the previous reply arrives
pub const BUSY_NOTICE: &str = "Still thinking about your last message...";

/// Main application state
pub struct App {
    // Channel communication with the session worker
    request_tx: mpsc::Sender<WorkerRequest>,
    response_rx: mpsc::Receiver<WorkerResponse>,

    // UI state
    pub theme: CompanionTheme,
    overlay: Option<Overlay>,

    // Conversation display
    pub conversation: Vec<ConversationItem>,
    pub scroll: usize,
    pub scroll_locked_to_bottom: bool,

    // Input state
    pub input_mode: InputMode,
    input_buffer: String,
    cursor_position: usize,
    pub input_history: VecDeque<String>,
    pub history_index: Option<usize>,
    pub saved_input: Option<String>,

    // Status
    status_message: Option<String>,
    pub should_quit: bool,

    // Animation
    pub animation_frame: u8,

    /// A message is with the worker and no reply has arrived yet.
    pub waiting: bool,
}

impl App {
    /// Create a new application with channel endpoints
    pub fn new(
        request_tx: mpsc::Sender<WorkerRequest>,
        response_rx: mpsc::Receiver<WorkerResponse>,
    ) -> Self {
        let mut app = Self {
            request_tx,
            response_rx,
            theme: CompanionTheme::default(),
            overlay: None,
            conversation: Vec::new(),
            scroll: 0,
            scroll_locked_to_bottom: true,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            cursor_position: 0,
            input_history: VecDeque::with_capacity(100),
            history_index: None,
            saved_input: None,
            status_message: None,
            should_quit: false,
            animation_frame: 0,
            waiting: false,
        };
        app.greet();
        app
    }

    fn greet(&mut self) {
        self.add_entry(WELCOME.to_string(), EntryKind::Companion);
        self.add_entry(
            "Press 'i' to start typing, 'b' for a breathing exercise, '?' for help".to_string(),
            EntryKind::System,
        );
    }

    /// Enter command mode (starts with :)
    pub fn enter_command_mode(&mut self) {
        self.input_mode = InputMode::Command;
        self.input_buffer.clear();
        self.input_buffer.push(':');
        self.cursor_position = 1;
    }

    /// Add a conversation entry
    pub fn add_entry(&mut self, content: String, kind: EntryKind) {
        self.conversation.push(ConversationItem { content, kind });
        if self.scroll_locked_to_bottom {
            self.scroll_to_bottom();
        }
    }

    /// Scroll conversation to bottom and lock to bottom
    pub fn scroll_to_bottom(&mut self) {
        // The widget caps this to the real maximum
        self.scroll = usize::MAX / 2;
        self.scroll_locked_to_bottom = true;
    }

    /// Jump to the first entry
    pub fn scroll_to_top(&mut self) {
        self.scroll = 0;
        self.scroll_locked_to_bottom = false;
    }

    /// Rough line count assuming ~60 columns of text
    fn estimate_max_scroll(&self) -> usize {
        const ESTIMATED_WIDTH: usize = 60;
        const ESTIMATED_VISIBLE_HEIGHT: usize = 20;

        let estimated_lines: usize = self
            .conversation
            .iter()
            .map(|item| {
                item.content
                    .lines()
                    .map(|line| (line.len() / ESTIMATED_WIDTH).max(1))
                    .sum::<usize>()
                    + 1
            })
            .sum();

        estimated_lines.saturating_sub(ESTIMATED_VISIBLE_HEIGHT)
    }

    /// Scroll up (unlocks from bottom)
    pub fn scroll_up(&mut self, lines: usize) {
        let max_scroll = self.estimate_max_scroll();
        if self.scroll > max_scroll {
            self.scroll = max_scroll;
        }
        self.scroll = self.scroll.saturating_sub(lines);
        self.scroll_locked_to_bottom = false;
    }

    /// Scroll down
    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_add(lines);
        let max_scroll = self.estimate_max_scroll();
        self.scroll = self.scroll.min(max_scroll + 100);
    }

    /// Take the input buffer and record it in history
    pub fn submit_input(&mut self) -> Option<String> {
        if self.input_buffer.trim().is_empty() {
            return None;
        }

        let input = std::mem::take(&mut self.input_buffer);
        self.cursor_position = 0;

        if !input.starts_with(':') {
            self.input_history.push_front(input.clone());
            if self.input_history.len() > 100 {
                self.input_history.pop_back();
            }
        }
        self.history_index = None;
        self.saved_input = None;

        Some(input)
    }

    /// Hand a student message to the worker and echo it immediately
    pub fn send_message(&mut self, text: String) {
        if self.waiting {
            self.set_status(BUSY_NOTICE);
            return;
        }

        match self.request_tx.try_send(WorkerRequest::Message(text.clone())) {
            Ok(()) => {
                self.add_entry(text, EntryKind::User);
                self.scroll_to_bottom();
                self.waiting = true;
                self.set_status("Thinking…");
            }
            Err(_) => self.set_status("Companion is unavailable, please restart"),
        }
    }

    /// Ask the worker to clear the conversation
    pub fn request_reset(&mut self) {
        if self.waiting {
            self.set_status("Please wait for the current reply first");
            return;
        }
        if self.request_tx.try_send(WorkerRequest::Reset).is_err() {
            self.set_status("Companion is unavailable, please restart");
        }
    }

    /// Drain worker responses without blocking
    pub fn poll_worker(&mut self) {
        while let Ok(response) = self.response_rx.try_recv() {
            self.apply_response(response);
        }
    }

    /// Apply a single worker response to the display
    pub fn apply_response(&mut self, response: WorkerResponse) {
        match response {
            WorkerResponse::Reply(reply) => {
                self.waiting = false;
                let kind = match reply.kind {
                    ReplyKind::SafetyIntercept => {
                        self.set_status("Support resources are listed on the right");
                        EntryKind::Crisis
                    }
                    ReplyKind::ContentFiltered => {
                        self.clear_status();
                        EntryKind::Notice
                    }
                    ReplyKind::Generated => {
                        self.clear_status();
                        EntryKind::Companion
                    }
                };
                self.add_entry(reply.content, kind);
            }
            WorkerResponse::Failed { notice, detail } => {
                debug!(error = %detail, "reply failed");
                self.waiting = false;
                self.set_status(notice);
                self.add_entry(notice.to_string(), EntryKind::Notice);
            }
            WorkerResponse::ResetDone => {
                self.conversation.clear();
                self.scroll_to_bottom();
                self.greet();
                self.set_status("Conversation cleared");
            }
        }
    }

    /// Handle a typed character (unicode-safe)
    pub fn type_char(&mut self, c: char) {
        let byte_pos = self
            .input_buffer
            .char_indices()
            .nth(self.cursor_position)
            .map(|(i, _)| i)
            .unwrap_or(self.input_buffer.len());
        self.input_buffer.insert(byte_pos, c);
        self.cursor_position += 1;
    }

    /// Handle backspace (unicode-safe)
    pub fn backspace(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
            if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position)
            {
                self.input_buffer
                    .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
            }
        }
    }

    /// Handle delete (unicode-safe)
    pub fn delete(&mut self) {
        if let Some((byte_pos, ch)) = self.input_buffer.char_indices().nth(self.cursor_position) {
            self.input_buffer
                .replace_range(byte_pos..byte_pos + ch.len_utf8(), "");
        }
    }

    pub fn cursor_left(&mut self) {
        self.cursor_position = self.cursor_position.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        let char_count = self.input_buffer.chars().count();
        self.cursor_position = (self.cursor_position + 1).min(char_count);
    }

    pub fn cursor_home(&mut self) {
        self.cursor_position = 0;
    }

    pub fn cursor_end(&mut self) {
        self.cursor_position = self.input_buffer.chars().count();
    }

    /// Navigate to previous input in history
    pub fn history_prev(&mut self) {
        if self.input_history.is_empty() {
            return;
        }

        if self.history_index.is_none() && !self.input_buffer.is_empty() {
            self.saved_input = Some(self.input_buffer.clone());
        }

        let idx = match self.history_index {
            None => 0,
            Some(i) if i + 1 < self.input_history.len() => i + 1,
            Some(i) => i,
        };

        if let Some(entry) = self.input_history.get(idx) {
            self.input_buffer = entry.clone();
            self.cursor_position = self.input_buffer.chars().count();
            self.history_index = Some(idx);
        }
    }

    /// Navigate to next input in history
    pub fn history_next(&mut self) {
        match self.history_index {
            None => {}
            Some(0) => {
                self.input_buffer = self.saved_input.take().unwrap_or_default();
                self.cursor_position = self.input_buffer.chars().count();
                self.history_index = None;
            }
            Some(i) => {
                if let Some(entry) = self.input_history.get(i - 1) {
                    self.input_buffer = entry.clone();
                    self.cursor_position = self.input_buffer.chars().count();
                    self.history_index = Some(i - 1);
                }
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        if matches!(self.overlay, Some(Overlay::Help)) {
            self.overlay = None;
        } else {
            self.overlay = Some(Overlay::Help);
        }
    }

    /// Open the paced breathing overlay
    pub fn start_breathing(&mut self) {
        self.overlay = Some(Overlay::Breathing {
            started: Instant::now(),
        });
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    /// Process a colon command
    pub fn process_command(&mut self, command: &str) -> bool {
        let cmd = command.trim_start_matches(':').trim();

        match cmd {
            "q" | "quit" | "exit" => {
                self.should_quit = true;
                true
            }
            "reset" | "clear" => {
                self.request_reset();
                true
            }
            "breathe" | "b" => {
                self.start_breathing();
                true
            }
            "help" | "h" => {
                self.toggle_help();
                true
            }
            "" => false,
            other => {
                self.set_status(format!("Unknown command: {other}"));
                false
            }
        }
    }

    /// Tick for animations
    pub fn tick(&mut self) {
        self.animation_frame = self.animation_frame.wrapping_add(1);
    }

    /// Set status message (always overwrites)
    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    // =========================================================================
    // Getters for private fields
    // =========================================================================

    pub fn overlay(&self) -> Option<&Overlay> {
        self.overlay.as_ref()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    pub fn input_buffer(&self) -> &str {
        &self.input_buffer
    }

    pub fn cursor_position(&self) -> usize {
        self.cursor_position
    }

    /// Clear the input buffer
    pub fn clear_input(&mut self) {
        self.input_buffer.clear();
        self.cursor_position = 0;
    }
}
