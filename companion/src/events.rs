//! Event handling for the companion TUI

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};

use crate::app::{App, InputMode, BUSY_NOTICE};

/// Result of handling an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventResult {
    Continue,
    Quit,
    NeedsRedraw,
    /// A message was submitted and should go to the worker.
    Submit(String),
}

/// Handle a terminal event
pub fn handle_event(app: &mut App, event: Event) -> EventResult {
    match event {
        Event::Key(key) => handle_key_event(app, key),
        Event::Mouse(mouse) => handle_mouse_event(app, mouse),
        Event::Resize(_, _) => EventResult::NeedsRedraw,
        _ => EventResult::Continue,
    }
}

fn handle_mouse_event(app: &mut App, mouse: MouseEvent) -> EventResult {
    match mouse.kind {
        MouseEventKind::ScrollUp => {
            app.scroll_up(3);
            EventResult::NeedsRedraw
        }
        MouseEventKind::ScrollDown => {
            app.scroll_down(3);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

fn handle_key_event(app: &mut App, key: KeyEvent) -> EventResult {
    if let (KeyCode::Char('c'), KeyModifiers::CONTROL) = (key.code, key.modifiers) {
        return EventResult::Quit;
    }

    if app.has_overlay() {
        return handle_overlay_key(app, key);
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Insert => handle_insert_mode(app, key),
        InputMode::Command => handle_command_mode(app, key),
    }
}

/// Handle keys in NORMAL mode (vim-style navigation and hotkeys)
fn handle_normal_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Char('i') | KeyCode::Char('a') => {
            app.input_mode = InputMode::Insert;
            app.cursor_end();
            EventResult::NeedsRedraw
        }
        KeyCode::Char(':') => {
            app.enter_command_mode();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('?') | KeyCode::F(1) => {
            app.toggle_help();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('b') => {
            app.start_breathing();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('q') => EventResult::Quit,

        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageUp => {
            app.scroll_up(10);
            EventResult::NeedsRedraw
        }
        KeyCode::PageDown => {
            app.scroll_down(10);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('j') | KeyCode::Down => {
            app.scroll_down(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('k') | KeyCode::Up => {
            app.scroll_up(1);
            EventResult::NeedsRedraw
        }
        KeyCode::Char('g') => {
            app.scroll_to_top();
            EventResult::NeedsRedraw
        }
        KeyCode::Char('G') => {
            app.scroll_to_bottom();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle keys in INSERT mode (free text input)
fn handle_insert_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            EventResult::NeedsRedraw
        }
        KeyCode::Enter if app.waiting => {
            // Keep the draft so it can be sent once the reply arrives
            app.set_status(BUSY_NOTICE);
            EventResult::NeedsRedraw
        }
        KeyCode::Enter => match app.submit_input() {
            Some(input) => EventResult::Submit(input),
            None => EventResult::NeedsRedraw,
        },
        KeyCode::Left => {
            app.cursor_left();
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.cursor_right();
            EventResult::NeedsRedraw
        }
        KeyCode::Home => {
            app.cursor_home();
            EventResult::NeedsRedraw
        }
        KeyCode::End => {
            app.cursor_end();
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            app.backspace();
            EventResult::NeedsRedraw
        }
        KeyCode::Delete => {
            app.delete();
            EventResult::NeedsRedraw
        }
        KeyCode::Up => {
            app.history_prev();
            EventResult::NeedsRedraw
        }
        KeyCode::Down => {
            app.history_next();
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c) => {
            app.type_char(c);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Handle keys in COMMAND mode (: commands)
fn handle_command_mode(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            app.clear_input();
            EventResult::NeedsRedraw
        }
        KeyCode::Enter => {
            let command = app.input_buffer().to_string();
            app.clear_input();
            app.input_mode = InputMode::Normal;
            app.process_command(&command);

            if app.should_quit {
                EventResult::Quit
            } else {
                EventResult::NeedsRedraw
            }
        }
        KeyCode::Left => {
            if app.cursor_position() > 1 {
                app.cursor_left();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Right => {
            app.cursor_right();
            EventResult::NeedsRedraw
        }
        KeyCode::Backspace => {
            if app.cursor_position() > 1 {
                app.backspace();
            } else {
                // Backspace on just ":" leaves command mode
                app.input_mode = InputMode::Normal;
                app.clear_input();
            }
            EventResult::NeedsRedraw
        }
        KeyCode::Char(c) => {
            app.type_char(c);
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

/// Any of Esc, q, Enter or space closes an overlay
fn handle_overlay_key(app: &mut App, key: KeyEvent) -> EventResult {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter | KeyCode::Char(' ') => {
            app.close_overlay();
            EventResult::NeedsRedraw
        }
        _ => EventResult::Continue,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::Overlay;
    use crate::worker::{WorkerRequest, WorkerResponse};
    use tokio::sync::mpsc;

    fn app() -> App {
        let (request_tx, _request_rx) = mpsc::channel::<WorkerRequest>(1);
        let (_response_tx, response_rx) = mpsc::channel::<WorkerResponse>(1);
        App::new(request_tx, response_rx)
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn test_insert_and_submit() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Insert);

        for c in "hi there".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)));
        }
        assert_eq!(
            handle_event(&mut app, key(KeyCode::Enter)),
            EventResult::Submit("hi there".into())
        );
        assert_eq!(app.input_buffer(), "");
    }

    #[test]
    fn test_enter_while_waiting_keeps_draft() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char('i')));
        app.waiting = true;
        for c in "are you there".chars() {
            handle_event(&mut app, key(KeyCode::Char(c)));
        }

        assert_eq!(
            handle_event(&mut app, key(KeyCode::Enter)),
            EventResult::NeedsRedraw
        );
        assert_eq!(app.input_buffer(), "are you there");
        assert_eq!(app.status_message(), Some(BUSY_NOTICE));
        assert!(app.input_history.is_empty());

        app.waiting = false;
        assert_eq!(
            handle_event(&mut app, key(KeyCode::Enter)),
            EventResult::Submit("are you there".into())
        );
    }

    #[test]
    fn test_empty_submit_is_ignored() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char('i')));
        assert_eq!(
            handle_event(&mut app, key(KeyCode::Enter)),
            EventResult::NeedsRedraw
        );
    }

    #[test]
    fn test_breathing_overlay_opens_and_closes() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char('b')));
        assert!(matches!(app.overlay(), Some(Overlay::Breathing { .. })));

        // Keys other than the close keys are swallowed by the overlay
        assert_eq!(
            handle_event(&mut app, key(KeyCode::Char('i'))),
            EventResult::Continue
        );
        assert_eq!(app.input_mode, InputMode::Normal);

        handle_event(&mut app, key(KeyCode::Esc));
        assert!(!app.has_overlay());
    }

    #[test]
    fn test_command_mode_quit() {
        let mut app = app();
        handle_event(&mut app, key(KeyCode::Char(':')));
        handle_event(&mut app, key(KeyCode::Char('q')));
        assert_eq!(handle_event(&mut app, key(KeyCode::Enter)), EventResult::Quit);
    }

    #[test]
    fn test_ctrl_c_quits_from_anywhere() {
        let mut app = app();
        app.start_breathing();
        let ev = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(handle_event(&mut app, ev), EventResult::Quit);
    }
}
