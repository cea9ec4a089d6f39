//! Key handling for the chat screen.
//!
//! [`handle_key`] edits the [`Screen`] in place for purely local actions
//! (typing, scrolling, answering a confirmation) and reports anything that
//! needs the chat client as a [`KeyOutcome`].

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tui_textarea::Input as TAInput;

use crate::core::client::classify_input;
use crate::ui::terminal_view::Screen;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOutcome {
    None,
    Quit,
    Send(String),
    ToggleSettings,
    ClearMemory,
}

fn is_ctrl(key: &KeyEvent, ch: char) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char(ch)
}

fn handle_confirm_key(screen: &mut Screen, key: &KeyEvent) {
    let answer = match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => true,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => false,
        _ => return,
    };
    if let Some(pending) = screen.confirm.take() {
        pending.answer(answer);
    }
}

fn handle_scroll_key(screen: &mut Screen, key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Up => screen.scroll_up(1),
        KeyCode::Down => screen.scroll_down(1),
        KeyCode::PageUp => screen.scroll_up(screen.page_rows()),
        KeyCode::PageDown => screen.scroll_down(screen.page_rows()),
        _ => return false,
    }
    true
}

pub fn handle_key(screen: &mut Screen, key: KeyEvent) -> KeyOutcome {
    if is_ctrl(&key, 'c') {
        return KeyOutcome::Quit;
    }

    if screen.confirm.is_some() {
        handle_confirm_key(screen, &key);
        return KeyOutcome::None;
    }

    screen.alert = None;

    if is_ctrl(&key, 's') {
        return KeyOutcome::ToggleSettings;
    }
    if handle_scroll_key(screen, &key) {
        return KeyOutcome::None;
    }

    if screen.settings_visible {
        return match key.code {
            KeyCode::Esc => KeyOutcome::ToggleSettings,
            KeyCode::Char('c') if screen.clear_control_enabled => KeyOutcome::ClearMemory,
            _ => KeyOutcome::None,
        };
    }

    if !screen.input_enabled {
        return KeyOutcome::None;
    }

    match key.code {
        KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
            screen.input.insert_newline();
            KeyOutcome::None
        }
        KeyCode::Enter => {
            let text = screen.input_text();
            // Invalid input stays in the box, like a send button that does nothing.
            if classify_input(&text).is_none() {
                return KeyOutcome::None;
            }
            // Gate locally until the client takes over, so a second Enter
            // cannot send the same text twice.
            screen.input_enabled = false;
            screen.clear_input();
            KeyOutcome::Send(text)
        }
        _ => {
            screen.input.input(TAInput::from(key));
            KeyOutcome::None
        }
    }
}

/// Bracketed paste goes straight into the edit buffer.
pub fn handle_paste(screen: &mut Screen, text: &str) {
    if screen.input_enabled && screen.confirm.is_none() && !screen.settings_visible {
        screen
            .input
            .insert_str(text.replace("\r\n", "\n").replace('\r', "\n"));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::terminal_view::PendingConfirm;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    fn screen() -> Screen {
        Screen::new("http://127.0.0.1:5000")
    }

    fn type_text(screen: &mut Screen, text: &str) {
        for ch in text.chars() {
            assert_eq!(handle_key(screen, key(KeyCode::Char(ch))), KeyOutcome::None);
        }
    }

    #[test]
    fn enter_sends_the_buffer() {
        let mut screen = screen();
        type_text(&mut screen, "hello");

        assert_eq!(
            handle_key(&mut screen, key(KeyCode::Enter)),
            KeyOutcome::Send("hello".to_string())
        );
        assert!(screen.input_is_empty());
        assert!(!screen.input_enabled);
        assert_eq!(handle_key(&mut screen, key(KeyCode::Enter)), KeyOutcome::None);
    }

    #[test]
    fn cursor_keys_edit_mid_line() {
        let mut screen = screen();
        type_text(&mut screen, "日本");
        handle_key(&mut screen, key(KeyCode::Left));
        type_text(&mut screen, "x");
        handle_key(&mut screen, key(KeyCode::Home));
        type_text(&mut screen, ">");
        handle_key(&mut screen, key(KeyCode::End));
        handle_key(&mut screen, key(KeyCode::Backspace));

        assert_eq!(screen.input_text(), ">日x");
        assert_eq!(
            handle_key(&mut screen, key(KeyCode::Enter)),
            KeyOutcome::Send(">日x".to_string())
        );
    }

    #[test]
    fn alt_enter_inserts_a_newline() {
        let mut screen = screen();
        type_text(&mut screen, "a");
        handle_key(&mut screen, with(KeyCode::Enter, KeyModifiers::ALT));
        type_text(&mut screen, "b");

        assert_eq!(screen.input_text(), "a\nb");
        assert_eq!(screen.input.cursor(), (1, 1));
    }

    #[test]
    fn enter_ignores_blank_and_bare_image_command() {
        let mut screen = screen();
        type_text(&mut screen, "   ");
        assert_eq!(handle_key(&mut screen, key(KeyCode::Enter)), KeyOutcome::None);

        screen.set_input("/imagine ");
        assert_eq!(handle_key(&mut screen, key(KeyCode::Enter)), KeyOutcome::None);
        assert_eq!(screen.input_text(), "/imagine ");
    }

    #[test]
    fn disabled_input_swallows_editing_but_not_scrolling() {
        let mut screen = screen();
        screen.input_enabled = false;
        screen.max_scroll = 5;
        screen.scroll_offset = 5;

        type_text(&mut screen, "x");
        assert!(screen.input_is_empty());
        assert_eq!(handle_key(&mut screen, key(KeyCode::Up)), KeyOutcome::None);
        assert_eq!(screen.scroll_offset, 4);
    }

    #[test]
    fn settings_panel_keys() {
        let mut screen = screen();
        assert_eq!(
            handle_key(&mut screen, with(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            KeyOutcome::ToggleSettings
        );

        screen.settings_visible = true;
        assert_eq!(
            handle_key(&mut screen, key(KeyCode::Char('c'))),
            KeyOutcome::ClearMemory
        );
        assert_eq!(handle_key(&mut screen, key(KeyCode::Esc)), KeyOutcome::ToggleSettings);

        screen.clear_control_enabled = false;
        assert_eq!(handle_key(&mut screen, key(KeyCode::Char('c'))), KeyOutcome::None);
        assert!(screen.input_is_empty());
    }

    #[tokio::test]
    async fn confirmation_keys_answer_the_pending_question() {
        let mut screen = screen();
        let (reply, answer) = tokio::sync::oneshot::channel();
        screen.confirm = Some(PendingConfirm::new("Erase?", reply));

        assert_eq!(handle_key(&mut screen, key(KeyCode::Char('x'))), KeyOutcome::None);
        assert!(screen.confirm.is_some());
        handle_key(&mut screen, key(KeyCode::Char('y')));

        assert!(screen.confirm.is_none());
        assert!(answer.await.unwrap());
    }

    #[test]
    fn ctrl_c_quits_from_anywhere() {
        let mut screen = screen();
        screen.settings_visible = true;
        screen.input_enabled = false;
        assert_eq!(
            handle_key(&mut screen, with(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            KeyOutcome::Quit
        );
    }

    #[test]
    fn any_key_dismisses_the_alert() {
        let mut screen = screen();
        screen.alert = Some("Failed to clear memory: refused".to_string());
        handle_key(&mut screen, key(KeyCode::Char('a')));
        assert!(screen.alert.is_none());
    }

    #[test]
    fn paste_normalizes_line_endings() {
        let mut screen = screen();
        handle_paste(&mut screen, "one\r\ntwo\rthree");
        assert_eq!(screen.input_text(), "one\ntwo\nthree");
        assert_eq!(screen.input.cursor(), (2, 5));
    }
}
