// Live capture from a terminal that reports key releases

use std::io::{self, Write};

use anyhow::bail;
use crossterm::event::{
    self, Event, KeyCode, KeyEventKind, KeyboardEnhancementFlags, ModifierKeyCode,
    PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, supports_keyboard_enhancement};

use keyrec_core::{ascii_to_key, Action, Key, KeyEvent, Shortcut, ShortcutRecorder};

/// Translate a terminal key code into a recorder key identifier
pub fn terminal_key(code: KeyCode) -> Option<Key> {
    let name = match code {
        KeyCode::Char(c) => return ascii_to_key(c),
        KeyCode::F(n) => return Some(Key::new(format!("F{}", n))),
        KeyCode::Modifier(modifier) => return modifier_key(modifier),
        KeyCode::Backspace => "Backspace",
        KeyCode::Enter => "Enter",
        KeyCode::Left => "ArrowLeft",
        KeyCode::Right => "ArrowRight",
        KeyCode::Up => "ArrowUp",
        KeyCode::Down => "ArrowDown",
        KeyCode::Home => "Home",
        KeyCode::End => "End",
        KeyCode::PageUp => "PageUp",
        KeyCode::PageDown => "PageDown",
        KeyCode::Tab | KeyCode::BackTab => "Tab",
        KeyCode::Delete => "Delete",
        KeyCode::Insert => "Insert",
        KeyCode::Esc => "Escape",
        KeyCode::CapsLock => "CapsLock",
        KeyCode::ScrollLock => "ScrollLock",
        KeyCode::NumLock => "NumLock",
        KeyCode::PrintScreen => "PrintScreen",
        KeyCode::Pause => "Pause",
        KeyCode::Menu => "ContextMenu",
        _ => return None,
    };
    Some(Key::new(name))
}

fn modifier_key(modifier: ModifierKeyCode) -> Option<Key> {
    let name = match modifier {
        ModifierKeyCode::LeftShift => "ShiftLeft",
        ModifierKeyCode::RightShift => "ShiftRight",
        ModifierKeyCode::LeftControl => "ControlLeft",
        ModifierKeyCode::RightControl => "ControlRight",
        ModifierKeyCode::LeftAlt => "AltLeft",
        ModifierKeyCode::RightAlt => "AltRight",
        ModifierKeyCode::LeftSuper | ModifierKeyCode::LeftMeta => "MetaLeft",
        ModifierKeyCode::RightSuper | ModifierKeyCode::RightMeta => "MetaRight",
        _ => return None,
    };
    Some(Key::new(name))
}

fn terminal_action(kind: KeyEventKind) -> Action {
    match kind {
        KeyEventKind::Press => Action::Press,
        KeyEventKind::Repeat => Action::Repeat,
        KeyEventKind::Release => Action::Release,
    }
}

/// Record one shortcut from the terminal. Returns the saved shortcut, empty
/// when the session was cancelled with Escape.
pub fn record(recorder: &mut ShortcutRecorder) -> anyhow::Result<Shortcut> {
    if !supports_keyboard_enhancement()? {
        bail!("this terminal does not report key releases; use --trace instead");
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    let result = with_enhanced_keyboard(&mut stdout, |out| capture(recorder, out));

    // Raw mode is dropped even when the terminal rejected the flags
    let restored = disable_raw_mode();
    let saved = result?;
    restored?;
    Ok(saved)
}

fn with_enhanced_keyboard<W, F>(out: &mut W, run: F) -> anyhow::Result<Shortcut>
where
    W: Write,
    F: FnOnce(&mut W) -> anyhow::Result<Shortcut>,
{
    execute!(
        out,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
        )
    )?;
    let result = run(out);
    let popped = execute!(out, PopKeyboardEnhancementFlags);
    let saved = result?;
    popped?;
    Ok(saved)
}

fn capture(recorder: &mut ShortcutRecorder, out: &mut impl Write) -> anyhow::Result<Shortcut> {
    write!(out, "Press a shortcut (Escape cancels)\r\n")?;
    out.flush()?;
    recorder.start_recording();

    let mut shown = String::new();
    while recorder.is_recording() {
        let Event::Key(key_event) = event::read()? else {
            continue;
        };
        let Some(key) = terminal_key(key_event.code) else {
            log::debug!("Ignoring unmapped terminal key {:?}", key_event.code);
            continue;
        };
        recorder.handle_event(&KeyEvent::new(key, terminal_action(key_event.kind)));

        let line = if recorder.error().is_none() {
            recorder.shortcut().comparison_key()
        } else {
            format!("{}  ({})", recorder.shortcut(), recorder.error().message())
        };
        if line != shown && recorder.is_recording() {
            write!(out, "\r\x1b[2K{}", line)?;
            out.flush()?;
            shown = line;
        }
    }
    write!(out, "\r\x1b[2K")?;
    out.flush()?;

    Ok(recorder.saved_shortcut().clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_key_mapping() {
        assert_eq!(terminal_key(KeyCode::Char('a')), Some(Key::from("KeyA")));
        assert_eq!(terminal_key(KeyCode::Char(' ')), Some(Key::from("Space")));
        assert_eq!(terminal_key(KeyCode::F(5)), Some(Key::from("F5")));
        assert_eq!(terminal_key(KeyCode::Esc), Some(Key::from("Escape")));
        assert_eq!(terminal_key(KeyCode::Up), Some(Key::from("ArrowUp")));
        assert_eq!(terminal_key(KeyCode::Null), None);
    }

    #[test]
    fn test_terminal_modifier_mapping() {
        assert_eq!(
            terminal_key(KeyCode::Modifier(ModifierKeyCode::LeftControl)),
            Some(Key::from("ControlLeft"))
        );
        assert_eq!(
            terminal_key(KeyCode::Modifier(ModifierKeyCode::RightSuper)),
            Some(Key::from("MetaRight"))
        );
        assert_eq!(
            terminal_key(KeyCode::Modifier(ModifierKeyCode::IsoLevel3Shift)),
            None
        );
    }

    struct BrokenTerminal;

    impl Write for BrokenTerminal {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_enhancement_flags_popped_after_capture_error() {
        let mut out = Vec::new();
        let result = with_enhanced_keyboard(&mut out, |_| anyhow::bail!("read failed"));
        assert!(result.is_err());
        assert!(out.ends_with(b"\x1b[<1u"));
    }

    #[test]
    fn test_capture_skipped_when_flags_rejected() {
        let mut ran = false;
        let result = with_enhanced_keyboard(&mut BrokenTerminal, |_| {
            ran = true;
            Ok(Shortcut::new())
        });
        assert!(result.is_err());
        assert!(!ran);
    }

    #[test]
    fn test_terminal_action() {
        assert_eq!(terminal_action(KeyEventKind::Press), Action::Press);
        assert_eq!(terminal_action(KeyEventKind::Repeat), Action::Repeat);
        assert_eq!(terminal_action(KeyEventKind::Release), Action::Release);
    }
}
