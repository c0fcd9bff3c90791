//! Input events delivered to the console.
//!
//! The host maps its native keyboard input to these variants. The console
//! engine never sees raw platform input.

/// A console-level input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleEvent {
    /// Character typed into the input line.
    Char(char),
    /// Backspace / delete-left.
    Backspace,
    /// Execute the current input line.
    Submit,
    /// Replace the input with the next autocomplete suggestion.
    Complete,
    /// Step back through history (Up arrow).
    HistoryPrevious,
    /// Step forward through history (Down arrow).
    HistoryNext,
    /// Empty the output log.
    Clear,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_event_equality() {
        assert_eq!(ConsoleEvent::Char('a'), ConsoleEvent::Char('a'));
        assert_ne!(ConsoleEvent::Char('a'), ConsoleEvent::Char('b'));
    }

    #[test]
    fn events_are_copy() {
        let e = ConsoleEvent::Submit;
        let copy = e;
        assert_eq!(e, copy);
    }
}
