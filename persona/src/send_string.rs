//! Fixed strings typed by `Action::SendString`.

use heapless::Vec;

use crate::event::HostEvent;
use crate::keycode::{HidKeyCode, from_ascii};

/// Max number of strings
pub const SEND_STRING_MAX_NUM: usize = 8;
/// Max number of operations in one string
pub const SEND_STRING_MAX_LENGTH: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MacroOperation {
    Tap(HidKeyCode),
    Press(HidKeyCode),
    Release(HidKeyCode),
    Text(HidKeyCode, bool), // bool = shifted
}

pub type MacroSequence = Vec<MacroOperation, SEND_STRING_MAX_LENGTH>;

/// Convert an ascii string into a sequence of `MacroOperation::Text`.
///
/// Characters beyond [`SEND_STRING_MAX_LENGTH`] are dropped.
pub fn to_macro_sequence(text: &str) -> MacroSequence {
    if text.len() > SEND_STRING_MAX_LENGTH {
        warn!("String is longer than {} characters, truncated", SEND_STRING_MAX_LENGTH);
    }
    text.as_bytes()
        .iter()
        .take(SEND_STRING_MAX_LENGTH)
        .map(|character| {
            let (keycode, shifted) = from_ascii(*character);
            MacroOperation::Text(keycode, shifted)
        })
        .collect()
}

/// Append `operations` to a sequence, returns `false` if it doesn't fit
pub fn extend_sequence(sequence: &mut MacroSequence, operations: &[MacroOperation]) -> bool {
    sequence.extend_from_slice(operations).is_ok()
}

/// Turn a sequence into host key events
pub(crate) fn for_each_host_event(sequence: &[MacroOperation], mut f: impl FnMut(HostEvent)) {
    for operation in sequence {
        match *operation {
            MacroOperation::Tap(k) => {
                f(HostEvent::press(k));
                f(HostEvent::release(k));
            }
            MacroOperation::Press(k) => f(HostEvent::press(k)),
            MacroOperation::Release(k) => f(HostEvent::release(k)),
            MacroOperation::Text(HidKeyCode::No, _) => warn!("Unsupported character in string"),
            MacroOperation::Text(k, shifted) => {
                if shifted {
                    f(HostEvent::press(HidKeyCode::LShift));
                }
                f(HostEvent::press(k));
                f(HostEvent::release(k));
                if shifted {
                    f(HostEvent::release(HidKeyCode::LShift));
                }
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_to_macro_sequence() {
        let sequence = to_macro_sequence("l6.X");
        assert_eq!(
            sequence.as_slice(),
            &[
                MacroOperation::Text(HidKeyCode::L, false),
                MacroOperation::Text(HidKeyCode::Kc6, false),
                MacroOperation::Text(HidKeyCode::Dot, false),
                MacroOperation::Text(HidKeyCode::X, true),
            ]
        );
    }

    #[test]
    fn test_host_events() {
        let mut sequence = to_macro_sequence("a!");
        assert!(extend_sequence(&mut sequence, &[MacroOperation::Tap(HidKeyCode::Enter)]));
        let mut events = std::vec::Vec::new();
        for_each_host_event(&sequence, |e| events.push(e));
        assert_eq!(
            events,
            [
                HostEvent::press(HidKeyCode::A),
                HostEvent::release(HidKeyCode::A),
                HostEvent::press(HidKeyCode::LShift),
                HostEvent::press(HidKeyCode::Kc1),
                HostEvent::release(HidKeyCode::Kc1),
                HostEvent::release(HidKeyCode::LShift),
                HostEvent::press(HidKeyCode::Enter),
                HostEvent::release(HidKeyCode::Enter),
            ]
        );
    }

    #[test]
    fn test_too_long() {
        let text = "0123456789".repeat(7);
        assert_eq!(to_macro_sequence(&text).len(), SEND_STRING_MAX_LENGTH);
        let mut sequence = to_macro_sequence(&text);
        assert!(!extend_sequence(&mut sequence, &[MacroOperation::Tap(HidKeyCode::A)]));
    }
}
