use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::action::Action;
use crate::event::KeyPos;

/// Max number of tap-hold keys held at the same time
pub const TAP_HOLD_MAX_HELD: usize = 8;

/// A tap-hold key waiting for its tap/hold decision
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingTapHold {
    pub pos: KeyPos,
    pub tap: Action,
    pub hold: Action,
    pub deadline: Instant,
}

/// What to do when a tap-hold key is released
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapHoldRelease {
    /// Released before any decision: tap the tap action
    Tap(Action),
    /// Release the hold action
    Hold(Action),
}

/// Tap-hold keys: `LT`, `MT` and `TT`.
///
/// A pending key becomes a hold when the hold timeout elapses or another key is pressed,
/// and a tap when it's released first.
#[derive(Default)]
pub struct TapHoldState {
    pending: Option<PendingTapHold>,
    holding: Vec<(KeyPos, Action), TAP_HOLD_MAX_HELD>,
}

impl TapHoldState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> Option<&PendingTapHold> {
        self.pending.as_ref()
    }

    /// Press of a tap-hold key.
    ///
    /// A key still pending becomes a hold, its hold action is returned to be pressed.
    pub fn press(&mut self, pos: KeyPos, tap: Action, hold: Action, now: Instant, timeout: Duration) -> Option<Action> {
        let settled = self.settle();
        self.pending = Some(PendingTapHold {
            pos,
            tap,
            hold,
            deadline: now + timeout,
        });
        settled
    }

    /// Decide "hold" for the pending key, returns the hold action to press
    pub fn settle(&mut self) -> Option<Action> {
        let pending = self.pending.take()?;
        debug!("Tap-hold at {:?} decided as hold: {:?}", pending.pos, pending.hold);
        if self.holding.push((pending.pos, pending.hold)).is_err() {
            warn!("Too many tap-hold keys held, hold action won't be released");
        }
        Some(pending.hold)
    }

    /// Decide "hold" if the hold timeout elapsed
    pub fn poll(&mut self, now: Instant) -> Option<Action> {
        match self.pending {
            Some(p) if now >= p.deadline => self.settle(),
            _ => None,
        }
    }

    /// Release of the key at `pos`, `None` if it isn't a tap-hold key
    pub fn release(&mut self, pos: KeyPos) -> Option<TapHoldRelease> {
        if let Some(p) = self.pending
            && p.pos == pos
        {
            self.pending = None;
            debug!("Tap-hold at {:?} decided as tap: {:?}", pos, p.tap);
            return Some(TapHoldRelease::Tap(p.tap));
        }
        let idx = self.holding.iter().position(|(p, _)| *p == pos)?;
        let (_, action) = self.holding.swap_remove(idx);
        Some(TapHoldRelease::Hold(action))
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::keycode::HidKeyCode;
    use crate::modifier::ModifierCombination;

    const POS: KeyPos = KeyPos { row: 2, col: 0 };
    const TIMEOUT: Duration = Duration::from_millis(250);

    fn tap() -> Action {
        Action::Key(HidKeyCode::Escape)
    }

    fn hold() -> Action {
        Action::Modifier(ModifierCombination::LSHIFT)
    }

    #[test]
    fn test_release_before_timeout_is_tap() {
        let mut state = TapHoldState::new();
        let t0 = Instant::from_millis(0);
        assert_eq!(state.press(POS, tap(), hold(), t0, TIMEOUT), None);
        assert_eq!(state.poll(t0 + Duration::from_millis(100)), None);
        assert_eq!(state.release(POS), Some(TapHoldRelease::Tap(tap())));
        assert_eq!(state.release(POS), None);
    }

    #[test]
    fn test_timeout_is_hold() {
        let mut state = TapHoldState::new();
        let t0 = Instant::from_millis(0);
        state.press(POS, tap(), hold(), t0, TIMEOUT);
        assert_eq!(state.next_deadline(), Some(t0 + TIMEOUT));
        assert_eq!(state.poll(t0 + TIMEOUT), Some(hold()));
        assert_eq!(state.next_deadline(), None);
        assert_eq!(state.release(POS), Some(TapHoldRelease::Hold(hold())));
    }

    #[test]
    fn test_other_press_is_hold() {
        let mut state = TapHoldState::new();
        let t0 = Instant::from_millis(0);
        state.press(POS, tap(), hold(), t0, TIMEOUT);
        assert_eq!(state.settle(), Some(hold()));
        assert_eq!(state.settle(), None);

        // A second tap-hold key settles the first one
        let other = KeyPos { row: 2, col: 1 };
        let layer = Action::LayerOn(1);
        state.press(other, tap(), layer, t0, TIMEOUT);
        assert_eq!(state.press(POS, tap(), hold(), t0, TIMEOUT), Some(layer));
        assert_eq!(state.pending().map(|p| p.pos), Some(POS));
    }
}
