//! Tap dance: one key, different actions depending on how many times it's tapped.
//!
//! Every press of a tap dance key restarts its tapping term. The gesture ends when the
//! tapping term elapses or when another key is pressed, and exactly one action is emitted.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::action::{Action, DynamicMacroAction, MacroSlot};
use crate::event::KeyPos;

/// Max number of tap dances in the keymap
pub const TAP_DANCE_MAX_NUM: usize = 8;
/// Max number of tap counts a fixed action table can distinguish
pub const TAP_DANCE_MAX_TAP: usize = 4;

/// State of a finished tap dance gesture, passed to the resolver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TapDanceResolution {
    /// Number of presses in the gesture, at least 1
    pub count: u8,
    /// Whether the key is still held when the gesture ends
    pub held: bool,
    /// The dynamic macro slot being recorded, if any
    pub recording: Option<MacroSlot>,
}

pub type TapDanceResolver = fn(&TapDanceResolution) -> Action;

/// How a tap dance picks its action once the gesture is finished
#[derive(Clone, Debug)]
pub enum TapDanceBehavior {
    /// `taps[n - 1]` for `n` taps, clamped to the last entry.
    /// `hold` is used instead when the key is still held and `hold` is not `Action::No`.
    FixedActionTable {
        taps: Vec<Action, TAP_DANCE_MAX_TAP>,
        hold: Action,
    },
    /// The action is computed from the gesture
    CustomResolver(TapDanceResolver),
}

#[derive(Clone, Debug)]
pub struct TapDance {
    pub behavior: TapDanceBehavior,
    pub tapping_term: Duration,
}

impl Default for TapDance {
    fn default() -> Self {
        Self {
            behavior: TapDanceBehavior::FixedActionTable {
                taps: Vec::new(),
                hold: Action::No,
            },
            tapping_term: Duration::from_millis(200),
        }
    }
}

impl TapDance {
    /// First action on a single tap, second action on two taps or more
    pub fn new_double(single: Action, double: Action) -> Self {
        let mut taps = Vec::new();
        taps.push(single).ok();
        taps.push(double).ok();
        Self {
            behavior: TapDanceBehavior::FixedActionTable { taps, hold: Action::No },
            ..Default::default()
        }
    }

    /// Action table indexed by tap count, extra actions beyond [`TAP_DANCE_MAX_TAP`] are dropped
    pub fn new_with_taps(taps: &[Action], hold: Action) -> Self {
        if taps.len() > TAP_DANCE_MAX_TAP {
            warn!("Tap dance supports at most {} taps, ignoring the rest", TAP_DANCE_MAX_TAP);
        }
        let taps = taps.iter().take(TAP_DANCE_MAX_TAP).copied().collect();
        Self {
            behavior: TapDanceBehavior::FixedActionTable { taps, hold },
            ..Default::default()
        }
    }

    pub fn new_custom(resolver: TapDanceResolver) -> Self {
        Self {
            behavior: TapDanceBehavior::CustomResolver(resolver),
            ..Default::default()
        }
    }

    pub fn with_tapping_term(mut self, tapping_term: Duration) -> Self {
        self.tapping_term = tapping_term;
        self
    }

    /// Pick the action of a finished gesture
    pub fn resolve(&self, resolution: &TapDanceResolution) -> Action {
        match &self.behavior {
            TapDanceBehavior::FixedActionTable { taps, hold } => {
                if resolution.held && *hold != Action::No {
                    return *hold;
                }
                let idx = (resolution.count.max(1) as usize).min(taps.len());
                match idx {
                    0 => Action::No,
                    _ => taps[idx - 1],
                }
            }
            TapDanceBehavior::CustomResolver(resolver) => resolver(resolution),
        }
    }
}

/// Resolver of the macro control key.
///
/// While recording, any tap count stops the recording.
/// Otherwise a single tap plays the first slot and more taps start recording it.
pub fn macro_control(resolution: &TapDanceResolution) -> Action {
    let action = if resolution.recording.is_some() {
        DynamicMacroAction::RecordStop
    } else if resolution.count == 1 {
        DynamicMacroAction::Play(MacroSlot::First)
    } else {
        DynamicMacroAction::RecordStart(MacroSlot::First)
    };
    Action::DynamicMacro(action)
}

/// What the keyboard should do after a tap dance state change
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TapDanceOutcome {
    /// Press and release the action
    Tap(Action),
    /// Press the action, it's released together with the tap dance key
    Press(Action),
    /// Release an action previously pressed by [`TapDanceOutcome::Press`]
    Release(Action),
}

#[derive(Clone, Copy, Debug, Default)]
enum TapDanceState {
    #[default]
    Idle,
    Counting {
        pos: KeyPos,
        count: u8,
        held: bool,
        deadline: Instant,
    },
    /// Resolved while the key was held
    Holding { pos: KeyPos, action: Action },
}

pub type TapDanceOutcomes = Vec<TapDanceOutcome, TAP_DANCE_MAX_NUM>;

/// Runtime state of all tap dances
#[derive(Default)]
pub struct TapDanceEngine {
    states: [TapDanceState; TAP_DANCE_MAX_NUM],
}

impl TapDanceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any tap dance is waiting for its gesture to finish
    pub fn is_counting(&self) -> bool {
        self.states
            .iter()
            .any(|s| matches!(s, TapDanceState::Counting { .. }))
    }

    /// Press of tap dance `id`.
    ///
    /// Returns the outcome of a previous gesture that had to be finished first.
    pub fn on_press(
        &mut self,
        defs: &[TapDance],
        id: u8,
        pos: KeyPos,
        now: Instant,
        recording: Option<MacroSlot>,
    ) -> Option<TapDanceOutcome> {
        let idx = id as usize;
        let Some(def) = defs.get(idx).filter(|_| idx < TAP_DANCE_MAX_NUM) else {
            warn!("Tap dance {} is not defined", id);
            return None;
        };
        let mut finished = None;
        let count = match self.states[idx] {
            TapDanceState::Counting { count, deadline, .. } if now < deadline => count.saturating_add(1),
            TapDanceState::Counting { .. } => {
                finished = self.finish(defs, id, recording);
                1
            }
            TapDanceState::Holding { action, .. } => {
                finished = Some(TapDanceOutcome::Release(action));
                1
            }
            TapDanceState::Idle => 1,
        };
        debug!("Tap dance {} pressed, count: {}", id, count);
        self.states[idx] = TapDanceState::Counting {
            pos,
            count,
            held: true,
            deadline: now + def.tapping_term,
        };
        finished
    }

    /// Release of tap dance `id`
    pub fn on_release(&mut self, id: u8) -> Option<TapDanceOutcome> {
        let state = self.states.get_mut(id as usize)?;
        match *state {
            TapDanceState::Counting { ref mut held, .. } => {
                *held = false;
                None
            }
            TapDanceState::Holding { action, .. } => {
                *state = TapDanceState::Idle;
                Some(TapDanceOutcome::Release(action))
            }
            TapDanceState::Idle => None,
        }
    }

    /// Another key at `pos` was pressed: finish every gesture of other keys
    pub fn interrupt(&mut self, defs: &[TapDance], pos: KeyPos, recording: Option<MacroSlot>) -> TapDanceOutcomes {
        let mut outcomes = Vec::new();
        for id in 0..TAP_DANCE_MAX_NUM {
            if let TapDanceState::Counting { pos: td_pos, .. } = self.states[id]
                && td_pos != pos
                && let Some(outcome) = self.finish(defs, id as u8, recording)
            {
                debug!("Tap dance {} interrupted by {:?}", id, pos);
                outcomes.push(outcome).ok();
            }
        }
        outcomes
    }

    /// Finish every gesture whose tapping term elapsed
    pub fn poll(&mut self, defs: &[TapDance], now: Instant, recording: Option<MacroSlot>) -> TapDanceOutcomes {
        let mut outcomes = Vec::new();
        for id in 0..TAP_DANCE_MAX_NUM {
            if let TapDanceState::Counting { deadline, .. } = self.states[id]
                && now >= deadline
                && let Some(outcome) = self.finish(defs, id as u8, recording)
            {
                outcomes.push(outcome).ok();
            }
        }
        outcomes
    }

    /// Earliest tapping term deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.states
            .iter()
            .filter_map(|s| match s {
                TapDanceState::Counting { deadline, .. } => Some(*deadline),
                _ => None,
            })
            .min()
    }

    fn finish(&mut self, defs: &[TapDance], id: u8, recording: Option<MacroSlot>) -> Option<TapDanceOutcome> {
        let idx = id as usize;
        let TapDanceState::Counting { pos, count, held, .. } = self.states[idx] else {
            return None;
        };
        let resolution = TapDanceResolution { count, held, recording };
        let action = defs.get(idx).map(|def| def.resolve(&resolution)).unwrap_or(Action::No);
        debug!("Tap dance {} finished: {:?}, action: {:?}", id, resolution, action);
        if held {
            self.states[idx] = TapDanceState::Holding { pos, action };
            Some(TapDanceOutcome::Press(action))
        } else {
            self.states[idx] = TapDanceState::Idle;
            Some(TapDanceOutcome::Tap(action))
        }
    }
}
