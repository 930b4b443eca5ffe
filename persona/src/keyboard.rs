use embassy_time::Instant;
use heapless::{Deque, Vec};

use crate::action::{Action, DynamicMacroAction, KeyAction};
use crate::config::BehaviorConfig;
use crate::dynamic_macro::DynamicMacros;
use crate::error::PersonaError;
use crate::event::{HostEvent, KeyPos, KeyboardEvent};
use crate::indicator::{IndicatorOutput, compute_indicators};
use crate::keymap::{KeyMap, LayerState};
use crate::leader::{LEADER_MAX_LENGTH, Leader, LeaderOutcome};
use crate::led_indicator::LedIndicator;
use crate::modifier::ModifierCombination;
use crate::one_shot::OneShot;
use crate::send_string::for_each_host_event;
use crate::tap_dance::{TapDanceEngine, TapDanceOutcome};
use crate::tap_hold::{TapHoldRelease, TapHoldState};

/// Max number of host events waiting to be reported
pub const HOST_EVENT_QUEUE_SIZE: usize = 256;

/// The keyboard personality.
///
/// Takes key events and timer ticks, and produces host key events and indicator updates.
/// Nothing here blocks: time is always passed in by the caller, and every pending
/// decision has a deadline reported by [`Keyboard::next_deadline`].
pub struct Keyboard<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> {
    /// Keymap
    keymap: KeyMap<'a, ROW, COL, NUM_LAYER>,

    /// Active layers
    layer_state: LayerState,

    /// Options for configurable action behavior
    behavior: BehaviorConfig,

    tap_dances: TapDanceEngine,

    tap_hold: TapHoldState,

    /// One shot modifier state
    osm: OneShot<ModifierCombination>,

    /// One shot layer state
    osl: OneShot<u8>,

    leader: Leader,

    /// Keys typed in a leader session, their release is swallowed
    leader_consumed: Vec<KeyPos, LEADER_MAX_LENGTH>,

    macros: DynamicMacros,

    /// Lock state reported by the host
    lock_state: LedIndicator,

    /// What the indicator LEDs should show
    indicator: IndicatorOutput,
    indicator_changed: bool,

    /// Key events for the host, in order
    host_events: Deque<HostEvent, HOST_EVENT_QUEUE_SIZE>,
}

impl<'a, const ROW: usize, const COL: usize, const NUM_LAYER: usize> Keyboard<'a, ROW, COL, NUM_LAYER> {
    /// Create the keyboard, checking that every tap dance key refers to a defined tap dance
    pub fn new(keymap: KeyMap<'a, ROW, COL, NUM_LAYER>, behavior: BehaviorConfig) -> Result<Self, PersonaError> {
        let defined = behavior.tap_dance.tap_dances.len();
        for action in keymap.actions() {
            if let KeyAction::TapDance(index) = *action
                && index as usize >= defined
            {
                return Err(PersonaError::TapDanceOutOfRange { index, defined });
            }
        }

        let layer_state = LayerState::new();
        let lock_state = LedIndicator::new();
        let indicator = compute_indicators(&behavior.indicator, &layer_state, lock_state, false);
        Ok(Self {
            keymap,
            layer_state,
            behavior,
            tap_dances: TapDanceEngine::new(),
            tap_hold: TapHoldState::new(),
            osm: OneShot::new(),
            osl: OneShot::new(),
            leader: Leader::new(),
            leader_consumed: Vec::new(),
            macros: DynamicMacros::new(),
            lock_state,
            indicator,
            // The LEDs are written once at startup
            indicator_changed: true,
            host_events: Deque::new(),
        })
    }

    pub fn layer_state(&self) -> LayerState {
        self.layer_state
    }

    pub fn keymap(&self) -> &KeyMap<'a, ROW, COL, NUM_LAYER> {
        &self.keymap
    }

    pub fn behavior(&self) -> &BehaviorConfig {
        &self.behavior
    }

    pub fn leader(&self) -> &Leader {
        &self.leader
    }

    pub fn macros(&self) -> &DynamicMacros {
        &self.macros
    }

    pub fn lock_state(&self) -> LedIndicator {
        self.lock_state
    }

    /// The host reported a new lock state
    pub fn set_lock_state(&mut self, leds: LedIndicator) {
        self.lock_state = leds;
        self.refresh_indicator();
    }

    pub fn indicator(&self) -> IndicatorOutput {
        self.indicator
    }

    /// The indicator output, if it changed since the last call
    pub fn take_indicator_update(&mut self) -> Option<IndicatorOutput> {
        if self.indicator_changed {
            self.indicator_changed = false;
            Some(self.indicator)
        } else {
            None
        }
    }

    /// Next host event to report
    pub fn next_host_event(&mut self) -> Option<HostEvent> {
        self.host_events.pop_front()
    }

    /// Earliest time at which [`Keyboard::tick`] has something to do
    pub fn next_deadline(&self) -> Option<Instant> {
        [
            self.tap_dances.next_deadline(),
            self.tap_hold.next_deadline(),
            self.osm.next_deadline(),
            self.osl.next_deadline(),
            self.leader.next_deadline(),
            self.macros.next_deadline(),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Handle expired timers and play due macro events
    pub fn tick(&mut self, now: Instant) {
        self.process_timers(now);
        if let Some(output) = self.leader.poll(now, &self.behavior.leader) {
            self.tap_action(output, now);
        }
        self.play_macro_events(now);
        self.refresh_indicator();
    }

    /// Process a key event from the matrix
    pub fn process_event(&mut self, event: KeyboardEvent, now: Instant) {
        // An expired leader session is handled by the leader itself:
        // a key typed after the deadline aborts the session instead of completing it.
        self.process_timers(now);
        self.play_macro_events(now);

        if event.pressed {
            // Any other key finishes pending tap dances and tap-hold keys,
            // so that the layers they activate apply to this key.
            let recording = self.macros.recording_slot();
            let outcomes = self
                .tap_dances
                .interrupt(&self.behavior.tap_dance.tap_dances, event.pos, recording);
            for outcome in outcomes {
                self.process_tap_dance_outcome(outcome, now);
            }
            if let Some(pending) = self.tap_hold.pending()
                && pending.pos != event.pos
                && let Some(hold) = self.tap_hold.settle()
            {
                self.process_action(hold, true, now);
            }
        }

        let key_action = self.keymap.action_with_layer_cache(event, &self.layer_state);
        debug!("Key {:?} pressed: {}, action: {:?}", event.pos, event.pressed, key_action);

        if self.process_leader(key_action, event, now) {
            self.refresh_indicator();
            return;
        }

        if event.pressed {
            self.update_one_shots_on_press(key_action);
        }

        self.process_key_action(key_action, event, now);

        if !event.pressed {
            self.update_one_shots_on_release(key_action, now);
        }

        self.refresh_indicator();
    }

    /// Feed the leader session, returns `true` if the event is consumed
    fn process_leader(&mut self, key_action: KeyAction, event: KeyboardEvent, now: Instant) -> bool {
        if !event.pressed {
            if let Some(idx) = self.leader_consumed.iter().position(|p| *p == event.pos) {
                self.leader_consumed.swap_remove(idx);
                return true;
            }
            return false;
        }

        if !self.leader.is_active() {
            return false;
        }

        if key_action == KeyAction::Single(Action::Leader) {
            // The leader key ends the sequence early
            if let Some(output) = self.leader.end_at(now, &self.behavior.leader) {
                self.tap_action(output, now);
            }
            return true;
        }

        // Only keys with a keycode can be part of a sequence
        let Some(keycode) = key_action.tap_keycode() else {
            return false;
        };
        match self.leader.feed(keycode, now, &self.behavior.leader) {
            LeaderOutcome::Buffered => {
                self.consume_for_leader(event.pos);
                true
            }
            LeaderOutcome::Finished(output) => {
                self.consume_for_leader(event.pos);
                if let Some(output) = output {
                    self.tap_action(output, now);
                }
                true
            }
            LeaderOutcome::Expired => false,
        }
    }

    fn consume_for_leader(&mut self, pos: KeyPos) {
        if self.leader_consumed.push(pos).is_err() {
            warn!("Too many keys held in leader sequence, release of {:?} won't be swallowed", pos);
        }
    }

    fn process_key_action(&mut self, key_action: KeyAction, event: KeyboardEvent, now: Instant) {
        match key_action {
            KeyAction::No | KeyAction::Transparent => (),
            KeyAction::Single(action) => self.process_action(action, event.pressed, now),
            KeyAction::OneShot(action) => self.process_key_action_oneshot(action, event.pressed, now),
            KeyAction::TapHold(tap, hold) => self.process_key_action_tap_hold(tap, hold, event, now),
            KeyAction::TapDance(id) => self.process_key_action_tap_dance(id, event, now),
        }
    }

    fn process_key_action_tap_hold(&mut self, tap: Action, hold: Action, event: KeyboardEvent, now: Instant) {
        if event.pressed {
            let timeout = self.behavior.tap_hold.hold_timeout;
            if let Some(settled) = self.tap_hold.press(event.pos, tap, hold, now, timeout) {
                self.process_action(settled, true, now);
            }
        } else {
            match self.tap_hold.release(event.pos) {
                Some(TapHoldRelease::Tap(action)) => self.tap_action(action, now),
                Some(TapHoldRelease::Hold(action)) => self.process_action(action, false, now),
                None => (),
            }
        }
    }

    fn process_key_action_tap_dance(&mut self, id: u8, event: KeyboardEvent, now: Instant) {
        let outcome = if event.pressed {
            let recording = self.macros.recording_slot();
            self.tap_dances
                .on_press(&self.behavior.tap_dance.tap_dances, id, event.pos, now, recording)
        } else {
            self.tap_dances.on_release(id)
        };
        if let Some(outcome) = outcome {
            self.process_tap_dance_outcome(outcome, now);
        }
    }

    fn process_tap_dance_outcome(&mut self, outcome: TapDanceOutcome, now: Instant) {
        match outcome {
            TapDanceOutcome::Tap(action) => self.tap_action(action, now),
            TapDanceOutcome::Press(action) => self.process_action(action, true, now),
            TapDanceOutcome::Release(action) => self.process_action(action, false, now),
        }
    }

    fn process_key_action_oneshot(&mut self, action: Action, pressed: bool, now: Instant) {
        match action {
            Action::Modifier(m) => self.process_action_osm(m, pressed, now),
            Action::LayerOn(l) => self.process_action_osl(l, pressed, now),
            _ => self.process_action(action, pressed, now),
        }
    }

    fn process_action_osm(&mut self, modifiers: ModifierCombination, pressed: bool, now: Instant) {
        if pressed {
            // Add new modifier combination to existing one shot
            let merged = self.osm.value().map_or(modifiers, |m| m | modifiers);
            self.osm.press(merged);
            self.process_modifiers(modifiers, true, now);
        } else if let Some(m) = self.osm.release(now, self.behavior.one_shot.timeout) {
            self.process_modifiers(m, false, now);
        }
    }

    fn process_action_osl(&mut self, layer_num: u8, pressed: bool, now: Instant) {
        if pressed {
            // Deactivate old layer if any
            if let Some(l) = self.osl.value() {
                self.keymap.deactivate_layer(&mut self.layer_state, l);
            }
            self.osl.press(layer_num);
            self.keymap.activate_layer(&mut self.layer_state, layer_num);
        } else if let Some(l) = self.osl.release(now, self.behavior.one_shot.timeout) {
            self.keymap.deactivate_layer(&mut self.layer_state, l);
        }
    }

    fn update_one_shots_on_press(&mut self, key_action: KeyAction) {
        match key_action {
            KeyAction::OneShot(Action::Modifier(_)) => self.osl.other_pressed(),
            KeyAction::OneShot(Action::LayerOn(_)) => self.osm.other_pressed(),
            _ => {
                self.osm.other_pressed();
                self.osl.other_pressed();
            }
        }
    }

    fn update_one_shots_on_release(&mut self, key_action: KeyAction, now: Instant) {
        if matches!(key_action, KeyAction::OneShot(_)) {
            return;
        }
        if let Some(m) = self.osm.other_released() {
            self.process_modifiers(m, false, now);
        }
        if let Some(l) = self.osl.other_released() {
            self.keymap.deactivate_layer(&mut self.layer_state, l);
        }
    }

    /// Press and release an action
    fn tap_action(&mut self, action: Action, now: Instant) {
        self.process_action(action, true, now);
        self.process_action(action, false, now);
    }

    fn process_action(&mut self, action: Action, pressed: bool, now: Instant) {
        match action {
            Action::No => (),
            Action::Key(key) => self.emit(HostEvent { keycode: key, pressed }, now),
            Action::Modifier(m) => self.process_modifiers(m, pressed, now),
            Action::KeyWithModifier(key, m) => {
                if pressed {
                    self.process_modifiers(m, true, now);
                    self.emit(HostEvent::press(key), now);
                } else {
                    self.emit(HostEvent::release(key), now);
                    self.process_modifiers(m, false, now);
                }
            }
            Action::LayerOn(layer_num) => {
                if pressed {
                    self.keymap.activate_layer(&mut self.layer_state, layer_num);
                } else {
                    self.keymap.deactivate_layer(&mut self.layer_state, layer_num);
                }
            }
            Action::LayerToggle(layer_num) => {
                // Toggle on release
                if !pressed {
                    self.keymap.toggle_layer(&mut self.layer_state, layer_num);
                }
            }
            Action::LayerToggleOnly(layer_num) => {
                if pressed {
                    self.layer_state.clear();
                    self.keymap.activate_layer(&mut self.layer_state, layer_num);
                }
            }
            Action::Leader => {
                if pressed {
                    if self.leader.is_active() {
                        if let Some(output) = self.leader.end_at(now, &self.behavior.leader) {
                            self.tap_action(output, now);
                        }
                    } else {
                        self.leader.start(now, &self.behavior.leader);
                    }
                }
            }
            Action::SendString(index) => {
                if pressed {
                    self.send_string(index, now);
                }
            }
            Action::DynamicMacro(macro_action) => {
                if pressed {
                    self.process_dynamic_macro(macro_action, now);
                }
            }
        }
    }

    fn process_modifiers(&mut self, modifiers: ModifierCombination, pressed: bool, now: Instant) {
        let (keycodes, n) = modifiers.to_modifier_keycodes();
        for keycode in &keycodes[..n] {
            self.emit(HostEvent { keycode: *keycode, pressed }, now);
        }
    }

    fn send_string(&mut self, index: u8, now: Instant) {
        let Some(sequence) = self.behavior.strings.strings.get(index as usize).cloned() else {
            warn!("String {} is not defined", index);
            return;
        };
        for_each_host_event(&sequence, |event| self.emit(event, now));
    }

    fn process_dynamic_macro(&mut self, macro_action: DynamicMacroAction, now: Instant) {
        match macro_action {
            DynamicMacroAction::RecordStart(slot) => {
                self.macros.start_recording(slot);
            }
            DynamicMacroAction::RecordStop => {
                self.macros.stop_recording();
            }
            DynamicMacroAction::Play(slot) => {
                if self.macros.play(slot, now) {
                    self.play_macro_events(now);
                }
            }
        }
        // The recording indicator follows the recorder immediately
        self.refresh_indicator();
    }

    fn process_timers(&mut self, now: Instant) {
        let recording = self.macros.recording_slot();
        let outcomes = self
            .tap_dances
            .poll(&self.behavior.tap_dance.tap_dances, now, recording);
        for outcome in outcomes {
            self.process_tap_dance_outcome(outcome, now);
        }
        if let Some(hold) = self.tap_hold.poll(now) {
            self.process_action(hold, true, now);
        }
        if let Some(m) = self.osm.poll(now) {
            self.process_modifiers(m, false, now);
        }
        if let Some(l) = self.osl.poll(now) {
            self.keymap.deactivate_layer(&mut self.layer_state, l);
        }
    }

    /// Replayed events go straight to the host, they're never recorded again
    fn play_macro_events(&mut self, now: Instant) {
        while let Some(event) = self.macros.next_playback_event(now) {
            self.push_host_event(event);
        }
    }

    /// Send a key event to the host, recording it if a macro is being recorded
    fn emit(&mut self, event: HostEvent, now: Instant) {
        if self.macros.recording_slot().is_some() {
            self.macros.record(event, now);
        }
        self.push_host_event(event);
    }

    fn push_host_event(&mut self, event: HostEvent) {
        if self.host_events.push_back(event).is_err() {
            warn!("Host event queue is full, dropping {:?}", event);
        }
    }

    fn refresh_indicator(&mut self) {
        let output = compute_indicators(
            &self.behavior.indicator,
            &self.layer_state,
            self.lock_state,
            self.macros.recording_slot().is_some(),
        );
        if output != self.indicator {
            self.indicator = output;
            self.indicator_changed = true;
        }
    }
}
