//! Dynamic macros: key events recorded at runtime and replayed on demand.
//!
//! Both slots share one event buffer. The first slot grows from the start of the buffer
//! and the second one from its end, so a long recording in one slot leaves less room for
//! the other. Nothing survives a power cycle.

use embassy_time::{Duration, Instant};
use heapless::Vec;

use crate::action::MacroSlot;
use crate::event::HostEvent;
use crate::keycode::HidKeyCode;

/// Number of events shared by the two macro slots
pub const DYNAMIC_MACRO_SIZE: usize = 128;

/// One recorded key event
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MacroEvent {
    pub keycode: HidKeyCode,
    pub pressed: bool,
    /// Time since the previous event of the macro, 0 for the first one.
    ///
    /// Longer gaps are capped at `u16::MAX` ms, about 65 seconds.
    pub delay_ms: u16,
}

impl MacroEvent {
    const EMPTY: Self = Self {
        keycode: HidKeyCode::No,
        pressed: false,
        delay_ms: 0,
    };

    pub fn host_event(&self) -> HostEvent {
        HostEvent {
            keycode: self.keycode,
            pressed: self.pressed,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Recording {
    slot: MacroSlot,
    last_event: Option<Instant>,
}

#[derive(Clone, Copy, Debug)]
struct Playback {
    slot: MacroSlot,
    /// Index of the next event to replay
    index: usize,
    next_at: Instant,
}

/// Recorder and player of the two macro slots
pub struct DynamicMacros {
    buffer: [MacroEvent; DYNAMIC_MACRO_SIZE],
    /// Number of events in each slot
    lens: [usize; 2],
    recording: Option<Recording>,
    playback: Option<Playback>,
}

impl Default for DynamicMacros {
    fn default() -> Self {
        Self::new()
    }
}

impl DynamicMacros {
    pub fn new() -> Self {
        Self {
            buffer: [MacroEvent::EMPTY; DYNAMIC_MACRO_SIZE],
            lens: [0; 2],
            recording: None,
            playback: None,
        }
    }

    /// The slot being recorded, if any
    pub fn recording_slot(&self) -> Option<MacroSlot> {
        self.recording.map(|r| r.slot)
    }

    /// The slot being replayed, if any
    pub fn playing_slot(&self) -> Option<MacroSlot> {
        self.playback.map(|p| p.slot)
    }

    pub fn len(&self, slot: MacroSlot) -> usize {
        self.lens[slot.index()]
    }

    pub fn is_empty(&self, slot: MacroSlot) -> bool {
        self.len(slot) == 0
    }

    /// Position of the `i`-th event of a slot in the shared buffer
    fn buffer_index(slot: MacroSlot, i: usize) -> usize {
        match slot {
            MacroSlot::First => i,
            MacroSlot::Second => DYNAMIC_MACRO_SIZE - 1 - i,
        }
    }

    /// Events of a slot, in recording order
    pub fn events(&self, slot: MacroSlot) -> impl Iterator<Item = MacroEvent> + '_ {
        (0..self.len(slot)).map(move |i| self.buffer[Self::buffer_index(slot, i)])
    }

    /// Clear the slot and record into it.
    ///
    /// Returns `false` and keeps the slot untouched when there's no room left in the buffer,
    /// or when a recording or a replay of the slot is already running.
    pub fn start_recording(&mut self, slot: MacroSlot) -> bool {
        if let Some(recording) = self.recording {
            debug!("Dynamic macro {:?} is already recording", recording.slot);
            return false;
        }
        if self.playing_slot() == Some(slot) {
            debug!("Dynamic macro {:?} is playing, can't record it", slot);
            return false;
        }
        if self.lens[slot.other().index()] >= DYNAMIC_MACRO_SIZE {
            warn!("No room left to record dynamic macro {:?}", slot);
            return false;
        }
        info!("Start recording dynamic macro {:?}", slot);
        self.lens[slot.index()] = 0;
        self.recording = Some(Recording { slot, last_event: None });
        true
    }

    /// Stop the running recording, returns the recorded slot.
    ///
    /// Trailing presses are dropped: those keys are still held to reach the stop key.
    /// A key pressed earlier and still down gets its release appended, if there's room.
    pub fn stop_recording(&mut self) -> Option<MacroSlot> {
        let recording = self.recording.take()?;
        let slot = recording.slot;
        while let Some(last) = self.last_event(slot)
            && last.pressed
        {
            self.lens[slot.index()] -= 1;
        }
        self.release_held_keys(slot);
        info!(
            "Stop recording dynamic macro {:?}, {} events",
            recording.slot,
            self.len(recording.slot)
        );
        Some(recording.slot)
    }

    fn last_event(&self, slot: MacroSlot) -> Option<MacroEvent> {
        let len = self.len(slot);
        (len > 0).then(|| self.buffer[Self::buffer_index(slot, len - 1)])
    }

    /// Append releases of the keys left pressed in a slot
    fn release_held_keys(&mut self, slot: MacroSlot) {
        let mut held: Vec<HidKeyCode, DYNAMIC_MACRO_SIZE> = Vec::new();
        for event in self.events(slot) {
            if event.pressed {
                if !held.contains(&event.keycode) {
                    held.push(event.keycode).ok();
                }
            } else {
                held.retain(|k| *k != event.keycode);
            }
        }
        for keycode in held {
            let release = MacroEvent {
                keycode,
                pressed: false,
                delay_ms: 0,
            };
            if !self.push_event(slot, release) {
                warn!("Dynamic macro buffer is full, {:?} stays pressed in {:?}", keycode, slot);
                break;
            }
        }
    }

    /// Append an event to a slot, returns `false` if the buffer is full
    fn push_event(&mut self, slot: MacroSlot, event: MacroEvent) -> bool {
        if self.lens[0] + self.lens[1] >= DYNAMIC_MACRO_SIZE {
            return false;
        }
        let idx = Self::buffer_index(slot, self.lens[slot.index()]);
        self.buffer[idx] = event;
        self.lens[slot.index()] += 1;
        true
    }

    /// Append an event to the running recording.
    ///
    /// Events that don't fit in the buffer are dropped.
    pub fn record(&mut self, event: HostEvent, now: Instant) {
        let Some(recording) = self.recording.as_mut() else {
            return;
        };
        let delay_ms = recording
            .last_event
            .map(|last| now.saturating_duration_since(last).as_millis().min(u16::MAX as u64) as u16)
            .unwrap_or(0);
        let slot = recording.slot;
        let recorded = MacroEvent {
            keycode: event.keycode,
            pressed: event.pressed,
            delay_ms,
        };
        if self.push_event(slot, recorded) {
            if let Some(recording) = self.recording.as_mut() {
                recording.last_event = Some(now);
            }
        } else {
            warn!("Dynamic macro buffer is full, dropping {:?}", event);
        }
    }

    /// Replay a slot, with its original timing.
    ///
    /// Ignored when the slot is empty or being recorded, or while another replay is running.
    pub fn play(&mut self, slot: MacroSlot, now: Instant) -> bool {
        if self.recording_slot() == Some(slot) {
            debug!("Dynamic macro {:?} is recording, can't play it", slot);
            return false;
        }
        if let Some(playback) = self.playback {
            debug!("Dynamic macro {:?} is already playing", playback.slot);
            return false;
        }
        if self.is_empty(slot) {
            debug!("Dynamic macro {:?} is empty", slot);
            return false;
        }
        info!("Play dynamic macro {:?}", slot);
        self.playback = Some(Playback {
            slot,
            index: 0,
            next_at: now,
        });
        true
    }

    /// Next replayed event that is due at `now`
    pub fn next_playback_event(&mut self, now: Instant) -> Option<HostEvent> {
        let mut playback = self.playback?;
        let event = self.buffer[Self::buffer_index(playback.slot, playback.index)];
        if now < playback.next_at {
            return None;
        }
        playback.index += 1;
        if playback.index >= self.len(playback.slot) {
            debug!("Dynamic macro {:?} finished", playback.slot);
            self.playback = None;
        } else {
            let next = self.buffer[Self::buffer_index(playback.slot, playback.index)];
            playback.next_at += Duration::from_millis(next.delay_ms as u64);
            self.playback = Some(playback);
        }
        Some(event.host_event())
    }

    /// When the next replayed event is due
    pub fn next_deadline(&self) -> Option<Instant> {
        self.playback.map(|p| p.next_at)
    }
}
