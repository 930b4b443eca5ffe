//! Leader key: after the leader key, a short key sequence triggers an action.

use embassy_time::Instant;
use heapless::Vec;

use crate::action::Action;
use crate::config::LeaderConfig;
use crate::keycode::HidKeyCode;

/// Max number of leader sequences
pub const LEADER_MAX_SEQUENCES: usize = 16;
/// Max number of keys in a leader sequence
pub const LEADER_MAX_LENGTH: usize = 5;

/// Leader sequence, typed after the leader key
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LeaderSequence {
    pub keys: Vec<HidKeyCode, LEADER_MAX_LENGTH>,
    pub output: Action,
}

impl LeaderSequence {
    /// Keys beyond [`LEADER_MAX_LENGTH`] are ignored
    pub fn new(keys: &[HidKeyCode], output: Action) -> Self {
        if keys.len() > LEADER_MAX_LENGTH {
            warn!("Leader sequence longer than {} keys, truncated", LEADER_MAX_LENGTH);
        }
        Self {
            keys: keys.iter().take(LEADER_MAX_LENGTH).copied().collect(),
            output,
        }
    }

    pub fn one_key(key: HidKeyCode, output: Action) -> Self {
        Self::new(&[key], output)
    }
}

/// Find the first sequence that exactly matches the typed keys
pub fn match_sequence(sequences: &[LeaderSequence], keys: &[HidKeyCode]) -> Option<Action> {
    sequences.iter().find(|s| s.keys.as_slice() == keys).map(|s| s.output)
}

/// Result of a key typed in a leader session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LeaderOutcome {
    /// The key is part of the sequence
    Buffered,
    /// The session timed out before the key, the key isn't part of the sequence
    Expired,
    /// The session is over, with the matched output if any
    Finished(Option<Action>),
}

#[derive(Clone, Debug)]
struct LeaderSession {
    keys: Vec<HidKeyCode, LEADER_MAX_LENGTH>,
    deadline: Instant,
}

/// Leader session state
#[derive(Default)]
pub struct Leader {
    session: Option<LeaderSession>,
}

impl Leader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Keys typed so far in the current session
    pub fn keys(&self) -> &[HidKeyCode] {
        self.session.as_ref().map(|s| s.keys.as_slice()).unwrap_or(&[])
    }

    /// Start a session with an empty buffer
    pub fn start(&mut self, now: Instant, config: &LeaderConfig) {
        debug!("Leader session started");
        self.session = Some(LeaderSession {
            keys: Vec::new(),
            deadline: now + config.timeout,
        });
    }

    /// Append a key to the running session.
    ///
    /// A key coming after the deadline aborts the session without matching.
    pub fn feed(&mut self, key: HidKeyCode, now: Instant, config: &LeaderConfig) -> LeaderOutcome {
        let Some(session) = self.session.as_mut() else {
            return LeaderOutcome::Expired;
        };
        if now >= session.deadline {
            debug!("Leader session expired, dropping {:?}", session.keys.as_slice());
            self.session = None;
            return LeaderOutcome::Expired;
        }
        // Can't overflow: a full buffer ends the session
        session.keys.push(key).ok();
        if config.per_key_timing {
            session.deadline = now + config.timeout;
        }
        if session.keys.is_full() {
            return LeaderOutcome::Finished(self.end(config));
        }
        LeaderOutcome::Buffered
    }

    /// End the session if its deadline has passed, returns the matched output
    pub fn poll(&mut self, now: Instant, config: &LeaderConfig) -> Option<Action> {
        match &self.session {
            Some(session) if now >= session.deadline => self.end(config),
            _ => None,
        }
    }

    /// End the session at `now`, nothing matches once its deadline has passed
    pub fn end_at(&mut self, now: Instant, config: &LeaderConfig) -> Option<Action> {
        match &self.session {
            Some(session) if now >= session.deadline => {
                debug!("Leader session expired, dropping {:?}", session.keys.as_slice());
                self.session = None;
                None
            }
            _ => self.end(config),
        }
    }

    /// End the session and match the typed keys
    pub fn end(&mut self, config: &LeaderConfig) -> Option<Action> {
        let session = self.session.take()?;
        let output = match_sequence(&config.sequences, &session.keys);
        match output {
            Some(action) => debug!("Leader sequence {:?} matched: {:?}", session.keys.as_slice(), action),
            None => debug!("Leader sequence {:?} has no match", session.keys.as_slice()),
        }
        output
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.session.as_ref().map(|s| s.deadline)
    }
}
