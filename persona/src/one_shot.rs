use embassy_time::{Duration, Instant};

/// State machine for one shot keys
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum OneShotState<T> {
    /// First one shot key press
    Initial(T),
    /// One shot key was released before any other key, normal one shot behavior
    Single(T),
    /// Another key was pressed before one shot key was released, treat as a normal modifier/layer
    Held(T),
    /// One shot inactive
    #[default]
    None,
}

impl<T: Copy> OneShotState<T> {
    /// Get the current one shot value if any
    pub fn value(&self) -> Option<T> {
        match self {
            OneShotState::Initial(v) | OneShotState::Single(v) | OneShotState::Held(v) => Some(*v),
            OneShotState::None => None,
        }
    }
}

/// A one shot modifier (`T = ModifierCombination`) or layer (`T = u8`).
///
/// Methods returning `Some(value)` mean the one shot ended, the caller undoes `value`.
#[derive(Clone, Copy, Debug)]
pub struct OneShot<T> {
    state: OneShotState<T>,
    /// Set in `Single` state only
    deadline: Option<Instant>,
}

impl<T: Copy> OneShot<T> {
    pub fn new() -> Self {
        Self {
            state: OneShotState::None,
            deadline: None,
        }
    }

    pub fn state(&self) -> OneShotState<T> {
        self.state
    }

    pub fn value(&self) -> Option<T> {
        self.state.value()
    }

    /// The one shot key is pressed, `value` replaces the current one
    pub fn press(&mut self, value: T) {
        self.state = match self.state {
            OneShotState::None | OneShotState::Initial(_) => OneShotState::Initial(value),
            OneShotState::Single(_) => OneShotState::Single(value),
            OneShotState::Held(_) => OneShotState::Held(value),
        };
    }

    /// The one shot key is released
    pub fn release(&mut self, now: Instant, timeout: Duration) -> Option<T> {
        match self.state {
            OneShotState::Initial(v) | OneShotState::Single(v) => {
                self.state = OneShotState::Single(v);
                self.deadline = Some(now + timeout);
                None
            }
            OneShotState::Held(v) => self.clear(v),
            OneShotState::None => None,
        }
    }

    /// Another key is pressed
    pub fn other_pressed(&mut self) {
        if let OneShotState::Initial(v) = self.state {
            self.state = OneShotState::Held(v);
        }
    }

    /// Another key is released, a pending one shot applied to it and ends
    pub fn other_released(&mut self) -> Option<T> {
        match self.state {
            OneShotState::Single(v) => self.clear(v),
            _ => None,
        }
    }

    /// End the one shot if nothing was pressed in time
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        match (self.state, self.deadline) {
            (OneShotState::Single(v), Some(deadline)) if now >= deadline => {
                debug!("One shot timeout");
                self.clear(v)
            }
            _ => None,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        match self.state {
            OneShotState::Single(_) => self.deadline,
            _ => None,
        }
    }

    fn clear(&mut self, value: T) -> Option<T> {
        self.state = OneShotState::None;
        self.deadline = None;
        Some(value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const TIMEOUT: Duration = Duration::from_secs(1);

    #[test]
    fn test_applies_to_next_key() {
        let mut osl = OneShot::new();
        let t0 = Instant::from_millis(0);
        osl.press(3u8);
        assert_eq!(osl.release(t0, TIMEOUT), None);
        assert_eq!(osl.state(), OneShotState::Single(3));
        osl.other_pressed();
        assert_eq!(osl.value(), Some(3));
        assert_eq!(osl.other_released(), Some(3));
        assert_eq!(osl.value(), None);
        assert_eq!(osl.next_deadline(), None);
    }

    #[test]
    fn test_timeout() {
        let mut osl = OneShot::new();
        let t0 = Instant::from_millis(0);
        osl.press(2u8);
        osl.release(t0, TIMEOUT);
        assert_eq!(osl.next_deadline(), Some(t0 + TIMEOUT));
        assert_eq!(osl.poll(t0 + Duration::from_millis(999)), None);
        assert_eq!(osl.poll(t0 + TIMEOUT), Some(2));
        assert_eq!(osl.poll(t0 + TIMEOUT), None);
    }

    #[test]
    fn test_held_acts_as_normal_key() {
        let mut osm = OneShot::new();
        let t0 = Instant::from_millis(0);
        osm.press(1u8);
        osm.other_pressed();
        assert_eq!(osm.state(), OneShotState::Held(1));
        // Releasing the other key doesn't end a held one shot
        assert_eq!(osm.other_released(), None);
        assert_eq!(osm.release(t0, TIMEOUT), Some(1));
        assert_eq!(osm.state(), OneShotState::None);
    }
}
