//! The three indicator LEDs.
//!
//! What the LEDs show is a pure function of the layer state, the host lock state and
//! whether a dynamic macro is recording. [`IndicatorController`] writes it to the hardware.

use embedded_hal::pwm::SetDutyCycle;

use crate::config::IndicatorConfig;
use crate::keymap::LayerState;
use crate::led_indicator::LedIndicator;

/// What the LEDs display, by priority: recording > lock > layer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IndicatorMode {
    /// LED 1: function layer, LED 2: numeric layer, LED 3: mouse layer
    Layer,
    /// LED 1: caps lock, LED 2: num lock, LED 3: scroll lock
    Lock,
    /// All LEDs on
    Recording,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct IndicatorOutput {
    pub mode: IndicatorMode,
    pub leds: [bool; 3],
}

impl Default for IndicatorOutput {
    fn default() -> Self {
        Self {
            mode: IndicatorMode::Layer,
            leds: [false; 3],
        }
    }
}

/// Compute the LED state
pub fn compute_indicators(
    config: &IndicatorConfig,
    layers: &LayerState,
    lock: LedIndicator,
    recording: bool,
) -> IndicatorOutput {
    let layer_on = |layer: Option<u8>| layer.is_some_and(|l| layers.is_active(l));

    if recording {
        IndicatorOutput {
            mode: IndicatorMode::Recording,
            leds: [true; 3],
        }
    } else if layer_on(config.lock_layer) {
        IndicatorOutput {
            mode: IndicatorMode::Lock,
            leds: [lock.caps_lock(), lock.num_lock(), lock.scroll_lock()],
        }
    } else {
        IndicatorOutput {
            mode: IndicatorMode::Layer,
            leds: [
                layer_on(config.function_layer),
                layer_on(config.numeric_layer),
                layer_on(config.mouse_layer),
            ],
        }
    }
}

/// Drives the three indicator LEDs with PWM outputs
pub struct IndicatorController<P: SetDutyCycle> {
    leds: [P; 3],
    /// Duty cycle of a lit LED, out of 255
    brightness: u8,
    /// The last output written, `None` before the first write
    current: Option<IndicatorOutput>,
}

impl<P: SetDutyCycle> IndicatorController<P> {
    pub fn new(leds: [P; 3], config: &IndicatorConfig) -> Self {
        Self {
            leds,
            brightness: config.brightness,
            current: None,
        }
    }

    pub fn current(&self) -> Option<IndicatorOutput> {
        self.current
    }

    pub fn leds(&self) -> &[P; 3] {
        &self.leds
    }

    /// Write the output to the LEDs, skipped if nothing changed
    pub fn update(&mut self, output: IndicatorOutput) {
        if self.current == Some(output) {
            return;
        }
        debug!("Indicator LEDs: {:?}", output);
        for (i, (led, on)) in self.leds.iter_mut().zip(output.leds).enumerate() {
            let result = if on {
                led.set_duty_cycle_fraction(self.brightness as u16, 255)
            } else {
                led.set_duty_cycle_fully_off()
            };
            if result.is_err() {
                error!("Failed to set indicator LED {}", i + 1);
            }
        }
        self.current = Some(output);
    }
}
