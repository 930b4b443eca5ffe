//! Keyboard personality layer.
//!
//! Maps key positions to actions across layers, disambiguates tap dances and tap-hold keys,
//! matches leader sequences, records and replays dynamic macros, and computes what the
//! three indicator LEDs show.
//!
//! Everything runs in one thread: [`keyboard::Keyboard`] handles one key event or one
//! timer tick at a time and never blocks. [`runner::KeyboardRunner`] drives it from
//! embassy channels.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
pub use persona_types::{action, keycode, led_indicator, modifier};

pub mod config;
pub mod dynamic_macro;
pub mod error;
pub mod event;
pub mod hid;
pub mod indicator;
pub mod keyboard;
pub mod keymap;
pub mod layout_macro;
pub mod leader;
pub mod one_shot;
pub mod runner;
pub mod send_string;
pub mod tap_dance;
pub mod tap_hold;

pub use error::PersonaError;
pub use usbd_hid::descriptor;

pub type RawMutex = CriticalSectionRawMutex;
