//! # Persona Types
//!
//! Fundamental type definitions shared by the persona keyboard personality layer.
//!
//! ## Modules
//!
//! - [`action`] - Key bindings and the actions they trigger (keys, layers, tap dances, macros)
//! - [`keycode`] - HID keyboard page keycodes and ASCII conversion
//! - [`modifier`] - Modifier key combinations and HID modifier bits
//! - [`led_indicator`] - Lock state reported by the host (caps/num/scroll lock)
//!
//! These types carry no behavior of their own: the `persona` crate interprets
//! them while processing key events.

#![no_std]

pub mod action;
pub mod keycode;
pub mod led_indicator;
pub mod modifier;
