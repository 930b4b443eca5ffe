pub mod common;

use persona::action::MacroSlot;

use crate::common::{KC_LSHIFT, create_test_keyboard, run_key_sequence};

#[test]
fn test_record_and_play_with_tap_dance() {
    let mut keyboard = create_test_keyboard();
    let sequence = key_sequence![
        // Double tap td!(0): record the first slot
        [0, 4, true, 0],
        [0, 4, false, 20],
        [0, 4, true, 20],
        [0, 4, false, 20],
        // Recorded
        [0, 0, true, 200], // A
        [0, 0, false, 20],
        [0, 1, true, 20], // B
        [0, 1, false, 20],
        // Any tap stops the recording
        [0, 4, true, 80],
        [0, 4, false, 20],
        // Single tap: play
        [0, 4, true, 280],
        [0, 4, false, 20],
    ];
    let reports = run_key_sequence(&mut keyboard, &sequence);
    let keys: Vec<u8> = reports.iter().map(|r| r.keycodes[0]).collect();
    assert_eq!(
        keys,
        [kc8!(A), 0, kc8!(B), 0, kc8!(A), 0, kc8!(B), 0],
        "recorded keys, then the same keys replayed"
    );
    assert_eq!(keyboard.macros().len(MacroSlot::First), 4);
    assert!(keyboard.macros().recording_slot().is_none());
    assert!(keyboard.macros().playing_slot().is_none());
}

#[test]
fn test_replay_keeps_timing() {
    let mut keyboard = create_test_keyboard();
    let sequence = key_sequence![
        [0, 4, true, 0],
        [0, 4, false, 20],
        [0, 4, true, 20],
        [0, 4, false, 20],
        [0, 0, true, 200],
        [0, 0, false, 50],
        [0, 1, true, 100],
        [0, 1, false, 10],
        [0, 4, true, 80],
        [0, 4, false, 20],
    ];
    run_key_sequence(&mut keyboard, &sequence);
    let delays: Vec<u16> = keyboard.macros().events(MacroSlot::First).map(|e| e.delay_ms).collect();
    assert_eq!(delays, [0, 50, 100, 10]);
}

#[test]
fn test_second_slot_from_function_layer() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            [1, 0, true, 10],  // mo!(FN)
            [2, 0, true, 10],  // Record the second slot
            [2, 0, false, 10],
            [1, 0, false, 10],
            [0, 2, true, 10],  // C
            [0, 2, false, 10],
            [1, 0, true, 10],
            [2, 1, true, 10],  // Stop
            [2, 1, false, 10],
            [1, 0, false, 10],
            [2, 5, true, 10],  // Play the second slot
            [2, 5, false, 10],
        ],
        expected_reports: [
            [0, [kc8!(C), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
            [0, [kc8!(C), 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_tap_dance_output_is_recorded() {
    let mut keyboard = create_test_keyboard();
    let sequence = key_sequence![
        [0, 4, true, 0],
        [0, 4, false, 20],
        [0, 4, true, 20],
        [0, 4, false, 20],
        // td!(2) single tap: left
        [2, 0, true, 240],
        [2, 0, false, 20],
        [0, 4, true, 280],
        [0, 4, false, 20],
        [0, 4, true, 280],
        [0, 4, false, 20],
    ];
    let reports = run_key_sequence(&mut keyboard, &sequence);
    let keys: Vec<u8> = reports.iter().map(|r| r.keycodes[0]).collect();
    assert_eq!(keys, [kc8!(Left), 0, kc8!(Left), 0]);
    // The macro keys themselves are never part of the macro
    assert_eq!(keyboard.macros().len(MacroSlot::First), 2);
}

#[test]
fn test_play_empty_slot() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            [2, 5, true, 10],
            [2, 5, false, 10],
        ],
        expected_reports: []
    };
}

#[test]
fn test_send_string() {
    key_sequence_test! {
        keyboard: create_test_keyboard(),
        sequence: [
            [2, 1, true, 10], // ss!(0): "00" with shift held
            [2, 1, false, 10],
        ],
        expected_reports: [
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(Kc0), 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [kc8!(Kc0), 0, 0, 0, 0, 0]],
            [KC_LSHIFT, [0, 0, 0, 0, 0, 0]],
            [0, [0, 0, 0, 0, 0, 0]],
        ]
    };
}

#[test]
fn test_key_held_at_stop_is_not_recorded() {
    let mut keyboard = create_test_keyboard();
    let sequence = key_sequence![
        [0, 4, true, 0],
        [0, 4, false, 20],
        [0, 4, true, 20],
        [0, 4, false, 20],
        // A held while the recording is stopped
        [0, 0, true, 200],
        [0, 4, true, 20],
        [0, 4, false, 20],
        [0, 0, false, 300],
    ];
    let reports = run_key_sequence(&mut keyboard, &sequence);
    let keys: Vec<u8> = reports.iter().map(|r| r.keycodes[0]).collect();
    assert_eq!(keys, [kc8!(A), 0]);
    assert!(keyboard.macros().recording_slot().is_none());
    assert!(keyboard.macros().is_empty(MacroSlot::First));
}

#[test]
fn test_replay_is_not_recorded() {
    let mut keyboard = create_test_keyboard();
    let sequence = key_sequence![
        // Record C in the second slot
        [1, 0, true, 10],
        [2, 0, true, 10],
        [2, 0, false, 10],
        [1, 0, false, 10],
        [0, 2, true, 10],
        [0, 2, false, 10],
        [1, 0, true, 10],
        [2, 1, true, 10],
        [2, 1, false, 10],
        [1, 0, false, 10],
        // Record the first slot while playing the second one
        [0, 4, true, 10],
        [0, 4, false, 20],
        [0, 4, true, 20],
        [0, 4, false, 20],
        [2, 5, true, 250],
        [2, 5, false, 10],
        // Stop
        [0, 4, true, 100],
        [0, 4, false, 20],
    ];
    let reports = run_key_sequence(&mut keyboard, &sequence);
    let keys: Vec<u8> = reports.iter().map(|r| r.keycodes[0]).collect();
    assert_eq!(keys, [kc8!(C), 0, kc8!(C), 0]);
    assert!(keyboard.macros().recording_slot().is_none());
    assert_eq!(keyboard.macros().len(MacroSlot::Second), 2);
    assert!(keyboard.macros().is_empty(MacroSlot::First));
}
