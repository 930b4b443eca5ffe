pub mod test_macro;

use embassy_time::{Duration, Instant};
use persona::action::{Action, KeyAction};
use persona::config::{BehaviorConfig, LeaderConfig, StringsConfig, TapDancesConfig};
use persona::descriptor::KeyboardReport;
use persona::event::KeyboardEvent;
use persona::hid::HidReporter;
use persona::keyboard::Keyboard;
use persona::keycode::HidKeyCode;
use persona::keymap::KeyMap;
use persona::leader::LeaderSequence;
use persona::modifier::ModifierCombination;
use persona::send_string::{MacroOperation, MacroSequence, extend_sequence, to_macro_sequence};
use persona::tap_dance::{TapDance, macro_control};
use persona::{a, dm, k, layer, leader, lt, mo, mt, osm, ss, td, tg, to, tt};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub(crate) const KC_LCTRL: u8 = 1 << 0;
pub(crate) const KC_LSHIFT: u8 = 1 << 1;

pub const BASE: u8 = 0;
pub const FN: u8 = 1;
pub const MOUSE: u8 = 2;
pub const NUMS: u8 = 3;
pub const SWAP: u8 = 4;
pub const SYSLEDS: u8 = 5;

pub type TestKeyboard = Keyboard<'static, 3, 6, 6>;

#[derive(Debug, Clone)]
pub struct TestKeyPress {
    pub row: u8,
    pub col: u8,
    pub pressed: bool,
    pub delay: u64, // Delay before this key event in milliseconds
}

/// Tick every deadline up to `until` and collect the reports
fn advance(keyboard: &mut TestKeyboard, reporter: &mut HidReporter, reports: &mut Vec<KeyboardReport>, until: Instant) {
    while let Some(deadline) = keyboard.next_deadline()
        && deadline <= until
    {
        keyboard.tick(deadline);
        flush(keyboard, reporter, reports);
    }
}

fn flush(keyboard: &mut TestKeyboard, reporter: &mut HidReporter, reports: &mut Vec<KeyboardReport>) {
    while let Some(event) = keyboard.next_host_event() {
        if reporter.apply(event) {
            reports.push(reporter.report());
        }
    }
}

// Run a key sequence on a simulated clock starting at 0, then let every pending timer expire.
// Returns all reports sent to the host.
pub fn run_key_sequence(keyboard: &mut TestKeyboard, key_sequence: &[TestKeyPress]) -> Vec<KeyboardReport> {
    let mut reporter = HidReporter::new();
    let mut reports = Vec::new();
    let mut now = Instant::from_millis(0);
    for key in key_sequence {
        let at = now + Duration::from_millis(key.delay);
        advance(keyboard, &mut reporter, &mut reports, at);
        keyboard.process_event(KeyboardEvent::key(key.row, key.col, key.pressed), at);
        flush(keyboard, &mut reporter, &mut reports);
        now = at;
    }
    advance(keyboard, &mut reporter, &mut reports, now + Duration::from_secs(10));
    reports
}

/// Report content compared by the tests: modifier byte, lock leds and keycodes
pub fn report_bits(report: &KeyboardReport) -> (u8, u8, [u8; 6]) {
    (report.modifier, report.leds, report.keycodes)
}

pub fn run_key_sequence_test(keyboard: &mut TestKeyboard, key_sequence: &[TestKeyPress], expected_reports: &[KeyboardReport]) {
    let reports: Vec<_> = run_key_sequence(keyboard, key_sequence).iter().map(report_bits).collect();
    let expected_reports: Vec<_> = expected_reports.iter().map(report_bits).collect();
    for (i, (expected, report)) in expected_reports.iter().zip(reports.iter()).enumerate() {
        assert_eq!(
            expected, report,
            "on #{} reports, expected left but actually right",
            i
        );
    }
    assert_eq!(
        expected_reports.len(),
        reports.len(),
        "expected {} reports, got {:?}",
        expected_reports.len(),
        reports
    );
}

#[rustfmt::skip]
pub const fn get_keymap() -> [[[KeyAction; 6]; 3]; 6] {
    [
        // BASE
        layer!([
            [k!(A), k!(B), k!(C), td!(1), td!(0), leader!()],
            [mo!(FN), tg!(NUMS), tt!(SYSLEDS), lt!(MOUSE, Escape), mt!(Enter, ModifierCombination::LSHIFT), k!(LShift)],
            [td!(2), ss!(0), osm!(ModifierCombination::LSHIFT), td!(3), k!(Quote), dm!(Play(Second))]
        ]),
        // FN
        layer!([
            [k!(F1), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [dm!(RecordStart(Second)), dm!(RecordStop), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
        // MOUSE
        layer!([
            [k!(Up), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
        // NUMS
        layer!([
            [k!(Kc7), k!(Kc8), k!(Kc9), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
        // SWAP
        layer!([
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
        // SYSLEDS
        layer!([
            [k!(CapsLock), k!(NumLock), k!(ScrollLock), a!(Transparent), a!(Transparent), a!(Transparent)],
            [a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)],
            [to!(BASE), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent), a!(Transparent)]
        ]),
    ]
}

pub fn get_tap_dances_config() -> TapDancesConfig {
    let copy = Action::KeyWithModifier(HidKeyCode::Insert, ModifierCombination::LCTRL);
    let paste = Action::KeyWithModifier(HidKeyCode::Insert, ModifierCombination::LSHIFT);
    TapDancesConfig {
        tap_dances: heapless::Vec::from_iter([
            TapDance::new_custom(macro_control),
            TapDance::new_double(copy, paste),
            TapDance::new_double(Action::Key(HidKeyCode::Left), Action::Key(HidKeyCode::Home)),
            TapDance::new_with_taps(
                &[
                    Action::Key(HidKeyCode::A),
                    Action::Key(HidKeyCode::B),
                    Action::Key(HidKeyCode::C),
                ],
                Action::LayerOn(NUMS),
            ),
        ]),
    }
}

pub fn get_leader_config() -> LeaderConfig {
    LeaderConfig {
        sequences: heapless::Vec::from_iter([
            LeaderSequence::one_key(HidKeyCode::Quote, Action::SendString(1)),
            LeaderSequence::new(&[HidKeyCode::B, HidKeyCode::C], Action::Key(HidKeyCode::KbPower)),
            LeaderSequence::one_key(
                HidKeyCode::A,
                Action::KeyWithModifier(HidKeyCode::Insert, ModifierCombination::LSHIFT),
            ),
        ]),
        ..Default::default()
    }
}

pub fn get_strings_config() -> StringsConfig {
    // "00" typed with shift held
    let mut pad = MacroSequence::new();
    extend_sequence(
        &mut pad,
        &[
            MacroOperation::Press(HidKeyCode::LShift),
            MacroOperation::Text(HidKeyCode::Kc0, false),
            MacroOperation::Text(HidKeyCode::Kc0, false),
            MacroOperation::Release(HidKeyCode::LShift),
        ],
    );
    StringsConfig {
        strings: heapless::Vec::from_iter([pad, to_macro_sequence("Ok")]),
    }
}

pub fn get_behavior_config() -> BehaviorConfig {
    BehaviorConfig {
        tap_dance: get_tap_dances_config(),
        leader: get_leader_config(),
        strings: get_strings_config(),
        ..Default::default()
    }
}

pub fn create_test_keyboard_with_config(config: BehaviorConfig) -> TestKeyboard {
    // Box::leak is acceptable in tests
    let layers = Box::leak(Box::new(get_keymap()));
    let keymap = KeyMap::new(layers).unwrap();
    Keyboard::new(keymap, config).unwrap()
}

pub fn create_test_keyboard() -> TestKeyboard {
    create_test_keyboard_with_config(get_behavior_config())
}
