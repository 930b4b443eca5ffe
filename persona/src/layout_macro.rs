/// Create a layer in keymap
#[macro_export]
macro_rules! layer {
    ([$([$($x: expr), +]), +]) => {
        [$([$($x), +]),+]
    };
}

/// Create a normal key. For example, `k!(A)` represents `KeyAction::Single(Action::Key(HidKeyCode::A))`
#[macro_export]
macro_rules! k {
    ($k: ident) => {
        $crate::action::KeyAction::Single($crate::action::Action::Key($crate::keycode::HidKeyCode::$k))
    };
}

/// Create a normal key with modifier action, such as `wm!(Insert, ModifierCombination::LCTRL)`
#[macro_export]
macro_rules! wm {
    ($x: ident, $m: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::KeyWithModifier(
            $crate::keycode::HidKeyCode::$x,
            $m,
        ))
    };
}

/// Create a normal action: `KeyAction`. `a!(No)` is a blocking key, `a!(Transparent)` falls through
#[macro_export]
macro_rules! a {
    ($a: ident) => {
        $crate::action::KeyAction::$a
    };
}

/// Create a layer activate action. For example, `mo!(1)` activates layer 1.
#[macro_export]
macro_rules! mo {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::LayerOn($x))
    };
}

/// Create a layer activate action or tap key(tap/hold)
#[macro_export]
macro_rules! lt {
    ($x: expr, $k: ident) => {
        $crate::action::KeyAction::TapHold(
            $crate::action::Action::Key($crate::keycode::HidKeyCode::$k),
            $crate::action::Action::LayerOn($x),
        )
    };
}

/// Create a modifier-tap-hold action
#[macro_export]
macro_rules! mt {
    ($k: ident, $m: expr) => {
        $crate::action::KeyAction::TapHold(
            $crate::action::Action::Key($crate::keycode::HidKeyCode::$k),
            $crate::action::Action::Modifier($m),
        )
    };
}

/// Create an oneshot layer key in keymap
#[macro_export]
macro_rules! osl {
    ($x: expr) => {
        $crate::action::KeyAction::OneShot($crate::action::Action::LayerOn($x))
    };
}

/// Create an oneshot modifier key in keymap
#[macro_export]
macro_rules! osm {
    ($m: expr) => {
        $crate::action::KeyAction::OneShot($crate::action::Action::Modifier($m))
    };
}

/// Create a modifier key, held while the key is held
#[macro_export]
macro_rules! m {
    ($m: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::Modifier($m))
    };
}

/// Create a layer toggle action
#[macro_export]
macro_rules! tg {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::LayerToggle($x))
    };
}

/// Create a layer activate or tap toggle action
#[macro_export]
macro_rules! tt {
    ($x: expr) => {
        $crate::action::KeyAction::TapHold(
            $crate::action::Action::LayerToggle($x),
            $crate::action::Action::LayerOn($x),
        )
    };
}

/// Create a layer toggle only action (activate layer `n` and deactivate all other layers), `n` is the layer number
#[macro_export]
macro_rules! to {
    ($x: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::LayerToggleOnly($x))
    };
}

/// Create a tap dance key, `n` is the index in the tap dance config
#[macro_export]
macro_rules! td {
    ($n: expr) => {
        $crate::action::KeyAction::TapDance($n)
    };
}

/// Create the leader key
#[macro_export]
macro_rules! leader {
    () => {
        $crate::action::KeyAction::Single($crate::action::Action::Leader)
    };
}

/// Create a key that types the string `n` of the strings config
#[macro_export]
macro_rules! ss {
    ($n: expr) => {
        $crate::action::KeyAction::Single($crate::action::Action::SendString($n))
    };
}

/// Create a dynamic macro key: `dm!(RecordStart(First))`, `dm!(RecordStop)`, `dm!(Play(Second))`
#[macro_export]
macro_rules! dm {
    (RecordStop) => {
        $crate::action::KeyAction::Single($crate::action::Action::DynamicMacro(
            $crate::action::DynamicMacroAction::RecordStop,
        ))
    };
    ($a: ident($slot: ident)) => {
        $crate::action::KeyAction::Single($crate::action::Action::DynamicMacro(
            $crate::action::DynamicMacroAction::$a($crate::action::MacroSlot::$slot),
        ))
    };
}

/// Create a shifted key
#[macro_export]
macro_rules! shifted {
    ($x: ident) => {
        $crate::wm!($x, $crate::modifier::ModifierCombination::LSHIFT)
    };
}
