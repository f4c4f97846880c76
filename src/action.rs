//! The different actions that can be done.

use crate::key_code::KeyCode;

/// The different actions that can be done.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Action {
    /// No operation action: just do nothing.
    NoOp,
    /// A key code, i.e. a classic key.
    KeyCode(KeyCode),
    /// Multiple key codes sent at the same time, as if these keys
    /// were pressed at the same time. Useful to send a shifted key,
    /// or complex shortcuts like Ctrl+Alt+Del in a single key press.
    MultipleKeyCodes(&'static [KeyCode]),
    /// Change the default layer. This is the only layer switching the
    /// keymap uses: the layer stays active until another
    /// `DefaultLayer` is pressed.
    DefaultLayer(usize),
    /// A modifier when held, a key when tapped.
    ///
    /// The key is a tap if released before the tapping term, even if
    /// other keys were pressed meanwhile. It is a hold once the tapping
    /// term expires.
    HoldTap {
        /// The modifier held.
        hold: KeyCode,
        /// The key tapped.
        tap: KeyCode,
    },
    /// A tap dance key, resolved by the dance table row with this
    /// index.
    TapDance(usize),
    /// Enters the bootloader when released after being held long
    /// enough.
    BootHold,
}

impl Action {
    /// Gets the dance channel if the action is the `TapDance` action.
    pub fn dance(self) -> Option<usize> {
        match self {
            Action::TapDance(channel) => Some(channel),
            _ => None,
        }
    }

    /// Returns an iterator on the `KeyCode` corresponding to the action.
    pub fn key_codes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        match self {
            Action::KeyCode(kc) => core::slice::from_ref(kc).iter().cloned(),
            Action::MultipleKeyCodes(kcs) => kcs.iter().cloned(),
            _ => [].iter().cloned(),
        }
    }
}

/// A shortcut to create a `Action::KeyCode`, useful to create compact
/// layout.
pub const fn k(kc: KeyCode) -> Action {
    Action::KeyCode(kc)
}

/// A shortcut to create a `Action::DefaultLayer`, useful to create compact
/// layout.
pub const fn d(layer: usize) -> Action {
    Action::DefaultLayer(layer)
}

/// A shortcut to create a `Action::MultipleKeyCodes`, useful to
/// create compact layout.
pub const fn m(kcs: &'static [KeyCode]) -> Action {
    Action::MultipleKeyCodes(kcs)
}

/// A shortcut to create a `Action::HoldTap`, like QMK's `LALT_T(KC_D)`.
pub const fn ht(hold: KeyCode, tap: KeyCode) -> Action {
    Action::HoldTap { hold, tap }
}

/// A shortcut to create a `Action::TapDance`.
pub const fn td(channel: usize) -> Action {
    Action::TapDance(channel)
}
