//! The split 3x5+2 keymap.
//!
//! The matrix is 4 rows of 10 columns, the left half on columns 0 to 4.
//! The 4 thumb keys are on the last row, columns 3 to 6, the other
//! positions of that row are not wired.
//!
//! Most letters of the top rows are tap dance keys: tapped they type
//! the letter, held they type a symbol. Tapping twice types the letter
//! twice, and tapping then holding types the letter once and then holds
//! it, so that the host key repeat works.

use crate::action::Action::{self, BootHold, NoOp};
use crate::action::{d, ht, k, td};
use crate::key_code::KeyCode::{self, *};
use crate::layout::Layers;
use crate::table::{DanceEntry, Output, Resolution};

pub const Q_EXCLAM: usize = 0;
pub const W_AT: usize = 1;
pub const E_HASH: usize = 2;
pub const R_DOLLAR: usize = 3;
pub const T_PERCENT: usize = 4;
pub const Y_CARET: usize = 5;
pub const U_AMPR: usize = 6;
pub const I_ASTR: usize = 7;
pub const O_LPRN: usize = 8;
pub const P_RPRN: usize = 9;
pub const L_QUESTION: usize = 10;
pub const M_SLASH: usize = 11;
pub const COMM_COLON: usize = 12;
pub const DOT_QUOTE: usize = 13;
pub const H_MINUS: usize = 14;
pub const S_TILDE: usize = 15;

/// A letter dance: `$base` when tapped, the symbol when held.
macro_rules! dance {
    (@ $base:ident, $hold:expr) => {
        DanceEntry {
            single_tap: Resolution {
                on_resolved: &[Output::Tap(Action::KeyCode(KeyCode::$base))],
                on_superseded: &[],
            },
            single_hold: Resolution {
                on_resolved: &[Output::Tap($hold)],
                on_superseded: &[],
            },
            double_tap: Resolution {
                on_resolved: &[
                    Output::Tap(Action::KeyCode(KeyCode::$base)),
                    Output::Tap(Action::KeyCode(KeyCode::$base)),
                ],
                on_superseded: &[],
            },
            double_hold: Resolution::NOOP,
            double_tap_then_hold: Resolution {
                on_resolved: &[
                    Output::Tap(Action::KeyCode(KeyCode::$base)),
                    Output::Hold(Action::KeyCode(KeyCode::$base)),
                ],
                on_superseded: &[Output::Release(Action::KeyCode(KeyCode::$base))],
            },
            triple_tap: Resolution::NOOP,
            triple_hold: Resolution::NOOP,
        }
    };
    ($base:ident, shift $sym:ident) => {
        dance!(@ $base, Action::MultipleKeyCodes(&[KeyCode::LShift, KeyCode::$sym]))
    };
    ($base:ident, $sym:ident) => {
        dance!(@ $base, Action::KeyCode(KeyCode::$sym))
    };
}

/// The dance table, indexed by the channel constants.
pub static DANCES: [DanceEntry; 16] = [
    dance!(Q, shift Kb1),
    dance!(W, shift Kb2),
    dance!(E, shift Kb3),
    dance!(R, shift Kb4),
    dance!(T, shift Kb5),
    dance!(Y, shift Kb6),
    dance!(U, shift Kb7),
    dance!(I, shift Kb8),
    dance!(O, shift Kb9),
    dance!(P, shift Kb0),
    dance!(L, shift Slash),
    dance!(M, Slash),
    dance!(Comma, shift SColon),
    dance!(Dot, shift Quote),
    dance!(H, Minus),
    dance!(S, shift Grave),
];

const BOOT: Action = BootHold;
const XXX: Action = NoOp;

#[rustfmt::skip]
pub static LAYERS: Layers = &[
    &[
        &[td(Q_EXCLAM), td(W_AT), td(E_HASH), td(R_DOLLAR), td(T_PERCENT),
          td(Y_CARET), td(U_AMPR), td(I_ASTR), td(O_LPRN), td(P_RPRN)],
        &[k(A), td(S_TILDE), ht(LAlt, D), ht(LGui, F), k(G),
          td(H_MINUS), ht(RGui, J), ht(RAlt, K), td(L_QUESTION), k(BSpace)],
        &[k(Z), k(X), k(C), k(V), k(B),
          k(N), td(M_SLASH), td(COMM_COLON), td(DOT_QUOTE), k(Enter)],
        &[XXX, XXX, XXX, k(Space), k(LShift), k(LCtrl), d(1), XXX, XXX, XXX],
    ],
    // the boot report has no consumer page: volume and stop are the
    // keyboard page keys, which some hosts ignore
    &[
        &[k(Kb1), k(Kb2), k(Kb3), k(Kb4), k(Kb5), k(Kb6), k(Kb7), k(Kb8), k(Kb9), k(Kb0)],
        &[k(Escape), k(Grave), k(Up), k(VolDown), k(VolUp),
          k(Minus), k(Equal), k(LBracket), k(RBracket), k(BSpace)],
        &[k(Tab), k(Left), k(Down), k(Right), k(Stop),
          k(Bslash), k(Slash), k(SColon), k(Quote), k(Enter)],
        &[XXX, XXX, XXX, d(0), k(LShift), k(RAlt), d(2), XXX, XXX, XXX],
    ],
    // mouse and brightness keys are not reported
    &[
        &[k(F1), k(F2), k(F3), k(F4), k(F5), k(F6), k(F7), k(F8), k(F9), k(F10)],
        &[BOOT, XXX, XXX, XXX, XXX,  XXX, XXX, XXX, BOOT, k(F11)],
        &[XXX,  XXX, XXX, XXX, XXX,  XXX, XXX, XXX, XXX,  k(F12)],
        &[XXX, XXX, XXX, d(0), XXX, XXX, XXX, XXX, XXX, XXX],
    ],
];
