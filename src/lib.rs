//! Keyboard firmware logic for a split 3x5+2 keyboard with tap dance
//! keys.
//!
//! The crate does not touch any hardware: the firmware feeds the
//! [`Layout`] with debounced key [`Event`](layout::Event)s and calls
//! [`Layout::tick`] every millisecond, then sends
//! [`Layout::keycodes`] to the host as a [`KbHidReport`].
//!
//! A tap dance key types different things depending on how many
//! times it is tapped in a row and on whether the last press is held.
//! The gesture is classified by the [`Resolver`] into a [`Dance`], and
//! the [`DanceEntry`] of the key gives the keys to send for it.
//!
//! ```
//! use dance_fw::keymap::{DANCES, LAYERS};
//! use dance_fw::layout::{CustomEvent, Event};
//! use dance_fw::{Config, KbHidReport, Layout};
//!
//! let mut layout = Layout::new(LAYERS, &DANCES, Config::default()).unwrap();
//! layout.event(Event::Press(2, 0));
//! assert_eq!(layout.tick(), CustomEvent::NoEvent);
//! let report: KbHidReport = layout.keycodes().collect();
//! assert_eq!(report.as_bytes(), &[0, 0, 0x1D, 0, 0, 0, 0, 0]);
//! ```

#![no_std]

pub mod action;
pub mod boot_hold;
pub mod config;
pub mod dance;
pub mod error;
pub mod key_code;
pub mod keymap;
pub mod layout;
pub mod table;
pub mod trace;

pub use config::Config;
pub use dance::{Dance, Resolver};
pub use error::ConfigError;
pub use key_code::KbHidReport;
pub use layout::Layout;
pub use table::DanceEntry;
