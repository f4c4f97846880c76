//! The dance action table.
//!
//! Each tap dance channel has one [`DanceEntry`] row giving, for every
//! well formed [`Dance`], the outputs to send once the dance is
//! resolved, and the outputs that retract them once the key is
//! released. The table is static data, validated once at startup.

use crate::action::Action;
use crate::dance::Dance;
use crate::error::ConfigError;

/// A command for the host output emitter.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Output {
    /// Press and release the action.
    Tap(Action),
    /// Press the action and keep it pressed.
    Hold(Action),
    /// Release an action previously held.
    Release(Action),
}

impl Output {
    /// Sends this output to the emitter.
    pub fn apply(self, emitter: &mut impl Emit) {
        match self {
            Output::Tap(action) => emitter.tap(action),
            Output::Hold(action) => emitter.hold(action),
            Output::Release(action) => emitter.release(action),
        }
    }
}

/// The host output emitter.
pub trait Emit {
    /// Sends a press immediately followed by a release.
    fn tap(&mut self, action: Action);
    /// Sends a press, leaving the action pressed.
    fn hold(&mut self, action: Action);
    /// Releases an action previously held.
    fn release(&mut self, action: Action);
}

/// What a resolved dance does.
///
/// A dance that leaves an output held is a two phase step: `on_resolved`
/// opens the output and `on_superseded` closes it when the burst truly
/// ends.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Resolution {
    /// Sent once, when the dance is resolved.
    pub on_resolved: &'static [Output],
    /// Sent once, when the key is released after resolution.
    pub on_superseded: &'static [Output],
}

impl Resolution {
    /// Does nothing in either phase.
    pub const NOOP: Resolution = Resolution {
        on_resolved: &[],
        on_superseded: &[],
    };

    fn check(&self, channel: usize, dance: Dance) -> Result<(), ConfigError> {
        if dance != Dance::DoubleTapThenHold && !self.on_superseded.is_empty() {
            return Err(ConfigError::UnexpectedRetraction { channel, dance });
        }
        let balanced = |held: &Action| {
            self.on_superseded
                .iter()
                .any(|o| *o == Output::Release(*held))
        };
        let unreleased = self.on_resolved.iter().any(|o| match o {
            Output::Hold(held) => !balanced(held),
            _ => false,
        });
        if unreleased {
            return Err(ConfigError::UnreleasedHold { channel, dance });
        }
        Ok(())
    }
}

/// One row of the dance table.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct DanceEntry {
    pub single_tap: Resolution,
    pub single_hold: Resolution,
    pub double_tap: Resolution,
    pub double_hold: Resolution,
    pub double_tap_then_hold: Resolution,
    pub triple_tap: Resolution,
    pub triple_hold: Resolution,
}

impl DanceEntry {
    /// A row that ignores every dance.
    pub const NOOP: DanceEntry = DanceEntry {
        single_tap: Resolution::NOOP,
        single_hold: Resolution::NOOP,
        double_tap: Resolution::NOOP,
        double_hold: Resolution::NOOP,
        double_tap_then_hold: Resolution::NOOP,
        triple_tap: Resolution::NOOP,
        triple_hold: Resolution::NOOP,
    };

    /// The resolution for `dance`, `None` for `Dance::Unknown`.
    pub fn get(&self, dance: Dance) -> Option<&Resolution> {
        match dance {
            Dance::SingleTap => Some(&self.single_tap),
            Dance::SingleHold => Some(&self.single_hold),
            Dance::DoubleTap => Some(&self.double_tap),
            Dance::DoubleHold => Some(&self.double_hold),
            Dance::DoubleTapThenHold => Some(&self.double_tap_then_hold),
            Dance::TripleTap => Some(&self.triple_tap),
            Dance::TripleHold => Some(&self.triple_hold),
            Dance::Unknown => None,
        }
    }

    fn check(&self, channel: usize) -> Result<(), ConfigError> {
        Dance::RESOLVED.iter().try_for_each(|&dance| match self.get(dance) {
            Some(res) => res.check(channel, dance),
            None => Ok(()),
        })
    }
}

/// Checks that every row of the table retracts what it holds, and only
/// retracts where a held output may exist.
pub fn validate(table: &[DanceEntry]) -> Result<(), ConfigError> {
    table
        .iter()
        .enumerate()
        .try_for_each(|(channel, entry)| entry.check(channel))
}
