//! Timing configuration.

/// Milliseconds a tap dance burst or a hold-tap waits before settling.
pub const TAPPING_TERM: u32 = 200;

/// Milliseconds the boot key has to be held to enter the bootloader.
pub const BOOT_HOLD_TIME: u32 = 5000;

/// Timing of the layout, in milliseconds (ticks).
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Config {
    pub tapping_term: u32,
    pub boot_hold: u32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            tapping_term: TAPPING_TERM,
            boot_hold: BOOT_HOLD_TIME,
        }
    }
}
