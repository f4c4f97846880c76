//! A key that enters the bootloader when held long enough.
//!
//! The bootloader can only be reached on purpose: the key has to be held
//! for the whole threshold, and nothing happens until it is released.

/// A long hold detector.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct LongHold {
    threshold: u32,
    since: Option<u32>,
}

impl LongHold {
    pub const fn new(threshold: u32) -> Self {
        LongHold {
            threshold,
            since: None,
        }
    }

    /// Is the key currently down?
    pub fn is_pressed(&self) -> bool {
        self.since.is_some()
    }

    /// Starts the timer.
    pub fn press(&mut self, now: u32) {
        self.since = Some(now);
    }

    /// Stops the timer, calling `enter` if the key was held for at least
    /// the threshold. Returns `true` if `enter` was called.
    pub fn release(&mut self, now: u32, enter: impl FnOnce()) -> bool {
        match self.since.take() {
            Some(since) if now.wrapping_sub(since) >= self.threshold => {
                enter();
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::config::BOOT_HOLD_TIME;

    #[test]
    fn long_enough() {
        let mut boot = LongHold::new(BOOT_HOLD_TIME);
        let mut entered = 0;
        boot.press(0);
        assert!(boot.is_pressed());
        assert!(boot.release(5200, || entered += 1));
        assert_eq!(entered, 1);
        assert!(!boot.is_pressed());
    }

    #[test]
    fn too_short() {
        let mut boot = LongHold::new(BOOT_HOLD_TIME);
        let mut entered = 0;
        boot.press(0);
        assert!(!boot.release(3000, || entered += 1));
        assert_eq!(entered, 0);
    }

    #[test]
    fn threshold_is_inclusive() {
        let mut boot = LongHold::new(BOOT_HOLD_TIME);
        boot.press(100);
        assert!(!boot.release(5099, || ()));
        boot.press(100);
        assert!(boot.release(5100, || ()));
    }

    #[test]
    fn fires_once_per_press() {
        let mut boot = LongHold::new(BOOT_HOLD_TIME);
        let mut entered = 0;
        boot.press(0);
        boot.release(6000, || entered += 1);
        boot.release(12000, || entered += 1);
        assert_eq!(entered, 1);
    }

    #[test]
    fn wrapping_clock() {
        let mut boot = LongHold::new(BOOT_HOLD_TIME);
        boot.press(u32::MAX - 1000);
        assert!(boot.release(4000, || ()));
    }
}
