//! Tap dance resolution.
//!
//! A tap dance key does different things depending on how many times
//! it is tapped in quick succession, and on whether the last press is
//! still held when the burst settles. The [`Resolver`] follows every
//! dance channel, classifies each burst exactly once, and drives the
//! [`DanceEntry`] of the channel.
//!
//! A burst is resolved either when the tapping term elapses after the
//! last press or release of the key, or when any other key is pressed
//! (the burst is then *interrupted*). Resolution sends the
//! `on_resolved` outputs of the classification. When the key is finally
//! released, a [`Dance::DoubleTapThenHold`] also sends its
//! `on_superseded` outputs, releasing what resolution left held. The
//! channel is then back to rest.

use crate::error::ConfigError;
use crate::table::{self, DanceEntry, Emit, Output};
use crate::trace::{Log, TraceKind, TraceRecord};
use heapless::Vec;
use log::{debug, warn};

/// The maximum number of dance channels a resolver can follow.
pub const MAX_CHANNELS: usize = 32;

/// How a burst of presses was classified.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Dance {
    /// Tapped once, or pressed once then interrupted.
    SingleTap,
    /// Pressed once and held past the tapping term.
    SingleHold,
    /// Tapped twice.
    DoubleTap,
    /// Tapped once, then pressed and held past the tapping term.
    DoubleHold,
    /// Pressed twice, and another key was pressed before the burst
    /// settled. The second press acts as the start of a held repeat.
    DoubleTapThenHold,
    /// Tapped three times, or pressed three times then interrupted.
    TripleTap,
    /// Tapped twice, then pressed and held past the tapping term.
    TripleHold,
    /// Pressed four times or more. Does nothing.
    Unknown,
}

impl Dance {
    /// The classifications that may have outputs.
    pub const RESOLVED: [Dance; 7] = [
        Dance::SingleTap,
        Dance::SingleHold,
        Dance::DoubleTap,
        Dance::DoubleHold,
        Dance::DoubleTapThenHold,
        Dance::TripleTap,
        Dance::TripleHold,
    ];
}

/// Classifies a burst of `count` presses.
pub fn classify(count: u8, interrupted: bool, pressed: bool) -> Dance {
    match count {
        1 if interrupted || !pressed => Dance::SingleTap,
        1 => Dance::SingleHold,
        2 if interrupted => Dance::DoubleTapThenHold,
        2 if pressed => Dance::DoubleHold,
        2 => Dance::DoubleTap,
        3 if interrupted || !pressed => Dance::TripleTap,
        3 => Dance::TripleHold,
        _ => Dance::Unknown,
    }
}

/// A press or a release.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Transition {
    Press,
    Release,
}

/// A timestamped transition of a dance channel.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct GestureEvent {
    /// Index of the channel in the dance table.
    pub channel: usize,
    pub transition: Transition,
    /// Milliseconds, wrapping.
    pub timestamp: u32,
}

#[derive(Debug, Default, Copy, Clone)]
struct Channel {
    /// Presses in the current burst.
    count: u8,
    pressed: bool,
    interrupted: bool,
    /// Time of the last press.
    since: u32,
    current: Option<Dance>,
    speculative: bool,
}

/// Follows every dance channel and drives the dance table.
pub struct Resolver {
    table: &'static [DanceEntry],
    tapping_term: u32,
    channels: Vec<Channel, MAX_CHANNELS>,
    /// The channel with an unresolved burst. Every other key press
    /// interrupts it, so there is at most one.
    active: Option<usize>,
    log: Log,
}

impl Resolver {
    /// Creates a resolver with one channel per table row.
    ///
    /// Fails if the table has too many rows, or if one of its rows
    /// holds an output without releasing it.
    pub fn new(table: &'static [DanceEntry], tapping_term: u32) -> Result<Self, ConfigError> {
        if table.len() > MAX_CHANNELS {
            return Err(ConfigError::TooManyChannels {
                found: table.len(),
                max: MAX_CHANNELS,
            });
        }
        table::validate(table)?;
        let mut channels = Vec::new();
        channels
            .resize(table.len(), Channel::default())
            .map_err(|_| ConfigError::TooManyChannels {
                found: table.len(),
                max: MAX_CHANNELS,
            })?;
        Ok(Self {
            table,
            tapping_term,
            channels,
            active: None,
            log: Log::new(),
        })
    }

    /// Number of channels.
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    /// The classification of the channel, `None` if it is at rest or
    /// its burst is not resolved yet.
    pub fn current(&self, channel: usize) -> Option<Dance> {
        self.channels.get(channel).and_then(|c| c.current)
    }

    /// Is the channel holding output that its release will retract?
    pub fn is_speculative(&self, channel: usize) -> bool {
        self.channels.get(channel).map_or(false, |c| c.speculative)
    }

    /// Is a burst waiting for its resolution?
    pub fn is_pending(&self) -> bool {
        self.active.is_some()
    }

    /// The trace of every transition.
    pub fn log(&self) -> &Log {
        &self.log
    }

    /// Registers a gesture event.
    pub fn event(&mut self, event: GestureEvent, out: &mut impl Emit) {
        match event.transition {
            Transition::Press => self.press(event.channel, event.timestamp, out),
            Transition::Release => self.release(event.channel, event.timestamp, out),
        }
    }

    /// Registers a press of `channel`. A pending burst on another
    /// channel is interrupted first.
    pub fn press(&mut self, channel: usize, now: u32, out: &mut impl Emit) {
        if channel >= self.channels.len() {
            warn!("press on unknown dance channel {}", channel);
            return;
        }
        if let Some(active) = self.active.filter(|&a| a != channel) {
            self.resolve(active, now, true, out);
        }
        if self.channels[channel].current.is_some() {
            // pressed again before the release of the resolved burst
            self.supersede(channel, now, out);
        }
        let c = &mut self.channels[channel];
        c.count = c.count.saturating_add(1);
        c.pressed = true;
        c.since = now;
        self.active = Some(channel);
        self.trace(now, channel, TraceKind::Press);
    }

    /// Registers a release of `channel`. If its burst is resolved, the
    /// burst is over and the channel goes back to rest.
    pub fn release(&mut self, channel: usize, now: u32, out: &mut impl Emit) {
        let c = match self.channels.get_mut(channel) {
            Some(c) if c.count > 0 => c,
            _ => return,
        };
        c.pressed = false;
        let resolved = c.current.is_some();
        self.trace(now, channel, TraceKind::Release);
        if resolved {
            self.supersede(channel, now, out);
        }
    }

    /// Another key was pressed: the pending burst, if any, is resolved
    /// as interrupted.
    pub fn interrupt(&mut self, now: u32, out: &mut impl Emit) {
        if let Some(active) = self.active {
            self.trace(now, active, TraceKind::Interrupt);
            self.resolve(active, now, true, out);
        }
    }

    /// Resolves the pending burst if the tapping term has elapsed since
    /// its last press.
    pub fn tick(&mut self, now: u32, out: &mut impl Emit) {
        if let Some(active) = self.active {
            if now.wrapping_sub(self.channels[active].since) >= self.tapping_term {
                self.resolve(active, now, false, out);
            }
        }
    }

    fn resolve(&mut self, channel: usize, now: u32, interrupted: bool, out: &mut impl Emit) {
        self.active = None;
        let c = &mut self.channels[channel];
        c.interrupted |= interrupted;
        let dance = classify(c.count, c.interrupted, c.pressed);
        c.current = Some(dance);
        c.speculative = dance == Dance::DoubleTapThenHold;
        let pressed = c.pressed;
        debug!("dance {} resolved as {:?}", channel, dance);
        if let Some(res) = self.table[channel].get(dance) {
            emit(res.on_resolved, out);
        }
        self.trace(now, channel, TraceKind::Resolve);
        if !pressed {
            self.supersede(channel, now, out);
        }
    }

    fn supersede(&mut self, channel: usize, now: u32, out: &mut impl Emit) {
        let c = &mut self.channels[channel];
        if c.speculative {
            if let Some(res) = c.current.and_then(|d| self.table[channel].get(d)) {
                emit(res.on_superseded, out);
            }
            c.speculative = false;
        }
        debug!("dance {} superseded", channel);
        self.trace(now, channel, TraceKind::Supersede);
        self.channels[channel] = Channel::default();
    }

    fn trace(&mut self, now: u32, channel: usize, kind: TraceKind) {
        let c = &self.channels[channel];
        self.log
            .record(TraceRecord::new(now, channel, kind, c.current, c.count));
    }
}

fn emit(outputs: &[Output], out: &mut impl Emit) {
    for output in outputs {
        output.apply(out);
    }
}

#[cfg(test)]
mod test {
    extern crate std;
    use super::Dance::*;
    use super::*;
    use crate::action::{k, m, Action};
    use crate::key_code::KeyCode::*;
    use crate::table::Resolution;
    use std::vec::Vec;

    const TERM: u32 = 200;

    static TABLE: [DanceEntry; 2] = [
        DanceEntry {
            single_tap: Resolution {
                on_resolved: &[Output::Tap(k(Q))],
                on_superseded: &[],
            },
            single_hold: Resolution {
                on_resolved: &[Output::Tap(m(&[LShift, Kb1]))],
                on_superseded: &[],
            },
            double_tap: Resolution {
                on_resolved: &[Output::Tap(k(Q)), Output::Tap(k(Q))],
                on_superseded: &[],
            },
            double_hold: Resolution {
                on_resolved: &[Output::Tap(k(F1))],
                on_superseded: &[],
            },
            double_tap_then_hold: Resolution {
                on_resolved: &[Output::Tap(k(Q)), Output::Hold(k(Q))],
                on_superseded: &[Output::Release(k(Q))],
            },
            triple_tap: Resolution {
                on_resolved: &[Output::Tap(k(F2))],
                on_superseded: &[],
            },
            triple_hold: Resolution {
                on_resolved: &[Output::Tap(k(F3))],
                on_superseded: &[],
            },
        },
        DanceEntry {
            single_tap: Resolution {
                on_resolved: &[Output::Tap(k(W))],
                on_superseded: &[],
            },
            ..DanceEntry::NOOP
        },
    ];

    #[derive(Default)]
    struct Recorder(Vec<Output>);

    impl Emit for Recorder {
        fn tap(&mut self, action: Action) {
            self.0.push(Output::Tap(action));
        }
        fn hold(&mut self, action: Action) {
            self.0.push(Output::Hold(action));
        }
        fn release(&mut self, action: Action) {
            self.0.push(Output::Release(action));
        }
    }

    fn resolver() -> Resolver {
        Resolver::new(&TABLE, TERM).unwrap()
    }

    /// Feeds `(press, timestamp)` pairs for channel 0, then ticks at
    /// every millisecond up to `until`.
    fn play(r: &mut Resolver, out: &mut Recorder, events: &[(bool, u32)], until: u32) {
        let mut events = events.iter().peekable();
        for now in 0..=until {
            while let Some(&&(press, at)) = events.peek() {
                if at != now {
                    break;
                }
                let transition = if press {
                    Transition::Press
                } else {
                    Transition::Release
                };
                r.event(
                    GestureEvent {
                        channel: 0,
                        transition,
                        timestamp: now,
                    },
                    out,
                );
                events.next();
            }
            r.tick(now, out);
        }
    }

    #[test]
    fn classification_table() {
        assert_eq!(classify(1, false, false), SingleTap);
        assert_eq!(classify(1, true, true), SingleTap);
        assert_eq!(classify(1, false, true), SingleHold);
        assert_eq!(classify(2, true, false), DoubleTapThenHold);
        assert_eq!(classify(2, true, true), DoubleTapThenHold);
        assert_eq!(classify(2, false, true), DoubleHold);
        assert_eq!(classify(2, false, false), DoubleTap);
        assert_eq!(classify(3, true, true), TripleTap);
        assert_eq!(classify(3, false, false), TripleTap);
        assert_eq!(classify(3, false, true), TripleHold);
        assert_eq!(classify(4, false, false), Unknown);
        assert_eq!(classify(9, true, true), Unknown);
    }

    #[test]
    fn single_tap() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0), (false, 80)], 199);
        assert!(out.0.is_empty());
        assert!(r.is_pending());
        r.tick(200, &mut out);
        assert_eq!(out.0, [Output::Tap(k(Q))]);
        assert_eq!(r.current(0), None);
        assert!(!r.is_pending());
        r.tick(2000, &mut out);
        assert_eq!(out.0.len(), 1);
    }

    #[test]
    fn single_hold() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0)], 1000);
        assert_eq!(out.0, [Output::Tap(m(&[LShift, Kb1]))]);
        assert_eq!(r.current(0), Some(SingleHold));
        assert!(!r.is_speculative(0));
        r.release(0, 1001, &mut out);
        assert_eq!(out.0.len(), 1);
        assert_eq!(r.current(0), None);
    }

    #[test]
    fn double_tap() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0), (false, 50), (true, 100), (false, 150)], 400);
        assert_eq!(out.0, [Output::Tap(k(Q)), Output::Tap(k(Q))]);
        assert_eq!(r.current(0), None);
    }

    #[test]
    fn double_hold() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0), (false, 80), (true, 120)], 319);
        assert!(out.0.is_empty());
        r.tick(320, &mut out);
        assert_eq!(out.0, [Output::Tap(k(F1))]);
        assert_eq!(r.current(0), Some(DoubleHold));
        r.release(0, 900, &mut out);
        assert_eq!(out.0.len(), 1);
        assert_eq!(r.current(0), None);
    }

    #[test]
    fn double_tap_then_hold() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0), (false, 50), (true, 100)], 150);
        r.interrupt(150, &mut out);
        assert_eq!(out.0, [Output::Tap(k(Q)), Output::Hold(k(Q))]);
        assert_eq!(r.current(0), Some(DoubleTapThenHold));
        assert!(r.is_speculative(0));

        // held as long as the key is, whatever the time
        r.tick(5000, &mut out);
        assert_eq!(out.0.len(), 2);

        r.release(0, 6000, &mut out);
        assert_eq!(
            out.0,
            [
                Output::Tap(k(Q)),
                Output::Hold(k(Q)),
                Output::Release(k(Q))
            ]
        );
        assert!(!r.is_speculative(0));
        assert_eq!(r.current(0), None);
    }

    #[test]
    fn interrupted_double_tap_retracts_at_once() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0), (false, 50), (true, 100), (false, 140)], 150);
        r.interrupt(150, &mut out);
        assert_eq!(
            out.0,
            [
                Output::Tap(k(Q)),
                Output::Hold(k(Q)),
                Output::Release(k(Q))
            ]
        );
        assert!(!r.is_speculative(0));
        assert_eq!(r.current(0), None);
    }

    #[test]
    fn triple() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        let taps = [(true, 0), (false, 20), (true, 40), (false, 60), (true, 80), (false, 100)];
        play(&mut r, &mut out, &taps, 400);
        assert_eq!(out.0, [Output::Tap(k(F2))]);

        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &taps[..5], 400);
        assert_eq!(out.0, [Output::Tap(k(F3))]);
        assert_eq!(r.current(0), Some(TripleHold));
    }

    #[test]
    fn four_presses_do_nothing() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        let taps = [
            (true, 0),
            (false, 20),
            (true, 40),
            (false, 60),
            (true, 80),
            (false, 100),
            (true, 120),
        ];
        play(&mut r, &mut out, &taps, 400);
        assert_eq!(r.current(0), Some(Unknown));
        r.release(0, 500, &mut out);
        assert!(out.0.is_empty());
        assert_eq!(r.current(0), None);
        assert!(!r.is_speculative(0));
    }

    #[test]
    fn press_on_other_channel_interrupts() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        r.press(0, 0, &mut out);
        r.press(1, 10, &mut out);
        assert_eq!(out.0, [Output::Tap(k(Q))]);
        assert_eq!(r.current(0), Some(SingleTap));
        r.release(0, 20, &mut out);
        r.release(1, 30, &mut out);
        r.tick(230, &mut out);
        assert_eq!(out.0, [Output::Tap(k(Q)), Output::Tap(k(W))]);
        assert_eq!(r.current(0), None);
        assert_eq!(r.current(1), None);
    }

    #[test]
    fn settles_from_last_press() {
        // a slow tap then a hold are two bursts, not a double hold
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0), (false, 190), (true, 350)], 549);
        assert_eq!(out.0, [Output::Tap(k(Q))]);
        assert_eq!(r.current(0), None);
        r.tick(550, &mut out);
        assert_eq!(out.0, [Output::Tap(k(Q)), Output::Tap(m(&[LShift, Kb1]))]);
        assert_eq!(r.current(0), Some(SingleHold));
        r.release(0, 700, &mut out);
        assert_eq!(out.0.len(), 2);
    }

    #[test]
    fn release_does_not_delay_resolution() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0), (false, 199)], 199);
        assert!(out.0.is_empty());
        r.tick(200, &mut out);
        assert_eq!(out.0, [Output::Tap(k(Q))]);
    }

    #[test]
    fn new_burst_after_reset() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0), (false, 10), (true, 300), (false, 310)], 600);
        assert_eq!(out.0, [Output::Tap(k(Q)), Output::Tap(k(Q))]);
    }

    #[test]
    fn clock_wraps() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        let start = u32::MAX - 50;
        r.press(0, start, &mut out);
        r.release(0, start.wrapping_add(20), &mut out);
        r.tick(start.wrapping_add(199), &mut out);
        assert!(out.0.is_empty());
        r.tick(start.wrapping_add(200), &mut out);
        assert_eq!(out.0, [Output::Tap(k(Q))]);
    }

    #[test]
    fn unknown_channels_are_ignored() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        r.press(5, 0, &mut out);
        r.release(5, 10, &mut out);
        r.release(0, 10, &mut out);
        assert!(!r.is_pending());
        assert!(out.0.is_empty());
        assert!(r.log().is_empty());
    }

    #[test]
    fn too_many_channels() {
        static BIG: [DanceEntry; MAX_CHANNELS + 1] = [DanceEntry::NOOP; MAX_CHANNELS + 1];
        assert_eq!(
            Resolver::new(&BIG, TERM).err(),
            Some(ConfigError::TooManyChannels {
                found: MAX_CHANNELS + 1,
                max: MAX_CHANNELS
            })
        );
    }

    #[test]
    fn trace() {
        let (mut r, mut out) = (resolver(), Recorder::default());
        play(&mut r, &mut out, &[(true, 0), (false, 50), (true, 100)], 150);
        r.interrupt(150, &mut out);
        r.release(0, 170, &mut out);
        let kinds: Vec<_> = r.log().records().map(|rec| rec.kind).collect();
        use TraceKind::*;
        assert_eq!(kinds, [Press, Release, Press, Interrupt, Resolve, Release, Supersede]);
        let resolve = r.log().records().find(|rec| rec.kind == Resolve).unwrap();
        assert_eq!(resolve.dance(), Some(DoubleTapThenHold));
        assert_eq!(*resolve.count, 2);
        assert_eq!(resolve.timestamp, 150);
    }
}
