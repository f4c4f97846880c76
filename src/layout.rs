//! Layout management.
//!
//! The [`Layout`] is the glue between the key matrix and the USB
//! report: it takes [`Event`]s and `tick`s as input, routes tap dance
//! keys to the [`Resolver`], times the boot key and hold-taps, and
//! generates the keys of each report.
//!
//! Everything the layout sends goes through one output queue, applied
//! at most one output per tick. A tap occupies one report pressed and
//! the next one released, so that two taps of the same key are seen by
//! the host as two key strokes, and so that the outputs of a dance are
//! sent before the key press that interrupted it.

use crate::action::Action;
use crate::boot_hold::LongHold;
use crate::config::Config;
use crate::dance::Resolver;
use crate::error::ConfigError;
use crate::key_code::KeyCode;
use crate::table::{DanceEntry, Emit, Output};
use heapless::{Deque, Vec};
use log::{info, warn};

use State::*;

/// The Layers type.
///
/// The first level correspond to the layer, the two others to the
/// switch matrix.  For example, `layers[1][2][3]` correspond to the
/// key i=2, j=3 on the layer 1.
pub type Layers = &'static [&'static [&'static [Action]]];

/// Outputs waiting to be applied.
const QUEUE_LEN: usize = 32;

/// Events kept while a hold-tap is undecided.
const STACK_LEN: usize = 16;

/// The layout manager. It takes `Event`s and `tick`s as input, and
/// generate keyboard reports.
pub struct Layout {
    layers: Layers,
    default_layer: usize,
    config: Config,
    /// Milliseconds since startup, wrapping.
    now: u32,
    states: Vec<State, 64>,
    waiting: Option<Waiting>,
    stacked: Deque<Stacked, STACK_LEN>,
    dances: Resolver,
    boot: LongHold,
    outputs: Outputs,
    held: Vec<KeyCode, 64>,
    tapped: Option<Action>,
    custom: CustomEvent,
}

/// An event on the key matrix.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Event {
    /// Press event with coordinates (i, j).
    Press(u8, u8),
    /// Release event with coordinates (i, j).
    Release(u8, u8),
}
impl Event {
    /// Returns the coordinates (i, j) of the event.
    pub fn coord(self) -> (u8, u8) {
        match self {
            Event::Press(i, j) => (i, j),
            Event::Release(i, j) => (i, j),
        }
    }

    /// Transforms the coordinates of the event.
    ///
    /// # Example
    ///
    /// ```
    /// # use dance_fw::layout::Event;
    /// assert_eq!(
    ///     Event::Press(3, 10),
    ///     Event::Press(3, 1).transform(|i, j| (i, 11 - j)),
    /// );
    /// ```
    pub fn transform(self, f: impl FnOnce(u8, u8) -> (u8, u8)) -> Self {
        match self {
            Event::Press(i, j) => {
                let (i, j) = f(i, j);
                Event::Press(i, j)
            }
            Event::Release(i, j) => {
                let (i, j) = f(i, j);
                Event::Release(i, j)
            }
        }
    }

    /// Returns `true` if the event is a key press.
    pub fn is_press(self) -> bool {
        match self {
            Event::Press(..) => true,
            Event::Release(..) => false,
        }
    }

    /// Returns `true` if the event is a key release.
    pub fn is_release(self) -> bool {
        match self {
            Event::Release(..) => true,
            Event::Press(..) => false,
        }
    }
}

/// Event from the layout that the firmware has to handle itself.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CustomEvent {
    /// Nothing to do.
    NoEvent,
    /// The boot key was held long enough, jump to the bootloader.
    EnterBootloader,
}

/// What a pressed key does on release.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
enum State {
    NormalKey { action: Action, coord: (u8, u8) },
    DanceKey { channel: usize, coord: (u8, u8) },
    BootKey { coord: (u8, u8) },
}
impl State {
    fn coord(&self) -> (u8, u8) {
        match *self {
            NormalKey { coord, .. } | DanceKey { coord, .. } | BootKey { coord } => coord,
        }
    }
}

/// A hold-tap key not yet decided.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
struct Waiting {
    coord: (u8, u8),
    hold: KeyCode,
    tap: KeyCode,
    since: u32,
}

/// An event delayed behind an undecided hold-tap, with its arrival time.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
struct Stacked {
    event: Event,
    since: u32,
}

struct Outputs(Deque<Output, QUEUE_LEN>);

impl Outputs {
    fn push(&mut self, output: Output) {
        if let Err(output) = self.0.push_back(output) {
            warn!("output queue full, dropping {:?}", output);
        }
    }
}

impl Emit for Outputs {
    fn tap(&mut self, action: Action) {
        self.push(Output::Tap(action));
    }
    fn hold(&mut self, action: Action) {
        self.push(Output::Hold(action));
    }
    fn release(&mut self, action: Action) {
        self.push(Output::Release(action));
    }
}

impl Layout {
    /// Creates a new `Layout` object.
    ///
    /// Fails if a layer uses a dance channel missing from `dances`, or
    /// if the dance table itself is inconsistent.
    pub fn new(
        layers: Layers,
        dances: &'static [DanceEntry],
        config: Config,
    ) -> Result<Self, ConfigError> {
        check_channels(layers, dances.len())?;
        Ok(Self {
            layers,
            default_layer: 0,
            config,
            now: 0,
            states: Vec::new(),
            waiting: None,
            stacked: Deque::new(),
            dances: Resolver::new(dances, config.tapping_term)?,
            boot: LongHold::new(config.boot_hold),
            outputs: Outputs(Deque::new()),
            held: Vec::new(),
            tapped: None,
            custom: CustomEvent::NoEvent,
        })
    }

    /// Iterates on the key codes of the current state.
    pub fn keycodes(&self) -> impl Iterator<Item = KeyCode> + '_ {
        self.held
            .iter()
            .copied()
            .chain(self.tapped.iter().flat_map(|a| a.key_codes()))
    }

    /// The tap dance resolver, for inspection.
    pub fn dances(&self) -> &Resolver {
        &self.dances
    }

    /// Obtain the index of the current active layer
    pub fn current_layer(&self) -> usize {
        self.default_layer
    }

    /// A time event.
    ///
    /// This method must be called regularly, typically every millisecond.
    ///
    /// Returns `CustomEvent::EnterBootloader` once after the boot key
    /// was released.
    pub fn tick(&mut self) -> CustomEvent {
        self.now = self.now.wrapping_add(1);
        if let Some(w) = self.waiting {
            let release = Event::Release(w.coord.0, w.coord.1);
            if self.stacked.iter().any(|s| s.event == release) {
                self.waiting = None;
                self.outputs.tap(Action::KeyCode(w.tap));
                self.replay();
            } else if self.now.wrapping_sub(w.since) >= self.config.tapping_term {
                self.waiting = None;
                self.hold(w);
                self.replay();
            }
        }
        self.dances.tick(self.now, &mut self.outputs);
        self.step();
        core::mem::replace(&mut self.custom, CustomEvent::NoEvent)
    }

    /// Register a key event.
    ///
    /// While a hold-tap is undecided, events are kept and replayed once
    /// it is: a release of the hold-tap before the tapping term makes it
    /// a tap, otherwise it is a hold.
    pub fn event(&mut self, event: Event) {
        if self.waiting.is_none() {
            return self.unstack(event, self.now);
        }
        let stacked = Stacked {
            event,
            since: self.now,
        };
        if let Err(stacked) = self.stacked.push_back(stacked) {
            warn!("too many events behind a hold-tap, holding it");
            if let Some(w) = self.waiting.take() {
                self.hold(w);
            }
            self.replay();
            self.event(stacked.event);
        }
    }

    /// Processes kept events until none is left or a new hold-tap
    /// waits.
    fn replay(&mut self) {
        while self.waiting.is_none() {
            match self.stacked.pop_front() {
                Some(s) => self.unstack(s.event, s.since),
                None => break,
            }
        }
    }

    fn unstack(&mut self, event: Event, now: u32) {
        match event {
            Event::Press(i, j) => self.press((i, j), now),
            Event::Release(i, j) => self.release((i, j), now),
        }
    }

    fn press(&mut self, coord: (u8, u8), now: u32) {
        let action = self.press_as_action(coord, self.default_layer);
        if action.dance().is_none() {
            self.dances.interrupt(now, &mut self.outputs);
        }
        self.do_action(action, coord, now);
    }

    /// A released hold-tap that was tapped has no state: its release
    /// does nothing.
    fn release(&mut self, coord: (u8, u8), now: u32) {
        let state = match self.states.iter().position(|s| s.coord() == coord) {
            Some(i) => self.states.swap_remove(i),
            None => return,
        };
        match state {
            NormalKey { action, .. } => self.outputs.release(action),
            DanceKey { channel, .. } => self.dances.release(channel, now, &mut self.outputs),
            BootKey { .. } => {
                let custom = &mut self.custom;
                self.boot.release(now, || {
                    info!("boot key held, entering bootloader");
                    *custom = CustomEvent::EnterBootloader;
                });
            }
        }
    }

    fn press_as_action(&self, coord: (u8, u8), layer: usize) -> Action {
        self.layers
            .get(layer)
            .and_then(|l| l.get(coord.0 as usize))
            .and_then(|l| l.get(coord.1 as usize))
            .copied()
            .unwrap_or(Action::NoOp)
    }

    fn do_action(&mut self, action: Action, coord: (u8, u8), now: u32) {
        use Action::*;
        match action {
            NoOp => (),
            KeyCode(_) | MultipleKeyCodes(_) => {
                self.outputs.hold(action);
                self.push_state(NormalKey { action, coord });
            }
            DefaultLayer(value) => {
                if value < self.layers.len() {
                    self.default_layer = value
                }
            }
            HoldTap { hold, tap } => {
                self.waiting = Some(Waiting {
                    coord,
                    hold,
                    tap,
                    since: now,
                })
            }
            TapDance(channel) => {
                self.dances.press(channel, now, &mut self.outputs);
                self.push_state(DanceKey { channel, coord });
            }
            BootHold => {
                self.boot.press(now);
                self.push_state(BootKey { coord });
            }
        }
    }

    fn hold(&mut self, w: Waiting) {
        let action = Action::KeyCode(w.hold);
        self.outputs.hold(action);
        self.push_state(NormalKey {
            action,
            coord: w.coord,
        });
    }

    fn push_state(&mut self, state: State) {
        if let Err(state) = self.states.push(state) {
            warn!("too many keys pressed, ignoring {:?}", state);
        }
    }

    /// Applies the next output.
    fn step(&mut self) {
        if self.tapped.take().is_some() {
            return;
        }
        match self.outputs.0.pop_front() {
            Some(Output::Tap(action)) => self.tapped = Some(action),
            Some(Output::Hold(action)) => {
                for kc in action.key_codes() {
                    if self.held.push(kc).is_err() {
                        warn!("too many keys held, ignoring {:?}", kc);
                    }
                }
            }
            Some(Output::Release(action)) => {
                for kc in action.key_codes() {
                    if let Some(i) = self.held.iter().position(|&h| h == kc) {
                        self.held.swap_remove(i);
                    }
                }
            }
            None => (),
        }
    }
}

fn check_channels(layers: Layers, channels: usize) -> Result<(), ConfigError> {
    for (layer, rows) in layers.iter().enumerate() {
        for (row, keys) in rows.iter().enumerate() {
            for (col, action) in keys.iter().enumerate() {
                match action.dance() {
                    Some(channel) if channel >= channels => {
                        return Err(ConfigError::MissingChannel {
                            layer,
                            row,
                            col,
                            channel,
                        })
                    }
                    _ => (),
                }
            }
        }
    }
    Ok(())
}
