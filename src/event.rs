use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyEvent, MouseEvent};

pub enum HostEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    FocusGained,
    FocusLost,
    Tick,
    Resize(u16, u16),
}

impl HostEvent {
    fn from_terminal(event: Event) -> Option<Self> {
        match event {
            Event::Key(key) => Some(HostEvent::Key(key)),
            Event::Mouse(mouse) => Some(HostEvent::Mouse(mouse)),
            Event::FocusGained => Some(HostEvent::FocusGained),
            Event::FocusLost => Some(HostEvent::FocusLost),
            Event::Resize(w, h) => Some(HostEvent::Resize(w, h)),
            _ => None,
        }
    }
}

/// Tick deadline measured from the last tick, so a stream of input events
/// cannot hold ticks back.
struct TickSchedule {
    rate: Duration,
    last_tick: Instant,
}

impl TickSchedule {
    fn new(rate: Duration, now: Instant) -> Self {
        Self { rate, last_tick: now }
    }

    /// How long the next poll may block before a tick is due.
    fn timeout(&self, now: Instant) -> Duration {
        self.rate.saturating_sub(now.duration_since(self.last_tick))
    }

    fn take_tick(&mut self, now: Instant) -> bool {
        if now.duration_since(self.last_tick) >= self.rate {
            self.last_tick = now;
            true
        } else {
            false
        }
    }
}

/// Polls the terminal on a background thread and forwards events, emitting
/// a `Tick` every tick rate whether or not input is arriving.
pub struct EventHandler {
    rx: mpsc::Receiver<HostEvent>,
    _tx: mpsc::Sender<HostEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        let _tx = tx.clone();

        thread::spawn(move || {
            let mut ticks = TickSchedule::new(tick_rate, Instant::now());
            loop {
                if event::poll(ticks.timeout(Instant::now())).unwrap_or(false) {
                    let message = match event::read() {
                        Ok(event) => HostEvent::from_terminal(event),
                        Err(e) => {
                            log::warn!("terminal read failed: {e}");
                            None
                        }
                    };
                    if let Some(message) = message {
                        if tx.send(message).is_err() {
                            return;
                        }
                    }
                }
                if ticks.take_tick(Instant::now()) && tx.send(HostEvent::Tick).is_err() {
                    return;
                }
            }
        });

        Self { rx, _tx }
    }

    pub fn next(&self) -> anyhow::Result<HostEvent> {
        Ok(self.rx.recv()?)
    }
}
