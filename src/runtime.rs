use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseButton, MouseEventKind};

/// What the host loop reacts to
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    Key(KeyEvent),
    /// Left button pressed at a terminal cell
    Click { column: u16, row: u16 },
    Resize,
    Tick,
}

/// Reads crossterm events on a background thread, keeping only what the game uses
pub fn crossterm_events() -> Receiver<GameEvent> {
    let (tx, rx) = mpsc::channel();

    std::thread::spawn(move || loop {
        let evt = match event::read() {
            Ok(CtEvent::Key(key)) => Some(GameEvent::Key(key)),
            Ok(CtEvent::Mouse(mouse)) if mouse.kind == MouseEventKind::Down(MouseButton::Left) => {
                Some(GameEvent::Click {
                    column: mouse.column,
                    row: mouse.row,
                })
            }
            Ok(CtEvent::Resize(_, _)) => Some(GameEvent::Resize),
            Ok(_) => None,
            Err(_) => break,
        };

        if let Some(evt) = evt {
            if tx.send(evt).is_err() {
                break;
            }
        }
    });

    rx
}

/// Turns a stream of input events into a paced loop: each step waits at most
/// one tick for input and reports `Tick` when none came.
pub struct Runner {
    events: Receiver<GameEvent>,
    tick: Duration,
}

impl Runner {
    pub fn new(events: Receiver<GameEvent>, tick: Duration) -> Self {
        Self { events, tick }
    }

    pub fn step(&self) -> GameEvent {
        match self.events.recv_timeout(self.tick) {
            Ok(evt) => evt,
            Err(RecvTimeoutError::Timeout) => GameEvent::Tick,
            // a closed channel degrades to a plain ticker
            Err(RecvTimeoutError::Disconnected) => {
                std::thread::sleep(self.tick);
                GameEvent::Tick
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_returns_tick_on_timeout() {
        let (_tx, rx) = mpsc::channel();
        let runner = Runner::new(rx, Duration::from_millis(1));
        assert_eq!(runner.step(), GameEvent::Tick);
    }

    #[test]
    fn step_passes_through_events() {
        let (tx, rx) = mpsc::channel();
        tx.send(GameEvent::Click { column: 3, row: 7 }).unwrap();
        let runner = Runner::new(rx, Duration::from_millis(10));

        assert_eq!(runner.step(), GameEvent::Click { column: 3, row: 7 });
        assert_eq!(runner.step(), GameEvent::Tick);
    }

    #[test]
    fn disconnected_source_keeps_ticking() {
        let (tx, rx) = mpsc::channel::<GameEvent>();
        drop(tx);
        let runner = Runner::new(rx, Duration::from_millis(1));
        assert_eq!(runner.step(), GameEvent::Tick);
    }
}
