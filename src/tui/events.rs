use log::debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CEvent, KeyEvent};

use crate::prayer_times::ResolvedDay;

/// Everything the UI thread reacts to. Ticks and resolutions carry the
/// generation of the schedule they were started for.
#[derive(Debug)]
pub enum Event {
    Key(KeyEvent),
    Tick { generation: u64 },
    Resolved { generation: u64, day: ResolvedDay },
}

pub struct EventHandler {
    tx: Sender<Event>,
    rx: mpsc::Receiver<Event>,
}

impl EventHandler {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self { tx, rx }
    }

    /// Forward terminal key presses into the channel from a reader thread.
    pub fn listen_keys(&self, poll_ms: u64) {
        let tx = self.tx.clone();
        let poll = Duration::from_millis(poll_ms);
        thread::spawn(move || loop {
            match event::poll(poll) {
                Ok(true) => match event::read() {
                    Ok(CEvent::Key(key)) => {
                        if tx.send(Event::Key(key)).is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(_) => break,
                },
                Ok(false) => {}
                Err(_) => break,
            }
        });
    }

    pub fn sender(&self) -> Sender<Event> {
        self.tx.clone()
    }

    pub fn next(&self) -> Result<Event, mpsc::RecvError> {
        self.rx.recv()
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Owned handle to the periodic tick of one schedule generation.
///
/// Started when a schedule becomes ready. Stopping (or dropping) it joins
/// the thread, so two tickers never overlap.
pub struct Ticker {
    generation: u64,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub fn start(generation: u64, period: Duration, tx: Sender<Event>) -> Self {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);

        let handle = thread::spawn(move || {
            let mut due = Instant::now();
            while !flag.load(Ordering::Acquire) {
                if tx.send(Event::Tick { generation }).is_err() {
                    break;
                }
                due += period;
                // park until the next due instant; stop() unparks us early
                loop {
                    if flag.load(Ordering::Acquire) {
                        return;
                    }
                    let now = Instant::now();
                    if now >= due {
                        break;
                    }
                    thread::park_timeout(due - now);
                }
            }
        });

        debug!("ticker started for generation {}", generation);
        Self {
            generation,
            stop,
            handle: Some(handle),
        }
    }

    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Release);
        if let Some(handle) = self.handle.take() {
            handle.thread().unpark();
            let _ = handle.join();
            debug!("ticker stopped for generation {}", self.generation);
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Run one resolution pass off the UI thread and post the result tagged with
/// `generation`.
pub fn spawn_resolution<F>(generation: u64, tx: Sender<Event>, job: F) -> JoinHandle<()>
where
    F: FnOnce() -> ResolvedDay + Send + 'static,
{
    thread::spawn(move || {
        let day = job();
        // receiver gone means the UI has shut down
        let _ = tx.send(Event::Resolved { generation, day });
    })
}
