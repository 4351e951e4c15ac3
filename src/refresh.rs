//! Refresh drivers.
//!
//! A driver decides *when* the render routine runs, independently of how often the caller
//! advances the counter. Two strategies share the same `activate` / `suspend` / `render`
//! surface:
//!
//! * [`RefreshMode::Background`]: a dedicated worker redraws every [`REFRESH_INTERVAL`]
//!   while active. `render` is a no-op because the worker keeps its own cadence.
//! * [`RefreshMode::Synchronous`]: no thread at all. `render` redraws on the caller's
//!   thread, at most once per [`REFRESH_INTERVAL`].
//!
//! # Worker handshake
//!
//! The background worker and the controlling thread share one [`Mutex`] guarding a
//! requested [`Command`] and the worker's acknowledged [`Phase`], plus two condition
//! variables: one wakes the worker when the command changes, the other wakes the
//! controller when the phase changes. `activate` returns only once the worker has drawn
//! at least one frame; `suspend` returns only once the worker has drawn its final frame
//! and parked. Nobody spins.

use std::{
    sync::Arc,
    thread::{self, JoinHandle},
    time::Duration,
};

use parking_lot::{Condvar, Mutex, MutexGuard};
use web_time::Instant;

/// Minimum time between two redraws (about 28 frames per second).
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(35);

/// The render routine a driver invokes.
pub(crate) type Task = Arc<dyn Fn() + Send + Sync + 'static>;

/// Scheduling strategy of a bar, chosen at construction.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefreshMode {
    /// Redraw continuously from a dedicated worker thread.
    #[default]
    Background,
    /// Redraw on the caller's thread, rate-limited.
    Synchronous,
}

/// One of the two drivers.
pub(crate) enum Refresher {
    Background(Background),
    Synchronous(Synchronous),
}

impl Refresher {
    pub(crate) fn new(mode: RefreshMode, task: Task) -> Self {
        match mode {
            RefreshMode::Background => Self::Background(Background::spawn(task)),
            RefreshMode::Synchronous => Self::Synchronous(Synchronous::new(task)),
        }
    }

    /// Starts producing output. Returns after the first frame was drawn.
    pub(crate) fn activate(&mut self) {
        match self {
            Self::Background(driver) => driver.activate(),
            Self::Synchronous(driver) => driver.activate(),
        }
    }

    /// Stops producing output. Returns after the last frame was drawn.
    pub(crate) fn suspend(&mut self) {
        match self {
            Self::Background(driver) => driver.suspend(),
            Self::Synchronous(driver) => driver.suspend(),
        }
    }

    /// Offers a redraw opportunity.
    pub(crate) fn render(&mut self) {
        match self {
            Self::Background(_) => {}
            Self::Synchronous(driver) => driver.render(),
        }
    }
}

/// What the controller asks the worker to do.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Command {
    Park,
    Run,
    Quit,
}

/// What the worker confirms it is doing.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Phase {
    Parked,
    Active,
    Exited,
}

struct Control {
    command: Command,
    phase: Phase,
}

struct Handshake {
    control: Mutex<Control>,
    command_changed: Condvar,
    phase_changed: Condvar,
}

impl Handshake {
    fn acknowledge(&self, control: &mut MutexGuard<'_, Control>, phase: Phase) {
        control.phase = phase;
        self.phase_changed.notify_all();
    }
}

/// Redraws from a dedicated worker thread.
pub(crate) struct Background {
    handshake: Arc<Handshake>,
    worker: Option<JoinHandle<()>>,
}

impl Background {
    fn spawn(task: Task) -> Self {
        let handshake = Arc::new(Handshake {
            control: Mutex::new(Control {
                command: Command::Park,
                phase: Phase::Parked,
            }),
            command_changed: Condvar::new(),
            phase_changed: Condvar::new(),
        });

        let shared = Arc::clone(&handshake);
        let worker = thread::spawn(move || work(&shared, task.as_ref()));
        tracing::debug!("progress refresh worker spawned");

        Self {
            handshake,
            worker: Some(worker),
        }
    }

    fn activate(&self) {
        let mut control = self.handshake.control.lock();
        control.command = Command::Run;
        self.handshake.command_changed.notify_one();
        while control.phase == Phase::Parked {
            self.handshake.phase_changed.wait(&mut control);
        }
        tracing::trace!(phase = ?control.phase, "refresh worker activated");
    }

    fn suspend(&self) {
        let mut control = self.handshake.control.lock();
        if control.command == Command::Quit {
            return;
        }
        control.command = Command::Park;
        self.handshake.command_changed.notify_one();
        while control.phase == Phase::Active {
            self.handshake.phase_changed.wait(&mut control);
        }
        tracing::trace!(phase = ?control.phase, "refresh worker suspended");
    }
}

impl Drop for Background {
    fn drop(&mut self) {
        self.handshake.control.lock().command = Command::Quit;
        self.handshake.command_changed.notify_all();

        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::warn!("progress refresh worker panicked");
        }
    }
}

/// Worker loop. The lock is released while the task runs and while waiting.
fn work(handshake: &Handshake, task: &(dyn Fn() + Send + Sync)) {
    let mut control = handshake.control.lock();
    loop {
        match control.command {
            Command::Quit => break,
            Command::Park if control.phase == Phase::Active => {
                // Draw the last known state once before parking.
                MutexGuard::unlocked(&mut control, task);
                handshake.acknowledge(&mut control, Phase::Parked);
            }
            Command::Park => handshake.command_changed.wait(&mut control),
            Command::Run => {
                MutexGuard::unlocked(&mut control, task);
                if control.phase == Phase::Parked {
                    handshake.acknowledge(&mut control, Phase::Active);
                }
                if control.command == Command::Run {
                    handshake
                        .command_changed
                        .wait_for(&mut control, REFRESH_INTERVAL);
                }
            }
        }
    }
    handshake.acknowledge(&mut control, Phase::Exited);
    tracing::debug!("progress refresh worker exited");
}

/// Redraws on the caller's thread, at most once per [`REFRESH_INTERVAL`].
pub(crate) struct Synchronous {
    task: Task,
    active: bool,
    last_render: Instant,
}

impl Synchronous {
    fn new(task: Task) -> Self {
        Self {
            task,
            active: false,
            last_render: Instant::now(),
        }
    }

    fn activate(&mut self) {
        if self.active {
            return;
        }
        self.last_render = Instant::now();
        (self.task)();
        self.active = true;
    }

    fn suspend(&mut self) {
        if !self.active {
            return;
        }
        (self.task)();
        self.active = false;
    }

    fn render(&mut self) {
        if !self.active {
            return;
        }
        let now = Instant::now();
        if now.duration_since(self.last_render) < REFRESH_INTERVAL {
            return;
        }
        self.last_render = now;
        (self.task)();
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Arc,
            atomic::{AtomicUsize, Ordering},
        },
        thread,
        time::Duration,
    };

    use super::{REFRESH_INTERVAL, RefreshMode, Refresher, Task};

    fn counting() -> (Arc<AtomicUsize>, Task) {
        let calls = Arc::new(AtomicUsize::new(0));
        let handle = Arc::clone(&calls);
        let task: Task = Arc::new(move || {
            handle.fetch_add(1, Ordering::SeqCst);
        });
        (calls, task)
    }

    /// Synchronous Cadence
    /// Activation and suspension each draw once; renders in between are rate-limited.
    #[test]
    fn test_synchronous_rate_limit() {
        let (calls, task) = counting();
        let mut driver = Refresher::new(RefreshMode::Synchronous, task);

        driver.render();
        assert_eq!(calls.load(Ordering::SeqCst), 0, "inactive driver never draws");

        driver.activate();
        driver.render();
        driver.render();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        thread::sleep(REFRESH_INTERVAL + Duration::from_millis(5));
        driver.render();
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        driver.suspend();
        driver.suspend();
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    /// Background Handshake
    /// Activation waits for a first frame, suspension for a final one, and nothing is
    /// drawn while parked.
    #[test]
    fn test_background_handshake() {
        let (calls, task) = counting();
        let mut driver = Refresher::new(RefreshMode::Background, task);

        thread::sleep(Duration::from_millis(20));
        assert_eq!(calls.load(Ordering::SeqCst), 0, "worker starts parked");

        driver.activate();
        assert!(calls.load(Ordering::SeqCst) >= 1);

        driver.suspend();
        let parked = calls.load(Ordering::SeqCst);
        assert!(parked >= 2, "suspension draws a final frame");

        thread::sleep(REFRESH_INTERVAL * 3);
        assert_eq!(calls.load(Ordering::SeqCst), parked, "parked worker stays quiet");

        driver.activate();
        driver.suspend();
        assert!(calls.load(Ordering::SeqCst) >= parked + 2);
    }

    /// Background Cadence
    /// An active worker keeps redrawing without being asked.
    #[test]
    fn test_background_redraws_while_active() {
        let (calls, task) = counting();
        let mut driver = Refresher::new(RefreshMode::Background, task);

        driver.activate();
        thread::sleep(REFRESH_INTERVAL * 4);
        assert!(calls.load(Ordering::SeqCst) >= 2);
        driver.suspend();
    }

    /// Teardown
    /// Dropping an active driver joins the worker and stops all drawing.
    #[test]
    fn test_background_drop_joins() {
        let (calls, task) = counting();
        let mut driver = Refresher::new(RefreshMode::Background, task);
        driver.activate();
        drop(driver);

        let after = calls.load(Ordering::SeqCst);
        thread::sleep(REFRESH_INTERVAL * 2);
        assert_eq!(calls.load(Ordering::SeqCst), after);
        assert_eq!(Arc::strong_count(&calls), 1, "worker released the task");
    }
}
