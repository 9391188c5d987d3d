//! OS termination signals → session cancellation.
//!
//! A dedicated thread runs a single-threaded tokio runtime that waits for
//! SIGINT or SIGTERM. On receipt it logs the signal and cancels the shared
//! [`CancellationToken`]. It never touches session state; the event loop
//! notices the cancelled token and unwinds on its own.
//!
//! While the TUI holds the terminal in raw mode, Ctrl+C arrives as a key
//! press rather than SIGINT, so in practice this mostly catches `kill`.

use std::io;
use std::thread;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Handle to the signal-observer thread.
///
/// Dropping it stops and joins the thread without cancelling the session.
#[derive(Debug)]
pub struct SignalObserver {
    stop: CancellationToken,
    handle: Option<thread::JoinHandle<()>>,
}

impl SignalObserver {
    /// Start observing. `cancel` is cancelled at most once, on the first
    /// termination signal.
    ///
    /// The listeners are registered before this returns, so any signal
    /// sent after `Ok` is delivered to the observer rather than killing
    /// the process.
    pub fn spawn(cancel: CancellationToken) -> io::Result<Self> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let listeners = {
            let _guard = runtime.enter();
            Termination::listen()?
        };
        let stop = CancellationToken::new();
        let stopped = stop.clone();

        let handle = thread::Builder::new()
            .name("signal-observer".into())
            .spawn(move || runtime.block_on(observe(listeners, cancel, stopped)))?;

        Ok(SignalObserver {
            stop,
            handle: Some(handle),
        })
    }
}

impl Drop for SignalObserver {
    fn drop(&mut self) {
        self.stop.cancel();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                warn!("signal observer panicked");
            }
        }
    }
}

async fn observe(mut listeners: Termination, cancel: CancellationToken, stop: CancellationToken) {
    tokio::select! {
        _ = stop.cancelled() => debug!("signal observer stopped"),
        signal = listeners.recv() => {
            info!(signal, "termination requested, cancelling session");
            cancel.cancel();
        }
    }
}

/// Registered termination-signal listeners.
#[cfg(unix)]
#[derive(Debug)]
struct Termination {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Termination {
    /// Must run inside a runtime context.
    fn listen() -> io::Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};

        Ok(Termination {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "SIGINT",
            _ = self.terminate.recv() => "SIGTERM",
        }
    }
}

#[cfg(windows)]
#[derive(Debug)]
struct Termination {
    ctrl_c: tokio::signal::windows::CtrlC,
}

#[cfg(windows)]
impl Termination {
    fn listen() -> io::Result<Self> {
        Ok(Termination {
            ctrl_c: tokio::signal::windows::ctrl_c()?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        self.ctrl_c.recv().await;
        "ctrl-c"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    // Signal dispositions are process-wide; observers in parallel tests
    // would all see the same signal.
    static SIGNALS: Mutex<()> = Mutex::new(());

    #[test]
    fn dropping_the_observer_does_not_cancel_the_session() {
        let _serial = SIGNALS.lock().unwrap_or_else(|e| e.into_inner());
        let cancel = CancellationToken::new();
        let observer = SignalObserver::spawn(cancel.clone()).unwrap();

        let started = Instant::now();
        drop(observer);

        assert!(!cancel.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[cfg(unix)]
    #[test]
    fn sigterm_right_after_spawn_cancels_the_session() {
        let _serial = SIGNALS.lock().unwrap_or_else(|e| e.into_inner());
        let cancel = CancellationToken::new();
        let _observer = SignalObserver::spawn(cancel.clone()).unwrap();

        // SAFETY: raise only delivers a signal to this process, and a
        // handler for SIGTERM is already registered.
        assert_eq!(unsafe { libc::raise(libc::SIGTERM) }, 0);

        let deadline = Instant::now() + Duration::from_secs(2);
        while !cancel.is_cancelled() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert!(cancel.is_cancelled());
    }
}
