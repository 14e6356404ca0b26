//! # External interrupts and cross-platform OS signal handling.
//!
//! An [`Interrupt`] is the runtime's model of an asynchronous stop request coming from
//! outside the process (Ctrl-C, `kill`, systemd). It is a counted latch:
//! - [`Interrupt::raise`] bumps the count (OS signal listener, tests, embedding apps);
//! - an [`InterruptListener`] completes [`recv`](InterruptListener::recv) once per new raise.
//!
//! Interrupts never unwind anything. The foreground runner and the join phase select on
//! a listener at each blocking point and translate a raise into the cooperative stop path.
//!
//! ## Signals
//! **Unix platforms:**
//! - `SIGINT` (Ctrl-C in terminal)
//! - `SIGTERM` (default kill signal, used by systemd)
//! - `SIGQUIT` (quit signal, often used for core dumps or hard stop)
//!
//! **Windows platforms:**
//! - `Ctrl-C` via [`tokio::signal::ctrl_c`]

use std::sync::Arc;

use tokio::sync::watch;

/// Counted external interrupt latch.
///
/// Cheap to clone; clones raise the same latch.
#[derive(Clone, Debug)]
pub struct Interrupt {
    tx: Arc<watch::Sender<u64>>,
}

impl Interrupt {
    /// Creates a latch that is only raised programmatically.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Creates a latch raised on every termination signal delivered to the process.
    ///
    /// Must be called inside a tokio runtime. Returns `Err` if signal registration fails.
    pub fn from_os_signals() -> std::io::Result<Self> {
        let interrupt = Self::new();
        let mut signals = OsSignals::register()?;
        let raiser = interrupt.clone();
        tokio::spawn(async move {
            loop {
                signals.recv().await;
                raiser.raise();
            }
        });
        Ok(interrupt)
    }

    /// Raises the latch once.
    pub fn raise(&self) {
        self.tx.send_modify(|n| *n = n.saturating_add(1));
    }

    /// Total number of raises so far.
    pub fn count(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Creates a listener that reports raises happening after this call.
    pub fn listen(&self) -> InterruptListener {
        InterruptListener {
            rx: self.tx.subscribe(),
        }
    }
}

impl Default for Interrupt {
    fn default() -> Self {
        Self::new()
    }
}

/// Receiving side of an [`Interrupt`].
///
/// Several raises between two `recv` calls coalesce into one.
#[derive(Debug)]
pub struct InterruptListener {
    rx: watch::Receiver<u64>,
}

impl InterruptListener {
    /// Completes on the next raise not yet observed by this listener.
    ///
    /// Cancel-safe; use it inside `tokio::select!`.
    pub async fn recv(&mut self) {
        if self.rx.changed().await.is_err() {
            // Every sender is gone; no interrupt can ever arrive.
            std::future::pending::<()>().await;
        }
    }

    /// True if a raise is waiting to be observed.
    pub fn is_pending(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Marks every raise so far as observed.
    ///
    /// Returns `true` if one was pending.
    pub fn mark_seen(&mut self) -> bool {
        let pending = self.is_pending();
        self.rx.borrow_and_update();
        pending
    }
}

/// Registered termination signal streams.
#[cfg(unix)]
struct OsSignals {
    sigint: tokio::signal::unix::Signal,
    sigterm: tokio::signal::unix::Signal,
    sigquit: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl OsSignals {
    fn register() -> std::io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};

        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
            sigquit: signal(SignalKind::quit())?,
        })
    }

    /// Waits for the next termination signal.
    async fn recv(&mut self) {
        tokio::select! {
            _ = self.sigint.recv()  => {},
            _ = self.sigterm.recv() => {},
            _ = self.sigquit.recv() => {},
        }
    }
}

#[cfg(not(unix))]
struct OsSignals;

#[cfg(not(unix))]
impl OsSignals {
    fn register() -> std::io::Result<Self> {
        Ok(Self)
    }

    /// Waits for the next Ctrl-C.
    async fn recv(&mut self) {
        if tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn listener_sees_raise_after_listen() {
        let interrupt = Interrupt::new();
        let mut listener = interrupt.listen();
        assert!(!listener.is_pending());

        interrupt.raise();
        assert!(listener.is_pending());
        tokio::time::timeout(Duration::from_secs(1), listener.recv())
            .await
            .expect("raise observed");
        assert!(!listener.is_pending());
        assert_eq!(interrupt.count(), 1);
    }

    #[tokio::test]
    async fn raises_before_listen_are_not_replayed() {
        let interrupt = Interrupt::new();
        interrupt.raise();
        let mut listener = interrupt.listen();
        let waited = tokio::time::timeout(Duration::from_millis(20), listener.recv()).await;
        assert!(waited.is_err());
    }

    #[tokio::test]
    async fn mark_seen_swallows_pending_raises() {
        let interrupt = Interrupt::new();
        let mut listener = interrupt.listen();
        assert!(!listener.mark_seen());

        interrupt.raise();
        interrupt.raise();
        assert!(listener.mark_seen());
        assert!(!listener.is_pending());
        let waited = tokio::time::timeout(Duration::from_millis(20), listener.recv()).await;
        assert!(waited.is_err());

        interrupt.raise();
        tokio::time::timeout(Duration::from_secs(1), listener.recv())
            .await
            .expect("later raise still observed");
    }

    #[tokio::test]
    async fn raises_coalesce() {
        let interrupt = Interrupt::new();
        let mut listener = interrupt.listen();
        interrupt.raise();
        interrupt.raise();
        listener.recv().await;
        assert!(!listener.is_pending());
        assert_eq!(interrupt.count(), 2);
    }
}
