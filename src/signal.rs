//! Shutdown signalling.
//!
//! `ShutdownFlag` is set from the Ctrl+C / SIGTERM handler and read by the
//! capture loop once per iteration. Setting it also writes a byte to a wake
//! socket so a poller blocked in `poll(2)` returns, whichever thread the
//! signal was delivered to.

use std::io::{self, Read, Write};
use std::os::unix::io::{AsRawFd, RawFd};
use std::os::unix::net::UnixStream;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Trait for checking shutdown status.
pub trait ShutdownCheck {
    /// Returns true if shutdown has been requested.
    fn should_stop(&self) -> bool;

    /// Descriptor that becomes readable when shutdown is requested.
    fn wake_fd(&self) -> Option<RawFd> {
        None
    }

    /// Consume pending wake-ups after `wake_fd` was reported readable.
    fn drain_wake(&self) {}
}

#[derive(Debug)]
struct Inner {
    requested: AtomicBool,
    wake_rx: UnixStream,
    wake_tx: UnixStream,
}

/// Process-wide shutdown request.
///
/// Clones share the same flag.
#[derive(Debug, Clone)]
pub struct ShutdownFlag {
    inner: Arc<Inner>,
}

impl ShutdownFlag {
    /// Create a flag without registering any signal handler.
    pub fn manual() -> io::Result<Self> {
        let (wake_rx, wake_tx) = UnixStream::pair()?;
        wake_rx.set_nonblocking(true)?;
        wake_tx.set_nonblocking(true)?;

        Ok(Self {
            inner: Arc::new(Inner {
                requested: AtomicBool::new(false),
                wake_rx,
                wake_tx,
            }),
        })
    }

    /// Create a flag and register it as the SIGINT/SIGTERM handler.
    pub fn install() -> anyhow::Result<Self> {
        let flag = Self::manual()?;
        let handler_flag = flag.clone();

        ctrlc::set_handler(move || handler_flag.trigger())?;

        Ok(flag)
    }

    /// Request shutdown and wake a blocked poller.
    pub fn trigger(&self) {
        self.inner.requested.store(true, Ordering::Release);

        // A full buffer already holds a pending wake-up
        let _ = (&self.inner.wake_tx).write(&[1]);
    }
}

impl ShutdownCheck for ShutdownFlag {
    fn should_stop(&self) -> bool {
        self.inner.requested.load(Ordering::Acquire)
    }

    fn wake_fd(&self) -> Option<RawFd> {
        Some(self.inner.wake_rx.as_raw_fd())
    }

    fn drain_wake(&self) {
        let mut buf = [0u8; 64];
        while let Ok(n) = (&self.inner.wake_rx).read(&mut buf) {
            if n == 0 {
                break;
            }
        }
    }
}

/// Shutdown checker that never signals shutdown.
#[cfg(test)]
#[derive(Debug, Default, Clone)]
pub struct NeverShutdown;

#[cfg(test)]
impl ShutdownCheck for NeverShutdown {
    fn should_stop(&self) -> bool {
        false
    }
}
