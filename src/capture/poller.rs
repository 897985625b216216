//! Level-triggered readiness wait over the socket set, built on `poll(2)`.

use std::io;

use tracing::trace;

use super::{ReadySet, SocketId};
use crate::capture::SocketSet;
use crate::error::CaptureError;
use crate::signal::ShutdownCheck;

const ERROR_EVENTS: libc::c_short = libc::POLLERR | libc::POLLHUP | libc::POLLNVAL;

/// Blocks until a socket in the set is readable or failing.
///
/// There is no timeout. A shutdown request wakes the wait through the
/// checker's wake descriptor, and an interrupted wait rechecks the flag
/// before blocking again.
pub struct ReadinessPoller {
    fds: Vec<libc::pollfd>,
    ids: Vec<SocketId>,
    limit: usize,
}

impl ReadinessPoller {
    /// Create a poller limited by the process descriptor limit.
    pub fn new() -> Self {
        Self::with_limit(descriptor_limit())
    }

    /// Create a poller that refuses to watch more than `limit` descriptors.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            fds: Vec::new(),
            ids: Vec::new(),
            limit,
        }
    }

    pub fn wait(
        &mut self,
        sockets: &SocketSet,
        shutdown: &dyn ShutdownCheck,
    ) -> Result<ReadySet, CaptureError> {
        if sockets.is_empty() {
            return Err(CaptureError::EmptySocketSet);
        }

        self.fds.clear();
        self.ids.clear();
        for handle in sockets.iter() {
            self.fds.push(pollfd(handle.raw_fd()));
            self.ids.push(handle.id());
        }
        let wake_fd = shutdown.wake_fd();
        if let Some(fd) = wake_fd {
            self.fds.push(pollfd(fd));
        }

        if self.fds.len() > self.limit {
            return Err(CaptureError::TooManySockets {
                count: self.fds.len(),
                limit: self.limit,
            });
        }

        loop {
            if shutdown.should_stop() {
                return Ok(ReadySet::default());
            }

            let rc = unsafe {
                libc::poll(
                    self.fds.as_mut_ptr(),
                    self.fds.len() as libc::nfds_t,
                    -1,
                )
            };
            if rc >= 0 {
                break;
            }

            let err = io::Error::last_os_error();
            match err.kind() {
                io::ErrorKind::Interrupted => trace!("poll interrupted, retrying"),
                _ => return Err(CaptureError::Poll(err)),
            }
        }

        let mut ready = ReadySet::default();
        for (fd, &id) in self.fds.iter().zip(&self.ids) {
            if fd.revents & ERROR_EVENTS != 0 {
                ready.errored.push(id);
            } else if fd.revents & libc::POLLIN != 0 {
                ready.readable.push(id);
            }
        }

        if wake_fd.is_some() {
            let wake = self.fds[self.ids.len()];
            if wake.revents != 0 {
                shutdown.drain_wake();
            }
        }

        Ok(ready)
    }
}

impl Default for ReadinessPoller {
    fn default() -> Self {
        Self::new()
    }
}

fn pollfd(fd: libc::c_int) -> libc::pollfd {
    libc::pollfd {
        fd,
        events: libc::POLLIN,
        revents: 0,
    }
}

/// Soft `RLIMIT_NOFILE`; `poll(2)` rejects larger descriptor counts.
fn descriptor_limit() -> usize {
    let mut limit = libc::rlimit {
        rlim_cur: 0,
        rlim_max: 0,
    };
    if unsafe { libc::getrlimit(libc::RLIMIT_NOFILE, &mut limit) } != 0
        || limit.rlim_cur == libc::RLIM_INFINITY
    {
        return usize::MAX;
    }
    usize::try_from(limit.rlim_cur).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use std::os::unix::io::AsRawFd;
    use std::thread;
    use std::time::Duration;

    use super::*;
    use crate::capture::test_sockets::{loopback_udp, send_to};
    use crate::domain::TransportProtocol;
    use crate::signal::{NeverShutdown, ShutdownFlag};

    #[test]
    fn test_empty_set_fails_instead_of_blocking() {
        let mut poller = ReadinessPoller::new();
        let result = poller.wait(&SocketSet::default(), &NeverShutdown);
        assert!(matches!(result, Err(CaptureError::EmptySocketSet)));
    }

    #[test]
    fn test_too_many_sockets() {
        let (a, _) = loopback_udp();
        let (b, _) = loopback_udp();
        let set = SocketSet::from_sockets(vec![
            (TransportProtocol::Udp, a),
            (TransportProtocol::Tcp, b),
        ]);

        let mut poller = ReadinessPoller::with_limit(1);
        match poller.wait(&set, &NeverShutdown) {
            Err(CaptureError::TooManySockets { count, limit }) => {
                assert_eq!(count, 2);
                assert_eq!(limit, 1);
            }
            other => panic!("expected TooManySockets, got {:?}", other),
        }
    }

    #[test]
    fn test_wake_fd_counts_toward_limit() {
        let (a, _) = loopback_udp();
        let set = SocketSet::from_sockets(vec![(TransportProtocol::Udp, a)]);
        let flag = ShutdownFlag::manual().unwrap();

        let mut poller = ReadinessPoller::with_limit(1);
        assert!(matches!(
            poller.wait(&set, &flag),
            Err(CaptureError::TooManySockets { count: 2, limit: 1 })
        ));
    }

    #[test]
    fn test_reports_only_readable_sockets() {
        let (a, _) = loopback_udp();
        let (b, b_addr) = loopback_udp();
        let set = SocketSet::from_sockets(vec![
            (TransportProtocol::Udp, a),
            (TransportProtocol::Tcp, b),
        ]);

        send_to(b_addr, b"ping");

        let mut poller = ReadinessPoller::new();
        let ready = poller.wait(&set, &NeverShutdown).unwrap();
        assert_eq!(ready.readable, vec![SocketId(1)]);
        assert!(ready.errored.is_empty());
    }

    #[test]
    fn test_readiness_is_level_triggered() {
        let (a, a_addr) = loopback_udp();
        let set = SocketSet::from_sockets(vec![(TransportProtocol::Udp, a)]);
        send_to(a_addr, b"one");

        let mut poller = ReadinessPoller::new();
        assert_eq!(poller.wait(&set, &NeverShutdown).unwrap().readable, vec![SocketId(0)]);
        // Not read yet, so still ready
        assert_eq!(poller.wait(&set, &NeverShutdown).unwrap().readable, vec![SocketId(0)]);
    }

    #[test]
    fn test_shutdown_wakes_blocked_wait() {
        let (a, _) = loopback_udp();
        let set = SocketSet::from_sockets(vec![(TransportProtocol::Udp, a)]);
        let flag = ShutdownFlag::manual().unwrap();

        let trigger = flag.clone();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            trigger.trigger();
        });

        let mut poller = ReadinessPoller::new();
        let ready = poller.wait(&set, &flag).unwrap();
        handle.join().unwrap();

        assert!(ready.is_empty());
        assert!(flag.should_stop());
    }

    #[test]
    fn test_already_requested_shutdown_returns_immediately() {
        let (a, _) = loopback_udp();
        let set = SocketSet::from_sockets(vec![(TransportProtocol::Udp, a)]);
        let flag = ShutdownFlag::manual().unwrap();
        flag.trigger();

        let ready = ReadinessPoller::new().wait(&set, &flag).unwrap();
        assert!(ready.is_empty());
    }

    #[test]
    fn test_errored_socket_is_reported_and_evicted() {
        // A connected UDP socket gets POLLERR once ICMP port unreachable comes back
        let (failing, _) = loopback_udp();
        let (closed, closed_addr) = loopback_udp();
        drop(closed);
        failing.connect(&closed_addr.into()).unwrap();
        failing.send(b"x").unwrap();

        let mut pfd = pollfd(failing.as_raw_fd());
        assert_eq!(unsafe { libc::poll(&mut pfd, 1, 2_000) }, 1);
        assert_ne!(pfd.revents & libc::POLLERR, 0);

        let (healthy, healthy_addr) = loopback_udp();
        let mut set = SocketSet::from_sockets(vec![
            (TransportProtocol::Udp, failing),
            (TransportProtocol::Tcp, healthy),
        ]);

        let mut poller = ReadinessPoller::new();
        let ready = poller.wait(&set, &NeverShutdown).unwrap();
        assert_eq!(ready.errored, vec![SocketId(0)]);
        assert!(!ready.readable.contains(&SocketId(0)));

        set.remove_and_close(SocketId(0)).unwrap();
        assert_eq!(set.len(), 1);

        send_to(healthy_addr, b"still here");
        let ready = poller.wait(&set, &NeverShutdown).unwrap();
        assert_eq!(ready.readable, vec![SocketId(1)]);
        assert!(ready.errored.is_empty());
    }
}
