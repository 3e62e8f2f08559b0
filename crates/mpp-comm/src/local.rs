//! In-process transport: one crossbeam inbox per rank.
//!
//! [`LocalUniverse::new`] wires `npes` endpoints together. Every endpoint
//! holds a sender to every inbox, including its own, so inboxes stay
//! connected until the last endpoint drops. A dropped endpoint shows up
//! as [`CommError::Disconnected`] to anyone still sending to it.

use std::sync::{Arc, OnceLock};
use std::time::Instant;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use mpp_core::{CommError, Rank};

use crate::config::CommConfig;
use crate::tag::Tag;
use crate::transport::{Payload, Transport};

struct Envelope {
    src: Rank,
    tag: Tag,
    payload: Payload,
}

/// State shared by all endpoints of one universe.
#[derive(Default)]
struct Shared {
    abort_reason: OnceLock<String>,
}

impl Shared {
    fn aborted(&self) -> Option<CommError> {
        self.abort_reason.get().map(|r| CommError::Aborted { reason: r.clone() })
    }
}

/// A set of connected [`LocalTransport`] endpoints.
pub struct LocalUniverse {
    endpoints: Vec<LocalTransport>,
    shared: Arc<Shared>,
}

impl LocalUniverse {
    /// Create `npes` connected endpoints sharing one abort flag.
    pub fn new(npes: usize, config: CommConfig) -> Result<Self, CommError> {
        config.validate()?;
        if npes == 0 {
            return Err(CommError::InvalidPelist {
                reason: "world must have at least one rank".into(),
            });
        }
        let (senders, inboxes): (Vec<Sender<Envelope>>, Vec<Receiver<Envelope>>) =
            (0..npes).map(|_| crossbeam_channel::unbounded()).unzip();
        let senders: Arc<[Sender<Envelope>]> = senders.into();
        let shared = Arc::new(Shared::default());
        let endpoints = inboxes
            .into_iter()
            .enumerate()
            .map(|(r, inbox)| LocalTransport {
                rank: Rank(r as u32),
                senders: Arc::clone(&senders),
                inbox,
                parked: Vec::new(),
                shared: Arc::clone(&shared),
                config: config.clone(),
            })
            .collect();
        Ok(Self { endpoints, shared })
    }

    /// Number of endpoints.
    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    /// `true` if every endpoint has been taken.
    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }

    /// Abort the universe from outside any rank.
    pub fn abort(&self, reason: &str) {
        let _ = self.shared.abort_reason.set(reason.to_owned());
    }

    /// A handle that can abort this universe after the endpoints are gone.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle(Arc::clone(&self.shared))
    }

    /// Hand out the endpoints in rank order.
    pub fn into_endpoints(self) -> Vec<LocalTransport> {
        self.endpoints
    }
}

/// Aborts a [`LocalUniverse`] without holding an endpoint.
#[derive(Clone)]
pub struct AbortHandle(Arc<Shared>);

impl AbortHandle {
    /// Abort the group. The first reason wins.
    pub fn abort(&self, reason: &str) {
        let _ = self.0.abort_reason.set(reason.to_owned());
    }

    /// Whether the group has been aborted.
    pub fn is_aborted(&self) -> bool {
        self.0.abort_reason.get().is_some()
    }
}

/// One rank's endpoint in a [`LocalUniverse`].
pub struct LocalTransport {
    rank: Rank,
    senders: Arc<[Sender<Envelope>]>,
    inbox: Receiver<Envelope>,
    parked: Vec<Envelope>,
    shared: Arc<Shared>,
    config: CommConfig,
}

impl LocalTransport {
    /// A handle that aborts this endpoint's universe.
    pub fn abort_handle(&self) -> AbortHandle {
        AbortHandle(Arc::clone(&self.shared))
    }

    /// Number of messages received ahead of the receive that wants them.
    pub fn parked_len(&self) -> usize {
        self.parked.len()
    }

    fn check_rank(&self, r: Rank) -> Result<(), CommError> {
        if r.index() >= self.senders.len() {
            return Err(CommError::InvalidRank {
                rank: r,
                world_size: self.senders.len(),
            });
        }
        Ok(())
    }
}

impl Transport for LocalTransport {
    fn rank(&self) -> Rank {
        self.rank
    }

    fn world_size(&self) -> usize {
        self.senders.len()
    }

    fn send(&self, dest: Rank, tag: Tag, payload: Payload) -> Result<(), CommError> {
        if let Some(e) = self.shared.aborted() {
            return Err(e);
        }
        self.check_rank(dest)?;
        self.senders[dest.index()]
            .send(Envelope {
                src: self.rank,
                tag,
                payload,
            })
            .map_err(|_| CommError::Disconnected { peer: dest })
    }

    fn recv(&mut self, src: Rank, tag: Tag) -> Result<Payload, CommError> {
        if let Some(e) = self.shared.aborted() {
            return Err(e);
        }
        self.check_rank(src)?;
        if let Some(pos) = self
            .parked
            .iter()
            .position(|e| e.src == src && e.tag == tag)
        {
            return Ok(self.parked.remove(pos).payload);
        }

        let deadline = Instant::now() + self.config.collective_timeout;
        loop {
            if let Some(e) = self.shared.aborted() {
                return Err(e);
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(CommError::Timeout {
                    waiting_on: src,
                    pelist: tag.pelist,
                    seq: tag.seq,
                });
            }
            let wait = self.config.poll_interval.min(deadline - now);
            match self.inbox.recv_timeout(wait) {
                Ok(env) if env.src == src && env.tag == tag => return Ok(env.payload),
                Ok(env) => self.parked.push(env),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(CommError::Disconnected { peer: src })
                }
            }
        }
    }

    fn abort(&self, reason: &str) {
        let _ = self.shared.abort_reason.set(reason.to_owned());
    }

    fn is_aborted(&self) -> bool {
        self.shared.abort_reason.get().is_some()
    }
}
