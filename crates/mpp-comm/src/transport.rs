//! The point-to-point transport seam.

use std::any::Any;

use mpp_core::{CommError, Rank};

use crate::tag::Tag;

/// A type-erased message body.
pub type Payload = Box<dyn Any + Send>;

/// One rank's endpoint into a process group.
///
/// Sends never block. Receives block until the message with the exact
/// `(src, tag)` arrives, the configured timeout elapses, or the group is
/// aborted. Messages that arrive ahead of the receive that wants them are
/// held until asked for.
pub trait Transport: Send {
    /// World rank of this endpoint.
    fn rank(&self) -> Rank;

    /// Number of ranks in the world.
    fn world_size(&self) -> usize;

    /// Post a message to `dest`.
    fn send(&self, dest: Rank, tag: Tag, payload: Payload) -> Result<(), CommError>;

    /// Wait for the message from `src` carrying `tag`.
    fn recv(&mut self, src: Rank, tag: Tag) -> Result<Payload, CommError>;

    /// Abort the whole group. Every blocked or later operation on every
    /// rank fails with [`CommError::Aborted`]. The first reason wins.
    fn abort(&self, reason: &str);

    /// Whether the group has been aborted.
    fn is_aborted(&self) -> bool;
}

/// Recover a concrete message body, or report who sent the wrong type.
pub fn downcast<T: 'static>(payload: Payload, from: Rank) -> Result<T, CommError> {
    payload
        .downcast::<T>()
        .map(|b| *b)
        .map_err(|_| CommError::PayloadType {
            from,
            expected: std::any::type_name::<T>(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn downcast_wrong_type_names_sender() {
        let p: Payload = Box::new(3u8);
        match downcast::<Vec<f64>>(p, Rank(4)) {
            Err(CommError::PayloadType { from, expected }) => {
                assert_eq!(from, Rank(4));
                assert!(expected.contains("Vec"));
            }
            other => panic!("expected PayloadType, got {other:?}"),
        }
    }

    #[test]
    fn downcast_right_type() {
        let p: Payload = Box::new(vec![1i32, 2]);
        assert_eq!(downcast::<Vec<i32>>(p, Rank(0)).unwrap(), vec![1, 2]);
    }
}
