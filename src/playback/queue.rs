/// Playback queue
///
/// Strict FIFO of pending requests with at most one request in flight.
/// Depth is unbounded; producers never wait.
use std::collections::VecDeque;

use super::PlaybackToken;
use crate::blob::BlobUrl;
use crate::catalog::PlaybackRequest;

/// The request currently bound to a pool slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InFlight {
    pub token: PlaybackToken,
    pub request: PlaybackRequest,
    /// Materialized payload backing the playback, if any
    pub blob: Option<BlobUrl>,
}

#[derive(Debug, Default)]
pub struct PlaybackQueue {
    pending: VecDeque<PlaybackRequest>,
    in_flight: Option<InFlight>,
}

impl PlaybackQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append to the tail. Returns true when nothing is playing, meaning
    /// the caller should start draining.
    pub fn enqueue(&mut self, request: PlaybackRequest) -> bool {
        self.pending.push_back(request);
        self.is_idle()
    }

    /// Take the head request, but only while nothing is in flight
    pub fn next_request(&mut self) -> Option<PlaybackRequest> {
        if self.in_flight.is_some() {
            return None;
        }
        self.pending.pop_front()
    }

    /// Mark a request as playing
    pub fn begin(&mut self, token: PlaybackToken, request: PlaybackRequest, blob: Option<BlobUrl>) {
        debug_assert!(self.in_flight.is_none());
        self.in_flight = Some(InFlight {
            token,
            request,
            blob,
        });
    }

    /// Complete the in-flight request if `token` belongs to it
    pub fn finish(&mut self, token: PlaybackToken) -> Option<InFlight> {
        match &self.in_flight {
            Some(current) if current.token == token => self.in_flight.take(),
            _ => None,
        }
    }

    pub fn in_flight(&self) -> Option<&InFlight> {
        self.in_flight.as_ref()
    }

    pub fn is_idle(&self) -> bool {
        self.in_flight.is_none()
    }

    /// Requests waiting behind the in-flight one
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Drop everything, including the in-flight marker. Returns the number
    /// of requests that never played.
    pub fn clear(&mut self) -> usize {
        let dropped = self.pending.len();
        self.pending.clear();
        self.in_flight = None;
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SourceKind;

    fn request(name: &str) -> PlaybackRequest {
        PlaybackRequest {
            source_kind: SourceKind::Url,
            payload: format!("https://sounds.test/{name}.mp3"),
            display_name: name.to_string(),
            embedded_fallback: None,
        }
    }

    fn token(generation: u64) -> PlaybackToken {
        PlaybackToken { slot: 0, generation }
    }

    #[test]
    fn test_fifo_order() {
        let mut queue = PlaybackQueue::new();
        assert!(queue.enqueue(request("a")));
        assert!(queue.enqueue(request("b")));

        assert_eq!(queue.next_request().unwrap().display_name, "a");
        assert_eq!(queue.next_request().unwrap().display_name, "b");
        assert!(queue.next_request().is_none());
    }

    #[test]
    fn test_single_in_flight() {
        let mut queue = PlaybackQueue::new();
        queue.enqueue(request("a"));
        queue.enqueue(request("b"));

        let first = queue.next_request().unwrap();
        queue.begin(token(1), first, None);

        assert!(!queue.enqueue(request("c")));
        assert!(queue.next_request().is_none());
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn test_finish_ignores_stale_token() {
        let mut queue = PlaybackQueue::new();
        queue.enqueue(request("a"));
        let first = queue.next_request().unwrap();
        queue.begin(token(2), first, None);

        assert!(queue.finish(token(1)).is_none());
        assert!(!queue.is_idle());

        let done = queue.finish(token(2)).unwrap();
        assert_eq!(done.request.display_name, "a");
        assert!(queue.is_idle());
    }

    #[test]
    fn test_clear() {
        let mut queue = PlaybackQueue::new();
        queue.enqueue(request("a"));
        queue.enqueue(request("b"));
        let first = queue.next_request().unwrap();
        queue.begin(token(1), first, None);

        assert_eq!(queue.clear(), 1);
        assert!(queue.is_idle());
        assert!(queue.is_empty());
    }
}
