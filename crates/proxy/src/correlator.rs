//! Pairs requests with responses across the two legs of a proxied connection
//!
//! Each leg submits every message it decodes. Matching is strictly first-in first-out: the
//! n-th request seen on a connection is paired with the n-th response, whichever of the two
//! arrives first. Unmatched messages wait in one of two queues, and since a submission always
//! drains the opposite queue before filling its own, at most one queue is non-empty.
//!
//! Outcomes are reported to a [`PairObserver`]. The default [`LogObserver`] writes them to the
//! `tracing` log.

use crate::role::Role;
use pinhole_http::protocol::HttpMessage;
use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, info};
use uuid::Uuid;

const BANNER: &str = "====================================================";

/// A message still waiting for its counterpart.
#[derive(Debug, Clone)]
pub struct PendingEntry {
    pub id: Uuid,
    /// Creation order within the correlator
    pub seq: u64,
    pub role: Role,
    pub message: HttpMessage,
}

/// A request together with the response that answered it.
#[derive(Debug, Clone)]
pub struct CorrelatedPair {
    pub id: Uuid,
    pub seq: u64,
    pub request: HttpMessage,
    pub response: HttpMessage,
}

impl fmt::Display for CorrelatedPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{BANNER}")?;
        writeln!(f, "Communication {}", self.id)?;
        writeln!(f, "REQUEST:")?;
        writeln!(f, "{}", self.request)?;
        writeln!(f, "RESPONSE:")?;
        writeln!(f, "{}", self.response)?;
        writeln!(f, "{BANNER}")
    }
}

/// Outcome of [`Correlator::submit`].
#[derive(Debug, Clone)]
pub enum Correlation {
    Paired(CorrelatedPair),
    Pending { id: Uuid, seq: u64 },
}

impl Correlation {
    pub fn id(&self) -> Uuid {
        match self {
            Correlation::Paired(pair) => pair.id,
            Correlation::Pending { id, .. } => *id,
        }
    }

    pub fn is_paired(&self) -> bool {
        matches!(self, Correlation::Paired(_))
    }
}

/// Receives every correlation outcome. Observers only get shared references.
pub trait PairObserver: Send + Sync {
    fn on_pair(&self, pair: &CorrelatedPair);

    fn on_pending(&self, _entry: &PendingEntry) {}
}

/// Reports pairs at info level and pending entries at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl PairObserver for LogObserver {
    fn on_pair(&self, pair: &CorrelatedPair) {
        info!(
            id = %pair.id,
            request = %pair.request.start_line,
            response = %pair.response.start_line,
            "correlated request and response"
        );
        debug!("\n{pair}");
    }

    fn on_pending(&self, entry: &PendingEntry) {
        debug!(id = %entry.id, seq = entry.seq, role = %entry.role, first_line = %entry.message.start_line, "message waits for its counterpart");
    }
}

#[derive(Debug, Default)]
struct Queues {
    requests: VecDeque<PendingEntry>,
    responses: VecDeque<PendingEntry>,
    next_seq: u64,
}

impl Queues {
    fn of(&mut self, role: Role) -> &mut VecDeque<PendingEntry> {
        if role.carries_requests() { &mut self.requests } else { &mut self.responses }
    }
}

/// FIFO request/response matcher shared by both legs of one proxied connection.
pub struct Correlator {
    queues: Mutex<Queues>,
    observer: Arc<dyn PairObserver>,
}

impl fmt::Debug for Correlator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Correlator").field("queues", &self.queues).finish_non_exhaustive()
    }
}

impl Default for Correlator {
    fn default() -> Self {
        Self::new(Arc::new(LogObserver))
    }
}

impl Correlator {
    pub fn new(observer: Arc<dyn PairObserver>) -> Self {
        Self { queues: Mutex::new(Queues::default()), observer }
    }

    /// Records `message` as read by the leg running in `role`.
    ///
    /// Pairs it with the oldest waiting message from the other leg, or queues it when there
    /// is none. The observer is notified before this returns.
    pub fn submit(&self, message: HttpMessage, role: Role) -> Correlation {
        let mut queues = self.queues.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(waiting) = queues.of(role.opposite()).pop_front() {
            let (request, response) = if role.carries_requests() { (message, waiting.message) } else { (waiting.message, message) };
            let pair = CorrelatedPair { id: waiting.id, seq: waiting.seq, request, response };
            self.observer.on_pair(&pair);
            return Correlation::Paired(pair);
        }

        let seq = queues.next_seq;
        queues.next_seq += 1;
        let entry = PendingEntry { id: Uuid::new_v4(), seq, role, message };
        self.observer.on_pending(&entry);

        let id = entry.id;
        queues.of(role).push_back(entry);
        Correlation::Pending { id, seq }
    }

    pub fn pending_requests(&self) -> usize {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner).requests.len()
    }

    pub fn pending_responses(&self) -> usize {
        self.queues.lock().unwrap_or_else(PoisonError::into_inner).responses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode, Version};
    use pinhole_http::protocol::{Body, HeaderFields, RequestLine, StartLine, StatusLine};
    use proptest::prelude::*;

    #[derive(Default)]
    struct Recorder {
        pairs: Mutex<Vec<CorrelatedPair>>,
        pending: Mutex<Vec<Uuid>>,
    }

    impl PairObserver for Recorder {
        fn on_pair(&self, pair: &CorrelatedPair) {
            self.pairs.lock().unwrap().push(pair.clone());
        }

        fn on_pending(&self, entry: &PendingEntry) {
            self.pending.lock().unwrap().push(entry.id);
        }
    }

    fn request(n: usize) -> HttpMessage {
        let line = RequestLine { method: Method::GET, path: format!("/{n}"), version: Version::HTTP_11 };
        HttpMessage::new(StartLine::Request(line), HeaderFields::new(), Body::Absent)
    }

    fn response(n: usize) -> HttpMessage {
        let line = StatusLine { version: Version::HTTP_11, status: StatusCode::OK, reason: Some(n.to_string()) };
        HttpMessage::new(StartLine::Response(line), HeaderFields::new(), Body::Empty)
    }

    #[test]
    fn request_then_response() {
        let recorder = Arc::new(Recorder::default());
        let correlator = Correlator::new(recorder.clone());

        let pending = correlator.submit(request(0), Role::ClientToUpstream);
        assert!(!pending.is_paired());
        assert_eq!(correlator.pending_requests(), 1);

        let Correlation::Paired(pair) = correlator.submit(response(0), Role::UpstreamToClient) else {
            panic!("response should pair with the waiting request");
        };
        assert_eq!(pair.id, pending.id());
        assert_eq!(pair.request, request(0));
        assert_eq!(pair.response, response(0));
        assert_eq!(correlator.pending_requests(), 0);

        let second = correlator.submit(response(1), Role::UpstreamToClient);
        assert!(!second.is_paired());
        assert_eq!(correlator.pending_responses(), 1);

        assert_eq!(recorder.pairs.lock().unwrap().len(), 1);
        assert_eq!(*recorder.pending.lock().unwrap(), vec![pending.id(), second.id()]);

        let late = correlator.submit(request(1), Role::ClientToUpstream);
        assert_eq!(late.id(), second.id());
        assert!(late.is_paired());
        assert_eq!(correlator.pending_responses(), 0);
    }

    #[test]
    fn response_before_request() {
        let correlator = Correlator::default();
        correlator.submit(response(0), Role::UpstreamToClient);

        let correlation = correlator.submit(request(0), Role::ClientToUpstream);
        let Correlation::Paired(pair) = correlation else {
            panic!("request should pair with the waiting response");
        };
        assert!(pair.request.is_request());
        assert!(pair.response.is_response());
    }

    #[test]
    fn pair_report() {
        let pair = CorrelatedPair { id: Uuid::nil(), seq: 0, request: request(7), response: response(7) };
        let report = pair.to_string();

        assert!(report.starts_with(BANNER));
        assert!(report.contains("Communication 00000000-0000-0000-0000-000000000000\n"));
        assert!(report.contains("REQUEST:\nGET /7 HTTP/1.1"));
        assert!(report.contains("RESPONSE:\nHTTP/1.1 200 7"));
        assert!(report.ends_with(&format!("{BANNER}\n")));
    }

    proptest! {
        #[test]
        fn pairs_in_fifo_order(arrivals in proptest::collection::vec(any::<bool>(), 0..64)) {
            let correlator = Correlator::new(Arc::new(Recorder::default()));
            let (mut requests, mut responses) = (0, 0);
            let mut pairs = Vec::new();

            for is_request in arrivals {
                let correlation = if is_request {
                    requests += 1;
                    correlator.submit(request(requests - 1), Role::ClientToUpstream)
                } else {
                    responses += 1;
                    correlator.submit(response(responses - 1), Role::UpstreamToClient)
                };
                if let Correlation::Paired(pair) = correlation {
                    pairs.push(pair);
                }
                prop_assert!(correlator.pending_requests() == 0 || correlator.pending_responses() == 0);
            }

            prop_assert_eq!(pairs.len(), requests.min(responses));
            for (n, pair) in pairs.iter().enumerate() {
                prop_assert_eq!(&pair.request, &request(n));
                prop_assert_eq!(&pair.response, &response(n));
            }
            prop_assert_eq!(correlator.pending_requests(), requests.saturating_sub(responses));
            prop_assert_eq!(correlator.pending_responses(), responses.saturating_sub(requests));
        }
    }
}
