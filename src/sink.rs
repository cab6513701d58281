//! Destinations for request log entries.
//!
//! [`TracingSink`] is the production sink: it forwards entries as `tracing`
//! events to a dispatcher captured when the sink is built. Anything else that
//! implements [`LogSink`] can be handed to
//! [`RequestLogger::with_name_and_sink`](crate::RequestLogger::with_name_and_sink).

use tracing::dispatcher::{self, Dispatch};
use tracing::field;
use tracing::Level;

use crate::entry::LogEntry;

/// Receives structured log entries. Shared by every in-flight request.
pub trait LogSink: Send + Sync + 'static {
    fn emit(&self, level: Level, message: &'static str, entry: &LogEntry);
}

/// Emits entries as `tracing` events with target `macrus`.
#[derive(Clone, Debug)]
pub struct TracingSink {
    dispatch: Dispatch,
}

impl TracingSink {
    pub fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Captures the dispatcher that is the default at the time of the call:
    /// the thread's scoped default if one is set, otherwise the global one.
    pub fn current() -> Self {
        Self::new(dispatcher::get_default(Dispatch::clone))
    }
}

impl Default for TracingSink {
    fn default() -> Self { Self::current() }
}

macro_rules! emit_at {
    ($mac:ident, $message:expr, $entry:expr) => {{
        let entry: &LogEntry = $entry;
        let completion = entry.completion();
        tracing::$mac!(
            target: "macrus",
            request = entry.request(),
            method = entry.method(),
            remote = entry.remote(),
            request_id = entry.request_id(),
            status = completion.map(|c| c.status.as_u16()),
            text_status = completion.map(|c| c.text_status()),
            took = completion.map(|c| field::debug(c.took)),
            "{}",
            $message
        )
    }};
}

impl LogSink for TracingSink {
    fn emit(&self, level: Level, message: &'static str, entry: &LogEntry) {
        dispatcher::with_default(&self.dispatch, || {
            if level == Level::ERROR {
                emit_at!(error, message, entry)
            } else if level == Level::WARN {
                emit_at!(warn, message, entry)
            } else if level == Level::INFO {
                emit_at!(info, message, entry)
            } else if level == Level::DEBUG {
                emit_at!(debug, message, entry)
            } else {
                emit_at!(trace, message, entry)
            }
        });
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    /// One emitted event.
    #[derive(Clone, Debug)]
    pub(crate) struct Record {
        pub(crate) level: Level,
        pub(crate) message: &'static str,
        pub(crate) entry: LogEntry,
    }

    /// Keeps every emitted event in memory.
    #[derive(Default)]
    pub(crate) struct RecordingSink {
        records: Mutex<Vec<Record>>,
    }

    impl RecordingSink {
        pub(crate) fn records(&self) -> Vec<Record> {
            self.records.lock().unwrap().clone()
        }

        pub(crate) fn len(&self) -> usize {
            self.records.lock().unwrap().len()
        }
    }

    impl LogSink for RecordingSink {
        fn emit(&self, level: Level, message: &'static str, entry: &LogEntry) {
            self.records.lock().unwrap().push(Record { level, message, entry: entry.clone() });
        }
    }

    /// In-memory writer for `fmt` subscribers.
    #[derive(Clone, Default)]
    pub(crate) struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        pub(crate) fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> { Ok(()) }
    }

    impl<'a> MakeWriter<'a> for Buffer {
        type Writer = Buffer;

        fn make_writer(&'a self) -> Self::Writer { self.clone() }
    }

    /// A plain-text `fmt` subscriber writing into a fresh [`Buffer`].
    pub(crate) fn buffered_subscriber() -> (impl tracing::Subscriber + Send + Sync + 'static, Buffer) {
        let buffer = Buffer::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(buffer.clone())
            .with_ansi(false)
            .finish();
        (subscriber, buffer)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bytes::Bytes;
    use http::{HeaderMap, HeaderValue, Method, StatusCode};

    use super::testing::{buffered_subscriber, Buffer};
    use super::*;
    use crate::request::Request;

    fn entry() -> LogEntry {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc123"));
        let req = Request::new(
            Method::GET,
            "/missing",
            headers,
            Bytes::new(),
            "10.0.0.5:51234".parse().unwrap(),
        );
        LogEntry::from_request(&req)
    }

    fn sink_with_buffer() -> (TracingSink, Buffer) {
        let (subscriber, buffer) = buffered_subscriber();
        (TracingSink::new(Dispatch::new(subscriber)), buffer)
    }

    #[test]
    fn started_event_carries_request_fields() {
        let (sink, buffer) = sink_with_buffer();

        sink.emit(Level::INFO, "started handling request", &entry());

        let out = buffer.contents();
        assert!(out.contains("INFO"), "{out}");
        assert!(out.contains("started handling request"), "{out}");
        assert!(out.contains("/missing"), "{out}");
        assert!(out.contains("abc123"), "{out}");
        assert!(out.contains("10.0.0.5:51234"), "{out}");
        assert!(!out.contains("status="), "{out}");
        assert!(!out.contains("text_status"), "{out}");
        assert!(!out.contains("took"), "{out}");
    }

    #[test]
    fn completed_event_carries_outcome_at_requested_level() {
        let (sink, buffer) = sink_with_buffer();
        let completed = entry().completed(StatusCode::NOT_FOUND, Duration::from_millis(7));

        sink.emit(Level::WARN, "completed handling request", &completed);

        let out = buffer.contents();
        assert!(out.contains("WARN"), "{out}");
        assert!(out.contains("completed handling request"), "{out}");
        assert!(out.contains("status=404"), "{out}");
        assert!(out.contains("Not Found"), "{out}");
        assert!(out.contains("took=7ms"), "{out}");
    }
}
