use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("codewhisper.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter =
    Counter::new("codewhisper.client.request_errors");

pub(crate) static STREAM_FRAMES: Counter = Counter::new("codewhisper.stream.frames");
pub(crate) static STREAM_BYTES: Counter = Counter::new("codewhisper.stream.bytes");
pub(crate) static DECODE_SKIPS: Counter = Counter::new("codewhisper.stream.decode_skips");

pub(crate) static STREAMS_COMPLETED: Counter = Counter::new("codewhisper.stream.completed");
pub(crate) static STREAM_ABORTS: Counter = Counter::new("codewhisper.stream.aborts");
pub(crate) static STREAMS_CANCELLED: Counter = Counter::new("codewhisper.stream.cancelled");
pub(crate) static STREAM_DURATION: Moments =
    Moments::new("codewhisper.stream.duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);

    collector.register_counter(&STREAM_FRAMES);
    collector.register_counter(&STREAM_BYTES);
    collector.register_counter(&DECODE_SKIPS);

    collector.register_counter(&STREAMS_COMPLETED);
    collector.register_counter(&STREAM_ABORTS);
    collector.register_counter(&STREAMS_CANCELLED);
    collector.register_moments(&STREAM_DURATION);
}
