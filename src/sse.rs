//! Event-stream decoding for streamed chat responses.
//!
//! This module turns the raw byte stream of a stream_log response into
//! structured [`StreamFrame`] values, handling `data: ` framing, blank
//! keep-alive lines, and chunk boundaries that fall inside a line or inside
//! a multi-byte UTF-8 codepoint.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, Stream, StreamExt};

use crate::observability;
use crate::types::StreamFrame;
use crate::{Error, Result};

/// The prefix marking a payload-bearing line.
const DATA_PREFIX: &str = "data: ";

/// Process a stream of bytes into a stream of decoded frames.
///
/// Lines are split on `\n` at the byte level before any UTF-8 decoding, so a
/// multi-byte codepoint split across two chunks is reassembled intact, and a
/// partial trailing line is buffered until its terminator (or end-of-data)
/// arrives. Lines without the `data: ` prefix, blank payloads, and malformed
/// JSON payloads are skipped; only transport read errors surface as `Err`.
pub fn decode_frames<S>(byte_stream: S) -> impl Stream<Item = Result<StreamFrame>>
where
    S: Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin + 'static,
{
    // Convert reqwest errors to our error type
    let stream = byte_stream.map(|result| {
        result
            .map_err(|e| Error::http_client(format!("Error in HTTP stream: {e}"), Some(Box::new(e))))
    });

    stream::unfold(
        (stream, BytesMut::new(), false),
        move |(mut stream, mut buffer, mut done)| async move {
            loop {
                // Drain complete lines already in the buffer.
                while let Some(line) = take_line(&mut buffer) {
                    if let Some(frame) = decode_line(&line) {
                        return Some((Ok(frame), (stream, buffer, done)));
                    }
                }

                if done {
                    return None;
                }

                match stream.next().await {
                    Some(Ok(bytes)) => {
                        observability::STREAM_BYTES.count(bytes.len() as u64);
                        buffer.extend_from_slice(&bytes);
                    }
                    Some(Err(e)) => {
                        return Some((Err(e), (stream, buffer, done)));
                    }
                    None => {
                        done = true;
                        // An undelimited trailing line is still a line.
                        if !buffer.is_empty() {
                            let line = buffer.split();
                            if let Some(frame) = decode_line(&line) {
                                return Some((Ok(frame), (stream, buffer, done)));
                            }
                        }
                        return None;
                    }
                }
            }
        },
    )
}

/// Split one `\n`-terminated line off the front of the buffer.
///
/// The terminator and any preceding `\r` are stripped. Returns `None` when no
/// complete line is buffered yet.
fn take_line(buffer: &mut BytesMut) -> Option<BytesMut> {
    let pos = buffer.iter().position(|&b| b == b'\n')?;
    let mut line = buffer.split_to(pos + 1);
    line.truncate(pos);
    if line.last() == Some(&b'\r') {
        line.truncate(line.len() - 1);
    }
    Some(line)
}

/// Decode one line into a frame, or `None` if the line carries none.
///
/// Non-`data: ` lines and blank payloads are protocol framing and skipped
/// silently; a malformed payload is skipped with a diagnostic so one bad
/// frame cannot abort an otherwise-healthy stream.
fn decode_line(line: &[u8]) -> Option<StreamFrame> {
    let Ok(text) = std::str::from_utf8(line) else {
        observability::DECODE_SKIPS.click();
        tracing::warn!("skipping stream line with invalid UTF-8");
        return None;
    };

    let payload = text.strip_prefix(DATA_PREFIX)?.trim();
    if payload.is_empty() {
        return None;
    }

    match serde_json::from_str::<StreamFrame>(payload) {
        Ok(frame) => {
            observability::STREAM_FRAMES.click();
            Some(frame)
        }
        Err(err) => {
            observability::DECODE_SKIPS.click();
            tracing::warn!(%err, line = payload, "skipping malformed stream frame");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    use crate::types::{PatchFrame, StreamFrame};

    fn chunked(chunks: Vec<&'static [u8]>) -> impl Stream<Item = std::result::Result<Bytes, reqwest::Error>> + Unpin {
        Box::pin(stream::iter(
            chunks.into_iter().map(|c| Ok(Bytes::from_static(c))),
        ))
    }

    async fn collect_text(frames: impl Stream<Item = Result<StreamFrame>>) -> String {
        let mut content = String::new();
        futures::pin_mut!(frames);
        while let Some(frame) = frames.next().await {
            if let StreamFrame::Patch(PatchFrame { ops }) = frame.unwrap() {
                for op in ops {
                    if let Some(text) = op.streamed_text() {
                        content.push_str(text);
                    }
                }
            }
        }
        content
    }

    #[tokio::test]
    async fn parse_single_frame() {
        let data = b"data: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"Hello\"}]}\n\n";
        let frames = decode_frames(chunked(vec![data]));
        assert_eq!(collect_text(frames).await, "Hello");
    }

    #[tokio::test]
    async fn parse_multiple_frames_in_one_chunk() {
        let data = b"data: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"a\"}]}\n\ndata: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"b\"}]}\n\n";
        let frames = decode_frames(chunked(vec![data]));
        assert_eq!(collect_text(frames).await, "ab");
    }

    #[tokio::test]
    async fn line_split_across_chunks() {
        let frames = decode_frames(chunked(vec![
            b"data: {\"ops\":[{\"op\":\"add\",\"pat",
            b"h\":\"/streamed_output_str/-\",\"value\":\"split\"}]}\n\n",
        ]));
        assert_eq!(collect_text(frames).await, "split");
    }

    #[tokio::test]
    async fn multibyte_codepoint_split_across_chunks() {
        // "héllo" with the two-byte 'é' (0xC3 0xA9) split between chunks.
        let frames = decode_frames(chunked(vec![
            b"data: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"h\xc3",
            b"\xa9llo\"}]}\n\n",
        ]));
        assert_eq!(collect_text(frames).await, "h\u{e9}llo");
    }

    #[tokio::test]
    async fn rechunking_is_content_invariant() {
        let body: &[u8] = "data: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"na\u{ef}ve \"}]}\n\ndata: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"caf\u{e9}\"}]}\n\n".as_bytes();

        let whole = decode_frames(Box::pin(stream::once(async move {
            Ok(Bytes::from_static(body))
        })));
        let expected = collect_text(whole).await;
        assert_eq!(expected, "na\u{ef}ve caf\u{e9}");

        // Re-split the identical body at a range of chunk sizes.
        for chunk_len in 1..7 {
            let chunks: Vec<std::result::Result<Bytes, reqwest::Error>> = body
                .chunks(chunk_len)
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect();
            let frames = decode_frames(Box::pin(stream::iter(chunks)));
            assert_eq!(collect_text(frames).await, expected, "chunk_len={chunk_len}");
        }
    }

    #[tokio::test]
    async fn non_data_and_blank_lines_are_skipped() {
        let frames = decode_frames(chunked(vec![
            b": comment\nevent: metadata\ndata: \n\ndata: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"ok\"}]}\n\n",
        ]));
        assert_eq!(collect_text(frames).await, "ok");
    }

    #[tokio::test]
    async fn malformed_json_line_is_skipped() {
        let frames = decode_frames(chunked(vec![
            b"data: {not json}\ndata: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"still fine\"}]}\n\n",
        ]));
        assert_eq!(collect_text(frames).await, "still fine");
    }

    #[tokio::test]
    async fn trailing_line_without_newline_is_decoded() {
        let frames = decode_frames(chunked(vec![
            b"data: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"tail\"}]}",
        ]));
        assert_eq!(collect_text(frames).await, "tail");
    }

    #[tokio::test]
    async fn crlf_lines_are_handled() {
        let frames = decode_frames(chunked(vec![
            b"data: {\"ops\":[{\"op\":\"add\",\"path\":\"/streamed_output_str/-\",\"value\":\"crlf\"}]}\r\n\r\n",
        ]));
        assert_eq!(collect_text(frames).await, "crlf");
    }

    #[tokio::test]
    async fn error_frame_is_surfaced_as_frame() {
        let frames = decode_frames(chunked(vec![
            b"data: {\"error\":\"stream_error\",\"detail\":\"backend down\"}\n\n",
        ]));
        futures::pin_mut!(frames);
        let frame = frames.next().await.unwrap().unwrap();
        let StreamFrame::Error(err) = frame else {
            panic!("expected error frame");
        };
        assert_eq!(err.detail.as_deref(), Some("backend down"));
        assert!(frames.next().await.is_none());
    }
}
