//! Incremental Server-Sent-Events decoder.
//!
//! Network chunks split frames at arbitrary byte offsets, so the decoder
//! buffers partial lines and only emits an event once its terminating blank
//! line has been seen.

// ---

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event: String,
    pub data: String,
}

#[derive(Debug, Default)]
pub struct SseDecoder {
    // ---
    pending: Vec<u8>,
    event: Option<String>,
    data: Vec<String>,
}

impl SseDecoder {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of the response body, returning every event it completes.
    pub fn push(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        // ---
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let raw: Vec<u8> = self.pending.drain(..=pos).collect();
            let text = String::from_utf8_lossy(&raw[..pos]);
            let line = text.strip_suffix('\r').unwrap_or(&*text);

            if let Some(event) = self.process_line(line) {
                events.push(event);
            }
        }
        events
    }

    /// Bytes received after the last complete line.
    pub fn has_partial(&self) -> bool {
        !self.pending.is_empty() || self.event.is_some() || !self.data.is_empty()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        // ---
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event = Some(value.to_string()),
            "data" => self.data.push(value.to_string()),
            // id and retry carry nothing the feed uses
            _ => {}
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        // ---
        let event = self.event.take();
        if self.data.is_empty() && event.is_none() {
            return None;
        }

        let data = std::mem::take(&mut self.data).join("\n");
        Some(SseEvent {
            event: event.unwrap_or_else(|| "message".to_string()),
            data,
        })
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    #[test]
    fn test_single_frame() {
        // ---
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"event: put\ndata: {\"path\":\"/\",\"data\":null}\n\n");

        assert_eq!(
            events,
            vec![SseEvent {
                event: "put".into(),
                data: "{\"path\":\"/\",\"data\":null}".into(),
            }]
        );
        assert!(!decoder.has_partial());
    }

    #[test]
    fn test_frame_split_across_chunks() {
        // ---
        let mut decoder = SseDecoder::new();

        assert!(decoder.push(b"event: pa").is_empty());
        assert!(decoder.push(b"tch\ndata: {\"a\"").is_empty());
        assert!(decoder.has_partial());

        let events = decoder.push(b":1}\n\n");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].event, "patch");
        assert_eq!(events[0].data, "{\"a\":1}");
    }

    #[test]
    fn test_crlf_comments_and_multiline_data() {
        // ---
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b": hello\r\nevent: put\r\ndata: one\r\ndata: two\r\n\r\nevent: keep-alive\r\ndata: null\r\n\r\n");

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].data, "one\ntwo");
        assert_eq!(events[1].event, "keep-alive");
        assert_eq!(events[1].data, "null");
    }

    #[test]
    fn test_missing_event_name_defaults_to_message() {
        // ---
        let mut decoder = SseDecoder::new();
        let events = decoder.push(b"data:x\n\n\n\n");

        assert_eq!(
            events,
            vec![SseEvent {
                event: "message".into(),
                data: "x".into(),
            }]
        );
    }
}
