//! Incremental decoder for newline-delimited response records.

use crate::types::StreamRecord;

const FRAME_PREFIX: &str = "data: ";

/// Push-based decoder that accepts raw text chunks and yields complete
/// records as newline boundaries arrive. Lines that fail to parse are
/// treated as partial or non-record noise and skipped.
#[derive(Debug, Default)]
pub struct RecordDecoder {
    buffer: String,
}

impl RecordDecoder {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
        }
    }

    /// Feed a chunk and return any records it completed.
    pub fn push(&mut self, chunk: &str) -> Vec<StreamRecord> {
        self.buffer.push_str(chunk);
        let mut records = Vec::new();

        while let Some(pos) = self.buffer.find('\n') {
            let line = self.buffer[..pos].to_string();
            self.buffer.drain(..pos + 1);
            if let Some(record) = decode_line(&line) {
                records.push(record);
            }
        }

        records
    }

    /// Best-effort decode of the trailing partial line once the channel
    /// ends. An incomplete final line is expected and yields nothing.
    pub fn finish(self) -> Option<StreamRecord> {
        decode_line(&self.buffer)
    }
}

fn decode_line(line: &str) -> Option<StreamRecord> {
    let line = line.trim_end_matches('\r');
    let payload = line.strip_prefix(FRAME_PREFIX).unwrap_or(line);
    if payload.trim().is_empty() {
        return None;
    }
    serde_json::from_str(payload).ok()
}
