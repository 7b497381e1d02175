//! Accumulation and repair of truncated `[[ ## name ## ]]` field markers
//! mid-stream (spec §4.4).
//!
//! Single producer (the streaming reader), single consumer (the module) — the
//! buffer itself does no synchronization.

use std::sync::LazyLock;
use regex::Regex;

static MARKER_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[\[\s*##\s*([A-Za-z_][A-Za-z0-9_]*)\s*(##\s*(\]\s*)?)?$").unwrap());

/// Accumulates streamed chunk text and repairs truncated field markers on finalize.
#[derive(Debug, Default, Clone)]
pub struct StreamBuffer {
    buf: String,
}

impl StreamBuffer {
    pub fn new() -> Self {
        StreamBuffer::default()
    }

    /// Appends one chunk of streamed text.
    pub fn push(&mut self, chunk: &str) {
        self.buf.push_str(chunk);
    }

    pub fn as_str(&self) -> &str {
        &self.buf
    }

    /// Inspects the last 100 characters of the buffer for a partial marker of the
    /// form `[[ ## name`, `[[ ## name ##`, or `[[ ## name ## ]`. Returns the field
    /// name if one is found.
    pub fn detect_incomplete_marker(&self) -> (bool, Option<String>) {
        let tail_start = self.buf.len().saturating_sub(100);
        let tail = &self.buf[floor_char_boundary(&self.buf, tail_start)..];
        match MARKER_TAIL.captures(tail) {
            Some(caps) => (true, Some(caps[1].to_string())),
            None => (false, None),
        }
    }

    /// Completes any incomplete trailing marker, repairs incomplete markers
    /// line-by-line elsewhere in the buffer (the last line covers the trailing
    /// case, since `[[ ## name` never contains a newline), and trims trailing
    /// whitespace/stray dangling `{` or `,`. Returns the finalized text; does not
    /// mutate `self`.
    pub fn finalize(&self) -> String {
        let repaired_lines: Vec<String> = self
            .buf
            .lines()
            .map(|line| complete_marker_in(line))
            .collect();
        let mut text = repaired_lines.join("\n");
        if self.buf.ends_with('\n') {
            text.push('\n');
        }

        trim_trailing_debris(&text)
    }
}

/// Completes an incomplete trailing marker within a single line, leaving complete
/// lines untouched.
fn complete_marker_in(line: &str) -> String {
    if let Some(caps) = MARKER_TAIL.captures(line) {
        let name = &caps[1];
        let start = MARKER_TAIL.find(line).unwrap().start();
        let mut out = line[..start].to_string();
        out.push_str("[[ ## ");
        out.push_str(name);
        out.push_str(" ## ]]");
        out
    } else {
        line.to_string()
    }
}

fn trim_trailing_debris(text: &str) -> String {
    let mut out = text.trim_end().to_string();
    while out.ends_with('{') || out.ends_with(',') {
        out.pop();
        out = out.trim_end().to_string();
    }
    out
}

fn floor_char_boundary(s: &str, index: usize) -> usize {
    let mut i = index;
    while i > 0 && !s.is_char_boundary(i) {
        i -= 1;
    }
    i
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_bare_name_marker() {
        let mut buf = StreamBuffer::new();
        buf.push("some text [[ ## title");
        let (incomplete, name) = buf.detect_incomplete_marker();
        assert!(incomplete);
        assert_eq!(name.as_deref(), Some("title"));
    }

    #[test]
    fn detects_marker_with_trailing_hashes() {
        let mut buf = StreamBuffer::new();
        buf.push("[[ ## confidence ##");
        let (incomplete, name) = buf.detect_incomplete_marker();
        assert!(incomplete);
        assert_eq!(name.as_deref(), Some("confidence"));
    }

    #[test]
    fn detects_marker_with_single_trailing_bracket() {
        let mut buf = StreamBuffer::new();
        buf.push("[[ ## answer ## ]");
        let (incomplete, name) = buf.detect_incomplete_marker();
        assert!(incomplete);
        assert_eq!(name.as_deref(), Some("answer"));
    }

    #[test]
    fn no_marker_detected_on_plain_text() {
        let mut buf = StreamBuffer::new();
        buf.push("just some prose with no markers at all");
        let (incomplete, _) = buf.detect_incomplete_marker();
        assert!(!incomplete);
    }

    #[test]
    fn finalize_completes_trailing_marker() {
        let mut buf = StreamBuffer::new();
        buf.push("[[ ## story ## ]]\n");
        buf.push("Once upon a time.\n\n");
        buf.push("[[ ## title ##");
        let finalized = buf.finalize();
        assert!(finalized.ends_with("[[ ## title ## ]]"));
    }

    #[test]
    fn finalize_scenario_s4_chunks() {
        let mut buf = StreamBuffer::new();
        for chunk in ["[[ ## story ## ]]\n", "Once upon a time.\n\n", "[[ ## title ##"] {
            buf.push(chunk);
        }
        let finalized = buf.finalize();
        assert!(finalized.ends_with("[[ ## title ## ]]"));
    }

    #[test]
    fn finalize_trims_trailing_debris() {
        let mut buf = StreamBuffer::new();
        buf.push("[[ ## answer ## ]]\nyes,   \n{");
        let finalized = buf.finalize();
        assert!(!finalized.ends_with('{'));
        assert!(!finalized.ends_with(','));
    }

    #[test]
    fn finalize_leaves_complete_text_unchanged() {
        let mut buf = StreamBuffer::new();
        buf.push("[[ ## answer ## ]]\nyes");
        assert_eq!(buf.finalize(), "[[ ## answer ## ]]\nyes");
    }
}
