//! Logical-line assembly — reframes raw chunks into complete log entries.
//!
//! A physical line opens a new entry when it begins with a record's
//! expected leading token: an IP-address-like first token or a bracketed
//! timestamp. Any other physical line is a continuation of the pending
//! entry (a user-agent or referrer that got wrapped) and is joined back
//! on without a separator.

use std::net::IpAddr;

/// Reassembles logically-wrapped entries from non-line-aligned chunks.
///
/// Single forward pass; not restartable. Call [`LineAssembler::finish`]
/// at end of stream to flush the trailing entry, which is emitted
/// best-effort even when truncated mid-continuation.
#[derive(Debug, Default)]
pub struct LineAssembler {
    /// Tail of the last chunk that did not end in a line break.
    partial: String,
    /// Completed physical lines awaiting the next record start.
    pending: Option<String>,
}

impl LineAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one raw chunk; returns the logical lines it completed.
    pub fn push_chunk(&mut self, chunk: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut buf = std::mem::take(&mut self.partial);
        buf.push_str(chunk);

        let mut rest: &str = &buf;
        while let Some(pos) = rest.find('\n') {
            let physical = rest[..pos].strip_suffix('\r').unwrap_or(&rest[..pos]);
            self.accept_physical(physical, &mut out);
            rest = &rest[pos + 1..];
        }
        self.partial = rest.to_string();
        out
    }

    /// Flush at end of stream. May emit up to two lines: the leftover
    /// partial (when it opens a new record) and the pending entry.
    pub fn finish(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        let partial = std::mem::take(&mut self.partial);
        if !partial.is_empty() {
            self.accept_physical(&partial, &mut out);
        }
        if let Some(pending) = self.pending.take() {
            out.push(pending);
        }
        out
    }

    fn accept_physical(&mut self, line: &str, out: &mut Vec<String>) {
        if line.trim().is_empty() {
            return;
        }
        if is_record_start(line) {
            if let Some(prev) = self.pending.take() {
                out.push(prev);
            }
            self.pending = Some(line.to_string());
        } else if let Some(pending) = self.pending.as_mut() {
            pending.push_str(line);
        } else {
            // A continuation with nothing to continue — emit as its own
            // (unparseable) line so it is counted downstream.
            out.push(line.to_string());
        }
    }
}

/// Does this physical line open a new record?
pub fn is_record_start(line: &str) -> bool {
    if line.starts_with('[') {
        return true;
    }
    line.split_whitespace()
        .next()
        .is_some_and(|token| token.parse::<IpAddr>().is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(assembler: &mut LineAssembler, chunks: &[&str]) -> Vec<String> {
        let mut out = Vec::new();
        for chunk in chunks {
            out.extend(assembler.push_chunk(chunk));
        }
        out.extend(assembler.finish());
        out
    }

    #[test]
    fn record_start_detection() {
        assert!(is_record_start("192.0.2.1 - - [15/Jan/2024:10:00:00 +0000] ..."));
        assert!(is_record_start("2001:db8::1 - - rest"));
        assert!(is_record_start("[15/Jan/2024:10:00:00 +0000] rest"));
        assert!(!is_record_start("glebot/2.1; +http://www.google.com/bot.html)\""));
        assert!(!is_record_start("just some text"));
    }

    #[test]
    fn whole_lines_pass_through() {
        let mut a = LineAssembler::new();
        let lines = feed_all(&mut a, &["192.0.2.1 - - first\n192.0.2.2 - - second\n"]);
        assert_eq!(lines, vec!["192.0.2.1 - - first", "192.0.2.2 - - second"]);
    }

    #[test]
    fn chunk_boundary_inside_a_line() {
        let mut a = LineAssembler::new();
        let lines = feed_all(&mut a, &["192.0.2.1 - - fi", "rst\n192.0.2.2 - - second\n"]);
        assert_eq!(lines, vec!["192.0.2.1 - - first", "192.0.2.2 - - second"]);
    }

    #[test]
    fn wrapped_line_is_rejoined_without_separator() {
        let mut a = LineAssembler::new();
        let lines = feed_all(
            &mut a,
            &["192.0.2.1 - - \"Mozilla/5.0 (compatible; Goo\nglebot/2.1)\"\n192.0.2.2 - - next\n"],
        );
        assert_eq!(
            lines,
            vec![
                "192.0.2.1 - - \"Mozilla/5.0 (compatible; Googlebot/2.1)\"",
                "192.0.2.2 - - next"
            ]
        );
    }

    #[test]
    fn truncated_continuation_still_emitted_at_eof() {
        let mut a = LineAssembler::new();
        let lines = feed_all(&mut a, &["192.0.2.1 - - \"Mozil\nla/5.0 (partia"]);
        assert_eq!(lines, vec!["192.0.2.1 - - \"Mozilla/5.0 (partia"]);
    }

    #[test]
    fn trailing_line_without_newline_is_emitted() {
        let mut a = LineAssembler::new();
        let lines = feed_all(&mut a, &["192.0.2.1 - - only"]);
        assert_eq!(lines, vec!["192.0.2.1 - - only"]);
    }

    #[test]
    fn orphan_continuation_is_emitted_alone() {
        let mut a = LineAssembler::new();
        let lines = feed_all(&mut a, &["stray fragment\n192.0.2.1 - - real\n"]);
        assert_eq!(lines, vec!["stray fragment", "192.0.2.1 - - real"]);
    }

    #[test]
    fn crlf_line_endings_are_stripped() {
        let mut a = LineAssembler::new();
        let lines = feed_all(&mut a, &["192.0.2.1 - - one\r\n192.0.2.2 - - two\r\n"]);
        assert_eq!(lines, vec!["192.0.2.1 - - one", "192.0.2.2 - - two"]);
    }

    #[test]
    fn empty_physical_lines_are_skipped() {
        let mut a = LineAssembler::new();
        let lines = feed_all(&mut a, &["192.0.2.1 - - one\n\n\n192.0.2.2 - - two\n"]);
        assert_eq!(lines.len(), 2);
    }
}
