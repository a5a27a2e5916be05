//! Mock chunk source for testing — serves pre-loaded text chunks.

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::error::EngineResult;
use crate::source::ChunkSource;

/// A mock chunk source that yields pre-loaded chunks in order.
pub struct MockChunkSource {
    chunks: VecDeque<String>,
}

impl MockChunkSource {
    pub fn new() -> Self {
        Self {
            chunks: VecDeque::new(),
        }
    }

    /// Build from explicit chunks, boundaries preserved as given.
    pub fn from_chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
        }
    }

    /// Build from whole lines; each line becomes one newline-terminated chunk.
    pub fn from_lines(lines: &[&str]) -> Self {
        Self::from_chunks(lines.iter().map(|l| format!("{l}\n")))
    }

    /// Append one chunk.
    pub fn push_chunk(&mut self, chunk: impl Into<String>) {
        self.chunks.push_back(chunk.into());
    }

    /// Apache Combined sample: a search crawler, an AI crawler, an AI
    /// assistant fetch, and browser traffic.
    pub fn with_apache_sample() -> Self {
        Self::from_lines(&[
            r#"66.249.66.1 - - [15/Jan/2024:10:15:42 +0000] "GET /index.html HTTP/1.1" 200 5120 "-" "Mozilla/5.0 (compatible; Googlebot/2.1; +http://www.google.com/bot.html)""#,
            r#"20.171.206.15 - - [15/Jan/2024:10:17:01 +0000] "GET /products HTTP/1.1" 200 18230 "-" "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko); compatible; GPTBot/1.0; +https://openai.com/gptbot""#,
            r#"23.98.142.177 - - [15/Jan/2024:10:18:12 +0000] "GET /pricing HTTP/1.1" 200 9044 "-" "Mozilla/5.0 AppleWebKit/537.36 (KHTML, like Gecko); compatible; ChatGPT-User/1.0; +https://openai.com/bot""#,
            r#"192.0.2.44 - frank [15/Jan/2024:10:18:33 +0000] "POST /login HTTP/1.1" 302 - "https://example.com/" "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36""#,
            r#"192.0.2.44 - frank [15/Jan/2024:10:18:35 +0000] "GET /dashboard HTTP/1.1" 200 27110 "https://example.com/login" "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36""#,
        ])
    }

    /// Nginx sample, trailing X-Forwarded-For field included.
    pub fn with_nginx_sample() -> Self {
        Self::from_lines(&[
            r#"203.0.113.9 - - [15/Jan/2024:11:02:07 +0200] "GET /robots.txt HTTP/1.1" 200 68 "-" "Mozilla/5.0 (compatible; ClaudeBot/1.0; +claudebot@anthropic.com)" "198.51.100.7""#,
            r#"203.0.113.9 - - [15/Jan/2024:11:02:09 +0200] "GET /sitemap.xml HTTP/1.1" 404 153 "-" "Mozilla/5.0 (compatible; ClaudeBot/1.0; +claudebot@anthropic.com)" "198.51.100.7""#,
            r#"198.51.100.81 - alice [15/Jan/2024:11:05:44 +0200] "-" 400 0 "-" "" "-""#,
        ])
    }

    /// A Combined entry whose user-agent field wrapped across two
    /// physical lines, plus a normal entry after it.
    pub fn with_wrapped_sample() -> Self {
        Self::from_chunks([concat!(
            r#"66.249.66.1 - - [15/Jan/2024:10:15:42 +0000] "GET / HTTP/1.1" 200 512 "-" "Mozilla/5.0 (compatible; Goo"#,
            "\n",
            r#"glebot/2.1; +http://www.google.com/bot.html)""#,
            "\n",
            r#"192.0.2.44 - - [15/Jan/2024:10:16:00 +0000] "GET /about HTTP/1.1" 200 1024 "-" "Mozilla/5.0 (X11; Linux x86_64) Firefox/121.0""#,
            "\n"
        )])
    }

    /// Lines no grammar can parse, mixed with one valid entry.
    pub fn with_malformed_sample() -> Self {
        Self::from_lines(&[
            "not an access log line at all",
            r#"192.0.2.1 - - [not-a-timestamp] "GET / HTTP/1.1" 200 100 "-" "curl/8.5.0""#,
            r#"192.0.2.2 - - [15/Jan/2024:10:00:00 +0000] "GET /ok HTTP/1.1" 200 100 "-" "curl/8.5.0""#,
        ])
    }
}

impl Default for MockChunkSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChunkSource for MockChunkSource {
    async fn next_chunk(&mut self) -> EngineResult<Option<String>> {
        Ok(self.chunks.pop_front())
    }
}
