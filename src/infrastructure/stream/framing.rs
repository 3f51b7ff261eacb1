//! Message Framing - 流式响应分帧
//!
//! 将任意切分的网络字节块还原为完整消息：
//! - Lines: 按换行切分，每个网络块中所有完整的非空行组成一批
//! - Sse: 按空行（\n\n）切分事件，每个事件的 data 作为一条消息
//!
//! 未完成的尾部按字节缓存（避免多字节 UTF-8 字符被切断），
//! 超过 max_buffer_bytes 视为分帧异常。

use serde::Deserialize;

use crate::application::ports::StreamError;

/// 默认缓冲区上限（1MB）
pub const DEFAULT_MAX_BUFFER_BYTES: usize = 1_048_576;

/// 分帧方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Framing {
    /// 换行分隔
    #[default]
    Lines,
    /// Server-Sent Events
    Sse,
}

impl Framing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Framing::Lines => "lines",
            Framing::Sse => "sse",
        }
    }
}

/// 增量分帧器
#[derive(Debug)]
pub struct MessageFramer {
    framing: Framing,
    buffer: Vec<u8>,
    max_buffer_bytes: usize,
}

impl MessageFramer {
    pub fn new(framing: Framing) -> Self {
        Self::with_capacity(framing, DEFAULT_MAX_BUFFER_BYTES)
    }

    pub fn with_capacity(framing: Framing, max_buffer_bytes: usize) -> Self {
        Self {
            framing,
            buffer: Vec::with_capacity(4096),
            max_buffer_bytes,
        }
    }

    /// 追加一个网络块，返回本块内完成的消息（可能为空）
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, StreamError> {
        self.buffer.extend_from_slice(chunk);

        let messages = match self.framing {
            Framing::Lines => self.drain_lines()?,
            Framing::Sse => self.drain_events()?,
        };

        if self.buffer.len() > self.max_buffer_bytes {
            return Err(StreamError::Malformed(format!(
                "Buffer overflow: {} bytes pending exceeds maximum {}",
                self.buffer.len(),
                self.max_buffer_bytes
            )));
        }

        Ok(messages)
    }

    /// 流结束时冲刷缓冲区中没有结束符的尾部
    pub fn finish(&mut self) -> Result<Vec<String>, StreamError> {
        let rest = std::mem::take(&mut self.buffer);
        let text = decode(&rest)?;

        let messages = match self.framing {
            Framing::Lines => clean_line(text).into_iter().collect(),
            Framing::Sse => parse_event(text).into_iter().collect(),
        };
        Ok(messages)
    }

    pub fn has_pending(&self) -> bool {
        !self.buffer.is_empty()
    }

    fn drain_lines(&mut self) -> Result<Vec<String>, StreamError> {
        let mut lines = Vec::new();

        while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=pos).collect();
            let text = decode(&line[..pos])?;
            if let Some(line) = clean_line(text) {
                lines.push(line);
            }
        }

        Ok(lines)
    }

    fn drain_events(&mut self) -> Result<Vec<String>, StreamError> {
        let mut events = Vec::new();

        while let Some((end, delimiter_len)) = find_event_end(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..end + delimiter_len).collect();
            let text = decode(&raw[..end])?;
            if let Some(data) = parse_event(text) {
                events.push(data);
            }
        }

        Ok(events)
    }
}

fn decode(bytes: &[u8]) -> Result<&str, StreamError> {
    std::str::from_utf8(bytes)
        .map_err(|e| StreamError::Malformed(format!("Invalid UTF-8 in stream: {}", e)))
}

/// 去掉行尾 \r，空白行返回 None
fn clean_line(line: &str) -> Option<String> {
    let line = line.strip_suffix('\r').unwrap_or(line);
    if line.trim().is_empty() {
        None
    } else {
        Some(line.to_string())
    }
}

/// 查找事件结束位置，兼容 \n\n 与 \r\n\r\n
fn find_event_end(buffer: &[u8]) -> Option<(usize, usize)> {
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|p| (p, 2));
    let crlf = buffer
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|p| (p, 4));

    match (lf, crlf) {
        (Some(a), Some(b)) => Some(if a.0 <= b.0 { a } else { b }),
        (a, b) => a.or(b),
    }
}

/// 解析单个 SSE 事件，多行 data 以 \n 连接；没有 data 的事件忽略
fn parse_event(text: &str) -> Option<String> {
    let mut data_parts = Vec::new();

    for line in text.lines() {
        let line = line.strip_suffix('\r').unwrap_or(line);
        if let Some(value) = line.strip_prefix("data:") {
            data_parts.push(value.strip_prefix(' ').unwrap_or(value));
        }
        // event: / id: / retry: / 注释行 不影响消息内容
    }

    if data_parts.is_empty() {
        None
    } else {
        Some(data_parts.join("\n"))
    }
}
