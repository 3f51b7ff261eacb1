//! Streaming - 流式推理客户端

mod fetch_stream;
mod framing;

pub use fetch_stream::{FetchStream, StreamOptions};
pub use framing::{Framing, MessageFramer, DEFAULT_MAX_BUFFER_BYTES};
