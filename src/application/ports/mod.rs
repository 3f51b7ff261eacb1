//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod api_transport;
mod stream_handler;

pub use api_transport::{ApiTransport, UploadFile, UploadForm};
pub use stream_handler::{CallbackHandler, StreamError, StreamHandler, StreamOutcome};
