//! Recording upload adapters

mod http_transport;

pub use http_transport::HttpUploadTransport;
