mod init;

pub use init::{http_trace_layer, init_telemetry};
