pub mod http_client;
pub mod payload_builder;
pub mod response_parser;

pub use http_client::*;
pub use payload_builder::*;
pub use response_parser::*;
