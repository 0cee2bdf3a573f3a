pub mod http;
pub mod storage;
