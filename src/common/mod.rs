pub mod error;
pub mod response;
pub mod job_id;
