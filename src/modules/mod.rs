pub mod convert;
pub mod media;
