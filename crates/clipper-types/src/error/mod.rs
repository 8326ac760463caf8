mod clipper_error;

pub use clipper_error::{ClipperError, ErrorKind, Result};
