pub mod cancel;
pub mod error;
pub mod options;
pub mod source;

pub use cancel::CancelFlag;
pub use error::{FatwalkError, Result};
pub use options::ScanOptions;
pub use source::{ByteSource, FileSource};
