pub mod error;
pub mod line_source;
pub(crate) mod parser;
pub mod reader;
pub mod record;
mod sniffer;
pub mod types;
pub mod writer;

pub use error::{Error, Location, Result};
pub use reader::{CortexFile, Records};
pub use record::{Alignment, Bubble, BubblePath, Coverage, Record};
pub use types::{Call, FileType, KmerToken, Metadata, PathKind};
