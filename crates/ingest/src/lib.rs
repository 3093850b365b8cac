pub mod ask;
pub mod document;
pub mod extractor;
pub mod ocr;

pub use ask::{AskEngine, AskError, AskSettings};
pub use extractor::{ExtractionResult, Extractor};
