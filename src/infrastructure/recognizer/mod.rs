//! Intent recognizers - LUIS with a local keyword fallback

pub mod keyword;
pub mod luis;


pub use keyword::KeywordRecognizer;
pub use luis::LuisRecognizer;
