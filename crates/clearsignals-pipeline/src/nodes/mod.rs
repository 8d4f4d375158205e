pub mod analyze;
pub mod merge;
pub mod preprocess;
pub mod single_call;

pub use analyze::Analyzer;
pub use merge::MergeNode;
pub use preprocess::Preprocessor;
pub use single_call::SingleCallAnalyzer;
