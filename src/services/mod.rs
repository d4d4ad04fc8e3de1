pub mod session;
pub mod similarity;
pub mod vocabulary;

pub use session::{LearningService, SessionError};
pub use similarity::{DisabledSimilarity, HttpSimilarity, SimilarityService};
pub use vocabulary::{JsonVocabulary, VocabEntry, VocabError, VocabularyStore};
