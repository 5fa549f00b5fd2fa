pub mod definition;
pub mod segmenter;

pub use definition::{Comparison, EpisodeCatalog, EpisodeDefinition, GapPolicy};
pub use segmenter::{extract_episodes, extract_named, EpisodeSegmenter};
