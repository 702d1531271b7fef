mod dataset;
mod engine;

pub use dataset::MockDataset;
pub use engine::{MockSearchEngine, DEFAULT_MOCK_DELAY};
