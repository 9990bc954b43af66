mod settings;

pub use settings::{AnalysisConfig, ClassifierConfig, ExecutorConfig};
