/// Configuration for schema inference
#[derive(Debug, Clone)]
pub struct InferConfig {
    /// Label of the synthetic table holding the top-level object(s)
    pub root_name: String,

    /// How many rows of each table are inspected to infer its columns
    pub sample_size: usize,
}

impl Default for InferConfig {
    fn default() -> Self {
        InferConfig {
            root_name: String::from("Root"),
            sample_size: 100,
        }
    }
}

/// Configuration for loading rows into the destination
#[derive(Debug, Clone)]
pub struct LoadConfig {
    /// Maximum rows per INSERT statement
    pub batch_size: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        LoadConfig { batch_size: 500 }
    }
}
