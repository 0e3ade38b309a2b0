pub mod progress;
pub mod series;
