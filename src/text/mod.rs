// Text cleanup shared by extraction and sentiment scoring.

pub mod normalize;

pub use normalize::normalize;
