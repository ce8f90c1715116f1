//! Struct `Sample` represents a batch sample.

pub mod feature;
pub mod sample_struct;
pub mod reader;


pub use reader::SampleReader;
pub use sample_struct::Sample;
pub use feature::Feature;
