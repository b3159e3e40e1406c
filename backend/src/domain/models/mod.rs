pub mod animal;

pub use animal::*;
