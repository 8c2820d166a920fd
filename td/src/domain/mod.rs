//! Domain types for tododesk
//!
//! The parsing pipeline's output (`ParsedTask`) and the two closed value sets
//! it is validated against (`Category`, `Priority`).

mod category;
mod parsed;
mod priority;

pub use category::Category;
pub use parsed::ParsedTask;
pub use priority::Priority;
