mod error;
pub use error::*;
mod json;
pub use json::*;
mod optima;
pub use optima::*;
mod records;
pub use records::*;
