pub mod classification;
pub mod entity;
pub mod report;
pub mod taxonomy;

pub use classification::*;
pub use entity::*;
pub use report::*;
pub use taxonomy::*;
