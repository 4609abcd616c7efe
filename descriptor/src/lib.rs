pub mod descriptor;
pub mod tags;

pub use descriptor::*;
pub use tags::*;
