mod item;
mod wat;

pub use item::*;
pub use wat::*;
