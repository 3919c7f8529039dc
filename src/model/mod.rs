mod movie;
mod wire;

pub use movie::*;
pub use wire::*;
