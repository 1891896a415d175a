pub mod enhancement;

pub use enhancement::*;
