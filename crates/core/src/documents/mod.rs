pub mod decode;
pub mod memory;
pub mod traits;
