pub mod decode;
pub mod helpers;
