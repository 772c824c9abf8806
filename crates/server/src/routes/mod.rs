pub mod recognize;
pub mod system;
