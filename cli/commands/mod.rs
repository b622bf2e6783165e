pub mod debug;
pub mod generate;
