pub mod export;
pub mod generate;
pub mod templates;
pub mod works;
