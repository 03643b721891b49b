pub mod fetcher;
pub mod parser;

pub use fetcher::*;
pub use parser::*;
