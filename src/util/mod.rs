pub mod fetcher;
pub mod pacer;
pub mod parser;
