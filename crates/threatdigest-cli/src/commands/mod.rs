pub mod fetch;
pub mod generate;
pub mod history;
pub mod latest;
pub mod serve;
pub mod show;
pub mod sources;

mod print;
