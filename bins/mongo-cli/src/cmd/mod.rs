pub mod ping;
pub mod run;
