pub mod devices;
pub mod list;
pub mod run;
