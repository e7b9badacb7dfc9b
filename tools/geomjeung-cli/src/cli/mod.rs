pub mod anthropic;
pub mod chrome;
pub mod console;
pub mod plan;
pub mod verify;
