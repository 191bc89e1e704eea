//! Application services - Turn handling and its building blocks

pub mod command_service;
pub mod greeting;
pub mod interruption;
pub mod locks;
pub mod profile_service;
pub mod turn_service;


pub use command_service::CommandService;
pub use turn_service::TurnService;
