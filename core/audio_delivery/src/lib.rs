pub mod constants;
pub mod convert;
pub mod delivery;
pub mod device_manager;
pub mod ring;
pub mod source;
