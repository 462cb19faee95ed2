pub mod auth_service;
pub mod calculator_service;
pub mod chart_service;
pub mod entry_service;
pub mod investor_service;
pub mod projection_service;
