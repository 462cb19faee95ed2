pub mod sendgrid;
pub mod templates;
pub mod traits;
