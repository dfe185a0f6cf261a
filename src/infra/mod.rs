//! Concrete HTTP clients for the external collaborators.

pub mod gemini;
pub mod google_sheets;
