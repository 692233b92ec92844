//! Standalone prototype flow: free text straight to a rendered timeline,
//! bypassing the backend. Kept separate from the `api`/`stores` layer the
//! real application uses.

pub mod gemini;
pub mod renderer;
