//! HTTP front end for STEM Tutor.
//!
//! Serves the chat page and a small JSON API over a shared [`TutorBot`].
//!
//! [`TutorBot`]: stemtutor_knowledge::TutorBot

pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod page;
pub mod routes;
pub mod server;
pub mod state;

pub use server::TutorServer;
pub use state::AppState;
