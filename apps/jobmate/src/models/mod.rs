//! Wire types exchanged with the JobMate backend.
//!
//! Response types are lenient: optional fields default instead of failing the
//! whole payload, because the backend omits keys freely.

pub mod code_review;
pub mod cover_letter;
pub mod cv;
pub mod health;
pub mod interview;
pub mod job_match;
pub mod statistics;
