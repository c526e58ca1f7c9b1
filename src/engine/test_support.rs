//! In-memory stand-ins for the external collaborator traits, used only by
//! this crate's own tests.
