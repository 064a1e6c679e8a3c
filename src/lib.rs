//! reclink - Probabilistic record linkage
//!
//! Links records between two datasets that share no key, using the
//! Fellegi-Sunter model. The engine lives in [`linkage`]; [`loader`],
//! [`config`] and [`reporters`] are the collaborators the `reclink`
//! binary wires around it.

pub mod config;
pub mod linkage;
pub mod loader;
pub mod models;
pub mod reporters;
