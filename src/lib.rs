//! Client for ChatKit workflow backends in a strictly linted crate.
//!
//! The [`decoder`] turns whatever a ChatKit endpoint returns (an SSE stream,
//! a JSON object, or nothing useful) into assistant text plus an optional
//! thread id. The [`conversation`] store keeps the message log and the
//! active thread, and [`session::ChatSession`] drives one exchange at a time
//! over a [`transport::Transport`].

// Interdiction stricte de pratiques dangereuses ou non idiomatiques
#![deny(unsafe_code)] // Le code unsafe est interdit
#![deny(missing_docs)] // Tout élément public doit être documenté
#![deny(non_camel_case_types)] // Les types suivent la convention CamelCase
#![deny(unused_must_use)] // Les Result et Option doivent être traités
#![deny(non_snake_case)] // Fonctions et variables en snake_case
#![deny(non_upper_case_globals)] // Constantes en MAJUSCULE
#![deny(nonstandard_style)] // Pas de style non standard
#![forbid(unsafe_op_in_unsafe_fn)] // Pas d'opération unsafe implicite

// Clippy pour stricte discipline
#![deny(clippy::all)] // Lints Clippy standard
#![deny(clippy::pedantic)] // Lints strictes
#![deny(clippy::nursery)] // Lints expérimentales
#![cfg_attr(not(test), deny(clippy::unwrap_used))] // Pas de unwrap() hors des tests
#![cfg_attr(not(test), deny(clippy::expect_used))] // Pas de expect() hors des tests
#![deny(clippy::panic)] // Interdit panic!()
#![deny(clippy::print_stdout)] // La sortie console reste dans les binaires
#![deny(clippy::todo)] // Interdit todo!()
#![deny(clippy::unimplemented)] // Interdit unimplemented!()
#![deny(clippy::missing_const_for_fn)] // Force const lorsque possible
#![deny(clippy::unwrap_in_result)] // Interdit unwrap() dans une fonction qui renvoie Result
#![deny(clippy::module_inception)] // Pas de module homonyme de son parent
#![deny(clippy::redundant_clone)] // Interdit les clones inutiles
#![deny(clippy::too_many_arguments)] // Limite le nombre d'arguments
#![deny(clippy::cognitive_complexity)] // Limite la complexité cognitive

// Sécurité et robustesse
#![deny(overflowing_literals)] // Interdit les littéraux qui débordent

/// Configuration, errors and identifiers.
pub mod common;
/// Conversation store and exchange lifecycle.
pub mod conversation;
/// ChatKit response decoding (SSE and structured JSON).
pub mod decoder;
/// HTTP relay exposing a conversation.
#[allow(clippy::missing_errors_doc, clippy::unused_async)]
pub mod server;
/// Sequential chat session.
pub mod session;
/// Entry helpers for the binaries.
pub mod start_chatkit;
/// Request transport.
pub mod transport;
