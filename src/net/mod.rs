//! # Capa de Red
//! src/net/mod.rs
//!
//! Este módulo implementa la capa de red del servidor sobre llamadas al
//! sistema directas, con los descriptores en manos de `SafeFd`:
//!
//! - `socket`: socket de escucha, aceptación de conexiones y recepción
//! - `response`: enmarcado y envío de respuestas
//!
//! Todas las operaciones son bloqueantes; no hay E/S no bloqueante ni
//! multiplexación.

pub mod response;
pub mod socket;

// Re-exportar para facilitar el uso
pub use response::{send_response, SendError};
pub use socket::{Connection, ListeningSocket, SocketError};
