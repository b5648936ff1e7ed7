//! # Módulo del Servidor
//! src/server/mod.rs
//!
//! Este módulo implementa el bucle de despacho del servidor:
//! 1. Acepta una conexión
//! 2. Recibe y parsea la petición
//! 3. Enruta por prefijo de ruta (archivo o programa)
//! 4. Enmarca y envía la respuesta
//!
//! El control es estrictamente secuencial: una conexión se resuelve por
//! completo antes de aceptar la siguiente.

pub mod dispatcher;

// Re-exportar para facilitar el uso
pub use dispatcher::{Server, ServerError};
