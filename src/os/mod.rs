//! # Recursos del Sistema Operativo
//! src/os/mod.rs
//!
//! Wrappers con ownership sobre los recursos crudos del sistema operativo:
//!
//! - `fd`: descriptores de archivo/socket (`SafeFd`)
//! - `mmap`: regiones de memoria mapeada (`SafeMap`)
//!
//! Todo descriptor y todo mapeo del programa se libera exclusivamente a
//! través de estos tipos; ningún otro módulo llama a `close` ni a `munmap`.

pub mod fd;
pub mod mmap;

// Re-exportar para facilitar el uso
pub use fd::SafeFd;
pub use mmap::SafeMap;
