//! # Descriptores con Ownership
//! src/os/fd.rs
//!
//! Este módulo define `SafeFd`, el dueño único de un descriptor de archivo
//! o socket. Es el único camino por el que se cierra un descriptor en todo
//! el programa: ningún otro módulo llama a `close` directamente.
//!
//! ## Semántica de movimiento
//!
//! `SafeFd` no implementa `Clone`, así que nunca puede haber dos dueños del
//! mismo descriptor. Mover el valor transfiere el ownership; el compilador
//! invalida el origen. Al sobrescribir una variable (`a = b`), el valor
//! anterior se destruye primero, cerrando su descriptor antes de adoptar el
//! nuevo. `Drop` se ejecuta exactamente una vez por valor, en cualquier
//! camino de salida (retornos tempranos y errores incluidos).

use std::os::unix::io::RawFd;

/// Valor centinela: "no hay descriptor".
const INVALID_FD: RawFd = -1;

/// Dueño único de un descriptor crudo del sistema operativo.
#[derive(Debug)]
pub struct SafeFd {
    fd: RawFd,
}

impl SafeFd {
    /// Adopta un descriptor crudo. A partir de aquí el cierre es
    /// responsabilidad exclusiva de este valor.
    pub fn new(fd: RawFd) -> Self {
        Self { fd }
    }

    /// Crea un `SafeFd` en estado centinela (sin descriptor).
    pub const fn invalid() -> Self {
        Self { fd: INVALID_FD }
    }

    /// Indica si hay un descriptor válido.
    ///
    /// # Ejemplo
    /// ```
    /// use docserver::os::SafeFd;
    ///
    /// assert!(!SafeFd::invalid().is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        self.fd >= 0
    }

    /// Accesor de solo lectura al valor crudo. No transfiere ownership.
    pub fn get(&self) -> RawFd {
        self.fd
    }

    /// Extrae el descriptor y deja este valor en estado centinela.
    /// El que llama asume la responsabilidad de cerrarlo.
    pub fn take(&mut self) -> RawFd {
        std::mem::replace(&mut self.fd, INVALID_FD)
    }
}

impl Drop for SafeFd {
    fn drop(&mut self) {
        if self.fd >= 0 {
            // SAFETY: somos el único dueño del descriptor; tras cerrar se
            // marca como centinela para que el cierre ocurra una sola vez.
            unsafe {
                libc::close(self.fd);
            }
            self.fd = INVALID_FD;
        }
    }
}
