//! # Servicio de Archivos
//! src/files.rs
//!
//! Lectura de archivos por mapeo de memoria: se abre la ruta, se determina
//! la longitud con un seek al final, se mapea de solo lectura y se cierra el
//! descriptor (el mapeo sigue siendo válido sin él). El resultado es un
//! `SafeMap` cuya vista expone exactamente los bytes del archivo tal y como
//! existía al abrirlo.

use crate::os::{SafeFd, SafeMap};
use std::ffi::CString;

/// Fallo al abrir o mapear un archivo; transporta el errno
///
/// Aguas arriba, `EACCES` se traduce a `403 Forbidden` y `ENOENT` a
/// `404 Not Found`; cualquier otro código es fatal para el servidor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileAccessError(pub i32);

impl FileAccessError {
    fn last() -> Self {
        Self(std::io::Error::last_os_error().raw_os_error().unwrap_or(0))
    }

    /// Código de error del sistema operativo.
    pub fn code(&self) -> i32 {
        self.0
    }

    /// El archivo existe pero no hay permiso de lectura.
    pub fn is_forbidden(&self) -> bool {
        self.0 == libc::EACCES
    }

    /// El archivo no existe.
    pub fn is_not_found(&self) -> bool {
        self.0 == libc::ENOENT
    }
}

impl std::fmt::Display for FileAccessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (errno {})",
            std::io::Error::from_raw_os_error(self.0),
            self.0
        )
    }
}

impl std::error::Error for FileAccessError {}

/// Abre `path` y retorna sus contenidos como región mapeada de solo lectura.
///
/// Los archivos vacíos se sirven como vista vacía sin mapear: `mmap`
/// rechaza longitud 0, y escalar eso a error fatal convertiría cada archivo
/// vacío en la muerte del servidor.
///
/// En modo verbose registra la apertura y el número de bytes leídos.
pub fn read_all(path: &str, verbose: bool) -> Result<SafeMap, FileAccessError> {
    let c_path = CString::new(path).map_err(|_| FileAccessError(libc::ENOENT))?;

    let raw = unsafe { libc::open(c_path.as_ptr(), libc::O_RDONLY) };
    if raw < 0 {
        return Err(FileAccessError::last());
    }
    let fd = SafeFd::new(raw);
    if verbose {
        eprintln!("open: se abre el archivo {}", path);
    }

    let length = unsafe { libc::lseek(fd.get(), 0, libc::SEEK_END) };
    if length < 0 {
        return Err(FileAccessError::last());
    }
    let length = length as usize;

    if length == 0 {
        return Ok(SafeMap::empty());
    }

    let addr = unsafe {
        libc::mmap(
            std::ptr::null_mut(),
            length,
            libc::PROT_READ,
            libc::MAP_PRIVATE,
            fd.get(),
            0,
        )
    };
    if addr == libc::MAP_FAILED {
        return Err(FileAccessError::last());
    }
    if verbose {
        eprintln!("read: se leen {} bytes del archivo {}", length, path);
    }

    // El descriptor se cierra aquí (drop de SafeFd); el mapeo no lo necesita
    drop(fd);

    // SAFETY: addr/length provienen del mmap exitoso de arriba y SafeMap es
    // su único dueño
    Ok(unsafe { SafeMap::from_raw(addr, length) })
}
