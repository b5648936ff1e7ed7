//! # Regiones de Memoria Mapeada
//! src/os/mmap.rs
//!
//! Este módulo define `SafeMap`, el dueño único de una región creada con
//! `mmap`. Al destruirse llama a `munmap` exactamente una vez (y solo si la
//! región no está vacía). La vista de bytes que expone está ligada al
//! lifetime del dueño, así que el borrow checker impide conservarla después
//! de que la región se haya liberado.

/// Dueño único de una región de memoria mapeada (dirección base + longitud).
#[derive(Debug)]
pub struct SafeMap {
    addr: *mut libc::c_void,
    len: usize,
}

impl SafeMap {
    /// Adopta una región ya mapeada.
    ///
    /// # Safety
    ///
    /// `addr` debe ser el valor retornado por un `mmap` exitoso de `len`
    /// bytes legibles, y ningún otro código debe liberar esa región.
    pub unsafe fn from_raw(addr: *mut libc::c_void, len: usize) -> Self {
        Self { addr, len }
    }

    /// Crea una región vacía (sin mapeo). Su destrucción no hace nada.
    pub const fn empty() -> Self {
        Self {
            addr: std::ptr::null_mut(),
            len: 0,
        }
    }

    /// Vista inmutable de los bytes mapeados.
    ///
    /// La referencia vive como máximo tanto como el `SafeMap`; no es posible
    /// retenerla tras la liberación de la región.
    pub fn as_bytes(&self) -> &[u8] {
        if self.len == 0 {
            return &[];
        }
        // SAFETY: addr/len provienen de un mmap exitoso de solo lectura y la
        // región sigue mapeada mientras `self` exista.
        unsafe { std::slice::from_raw_parts(self.addr as *const u8, self.len) }
    }

    /// Longitud en bytes de la región.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Indica si la región está vacía.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl Drop for SafeMap {
    fn drop(&mut self) {
        if self.len > 0 {
            // SAFETY: somos el único dueño de la región; tras liberar se
            // deja en estado vacío para que munmap ocurra una sola vez.
            unsafe {
                libc::munmap(self.addr, self.len);
            }
            self.addr = std::ptr::null_mut();
            self.len = 0;
        }
    }
}
