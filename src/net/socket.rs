//! # Socket de Escucha y Conexiones
//! src/net/socket.rs
//!
//! Creación del socket de escucha (`socket` + `bind` + `listen`), aceptación
//! bloqueante de conexiones y recepción de peticiones. Cada descriptor vive
//! dentro de un `SafeFd`: el socket de escucha dura todo el proceso y cada
//! `Connection` se destruye (cerrando su descriptor) al terminar de atender
//! su petición, antes del siguiente `accept`.

use crate::os::SafeFd;
use std::net::{Ipv4Addr, SocketAddrV4};
use std::os::unix::io::RawFd;

/// Máximo de conexiones pendientes de aceptar que encola el sistema.
const BACKLOG: libc::c_int = 5;

/// Fallo de una operación de socket; transporta el errno como diagnóstico
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SocketError(pub i32);

impl SocketError {
    /// Captura el errno de la última llamada al sistema fallida.
    fn last() -> Self {
        Self(std::io::Error::last_os_error().raw_os_error().unwrap_or(0))
    }

    /// Código de error del sistema operativo.
    pub fn code(&self) -> i32 {
        self.0
    }

    /// Indica si el fallo es un reset del otro extremo (recuperable en la
    /// recepción; cualquier otro fallo de socket es fatal).
    pub fn is_peer_reset(&self) -> bool {
        self.0 == libc::ECONNRESET
    }
}

impl std::fmt::Display for SocketError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (errno {})",
            std::io::Error::from_raw_os_error(self.0),
            self.0
        )
    }
}

impl std::error::Error for SocketError {}

/// Extremo de escucha del servidor: descriptor propio + puerto pedido
#[derive(Debug)]
pub struct ListeningSocket {
    fd: SafeFd,
    port: u16,
}

impl ListeningSocket {
    /// Crea un socket TCP y lo liga a `0.0.0.0:port`.
    ///
    /// Falla con `SocketError` si la creación o el bind fallan (por ejemplo
    /// `EADDRINUSE` cuando el puerto ya está ocupado).
    pub fn create(port: u16) -> Result<Self, SocketError> {
        let raw = unsafe { libc::socket(libc::AF_INET, libc::SOCK_STREAM, 0) };
        if raw < 0 {
            return Err(SocketError::last());
        }
        let fd = SafeFd::new(raw);

        let mut address: libc::sockaddr_in = unsafe { std::mem::zeroed() };
        address.sin_family = libc::AF_INET as libc::sa_family_t;
        address.sin_addr.s_addr = libc::INADDR_ANY.to_be();
        address.sin_port = port.to_be();

        let result = unsafe {
            libc::bind(
                fd.get(),
                &address as *const libc::sockaddr_in as *const libc::sockaddr,
                std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t,
            )
        };
        if result < 0 {
            return Err(SocketError::last());
        }

        Ok(Self { fd, port })
    }

    /// Prepara el socket para aceptar conexiones (backlog fijo de 5).
    pub fn listen(&self) -> Result<(), SocketError> {
        let result = unsafe { libc::listen(self.fd.get(), BACKLOG) };
        if result < 0 {
            return Err(SocketError::last());
        }
        Ok(())
    }

    /// Puerto pedido en la creación (0 significa "elegido por el sistema").
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Puerto efectivo asignado por el sistema, vía `getsockname`.
    ///
    /// Útil cuando se liga el puerto 0 (los tests lo hacen para evitar
    /// colisiones).
    pub fn local_port(&self) -> Result<u16, SocketError> {
        let mut address: libc::sockaddr_in = unsafe { std::mem::zeroed() };
        let mut length = std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;
        let result = unsafe {
            libc::getsockname(
                self.fd.get(),
                &mut address as *mut libc::sockaddr_in as *mut libc::sockaddr,
                &mut length,
            )
        };
        if result < 0 {
            return Err(SocketError::last());
        }
        Ok(u16::from_be(address.sin_port))
    }

    /// Bloquea hasta que un cliente conecte y retorna la conexión aceptada.
    ///
    /// En modo verbose emite una traza por la salida de error (efecto
    /// secundario sin impacto en el comportamiento).
    pub fn accept(&self, verbose: bool) -> Result<Connection, SocketError> {
        let mut address: libc::sockaddr_in = unsafe { std::mem::zeroed() };
        let mut length = std::mem::size_of::<libc::sockaddr_in>() as libc::socklen_t;

        let raw = unsafe {
            libc::accept(
                self.fd.get(),
                &mut address as *mut libc::sockaddr_in as *mut libc::sockaddr,
                &mut length,
            )
        };
        if raw < 0 {
            return Err(SocketError::last());
        }

        let peer = SocketAddrV4::new(
            Ipv4Addr::from(u32::from_be(address.sin_addr.s_addr)),
            u16::from_be(address.sin_port),
        );
        if verbose {
            eprintln!("accept: conexion aceptada desde {}", peer);
        }

        Ok(Connection {
            fd: SafeFd::new(raw),
            peer,
        })
    }
}

/// Una conexión aceptada: descriptor propio + dirección del cliente
///
/// Nunca se reutiliza (no hay keep-alive): se destruye tras enviar una
/// única respuesta.
#[derive(Debug)]
pub struct Connection {
    fd: SafeFd,
    peer: SocketAddrV4,
}

impl Connection {
    /// Dirección del otro extremo.
    pub fn peer(&self) -> SocketAddrV4 {
        self.peer
    }

    /// Descriptor crudo, para las llamadas de envío. No transfiere ownership.
    pub fn raw_fd(&self) -> RawFd {
        self.fd.get()
    }

    /// Una única recepción bloqueante de hasta `max` bytes.
    ///
    /// Una petición repartida entre varios paquetes no se reensambla; un
    /// retorno de 0 bytes significa que el cliente cerró sin enviar nada.
    pub fn receive(&self, max: usize) -> Result<Vec<u8>, SocketError> {
        let mut buffer = vec![0u8; max];
        let received = unsafe {
            libc::recv(
                self.fd.get(),
                buffer.as_mut_ptr() as *mut libc::c_void,
                max,
                0,
            )
        };
        if received < 0 {
            return Err(SocketError::last());
        }
        buffer.truncate(received as usize);
        Ok(buffer)
    }
}
