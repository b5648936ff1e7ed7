//! # Envío de Respuestas
//! src/net/response.rs
//!
//! Enmarcado de la respuesta sobre la conexión: la línea de cabecera, un
//! único byte `\n` como separador y el cuerpo (posiblemente vacío), cada uno
//! con una llamada de envío bloqueante.
//!
//! ## Formato en el cable
//!
//! ```text
//! index.html: 11 bytes\n
//! hola mundo\n
//! ```
//!
//! No hay código de estado numérico separado de la frase literal, ni más
//! cabeceras, ni content-length explícito.

use crate::net::socket::Connection;

/// Fallo del primer envío que retorna error; transporta el errno
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendError(pub i32);

impl SendError {
    /// Código de error del sistema operativo.
    pub fn code(&self) -> i32 {
        self.0
    }

    /// Indica si el fallo es que el cliente cerró la conexión de golpe.
    /// Es la única condición no fatal al enviar: se registra y el bucle
    /// continúa.
    pub fn is_peer_reset(&self) -> bool {
        self.0 == libc::ECONNRESET || self.0 == libc::EPIPE
    }
}

impl std::fmt::Display for SendError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (errno {})",
            std::io::Error::from_raw_os_error(self.0),
            self.0
        )
    }
}

impl std::error::Error for SendError {}

/// Un envío bloqueante de `bytes` completo sobre la conexión.
///
/// `MSG_NOSIGNAL`: un cliente desaparecido debe producir `EPIPE` en vez de
/// SIGPIPE, o el reset del otro extremo mataría el proceso entero.
fn send_all(connection: &Connection, bytes: &[u8]) -> Result<(), SendError> {
    let mut sent = 0;
    while sent < bytes.len() {
        let result = unsafe {
            libc::send(
                connection.raw_fd(),
                bytes[sent..].as_ptr() as *const libc::c_void,
                bytes.len() - sent,
                libc::MSG_NOSIGNAL,
            )
        };
        if result < 0 {
            let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
            return Err(SendError(errno));
        }
        sent += result as usize;
    }
    Ok(())
}

/// Escribe cabecera, separador y cuerpo sobre la conexión.
///
/// Falla con el errno del primer envío que retorne error. En modo verbose
/// registra el envío por la salida de error antes de escribir.
pub fn send_response(
    connection: &Connection,
    header: &str,
    body: &[u8],
    verbose: bool,
) -> Result<(), SendError> {
    if verbose {
        eprintln!("send: enviando respuesta...");
    }
    send_all(connection, header.as_bytes())?;

    // Salto de línea entre cabecera y cuerpo
    send_all(connection, b"\n")?;

    send_all(connection, body)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::socket::ListeningSocket;
    use std::io::Read;
    use std::net::TcpStream;
    use std::thread;

    fn ephemeral_socket() -> (ListeningSocket, u16) {
        let socket = ListeningSocket::create(0).expect("create");
        socket.listen().expect("listen");
        let port = socket.local_port().expect("local_port");
        (socket, port)
    }

    #[test]
    fn test_header_newline_body_framing() {
        let (socket, port) = ephemeral_socket();

        let client_thread = thread::spawn(move || {
            let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
            let mut received = Vec::new();
            client.read_to_end(&mut received).unwrap();
            received
        });

        let connection = socket.accept(false).unwrap();
        send_response(&connection, "doc.txt: 4 bytes", b"hola", false).unwrap();
        drop(connection);

        let received = client_thread.join().unwrap();
        assert_eq!(received, b"doc.txt: 4 bytes\nhola");
    }

    #[test]
    fn test_empty_body() {
        let (socket, port) = ephemeral_socket();

        let client_thread = thread::spawn(move || {
            let mut client = TcpStream::connect(("127.0.0.1", port)).unwrap();
            let mut received = Vec::new();
            client.read_to_end(&mut received).unwrap();
            received
        });

        let connection = socket.accept(false).unwrap();
        send_response(&connection, "404 Not Found", b"", false).unwrap();
        drop(connection);

        let received = client_thread.join().unwrap();
        assert_eq!(received, b"404 Not Found\n");
    }

    #[test]
    fn test_peer_reset_is_not_fatal_category() {
        assert!(SendError(libc::ECONNRESET).is_peer_reset());
        assert!(SendError(libc::EPIPE).is_peer_reset());
        assert!(!SendError(libc::EBADF).is_peer_reset());
    }

    #[test]
    fn test_send_to_closed_peer_reports_error() {
        let (socket, port) = ephemeral_socket();

        let client = TcpStream::connect(("127.0.0.1", port)).unwrap();
        let connection = socket.accept(false).unwrap();
        drop(client); // el cliente se va antes de la respuesta

        // El primer envío puede llegar a colarse en el buffer del kernel;
        // tras varios intentos el error del peer debe aflorar como EPIPE o
        // ECONNRESET, nunca como una señal que mate el proceso.
        let mut saw_error = None;
        for _ in 0..16 {
            if let Err(error) = send_response(&connection, "header", b"body", false) {
                saw_error = Some(error);
                break;
            }
        }
        if let Some(error) = saw_error {
            assert!(error.is_peer_reset(), "unexpected errno: {}", error);
        }
    }
}
