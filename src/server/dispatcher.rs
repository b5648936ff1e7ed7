//! # Bucle de Despacho
//! src/server/dispatcher.rs
//!
//! El corazón del servidor: `Escuchando → (accept) → Parseando → (enrutar)
//! → Sirviendo → (responder) → Escuchando`. No hay estado terminal; el
//! bucle solo sale ante un error fatal o la terminación del proceso.
//!
//! Política por categoría de error (quién decide es el despachador, no las
//! operaciones de bajo nivel):
//! - accept fallido: fatal
//! - recv fallido: recuperable solo si es un reset del cliente
//! - archivo: `EACCES` → 403, `ENOENT` → 404, cualquier otro errno fatal
//! - lanzamiento de programa: recuperable en el punto de llamada
//! - envío: recuperable solo si el cliente cerró de golpe

use crate::config::Config;
use crate::exec::{self, ExecEnvironment};
use crate::files;
use crate::net::{send_response, Connection, ListeningSocket, SendError, SocketError};
use crate::request::{Request, MAX_REQUEST_SIZE};

/// Prefijo de ruta que selecciona la ejecución de programas.
const EXEC_PREFIX: &str = "/bin";

/// Error fatal que termina el bucle del servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerError {
    /// Fallo al crear, ligar, escuchar o aceptar
    Socket(SocketError),

    /// Fallo de archivo no traducible a 403/404
    Filesystem(files::FileAccessError),

    /// Fallo de envío distinto de un reset del cliente
    Send(SendError),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServerError::Socket(e) => write!(f, "socket: {}", e),
            ServerError::Filesystem(e) => write!(f, "file: {}", e),
            ServerError::Send(e) => write!(f, "send: {}", e),
        }
    }
}

impl std::error::Error for ServerError {}

/// Servidor de documentos secuencial
pub struct Server {
    config: Config,
    socket: Option<ListeningSocket>,
}

impl Server {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            socket: None,
        }
    }

    /// Crea el socket de escucha y lo deja aceptando conexiones.
    ///
    /// Retorna el puerto efectivo (relevante cuando la configuración pide el
    /// puerto 0). Falla con `SocketError` si el puerto no está disponible,
    /// antes de que exista ningún bucle de aceptación.
    pub fn bind(&mut self) -> Result<u16, ServerError> {
        let socket =
            ListeningSocket::create(self.config.port).map_err(ServerError::Socket)?;
        socket.listen().map_err(ServerError::Socket)?;
        let port = socket.local_port().map_err(ServerError::Socket)?;

        if self.config.verbose {
            eprintln!("Listening for incoming connections on port {}", port);
        }
        self.socket = Some(socket);
        Ok(port)
    }

    /// Bucle principal: acepta, atiende y repite, una conexión a la vez.
    ///
    /// Solo retorna con `Err`: cualquier retorno es un error fatal que el
    /// llamante reporta antes de terminar el proceso.
    pub fn run(&mut self) -> Result<(), ServerError> {
        if self.socket.is_none() {
            self.bind()?;
        }

        while let Some(socket) = self.socket.as_ref() {
            let connection = socket
                .accept(self.config.verbose)
                .map_err(ServerError::Socket)?;
            // Todos los recursos de la petición (conexión, mapeo, tubería)
            // se liberan al salir de handle_connection, antes del siguiente
            // accept
            Self::handle_connection(&self.config, connection)?;
        }
        Ok(())
    }

    /// Atiende una conexión completa. `Ok(())` significa "continuar el
    /// bucle"; `Err` es fatal.
    fn handle_connection(
        config: &Config,
        connection: Connection,
    ) -> Result<(), ServerError> {
        let bytes = match connection.receive(MAX_REQUEST_SIZE) {
            Ok(bytes) => bytes,
            Err(error) => {
                eprintln!("recv: {}", error);
                if error.is_peer_reset() {
                    return Ok(());
                }
                return Err(ServerError::Socket(error));
            }
        };

        let request = match Request::parse(&bytes) {
            Ok(request) => request,
            Err(error) => {
                if config.verbose {
                    eprintln!("parse: peticion malformada: {}", error);
                }
                // Petición malformada: 400 y de vuelta al accept, sin
                // pasar por el enrutado
                return Self::finish_send(send_response(
                    &connection,
                    "400 Bad Request",
                    b"",
                    config.verbose,
                ));
            }
        };

        let target = format!("{}{}", config.base_dir, request.path());
        if request.path().starts_with(EXEC_PREFIX) {
            Self::serve_program(config, &connection, &request, &target)
        } else {
            Self::serve_file(config, &connection, &request, &target)
        }
    }

    /// Ruta de archivos: mapear y devolver los bytes tal cual.
    fn serve_file(
        config: &Config,
        connection: &Connection,
        request: &Request,
        target: &str,
    ) -> Result<(), ServerError> {
        match files::read_all(target, config.verbose) {
            Ok(map) => {
                let header =
                    format!("{}: {} bytes", request.display_name(), map.len());
                Self::finish_send(send_response(
                    connection,
                    &header,
                    map.as_bytes(),
                    config.verbose,
                ))
            }
            Err(error) => {
                eprintln!("open: {}: {}", target, error);
                let status = if error.is_forbidden() {
                    "403 Forbidden"
                } else if error.is_not_found() {
                    "404 Not Found"
                } else {
                    return Err(ServerError::Filesystem(error));
                };
                Self::finish_send(send_response(connection, status, b"", config.verbose))
            }
        }
    }

    /// Ruta de programas: ejecutar y devolver la salida capturada, enmarcada
    /// igual que un archivo.
    fn serve_program(
        config: &Config,
        connection: &Connection,
        request: &Request,
        target: &str,
    ) -> Result<(), ServerError> {
        let peer = connection.peer();
        let env = ExecEnvironment {
            request_path: request.path().to_string(),
            server_basedir: config.base_dir.clone(),
            remote_port: peer.port().to_string(),
            remote_ip: peer.ip().to_string(),
        };

        match exec::execute_program(target, &env) {
            Ok(result) => {
                if config.verbose {
                    match result.exit_code() {
                        Some(code) => {
                            eprintln!("exec: {} termina con estado {}", target, code)
                        }
                        None => eprintln!("exec: {} termina por senal", target),
                    }
                }
                let header = format!(
                    "{}: {} bytes",
                    request.display_name(),
                    result.output().len()
                );
                Self::finish_send(send_response(
                    connection,
                    &header,
                    result.output(),
                    config.verbose,
                ))
            }
            Err(error) => {
                eprintln!("exec: {}: {}", target, error);
                let status = if error.is_not_found() {
                    "404 Not Found"
                } else if error.is_forbidden() {
                    "403 Forbidden"
                } else {
                    // Fallo de lanzamiento recuperable sin contrato de
                    // respuesta: la conexión se cierra sin enviar nada
                    return Ok(());
                };
                Self::finish_send(send_response(connection, status, b"", config.verbose))
            }
        }
    }

    /// Aplica la política de errores de envío: un reset del cliente se
    /// registra y el bucle continúa; cualquier otro fallo es fatal.
    fn finish_send(result: Result<(), SendError>) -> Result<(), ServerError> {
        match result {
            Ok(()) => Ok(()),
            Err(error) if error.is_peer_reset() => {
                eprintln!("send: cliente desconectado: {}", error);
                Ok(())
            }
            Err(error) => {
                eprintln!("Error sending response");
                Err(ServerError::Send(error))
            }
        }
    }
}
