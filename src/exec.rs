//! # Ejecución de Programas
//! src/exec.rs
//!
//! Servicio de peticiones estilo CGI: ejecutar un programa local de forma
//! síncrona y capturar su salida estándar. La operación completa —tubería,
//! creación del proceso hijo, reemplazo de imagen y espera— queda detrás de
//! una única función; el mecanismo de duplicación de procesos es un detalle
//! de implementación, no una primitiva expuesta.
//!
//! El hijo recibe por entorno los metadatos de la petición
//! (`REQUEST_PATH`, `SERVER_BASEDIR`, `REMOTE_PORT`, `REMOTE_IP`), además de
//! heredar el entorno del servidor.

use std::ffi::CString;
use std::io::Read;
use std::process::{Command, Stdio};

/// Máximo de bytes capturados de la salida del hijo. Lo que exceda este
/// límite se pierde silenciosamente (limitación aceptada).
pub const CAPTURE_LIMIT: usize = 1024;

/// Estado reservado que señala "no se pudo ejecutar" el programa pedido.
pub const EXIT_COULD_NOT_EXEC: i32 = 126;

/// Metadatos de la petición exportados al entorno del proceso hijo
#[derive(Debug, Clone)]
pub struct ExecEnvironment {
    /// Ruta pedida por el cliente (tal y como llegó en la petición)
    pub request_path: String,

    /// Directorio base configurado en el servidor
    pub server_basedir: String,

    /// Puerto del extremo remoto
    pub remote_port: String,

    /// Dirección IP del extremo remoto
    pub remote_ip: String,
}

impl ExecEnvironment {
    fn apply(&self, command: &mut Command) {
        command
            .env("REQUEST_PATH", &self.request_path)
            .env("SERVER_BASEDIR", &self.server_basedir)
            .env("REMOTE_PORT", &self.remote_port)
            .env("REMOTE_IP", &self.remote_ip);
    }
}

/// Resultado de una ejecución: salida capturada (acotada) y estado de salida
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    output: Vec<u8>,
    exit_code: Option<i32>,
}

impl ExecutionResult {
    /// Bytes capturados de la salida estándar del hijo (como mucho 1024).
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Estado de salida del hijo; `None` si terminó por señal.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}

/// Fallo a nivel de lanzamiento: el programa nunca llegó a producir salida
///
/// `exit_code` es 126 cuando el reemplazo de imagen falló y -1 para los
/// fallos previos (validación, espera); `error_code` es el errno.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessError {
    pub exit_code: i32,
    pub error_code: i32,
}

impl ProcessError {
    fn before_spawn(error_code: i32) -> Self {
        Self {
            exit_code: -1,
            error_code,
        }
    }

    /// Clasifica un fallo de lanzamiento. El estado reservado 126 señala
    /// que el reemplazo de imagen falló (el objetivo no existe, no es
    /// ejecutable o no es una imagen válida); un fallo previo a eso, como
    /// no poder crear el proceso (`EAGAIN`), se reporta con -1.
    fn from_spawn(error_code: i32) -> Self {
        match error_code {
            libc::ENOENT | libc::EACCES | libc::ENOEXEC => Self {
                exit_code: EXIT_COULD_NOT_EXEC,
                error_code,
            },
            _ => Self::before_spawn(error_code),
        }
    }

    /// El programa pedido no existe.
    pub fn is_not_found(&self) -> bool {
        self.error_code == libc::ENOENT
    }

    /// El programa existe pero no es ejecutable.
    pub fn is_forbidden(&self) -> bool {
        self.error_code == libc::EACCES
    }
}

impl std::fmt::Display for ProcessError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (errno {}, exit {})",
            std::io::Error::from_raw_os_error(self.error_code),
            self.error_code,
            self.exit_code
        )
    }
}

impl std::error::Error for ProcessError {}

/// Ejecuta `path` sin argumentos, con la salida estándar redirigida a una
/// tubería, espera a que termine y retorna hasta 1024 bytes capturados.
///
/// Pasos:
/// 1. Validar con `access` que el objetivo existe y es ejecutable, sin
///    llegar a lanzar nada si no lo es.
/// 2. Lanzar el hijo con la tubería y los metadatos en el entorno. Un fallo
///    de lanzamiento (el exec nunca ocurrió) se reporta con el estado
///    reservado 126.
/// 3. Esperar (bloqueante) y leer de la tubería hasta el límite de captura.
pub fn execute_program(
    path: &str,
    env: &ExecEnvironment,
) -> Result<ExecutionResult, ProcessError> {
    // Comprobar que el programa existe y tiene permiso de ejecución
    let c_path =
        CString::new(path).map_err(|_| ProcessError::before_spawn(libc::ENOENT))?;
    let accessible = unsafe {
        libc::access(c_path.as_ptr(), libc::F_OK) == 0
            && libc::access(c_path.as_ptr(), libc::X_OK) == 0
    };
    if !accessible {
        let errno = std::io::Error::last_os_error().raw_os_error().unwrap_or(0);
        eprintln!("exec: archivo no valido: {}", path);
        return Err(ProcessError::before_spawn(errno));
    }

    let mut command = Command::new(path);
    command.stdout(Stdio::piped());
    env.apply(&mut command);

    let mut child = command
        .spawn()
        .map_err(|error| ProcessError::from_spawn(error.raw_os_error().unwrap_or(0)))?;

    // Espera síncrona; un hijo que no termina bloquea el servidor entero
    // (limitación aceptada del diseño secuencial)
    let status = child.wait().map_err(|error| {
        ProcessError::before_spawn(error.raw_os_error().unwrap_or(0))
    })?;

    let mut output = Vec::new();
    if let Some(stdout) = child.stdout.take() {
        stdout
            .take(CAPTURE_LIMIT as u64)
            .read_to_end(&mut output)
            .map_err(|error| {
                ProcessError::before_spawn(error.raw_os_error().unwrap_or(0))
            })?;
    }

    Ok(ExecutionResult {
        output,
        exit_code: status.code(),
    })
}
