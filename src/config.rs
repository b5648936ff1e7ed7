//! # Configuración del Servidor
//! src/config.rs
//!
//! Este módulo define la superficie CLI del servidor y la resolución de la
//! configuración final a partir de flags, variables de entorno y valores por
//! defecto.
//!
//! La resolución es un paso explícito separado del parseo de flags: clap
//! solo reconoce las opciones, y `Config::resolve` decide los valores
//! finales consultando un lookup clave→valor inyectable. Eso permite
//! preservar la semántica requerida para las variables de entorno
//! (`DOCSERVER_PORT` inválido cae silenciosamente a 8080, cosa que el
//! atributo `env` de clap no puede expresar) y probar toda la matriz de
//! fallbacks sin tocar el entorno real del proceso.
//!
//! ## Ejemplos de uso
//!
//! ```bash
//! ./docserver --port 8080 --base /srv --verbose
//! DOCSERVER_PORT=9000 DOCSERVER_BASEDIR=/srv ./docserver
//! ```

use clap::Parser;

/// Puerto usado cuando ni el flag ni la variable de entorno aportan uno válido.
const DEFAULT_PORT: u16 = 8080;

/// Opciones reconocidas en la línea de comandos
///
/// `port` y `base` se capturan como texto crudo: toda la validación de
/// formato es nuestra (ver `Config::resolve`), de modo que un error de clap
/// sobre estas opciones solo puede significar "falta el valor".
#[derive(Debug, Clone, Parser)]
#[command(name = "docserver")]
#[command(about = "Compartir ficheros por internet")]
pub struct Cli {
    /// mostrar mensajes informativos por la salida de error
    #[arg(short, long)]
    pub verbose: bool,

    /// seleccionar el puerto por el que comunicarse
    // allow_hyphen_values: un valor como "-1" debe llegar a la validación
    // de formato propia (Wrong argument), no tratarse como opción desconocida
    #[arg(short, long, value_name = "puerto", allow_hyphen_values = true)]
    pub port: Option<String>,

    /// indicar el directorio base de los archivos que pida el cliente
    #[arg(short, long, value_name = "ruta")]
    pub base: Option<String>,
}

/// Errores detectados durante la validación de la configuración
///
/// Todos son fatales para el arranque: se reportan por la salida de error y
/// el proceso termina con estado distinto de cero antes de crear el socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentError {
    /// Una opción que requiere valor apareció sin él
    MissingArgument,

    /// El valor de una opción tiene un formato inválido
    WrongArgument,

    /// Se recibió una opción no reconocida
    UnknownOption,
}

impl std::fmt::Display for ArgumentError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ArgumentError::MissingArgument => write!(f, "Missing argument"),
            ArgumentError::WrongArgument => write!(f, "Wrong argument"),
            ArgumentError::UnknownOption => write!(f, "Unknown option"),
        }
    }
}

impl std::error::Error for ArgumentError {}

impl ArgumentError {
    /// Clasifica un error de parseo de clap en nuestra taxonomía.
    ///
    /// Retorna `None` para los "errores" que en realidad son ayuda/versión,
    /// que el llamante debe imprimir y salir con estado 0.
    pub fn from_clap(err: &clap::Error) -> Option<Self> {
        use clap::error::ErrorKind;
        match err.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => None,
            ErrorKind::UnknownArgument | ErrorKind::InvalidSubcommand => {
                Some(ArgumentError::UnknownOption)
            }
            // port/base son Option<String> sin validación en clap, así que
            // un InvalidValue solo puede ser un valor ausente
            _ => Some(ArgumentError::MissingArgument),
        }
    }
}

/// Configuración validada e inmutable del servidor
///
/// Se construye una única vez en el arranque y es el único dato compartido
/// entre las peticiones.
#[derive(Debug, Clone)]
pub struct Config {
    /// Puerto de escucha
    pub port: u16,

    /// Directorio base que se antepone a las rutas pedidas por el cliente
    pub base_dir: String,

    /// Emitir trazas informativas por la salida de error
    pub verbose: bool,
}

impl Config {
    /// Resuelve la configuración final a partir de los flags parseados y un
    /// lookup de variables de entorno.
    ///
    /// Reglas (el entorno solo se consulta cuando el flag no se dio):
    /// - `-p`: se rechaza cualquier valor con `.` (un decimal truncaría la
    ///   parte fraccionaria sin error) y cualquier valor no parseable.
    /// - `DOCSERVER_PORT`: un valor inválido cae silenciosamente a 8080.
    /// - `-b`: debe ser una ruta absoluta (empezar por `/`).
    /// - `DOCSERVER_BASEDIR`: vacío o ausente cae al directorio actual.
    ///
    /// # Ejemplo
    /// ```
    /// use docserver::config::{Cli, Config};
    /// use clap::Parser;
    ///
    /// let cli = Cli::parse_from(["docserver", "-p", "9000", "-b", "/srv"]);
    /// let config = Config::resolve(cli, |_| None).unwrap();
    /// assert_eq!(config.port, 9000);
    /// assert_eq!(config.base_dir, "/srv");
    /// ```
    pub fn resolve<F>(cli: Cli, lookup: F) -> Result<Self, ArgumentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match &cli.port {
            Some(raw) => Self::parse_port(raw)?,
            None => match lookup("DOCSERVER_PORT") {
                Some(value) => value.parse::<u16>().unwrap_or(DEFAULT_PORT),
                None => DEFAULT_PORT,
            },
        };

        let base_dir = match &cli.base {
            Some(raw) => {
                if !raw.starts_with('/') {
                    return Err(ArgumentError::WrongArgument);
                }
                raw.clone()
            }
            None => match lookup("DOCSERVER_BASEDIR") {
                Some(value) if !value.is_empty() => value,
                _ => std::env::current_dir()
                    .map(|dir| dir.display().to_string())
                    .unwrap_or_else(|_| String::from(".")),
            },
        };

        Ok(Config {
            port,
            base_dir,
            verbose: cli.verbose,
        })
    }

    /// Valida y parsea el valor del flag `-p`.
    fn parse_port(raw: &str) -> Result<u16, ArgumentError> {
        // from_chars en el diseño original ignoraba la parte decimal sin
        // reportar error; aquí el punto se rechaza explícitamente
        if raw.contains('.') {
            return Err(ArgumentError::WrongArgument);
        }
        raw.parse::<u16>().map_err(|_| ArgumentError::WrongArgument)
    }

    /// Dirección completa de escucha (`0.0.0.0:puerto`).
    pub fn address(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}
