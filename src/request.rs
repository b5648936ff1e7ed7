//! # Parsing de Peticiones
//! src/request.rs
//!
//! El protocolo del servidor no es HTTP completo: el cliente envía una línea
//! `<METODO> <RUTA>` (opcionalmente seguida de más bytes) dentro de una única
//! recepción acotada a 1024 bytes. Aquí se extraen los dos primeros tokens y
//! se clasifica la petición.
//!
//! Una petición malformada se responde con el literal `400 Bad Request` y no
//! llega al enrutado.

/// Tamaño máximo de una petición: lo que quepa en una sola recepción.
pub const MAX_REQUEST_SIZE: usize = 1024;

/// Petición parseada: método y ruta
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    method: String,
    path: String,
}

/// Errores que clasifican una petición como malformada
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// No se recibió ningún byte
    EmptyRequest,

    /// El método no es exactamente `GET`
    UnsupportedMethod(String),

    /// La ruta está vacía o no empieza por `/`
    InvalidPath(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::UnsupportedMethod(m) => write!(f, "Unsupported method: {}", m),
            ParseError::InvalidPath(p) => write!(f, "Invalid path: {}", p),
        }
    }
}

impl std::error::Error for ParseError {}

impl Request {
    /// Parsea los bytes de una recepción.
    ///
    /// Toma los dos primeros tokens separados por espacios en blanco como
    /// método y ruta. Una línea partida entre varios paquetes NO se
    /// reensambla: es una limitación aceptada del protocolo, no un defecto.
    ///
    /// # Ejemplo
    /// ```
    /// use docserver::request::Request;
    ///
    /// let request = Request::parse(b"GET /index.html").unwrap();
    /// assert_eq!(request.method(), "GET");
    /// assert_eq!(request.path(), "/index.html");
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.is_empty() {
            return Err(ParseError::EmptyRequest);
        }

        let text = String::from_utf8_lossy(buffer);
        let mut tokens = text.split_whitespace();
        let method = tokens.next().unwrap_or("").to_string();
        let path = tokens.next().unwrap_or("").to_string();

        if method != "GET" {
            return Err(ParseError::UnsupportedMethod(method));
        }
        if !path.starts_with('/') {
            return Err(ParseError::InvalidPath(path));
        }

        Ok(Request { method, path })
    }

    /// Método de la petición (siempre `GET` si el parseo tuvo éxito).
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Ruta pedida; empieza por `/` si el parseo tuvo éxito.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Nombre con el que se reporta el recurso en la cabecera de respuesta:
    /// la ruta sin la `/` inicial.
    pub fn display_name(&self) -> &str {
        self.path.strip_prefix('/').unwrap_or(&self.path)
    }
}
