//! # docserver
//! src/lib.rs
//!
//! Servidor de documentos TCP secuencial para demostrar conceptos de
//! sistemas operativos: ownership de recursos del kernel (descriptores,
//! mapeos de memoria), creación de procesos y E/S bloqueante.
//!
//! ## Arquitectura
//!
//! El servidor está dividido en módulos especializados:
//! - `config`: flags CLI, variables de entorno y configuración inmutable
//! - `os`: wrappers con ownership sobre descriptores y mapeos (`SafeFd`, `SafeMap`)
//! - `net`: socket de escucha, conexiones y envío de respuestas
//! - `request`: parsing del protocolo mínimo `<METODO> <RUTA>`
//! - `files`: servicio de archivos por mapeo de memoria
//! - `exec`: ejecución síncrona de programas con captura de salida
//! - `server`: el bucle de despacho secuencial
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use docserver::config::Config;
//! use docserver::server::Server;
//!
//! let config = Config {
//!     port: 8080,
//!     base_dir: "/srv".to_string(),
//!     verbose: false,
//! };
//! let mut server = Server::new(config);
//! server.run().expect("error fatal del servidor");
//! ```

pub mod config;
pub mod exec;
pub mod files;
pub mod net;
pub mod os;
pub mod request;
pub mod server;
