//! # docserver - Entry Point
//! src/main.rs
//!
//! Punto de entrada: parseo de flags, resolución de la configuración
//! (flags → variables de entorno → valores por defecto) y arranque del
//! bucle del servidor.

use clap::Parser;
use docserver::config::{ArgumentError, Cli, Config};
use docserver::server::Server;

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(error) => match ArgumentError::from_clap(&error) {
            // Ayuda o versión: imprimir y salir con éxito
            None => {
                let _ = error.print();
                std::process::exit(0);
            }
            Some(category) => {
                eprintln!("{}", category);
                std::process::exit(1);
            }
        },
    };

    let config = match Config::resolve(cli, |name| std::env::var(name).ok()) {
        Ok(config) => config,
        Err(category) => {
            eprintln!("{}", category);
            std::process::exit(1);
        }
    };

    if config.verbose {
        eprintln!(
            "docserver: puerto {}, directorio base {}",
            config.port, config.base_dir
        );
    }

    let mut server = Server::new(config);
    if let Err(error) = server.run() {
        eprintln!("Error fatal: {}", error);
        std::process::exit(1);
    }
}
