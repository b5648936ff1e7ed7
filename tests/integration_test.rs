//! Tests de integración del servidor de documentos
//! tests/integration_test.rs
//!
//! Cada test arranca su propio servidor en un puerto efímero con un
//! directorio base propio, así que la suite no necesita ningún proceso
//! externo corriendo ni puertos fijos libres.

use docserver::config::Config;
use docserver::server::Server;
use std::io::{Read, Write};
use std::net::{Shutdown, TcpStream};
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Helper: directorio base limpio para un test.
fn scratch_base(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "docserver_it_{}_{}",
        std::process::id(),
        name
    ));
    std::fs::remove_dir_all(&dir).ok();
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

/// Helper: arranca el servidor sobre `base_dir` y retorna el puerto efectivo.
/// El hilo del servidor queda bloqueado en accept; se abandona al terminar
/// el proceso de tests.
fn start_server(base_dir: &Path) -> u16 {
    let config = Config {
        port: 0,
        base_dir: base_dir.display().to_string(),
        verbose: false,
    };
    let mut server = Server::new(config);
    let port = server.bind().expect("bind");
    thread::spawn(move || {
        let _ = server.run();
    });
    port
}

/// Helper: envía `payload` tal cual y retorna la respuesta completa.
fn send_raw(port: u16, payload: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(("127.0.0.1", port)).expect("connect");
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    stream
        .set_write_timeout(Some(Duration::from_secs(5)))
        .unwrap();

    if !payload.is_empty() {
        stream.write_all(payload).unwrap();
        stream.flush().unwrap();
    }
    stream.shutdown(Shutdown::Write).unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    response
}

fn send_request(port: u16, line: &str) -> Vec<u8> {
    send_raw(port, line.as_bytes())
}

// ==================== Servicio de archivos ====================

#[test]
fn test_file_hit_has_exact_framing() {
    let base = scratch_base("file_hit");
    std::fs::write(base.join("index.html"), b"<html>hola</html>\n").unwrap();
    let port = start_server(&base);

    let response = send_request(port, "GET /index.html");

    // Cabecera "nombre: N bytes" (sin la / inicial), un \n, y el cuerpo
    // exacto del archivo
    assert_eq!(response, b"index.html: 18 bytes\n<html>hola</html>\n");
}

#[test]
fn test_same_request_twice_is_byte_identical() {
    let base = scratch_base("idempotent");
    std::fs::write(base.join("doc.txt"), b"contenido estable").unwrap();
    let port = start_server(&base);

    let first = send_request(port, "GET /doc.txt");
    let second = send_request(port, "GET /doc.txt");

    assert_eq!(first, second);
    assert!(first.starts_with(b"doc.txt: 17 bytes\n"));
}

#[test]
fn test_empty_file_is_served() {
    let base = scratch_base("empty_file");
    std::fs::write(base.join("vacio.txt"), b"").unwrap();
    let port = start_server(&base);

    let response = send_request(port, "GET /vacio.txt");
    assert_eq!(response, b"vacio.txt: 0 bytes\n");
}

#[test]
fn test_unreadable_file_is_403_with_empty_body() {
    // root ignora los permisos de lectura; el caso solo es observable
    // como usuario normal
    if unsafe { libc::geteuid() } == 0 {
        return;
    }
    let base = scratch_base("forbidden");
    let path = base.join("secreto.txt");
    std::fs::write(&path, b"secreto").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o000)).unwrap();
    let port = start_server(&base);

    let response = send_request(port, "GET /secreto.txt");
    assert_eq!(response, b"403 Forbidden\n");
}

#[test]
fn test_missing_file_is_404_with_empty_body() {
    let base = scratch_base("missing");
    let port = start_server(&base);

    let response = send_request(port, "GET /no_existe.html");
    assert_eq!(response, b"404 Not Found\n");
}

#[test]
fn test_nested_path_is_resolved_under_base() {
    let base = scratch_base("nested");
    std::fs::create_dir_all(base.join("docs")).unwrap();
    std::fs::write(base.join("docs/leeme.txt"), b"anidado").unwrap();
    let port = start_server(&base);

    let response = send_request(port, "GET /docs/leeme.txt");
    assert_eq!(response, b"docs/leeme.txt: 7 bytes\nanidado");
}

// ==================== Peticiones malformadas ====================

#[test]
fn test_non_get_method_is_400() {
    let base = scratch_base("bad_method");
    std::fs::write(base.join("index.html"), b"hola").unwrap();
    let port = start_server(&base);

    let response = send_request(port, "POST /index.html");
    assert_eq!(response, b"400 Bad Request\n");
}

#[test]
fn test_relative_path_is_400() {
    let base = scratch_base("bad_path");
    let port = start_server(&base);

    let response = send_request(port, "GET index.html");
    assert_eq!(response, b"400 Bad Request\n");
}

#[test]
fn test_zero_bytes_is_400() {
    let base = scratch_base("zero_bytes");
    let port = start_server(&base);

    // Conectar y cerrar la escritura sin enviar nada
    let response = send_raw(port, b"");
    assert_eq!(response, b"400 Bad Request\n");
}

#[test]
fn test_server_survives_bad_request() {
    let base = scratch_base("survives");
    std::fs::write(base.join("ok.txt"), b"sigo vivo").unwrap();
    let port = start_server(&base);

    assert_eq!(send_request(port, "DELETE /ok.txt"), b"400 Bad Request\n");
    // El bucle continúa: la siguiente petición bien formada se sirve
    assert_eq!(send_request(port, "GET /ok.txt"), b"ok.txt: 9 bytes\nsigo vivo");
}

// ==================== Ejecución de programas ====================

fn install_script(base: &Path, name: &str, body: &str) {
    let bin = base.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let path = bin.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_bin_prefix_executes_and_frames_output() {
    let base = scratch_base("bin_hello");
    install_script(&base, "hello", "echo hi");
    let port = start_server(&base);

    let response = send_request(port, "GET /bin/hello");
    assert_eq!(response, b"bin/hello: 3 bytes\nhi\n");
}

#[test]
fn test_bin_child_sees_request_metadata() {
    let base = scratch_base("bin_env");
    install_script(&base, "whoami", r#"printf '%s' "$REQUEST_PATH""#);
    let port = start_server(&base);

    let response = send_request(port, "GET /bin/whoami");
    assert_eq!(response, b"bin/whoami: 11 bytes\n/bin/whoami");
}

#[test]
fn test_bin_missing_program_is_404() {
    let base = scratch_base("bin_missing");
    std::fs::create_dir_all(base.join("bin")).unwrap();
    let port = start_server(&base);

    let response = send_request(port, "GET /bin/no_existe");
    assert_eq!(response, b"404 Not Found\n");
}

#[test]
fn test_bin_non_executable_target_is_403() {
    // Sin bit de ejecución, access(X_OK) falla incluso para root
    let base = scratch_base("bin_forbidden");
    let bin = base.join("bin");
    std::fs::create_dir_all(&bin).unwrap();
    let path = bin.join("datos");
    std::fs::write(&path, b"solo texto\n").unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
    let port = start_server(&base);

    let response = send_request(port, "GET /bin/datos");
    assert_eq!(response, b"403 Forbidden\n");
}

#[test]
fn test_bin_output_is_truncated() {
    let base = scratch_base("bin_truncated");
    install_script(&base, "chatty", "head -c 5000 /dev/zero | tr '\\0' 'x'");
    let port = start_server(&base);

    let response = send_request(port, "GET /bin/chatty");
    assert!(response.starts_with(b"bin/chatty: 1024 bytes\n"));
    assert_eq!(response.len(), b"bin/chatty: 1024 bytes\n".len() + 1024);
}

// ==================== Arranque ====================

#[test]
fn test_startup_fails_when_port_is_busy() {
    let taken = std::net::TcpListener::bind("0.0.0.0:0").unwrap();
    let port = taken.local_addr().unwrap().port();

    let config = Config {
        port,
        base_dir: "/tmp".to_string(),
        verbose: false,
    };
    let mut server = Server::new(config);

    // El fallo ocurre antes de cualquier bucle de aceptación
    assert!(server.run().is_err());
}
