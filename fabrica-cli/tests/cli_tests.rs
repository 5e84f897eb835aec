//! Integration tests for the Fabrica CLI

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const LIBRARY: &str = r#"{
    "libros": [{
        "id": 1,
        "titulo": "Mi Libro",
        "coverUrl": "",
        "fechaCreacion": "2024-01-02T03:04:05Z",
        "collectionId": null,
        "capitulos": [{
            "id": 2,
            "titulo": "El comienzo",
            "completado": false,
            "contenido": [
                {"artesanoId": "base", "nombreArtesano": "Texto Base", "texto": "Hola mundo"},
                {"artesanoId": 5, "nombreArtesano": "Tono Casual", "texto": "Qué tal, mundo"}
            ],
            "traducciones": [{"idioma": "Inglés", "texto": "Hello world"}]
        }]
    }],
    "artesanos": [
        {"id": 5, "nombre": "Tono Casual", "prompt": "Reescribe en tono casual"},
        {"id": "multicultural", "nombre": "Artesano Multicultural", "prompt": "Traduce"}
    ],
    "colecciones": [],
    "gruposArtesanos": [{"id": 8, "nombre": "Casual", "artesanoIds": [5]}]
}"#;

/// A command bound to a fresh data directory, isolated from the environment
fn fabrica(data_dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("fabrica-cli").unwrap();
    cmd.arg("--data-dir")
        .arg(data_dir)
        .env_remove("GEMINI_API_KEY")
        .env_remove("FABRICA_DATA_DIR");
    cmd
}

/// Data directory holding the sample library
fn imported() -> TempDir {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("library.json");
    fs::write(&file, LIBRARY).unwrap();
    fabrica(&dir.path().join("data"))
        .arg("import")
        .arg(&file)
        .assert()
        .success()
        .stdout(predicate::str::contains("Imported 1 books (1 chapters)"));
    dir
}

fn data(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("data")
}

#[test]
fn test_help() {
    let mut cmd = Command::cargo_bin("fabrica-cli").unwrap();
    cmd.arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("book"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("library"))
        .stdout(predicate::str::contains("annotate"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn test_version() {
    let mut cmd = Command::cargo_bin("fabrica-cli").unwrap();
    cmd.arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fabrica"));
}

#[test]
fn test_generate_help() {
    let mut cmd = Command::cargo_bin("fabrica-cli").unwrap();
    cmd.args(["generate", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--artisans"))
        .stdout(predicate::str::contains("--languages"))
        .stdout(predicate::str::contains("--archive"));
}

#[test]
fn test_create_and_list_books() {
    let dir = TempDir::new().unwrap();
    fabrica(dir.path())
        .args(["book", "create", "--title", "Cuaderno", "--index", "Uno\nDos\n\nTres"])
        .assert()
        .success()
        .stdout(predicate::str::contains("with 3 chapters"));

    fabrica(dir.path())
        .args(["book", "list", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"title\": \"Cuaderno\""))
        .stdout(predicate::str::contains("\"chapters\": 3"));
}

#[test]
fn test_create_book_requires_title() {
    let dir = TempDir::new().unwrap();
    fabrica(dir.path())
        .args(["book", "create", "--title", "  ", "--index", "Uno"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("title"));
}

#[test]
fn test_generate_without_api_key() {
    let dir = imported();
    fabrica(&data(&dir))
        .args(["generate", "2", "--artisans", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key"));
}

#[test]
fn test_generate_without_artisans() {
    let dir = imported();
    fabrica(&data(&dir))
        .env("GEMINI_API_KEY", "test-key")
        .args(["generate", "2", "--text", "Otro texto"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("artisan"));
}

#[test]
fn test_generate_asks_before_overwriting() {
    let dir = imported();
    fabrica(&data(&dir))
        .env("GEMINI_API_KEY", "test-key")
        .args(["generate", "2", "--group", "8"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tono Casual"))
        .stderr(predicate::str::contains("--yes"));
}

#[test]
fn test_library_filters() {
    let dir = imported();
    fabrica(&data(&dir))
        .args(["library", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Qué tal, mundo"))
        .stdout(predicate::str::contains("Traducción: Inglés"));

    fabrica(&data(&dir))
        .args(["library", "1", "--producer", "base"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hola mundo"))
        .stdout(predicate::str::contains("Qué tal").not())
        .stdout(predicate::str::contains("Inglés").not());
}

#[test]
fn test_read_and_annotate() {
    let dir = imported();
    fabrica(&data(&dir))
        .args(["annotate", "highlight", "2", "--start", "0", "--end", "4"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added highlight"));

    fabrica(&data(&dir))
        .args(["annotate", "note", "2", "--start", "2", "--end", "6", "--note", "x"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("overlaps"));

    fabrica(&data(&dir))
        .args(["read", "1", "--marks"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Capítulo 1 de 1"))
        .stdout(predicate::str::contains("[[Hola]] mundo"));
}

#[test]
fn test_import_missing_key_keeps_library() {
    let dir = imported();
    let bad = dir.path().join("bad.json");
    fs::write(&bad, r#"{"libros": []}"#).unwrap();

    fabrica(&data(&dir))
        .arg("import")
        .arg(&bad)
        .assert()
        .failure()
        .stderr(predicate::str::contains("artesanos"));

    fabrica(&data(&dir))
        .args(["book", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Mi Libro"));
}

#[test]
fn test_export_writes_file() {
    let dir = imported();
    let out = dir.path().join("export.json");
    fabrica(&data(&dir))
        .arg("export")
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(&out).unwrap()).unwrap();
    assert_eq!(json["libros"][0]["titulo"], "Mi Libro");
    assert_eq!(json["gruposArtesanos"][0]["nombre"], "Casual");
}

#[test]
fn test_archive_writes_zip() {
    let dir = imported();
    let out = dir.path().join("zips");
    fabrica(&data(&dir))
        .args(["archive", "2", "--output-dir"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("El_comienzo/01_Tono_Casual.txt"));

    let file = fs::File::open(out.join("Mi_Libro_El_comienzo.zip")).unwrap();
    let archive = zip::ZipArchive::new(file).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort();
    assert_eq!(
        names,
        vec!["El_comienzo/00_Texto_Base.txt", "El_comienzo/01_Tono_Casual.txt"]
    );
}

#[test]
fn test_generate_keeps_results_when_archive_fails() {
    let dir = imported();
    // Translations only, so there is no artisan text to package
    fabrica(&data(&dir))
        .env("GEMINI_API_KEY", "test-key")
        .env("FABRICA_GEMINI_BASE_URL", "http://127.0.0.1:9/v1beta")
        .env("FABRICA_GEMINI_TIMEOUT_SECS", "5")
        .args(["generate", "2", "--artisans", "multicultural", "--languages", "Francés", "--yes", "--archive"])
        .arg(dir.path().join("zips"))
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved to chapter 2"))
        .stderr(predicate::str::contains("archive not written"));

    fabrica(&data(&dir))
        .args(["library", "1", "--full"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Traducción: Francés"))
        .stdout(predicate::str::contains("**ERROR AL TRADUCIR:**"));
    assert!(!dir.path().join("zips").join("Mi_Libro_El_comienzo.zip").exists());
}

#[test]
fn test_remove_content_needs_confirmation() {
    let dir = imported();
    fabrica(&data(&dir))
        .args(["chapter", "remove-content", "2", "5"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Tono Casual"))
        .stderr(predicate::str::contains("--yes"));

    fabrica(&data(&dir))
        .args(["library", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Qué tal, mundo"));

    fabrica(&data(&dir))
        .args(["chapter", "remove-content", "2", "5", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Removed \"Tono Casual\" text from chapter 2"));

    fabrica(&data(&dir))
        .args(["library", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Hola mundo"))
        .stdout(predicate::str::contains("Qué tal").not());

    fabrica(&data(&dir))
        .args(["chapter", "remove-content", "2", "5", "--yes"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No content by 5"));
}

#[test]
fn test_removing_a_note_needs_confirmation() {
    let dir = imported();
    let output = fabrica(&data(&dir))
        .args(["annotate", "note", "2", "--start", "5", "--end", "10", "--note", "saludo"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    let id = stdout.trim().strip_prefix("Added note ").unwrap().to_string();

    fabrica(&data(&dir))
        .args(["annotate", "remove", "2", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("saludo"))
        .stderr(predicate::str::contains("--yes"));

    fabrica(&data(&dir))
        .args(["annotate", "list", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saludo"));

    fabrica(&data(&dir))
        .args(["annotate", "remove", "2", &id, "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mundo\""));

    fabrica(&data(&dir))
        .args(["annotate", "list", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("saludo").not());
}

#[test]
fn test_highlight_removal_needs_no_confirmation() {
    let dir = imported();
    let output = fabrica(&data(&dir))
        .args(["annotate", "highlight", "2", "--start", "0", "--end", "4"])
        .output()
        .unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();
    let id = stdout.trim().strip_prefix("Added highlight ").unwrap().to_string();

    fabrica(&data(&dir))
        .args(["annotate", "remove", "2", &id])
        .assert()
        .success();
}

#[test]
fn test_media_edit_keeps_tags() {
    let dir = imported();
    fabrica(&data(&dir))
        .args(["media", "add", "2", "pdf", "--name", "Apuntes", "--url", "https://a.example/x.pdf", "--tag", "clase"])
        .assert()
        .success();

    fabrica(&data(&dir))
        .args(["media", "edit", "2", "pdf", "1", "--url", "https://a.example/y.pdf"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Updated pdf #1"));

    fabrica(&data(&dir))
        .args(["media", "list", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Apuntes <https://a.example/y.pdf>"))
        .stdout(predicate::str::contains("tags: clase"));

    fabrica(&data(&dir))
        .args(["media", "edit", "2", "pdf", "4", "--name", "Otro"])
        .assert()
        .failure();
}
