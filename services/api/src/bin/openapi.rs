//! services/api/src/bin/openapi.rs
//!
//! Writes the OpenAPI document for the music school API to `openapi.json`.

use api_lib::web::ApiDoc;
use utoipa::OpenApi;

fn write_document(
    api_doc: utoipa::openapi::OpenApi,
    path: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let document_json = api_doc.to_pretty_json()?;
    std::fs::write(path, document_json)?;
    println!("OpenAPI document written to {}", path);
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    write_document(ApiDoc::openapi(), "openapi.json")
}
