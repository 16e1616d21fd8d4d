// Writes the OpenAPI document to stdout, or to the path given as the first argument:
//   cargo run --bin openapi-export -- openapi.json

use anyhow::{Context, Result};
use utoipa::OpenApi;

use beneficiary_registry::api::openapi::ApiDoc;

fn main() -> Result<()> {
    let json = ApiDoc::openapi()
        .to_pretty_json()
        .context("Failed to serialize OpenAPI document")?;

    match std::env::args().nth(1) {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("Failed to write {}", path))?;
            eprintln!("OpenAPI document written to {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
