use std::path::Path;

use crate::commands::common::Context;
use crate::error::CliError;

pub fn run_import(file: &Path, ctx: &Context) -> Result<(), CliError> {
    let payload = std::fs::read_to_string(file)?;

    let mut book = ctx.open_book()?;
    let summary = book.import_json(&payload)?;

    println!("Quotes imported successfully! ({} imported)", summary.imported);
    if summary.dropped > 0 {
        println!("Skipped {} entries without quote text.", summary.dropped);
    }
    Ok(())
}
