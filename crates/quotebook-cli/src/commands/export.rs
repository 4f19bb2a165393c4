use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::commands::common::{resolve_export_target, Context};
use crate::error::CliError;

pub fn run_export(
    output_path: Option<PathBuf>,
    dir: Option<&Path>,
    ctx: &Context,
) -> Result<(), CliError> {
    let book = ctx.open_book()?;
    let rendered = book.export_json()?;

    if let Some(path) = resolve_export_target(output_path, dir, Utc::now()) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, rendered)?;
        println!("{}", path.display());
    } else {
        println!("{rendered}");
    }

    Ok(())
}
