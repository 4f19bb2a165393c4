use crate::commands::common::{resolve_quote_text, Context};
use crate::error::CliError;

pub async fn run_add(
    text_parts: &[String],
    author: Option<&str>,
    category: Option<&str>,
    ctx: &Context,
) -> Result<(), CliError> {
    let text = resolve_quote_text(text_parts)?;

    let mut book = ctx.open_book()?;
    let quote = book.add_quote(&text, author, category)?;

    if let Some(id) = &quote.id {
        println!("{id}");
    }

    // The local add already succeeded; a failed push is only logged.
    if let Some(engine) = ctx.sync_engine()? {
        engine.push_local(&quote).await;
    }

    Ok(())
}
