use quotebook_core::categories::CategoryFilter;
use quotebook_core::services::QuotePick;

use crate::commands::common::Context;
use crate::error::CliError;

pub fn run_random(category: Option<&str>, ctx: &Context) -> Result<(), CliError> {
    let book = ctx.open_book()?;
    let pick = match category {
        Some(name) => book.random_quote(&CategoryFilter::parse(name)),
        None => book.show_random_quote(),
    };

    match pick {
        QuotePick::Found(quote) => {
            println!("{quote}");
            if let Some(category) = quote.category_name() {
                println!("Category: {category}");
            }
        }
        QuotePick::NoQuotesFound(filter) => println!("{}", QuotePick::empty_message(&filter)),
    }

    Ok(())
}
