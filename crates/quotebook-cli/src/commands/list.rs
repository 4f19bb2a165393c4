use quotebook_core::categories::CategoryFilter;
use quotebook_core::services::QuotePick;

use crate::commands::common::{format_quote_lines, quote_to_list_item, Context, QuoteListItem};
use crate::error::CliError;

pub fn run_list(category: Option<&str>, as_json: bool, ctx: &Context) -> Result<(), CliError> {
    let book = ctx.open_book()?;
    let filter = category.map_or_else(CategoryFilter::default, CategoryFilter::parse);
    let quotes = book.quotes_in(&filter);

    if as_json {
        let json_items = quotes
            .iter()
            .map(|quote| quote_to_list_item(quote))
            .collect::<Vec<QuoteListItem>>();
        println!("{}", serde_json::to_string_pretty(&json_items)?);
        return Ok(());
    }

    if quotes.is_empty() {
        println!("{}", QuotePick::empty_message(&filter));
        return Ok(());
    }

    for line in format_quote_lines(&quotes) {
        println!("{line}");
    }
    Ok(())
}

pub fn run_categories(ctx: &Context) -> Result<(), CliError> {
    let book = ctx.open_book()?;
    let selected = book.selected_filter();

    for line in format_category_lines(book.categories(), selected) {
        println!("{line}");
    }
    Ok(())
}

/// One line per choice, `all` first, with the remembered filter marked.
pub fn format_category_lines(categories: &[String], selected: &CategoryFilter) -> Vec<String> {
    std::iter::once(CategoryFilter::All)
        .chain(categories.iter().cloned().map(CategoryFilter::Category))
        .map(|choice| {
            let marker = if &choice == selected { '*' } else { ' ' };
            format!("{marker} {choice}")
        })
        .collect()
}

pub fn run_filter(name: Option<&str>, ctx: &Context) -> Result<(), CliError> {
    let mut book = ctx.open_book()?;

    let Some(name) = name else {
        println!("{}", book.selected_filter());
        return Ok(());
    };

    let filter = CategoryFilter::parse(name);
    book.select_filter(filter.clone())?;
    println!("Filter set to {filter}");
    if book.quotes_in(&filter).is_empty() {
        println!("{}", QuotePick::empty_message(&filter));
    }
    Ok(())
}
