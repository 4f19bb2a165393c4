//! Quotes seeded into an empty store.

use crate::models::Quote;

const DEFAULT_QUOTES: [(&str, &str); 10] = [
    (
        "The only limit to our realization of tomorrow is our doubts of today.",
        "Franklin D. Roosevelt",
    ),
    (
        "The future belongs to those who believe in the beauty of their dreams.",
        "Eleanor Roosevelt",
    ),
    (
        "In the end, we will remember not the words of our enemies, but the silence of our friends.",
        "Martin Luther King Jr.",
    ),
    ("The best way to predict the future is to invent it.", "Alan Kay"),
    (
        "Life is 10% what happens to us and 90% how we react to it.",
        "Charles R. Swindoll",
    ),
    ("The only way to do great work is to love what you do.", "Steve Jobs"),
    (
        "Success is not final, failure is not fatal: It is the courage to continue that counts.",
        "Winston S. Churchill",
    ),
    ("You miss 100% of the shots you don’t take.", "Wayne Gretzky"),
    ("The purpose of our lives is to be happy.", "Dalai Lama"),
    ("Get busy living or get busy dying.", "Stephen King"),
];

/// Built-in quotes used when no snapshot is stored or it cannot be read.
pub fn default_quotes() -> Vec<Quote> {
    DEFAULT_QUOTES
        .iter()
        .map(|(text, author)| Quote::new(*text).with_author(*author))
        .collect()
}
