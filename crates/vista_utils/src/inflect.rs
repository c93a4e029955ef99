//! English inflections for type keys.
//!
//! Root keys and linked-resource keys are derived from Rust type names,
//! e.g. `my_app::models::BlogPost` becomes `blog_post` and then `blog_posts`.
//!
//! The rules only cover what identifiers usually need. They operate on the
//! last `_` separated word, so compound snake_case names inflect correctly.
//!
//! # Examples
//!
//! ```
//! use vista_utils::inflect::{demodulize, pluralize, underscore};
//!
//! let name = underscore(demodulize("my_app::models::BlogPost"));
//! assert_eq!(name, "blog_post");
//! assert_eq!(pluralize(&name), "blog_posts");
//! assert_eq!(pluralize("category"), "categories");
//! assert_eq!(pluralize("person"), "people");
//! ```

use alloc::string::String;

use heck::ToSnakeCase;

// -----------------------------------------------------------------------------
// Tables

/// `(singular, plural)` pairs that no suffix rule produces.
const IRREGULAR: &[(&str, &str)] = &[
    ("person", "people"),
    ("man", "men"),
    ("woman", "women"),
    ("child", "children"),
    ("mouse", "mice"),
    ("tooth", "teeth"),
    ("foot", "feet"),
    ("goose", "geese"),
    ("ox", "oxen"),
    ("move", "moves"),
    ("zombie", "zombies"),
    ("quiz", "quizzes"),
];

const UNCOUNTABLE: &[&str] = &[
    "equipment",
    "information",
    "rice",
    "money",
    "species",
    "series",
    "fish",
    "sheep",
    "jeans",
    "police",
    "news",
    "metadata",
];

const ES_ENDINGS: &[&str] = &["ss", "us", "x", "z", "ch", "sh"];

const O_ES_WORDS: &[&str] = &["buffalo", "tomato", "potato", "hero", "echo", "veto"];

// -----------------------------------------------------------------------------
// Inflections

/// Strips the module path and generic arguments from a type path.
///
/// ```
/// use vista_utils::inflect::demodulize;
///
/// assert_eq!(demodulize("alloc::vec::Vec<u8>"), "Vec");
/// assert_eq!(demodulize("Post"), "Post");
/// ```
pub fn demodulize(path: &str) -> &str {
    let path = match path.find('<') {
        Some(index) => &path[..index],
        None => path,
    };
    match path.rfind("::") {
        Some(index) => &path[index + 2..],
        None => path,
    }
}

/// Converts a `CamelCase` identifier into `snake_case`.
///
/// Acronyms stay together: `HTTPRequest` becomes `http_request`.
#[inline]
pub fn underscore(word: &str) -> String {
    word.to_snake_case()
}

/// Returns the plural form of a lowercase word.
///
/// Words that already look plural are returned unchanged, so pluralizing
/// twice is harmless.
pub fn pluralize(word: &str) -> String {
    let (head, last) = match word.rfind('_') {
        Some(index) => word.split_at(index + 1),
        None => ("", word),
    };

    let mut out = String::with_capacity(word.len() + 3);
    out.push_str(head);
    out.push_str(&pluralize_word(last));
    out
}

fn pluralize_word(word: &str) -> String {
    if word.is_empty() || UNCOUNTABLE.contains(&word) {
        return String::from(word);
    }

    for &(singular, plural) in IRREGULAR {
        if word == plural {
            return String::from(word);
        }
        if word == singular {
            return String::from(plural);
        }
    }

    let mut out = String::from(word);

    if let Some(stem) = word.strip_suffix("sis") {
        out.truncate(stem.len());
        out.push_str("ses");
    } else if ES_ENDINGS.iter().any(|end| word.ends_with(end)) {
        out.push_str("es");
    } else if word.ends_with('s') {
        // already plural
    } else if let Some(stem) = word.strip_suffix('y')
        && !stem.ends_with(is_vowel)
        && !stem.is_empty()
    {
        out.truncate(stem.len());
        out.push_str("ies");
    } else if let Some(stem) = word.strip_suffix("fe") {
        out.truncate(stem.len());
        out.push_str("ves");
    } else if let Some(stem) = word.strip_suffix("lf") {
        out.truncate(stem.len());
        out.push_str("lves");
    } else if O_ES_WORDS.contains(&word) {
        out.push_str("es");
    } else {
        out.push('s');
    }

    out
}

#[inline]
fn is_vowel(ch: char) -> bool {
    matches!(ch, 'a' | 'e' | 'i' | 'o' | 'u')
}

// -----------------------------------------------------------------------------
// Tests
