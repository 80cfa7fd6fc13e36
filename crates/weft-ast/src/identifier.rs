//! Identifier-name helpers.

const RESERVED_WORDS: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "enum", "export", "extends", "false", "finally", "for", "function", "if", "import",
    "in", "instanceof", "new", "null", "return", "super", "switch", "this", "throw", "true", "try",
    "typeof", "var", "void", "while", "with", "yield", "await", "implements", "interface", "let",
    "package", "private", "protected", "public", "static", "arguments", "eval",
];

pub fn is_reserved_word(name: &str) -> bool {
    RESERVED_WORDS.contains(&name)
}

fn is_id_start(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphabetic()
}

fn is_id_continue(c: char) -> bool {
    c == '$' || c == '_' || c.is_alphanumeric()
}

/// A non-reserved ECMAScript identifier name.
pub fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    is_id_start(first) && chars.all(is_id_continue) && !is_reserved_word(name)
}

/// Turn arbitrary text into a usable identifier: invalid characters become
/// word breaks, words are camel-cased, and a leading `_` is added when the
/// result would still be invalid.
pub fn to_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper_next = false;
    for c in name.chars() {
        if is_id_continue(c) {
            if out.is_empty() && c.is_ascii_digit() {
                continue;
            }
            if upper_next && !out.is_empty() {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            upper_next = false;
        } else {
            upper_next = true;
        }
    }
    if !is_valid_identifier(&out) {
        out.insert(0, '_');
    }
    if out.is_empty() { "_".to_string() } else { out }
}

/// JSX tag names starting with a lowercase letter refer to host elements,
/// not bindings.
pub fn is_compat_tag(tag: &str) -> bool {
    tag.chars().next().is_some_and(|c| c.is_ascii_lowercase()) || tag.contains('-')
}
