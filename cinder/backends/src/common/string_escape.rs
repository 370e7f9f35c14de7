/// Escapes a string for minecraft:
/// Newlines are replaced with \n, \ with \\ and " with \"
pub fn escape_minecraft(string: &str) -> impl Iterator<Item = char> + '_ {
    string.chars().flat_map(|chr| match chr {
        '\n' => StringEscape::Str("\\n"),
        '\\' => StringEscape::Str("\\\\"),
        '"' => StringEscape::Str("\\\""),
        c => StringEscape::Char(c),
    })
}

/// Renders a string as a double quoted snbt string literal
pub fn quote_snbt(string: &str) -> String {
    let mut quoted = String::with_capacity(string.len() + 2);
    quoted.push('"');
    quoted.extend(escape_minecraft(string));
    quoted.push('"');
    quoted
}

/// This implements iterator to allow for the flat_map operation
enum StringEscape {
    Str(&'static str),
    Char(char),
    None,
}

impl Iterator for StringEscape {
    type Item = char;

    fn next(&mut self) -> Option<Self::Item> {
        match self {
            StringEscape::Str(str) => {
                let mut chars = str.chars();
                let char = chars.next();
                if char.is_some() {
                    *str = chars.as_str();
                } else {
                    *self = StringEscape::None;
                }
                char
            }
            StringEscape::Char(chr) => {
                let chr = *chr;
                *self = StringEscape::None;
                Some(chr)
            }
            StringEscape::None => None,
        }
    }
}
