//! Stylesheet scanner: rules and raw declarations.
//!
//! Values are kept as source text; property grammars tokenize them later.

use crate::ParseError;

/// A parsed stylesheet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StylesheetAst {
    pub rules: Vec<RuleAst>,
}

/// A style rule.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleAst {
    /// Selector text, trimmed.
    pub selector: String,
    /// Declarations in source order.
    pub declarations: Vec<DeclarationAst>,
}

/// A `property: value` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct DeclarationAst {
    /// Lowercased property name.
    pub property: String,
    /// Value text with `!important` removed.
    pub value: String,
    pub important: bool,
}

/// Parse a stylesheet into rules.
pub fn parse_stylesheet(css: &str) -> Result<StylesheetAst, ParseError> {
    let source = strip_comments(css);
    let mut rules = Vec::new();
    let mut rest = source.as_str();
    let mut offset = 0;

    loop {
        let trimmed = rest.trim_start();
        offset += rest.len() - trimmed.len();
        rest = trimmed;
        if rest.is_empty() {
            break;
        }

        let open = rest.find('{').ok_or(ParseError::UnexpectedEof(offset + rest.len()))?;
        let selector = rest[..open].trim();
        if selector.contains('}') {
            let bad = rest.find('}').unwrap_or(0);
            return Err(ParseError::UnexpectedChar {
                ch: '}',
                offset: offset + bad,
            });
        }

        let body_start = open + 1;
        let close = find_block_end(&rest[body_start..])
            .ok_or(ParseError::UnexpectedEof(offset + rest.len()))?;
        let body = &rest[body_start..body_start + close];

        rules.push(RuleAst {
            selector: selector.to_string(),
            declarations: parse_declarations(body),
        });

        let consumed = body_start + close + 1;
        offset += consumed;
        rest = &rest[consumed..];
    }

    Ok(StylesheetAst { rules })
}

/// Parse the inside of a declaration block (also used for inline styles).
pub fn parse_declarations(block: &str) -> Vec<DeclarationAst> {
    split_top_level(block, ';')
        .into_iter()
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim().to_ascii_lowercase();
            if property.is_empty() {
                return None;
            }
            let mut value = value.trim();
            let mut important = false;
            if let Some(bang) = value.rfind('!') {
                if value[bang + 1..].trim().eq_ignore_ascii_case("important") {
                    important = true;
                    value = value[..bang].trim_end();
                }
            }
            Some(DeclarationAst {
                property,
                value: value.to_string(),
                important,
            })
        })
        .collect()
}

fn strip_comments(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut rest = css;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        match rest[start + 2..].find("*/") {
            Some(end) => rest = &rest[start + 2 + end + 2..],
            None => {
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Offset of the `}` closing the block that starts at `body[0]`.
fn find_block_end(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in body.char_indices() {
        match c {
            '{' => depth += 1,
            '}' if depth == 0 => return Some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn split_top_level(input: &str, separator: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0;
    for (i, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth -= 1,
            c if c == separator && depth == 0 => {
                parts.push(&input[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    if !input[start..].trim().is_empty() {
        parts.push(&input[start..]);
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rules() {
        let css = r#"
            .grid { display: grid; grid-template-columns: repeat(3, 100px); }
            /* items */
            .item-2 { grid-column: span 2 !important }
        "#;
        let sheet = parse_stylesheet(css).unwrap();
        assert_eq!(sheet.rules.len(), 2);
        assert_eq!(sheet.rules[0].selector, ".grid");
        assert_eq!(sheet.rules[0].declarations.len(), 2);
        assert_eq!(sheet.rules[0].declarations[1].value, "repeat(3, 100px)");

        let decl = &sheet.rules[1].declarations[0];
        assert_eq!(decl.property, "grid-column");
        assert_eq!(decl.value, "span 2");
        assert!(decl.important);
    }

    #[test]
    fn test_unterminated_block() {
        let err = parse_stylesheet(".grid { display: grid;").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEof(_)));
    }

    #[test]
    fn test_declarations_ignore_garbage() {
        let decls = parse_declarations("display: grid; nonsense; ; gap: 4px");
        assert_eq!(decls.len(), 2);
        assert_eq!(decls[1].property, "gap");
    }
}
