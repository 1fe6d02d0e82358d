//! Minimal CSV reading and writing for datasets.
//!
//! Fields holding a comma, a double quote or a line break are quoted and
//! inner quotes doubled. Quoted fields may span lines.

/// Quote `field` when it needs it
pub fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

pub fn format_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

/// One parsed row with the 1-based line it starts on
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub line: usize,
    pub fields: Vec<String>,
}

/// Split `text` into rows. Blank lines are skipped. An unterminated quote
/// runs to the end of the input.
pub fn parse_rows(text: &str) -> Vec<Row> {
    let mut rows = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut line = 1;
    let mut row_start = 1;
    let mut row_has_content = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    chars.next();
                    field.push('"');
                }
                '"' => in_quotes = false,
                '\n' => {
                    line += 1;
                    field.push(c);
                }
                _ => field.push(c),
            }
            continue;
        }

        match c {
            '"' => {
                in_quotes = true;
                row_has_content = true;
            }
            ',' => {
                fields.push(std::mem::take(&mut field));
                row_has_content = true;
            }
            '\r' => {}
            '\n' => {
                if row_has_content || !field.is_empty() {
                    fields.push(std::mem::take(&mut field));
                    rows.push(Row {
                        line: row_start,
                        fields: std::mem::take(&mut fields),
                    });
                }
                row_has_content = false;
                line += 1;
                row_start = line;
            }
            _ => {
                field.push(c);
                row_has_content = true;
            }
        }
    }
    if row_has_content || !field.is_empty() {
        fields.push(field);
        rows.push(Row {
            line: row_start,
            fields,
        });
    }
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_escape_field() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a,b"), "\"a,b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_parse_quoted_and_multiline() {
        let text = "a,b,c\n\"x,1\",\"he said \"\"no\"\"\",\n\n\"two\nlines\",2,3\r\n";
        let rows = parse_rows(text);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].fields, vec!["a", "b", "c"]);
        assert_eq!(rows[1].fields, vec!["x,1", "he said \"no\"", ""]);
        assert_eq!(rows[1].line, 2);
        assert_eq!(rows[2].fields, vec!["two\nlines", "2", "3"]);
        assert_eq!(rows[2].line, 4);
    }

    #[test]
    fn test_format_then_parse_keeps_fields() {
        let fields = ["dir/a,b.py", "", "1.5", "q\"uote"];
        let rows = parse_rows(&format_row(&fields));
        assert_eq!(rows[0].fields, fields.to_vec());
    }
}
