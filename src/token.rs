// Shell-line tokenizer: space-separated words with double-quoted tokens.
// `  arg1   "ar\"g\\2"` -> ["arg1", `ar"g\2`]
use crate::core::error::{Error, ErrorKind};

/// Splits a command line into tokens. Double quotes group spaces into one
/// token and admit exactly two escapes, `\"` and `\\`; any other escape or an
/// unterminated quote fails the whole line. An unquoted token ends at a space
/// or at an opening quote.
pub fn tokenize(line: &str) -> Result<Vec<String>, Error> {
    let mut tokens = Vec::new();
    let mut rest = line.as_bytes();
    loop {
        while let [b' ', tail @ ..] = rest {
            rest = tail;
        }
        if rest.is_empty() {
            return Ok(tokens);
        }
        if rest[0] == b'"' {
            let (token, tail) = quoted_token(&rest[1..])?;
            tokens.push(token);
            rest = tail;
        } else {
            let end = rest
                .iter()
                .position(|byte| *byte == b' ' || *byte == b'"')
                .unwrap_or(rest.len());
            tokens.push(String::from_utf8_lossy(&rest[..end]).into_owned());
            rest = &rest[end..];
            if let [b' ', tail @ ..] = rest {
                rest = tail;
            }
        }
    }
}

fn quoted_token(mut rest: &[u8]) -> Result<(String, &[u8]), Error> {
    let mut token = Vec::new();
    loop {
        match rest {
            [] => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("unterminated quote")
                    .with_hint("Close the double quote or remove it."));
            }
            [b'"', tail @ ..] => {
                return Ok((String::from_utf8_lossy(&token).into_owned(), tail));
            }
            [b'\\', escaped @ (b'"' | b'\\'), tail @ ..] => {
                token.push(*escaped);
                rest = tail;
            }
            [b'\\', ..] => {
                return Err(Error::new(ErrorKind::Usage)
                    .with_message("unknown escape in quoted token")
                    .with_hint(r#"Only `\"` and `\\` are recognized inside quotes."#));
            }
            [byte, tail @ ..] => {
                token.push(*byte);
                rest = tail;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::tokenize;
    use crate::core::error::ErrorKind;

    #[test]
    fn splits_on_runs_of_spaces() {
        let tokens = tokenize("  add  one two ").expect("tokenize");
        assert_eq!(tokens, vec!["add", "one", "two"]);
    }

    #[test]
    fn empty_line_has_no_tokens() {
        assert!(tokenize("").expect("tokenize").is_empty());
        assert!(tokenize("   ").expect("tokenize").is_empty());
    }

    #[test]
    fn quotes_group_spaces_and_unescape() {
        let tokens = tokenize(r#" arg1   "ar\"g\\2""#).expect("tokenize");
        assert_eq!(tokens, vec!["arg1".to_string(), r#"ar"g\2"#.to_string()]);
    }

    #[test]
    fn empty_quoted_token_is_kept() {
        let tokens = tokenize(r#"add "" x"#).expect("tokenize");
        assert_eq!(tokens, vec!["add", "", "x"]);
    }

    #[test]
    fn bare_token_ends_at_a_quote() {
        let tokens = tokenize(r#"ab"cd""#).expect("tokenize");
        assert_eq!(tokens, vec!["ab", "cd"]);
    }

    #[test]
    fn unterminated_quote_fails_the_line() {
        let err = tokenize(r#"add "oops"#).expect_err("unterminated");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }

    #[test]
    fn unknown_escape_fails_the_line() {
        let err = tokenize(r#"add "o\ops""#).expect_err("bad escape");
        assert_eq!(err.kind(), ErrorKind::Usage);
    }
}
