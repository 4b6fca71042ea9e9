use std::path::PathBuf;

use smol_str::SmolStr;
use tracing::trace;

use crate::array::How;
use crate::constants::{
    is_array_directive, is_block_begin, is_block_end, BINARY, CONSTANT, FACTOR, INTERNAL, IPRN,
    LAYERED, OPEN_CLOSE,
};
use crate::decode::reader::LineReader;
use crate::decode::scan::{scan_line, LineKind};
use crate::decode::tree::ArrayNode;
use crate::num::number::{is_integer_literal, looks_numeric, parse_double, parse_integer};
use crate::param::FileInout;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub enum Token<'a> {
    Begin,
    End,
    Directive(How),
    Layered,
    InOut(FileInout),
    Integer(i64),
    Double(f64),
    Word(&'a str),
}

/// Classify a single token. Tokens that look numeric but fail to parse are
/// returned as words; numeric contexts reject them via [`expect_double`].
pub fn classify(token: &str) -> Token<'_> {
    if is_block_begin(token) {
        return Token::Begin;
    }
    if is_block_end(token) {
        return Token::End;
    }
    if let Some(how) = directive(token) {
        return Token::Directive(how);
    }
    if token.eq_ignore_ascii_case(LAYERED) {
        return Token::Layered;
    }
    if let Some(inout) = FileInout::from_token(token) {
        return Token::InOut(inout);
    }
    if is_integer_literal(token) {
        if let Some(value) = parse_integer(token) {
            return Token::Integer(value);
        }
    }
    if let Some(value) = parse_double(token) {
        return Token::Double(value);
    }
    Token::Word(token)
}

pub fn directive(token: &str) -> Option<How> {
    if token.eq_ignore_ascii_case(CONSTANT) {
        Some(How::Constant)
    } else if token.eq_ignore_ascii_case(INTERNAL) {
        Some(How::Internal)
    } else if token.eq_ignore_ascii_case(OPEN_CLOSE) {
        Some(How::External)
    } else {
        None
    }
}

pub fn expect_double(token: &str, what: &str) -> Result<f64> {
    parse_double(token)
        .ok_or_else(|| Error::parse(format!("malformed number `{token}` for {what}")))
}

pub fn expect_integer(token: &str, what: &str) -> Result<i64> {
    parse_integer(token)
        .ok_or_else(|| Error::parse(format!("malformed integer `{token}` for {what}")))
}

fn is_binary_flag(token: &str) -> bool {
    let inner = token
        .strip_prefix('(')
        .and_then(|rest| rest.strip_suffix(')'))
        .unwrap_or(token);
    inner.eq_ignore_ascii_case(BINARY)
}

/// Recognize an array control line:
/// `CONSTANT <n>`, `INTERNAL [FACTOR <n>] [IPRN <i>] [values..]`, or
/// `OPEN/CLOSE <path> [FACTOR <n>] [BINARY] [IPRN <i>]`.
pub fn scan_control_line(tokens: &[&str]) -> Result<ArrayNode> {
    let (head, rest) = tokens
        .split_first()
        .ok_or_else(|| Error::format("empty array control line"))?;
    let how = directive(head).ok_or_else(|| Error::unknown_directive(head))?;

    let mut idx = 0;
    let mut node = match how {
        How::Constant => {
            let token = rest
                .first()
                .ok_or_else(|| Error::arity(2, "CONSTANT control line", tokens.len()))?;
            idx += 1;
            ArrayNode::constant(expect_double(token, "CONSTANT value")?)
        }
        How::Internal => ArrayNode::internal(Vec::new()),
        How::External => {
            let token = rest
                .first()
                .ok_or_else(|| Error::arity(2, "OPEN/CLOSE control line", tokens.len()))?;
            idx += 1;
            ArrayNode::external(PathBuf::from(token))
        }
    };

    while idx < rest.len() {
        let token = rest[idx];
        if token.eq_ignore_ascii_case(FACTOR) {
            let value = rest
                .get(idx + 1)
                .ok_or_else(|| Error::format("FACTOR requires a value"))?;
            node.factor = Some(expect_double(value, "FACTOR")?);
            idx += 2;
        } else if token.eq_ignore_ascii_case(IPRN) {
            let value = rest
                .get(idx + 1)
                .ok_or_else(|| Error::format("IPRN requires a value"))?;
            let iprn = expect_integer(value, "IPRN")?;
            node.iprn = Some(
                i32::try_from(iprn).map_err(|_| Error::parse(format!("IPRN {iprn} out of range")))?,
            );
            idx += 2;
        } else if how == How::External && is_binary_flag(token) {
            node.binary = true;
            idx += 1;
        } else if how == How::Internal && looks_numeric(token) {
            node.values.push(expect_double(token, "array value")?);
            idx += 1;
        } else {
            return Err(Error::format(format!(
                "unexpected token `{token}` on {} control line",
                how.as_str()
            )));
        }
    }
    trace!(how = how.as_str(), factor = ?node.factor, iprn = ?node.iprn, "control line");
    Ok(node)
}

/// Split a `BEGIN`/`END` line into its lower-cased block name and optional
/// non-negative index.
pub fn scan_block_header(tokens: &[&str]) -> Result<(SmolStr, Option<usize>)> {
    let name = tokens
        .get(1)
        .ok_or_else(|| Error::format("block header is missing a name"))?;
    if tokens.len() > 3 {
        return Err(Error::arity(3, "block header", tokens.len()));
    }
    let index = match tokens.get(2) {
        Some(token) => {
            let value = expect_integer(token, "block index")?;
            Some(
                usize::try_from(value)
                    .map_err(|_| Error::parse(format!("block index {value} is negative")))?,
            )
        }
        None => None,
    };
    Ok((SmolStr::new(name.to_ascii_lowercase()), index))
}

/// Check that `tokens` is an `END` line closing `name`. The index on `END`
/// is optional but must match when given.
pub fn check_block_end(tokens: &[&str], name: &str, index: Option<usize>) -> Result<()> {
    if tokens.first().map_or(true, |head| !is_block_end(head)) {
        return Err(Error::format(format!(
            "expected END {}",
            name.to_ascii_uppercase()
        )));
    }
    let (end_name, end_index) = scan_block_header(tokens)?;
    if end_name != name {
        return Err(Error::format(format!(
            "END {end_name} does not close block `{name}`"
        )));
    }
    if end_index.is_some() && end_index != index {
        return Err(Error::format(format!(
            "END index {end_index:?} does not match block index {index:?}"
        )));
    }
    Ok(())
}

/// Read the data lines that follow an `INTERNAL` control line. Stops,
/// without consuming, at a blank line, a directive, a block terminator, or
/// any line whose first token is not numeric.
pub fn scan_array_data<R>(reader: &mut LineReader<R>, values: &mut Vec<f64>) -> Result<()>
where
    R: std::io::BufRead + std::io::Seek,
{
    loop {
        let mark = reader.tell();
        let Some(raw) = reader.read_line()? else {
            return Ok(());
        };
        let line = scan_line(&raw);
        match line.kind {
            LineKind::Blank => {
                reader.seek(mark)?;
                return Ok(());
            }
            LineKind::Comment => continue,
            LineKind::Content => {}
        }
        let tokens = line.tokens();
        let head = tokens[0];
        if is_block_end(head) || is_array_directive(head) || !looks_numeric(head) {
            reader.seek(mark)?;
            return Ok(());
        }
        for token in tokens.iter() {
            let value = expect_double(token, "array value")
                .map_err(|err| err.at_line(reader.line_number()))?;
            values.push(value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[rstest::rstest]
    fn test_classify_tokens() {
        assert_eq!(classify("begin"), Token::Begin);
        assert_eq!(classify("END"), Token::End);
        assert_eq!(classify("Constant"), Token::Directive(How::Constant));
        assert_eq!(classify("OPEN/CLOSE"), Token::Directive(How::External));
        assert_eq!(classify("layered"), Token::Layered);
        assert_eq!(classify("FILEOUT"), Token::InOut(FileInout::FileOut));
        assert_eq!(classify("42"), Token::Integer(42));
        assert_eq!(classify("4.5"), Token::Double(4.5));
        assert_eq!(classify("1e3"), Token::Double(1000.0));
        assert_eq!(classify("hello"), Token::Word("hello"));
        assert_eq!(classify("1.2.3"), Token::Word("1.2.3"));
    }

    #[rstest::rstest]
    fn test_scan_constant_control_line() {
        let node = scan_control_line(&["CONSTANT", "10.0"]).unwrap();
        assert_eq!(node.how, How::Constant);
        assert_eq!(node.constant, Some(10.0));
        assert_eq!(node.factor, None);
    }

    #[rstest::rstest]
    fn test_scan_internal_control_line_with_values() {
        let node =
            scan_control_line(&["internal", "FACTOR", "2.0", "IPRN", "1", "1.0", "2.0"]).unwrap();
        assert_eq!(node.how, How::Internal);
        assert_eq!(node.factor, Some(2.0));
        assert_eq!(node.iprn, Some(1));
        assert_eq!(node.values, vec![1.0, 2.0]);
    }

    #[rstest::rstest]
    fn test_scan_external_control_line() {
        let node =
            scan_control_line(&["OPEN/CLOSE", "top.txt", "FACTOR", "1.5", "(BINARY)"]).unwrap();
        assert_eq!(node.how, How::External);
        assert_eq!(node.path.as_deref(), Some(std::path::Path::new("top.txt")));
        assert!(node.binary);
    }

    #[rstest::rstest]
    fn test_scan_control_line_errors() {
        let err = scan_control_line(&["REPLICATE", "1"]).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::UnknownDirective);
        let err = scan_control_line(&["CONSTANT", "1.x"]).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Parse);
        let err = scan_control_line(&["CONSTANT"]).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Format);
    }

    #[rstest::rstest]
    fn test_scan_array_data_stops_at_next_key() {
        let mut reader = LineReader::from_text("1 2 3\n# note\n4, 5\nNEXT\n");
        let mut values = Vec::new();
        scan_array_data(&mut reader, &mut values).unwrap();
        assert_eq!(values, vec![1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(reader.read_line().unwrap().as_deref(), Some("NEXT"));
    }

    #[rstest::rstest]
    fn test_scan_array_data_rejects_malformed_number() {
        let mut reader = LineReader::from_text("1 2.0.0\n");
        let mut values = Vec::new();
        let err = scan_array_data(&mut reader, &mut values).unwrap_err();
        assert_eq!(err.kind, crate::ErrorKind::Parse);
        assert_eq!(err.location.map(|l| l.line), Some(1));
    }
}
