use std::io::{BufRead, Seek};

use indexmap::IndexMap;
use serde::Serialize;
use smol_str::SmolStr;
use tracing::trace;

use super::{ParamKind, ParamSpec, Record, Scalar, Value};
use crate::constants::is_block_end;
use crate::decode::reader::LineReader;
use crate::decode::scan::{scan_line, LineKind};
use crate::{Error, Result};

/// The alternatives of a tagged union that were present, keyed by the
/// alternative's name in the order they appeared.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(transparent)]
pub struct Keystring {
    pub entries: IndexMap<SmolStr, Value>,
}

impl Keystring {
    /// Read alternatives one per line until a blank line or the block's
    /// `END`. Each alternative may appear at most once.
    pub fn load<R>(reader: &mut LineReader<R>, spec: &ParamSpec) -> Result<Keystring>
    where
        R: BufRead + Seek,
    {
        let ParamKind::Keystring(members) = &spec.kind else {
            return Err(Error::format(format!("`{}` is not a keystring", spec.name)));
        };
        let mut keystring = Keystring::default();
        loop {
            let mark = reader.tell();
            let Some(raw) = reader.read_line()? else {
                return Err(Error::unexpected_eof(&format!("keystring `{}`", spec.name)));
            };
            let line = scan_line(&raw);
            match line.kind {
                LineKind::Blank => break,
                LineKind::Comment => continue,
                LineKind::Content => {}
            }
            let tokens = line.tokens();
            let head = tokens[0];
            if is_block_end(head) {
                reader.seek(mark)?;
                break;
            }
            let line_number = reader.line_number();
            let member = members
                .iter()
                .find(|member| member.is_named(head))
                .ok_or_else(|| {
                    Error::unrecognized_parameter(&spec.block, head).at_line(line_number)
                })?;
            if keystring.entries.contains_key(&member.name) {
                return Err(Error::cardinality(format!(
                    "`{}` given more than once in keystring `{}`",
                    member.name.to_ascii_uppercase(),
                    spec.name
                ))
                .at_line(line_number));
            }
            let value = parse_member(&tokens, member).map_err(|err| err.at_line(line_number))?;
            trace!(keystring = %spec.name, member = %member.name, "keystring member");
            keystring.entries.insert(member.name.clone(), value);
        }
        Ok(keystring)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name.to_ascii_lowercase().as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_member(tokens: &[&str], member: &ParamSpec) -> Result<Value> {
    if let ParamKind::Record(_) = member.kind {
        return Record::parse_tokens(tokens, member).map(Value::Record);
    }
    let kind = member.kind.scalar_kind().ok_or_else(|| {
        Error::format(format!("keystring member `{}` must be a scalar or record", member.name))
    })?;
    Scalar::parse_tokens(tokens, kind, &member.name, true).map(Value::Scalar)
}
