use std::io::{BufRead, Seek};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use smol_str::SmolStr;

use super::{ParamKind, ParamSpec, Scalar};
use crate::decode::reader::LineReader;
use crate::decode::scan::scan_line;
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: SmolStr,
    pub tagged: bool,
    pub value: Scalar,
}

/// A fixed sequence of scalars read from one line, led by the record name.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub name: SmolStr,
    pub fields: Vec<Field>,
}

impl Record {
    pub fn load<R>(reader: &mut LineReader<R>, spec: &ParamSpec) -> Result<Record>
    where
        R: BufRead + Seek,
    {
        let raw = reader
            .read_content_line()?
            .ok_or_else(|| Error::unexpected_eof(&format!("record `{}`", spec.name)))?;
        let tokens = scan_line(&raw).tokens();
        Record::parse_tokens(&tokens, spec).map_err(|err| err.at_line(reader.line_number()))
    }

    /// Decode a whole line: the record's name followed by each member's
    /// tokens. Trailing optional members may be omitted.
    pub fn parse_tokens(tokens: &[&str], spec: &ParamSpec) -> Result<Record> {
        let ParamKind::Record(members) = &spec.kind else {
            return Err(Error::format(format!("`{}` is not a record", spec.name)));
        };
        let (head, mut rest) = tokens
            .split_first()
            .ok_or_else(|| Error::format(format!("empty line for record `{}`", spec.name)))?;
        if !head.eq_ignore_ascii_case(&spec.name) {
            return Err(Error::format(format!(
                "expected record `{}`, found `{head}`",
                spec.name.to_ascii_uppercase()
            )));
        }
        if rest.is_empty() {
            return Err(Error::format(format!(
                "record `{}` has no fields",
                spec.name.to_ascii_uppercase()
            )));
        }

        let mut fields = Vec::with_capacity(members.len());
        for member in members {
            let kind = member.kind.scalar_kind().ok_or_else(|| {
                Error::format(format!("record member `{}` is not a scalar", member.name))
            })?;
            if rest.is_empty() && member.optional {
                break;
            }
            let width = kind.width(member.tagged).min(rest.len());
            let (own, tail) = rest.split_at(width);
            let value = Scalar::parse_tokens(own, kind, &member.name, member.tagged)?;
            fields.push(Field {
                name: member.name.clone(),
                tagged: member.tagged,
                value,
            });
            rest = tail;
        }
        if !rest.is_empty() {
            return Err(Error::format(format!(
                "{} unexpected token(s) after record `{}`",
                rest.len(),
                spec.name.to_ascii_uppercase()
            )));
        }
        Ok(Record {
            name: spec.name.clone(),
            fields,
        })
    }

    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.fields
            .iter()
            .find(|field| field.name.eq_ignore_ascii_case(name))
            .map(|field| &field.value)
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for field in &self.fields {
            map.serialize_entry(field.name.as_str(), &field.value)?;
        }
        map.end()
    }
}
