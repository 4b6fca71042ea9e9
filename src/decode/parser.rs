use std::io::{BufRead, Seek};
use std::path::PathBuf;

use smol_str::SmolStr;
use tracing::{debug, trace};

use crate::constants::{is_array_directive, is_block_begin, is_block_end};
use crate::decode::reader::LineReader;
use crate::decode::scan::{scan_line, LineKind, Tokens};
use crate::decode::scanner::{
    check_block_end, classify, scan_array_data, scan_block_header, scan_control_line, Token,
};
use crate::decode::tree::{
    ArrayNode, AtomNode, BlockNode, BodyNode, ComponentNode, ParamNode, RowNode, ValueNode,
};
use crate::array::How;
use crate::options::{BodyKind, ParseOptions};
use crate::{Error, Result};

/// Recognize the block structure of one document. Parameter names are not
/// validated here; only block names are, through [`ParseOptions`].
///
/// Without a parameter table a bare key is a keyword unless the next line
/// starts with `CONSTANT`, `INTERNAL` or `OPEN/CLOSE`. A key followed by an
/// unknown directive such as `REPLICATE 10.0` therefore reads as two
/// parameters. Use [`crate::Loader`] to reject unknown directives.
pub fn parse_component<R: BufRead + Seek>(
    reader: &mut LineReader<R>,
    options: &ParseOptions,
) -> Result<ComponentNode> {
    let mut parser = Parser { reader, options };
    parser.component()
}

struct Parser<'r, 'o, R> {
    reader: &'r mut LineReader<R>,
    options: &'o ParseOptions,
}

impl<R: BufRead + Seek> Parser<'_, '_, R> {
    fn component(&mut self) -> Result<ComponentNode> {
        let mut component = ComponentNode::default();
        while let Some(raw) = self.reader.read_line()? {
            let line = scan_line(&raw);
            if !line.is_content() {
                continue;
            }
            let tokens = line.tokens();
            if !is_block_begin(tokens[0]) {
                return Err(self.error(Error::format(format!(
                    "expected BEGIN, found `{}`",
                    line.content
                ))));
            }
            let block = self.block(&tokens)?;
            component.blocks.push(block);
        }
        debug!(blocks = component.blocks.len(), "parsed component");
        Ok(component)
    }

    fn block(&mut self, tokens: &[&str]) -> Result<BlockNode> {
        let line = self.reader.line_number();
        let (name, index) = self.block_header(tokens)?;
        let kind = self
            .options
            .body_kind(&name)
            .ok_or_else(|| self.error(Error::unknown_block(&name)))?;
        trace!(block = %name, ?index, ?kind, "block start");

        let body = match kind {
            BodyKind::Params => BodyNode::Params(self.param_body(&name, index)?),
            BodyKind::List => BodyNode::List(self.list_body(&name, index)?),
        };
        Ok(BlockNode {
            name,
            index,
            line,
            body,
        })
    }

    fn block_header(&self, tokens: &[&str]) -> Result<(SmolStr, Option<usize>)> {
        scan_block_header(tokens).map_err(|err| self.error(err))
    }

    fn check_end(&self, tokens: &[&str], name: &str, index: Option<usize>) -> Result<()> {
        check_block_end(tokens, name, index).map_err(|err| self.error(err))
    }

    fn next_content(&mut self, name: &str) -> Result<String> {
        self.reader
            .read_content_line()?
            .ok_or_else(|| Error::unexpected_eof(&format!("block `{name}`")))
    }

    /// Whether the next content line starts with an array directive.
    fn directive_follows(&mut self) -> Result<bool> {
        let mark = self.reader.tell();
        let mut found = false;
        while let Some(raw) = self.reader.read_line()? {
            let line = scan_line(&raw);
            match line.kind {
                LineKind::Comment => continue,
                LineKind::Blank => break,
                LineKind::Content => {
                    found = line.head().is_some_and(is_array_directive);
                    break;
                }
            }
        }
        self.reader.seek(mark)?;
        Ok(found)
    }

    fn param_body(&mut self, name: &str, index: Option<usize>) -> Result<Vec<ParamNode>> {
        let mut params = Vec::new();
        loop {
            let raw = self.next_content(name)?;
            let tokens = scan_line(&raw).tokens();
            if is_block_end(tokens[0]) {
                self.check_end(&tokens, name, index)?;
                return Ok(params);
            }
            let param = self.param(&tokens)?;
            params.push(param);
        }
    }

    fn param(&mut self, tokens: &Tokens<'_>) -> Result<ParamNode> {
        let line = self.reader.line_number();
        let key = SmolStr::new(tokens[0]);
        let rest = &tokens[1..];

        let value = match rest.first().map(|token| classify(token)) {
            None => {
                if self.directive_follows()? {
                    Some(ValueNode::Array(self.array(&key)?))
                } else {
                    None
                }
            }
            Some(Token::Layered) if rest.len() == 1 => {
                let mut layers = Vec::new();
                while self.directive_follows()? {
                    layers.push(self.array(&key)?);
                }
                if layers.is_empty() {
                    return Err(self.error(Error::format(format!(
                        "LAYERED array `{key}` has no layers"
                    ))));
                }
                Some(ValueNode::Layered(layers))
            }
            Some(Token::Directive(_)) => Some(ValueNode::Array(self.array_from(rest)?)),
            Some(Token::InOut(inout)) => {
                if rest.len() != 2 {
                    return Err(self.error(Error::arity(3, "file reference", tokens.len())));
                }
                Some(ValueNode::Path {
                    inout,
                    path: PathBuf::from(rest[1]),
                })
            }
            Some(Token::Integer(value)) if rest.len() == 1 => Some(ValueNode::Integer(value)),
            Some(Token::Double(value)) if rest.len() == 1 => Some(ValueNode::Double(value)),
            Some(_) => Some(ValueNode::Words(
                rest.iter().map(|word| word.to_string()).collect(),
            )),
        };
        Ok(ParamNode { key, value, line })
    }

    fn array(&mut self, key: &str) -> Result<ArrayNode> {
        let raw = self.next_content(key)?;
        let tokens = scan_line(&raw).tokens();
        self.array_from(&tokens)
    }

    fn array_from(&mut self, tokens: &[&str]) -> Result<ArrayNode> {
        let mut node = scan_control_line(tokens).map_err(|err| self.error(err))?;
        if node.how == How::Internal {
            scan_array_data(self.reader, &mut node.values)?;
        }
        Ok(node)
    }

    fn list_body(&mut self, name: &str, index: Option<usize>) -> Result<Vec<RowNode>> {
        let mut rows = Vec::new();
        loop {
            let raw = self.next_content(name)?;
            let tokens = scan_line(&raw).tokens();
            if is_block_end(tokens[0]) {
                self.check_end(&tokens, name, index)?;
                return Ok(rows);
            }
            let fields = tokens
                .iter()
                .map(|token| match classify(token) {
                    Token::Integer(value) => AtomNode::Integer(value),
                    Token::Double(value) => AtomNode::Double(value),
                    _ => AtomNode::Word(token.to_string()),
                })
                .collect();
            rows.push(RowNode {
                fields,
                line: self.reader.line_number(),
            });
        }
    }

    fn error(&self, err: Error) -> Error {
        err.at_line(self.reader.line_number())
    }
}
