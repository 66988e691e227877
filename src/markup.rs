//! A small markup parser for producer output.
//!
//! This accepts the HTML subset that feature templates actually emit: elements with quoted, unquoted or bare attributes,
//! self-closing tags, HTML void elements, comments and `<!DOCTYPE …>` (both skipped), and character references.
//! Whitespace-only text between tags is dropped, so template indentation never turns into nodes.
//!
//! Tag and attribute names are ASCII-lowercased. If an attribute name repeats on one element, the first occurrence wins.
//!
//! Tokenizing is done by a [`chumsky`] parser. Nesting is checked afterwards, so that mismatches can be reported by tag name.

use crate::vdom::{Attribute, Element, Node};
use chumsky::prelude::*;
use tracing::{instrument, trace};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
	#[error("malformed markup at byte {position}: {message}")]
	Syntax { position: usize, message: String },

	#[error("closing tag </{found}> at byte {position} does not match open <{expected}>")]
	MismatchedClose { expected: String, found: String, position: usize },

	#[error("closing tag </{found}> at byte {position} has no open element")]
	UnexpectedClose { found: String, position: usize },

	#[error("<{0}> is never closed")]
	Unclosed(String),
}

const VOID_ELEMENTS: &[&str] = &["area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr"];

#[must_use]
pub fn is_void(name: &str) -> bool {
	VOID_ELEMENTS.iter().any(|void| void.eq_ignore_ascii_case(name))
}

#[derive(Debug, Clone, PartialEq)]
enum Token<'a> {
	StartTag {
		name: &'a str,
		attributes: Vec<(&'a str, Option<&'a str>)>,
		self_closing: bool,
	},
	EndTag(&'a str),
	Text(&'a str),
	/// Comments, `<!…>` and `<?…>`.
	Skipped,
}

fn tokenizer<'a>() -> impl Parser<'a, &'a str, Vec<(Token<'a>, SimpleSpan)>, extra::Err<Rich<'a, char>>> {
	let name = any()
		.filter(char::is_ascii_alphabetic)
		.then(any().filter(|c: &char| c.is_ascii_alphanumeric() || matches!(*c, '-' | '_' | ':' | '.')).repeated())
		.to_slice();

	let comment = just("<!--").then(any().and_is(just("-->").not()).repeated()).then(just("-->")).to(Token::Skipped);
	let declaration = just('<').then(one_of("!?")).then(none_of('>').repeated()).then(just('>')).to(Token::Skipped);

	let double_quoted = just('"').ignore_then(none_of('"').repeated().to_slice()).then_ignore(just('"'));
	let single_quoted = just('\'').ignore_then(none_of('\'').repeated().to_slice()).then_ignore(just('\''));
	let unquoted = any().filter(|c: &char| !c.is_whitespace() && *c != '>').repeated().at_least(1).to_slice();
	let value = just('=').padded().ignore_then(choice((double_quoted, single_quoted, unquoted)));
	let attribute = any()
		.filter(|c: &char| !c.is_whitespace() && !matches!(*c, '=' | '>' | '/'))
		.repeated()
		.at_least(1)
		.to_slice()
		.then(value.or_not());

	let start_tag = just('<')
		.ignore_then(name.clone())
		.then(text::whitespace().ignore_then(attribute).repeated().collect::<Vec<_>>())
		.then_ignore(text::whitespace())
		.then(choice((just("/>").to(true), just('>').to(false))))
		.map(|((name, attributes), self_closing)| Token::StartTag { name, attributes, self_closing });

	let end_tag = just("</").ignore_then(name).then_ignore(text::whitespace()).then_ignore(just('>')).map(Token::EndTag);

	// A `<` that doesn't start markup is literal text.
	let markup_start = any().filter(|c: &char| c.is_ascii_alphabetic() || matches!(*c, '/' | '!' | '?'));
	let literal = choice((
		none_of('<').repeated().at_least(1).to_slice(),
		just('<').then(markup_start.not()).then(none_of('<').repeated()).to_slice(),
	))
	.map(Token::Text);

	choice((comment, declaration, end_tag, start_tag, literal))
		.map_with(|token, extra| (token, extra.span()))
		.repeated()
		.collect()
		.then_ignore(end())
}

/// Parses `markup` into a fragment of zero or more root nodes.
///
/// # Errors
///
/// Iff the markup is not well-nested or ends inside a tag.
#[instrument(skip(markup), fields(len = markup.len()))]
pub fn parse(markup: &str) -> Result<Vec<Node>, ParseError> {
	fn push(roots: &mut Vec<Node>, open: &mut [Element], node: Node) {
		let siblings = match open.last_mut() {
			Some(parent) => &mut parent.children,
			None => roots,
		};
		if let (Node::Text(text), Some(Node::Text(previous))) = (&node, siblings.last_mut()) {
			return previous.push_str(text);
		}
		siblings.push(node);
	}

	let tokens = tokenizer().parse(markup).into_result().map_err(|errors| match errors.first() {
		Some(error) => ParseError::Syntax {
			position: error.span().start,
			message: error.to_string(),
		},
		None => ParseError::Syntax {
			position: markup.len(),
			message: "unexpected end of markup".to_owned(),
		},
	})?;

	let mut roots = Vec::new();
	let mut open: Vec<Element> = Vec::new();
	for (token, span) in tokens {
		match token {
			Token::Skipped => (),
			Token::Text(raw) => {
				if !raw.trim().is_empty() {
					push(&mut roots, &mut open, Node::Text(decode(raw)));
				}
			}
			Token::StartTag { name, attributes, self_closing } => {
				let mut element = Element::new(name.to_ascii_lowercase());
				for (name, value) in attributes {
					let name = name.to_ascii_lowercase();
					if element.attribute(&name).is_none() {
						element.attributes.push(Attribute {
							name,
							value: value.map_or_else(String::new, decode),
						});
					}
				}
				if self_closing || is_void(&element.name) {
					push(&mut roots, &mut open, Node::Element(element));
				} else {
					open.push(element);
				}
			}
			Token::EndTag(found) => {
				let found = found.to_ascii_lowercase();
				let position = span.start;
				let element = match open.pop() {
					Some(element) => element,
					None => return Err(ParseError::UnexpectedClose { found, position }),
				};
				if element.name != found {
					return Err(ParseError::MismatchedClose {
						expected: element.name,
						found,
						position,
					});
				}
				push(&mut roots, &mut open, Node::Element(element));
			}
		}
	}

	match open.pop() {
		Some(unclosed) => Err(ParseError::Unclosed(unclosed.name)),
		None => {
			trace!("Parsed {} root node(s).", roots.len());
			Ok(roots)
		}
	}
}

/// Escapes text for use as element content or a double- or single-quoted attribute value.
#[must_use]
pub fn escape(text: &str) -> String {
	let mut escaped = String::with_capacity(text.len());
	for c in text.chars() {
		match c {
			'&' => escaped.push_str("&amp;"),
			'<' => escaped.push_str("&lt;"),
			'>' => escaped.push_str("&gt;"),
			'"' => escaped.push_str("&quot;"),
			'\'' => escaped.push_str("&#39;"),
			c => escaped.push(c),
		}
	}
	escaped
}

/// Resolves character references. Unknown or malformed references are kept verbatim.
fn decode(raw: &str) -> String {
	if !raw.contains('&') {
		return raw.to_owned();
	}

	let mut decoded = String::with_capacity(raw.len());
	let mut rest = raw;
	while let Some(amp) = rest.find('&') {
		decoded.push_str(&rest[..amp]);
		rest = &rest[amp..];
		let resolved = rest.find(';').and_then(|semi| Some((resolve(&rest[1..semi])?, semi)));
		match resolved {
			Some((c, semi)) => {
				decoded.push(c);
				rest = &rest[semi + 1..];
			}
			None => {
				decoded.push('&');
				rest = &rest[1..];
			}
		}
	}
	decoded.push_str(rest);
	decoded
}

fn resolve(reference: &str) -> Option<char> {
	match reference {
		"amp" => Some('&'),
		"lt" => Some('<'),
		"gt" => Some('>'),
		"quot" => Some('"'),
		"apos" => Some('\''),
		"nbsp" => Some('\u{a0}'),
		numeric => {
			let numeric = numeric.strip_prefix('#')?;
			let code = match numeric.strip_prefix(|c: char| c == 'x' || c == 'X') {
				Some(hex) => u32::from_str_radix(hex, 16).ok()?,
				None => numeric.parse().ok()?,
			};
			char::from_u32(code)
		}
	}
}
