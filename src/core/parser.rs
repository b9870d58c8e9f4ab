// Copyright 2025 Eric Jingryd (tidynest@proton.me)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! src/core/parser.rs
//!
//! Remap profile parser
//!
//! A profile is a plain text file with one remapping per line:
//!
//! ```text
//! # single key remaps; `disable` swallows the key
//! key = CapsLock, LCtrl
//! key = Insert, disable
//!
//! # keys that always toggle their lock state
//! toggle = NumLock
//!
//! # shortcuts, optionally scoped to one application
//! shortcut = Win+C, Ctrl+C
//! shortcut = Ctrl+A, Alt+V, notepad.exe
//! shortcut = Ctrl+Q, Esc
//! ```
//!
//! Parsing only structures the text. Table rules (duplicates, reserved
//! shortcuts, conflicts) are checked later by the store and the validator.

use nom::{
    branch::alt,
    bytes::complete::{tag_no_case, take_while1},
    character::complete::{char, space0},
    combinator::{all_consuming, opt, value},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Parser,
};
use std::fmt;
use thiserror::Error;

use crate::core::keys::{key_name, parse_key_name, VirtualKey, VK_NULL};
use crate::core::types::{RemapTarget, Shortcut, ShortcutError};

/// Parse errors with line number context
#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("Parse error on line {line}: {message}")]
    InvalidSyntax { line: usize, message: String },

    #[error("Unknown key '{name}' on line {line}")]
    UnknownKey { name: String, line: usize },

    #[error("Invalid shortcut on line {line}: {reason}")]
    InvalidShortcut { line: usize, reason: ShortcutError },

    #[error("Invalid key event '{0}': expected down:<key> or up:<key>")]
    InvalidKeyEvent(String),
}

/// Leading keyword of a profile line
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Directive {
    Key,
    Toggle,
    Shortcut,
}

/// One remapping read from a profile
#[derive(Clone, Debug, PartialEq)]
pub enum ProfileEntry {
    /// `target` is `VK_NULL` for a disabled key
    SingleKey {
        source: VirtualKey,
        target: VirtualKey,
    },
    Toggle(VirtualKey),
    /// `app` is `None` for an OS-level shortcut
    Shortcut {
        source: Shortcut,
        target: RemapTarget,
        app: Option<String>,
    },
}

impl fmt::Display for ProfileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfileEntry::SingleKey { source, target } => {
                write!(f, "key = {}, {}", key_name(*source), target_name(*target))
            }
            ProfileEntry::Toggle(key) => write!(f, "toggle = {}", key_name(*key)),
            ProfileEntry::Shortcut {
                source,
                target,
                app,
            } => {
                write!(f, "shortcut = {}, {}", source, target)?;
                if let Some(app) = app {
                    write!(f, ", {}", app)?;
                }
                Ok(())
            }
        }
    }
}

/// A profile entry together with the line it came from
#[derive(Clone, Debug, PartialEq)]
pub struct ProfileLine {
    pub line: usize,
    pub entry: ProfileEntry,
}

/// Fields of a line before key names are resolved
struct RawLine<'a> {
    directive: Directive,
    first: Vec<&'a str>,
    second: Option<Vec<&'a str>>,
    app: Option<&'a str>,
}

const DISABLE_KEYWORD: &str = "disable";

fn target_name(key: VirtualKey) -> String {
    if key == VK_NULL {
        DISABLE_KEYWORD.to_string()
    } else {
        key_name(key)
    }
}

/// Parse a complete profile
///
/// Blank lines and `#` comments are skipped. The first malformed line
/// aborts parsing.
pub fn parse_profile(content: &str) -> Result<Vec<ProfileLine>, ParseError> {
    let mut lines = Vec::new();

    for (line_num, line) in content.lines().enumerate() {
        let line_num = line_num + 1;

        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }

        let (_, raw) = all_consuming(parse_line)
            .parse(line)
            .map_err(|e| syntax_error(line_num, e))?;

        lines.push(ProfileLine {
            line: line_num,
            entry: resolve_line(raw, line_num)?,
        });
    }

    Ok(lines)
}

/// Parse a `+` separated shortcut such as `Ctrl+Shift+S`
pub fn parse_shortcut(text: &str) -> Result<Shortcut, ParseError> {
    let (_, names) = all_consuming(delimited(space0, key_list, space0))
        .parse(text)
        .map_err(|e| syntax_error(1, e))?;
    resolve_shortcut(&names, 1)
}

/// One step of a scripted key sequence
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct KeyStroke {
    pub key: VirtualKey,
    pub key_up: bool,
}

impl KeyStroke {
    pub fn down(key: VirtualKey) -> Self {
        Self { key, key_up: false }
    }

    pub fn up(key: VirtualKey) -> Self {
        Self { key, key_up: true }
    }
}

/// Parse a whitespace separated event script such as
/// `down:LCtrl down:C up:C up:LCtrl`
pub fn parse_key_sequence(text: &str) -> Result<Vec<KeyStroke>, ParseError> {
    text.split_whitespace()
        .map(|token| {
            let (_, (key_up, name)) = all_consuming(key_event)
                .parse(token)
                .map_err(|_| ParseError::InvalidKeyEvent(token.to_string()))?;
            let key =
                parse_key_name(name).ok_or_else(|| ParseError::InvalidKeyEvent(token.to_string()))?;
            Ok(KeyStroke { key, key_up })
        })
        .collect()
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn syntax_error(line: usize, err: nom::Err<nom::error::Error<&str>>) -> ParseError {
    let message = match err {
        nom::Err::Error(e) | nom::Err::Failure(e) if e.input.trim().is_empty() => {
            "unexpected end of line".to_string()
        }
        nom::Err::Error(e) | nom::Err::Failure(e) => {
            format!("unexpected input at '{}'", e.input.trim())
        }
        nom::Err::Incomplete(_) => "incomplete line".to_string(),
    };
    ParseError::InvalidSyntax { line, message }
}

/// Parse `<directive> = <keys>[, <keys>][, <app>]`
fn parse_line(input: &str) -> IResult<&str, RawLine<'_>> {
    let (input, directive) = parse_directive(input)?;
    let (input, _) = (space0, char('='), space0).parse(input)?;
    let (input, first) = key_list(input)?;
    let (input, second) = opt(preceded(comma, key_list)).parse(input)?;
    let (input, app) = opt(preceded(comma, app_name)).parse(input)?;
    let (input, _) = space0(input)?;

    Ok((
        input,
        RawLine {
            directive,
            first,
            second,
            app,
        },
    ))
}

fn parse_directive(input: &str) -> IResult<&str, Directive> {
    alt((
        value(Directive::Shortcut, tag_no_case("shortcut")),
        value(Directive::Toggle, tag_no_case("toggle")),
        value(Directive::Key, tag_no_case("key")),
    ))
    .parse(input)
}

fn comma(input: &str) -> IResult<&str, char> {
    delimited(space0, char(','), space0).parse(input)
}

fn key_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

fn key_list(input: &str) -> IResult<&str, Vec<&str>> {
    separated_list1(delimited(space0, char('+'), space0), key_token).parse(input)
}

fn app_name(input: &str) -> IResult<&str, &str> {
    let (input, name) = take_while1(|c: char| c != ',').parse(input)?;
    Ok((input, name.trim()))
}

/// `down:<key>` yields `false`, `up:<key>` yields `true`
fn key_event(input: &str) -> IResult<&str, (bool, &str)> {
    let (input, key_up) = alt((
        value(false, tag_no_case("down")),
        value(true, tag_no_case("up")),
    ))
    .parse(input)?;
    let (input, _) = char(':').parse(input)?;
    let (input, name) = key_token(input)?;
    Ok((input, (key_up, name)))
}

fn resolve_line(raw: RawLine<'_>, line: usize) -> Result<ProfileEntry, ParseError> {
    let invalid = |message: &str| ParseError::InvalidSyntax {
        line,
        message: message.to_string(),
    };

    match raw.directive {
        Directive::Key => {
            let target = match (raw.second.as_deref(), raw.app) {
                (Some([target]), None) => *target,
                _ => return Err(invalid("`key` takes one source key and one target key")),
            };
            let source = match raw.first.as_slice() {
                [source] => resolve_key(source, line)?,
                _ => return Err(invalid("`key` takes one source key and one target key")),
            };
            let target = if target.eq_ignore_ascii_case(DISABLE_KEYWORD) {
                VK_NULL
            } else {
                resolve_key(target, line)?
            };
            Ok(ProfileEntry::SingleKey { source, target })
        }
        Directive::Toggle => match (raw.first.as_slice(), raw.second, raw.app) {
            ([key], None, None) => Ok(ProfileEntry::Toggle(resolve_key(key, line)?)),
            _ => Err(invalid("`toggle` takes exactly one key")),
        },
        Directive::Shortcut => {
            let Some(second) = raw.second else {
                return Err(invalid("`shortcut` needs a source and a target"));
            };
            let source = resolve_shortcut(&raw.first, line)?;
            let target = match second.as_slice() {
                [name] if name.eq_ignore_ascii_case(DISABLE_KEYWORD) => RemapTarget::DISABLED,
                [name] => RemapTarget::Key(resolve_key(name, line)?),
                names => RemapTarget::Combo(resolve_shortcut(names, line)?),
            };
            let app = raw.app.filter(|app| !app.is_empty()).map(str::to_string);
            Ok(ProfileEntry::Shortcut {
                source,
                target,
                app,
            })
        }
    }
}

fn resolve_key(name: &str, line: usize) -> Result<VirtualKey, ParseError> {
    parse_key_name(name).ok_or_else(|| ParseError::UnknownKey {
        name: name.to_string(),
        line,
    })
}

fn resolve_shortcut(names: &[&str], line: usize) -> Result<Shortcut, ParseError> {
    let keys = names
        .iter()
        .map(|name| resolve_key(name, line))
        .collect::<Result<Vec<_>, _>>()?;
    Shortcut::try_from_keys(&keys).map_err(|reason| ParseError::InvalidShortcut { line, reason })
}
