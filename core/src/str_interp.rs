//! `#{name}` string interpolation used for build commands and solution templates.
//!
//! `##` produces a literal `#`. Any other `#` is kept as is.

use std::{borrow::Borrow, collections::HashMap, ffi::OsStr, hash::Hash};

pub type Result = std::result::Result<String, InterpError>;

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum InterpError {
    #[error("Undefined variable '{0}' at column {1}")]
    UndefinedVar(String, usize),

    #[error("Unclosed brace (opened at column {0})")]
    UnclosedBrace(usize),
}

pub fn interp<K, V>(fmt: &str, variables: &HashMap<K, V>) -> Result
where
    K: Borrow<str> + Hash + Eq,
    V: AsRef<OsStr>,
{
    let mut res = String::with_capacity(fmt.len() * 2);
    let mut chars = fmt.chars().enumerate().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '#' {
            res.push(c);
            continue;
        }
        match chars.peek() {
            Some((_, '#')) => {
                chars.next();
                res.push('#');
            }
            Some((_, '{')) => {
                chars.next();
                let column = i + 1;
                let mut var_name = String::new();
                let closed = loop {
                    match chars.next() {
                        Some((_, '}')) => break true,
                        Some((_, c)) => var_name.push(c),
                        None => break false,
                    }
                };
                if !closed {
                    return Err(InterpError::UnclosedBrace(column));
                }
                let Some(value) = variables.get(var_name.as_str()) else {
                    return Err(InterpError::UndefinedVar(var_name, column))
                };
                res += &value.as_ref().to_string_lossy();
            }
            _ => res.push('#'),
        }
    }

    res.shrink_to_fit();
    Ok(res)
}
