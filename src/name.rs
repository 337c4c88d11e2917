//! Name hierarchy - encoding of the `node.serialized_name` column
//!
//! Format: `<delimiter>\tm<name>\ts<prefix>\tp<postfix>[\tn<name>\ts<prefix>\tp<postfix>...]`
//!
//! Examples:
//! - `.\tmA\ts\tp` - class `A` with Java delimiters
//! - `.\tmA\ts\tp\tnb\ts\tp` - member `b` of `A`
//! - `/\tm/home/user/main.c\ts\tp` - a source file

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Separates the delimiter from the first element
pub const META_DELIMITER: &str = "\tm";
/// Separates two elements of the hierarchy
pub const NAME_DELIMITER: &str = "\tn";
/// Separates the name of an element from its prefix
pub const PART_DELIMITER: &str = "\ts";
/// Separates the prefix of an element from its postfix
pub const SIGNATURE_DELIMITER: &str = "\tp";

/// Separator displayed between the elements of a qualified name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NameDelimiter {
    /// `/` - file paths
    File,
    /// `::` - C and C++ style scopes
    #[default]
    Cxx,
    /// `.` - Java, Python and most other languages
    Java,
    /// `@` - anything else
    Unknown,
}

impl NameDelimiter {
    /// Get the string written in front of a serialized name
    pub fn as_str(&self) -> &'static str {
        match self {
            NameDelimiter::File => "/",
            NameDelimiter::Cxx => "::",
            NameDelimiter::Java => ".",
            NameDelimiter::Unknown => "@",
        }
    }

    /// Get all delimiters
    pub fn all() -> &'static [NameDelimiter] {
        &[
            NameDelimiter::File,
            NameDelimiter::Cxx,
            NameDelimiter::Java,
            NameDelimiter::Unknown,
        ]
    }
}

impl FromStr for NameDelimiter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "/" | "file" => Ok(NameDelimiter::File),
            "::" | "cxx" | "cpp" => Ok(NameDelimiter::Cxx),
            "." | "java" => Ok(NameDelimiter::Java),
            "@" | "unknown" => Ok(NameDelimiter::Unknown),
            _ => Err(Error::UnknownName { kind: "name delimiter", name: s.to_string() }),
        }
    }
}

impl fmt::Display for NameDelimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One level of a name hierarchy.
///
/// The prefix and postfix usually carry a signature, e.g. the return type
/// and the parameter list of a method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameElement {
    pub prefix: String,
    pub name: String,
    pub postfix: String,
}

impl NameElement {
    pub fn new(prefix: impl Into<String>, name: impl Into<String>, postfix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            name: name.into(),
            postfix: postfix.into(),
        }
    }

    /// Element with neither prefix nor postfix
    pub fn named(name: impl Into<String>) -> Self {
        Self::new("", name, "")
    }
}

impl fmt::Display for NameElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.prefix.is_empty() {
            write!(f, "{} ", self.prefix)?;
        }
        write!(f, "{}{}", self.name, self.postfix)
    }
}

/// Ordered list of name elements, outermost first.
///
/// A hierarchy is never stored as such: each of its prefixes is the
/// serialized name of one node, and the nodes are linked by member edges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NameHierarchy {
    delimiter: NameDelimiter,
    elements: Vec<NameElement>,
}

impl NameHierarchy {
    pub fn new(delimiter: NameDelimiter, elements: Vec<NameElement>) -> Self {
        Self { delimiter, elements }
    }

    /// Hierarchy made of a single element
    pub fn single(delimiter: NameDelimiter, element: NameElement) -> Self {
        Self::new(delimiter, vec![element])
    }

    pub fn delimiter(&self) -> NameDelimiter {
        self.delimiter
    }

    pub fn elements(&self) -> &[NameElement] {
        &self.elements
    }

    /// Append a new innermost element
    pub fn extend(&mut self, element: NameElement) {
        self.elements.push(element);
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Hierarchy without its innermost element, if it has one
    pub fn parent(&self) -> Option<NameHierarchy> {
        if self.elements.len() < 2 {
            return None;
        }
        Some(Self::new(self.delimiter, self.elements[..self.elements.len() - 1].to_vec()))
    }

    /// Serialize the elements in `start..end`.
    ///
    /// Fails when the range selects no element.
    pub fn serialize_range(&self, start: usize, end: usize) -> Result<String> {
        let end = end.min(self.elements.len());
        if start >= end {
            return Err(Error::Serialize(format!(
                "empty range {}..{} of a hierarchy with {} elements",
                start,
                end,
                self.elements.len()
            )));
        }

        let mut out = String::from(self.delimiter.as_str());
        out.push_str(META_DELIMITER);
        for (i, elem) in self.elements[start..end].iter().enumerate() {
            if i > 0 {
                out.push_str(NAME_DELIMITER);
            }
            out.push_str(&elem.name);
            out.push_str(PART_DELIMITER);
            out.push_str(&elem.prefix);
            out.push_str(SIGNATURE_DELIMITER);
            out.push_str(&elem.postfix);
        }
        Ok(out)
    }

    /// Serialize the whole hierarchy
    pub fn serialize_name(&self) -> Result<String> {
        self.serialize_range(0, self.elements.len())
    }

    /// Parse a serialized name back into a hierarchy
    pub fn deserialize_name(serialized: &str) -> Result<Self> {
        let (delimiter, mut rest) = serialized
            .split_once(META_DELIMITER)
            .ok_or_else(|| Error::Deserialize(format!("missing meta delimiter in {:?}", serialized)))?;

        let delimiter = NameDelimiter::from_str(delimiter)
            .map_err(|_| Error::Deserialize(format!("unknown delimiter {:?}", delimiter)))?;

        let mut elements = Vec::new();
        while !rest.is_empty() {
            let (name, after_name) = rest
                .split_once(PART_DELIMITER)
                .ok_or_else(|| Error::Deserialize(format!("missing part delimiter in {:?}", serialized)))?;
            let (prefix, after_prefix) = after_name
                .split_once(SIGNATURE_DELIMITER)
                .ok_or_else(|| Error::Deserialize(format!("missing signature delimiter in {:?}", serialized)))?;

            let postfix = match after_prefix.split_once(NAME_DELIMITER) {
                Some((postfix, next)) => {
                    rest = next;
                    postfix
                }
                None => {
                    rest = "";
                    after_prefix
                }
            };

            elements.push(NameElement::new(prefix, name, postfix));
        }

        Ok(Self { delimiter, elements })
    }

    /// Human readable qualified name, e.g. `MyType::my_method`
    pub fn qualified_name(&self) -> String {
        self.elements
            .iter()
            .map(|e| e.name.as_str())
            .collect::<Vec<_>>()
            .join(self.delimiter.as_str())
    }
}

impl fmt::Display for NameHierarchy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.qualified_name())
    }
}
