#![allow(missing_docs)]

//! XML persistence gateway shared by every manager.
//!
//! Reading parses a whole file with `roxmltree` and hands out [`Record`]
//! views over the elements carrying a given tag. Writing renders an
//! [`XmlElement`] tree and replaces the target file wholesale.

use std::{
    fmt::Write as _,
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};

use roxmltree::{Document, Node};
use thiserror::Error;

/// Failures reading or writing a data file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },
    #[error("{record} in {} is missing `{field}`", path.display())]
    MissingField {
        path: PathBuf,
        record: String,
        field: String,
    },
    #[error("{record} in {} has invalid `{field}`: '{value}'", path.display())]
    InvalidField {
        path: PathBuf,
        record: String,
        field: String,
        value: String,
    },
    #[error("{} data file(s) could not be saved", .0.len())]
    Save(Vec<StorageError>),
}

/// Read the raw text of a data file.
pub fn read_source(path: &Path) -> Result<String, StorageError> {
    fs::read_to_string(path).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Parse previously read text into a document.
pub fn parse<'input>(path: &Path, source: &'input str) -> Result<Document<'input>, StorageError> {
    Document::parse(source).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Every element tagged `tag` in document order, wherever it sits below the root.
pub fn records<'a, 'input>(
    path: &'a Path,
    document: &'a Document<'input>,
    tag: &'a str,
) -> impl Iterator<Item = Record<'a, 'input>> + 'a {
    document
        .descendants()
        .filter(move |node| node.is_element() && node.has_tag_name(tag))
        .enumerate()
        .map(move |(index, node)| Record {
            path,
            node,
            label: format!("{tag} #{}", index + 1),
        })
}

/// View over one record element.
pub struct Record<'a, 'input> {
    path: &'a Path,
    node: Node<'a, 'input>,
    label: String,
}

impl<'a, 'input> Record<'a, 'input> {
    /// The record's `id` attribute.
    pub fn id(&self) -> Result<String, StorageError> {
        self.node
            .attribute("id")
            .map(str::to_string)
            .ok_or_else(|| self.missing("id"))
    }

    /// Text of the first descendant element named `field`.
    pub fn field(&self, field: &str) -> Result<String, StorageError> {
        self.node
            .descendants()
            .skip(1)
            .find(|node| node.is_element() && node.has_tag_name(field))
            .map(text_of)
            .ok_or_else(|| self.missing(field))
    }

    /// Parse the (trimmed) text of `field`.
    pub fn parse_field<T: FromStr>(&self, field: &str) -> Result<T, StorageError> {
        let raw = self.field(field)?;
        raw.trim()
            .parse::<T>()
            .map_err(|_| StorageError::InvalidField {
                path: self.path.to_path_buf(),
                record: self.describe(),
                field: field.to_string(),
                value: raw.clone(),
            })
    }

    /// Texts of every descendant element named `item`, in document order.
    pub fn list(&self, item: &str) -> Vec<String> {
        self.node
            .descendants()
            .filter(|node| node.is_element() && node.has_tag_name(item))
            .map(text_of)
            .collect()
    }

    fn describe(&self) -> String {
        match self.node.attribute("id") {
            Some(id) => format!("{} '{id}'", self.node.tag_name().name()),
            None => self.label.clone(),
        }
    }

    fn missing(&self, field: &str) -> StorageError {
        StorageError::MissingField {
            path: self.path.to_path_buf(),
            record: self.describe(),
            field: field.to_string(),
        }
    }
}

fn text_of(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

/// Element tree rendered when a manager saves its collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XmlElement {
    name: String,
    attributes: Vec<(String, String)>,
    text: Option<String>,
    children: Vec<XmlElement>,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    /// Leaf element holding only text, e.g. `<name>London</name>`.
    pub fn field(name: impl Into<String>, text: impl Into<String>) -> Self {
        let mut element = Self::new(name);
        element.text = Some(text.into());
        element
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(child);
        self
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Render as a standalone document with an XML declaration.
    pub fn to_document_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        self.render(&mut out, 0);
        out
    }

    fn render(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        let _ = write!(out, "{indent}<{}", self.name);
        for (name, value) in &self.attributes {
            let _ = write!(out, " {name}=\"{}\"", escape(value));
        }

        match (&self.text, self.children.is_empty()) {
            (Some(text), true) => {
                let _ = writeln!(out, ">{}</{}>", escape(text), self.name);
            }
            (None, true) => out.push_str("/>\n"),
            (text, false) => {
                out.push_str(">\n");
                if let Some(text) = text {
                    let _ = writeln!(out, "{indent}  {}", escape(text));
                }
                for child in &self.children {
                    child.render(out, depth + 1);
                }
                let _ = writeln!(out, "{indent}</{}>", self.name);
            }
        }
    }
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Replace `path` with the rendered document, creating parent directories if needed.
pub fn write_document(path: &Path, root: &XmlElement) -> Result<(), StorageError> {
    let io_error = |source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error)?;
    }
    fs::write(path, root.to_document_string()).map_err(io_error)
}
