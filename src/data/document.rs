//! Document queries over parsed HTML
//!
//! Markup is parsed once into a `Document` and then searched with `Query`
//! values (by tag, class list, attribute value, or id). The extractors only
//! talk to this module; the HTML parser behind it is an implementation detail.

use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

/// Errors that can occur when extracting data from markup
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExtractError {
    /// A structural marker the page is expected to carry is absent
    #[error("Missing expected field in page: {0}")]
    MissingField(&'static str),

    /// A query could not be turned into a selector
    #[error("Invalid document query '{0}'")]
    InvalidQuery(String),
}

/// Attribute filter applied on top of the tag name
#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    None,
    Classes(Vec<String>),
    Attr { name: String, value: String },
    Id(String),
}

/// A lookup for elements of one tag, optionally narrowed by attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    tag: String,
    filter: Filter,
}

impl Query {
    /// Any element with the given tag
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            filter: Filter::None,
        }
    }

    /// Elements carrying every whitespace-separated class in `classes`
    pub fn class(tag: &str, classes: &str) -> Self {
        Self {
            tag: tag.to_string(),
            filter: Filter::Classes(classes.split_whitespace().map(str::to_string).collect()),
        }
    }

    /// Elements whose attribute `name` equals `value`
    pub fn attr(tag: &str, name: &str, value: &str) -> Self {
        Self {
            tag: tag.to_string(),
            filter: Filter::Attr {
                name: name.to_string(),
                value: value.to_string(),
            },
        }
    }

    /// The element with the given id
    pub fn id(tag: &str, id: &str) -> Self {
        Self {
            tag: tag.to_string(),
            filter: Filter::Id(id.to_string()),
        }
    }

    /// CSS form of the query
    fn css(&self) -> String {
        let mut css = self.tag.clone();
        match &self.filter {
            Filter::None => {}
            Filter::Classes(classes) => {
                for class in classes {
                    css.push('.');
                    css.push_str(class);
                }
            }
            Filter::Attr { name, value } => {
                css.push_str(&format!("[{}=\"{}\"]", name, value.replace('"', "\\\"")));
            }
            Filter::Id(id) => {
                css.push('#');
                css.push_str(id);
            }
        }
        css
    }

    fn selector(&self) -> Result<Selector, ExtractError> {
        let css = self.css();
        Selector::parse(&css).map_err(|_| ExtractError::InvalidQuery(css.clone()))
    }
}

/// A parsed HTML document
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML document
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// First element matching `query`, in document order
    pub fn find(&self, query: &Query) -> Result<Option<Node<'_>>, ExtractError> {
        let selector = query.selector()?;
        Ok(self.html.select(&selector).next().map(Node))
    }

    /// All elements matching `query`, in document order
    pub fn find_all(&self, query: &Query) -> Result<Vec<Node<'_>>, ExtractError> {
        let selector = query.selector()?;
        Ok(self.html.select(&selector).map(Node).collect())
    }

    /// First element matching `query`, or `MissingField(field)` if none
    pub fn require(&self, query: &Query, field: &'static str) -> Result<Node<'_>, ExtractError> {
        self.find(query)?.ok_or(ExtractError::MissingField(field))
    }
}

/// An element inside a `Document`
#[derive(Debug, Clone, Copy)]
pub struct Node<'a>(ElementRef<'a>);

impl<'a> Node<'a> {
    /// First descendant matching `query`
    pub fn find(&self, query: &Query) -> Result<Option<Node<'a>>, ExtractError> {
        let selector = query.selector()?;
        Ok(self.0.select(&selector).next().map(Node))
    }

    /// All descendants matching `query`, in document order
    pub fn find_all(&self, query: &Query) -> Result<Vec<Node<'a>>, ExtractError> {
        let selector = query.selector()?;
        Ok(self.0.select(&selector).map(Node).collect())
    }

    /// First descendant matching `query`, or `MissingField(field)` if none
    pub fn require(&self, query: &Query, field: &'static str) -> Result<Node<'a>, ExtractError> {
        self.find(query)?.ok_or(ExtractError::MissingField(field))
    }

    /// Concatenated text of the element and its descendants, trimmed
    pub fn text(&self) -> String {
        self.0.text().collect::<String>().trim().to_string()
    }

    /// Value of attribute `name`, if present
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.0.value().attr(name)
    }
}
