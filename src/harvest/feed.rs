//! XML rating feed parser
//!
//! The feed document looks like:
//!
//! ```xml
//! <items>
//!   <item type="boardgame" id="13">
//!     <name type="primary" value="Catan"/>
//!     <name type="alternate" value="Die Siedler von Catan"/>
//!     <comments page="1" totalitems="250">
//!       <comment username="alice" rating="8" value=""/>
//!     </comments>
//!   </item>
//! </items>
//! ```
//!
//! Elements and attributes not listed here are ignored. The root element must
//! be `items`; upstream error documents such as `<errors>` are rejected.

use crate::model::{EntryName, RatingRecord};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::Deserialize;
use thiserror::Error;

/// Root element of a rating feed document
pub const FEED_ROOT: &str = "items";

/// Errors parsing a rating feed document
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("Malformed XML: {0}")]
    Syntax(#[from] quick_xml::Error),

    #[error("Unexpected feed structure: {0}")]
    Structure(#[from] quick_xml::DeError),

    #[error("Expected root element <items>, found <{0}>")]
    UnexpectedRoot(String),

    #[error("Document has no root element")]
    MissingRoot,
}

#[derive(Debug, Default, Deserialize)]
struct ItemsXml {
    #[serde(rename = "item", default)]
    items: Vec<ItemXml>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemXml {
    #[serde(rename = "name", default)]
    names: Vec<NameXml>,

    #[serde(default)]
    comments: Option<CommentsXml>,
}

#[derive(Debug, Default, Deserialize)]
struct NameXml {
    #[serde(rename = "@value", default)]
    value: String,

    #[serde(rename = "@type", default)]
    kind: String,
}

#[derive(Debug, Default, Deserialize)]
struct CommentsXml {
    #[serde(rename = "@totalitems", default)]
    total_items: String,

    #[serde(rename = "comment", default)]
    comments: Vec<CommentXml>,
}

#[derive(Debug, Default, Deserialize)]
struct CommentXml {
    #[serde(rename = "@username", default)]
    username: String,

    #[serde(rename = "@rating", default)]
    rating: String,
}

/// One `item` of the feed
#[derive(Debug, Clone, Default)]
pub struct FeedEntry {
    pub names: Vec<EntryName>,

    /// Raw `totalitems` attribute, empty when the feed omits `comments`
    pub total_items: String,

    pub ratings: Vec<RatingRecord>,
}

/// A parsed rating feed page
#[derive(Debug, Clone, Default)]
pub struct RatingPage {
    pub entries: Vec<FeedEntry>,
}

impl RatingPage {
    /// Takes the entry the harvester reads; later items are ignored
    pub fn into_first_entry(self) -> Option<FeedEntry> {
        self.entries.into_iter().next()
    }
}

impl From<ItemXml> for FeedEntry {
    fn from(item: ItemXml) -> Self {
        let names = item
            .names
            .into_iter()
            .map(|name| EntryName::new(name.value, name.kind))
            .collect();

        let (total_items, ratings) = match item.comments {
            Some(comments) => (
                comments.total_items,
                comments
                    .comments
                    .into_iter()
                    .map(|comment| RatingRecord {
                        username: comment.username,
                        rating: comment.rating,
                    })
                    .collect(),
            ),
            None => (String::new(), Vec::new()),
        };

        Self {
            names,
            total_items,
            ratings,
        }
    }
}

/// Parses one rating feed document
pub fn parse_rating_page(xml: &str) -> Result<RatingPage, FeedError> {
    match root_element(xml)? {
        Some(root) if root == FEED_ROOT => {}
        Some(root) => return Err(FeedError::UnexpectedRoot(root)),
        None => return Err(FeedError::MissingRoot),
    }

    let document: ItemsXml = quick_xml::de::from_str(xml)?;

    Ok(RatingPage {
        entries: document.items.into_iter().map(FeedEntry::from).collect(),
    })
}

/// Local name of the first element in the document
fn root_element(xml: &str) -> Result<Option<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    loop {
        match reader.read_event()? {
            Event::Start(e) | Event::Empty(e) => {
                return Ok(Some(
                    String::from_utf8_lossy(e.local_name().as_ref()).into_owned(),
                ));
            }
            Event::Eof => return Ok(None),
            _ => {}
        }
    }
}
