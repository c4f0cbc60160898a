//! Document outline (bookmarks).
//!
//! Outline items are loaded into an arena owned by the document, one sibling
//! list at a time: the top level when the first cursor is created, and each
//! item's children the first time [`OutlineIterator::child`] asks for them.
//! Cursors refer to a list by id and hold a document handle, so they stay
//! valid for as long as they live.

use std::collections::HashSet;
use std::fmt;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::actions::item_action;
use super::backend::{catalog, dict_get, dict_get_dict, integer};
use super::document::Document;
use crate::config::GlobalParams;
use crate::decode::{to_code_points, Unicode};
use crate::model::{Action, LinkAction};

type NodeId = usize;
type ListId = usize;

/// Upper bound on siblings read from one list.
const MAX_SIBLINGS: usize = 100_000;

#[derive(Debug, Clone)]
struct OutlineNode {
    title: Vec<Unicode>,
    open: bool,
    action: LinkAction,
    first_child: Option<ObjectId>,
    /// `None` until the children have been read
    kids: Option<Option<ListId>>,
}

/// Arena of outline items loaded so far.
#[derive(Debug, Default)]
pub(crate) struct OutlineTree {
    nodes: Vec<OutlineNode>,
    lists: Vec<Vec<NodeId>>,
    root: Option<ListId>,
    loaded: HashSet<ObjectId>,
}

impl OutlineTree {
    /// Read the top-level items of the catalog's `/Outlines`.
    pub(crate) fn load(pdf: &LopdfDocument, pages: &[ObjectId]) -> Self {
        let mut tree = Self::default();
        let first = catalog(pdf)
            .and_then(|c| dict_get_dict(pdf, c, b"Outlines"))
            .and_then(first_ref);
        if let Some(first) = first {
            tree.root = tree.read_list(pdf, first, pages);
        }
        tree
    }

    /// Read a sibling chain starting at `first`. Empty chains yield `None`.
    fn read_list(&mut self, pdf: &LopdfDocument, first: ObjectId, pages: &[ObjectId]) -> Option<ListId> {
        let mut list = Vec::new();
        let mut next = Some(first);

        while let Some(id) = next {
            if !self.loaded.insert(id) {
                log::warn!("Outline item {} {} R visited twice, stopping", id.0, id.1);
                break;
            }
            if list.len() >= MAX_SIBLINGS {
                break;
            }
            let Ok(item) = pdf.get_dictionary(id) else {
                break;
            };

            list.push(self.nodes.len());
            self.nodes.push(read_node(pdf, item, pages));
            next = match item.get(b"Next") {
                Ok(Object::Reference(next)) => Some(*next),
                _ => None,
            };
        }

        if list.is_empty() {
            return None;
        }
        self.lists.push(list);
        Some(self.lists.len() - 1)
    }

    /// Children of `node`, reading them on first access.
    fn kids(&mut self, pdf: &LopdfDocument, node: NodeId, pages: &[ObjectId]) -> Option<ListId> {
        if let Some(kids) = self.nodes[node].kids {
            return kids;
        }
        let kids = match self.nodes[node].first_child {
            Some(first) => self.read_list(pdf, first, pages),
            None => None,
        };
        self.nodes[node].kids = Some(kids);
        kids
    }

    fn list_len(&self, list: ListId) -> usize {
        self.lists[list].len()
    }

    fn node(&self, list: ListId, index: usize) -> &OutlineNode {
        &self.nodes[self.lists[list][index]]
    }
}

fn first_ref(dict: &Dictionary) -> Option<ObjectId> {
    match dict.get(b"First") {
        Ok(Object::Reference(id)) => Some(*id),
        _ => None,
    }
}

fn read_node(pdf: &LopdfDocument, item: &Dictionary, pages: &[ObjectId]) -> OutlineNode {
    let title = match dict_get(pdf, item, b"Title") {
        Some(Object::String(bytes, _)) => to_code_points(bytes),
        _ => Vec::new(),
    };

    OutlineNode {
        title,
        open: dict_get(pdf, item, b"Count")
            .and_then(integer)
            .is_some_and(|count| count > 0),
        action: item_action(pdf, item, pages),
        first_child: first_ref(item),
        kids: None,
    }
}

/// A cursor over one level of the outline.
///
/// Cloning a cursor shares the sibling list and copies the position, so the
/// clone can be advanced independently.
#[derive(Clone)]
pub struct OutlineIterator {
    doc: Document,
    list: ListId,
    index: usize,
}

impl OutlineIterator {
    /// Cursor at the first top-level item, or `None` if the document has no
    /// outline items.
    pub fn new(doc: &Document) -> Option<Self> {
        let list = doc.outline().root?;
        Some(Self {
            doc: doc.clone(),
            list,
            index: 0,
        })
    }

    /// Title of the current item, in the configured text encoding.
    ///
    /// Code points the output encoding cannot represent are dropped.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has moved past the last item.
    pub fn title(&self) -> String {
        let map = GlobalParams::global().text_encoding;
        self.with_node(|node| {
            node.title
                .iter()
                .filter_map(|&code| map.map_unicode(code))
                .collect()
        })
    }

    /// Whether the item is initially shown expanded.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has moved past the last item.
    pub fn is_open(&self) -> bool {
        self.with_node(|node| node.open)
    }

    /// Action of the current item.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has moved past the last item.
    pub fn action(&self) -> Action {
        let kind = self.with_node(|node| node.action.clone());
        Action {
            title: self.title(),
            kind,
        }
    }

    /// Move to the next sibling. Returns `false` once past the last one.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> bool {
        let len = self.len();
        if self.index < len {
            self.index += 1;
        }
        self.index < len
    }

    /// Cursor over the current item's children, or `None` if it has none.
    ///
    /// # Panics
    ///
    /// Panics if the cursor has moved past the last item.
    pub fn child(&self) -> Option<OutlineIterator> {
        self.assert_valid();
        let list = {
            let pdf = self.doc.pdf();
            let mut tree = self.doc.outline();
            let node = tree.lists[self.list][self.index];
            tree.kids(&pdf, node, self.doc.page_ids())?
        };
        Some(Self {
            doc: self.doc.clone(),
            list,
            index: 0,
        })
    }

    /// Whether the cursor points at an item.
    pub fn is_valid(&self) -> bool {
        self.index < self.len()
    }

    /// 0-based position within the sibling list.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Number of items in the sibling list.
    pub fn len(&self) -> usize {
        self.doc.outline().list_len(self.list)
    }

    /// Sibling lists are never empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Whether both cursors walk the same sibling list.
    pub fn shares_list(&self, other: &OutlineIterator) -> bool {
        self.doc.same_document(&other.doc) && self.list == other.list
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    fn with_node<T>(&self, f: impl FnOnce(&OutlineNode) -> T) -> T {
        self.assert_valid();
        let tree = self.doc.outline();
        f(tree.node(self.list, self.index))
    }

    fn assert_valid(&self) {
        let len = self.len();
        assert!(
            self.index < len,
            "outline cursor exhausted (index {} of {})",
            self.index,
            len
        );
    }
}

impl fmt::Debug for OutlineIterator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineIterator")
            .field("list", &self.list)
            .field("index", &self.index)
            .finish()
    }
}
