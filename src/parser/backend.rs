//! Object graph helpers over `lopdf`.
//!
//! Everything that walks raw dictionaries goes through these functions so
//! the rest of the crate never deals with indirect references by hand.

use std::collections::HashSet;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

/// Maximum reference chain / tree depth followed before giving up.
const MAX_DEPTH: usize = 32;

/// Follow indirect references until a direct object is reached.
pub(crate) fn resolve<'a>(doc: &'a LopdfDocument, mut obj: &'a Object) -> Option<&'a Object> {
    for _ in 0..MAX_DEPTH {
        match obj {
            Object::Reference(id) => obj = doc.get_object(*id).ok()?,
            direct => return Some(direct),
        }
    }
    log::warn!("Reference chain longer than {} objects", MAX_DEPTH);
    None
}

/// Resolve an object to a dictionary. Streams yield their stream dictionary.
pub(crate) fn resolve_dict<'a>(doc: &'a LopdfDocument, obj: &'a Object) -> Option<&'a Dictionary> {
    match resolve(doc, obj)? {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

/// Look up `key` in `dict`, resolving the value.
pub(crate) fn dict_get<'a>(
    doc: &'a LopdfDocument,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    resolve(doc, dict.get(key).ok()?)
}

/// Look up `key` in `dict` and resolve it to a dictionary.
pub(crate) fn dict_get_dict<'a>(
    doc: &'a LopdfDocument,
    dict: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Dictionary> {
    resolve_dict(doc, dict.get(key).ok()?)
}

/// The document catalog (`/Root`).
pub(crate) fn catalog(doc: &LopdfDocument) -> Option<&Dictionary> {
    dict_get_dict(doc, &doc.trailer, b"Root")
}

/// The document information dictionary (`/Info`).
pub(crate) fn info_dict(doc: &LopdfDocument) -> Option<&Dictionary> {
    dict_get_dict(doc, &doc.trailer, b"Info")
}

/// Look up a page attribute, walking `/Parent` links for inheritable keys.
pub(crate) fn inherited<'a>(
    doc: &'a LopdfDocument,
    page_id: ObjectId,
    key: &[u8],
) -> Option<&'a Object> {
    let mut node = doc.get_dictionary(page_id).ok()?;
    for _ in 0..MAX_DEPTH {
        if let Some(value) = dict_get(doc, node, key) {
            return Some(value);
        }
        node = dict_get_dict(doc, node, b"Parent")?;
    }
    None
}

/// Name object as a UTF-8 string.
pub(crate) fn name_str(obj: &Object) -> Option<String> {
    match obj {
        Object::Name(name) => Some(String::from_utf8_lossy(name).into_owned()),
        _ => None,
    }
}

/// Numeric value of an integer or real object.
pub(crate) fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Integer value of a resolved object.
pub(crate) fn integer(obj: &Object) -> Option<i64> {
    match obj {
        Object::Integer(i) => Some(*i),
        _ => None,
    }
}

/// Four-number rectangle, normalized so that `x0 <= x1` and `y0 <= y1`.
pub(crate) fn rect(doc: &LopdfDocument, obj: &Object) -> Option<[f32; 4]> {
    let Object::Array(items) = resolve(doc, obj)? else {
        return None;
    };
    if items.len() != 4 {
        return None;
    }
    let mut values = [0.0f32; 4];
    for (slot, item) in values.iter_mut().zip(items) {
        *slot = number(resolve(doc, item)?)?;
    }
    let [a, b, c, d] = values;
    Some([a.min(c), b.min(d), a.max(c), b.max(d)])
}

/// Find `key` in a name tree rooted at `root`.
pub(crate) fn name_tree_lookup<'a>(
    doc: &'a LopdfDocument,
    root: &'a Dictionary,
    key: &[u8],
) -> Option<&'a Object> {
    name_tree_lookup_at(doc, root, key, 0, &mut HashSet::new())
}

fn name_tree_lookup_at<'a>(
    doc: &'a LopdfDocument,
    node: &'a Dictionary,
    key: &[u8],
    depth: usize,
    visited: &mut HashSet<ObjectId>,
) -> Option<&'a Object> {
    if depth > MAX_DEPTH {
        return None;
    }

    if let Some(Object::Array(names)) = dict_get(doc, node, b"Names") {
        for pair in names.chunks_exact(2) {
            if let Some(Object::String(name, _)) = resolve(doc, &pair[0]) {
                if name.as_slice() == key {
                    return resolve(doc, &pair[1]);
                }
            }
        }
    }

    let Some(Object::Array(kids)) = dict_get(doc, node, b"Kids") else {
        return None;
    };
    for kid in kids {
        let Some(kid) = tree_kid(doc, kid, visited) else {
            continue;
        };
        if !limits_contain(doc, kid, key) {
            continue;
        }
        if let Some(found) = name_tree_lookup_at(doc, kid, key, depth + 1, visited) {
            return Some(found);
        }
    }
    None
}

/// Resolve a `/Kids` entry of a name or number tree; a node reached twice
/// is skipped.
fn tree_kid<'a>(
    doc: &'a LopdfDocument,
    kid: &'a Object,
    visited: &mut HashSet<ObjectId>,
) -> Option<&'a Dictionary> {
    if let Object::Reference(id) = kid {
        if !visited.insert(*id) {
            log::warn!("Tree node {} {} R reached twice, skipping", id.0, id.1);
            return None;
        }
    }
    resolve_dict(doc, kid)
}

/// `/Limits` check for an intermediate name tree node; nodes without limits
/// are always searched.
fn limits_contain(doc: &LopdfDocument, node: &Dictionary, key: &[u8]) -> bool {
    let Some(Object::Array(limits)) = dict_get(doc, node, b"Limits") else {
        return true;
    };
    match (limits.first(), limits.get(1)) {
        (Some(Object::String(low, _)), Some(Object::String(high, _))) => {
            low.as_slice() <= key && key <= high.as_slice()
        }
        _ => true,
    }
}

/// Flatten a number tree into `(key, value)` pairs sorted by key.
pub(crate) fn number_tree_entries<'a>(
    doc: &'a LopdfDocument,
    root: &'a Dictionary,
) -> Vec<(i64, &'a Object)> {
    let mut entries = Vec::new();
    collect_number_tree(doc, root, 0, &mut HashSet::new(), &mut entries);
    entries.sort_by_key(|(key, _)| *key);
    entries
}

fn collect_number_tree<'a>(
    doc: &'a LopdfDocument,
    node: &'a Dictionary,
    depth: usize,
    visited: &mut HashSet<ObjectId>,
    out: &mut Vec<(i64, &'a Object)>,
) {
    if depth > MAX_DEPTH {
        return;
    }

    if let Some(Object::Array(nums)) = dict_get(doc, node, b"Nums") {
        for pair in nums.chunks_exact(2) {
            let key = resolve(doc, &pair[0]).and_then(integer);
            let value = resolve(doc, &pair[1]);
            if let (Some(key), Some(value)) = (key, value) {
                out.push((key, value));
            }
        }
    }

    if let Some(Object::Array(kids)) = dict_get(doc, node, b"Kids") {
        for kid in kids {
            if let Some(kid) = tree_kid(doc, kid, visited) {
                collect_number_tree(doc, kid, depth + 1, visited, out);
            }
        }
    }
}
