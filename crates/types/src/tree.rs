//! Pure passes over the recursive item tree.
//!
//! Rendering and restoration both key off item ids, so the assignment pass
//! must run once per data load, before the first render. Restoration walks
//! the tree through [`find_path`] rather than querying any display structure.

use crate::id::stable_id;
use crate::model::Item;

/// Assign stable ids and render kinds to every item, in document order.
///
/// An item with a preset `id` keeps it and contributes that id to its
/// descendants' path; an item without one contributes its `title` and
/// receives `stable_id` of the accumulated path. Each branch carries an
/// independent path: sibling recursion never leaks accumulated titles.
///
/// Idempotent: re-running over an unmutated tree changes no id.
pub fn assign_ids(items: &mut [Item], ancestors: &[String]) {
    for item in items {
        let mut path = ancestors.to_vec();
        match &item.id {
            Some(preset) => path.push(preset.clone()),
            None => {
                path.push(item.title.clone());
                item.id = Some(stable_id(&path));
            }
        }
        item.kind = item.classify();
        assign_ids(&mut item.items, &path);
    }
}

/// Depth-first index path to the item carrying `id`, or `None` when the id is
/// not present in this tree (a stale reference — a silent miss, not an
/// error). The walk is iterative, so arbitrarily deep trees are fine.
pub fn find_path(items: &[Item], id: &str) -> Option<Vec<usize>> {
    let mut stack: Vec<(Vec<usize>, &[Item])> = vec![(Vec::new(), items)];
    while let Some((prefix, siblings)) = stack.pop() {
        for (index, item) in siblings.iter().enumerate() {
            if item.id.as_deref() == Some(id) {
                let mut path = prefix.clone();
                path.push(index);
                return Some(path);
            }
            if !item.items.is_empty() {
                let mut child_prefix = prefix.clone();
                child_prefix.push(index);
                stack.push((child_prefix, &item.items));
            }
        }
    }
    None
}

/// Resolve an index path produced by [`find_path`] back to its item.
pub fn item_at<'a>(items: &'a [Item], path: &[usize]) -> Option<&'a Item> {
    let (first, rest) = path.split_first()?;
    let item = items.get(*first)?;
    if rest.is_empty() {
        Some(item)
    } else {
        item_at(&item.items, rest)
    }
}
