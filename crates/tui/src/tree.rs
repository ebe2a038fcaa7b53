//! Flattened render model for one collection's item tree.
//!
//! The detail pane works off an ordered row list rebuilt from the item tree
//! plus the transient expansion set. Flattening is iterative, so nesting
//! depth is unbounded. Restoration walks the tree through
//! [`lumebar_types::find_path`] rather than querying rendered rows.

use std::collections::HashSet;

use lumebar_types::{Collection, Item, ItemKind, find_path};
use ratatui::style::Color;
use tracing::warn;

use crate::theme;

/// Badge computed from an item's context reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextBadge {
    pub label: String,
    pub icon: Option<String>,
    pub background: Color,
    pub color: Color,
}

/// One visible row of the detail pane.
#[derive(Debug, Clone)]
pub struct TreeRow {
    pub depth: usize,
    pub kind: RowKind,
}

#[derive(Debug, Clone)]
pub enum RowKind {
    Item(ItemRow),
    Text(String),
    Code(String),
    Action(ActionRow),
    EmptyNotice(String),
}

/// A rendered item title row.
#[derive(Debug, Clone)]
pub struct ItemRow {
    pub id: String,
    pub title: String,
    pub badge: Option<ContextBadge>,
    pub details: Option<String>,
    pub child_count: usize,
    pub expandable: bool,
    pub expanded: bool,
}

/// A rendered action button or link row.
#[derive(Debug, Clone)]
pub struct ActionRow {
    pub item_id: String,
    pub action_index: usize,
    pub text: String,
    pub icon: Option<String>,
    pub href: Option<String>,
    pub onclick: Option<String>,
    pub has_data: bool,
    pub pending: bool,
}

/// Outcome of toggling a disclosure row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Opened(String),
    Closed(String),
}

/// Transient view state for the active collection's tree. Reset on every
/// collection activation and on every data update; only the persisted
/// `open_item` id outlives it.
#[derive(Debug, Default)]
pub struct TreeView {
    pub rows: Vec<TreeRow>,
    pub selected: usize,
    pub scroll: usize,
    expanded: HashSet<String>,
    pending: HashSet<(String, usize)>,
}

impl TreeView {
    /// Drop all rows and transient state. Pending action markers clear here:
    /// this is the "fresh render" that makes buttons re-activatable.
    pub fn reset(&mut self) {
        self.rows.clear();
        self.selected = 0;
        self.scroll = 0;
        self.expanded.clear();
        self.pending.clear();
    }

    /// Rebuild rows from the collection and the current expansion set.
    pub fn rebuild(&mut self, collection: &Collection) {
        self.rows = flatten(collection, &self.expanded, &self.pending);
        self.selected = self.selected.min(self.rows.len().saturating_sub(1));
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            return;
        }
        let moved = if delta > 0 {
            self.selected.saturating_add(delta as usize)
        } else {
            self.selected.saturating_sub((-delta) as usize)
        };
        self.selected = moved.min(self.rows.len() - 1);
    }

    /// Keep the selected row inside the viewport of `height` rows.
    pub fn ensure_visible(&mut self, height: usize) {
        if height == 0 {
            return;
        }
        if self.selected < self.scroll {
            self.scroll = self.selected;
        } else if self.selected >= self.scroll + height {
            self.scroll = self.selected + 1 - height;
        }
    }

    /// Toggle the selected disclosure row, if it is one.
    pub fn toggle_selected(&mut self, collection: &Collection) -> Option<ToggleOutcome> {
        let row = self.rows.get(self.selected)?;
        let RowKind::Item(item_row) = &row.kind else {
            return None;
        };
        if !item_row.expandable {
            return None;
        }
        let id = item_row.id.clone();
        let outcome = if self.expanded.remove(&id) {
            ToggleOutcome::Closed(id)
        } else {
            self.expanded.insert(id.clone());
            ToggleOutcome::Opened(id)
        };
        self.rebuild(collection);
        Some(outcome)
    }

    /// The selected row's action, if the selection is on one.
    pub fn selected_action(&self) -> Option<&ActionRow> {
        match &self.rows.get(self.selected)?.kind {
            RowKind::Action(action) => Some(action),
            _ => None,
        }
    }

    /// Mark an action as pending until the next fresh render.
    pub fn mark_pending(&mut self, item_id: &str, action_index: usize) {
        self.pending.insert((item_id.to_string(), action_index));
    }

    /// Re-open the path to a persisted open item after a programmatic
    /// activation: force every ancestor disclosure open in root-to-target
    /// order, then select the target so rendering scrolls it into view.
    /// A stale id is a silent miss.
    pub fn restore_open_path(&mut self, collection: &Collection, open_id: &str) -> bool {
        let Some(path) = find_path(&collection.items, open_id) else {
            return false;
        };
        let mut siblings = &collection.items;
        for index in &path {
            let Some(item) = siblings.get(*index) else {
                return false;
            };
            if item.kind == ItemKind::Expandable
                && let Some(id) = &item.id
            {
                self.expanded.insert(id.clone());
            }
            siblings = &item.items;
        }
        self.rebuild(collection);
        if let Some(row_index) = self.rows.iter().position(
            |row| matches!(&row.kind, RowKind::Item(item_row) if item_row.id == open_id),
        ) {
            self.selected = row_index;
        }
        true
    }
}

/// Flatten a collection into detail rows, honoring the expansion set.
///
/// Row order per item: title, then (when expanded) body text, code, and
/// children, then the item's actions. Actions are visible whenever their item
/// is, expanded or not.
pub fn flatten(
    collection: &Collection,
    expanded: &HashSet<String>,
    pending: &HashSet<(String, usize)>,
) -> Vec<TreeRow> {
    let mut rows = Vec::new();

    if collection.items.is_empty() {
        let notice = collection.empty.clone().unwrap_or_else(|| "No items".to_string());
        rows.push(TreeRow {
            depth: 0,
            kind: RowKind::EmptyNotice(notice),
        });
        return rows;
    }

    enum Entry<'a> {
        Node { item: &'a Item, depth: usize },
        Actions { item: &'a Item, depth: usize },
    }

    let mut stack: Vec<Entry> = collection
        .items
        .iter()
        .rev()
        .map(|item| Entry::Node { item, depth: 0 })
        .collect();

    while let Some(entry) = stack.pop() {
        match entry {
            Entry::Node { item, depth } => {
                let id = item.id.clone().unwrap_or_default();
                let expandable = item.kind == ItemKind::Expandable;
                let is_expanded = expandable && expanded.contains(&id);

                rows.push(TreeRow {
                    depth,
                    kind: RowKind::Item(ItemRow {
                        id,
                        title: item.title.clone(),
                        badge: resolve_badge(collection, item),
                        details: item.details.as_ref().map(ToString::to_string),
                        child_count: item.items.len(),
                        expandable,
                        expanded: is_expanded,
                    }),
                });

                if !item.actions.is_empty() {
                    stack.push(Entry::Actions {
                        item,
                        depth: depth + 1,
                    });
                }
                if is_expanded {
                    if let Some(text) = &item.text {
                        for line in text.lines() {
                            rows.push(TreeRow {
                                depth: depth + 1,
                                kind: RowKind::Text(line.to_string()),
                            });
                        }
                    }
                    if let Some(code) = &item.code {
                        for line in code.lines() {
                            rows.push(TreeRow {
                                depth: depth + 1,
                                kind: RowKind::Code(line.to_string()),
                            });
                        }
                    }
                    for child in item.items.iter().rev() {
                        stack.push(Entry::Node {
                            item: child,
                            depth: depth + 1,
                        });
                    }
                }
            }
            Entry::Actions { item, depth } => {
                let id = item.id.clone().unwrap_or_default();
                for (index, action) in item.actions.iter().enumerate() {
                    rows.push(TreeRow {
                        depth,
                        kind: RowKind::Action(ActionRow {
                            item_id: id.clone(),
                            action_index: index,
                            text: action.text.clone(),
                            icon: action.icon.clone(),
                            href: action.href.clone(),
                            onclick: action.onclick.clone(),
                            has_data: !action.data.is_empty(),
                            pending: pending.contains(&(id.clone(), index)),
                        }),
                    });
                }
            }
        }
    }

    rows
}

/// Resolve an item's context key into a badge. An unknown key logs a
/// diagnostic and renders no badge.
fn resolve_badge(collection: &Collection, item: &Item) -> Option<ContextBadge> {
    let key = item.context.as_deref()?;
    let Some(context) = collection.contexts.get(key) else {
        warn!(context = key, collection = %collection.name, "Context not found");
        return None;
    };
    Some(ContextBadge {
        label: context.title.clone().unwrap_or_else(|| key.to_string()),
        icon: context.icon.clone(),
        background: theme::context_color(context.background.as_deref(), theme::DIM),
        color: theme::context_color(context.color.as_deref(), theme::BADGE_FG),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumebar_types::assign_ids;

    fn collection(json: &str) -> Collection {
        let mut collection: Collection = serde_json::from_str(json).unwrap();
        assign_ids(&mut collection.items, &[]);
        collection
    }

    fn labels(rows: &[TreeRow]) -> Vec<String> {
        rows.iter()
            .map(|row| match &row.kind {
                RowKind::Item(item) => format!("item:{}", item.title),
                RowKind::Text(text) => format!("text:{text}"),
                RowKind::Code(code) => format!("code:{code}"),
                RowKind::Action(action) => format!("action:{}", action.text),
                RowKind::EmptyNotice(notice) => format!("empty:{notice}"),
            })
            .collect()
    }

    #[test]
    fn collapsed_items_render_as_single_rows() {
        let collection = collection(
            r#"{"name":"Errors","items":[
                {"title":"Parse error","text":"line 3"},
                {"title":"Plain"}]}"#,
        );
        let rows = flatten(&collection, &HashSet::new(), &HashSet::new());
        assert_eq!(labels(&rows), ["item:Parse error", "item:Plain"]);
        let RowKind::Item(first) = &rows[0].kind else {
            panic!("expected item row");
        };
        assert!(first.expandable && !first.expanded);
    }

    #[test]
    fn expanded_rows_interleave_body_children_then_actions() {
        let collection = collection(
            r#"{"name":"Build","items":[{
                "title":"root",
                "text":"one\ntwo",
                "code":"let x = 1;",
                "items":[{"title":"child"}],
                "actions":[{"text":"Fix","data":{"action":"fix"}}]
            }]}"#,
        );
        let root_id = collection.items[0].id.clone().unwrap();
        let expanded = HashSet::from([root_id]);
        let rows = flatten(&collection, &expanded, &HashSet::new());
        assert_eq!(
            labels(&rows),
            [
                "item:root",
                "text:one",
                "text:two",
                "code:let x = 1;",
                "item:child",
                "action:Fix"
            ]
        );
        assert_eq!(rows[4].depth, 1);
    }

    #[test]
    fn actions_stay_visible_while_collapsed() {
        let collection = collection(
            r#"{"name":"Build","items":[{
                "title":"root","text":"body",
                "actions":[{"text":"Open","href":"https://example.com"}]
            }]}"#,
        );
        let rows = flatten(&collection, &HashSet::new(), &HashSet::new());
        assert_eq!(labels(&rows), ["item:root", "action:Open"]);
    }

    #[test]
    fn empty_collection_renders_its_notice() {
        let collection = collection(r#"{"name":"Errors","empty":"No errors found","items":[]}"#);
        let rows = flatten(&collection, &HashSet::new(), &HashSet::new());
        assert_eq!(labels(&rows), ["empty:No errors found"]);
    }

    #[test]
    fn unknown_context_renders_no_badge() {
        let collection = collection(
            r#"{"name":"Errors","items":[{"title":"x","context":"missing"}]}"#,
        );
        let rows = flatten(&collection, &HashSet::new(), &HashSet::new());
        let RowKind::Item(item) = &rows[0].kind else {
            panic!("expected item row");
        };
        assert!(item.badge.is_none());
    }

    #[test]
    fn known_context_resolves_palette_colors() {
        let collection = collection(
            r#"{"name":"Errors",
                "contexts":{"fatal":{"background":"error","icon":"bug"}},
                "items":[{"title":"x","context":"fatal"}]}"#,
        );
        let rows = flatten(&collection, &HashSet::new(), &HashSet::new());
        let RowKind::Item(item) = &rows[0].kind else {
            panic!("expected item row");
        };
        let badge = item.badge.as_ref().unwrap();
        assert_eq!(badge.label, "fatal");
        assert_eq!(badge.background, theme::context_color(Some("error"), theme::DIM));
    }

    #[test]
    fn restore_opens_every_ancestor_and_selects_the_target() {
        let collection = collection(
            r#"{"name":"Build","items":[{
                "title":"a","text":"body",
                "items":[{"title":"b","items":[{"title":"c","code":"x"}]}]
            }]}"#,
        );
        let target = collection.items[0].items[0].items[0].id.clone().unwrap();

        let mut view = TreeView::default();
        view.rebuild(&collection);
        assert!(view.restore_open_path(&collection, &target));

        let visible = labels(&view.rows);
        assert!(visible.contains(&"item:c".to_string()), "target row visible: {visible:?}");
        let RowKind::Item(selected) = &view.rows[view.selected].kind else {
            panic!("expected item row selected");
        };
        assert_eq!(selected.id, target);
    }

    #[test]
    fn restore_misses_silently_on_stale_ids() {
        let collection = collection(r#"{"name":"Build","items":[{"title":"a","text":"t"}]}"#);
        let mut view = TreeView::default();
        view.rebuild(&collection);
        assert!(!view.restore_open_path(&collection, "id_gone"));
        assert_eq!(labels(&view.rows), ["item:a"]);
    }

    #[test]
    fn toggle_reports_open_and_close() {
        let collection = collection(r#"{"name":"Build","items":[{"title":"a","text":"t"}]}"#);
        let id = collection.items[0].id.clone().unwrap();
        let mut view = TreeView::default();
        view.rebuild(&collection);

        assert_eq!(view.toggle_selected(&collection), Some(ToggleOutcome::Opened(id.clone())));
        assert_eq!(labels(&view.rows), ["item:a", "text:t"]);
        assert_eq!(view.toggle_selected(&collection), Some(ToggleOutcome::Closed(id)));
        assert_eq!(labels(&view.rows), ["item:a"]);
    }

    #[test]
    fn leaf_rows_do_not_toggle() {
        let collection = collection(r#"{"name":"Build","items":[{"title":"a"}]}"#);
        let mut view = TreeView::default();
        view.rebuild(&collection);
        assert_eq!(view.toggle_selected(&collection), None);
    }

    #[test]
    fn pending_marks_survive_rebuild_but_not_reset() {
        let collection = collection(
            r#"{"name":"Build","items":[{
                "title":"a","actions":[{"text":"Fix","data":{"k":"v"}}]}]}"#,
        );
        let id = collection.items[0].id.clone().unwrap();
        let mut view = TreeView::default();
        view.rebuild(&collection);
        view.mark_pending(&id, 0);
        view.rebuild(&collection);
        let RowKind::Action(action) = &view.rows[1].kind else {
            panic!("expected action row");
        };
        assert!(action.pending);

        view.reset();
        view.rebuild(&collection);
        let RowKind::Action(action) = &view.rows[1].kind else {
            panic!("expected action row");
        };
        assert!(!action.pending);
    }

    #[test]
    fn ensure_visible_scrolls_the_selection_into_view() {
        let mut view = TreeView::default();
        view.rows = (0..20)
            .map(|i| TreeRow {
                depth: 0,
                kind: RowKind::Text(format!("{i}")),
            })
            .collect();
        view.selected = 15;
        view.ensure_visible(5);
        assert_eq!(view.scroll, 11);
        view.selected = 2;
        view.ensure_visible(5);
        assert_eq!(view.scroll, 2);
    }
}
