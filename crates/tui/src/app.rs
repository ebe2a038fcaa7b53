//! Application state and logic for the Lume bar TUI.
//!
//! `App` is the bar controller: it owns the collections for the current data
//! load, the single active tab, the bar open/closed state, and the detail
//! pane's tree view. Messages update the state machine; side effects the
//! runtime must perform come back as `Effect`s.

use std::collections::HashMap;
use std::sync::Arc;

use lumebar_types::{ActionMessage, BarData, Collection, assign_ids, find_path, item_at};
use lumebar_util::{UiStateError, UiStateStore};
use tracing::{debug, warn};

use crate::tree::{ActionRow, ToggleOutcome, TreeView};

/// Messages that can be sent to update the application state.
#[derive(Debug, Clone)]
pub enum Msg {
    /// Toggle the bar open/closed.
    ToggleBar,
    /// User activated the tab at the index. Re-activating the active tab
    /// toggles it off; activating another tab switches directly.
    ActivateTab(usize),
    /// Move the detail-pane selection by the given offset.
    MoveSelection(isize),
    /// Toggle the selected disclosure or activate the selected action.
    Activate,
    /// A data load completed.
    DataLoaded { generation: u64, data: BarData },
    /// A data load failed.
    DataFailed { generation: u64, error: String },
    /// Resolved icon glyphs arrived.
    IconsResolved(HashMap<String, String>),
    /// Periodic UI tick.
    Tick,
    /// Terminal resized.
    Resize(u16, u16),
}

/// Side effects the runtime performs on behalf of the state machine.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Deliver an action payload to the outbound channel, exactly once.
    SendAction(ActionMessage),
    /// Copy a link action's URL to the clipboard.
    CopyLink(String),
    /// Surface a host-interpreted handler reference.
    InvokeHandler(String),
    /// Resolve the given icon names into glyphs.
    ResolveIcons(Vec<String>),
    /// Re-fetch the configured data source.
    ReloadData,
    /// Leave the application.
    Quit,
}

/// The bar controller state.
pub struct App {
    /// Collections for the current data load, replaced wholesale on update.
    pub collections: Vec<Collection>,
    /// Index of the active collection tab; at most one tab is pressed.
    pub active: Option<usize>,
    /// Bar open/closed; independent of tab state and persisted.
    pub bar_open: bool,
    /// Detail pane view state for the active collection.
    pub tree: TreeView,
    /// Resolved icon glyphs by name.
    pub icons: HashMap<String, String>,
    /// Transient status line shown in the tab strip.
    pub status: Option<String>,
    /// Injected persistence capability.
    pub ui_state: Arc<UiStateStore>,
    generation: u64,
}

impl App {
    /// Create a controller over an injected state store. The persisted
    /// closed flag decides the initial bar state; collections arrive with
    /// the first data load.
    pub fn new(ui_state: Arc<UiStateStore>) -> Self {
        Self {
            collections: Vec::new(),
            active: None,
            bar_open: !ui_state.is_closed(),
            tree: TreeView::default(),
            icons: HashMap::new(),
            status: None,
            ui_state,
            generation: 0,
        }
    }

    /// Start a new data load, superseding any in-flight one. Completions
    /// carrying an older generation are discarded.
    pub fn begin_load(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Update the application state based on a message.
    pub fn update(&mut self, msg: Msg) -> Vec<Effect> {
        let mut effects = Vec::new();
        match msg {
            Msg::ToggleBar => {
                self.bar_open = !self.bar_open;
                let closed = !self.bar_open;
                self.persist(|state| state.set_closed(closed));
            }
            Msg::ActivateTab(index) => self.handle_tab_activation(index),
            Msg::MoveSelection(delta) => {
                if self.active.is_some() {
                    self.tree.move_selection(delta);
                }
            }
            Msg::Activate => self.handle_activate(&mut effects),
            Msg::DataLoaded { generation, data } => {
                if generation != self.generation {
                    debug!(generation, "Discarding stale data load");
                } else {
                    effects.extend(self.update_data(data));
                }
            }
            Msg::DataFailed { generation, error } => {
                if generation != self.generation {
                    debug!(generation, "Discarding stale data failure");
                } else {
                    warn!(error = %error, "Failed to load data");
                    self.status = Some(format!("Failed to load data: {error}"));
                }
            }
            Msg::IconsResolved(resolved) => {
                self.icons.extend(resolved);
            }
            Msg::Tick | Msg::Resize(_, _) => {}
        }
        effects
    }

    /// Replace all collections with a new data load. Runs the id-assignment
    /// pass per collection, rebuilds the tab strip, and replays the
    /// persisted active collection, restoring the open-item path.
    pub fn update_data(&mut self, data: BarData) -> Vec<Effect> {
        let mut collections = data.collections;
        for collection in &mut collections {
            assign_ids(&mut collection.items, &[]);
        }
        self.collections = collections;
        self.active = None;
        self.tree.reset();
        self.status = None;

        // Programmatic replay: unlike a manual tab activation this does not
        // clear `open_item`, so restoration can find the persisted path.
        if let Some(name) = self.ui_state.active_collection()
            && let Some(index) = self.collections.iter().position(|c| c.name == name)
        {
            self.activate_collection(index);
            if let Some(open_id) = self.ui_state.open_item()
                && !self.tree.restore_open_path(&self.collections[index], &open_id)
            {
                debug!(id = %open_id, "Persisted open item not in current tree");
            }
        }

        vec![Effect::ResolveIcons(icon_names(&self.collections))]
    }

    /// Index of the tab `delta` steps from the active one, wrapping.
    pub fn neighbor_tab(&self, delta: isize) -> Option<usize> {
        if self.collections.is_empty() {
            return None;
        }
        let len = self.collections.len() as isize;
        let current = match self.active {
            Some(index) => index as isize,
            None if delta > 0 => -1,
            None => 0,
        };
        Some((current + delta).rem_euclid(len) as usize)
    }

    /// The active collection, if a tab is pressed.
    pub fn active_collection(&self) -> Option<&Collection> {
        self.active.and_then(|index| self.collections.get(index))
    }

    fn handle_tab_activation(&mut self, index: usize) {
        if index >= self.collections.len() {
            return;
        }
        // Manual navigation resets scope: the open item is cleared before the
        // activation runs, so restoration never fires on a tab click.
        self.persist(|state| state.clear_open_item());

        if self.active == Some(index) {
            self.active = None;
            self.tree.reset();
            self.persist(|state| state.clear_active_collection());
        } else {
            self.activate_collection(index);
            let name = self.collections[index].name.clone();
            self.persist(|state| state.set_active_collection(&name));
        }
    }

    fn activate_collection(&mut self, index: usize) {
        self.active = Some(index);
        self.tree.reset();
        self.tree.rebuild(&self.collections[index]);
    }

    fn handle_activate(&mut self, effects: &mut Vec<Effect>) {
        let Some(index) = self.active else {
            return;
        };
        if let Some(action) = self.tree.selected_action().cloned() {
            self.activate_action(index, action, effects);
            return;
        }
        match self.tree.toggle_selected(&self.collections[index]) {
            Some(ToggleOutcome::Opened(id)) => {
                self.persist(|state| state.set_open_item(&id));
            }
            Some(ToggleOutcome::Closed(_)) => {
                self.persist(|state| state.clear_open_item());
            }
            None => {}
        }
    }

    fn activate_action(&mut self, index: usize, action: ActionRow, effects: &mut Vec<Effect>) {
        if let Some(href) = action.href {
            effects.push(Effect::CopyLink(href));
            return;
        }
        if let Some(handler) = action.onclick {
            effects.push(Effect::InvokeHandler(handler));
            return;
        }
        if !action.has_data || action.pending {
            // Pending buttons stay inert until a fresh render replaces them.
            return;
        }

        let collection = &self.collections[index];
        let Some(path) = find_path(&collection.items, &action.item_id) else {
            return;
        };
        let Some(item) = item_at(&collection.items, &path) else {
            return;
        };
        let Some(source_action) = item.actions.get(action.action_index) else {
            return;
        };
        let message = ActionMessage {
            item: item.clone(),
            data: source_action.data.clone(),
        };
        self.tree.mark_pending(&action.item_id, action.action_index);
        self.tree.rebuild(&self.collections[index]);
        effects.push(Effect::SendAction(message));
    }

    fn persist<F>(&self, op: F)
    where
        F: FnOnce(&UiStateStore) -> Result<(), UiStateError>,
    {
        if let Err(error) = op(&self.ui_state) {
            warn!(error = %error, "Failed to persist ui state");
        }
    }
}

/// Every icon name the data set references, plus the bar's own toggle pair.
fn icon_names(collections: &[Collection]) -> Vec<String> {
    let mut names = vec!["arrows-in-simple".to_string(), "arrows-out-simple".to_string()];
    for collection in collections {
        if let Some(icon) = &collection.icon {
            names.push(icon.clone());
        }
        for context in collection.contexts.values() {
            if let Some(icon) = &context.icon {
                names.push(icon.clone());
            }
        }
        let mut stack: Vec<&lumebar_types::Item> = collection.items.iter().collect();
        while let Some(item) = stack.pop() {
            for action in &item.actions {
                if let Some(icon) = &action.icon {
                    names.push(icon.clone());
                }
            }
            stack.extend(item.items.iter());
        }
    }
    names.sort();
    names.dedup();
    names
}
