//! Page-scope controller
//!
//! [`WeaveUi`] owns every control found by the initialization scan together
//! with the preference synchronizer and the host bridge. Each reaction (an
//! input event, an API call, a host message) runs to completion inside one
//! `&mut self` call: state is mutated, rendered, then published.

use crate::config::WeaveConfig;
use crate::scan::{ItemScan, PageScan, DROPDOWN_CLASS};
use crate::selection::{Selection, SelectionChanges, SelectionMode};
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use weave_bridge::{forward_to_host, BridgeOutcome, HostBridge, HostChannel};
use weave_core::toggle::Transitions;
use weave_core::{
    BroadcastBus, ChangeEvent, ControlId, EventKind, EventPayload, GroupChange, GroupSet,
    InputAction, InputEvent, KeyCode, MemoryRenderer, Renderer, Result, Source, SubscriptionId,
    ToggleKind, ToggleSet, ToggleSpec, ToggleTransition, VisualState, WeaveError,
};
use weave_theme::{
    Density, MemoryStorage, Mirrors, PreferenceKey, PreferenceStore, PreferenceSynchronizer,
    PreferenceUpdate, Preferences, StateInspector, StorageBackend, Theme,
};

/// Version reported with the ready event
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// A dropdown's item list
#[derive(Clone, Debug)]
struct Menu {
    binding: Option<PreferenceKey>,
    selection: Selection,
}

/// Container of a selectable item
#[derive(Clone, Debug)]
enum Owner {
    Menu(ControlId),
    List(ControlId),
    Tabs(ControlId),
}

pub struct WeaveUi<S = MemoryStorage, R = MemoryRenderer> {
    sync: PreferenceSynchronizer<S>,
    bridge: HostBridge,
    renderer: R,
    toggles: ToggleSet,
    groups: GroupSet,
    menus: IndexMap<ControlId, Menu>,
    lists: IndexMap<ControlId, Selection>,
    tab_strips: IndexMap<ControlId, Selection>,
    owners: FxHashMap<ControlId, Owner>,
}

impl WeaveUi<MemoryStorage, MemoryRenderer> {
    /// Controller with volatile storage and a recording renderer
    pub fn in_memory() -> Self {
        Self::new(PreferenceStore::in_memory(), Mirrors::default(), MemoryRenderer::new())
    }
}

impl<S: StorageBackend, R: Renderer> WeaveUi<S, R> {
    pub fn new(store: PreferenceStore<S>, mirrors: Mirrors, renderer: R) -> Self {
        Self::with_bus(store, mirrors, Arc::new(BroadcastBus::new()), renderer)
    }

    /// Controller publishing on an existing bus
    pub fn with_bus(
        store: PreferenceStore<S>,
        mirrors: Mirrors,
        bus: Arc<BroadcastBus>,
        renderer: R,
    ) -> Self {
        Self {
            sync: PreferenceSynchronizer::new(store, mirrors, bus),
            bridge: HostBridge::new(),
            renderer,
            toggles: ToggleSet::new(),
            groups: GroupSet::new(),
            menus: IndexMap::new(),
            lists: IndexMap::new(),
            tab_strips: IndexMap::new(),
            owners: FxHashMap::default(),
        }
    }

    pub fn from_config(config: &WeaveConfig, backend: S, renderer: R) -> Self {
        let mut ui = Self::new(
            PreferenceStore::new(backend),
            config.mirrors.to_mirrors(),
            renderer,
        );
        if !config.host.enabled {
            ui.bridge.disable();
        }
        ui
    }

    pub fn bus(&self) -> &Arc<BroadcastBus> {
        self.sync.bus()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn store(&self) -> &PreferenceStore<S> {
        self.sync.store()
    }

    pub fn toggles(&self) -> &ToggleSet {
        &self.toggles
    }

    pub fn groups(&self) -> &GroupSet {
        &self.groups
    }

    pub fn list(&self, id: &str) -> Option<&Selection> {
        self.lists.get(id)
    }

    pub fn tab_strip(&self, id: &str) -> Option<&Selection> {
        self.tab_strips.get(id)
    }

    /// Items of a dropdown
    pub fn menu(&self, id: &str) -> Option<&Selection> {
        self.menus.get(id).map(|menu| &menu.selection)
    }

    // =========================================================================
    // Initialization
    // =========================================================================

    /// Take over the controls of a scanned page, synchronize the initial
    /// preferences, and announce readiness.
    pub fn initialize(&mut self, scan: &PageScan) -> Preferences {
        let prefs = self
            .sync
            .sync_initial(&mut self.renderer, scan.detect_initial_state());

        for dropdown in &scan.dropdowns {
            let transition = self.toggles.register(
                ToggleSpec::new(dropdown.id.clone(), ToggleKind::Dropdown)
                    .exclusive_in(DROPDOWN_CLASS)
                    .open(dropdown.open),
            );
            self.render_toggle(&transition);

            let id = dropdown.id.clone();
            let selection = self.collect(&id, &dropdown.items, SelectionMode::Single, Owner::Menu);
            self.menus.insert(
                id,
                Menu {
                    binding: dropdown.binding,
                    selection,
                },
            );
        }

        for accordion in &scan.accordions {
            let mut spec = ToggleSpec::new(accordion.id.clone(), ToggleKind::Accordion)
                .open(accordion.open)
                .label(accordion.header.as_str());
            if let Some(class) = &accordion.exclusive_in {
                spec = spec.exclusive_in(class.as_str());
            }
            let transition = self.toggles.register(spec);
            self.render_toggle(&transition);
        }

        for section in &scan.sections {
            let transition = self.toggles.register(
                ToggleSpec::new(section.id.clone(), ToggleKind::Section).open(!section.collapsed),
            );
            self.render_toggle(&transition);
        }

        for list in &scan.lists {
            let id = list.id.clone();
            let selection = self.collect(&id, &list.items, list.mode, Owner::List);
            self.lists.insert(id, selection);
        }

        for strip in &scan.tab_strips {
            let id = strip.id.clone();
            let selection = self.collect(&id, &strip.tabs, SelectionMode::Single, Owner::Tabs);
            self.tab_strips.insert(id, selection);
        }

        self.sync_bound_menus(prefs);

        for group in &scan.checkbox_groups {
            for member in &group.members {
                self.groups
                    .declare(group.parent.clone(), member.id.clone(), member.checked);
            }
        }
        let snapshots: Vec<GroupChange> = self.groups.groups().map(|g| g.snapshot()).collect();
        for change in &snapshots {
            self.announce_group(change, None);
        }

        tracing::info!(
            "Weave UI initialized with theme: {}, density: {}",
            prefs.theme,
            prefs.density
        );
        let timestamp_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_millis() as u64)
            .unwrap_or_default();
        self.publish(
            EventKind::UiReady,
            EventPayload::Ready {
                version: VERSION.to_string(),
                timestamp_ms,
            },
            None,
        );
        prefs
    }

    fn collect(
        &mut self,
        container: &ControlId,
        items: &[ItemScan],
        mode: SelectionMode,
        owner: fn(ControlId) -> Owner,
    ) -> Selection {
        let mut selection = Selection::new(container.clone(), mode);
        for item in items {
            let id = ControlId::from(item.id_in(container.as_str()));
            selection.push(id.clone(), item.value(), item.text.as_str(), item.selected);
            self.owners.insert(id, owner(container.clone()));
        }
        for (id, choice) in selection.items() {
            self.renderer.apply_visual_state(
                id,
                &VisualState::Active {
                    active: choice.selected,
                },
            );
        }
        selection
    }

    // =========================================================================
    // Preferences
    // =========================================================================

    pub fn set_theme(&mut self, theme: &str) -> Result<Preferences> {
        self.apply(PreferenceUpdate::theme(theme), Source::Api)
    }

    pub fn set_density(&mut self, density: &str) -> Result<Preferences> {
        self.apply(PreferenceUpdate::density(density), Source::Api)
    }

    /// Apply both values at once; either being invalid rejects the pair.
    pub fn set_theme_and_density(&mut self, theme: &str, density: &str) -> Result<Preferences> {
        self.apply(PreferenceUpdate::both(theme, density), Source::Api)
    }

    pub fn current_theme(&self) -> Theme {
        self.sync.current().theme
    }

    pub fn current_density(&self) -> Density {
        self.sync.current().density
    }

    pub fn current_preferences(&self) -> Preferences {
        self.sync.current()
    }

    fn apply(&mut self, update: PreferenceUpdate<'_>, source: Source) -> Result<Preferences> {
        let prefs = self.sync.apply(&mut self.renderer, update, source)?;
        self.sync_bound_menus(prefs);
        Ok(prefs)
    }

    /// Keep the selected item of every preference-bound dropdown in step with
    /// the current pair.
    fn sync_bound_menus(&mut self, prefs: Preferences) {
        let mirrors = self.sync.mirrors();
        for (id, menu) in &mut self.menus {
            let Some(key) = menu.binding else {
                continue;
            };
            let value = match key {
                PreferenceKey::Theme => prefs.theme.id(),
                PreferenceKey::Density => prefs.density.id(),
            };
            let changes = menu.selection.select_value(value);
            for (item, active) in &changes {
                self.renderer
                    .apply_visual_state(item, &VisualState::Active { active: *active });
            }

            let mirrored = mirrors.theme_dropdowns.contains(id) || mirrors.density_dropdowns.contains(id);
            if !mirrored {
                if let Some((_, choice)) = menu.selection.selected().next() {
                    self.renderer.apply_visual_state(
                        &Mirrors::caption(id),
                        &VisualState::Label {
                            text: choice.label.clone(),
                        },
                    );
                }
            }
        }
    }

    // =========================================================================
    // Host application
    // =========================================================================

    pub fn enable_host_app_integration(&mut self) {
        self.bridge.enable();
    }

    pub fn disable_host_app_integration(&mut self) {
        self.bridge.disable();
    }

    pub fn is_host_app_integration_enabled(&self) -> bool {
        self.bridge.is_enabled()
    }

    /// Handle a raw cross-frame message. Never fails.
    pub fn receive_host_message(&mut self, raw: &str) -> BridgeOutcome {
        let outcome = self.bridge.receive(raw, &mut self.sync, &mut self.renderer);
        self.after_host(outcome)
    }

    /// Handle a structured cross-frame message. Never fails.
    pub fn receive_host_value(&mut self, value: Value) -> BridgeOutcome {
        let outcome = self
            .bridge
            .receive_value(value, &mut self.sync, &mut self.renderer);
        self.after_host(outcome)
    }

    /// Run a host theme change locally, regardless of whether integration is enabled
    pub fn simulate_host_app_message(
        &mut self,
        theme: Option<&str>,
        density: Option<&str>,
    ) -> BridgeOutcome {
        let outcome = self
            .bridge
            .simulate(theme, density, &mut self.sync, &mut self.renderer);
        self.after_host(outcome)
    }

    fn after_host(&mut self, outcome: BridgeOutcome) -> BridgeOutcome {
        if let BridgeOutcome::Applied(prefs) = &outcome {
            self.sync_bound_menus(*prefs);
        }
        outcome
    }

    /// Post locally originated preference changes to the host
    pub fn forward_to_host(&self, channel: Arc<dyn HostChannel>) -> SubscriptionId {
        forward_to_host(self.sync.bus(), channel)
    }

    // =========================================================================
    // Accordions
    // =========================================================================

    /// Expand an accordion if collapsed. Returns whether anything changed.
    pub fn open_accordion(&mut self, selector: &str) -> bool {
        self.drive_accordion(selector, ToggleSet::open)
    }

    /// Collapse an accordion if expanded
    pub fn close_accordion(&mut self, selector: &str) -> bool {
        self.drive_accordion(selector, ToggleSet::close)
    }

    pub fn toggle_accordion(&mut self, selector: &str) -> bool {
        self.drive_accordion(selector, ToggleSet::toggle)
    }

    fn drive_accordion(
        &mut self,
        selector: &str,
        drive: fn(&mut ToggleSet, &str) -> Result<Transitions>,
    ) -> bool {
        let id = selector.strip_prefix('#').unwrap_or(selector);
        let is_accordion = self
            .toggles
            .get(id)
            .map_or(false, |control| control.kind() == ToggleKind::Accordion);
        if !is_accordion {
            tracing::debug!("no accordion {:?}", selector);
            return false;
        }

        match drive(&mut self.toggles, id) {
            Ok(transitions) => {
                let changed = !transitions.is_empty();
                self.announce(transitions, Source::Api);
                changed
            }
            Err(err) => {
                tracing::debug!("accordion {:?}: {}", selector, err);
                false
            }
        }
    }

    // =========================================================================
    // Input
    // =========================================================================

    /// React to one user interaction.
    ///
    /// Input aimed at an unknown control is ignored. An invalid preference
    /// value chosen through a selector is returned to the caller.
    pub fn handle_input(&mut self, input: InputEvent) -> Result<()> {
        match self.dispatch(&input.target, input.action) {
            Err(WeaveError::MissingTarget(id)) => {
                tracing::debug!("ignoring input for unknown control {}", id);
                Ok(())
            }
            other => other,
        }
    }

    fn dispatch(&mut self, target: &ControlId, action: InputAction) -> Result<()> {
        match action {
            InputAction::Activate => self.activate(target),
            InputAction::Key(key) if self.toggles.contains(target.as_str()) => {
                let transitions = self.toggles.key(target.as_str(), key)?;
                self.announce(transitions, Source::UserUi);
                Ok(())
            }
            InputAction::Key(KeyCode::ESCAPE) => {
                self.dismiss();
                Ok(())
            }
            InputAction::Key(key) if key.is_activation() => self.activate(target),
            InputAction::Key(_) => Ok(()),
            InputAction::OutsideClick | InputAction::Escape => {
                self.dismiss();
                Ok(())
            }
            InputAction::Select(value) => self.select(target, &value),
            InputAction::SetChecked(checked) => self.set_checked(target, checked),
        }
    }

    fn dismiss(&mut self) {
        let transitions = self.toggles.dismiss_all();
        self.announce(transitions, Source::UserUi);
    }

    fn activate(&mut self, target: &ControlId) -> Result<()> {
        if self.toggles.contains(target.as_str()) {
            let transitions = self.toggles.activate(target.as_str())?;
            self.announce(transitions, Source::UserUi);
            return Ok(());
        }

        if let Some(owner) = self.owners.get(target).cloned() {
            return match owner {
                Owner::Menu(menu) => self.choose_menu_item(&menu, target),
                Owner::List(list) => self.choose_list_item(&list, target),
                Owner::Tabs(strip) => self.choose_tab(&strip, target),
            };
        }

        // Checkboxes flip; an indeterminate parent becomes checked.
        if let Some(group) = self.groups.group(target.as_str()) {
            let checked = group.aggregate().is_checked();
            return self.set_checked(target, !checked);
        }
        if let Some(parent) = self.groups.parent_of(target.as_str()) {
            let checked = self
                .groups
                .group(parent.as_str())
                .and_then(|group| group.is_checked(target.as_str()))
                .unwrap_or(false);
            return self.set_checked(target, !checked);
        }

        Err(WeaveError::missing_target(target.as_str()))
    }

    fn select(&mut self, target: &ControlId, value: &str) -> Result<()> {
        let mirrors = self.sync.mirrors();
        let key = if mirrors.theme_selector.as_ref() == Some(target) {
            Some(PreferenceKey::Theme)
        } else if mirrors.density_selector.as_ref() == Some(target) {
            Some(PreferenceKey::Density)
        } else {
            None
        };
        if let Some(key) = key {
            return self
                .apply(PreferenceUpdate::for_key(key, value), Source::UserUi)
                .map(|_| ());
        }

        let item = self
            .menus
            .get(target)
            .and_then(|menu| menu.selection.find_value(value))
            .cloned()
            .ok_or_else(|| WeaveError::missing_target(format!("{target}[{value}]")))?;
        self.choose_menu_item(target, &item)
    }

    fn set_checked(&mut self, target: &ControlId, checked: bool) -> Result<()> {
        let change = if self.groups.is_parent(target.as_str()) {
            self.groups.set_parent(target.as_str(), checked)?
        } else {
            self.groups.set_member(target.as_str(), checked)?
        };
        self.announce_group(&change, Some(Source::UserUi));
        Ok(())
    }

    fn choose_menu_item(&mut self, menu_id: &ControlId, item: &ControlId) -> Result<()> {
        let menu = self
            .menus
            .get(menu_id)
            .ok_or_else(|| WeaveError::missing_target(menu_id.as_str()))?;
        let choice = menu
            .selection
            .choice(item.as_str())
            .cloned()
            .ok_or_else(|| WeaveError::missing_target(item.as_str()))?;

        if let Some(key) = menu.binding {
            self.apply(PreferenceUpdate::for_key(key, &choice.value), Source::UserUi)?;
        } else if let Some(menu) = self.menus.get_mut(menu_id) {
            let changes = menu.selection.select(item.as_str())?;
            self.render_flags(&changes);
            self.renderer.apply_visual_state(
                &Mirrors::caption(menu_id),
                &VisualState::Label {
                    text: choice.label.clone(),
                },
            );
        }

        if self.toggles.contains(menu_id.as_str()) {
            let transitions = self.toggles.close(menu_id.as_str())?;
            self.announce(transitions, Source::UserUi);
        }

        self.publish(
            EventKind::DropdownSelected,
            EventPayload::DropdownSelected {
                dropdown: menu_id.clone(),
                value: choice.value,
                text: choice.label,
            },
            Some(Source::UserUi),
        );
        Ok(())
    }

    fn choose_list_item(&mut self, list_id: &ControlId, item: &ControlId) -> Result<()> {
        let list = self
            .lists
            .get_mut(list_id)
            .ok_or_else(|| WeaveError::missing_target(list_id.as_str()))?;
        let changes = list.select(item.as_str())?;
        let text = list
            .choice(item.as_str())
            .map(|choice| choice.label.clone())
            .unwrap_or_default();

        self.render_flags(&changes);
        self.publish(
            EventKind::ListItemSelected,
            EventPayload::ListItem {
                item: text,
                list_id: list_id.clone(),
            },
            Some(Source::UserUi),
        );
        Ok(())
    }

    fn choose_tab(&mut self, strip_id: &ControlId, tab: &ControlId) -> Result<()> {
        let strip = self
            .tab_strips
            .get_mut(strip_id)
            .ok_or_else(|| WeaveError::missing_target(strip_id.as_str()))?;
        let changes = strip.select(tab.as_str())?;
        let text = strip
            .choice(tab.as_str())
            .map(|choice| choice.label.clone())
            .unwrap_or_default();

        self.render_flags(&changes);
        self.publish(
            EventKind::TabChanged,
            EventPayload::Tab {
                strip: strip_id.clone(),
                active_tab: text,
            },
            Some(Source::UserUi),
        );
        Ok(())
    }

    // =========================================================================
    // Render + publish
    // =========================================================================

    fn render_toggle(&mut self, transition: &ToggleTransition) {
        self.renderer.apply_visual_state(
            &transition.control,
            &VisualState::Toggle {
                open: transition.open,
            },
        );
    }

    fn render_flags(&mut self, changes: &SelectionChanges) {
        for (item, active) in changes {
            self.renderer
                .apply_visual_state(item, &VisualState::Active { active: *active });
        }
    }

    fn announce(&mut self, transitions: Transitions, source: Source) {
        for transition in transitions {
            self.render_toggle(&transition);
            let (kind, payload) = match transition.kind {
                ToggleKind::Dropdown => (
                    EventKind::DropdownToggled,
                    EventPayload::DropdownToggled {
                        dropdown: transition.control,
                        is_open: transition.open,
                    },
                ),
                ToggleKind::Accordion => (
                    EventKind::AccordionToggled,
                    EventPayload::Accordion {
                        accordion: transition.control,
                        is_expanded: transition.open,
                        header: transition.label,
                    },
                ),
                ToggleKind::Section => (
                    EventKind::SectionToggled,
                    EventPayload::Section {
                        section: transition.control,
                        collapsed: !transition.open,
                    },
                ),
            };
            self.publish(kind, payload, Some(source));
        }
    }

    fn announce_group(&mut self, change: &GroupChange, source: Option<Source>) {
        for (member, checked) in &change.members {
            self.renderer.apply_visual_state(
                member,
                &VisualState::Checkbox {
                    checked: *checked,
                    indeterminate: false,
                },
            );
        }
        self.renderer.apply_visual_state(
            &change.parent,
            &VisualState::Checkbox {
                checked: change.aggregate.is_checked(),
                indeterminate: change.aggregate.is_indeterminate(),
            },
        );
        self.publish(
            EventKind::CheckboxGroupChanged,
            EventPayload::CheckboxGroup {
                parent_id: change.parent.clone(),
                aggregate: change.aggregate,
                checked_count: change.checked_count,
                total_count: change.total_count,
            },
            source,
        );
    }

    fn publish(&self, kind: EventKind, payload: EventPayload, source: Option<Source>) {
        let mut event = ChangeEvent::new(kind, payload);
        event.source = source;
        self.sync.bus().publish(event);
    }
}

impl<S: std::fmt::Debug, R> std::fmt::Debug for WeaveUi<S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeaveUi")
            .field("sync", &self.sync)
            .field("bridge", &self.bridge)
            .field("toggles", &self.toggles)
            .field("groups", &self.groups)
            .finish_non_exhaustive()
    }
}
