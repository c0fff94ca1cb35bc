//! Page controller behavior

use pretty_assertions::assert_eq;
use std::sync::{Arc, Mutex};
use weave_core::{
    Aggregate, ChangeEvent, ControlId, EventKind, EventPayload, InputAction, InputEvent, KeyCode,
    Source, VisualState, WeaveError,
};
use weave_ui::{
    BridgeOutcome, Density, PageScan, Preferences, RecordingHost, Selection, Theme, WeaveUi,
};

const LAYOUT: &str = r#"
[[dropdowns]]
id = "theme-dropdown"
binding = "theme"
items = [
    { value = "light-gray", text = "Light Gray" },
    { value = "dark-gray", text = "Dark Gray" },
    { value = "dark-blue", text = "Dark Blue" },
]

[[dropdowns]]
id = "density-dropdown"
binding = "density"
items = [{ value = "high", text = "High Density" }, { value = "medium", text = "Medium Density" }]

[[dropdowns]]
id = "export-dropdown"
items = [{ value = "csv", text = "CSV" }, { value = "json", text = "JSON" }]

[[accordions]]
id = "details"
header = "Details"
open = true

[[accordions]]
id = "advanced"
header = "Advanced"

[[sections]]
id = "filters"

[[checkbox_groups]]
parent = "all-layers"
members = [{ id = "layer-1" }, { id = "layer-2" }, { id = "layer-3" }]

[[lists]]
id = "files"
mode = "single"
items = [{ id = "f1", text = "a.txt" }, { id = "f2", text = "b.txt" }]

[[lists]]
id = "tags"
mode = "multi"
items = [{ id = "t1", text = "red" }, { id = "t2", text = "blue" }]

[[tab_strips]]
id = "main-tabs"
tabs = [{ id = "general", text = "General", selected = true }, { id = "advanced-tab", text = "Advanced" }]
"#;

type Events = Arc<Mutex<Vec<ChangeEvent>>>;

fn setup() -> (WeaveUi, Events) {
    let mut ui = WeaveUi::in_memory();
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    ui.bus()
        .subscribe_all(move |event| sink.lock().unwrap().push(event.clone()));
    ui.initialize(&PageScan::from_toml_str(LAYOUT).unwrap());
    events.lock().unwrap().clear();
    (ui, events)
}

fn input(ui: &mut WeaveUi, target: &str, action: InputAction) {
    ui.handle_input(InputEvent::new(target, action)).unwrap();
}

fn selected_ids(selection: &Selection) -> Vec<String> {
    selection
        .selected()
        .map(|(id, _)| id.as_str().to_string())
        .collect()
}

fn kinds(events: &Events) -> Vec<EventKind> {
    events.lock().unwrap().iter().map(|event| event.kind).collect()
}

#[test]
fn initialization_announces_groups_then_ready() {
    let mut ui = WeaveUi::in_memory();
    let events: Events = Arc::new(Mutex::new(Vec::new()));
    let sink = events.clone();
    ui.bus()
        .subscribe_all(move |event| sink.lock().unwrap().push(event.clone()));

    let prefs = ui.initialize(&PageScan::from_toml_str(LAYOUT).unwrap());

    assert_eq!(prefs, Preferences::default());
    assert_eq!(
        kinds(&events),
        vec![EventKind::CheckboxGroupChanged, EventKind::UiReady]
    );
    match &events.lock().unwrap()[1].payload {
        EventPayload::Ready { version, .. } => assert_eq!(version, weave_ui::VERSION),
        other => panic!("unexpected payload {other:?}"),
    }

    let renderer = ui.renderer();
    assert_eq!(renderer.is_open("details"), Some(true));
    assert_eq!(renderer.is_open("advanced"), Some(false));
    assert_eq!(renderer.is_open("filters"), Some(true));
    assert_eq!(renderer.label("theme-dropdown/label"), Some("Light Gray"));
    assert_eq!(
        renderer.state("theme-dropdown/item/light-gray"),
        Some(&VisualState::Active { active: true })
    );
    assert_eq!(
        renderer.state("general"),
        Some(&VisualState::Active { active: true })
    );
}

#[test]
fn set_theme_twice_is_idempotent() {
    let (mut ui, events) = setup();

    ui.set_theme("dark-gray").unwrap();
    let after_first: Vec<_> = ui
        .renderer()
        .states()
        .map(|(id, state)| (id.clone(), state.clone()))
        .collect();
    let stored_first = ui.store().preferences();

    ui.set_theme("dark-gray").unwrap();
    let after_second: Vec<_> = ui
        .renderer()
        .states()
        .map(|(id, state)| (id.clone(), state.clone()))
        .collect();

    assert_eq!(after_first, after_second);
    assert_eq!(stored_first, ui.store().preferences());
    assert_eq!(
        kinds(&events),
        vec![EventKind::ThemeChanged, EventKind::ThemeChanged]
    );
}

#[test]
fn theme_and_density_converge_across_mirrors() {
    let (mut ui, events) = setup();

    ui.set_theme_and_density("dark-blue", "medium").unwrap();

    let renderer = ui.renderer();
    for dropdown in ["theme-dropdown", "demo-theme-dropdown"] {
        assert_eq!(renderer.label(&format!("{dropdown}/label")), Some("Dark Blue"));
    }
    for dropdown in ["density-dropdown", "demo-density-dropdown"] {
        assert_eq!(
            renderer.label(&format!("{dropdown}/label")),
            Some("Medium Density")
        );
    }
    assert_eq!(
        renderer.state("surface"),
        Some(&VisualState::Surface {
            theme: "dark-blue".into(),
            density: "medium".into()
        })
    );
    assert_eq!(
        renderer.state("theme-dropdown/item/dark-blue"),
        Some(&VisualState::Active { active: true })
    );
    assert_eq!(
        renderer.state("theme-dropdown/item/light-gray"),
        Some(&VisualState::Active { active: false })
    );
    assert_eq!(ui.current_theme(), Theme::DarkBlue);
    assert_eq!(ui.current_density(), Density::Medium);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::UiChanged);
    assert_eq!(events[0].source, Some(Source::Api));
}

#[test]
fn rejected_theme_changes_nothing() {
    let (mut ui, events) = setup();
    let before: Vec<_> = ui
        .renderer()
        .states()
        .map(|(id, state)| (id.clone(), state.clone()))
        .collect();

    let err = ui.set_theme("neon-pink").unwrap_err();

    assert!(matches!(err, WeaveError::InvalidValue { .. }));
    let after: Vec<_> = ui
        .renderer()
        .states()
        .map(|(id, state)| (id.clone(), state.clone()))
        .collect();
    assert_eq!(before, after);
    assert_eq!(ui.current_theme(), Theme::LightGray);
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn checkbox_group_aggregates() {
    let (mut ui, events) = setup();
    let aggregate = |ui: &WeaveUi| ui.groups().group("all-layers").unwrap().aggregate();

    input(&mut ui, "layer-1", InputAction::SetChecked(true));
    assert_eq!(aggregate(&ui), Aggregate::Partial);
    assert_eq!(
        ui.renderer().state("all-layers"),
        Some(&VisualState::Checkbox {
            checked: false,
            indeterminate: true
        })
    );

    input(&mut ui, "layer-2", InputAction::SetChecked(true));
    input(&mut ui, "layer-3", InputAction::Activate);
    assert_eq!(aggregate(&ui), Aggregate::All);

    input(&mut ui, "all-layers", InputAction::SetChecked(false));
    assert_eq!(aggregate(&ui), Aggregate::None);
    for member in ["layer-1", "layer-2", "layer-3"] {
        assert_eq!(
            ui.renderer().state(member),
            Some(&VisualState::Checkbox {
                checked: false,
                indeterminate: false
            })
        );
    }

    input(&mut ui, "all-layers", InputAction::Activate);
    assert_eq!(aggregate(&ui), Aggregate::All);
    assert_eq!(ui.groups().group("all-layers").unwrap().checked_count(), 3);

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 5);
    match &events[0].payload {
        EventPayload::CheckboxGroup {
            parent_id,
            aggregate,
            checked_count,
            total_count,
        } => {
            assert_eq!(parent_id.as_str(), "all-layers");
            assert_eq!(*aggregate, Aggregate::Partial);
            assert_eq!((*checked_count, *total_count), (1, 3));
        }
        other => panic!("unexpected payload {other:?}"),
    }
}

#[test]
fn opening_second_dropdown_closes_first() {
    let (mut ui, events) = setup();

    input(&mut ui, "theme-dropdown", InputAction::Activate);
    events.lock().unwrap().clear();
    input(&mut ui, "export-dropdown", InputAction::Key(KeyCode::ENTER));

    let toggled: Vec<_> = events
        .lock()
        .unwrap()
        .iter()
        .map(|event| match &event.payload {
            EventPayload::DropdownToggled { dropdown, is_open } => (dropdown.clone(), *is_open),
            other => panic!("unexpected payload {other:?}"),
        })
        .collect();
    assert_eq!(
        toggled,
        vec![
            (ControlId::from("theme-dropdown"), false),
            (ControlId::from("export-dropdown"), true),
        ]
    );
    assert_eq!(ui.renderer().is_open("theme-dropdown"), Some(false));
    assert_eq!(ui.renderer().is_open("export-dropdown"), Some(true));
}

#[test]
fn outside_click_closes_dropdowns_only() {
    let (mut ui, events) = setup();

    input(&mut ui, "export-dropdown", InputAction::Activate);
    input(&mut ui, "advanced", InputAction::Activate);
    events.lock().unwrap().clear();

    input(&mut ui, "page", InputAction::OutsideClick);

    assert_eq!(kinds(&events), vec![EventKind::DropdownToggled]);
    assert_eq!(ui.toggles().is_open("export-dropdown"), Some(false));
    assert_eq!(ui.toggles().is_open("advanced"), Some(true));
    assert_eq!(ui.toggles().is_open("details"), Some(true));
}

#[test]
fn choosing_an_item_updates_caption_and_closes() {
    let (mut ui, events) = setup();

    input(&mut ui, "export-dropdown", InputAction::Activate);
    events.lock().unwrap().clear();
    input(&mut ui, "export-dropdown", InputAction::Select("json".into()));

    assert_eq!(ui.renderer().label("export-dropdown/label"), Some("JSON"));
    assert_eq!(ui.toggles().is_open("export-dropdown"), Some(false));
    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].kind, EventKind::DropdownToggled);
    assert_eq!(
        events[1].payload,
        EventPayload::DropdownSelected {
            dropdown: "export-dropdown".into(),
            value: "json".into(),
            text: "JSON".into(),
        }
    );
}

#[test]
fn bound_dropdown_applies_preference() {
    let (mut ui, events) = setup();

    input(&mut ui, "theme-dropdown/item/dark-gray", InputAction::Activate);

    assert_eq!(ui.current_theme(), Theme::DarkGray);
    assert_eq!(ui.renderer().label("demo-title"), Some("Weave UI - Dark Gray Theme"));
    let events = events.lock().unwrap();
    assert_eq!(events[0].kind, EventKind::ThemeChanged);
    assert_eq!(events[0].source, Some(Source::UserUi));
    assert_eq!(events.last().unwrap().kind, EventKind::DropdownSelected);
}

#[test]
fn radio_selector_applies_density() {
    let (mut ui, events) = setup();

    input(&mut ui, "weave-density", InputAction::Select("medium".into()));
    assert_eq!(ui.current_density(), Density::Medium);
    assert_eq!(kinds(&events), vec![EventKind::DensityChanged]);

    let err = ui
        .handle_input(InputEvent::new(
            "weave-density",
            InputAction::Select("compact".into()),
        ))
        .unwrap_err();
    assert!(matches!(err, WeaveError::InvalidValue { .. }));
    assert_eq!(ui.current_density(), Density::Medium);
}

#[test]
fn accordion_api_accepts_selectors() {
    let (mut ui, events) = setup();

    assert!(!ui.open_accordion("#details"));
    assert!(ui.close_accordion("#details"));
    assert!(!ui.close_accordion("details"));
    assert!(ui.toggle_accordion("advanced"));
    assert!(!ui.toggle_accordion("#missing"));
    assert!(!ui.toggle_accordion("export-dropdown"));

    let events = events.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0].payload,
        EventPayload::Accordion {
            accordion: "details".into(),
            is_expanded: false,
            header: "Details".into(),
        }
    );
    assert_eq!(events[1].source, Some(Source::Api));
}

#[test]
fn section_list_and_tabs() {
    let (mut ui, events) = setup();

    input(&mut ui, "filters", InputAction::Key(KeyCode::SPACE));
    input(&mut ui, "f2", InputAction::Activate);
    input(&mut ui, "t1", InputAction::Activate);
    input(&mut ui, "t2", InputAction::Activate);
    input(&mut ui, "advanced-tab", InputAction::Activate);

    assert_eq!(ui.toggles().is_open("filters"), Some(false));
    assert_eq!(selected_ids(ui.list("tags").unwrap()), vec!["t1", "t2"]);
    assert_eq!(
        selected_ids(ui.tab_strip("main-tabs").unwrap()),
        vec!["advanced-tab"]
    );
    assert_eq!(
        ui.renderer().state("general"),
        Some(&VisualState::Active { active: false })
    );

    let events = events.lock().unwrap();
    assert_eq!(
        events[0].payload,
        EventPayload::Section {
            section: "filters".into(),
            collapsed: true,
        }
    );
    assert_eq!(
        events[1].payload,
        EventPayload::ListItem {
            item: "b.txt".into(),
            list_id: "files".into(),
        }
    );
    assert_eq!(
        events[4].payload,
        EventPayload::Tab {
            strip: "main-tabs".into(),
            active_tab: "Advanced".into(),
        }
    );
}

#[test]
fn unknown_targets_are_ignored() {
    let (mut ui, events) = setup();
    ui.handle_input(InputEvent::new("nowhere", InputAction::Activate))
        .unwrap();
    ui.handle_input(InputEvent::new(
        "export-dropdown",
        InputAction::Select("xml".into()),
    ))
    .unwrap();
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn markup_theme_survives_a_density_change() {
    let mut ui = WeaveUi::in_memory();
    let layout = format!("surface_classes = [\"theme-dark-blue\", \"density-high\"]\n{LAYOUT}");
    ui.initialize(&PageScan::from_toml_str(&layout).unwrap());
    assert_eq!(ui.current_theme(), Theme::DarkBlue);

    ui.set_density("medium").unwrap();

    assert_eq!(ui.current_theme(), Theme::DarkBlue);
    assert_eq!(ui.current_density(), Density::Medium);
    assert_eq!(ui.store().preferences(), ui.current_preferences());
    assert_eq!(ui.renderer().label("theme-dropdown/label"), Some("Dark Blue"));
    assert_eq!(
        ui.renderer().state("surface"),
        Some(&VisualState::Surface {
            theme: "dark-blue".into(),
            density: "medium".into()
        })
    );
    assert_eq!(
        ui.renderer().state("theme-dropdown/item/dark-blue"),
        Some(&VisualState::Active { active: true })
    );
}

#[test]
fn malformed_host_message_is_contained() {
    let (mut ui, events) = setup();

    let outcome = ui.receive_host_message("{not json");

    assert!(matches!(outcome, BridgeOutcome::Rejected(_)));
    assert_eq!(ui.current_preferences(), Preferences::default());
    assert!(events.lock().unwrap().is_empty());
}

#[test]
fn host_messages_respect_integration_flag() {
    let (mut ui, events) = setup();
    let host = Arc::new(RecordingHost::new());
    ui.forward_to_host(host.clone());

    ui.disable_host_app_integration();
    let message = r#"{"type":"weave-ui-theme-change","payload":{"theme":"dark-blue"}}"#;
    assert_eq!(ui.receive_host_message(message), BridgeOutcome::Disabled);
    assert_eq!(ui.current_theme(), Theme::LightGray);

    assert!(matches!(
        ui.simulate_host_app_message(Some("dark-gray"), Some("medium")),
        BridgeOutcome::Applied(_)
    ));
    assert_eq!(
        ui.renderer().state("density-dropdown/item/medium"),
        Some(&VisualState::Active { active: true })
    );

    ui.enable_host_app_integration();
    assert!(matches!(ui.receive_host_message(message), BridgeOutcome::Applied(_)));
    assert_eq!(ui.current_theme(), Theme::DarkBlue);

    assert_eq!(
        kinds(&events),
        vec![EventKind::HostThemeChanged, EventKind::HostThemeChanged]
    );
    assert!(host.messages().is_empty());

    ui.set_density("high").unwrap();
    assert_eq!(host.messages().len(), 1);
}
