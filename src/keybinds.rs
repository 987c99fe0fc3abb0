use std::{
    collections::{BTreeMap, HashMap},
    str::FromStr,
    sync::Mutex,
};

use serde_json::Value;
use tauri::{AppHandle, Emitter, Manager};
use tauri_plugin_global_shortcut::{GlobalShortcutExt, Shortcut, ShortcutEvent, ShortcutState};

use crate::{
    append_desktop_log, desktop_state, runtime_paths, window_actions, KEYBIND_PRESSED_EVENT,
    KEYBIND_RELEASED_EVENT, MAIN_WINDOW_LABEL,
};

const KEYBINDS_FIELD: &str = "keybinds";

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Deserialize, serde::Serialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum KeybindAction {
    ToggleMute,
    ToggleDeafen,
    PushToTalk,
    ShowWindow,
}

impl KeybindAction {
    pub const ALL: [KeybindAction; 4] = [
        KeybindAction::ToggleMute,
        KeybindAction::ToggleDeafen,
        KeybindAction::PushToTalk,
        KeybindAction::ShowWindow,
    ];

    pub fn id(self) -> &'static str {
        match self {
            KeybindAction::ToggleMute => "toggle-mute",
            KeybindAction::ToggleDeafen => "toggle-deafen",
            KeybindAction::PushToTalk => "push-to-talk",
            KeybindAction::ShowWindow => "show-window",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|action| action.id() == id)
    }

    pub fn default_accelerator(self) -> &'static str {
        match self {
            KeybindAction::ToggleMute => "CmdOrCtrl+Shift+M",
            KeybindAction::ToggleDeafen => "CmdOrCtrl+Shift+D",
            KeybindAction::PushToTalk => "CmdOrCtrl+Shift+Space",
            KeybindAction::ShowWindow => "CmdOrCtrl+Shift+P",
        }
    }
}

pub type KeybindTable = BTreeMap<KeybindAction, String>;

#[derive(Debug, Clone, serde::Serialize)]
struct KeybindEventPayload {
    action: KeybindAction,
}

#[derive(Debug, Default)]
pub(crate) struct KeybindState {
    bindings: Mutex<KeybindTable>,
    registered: Mutex<HashMap<u32, KeybindAction>>,
}

impl KeybindState {
    pub(crate) fn bindings(&self) -> KeybindTable {
        self.bindings
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn action_for(&self, shortcut: &Shortcut) -> Option<KeybindAction> {
        self.registered.lock().ok()?.get(&shortcut.id()).copied()
    }
}

pub fn default_keybinds() -> KeybindTable {
    KeybindAction::ALL
        .into_iter()
        .map(|action| (action, action.default_accelerator().to_string()))
        .collect()
}

pub fn parse_accelerator(raw: &str) -> Result<Shortcut, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err("Keybind accelerator is empty.".to_string());
    }
    Shortcut::from_str(trimmed)
        .map_err(|error| format!("Invalid keybind accelerator '{trimmed}': {error}"))
}

/// Applies persisted overrides on top of the defaults; unknown actions, invalid
/// accelerators and duplicates keep the default binding.
pub fn resolve_keybinds<F>(overrides: Option<&Value>, log: F) -> KeybindTable
where
    F: Fn(&str),
{
    let mut table = default_keybinds();
    let Some(overrides) = overrides.and_then(Value::as_object) else {
        return table;
    };

    for (raw_action, raw_accelerator) in overrides {
        let Some(action) = KeybindAction::from_id(raw_action) else {
            log(&format!("ignoring keybind for unknown action '{raw_action}'"));
            continue;
        };
        let Some(accelerator) = raw_accelerator.as_str() else {
            log(&format!("ignoring non-string keybind for '{raw_action}'"));
            continue;
        };
        let shortcut = match parse_accelerator(accelerator) {
            Ok(shortcut) => shortcut,
            Err(error) => {
                log(&error);
                continue;
            }
        };
        if let Some(conflict) = find_conflict(&table, action, &shortcut) {
            log(&format!(
                "keybind '{accelerator}' for '{raw_action}' collides with '{}'; keeping default",
                conflict.id()
            ));
            continue;
        }
        table.insert(action, accelerator.trim().to_string());
    }

    table
}

pub fn find_conflict(
    table: &KeybindTable,
    action: KeybindAction,
    shortcut: &Shortcut,
) -> Option<KeybindAction> {
    table.iter().find_map(|(other_action, accelerator)| {
        if *other_action == action {
            return None;
        }
        let other = parse_accelerator(accelerator).ok()?;
        (other.id() == shortcut.id()).then_some(*other_action)
    })
}

pub(crate) fn load_keybinds() -> KeybindTable {
    let state_path = runtime_paths::desktop_state_path();
    let overrides = desktop_state::read_state_field(state_path.as_deref(), KEYBINDS_FIELD);
    resolve_keybinds(overrides.as_ref(), append_desktop_log)
}

pub(crate) fn register_keybinds(app_handle: &AppHandle, table: KeybindTable) -> Result<(), String> {
    let shortcuts = app_handle.global_shortcut();
    shortcuts
        .unregister_all()
        .map_err(|error| format!("Failed to clear registered keybinds: {error}"))?;

    let mut registered = HashMap::new();
    let mut failures = Vec::new();
    for (action, accelerator) in &table {
        let shortcut = match parse_accelerator(accelerator) {
            Ok(shortcut) => shortcut,
            Err(error) => {
                failures.push(error);
                continue;
            }
        };
        let shortcut_id = shortcut.id();
        match shortcuts.register(shortcut) {
            Ok(()) => {
                registered.insert(shortcut_id, *action);
            }
            Err(error) => failures.push(format!(
                "Failed to register keybind '{accelerator}' for '{}': {error}",
                action.id()
            )),
        }
    }

    let state = app_handle.state::<KeybindState>();
    if let Ok(mut guard) = state.registered.lock() {
        *guard = registered;
    }
    if let Ok(mut guard) = state.bindings.lock() {
        *guard = table;
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(failures.join("; "))
    }
}

/// Registers `next` and saves it only once registration succeeded. Any failure re-registers
/// `previous`, so the live shortcuts and the saved table never disagree.
fn apply_keybind_change<G, S>(
    previous: &KeybindTable,
    next: KeybindTable,
    mut register: G,
    save: S,
) -> Result<KeybindTable, String>
where
    G: FnMut(&KeybindTable) -> Result<(), String>,
    S: FnOnce(&KeybindTable) -> Result<(), String>,
{
    let outcome = register(&next).and_then(|()| save(&next));
    match outcome {
        Ok(()) => Ok(next),
        Err(error) => match register(previous) {
            Ok(()) => Err(error),
            Err(restore_error) => Err(format!(
                "{error}; restoring previous keybinds also failed: {restore_error}"
            )),
        },
    }
}

fn save_keybinds(table: &KeybindTable) -> Result<(), String> {
    let persisted: serde_json::Map<String, Value> = table
        .iter()
        .map(|(action, accelerator)| (action.id().to_string(), Value::String(accelerator.clone())))
        .collect();
    desktop_state::write_state_field(
        runtime_paths::desktop_state_path().as_deref(),
        KEYBINDS_FIELD,
        Some(Value::Object(persisted)),
    )
}

pub(crate) fn set_keybind(
    app_handle: &AppHandle,
    action: KeybindAction,
    accelerator: &str,
) -> Result<KeybindTable, String> {
    let shortcut = parse_accelerator(accelerator)?;
    let previous = app_handle.state::<KeybindState>().bindings();
    if let Some(conflict) = find_conflict(&previous, action, &shortcut) {
        return Err(format!(
            "Keybind '{}' is already used by '{}'.",
            accelerator.trim(),
            conflict.id()
        ));
    }
    let mut next = previous.clone();
    next.insert(action, accelerator.trim().to_string());

    apply_keybind_change(
        &previous,
        next,
        |table| register_keybinds(app_handle, table.clone()),
        save_keybinds,
    )
}

pub(crate) fn handle_shortcut_event(
    app_handle: &AppHandle,
    shortcut: &Shortcut,
    event: ShortcutEvent,
) {
    let Some(action) = app_handle
        .try_state::<KeybindState>()
        .and_then(|state| state.action_for(shortcut))
    else {
        return;
    };

    if action == KeybindAction::ShowWindow {
        if event.state() == ShortcutState::Pressed {
            window_actions::show_main_window(app_handle, append_desktop_log);
        }
        return;
    }

    let event_name = match event.state() {
        ShortcutState::Pressed => KEYBIND_PRESSED_EVENT,
        ShortcutState::Released => KEYBIND_RELEASED_EVENT,
    };
    if let Err(error) = app_handle.emit_to(
        MAIN_WINDOW_LABEL,
        event_name,
        KeybindEventPayload { action },
    ) {
        append_desktop_log(&format!(
            "failed to forward keybind '{}' to main window: {error}",
            action.id()
        ));
    }
}
