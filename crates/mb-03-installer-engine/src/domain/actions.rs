//! Action resolution from settings.
//!
//! Each settings source is consulted by installer id, then by group, then
//! for its own default. The context-wide source comes first and defaults to
//! `DISABLED`. Only if that result is not `DISABLED` is the module-level
//! source consulted; its answer replaces the context result, and a module
//! source with no answer leaves the context result in place.

use shared_types::{InstallerAction, InstallerDescriptor, SettingsSource};

/// Statically resolved action for `installer`.
pub fn resolve_action(
    context: &dyn SettingsSource,
    module: Option<&dyn SettingsSource>,
    installer: &InstallerDescriptor,
) -> InstallerAction {
    let context_action = lookup(context, installer).unwrap_or(InstallerAction::Disabled);

    if context_action == InstallerAction::Disabled {
        return InstallerAction::Disabled;
    }

    module
        .and_then(|settings| lookup(settings, installer))
        .unwrap_or(context_action)
}

fn lookup(settings: &dyn SettingsSource, installer: &InstallerDescriptor) -> Option<InstallerAction> {
    settings
        .action_for(installer.id())
        .or_else(|| installer.group_name().and_then(|g| settings.action_for(g)))
        .or_else(|| settings.default_action())
}
