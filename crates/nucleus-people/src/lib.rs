//! People plugin for the Nucleus simulation kernel.
//!
//! Owns the set of people: which person ids exist, and the protocol for
//! adding and removing them. Other plugins check a new person's
//! construction data on [`PersonImminentAdditionEvent`], write per-person
//! state on [`PersonAdditionEvent`], and drop it on [`PersonRemovalEvent`].
//!
//! # Modules
//!
//! - [`plugin_data`] -- [`PeoplePluginData`], the starting population
//! - [`construction`] -- [`PersonConstructionData`] passed to dependents
//! - [`events`] -- Observation events for additions and removals
//! - [`manager`] -- [`PeopleDataManager`]
//! - [`context_ext`] -- [`ContextPeopleExt`], the public mutation surface

pub mod construction;
pub mod context_ext;
pub mod events;
pub mod manager;
pub mod plugin_data;

use nucleus_core::{Plugin, PluginId};

pub use construction::PersonConstructionData;
pub use context_ext::ContextPeopleExt;
pub use events::{PersonAdditionEvent, PersonImminentAdditionEvent, PersonRemovalEvent};
pub use manager::PeopleDataManager;
pub use plugin_data::PeoplePluginData;

/// Id of the people plugin.
pub const PEOPLE_PLUGIN_ID: PluginId = PluginId::new("people");

/// The people plugin, seeded with `data`.
pub fn people_plugin(data: PeoplePluginData) -> Plugin {
    Plugin::builder(PEOPLE_PLUGIN_ID)
        .initializer(move |plugin| {
            plugin.add_data_manager(PeopleDataManager::new(data))?;
            Ok(())
        })
        .build()
}
