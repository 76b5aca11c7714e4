//! Regions plugin for the Nucleus simulation kernel.
//!
//! Every person is in exactly one region. Regions carry typed properties
//! defined the same way as any other property in the kernel. The plugin
//! depends on the people plugin: a person added at run time must carry a
//! [`RegionId`](nucleus_types::RegionId) in its construction data, and a
//! removed person leaves its region.
//!
//! # Modules
//!
//! - [`plugin_data`] -- [`RegionsPluginData`] and its builder
//! - [`events`] -- Region observation events and their filters
//! - [`manager`] -- [`RegionsDataManager`]
//! - [`context_ext`] -- [`ContextRegionsExt`], the public mutation surface

pub mod context_ext;
pub mod events;
pub mod manager;
pub mod plugin_data;

use nucleus_core::{Plugin, PluginId};
use nucleus_people::PEOPLE_PLUGIN_ID;

pub use context_ext::ContextRegionsExt;
pub use events::{
    PersonRegionUpdateEvent, RegionAdditionEvent, RegionPropertyDefinitionEvent,
    RegionPropertyUpdateEvent,
};
pub use manager::RegionsDataManager;
pub use plugin_data::{RegionsPluginData, RegionsPluginDataBuilder};

/// Id of the regions plugin.
pub const REGIONS_PLUGIN_ID: PluginId = PluginId::new("regions");

/// The regions plugin, seeded with `data`.
pub fn regions_plugin(data: RegionsPluginData) -> Plugin {
    Plugin::builder(REGIONS_PLUGIN_ID)
        .dependency(PEOPLE_PLUGIN_ID)
        .initializer(move |plugin| {
            plugin.add_data_manager(RegionsDataManager::new(data))?;
            Ok(())
        })
        .build()
}
