use bevy::asset::LoadState;
use bevy::prelude::*;

use crate::constants::RELATIVE_CONFIG_PATH;
use crate::engine::config::SiteConfig;
use crate::engine::loading::progress::LoadingProgress;
use crate::tools::tuning::ModelParams;

#[derive(Resource, Default)]
pub struct ConfigLoader {
    handle: Option<Handle<SiteConfig>>,
}

/// Seed `ModelParams` once a `SiteConfig` resource is present, however it
/// arrived (asset fetch in production, direct insertion in tests).
pub fn resolve_config_resource(
    config: Option<Res<SiteConfig>>,
    mut progress: ResMut<LoadingProgress>,
    mut params: ResMut<ModelParams>,
) {
    if progress.config_resolved {
        return;
    }
    let Some(config) = config else {
        return;
    };
    params.seed_from(&config.ar);
    progress.config_resolved = true;
}

/// Start fetching the site configuration document.
pub fn start_config_loading(mut loader: ResMut<ConfigLoader>, asset_server: Res<AssetServer>) {
    loader.handle = Some(asset_server.load(RELATIVE_CONFIG_PATH));
}

/// Resolve the config asset once it arrives and seed the per-model parameter
/// map from the declared defaults. A document that fails to fetch degrades
/// to an empty config, which the compiler treats as demo mode; the AR page
/// is a self-contained sub-experience and must not surface page-level errors
/// for missing marketing content.
pub fn poll_config_asset(
    mut loader: ResMut<ConfigLoader>,
    mut progress: ResMut<LoadingProgress>,
    mut params: ResMut<ModelParams>,
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    configs: Res<Assets<SiteConfig>>,
) {
    if progress.config_resolved {
        return;
    }

    let Some(handle) = loader.handle.clone() else {
        return;
    };

    let resolved = if let Some(config) = configs.get(&handle) {
        println!("✓ Site configuration loaded");
        Some(config.clone())
    } else if matches!(asset_server.get_load_state(&handle), Some(LoadState::Failed(_))) {
        warn!("site configuration failed to load, continuing without AR content");
        Some(SiteConfig::default())
    } else {
        None
    };

    if let Some(config) = resolved {
        params.seed_from(&config.ar);
        commands.insert_resource(config);
        progress.config_resolved = true;
        loader.handle = None;
    }
}
