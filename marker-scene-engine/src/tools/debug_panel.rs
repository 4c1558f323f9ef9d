//! Native tuning panel (debug mode only).
//!
//! Keyboard-driven stand-in for the web debug overlay: Tab cycles the
//! selected model, `G` cycles the transform group, `X`/`Y`/`Z` select the
//! axis, Up/Down nudge the value within the advisory range, `J` prints the
//! export snippet. Every edit flows through the same tuning channel as the
//! remote path.

use bevy::prelude::*;

use crate::constants::{
    POSITION_RANGE, POSITION_STEP, ROTATION_RANGE, ROTATION_STEP, SCALE_RANGE, SCALE_STEP,
};
use crate::engine::config::SiteConfig;
use crate::tools::tuning::{ModelParams, ParamChange, ParamChangeEvent, ParamGroup};

#[derive(Resource)]
pub struct TuningPanelState {
    pub selected: usize,
    pub group: ParamGroup,
    pub axis: usize,
}

impl Default for TuningPanelState {
    fn default() -> Self {
        Self {
            selected: 0,
            group: ParamGroup::Scale,
            axis: 0,
        }
    }
}

#[derive(Component)]
pub struct TuningPanelRoot;
#[derive(Component)]
pub struct TuningPanelText;

#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_tuning_panel(mut commands: Commands) {
    commands
        .spawn((
            TuningPanelRoot,
            Name::new("TuningPanel"),
            BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.85)),
            Node {
                position_type: PositionType::Absolute,
                right: Val::Px(8.0),
                bottom: Val::Px(8.0),
                width: Val::Px(320.0),
                padding: UiRect::all(Val::Px(12.0)),
                display: Display::Flex,
                flex_direction: FlexDirection::Column,
                row_gap: Val::Px(4.0),
                ..default()
            },
        ))
        .with_children(|parent| {
            parent.spawn((
                Text::new("Tuning panel"),
                TextFont {
                    font_size: 15.0,
                    ..default()
                },
                TextColor(Color::srgb(0.78, 0.64, 0.36)),
            ));
            parent.spawn((
                TuningPanelText,
                Text::new("no model selected"),
                TextFont {
                    font_size: 12.0,
                    ..default()
                },
                TextColor(Color::WHITE),
            ));
        });
}

fn advisory_range(group: ParamGroup) -> (f32, f32) {
    match group {
        ParamGroup::Scale => SCALE_RANGE,
        ParamGroup::Position => POSITION_RANGE,
        ParamGroup::Rotation => ROTATION_RANGE,
    }
}

fn step_for(group: ParamGroup) -> f32 {
    match group {
        ParamGroup::Scale => SCALE_STEP,
        ParamGroup::Position => POSITION_STEP,
        ParamGroup::Rotation => ROTATION_STEP,
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn tuning_panel_keyboard(
    keyboard: Res<ButtonInput<KeyCode>>,
    config: Option<Res<SiteConfig>>,
    params: Res<ModelParams>,
    mut panel: ResMut<TuningPanelState>,
    mut changes: EventWriter<ParamChangeEvent>,
) {
    let Some(config) = config else { return };
    let models = &config.ar.models;
    if models.is_empty() {
        return;
    }

    if keyboard.just_pressed(KeyCode::Tab) {
        panel.selected = (panel.selected + 1) % models.len();
    }
    if keyboard.just_pressed(KeyCode::KeyG) {
        panel.group = match panel.group {
            ParamGroup::Scale => ParamGroup::Position,
            ParamGroup::Position => ParamGroup::Rotation,
            ParamGroup::Rotation => ParamGroup::Scale,
        };
    }
    for (key, axis) in [(KeyCode::KeyX, 0), (KeyCode::KeyY, 1), (KeyCode::KeyZ, 2)] {
        if keyboard.just_pressed(key) {
            panel.axis = axis;
        }
    }

    let model_id = &models[panel.selected].id;

    let mut nudge = 0.0;
    if keyboard.just_pressed(KeyCode::ArrowUp) {
        nudge += step_for(panel.group);
    }
    if keyboard.just_pressed(KeyCode::ArrowDown) {
        nudge -= step_for(panel.group);
    }
    if nudge != 0.0 {
        if let Some(current) = params.get(model_id) {
            let vector = match panel.group {
                ParamGroup::Scale => current.scale,
                ParamGroup::Position => current.position,
                ParamGroup::Rotation => current.rotation,
            };
            let (min, max) = advisory_range(panel.group);
            let value = (vector[panel.axis] + nudge).clamp(min, max);
            changes.write(ParamChangeEvent {
                model_id: model_id.clone(),
                group: panel.group,
                change: ParamChange::Axis {
                    axis: panel.axis,
                    value,
                },
            });
        }
    }

    if keyboard.just_pressed(KeyCode::KeyJ) {
        if let Some(snippet) = params.export_json(model_id) {
            println!("--- tuning export for '{}' ---\n{}", model_id, snippet);
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn reflect_tuning_panel(
    config: Option<Res<SiteConfig>>,
    params: Res<ModelParams>,
    panel: Res<TuningPanelState>,
    mut text: Query<&mut Text, With<TuningPanelText>>,
) {
    let Some(config) = config else { return };
    let Ok(mut text) = text.single_mut() else {
        return;
    };

    let label = match config.ar.models.get(panel.selected) {
        Some(model) => {
            let axis_name = ["X", "Y", "Z"][panel.axis.min(2)];
            match params.get(&model.id) {
                Some(p) => format!(
                    "model: {}\nediting: {} {}\nscale {}\nposition {}\nrotation {}",
                    model.id,
                    panel.group.as_str(),
                    axis_name,
                    p.scale,
                    p.position,
                    p.rotation,
                ),
                None => format!("model: {} (params pending)", model.id),
            }
        }
        None => "no model selected".to_string(),
    };

    if text.0 != label {
        *text = Text::new(label);
    }
}
