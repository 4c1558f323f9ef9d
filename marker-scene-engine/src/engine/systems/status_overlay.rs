//! Status overlay.
//!
//! The viewport always shows something: a progress line while loading, a
//! framing guide and instruction while scanning, a success badge while a
//! target is held, and a message with a reload affordance after a fault.
//! The error overlay fully replaces the scene view.

use bevy::prelude::*;

use crate::engine::core::app_state::RecognitionStatus;
use crate::engine::loading::progress::LoadingProgress;

#[derive(Component)]
pub struct StatusOverlayRoot;
#[derive(Component)]
pub struct LoadingGroup;
#[derive(Component)]
pub struct LoadingText;
#[derive(Component)]
pub struct ScanningGroup;
#[derive(Component)]
pub struct FoundGroup;
#[derive(Component)]
pub struct ErrorGroup;

const GOLD: Color = Color::srgb(0.78, 0.64, 0.36);
const DARK: Color = Color::srgba(0.08, 0.08, 0.13, 0.92);

pub fn spawn_status_overlay(mut commands: Commands) {
    commands.spawn(Camera2d);

    commands
        .spawn((
            StatusOverlayRoot,
            Name::new("StatusOverlay"),
            Node {
                width: Val::Percent(100.0),
                height: Val::Percent(100.0),
                position_type: PositionType::Absolute,
                display: Display::Flex,
                align_items: AlignItems::Center,
                justify_content: JustifyContent::Center,
                ..default()
            },
        ))
        .with_children(|parent| {
            // Loading: progress percentage.
            parent
                .spawn((
                    LoadingGroup,
                    Name::new("LoadingGroup"),
                    BackgroundColor(DARK),
                    Node {
                        padding: UiRect::all(Val::Px(24.0)),
                        display: Display::Flex,
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(8.0),
                        ..default()
                    },
                ))
                .with_children(|group| {
                    group.spawn((
                        Text::new("Loading AR engine"),
                        TextFont {
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(GOLD),
                    ));
                    group.spawn((
                        LoadingText,
                        Text::new("0%"),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(Color::srgba(1.0, 1.0, 1.0, 0.6)),
                    ));
                });

            // Scanning: framing guide hint.
            parent
                .spawn((
                    ScanningGroup,
                    Name::new("ScanningGroup"),
                    Node {
                        position_type: PositionType::Absolute,
                        bottom: Val::Px(96.0),
                        display: Display::None,
                        ..default()
                    },
                ))
                .with_children(|group| {
                    group.spawn((
                        Text::new("Point the camera at the target image"),
                        TextFont {
                            font_size: 15.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        BackgroundColor(Color::srgba(0.0, 0.0, 0.0, 0.5)),
                    ));
                });

            // Found: success badge.
            parent
                .spawn((
                    FoundGroup,
                    Name::new("FoundGroup"),
                    Node {
                        position_type: PositionType::Absolute,
                        top: Val::Px(80.0),
                        display: Display::None,
                        ..default()
                    },
                ))
                .with_children(|group| {
                    group.spawn((
                        Text::new("Target recognised — model active"),
                        TextFont {
                            font_size: 15.0,
                            ..default()
                        },
                        TextColor(Color::WHITE),
                        BackgroundColor(GOLD.with_alpha(0.9)),
                    ));
                });

            // Error: message plus reload affordance.
            parent
                .spawn((
                    ErrorGroup,
                    Name::new("ErrorGroup"),
                    BackgroundColor(DARK),
                    Node {
                        padding: UiRect::all(Val::Px(24.0)),
                        display: Display::None,
                        flex_direction: FlexDirection::Column,
                        align_items: AlignItems::Center,
                        row_gap: Val::Px(8.0),
                        ..default()
                    },
                ))
                .with_children(|group| {
                    group.spawn((
                        Text::new("AR failed to load"),
                        TextFont {
                            font_size: 18.0,
                            ..default()
                        },
                        TextColor(Color::srgb(0.85, 0.3, 0.3)),
                    ));
                    group.spawn((
                        Text::new("Reload the page to retry"),
                        TextFont {
                            font_size: 14.0,
                            ..default()
                        },
                        TextColor(Color::srgba(1.0, 1.0, 1.0, 0.6)),
                    ));
                });
        });
}

/// Toggle the overlay groups to match the aggregate state and keep the
/// loading percentage current.
pub fn reflect_status_overlay(
    state: Res<State<RecognitionStatus>>,
    progress: Res<LoadingProgress>,
    mut groups: ParamSet<(
        Query<&mut Node, With<LoadingGroup>>,
        Query<&mut Node, With<ScanningGroup>>,
        Query<&mut Node, With<FoundGroup>>,
        Query<&mut Node, With<ErrorGroup>>,
    )>,
    mut loading_text: Query<&mut Text, With<LoadingText>>,
) {
    let status = *state.get();

    let display = |visible: bool| if visible { Display::Flex } else { Display::None };
    if let Ok(mut node) = groups.p0().single_mut() {
        node.display = display(status == RecognitionStatus::Loading);
    }
    if let Ok(mut node) = groups.p1().single_mut() {
        node.display = display(status == RecognitionStatus::Scanning);
    }
    if let Ok(mut node) = groups.p2().single_mut() {
        node.display = display(status == RecognitionStatus::Found);
    }
    if let Ok(mut node) = groups.p3().single_mut() {
        node.display = display(status == RecognitionStatus::Error);
    }

    if status == RecognitionStatus::Loading {
        if let Ok(mut text) = loading_text.single_mut() {
            let label = format!("{}%", progress.percent);
            if text.0 != label {
                *text = Text::new(label);
            }
        }
    }
}
