use bevy::prelude::*;

/// Per-model transform triple. Structured vectors are the working
/// representation; the space-separated string form used by the declarative
/// scene format exists only at the markup boundary and in exported snippets.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransformParams {
    pub scale: Vec3,
    /// World units.
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            scale: Vec3::ONE,
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
        }
    }
}

impl TransformParams {
    /// Convert to a Bevy transform for the native preview entities.
    pub fn to_transform(&self) -> Transform {
        Transform::from_translation(self.position)
            .with_scale(self.scale)
            .with_rotation(Quat::from_euler(
                EulerRot::XYZ,
                self.rotation.x.to_radians(),
                self.rotation.y.to_radians(),
                self.rotation.z.to_radians(),
            ))
    }
}

/// Parse an `"x y z"` attribute string. Missing or malformed components fall
/// back to zero rather than failing; the configuration is operator-authored
/// and a partial vector is more useful than a dead scene.
pub fn parse_vec3(value: &str) -> Vec3 {
    let mut parts = value
        .split_whitespace()
        .map(|p| p.parse::<f32>().unwrap_or(0.0));
    Vec3::new(
        parts.next().unwrap_or(0.0),
        parts.next().unwrap_or(0.0),
        parts.next().unwrap_or(0.0),
    )
}

/// Serialise a vector back to the `"x y z"` attribute form.
pub fn format_vec3(value: Vec3) -> String {
    format!("{} {} {}", value.x, value.y, value.z)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plain_triples() {
        assert_eq!(parse_vec3("1 2.5 -3"), Vec3::new(1.0, 2.5, -3.0));
        assert_eq!(parse_vec3("0 0 0"), Vec3::ZERO);
    }

    #[test]
    fn tolerates_partial_and_malformed_input() {
        assert_eq!(parse_vec3("1 2"), Vec3::new(1.0, 2.0, 0.0));
        assert_eq!(parse_vec3(""), Vec3::ZERO);
        assert_eq!(parse_vec3("a 2 c"), Vec3::new(0.0, 2.0, 0.0));
        assert_eq!(parse_vec3("  1   1  1 "), Vec3::ONE);
    }

    #[test]
    fn formats_without_trailing_zeroes() {
        assert_eq!(format_vec3(Vec3::new(0.0, 2.5, 0.0)), "0 2.5 0");
        assert_eq!(format_vec3(Vec3::ONE), "1 1 1");
    }

    #[test]
    fn string_form_round_trips() {
        let v = Vec3::new(-4.25, 0.5, 180.0);
        assert_eq!(parse_vec3(&format_vec3(v)), v);
    }
}
