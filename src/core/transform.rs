//! Factorio → host coordinate transform
//!
//! Factorio axes:
//! - x: east- / west+
//! - y: north- / south+
//! - z: height within the current surface
//!
//! Host axes:
//! - x: east- / west+
//! - y: up+ / down-
//! - z: north+ / south-
//!
//! Each surface is lifted by `surface * spacing` on the host's vertical axis
//! so players on different surfaces are too far apart to hear each other.

use super::types::{Observer, ParsedRecord, SpatialFrame};

/// Listener facing direction (host axes)
pub const FRONT: [f32; 3] = [0.0, -1.0, 0.0];

/// Listener up vector (host axes)
pub const TOP: [f32; 3] = [0.0, 0.0, 1.0];

/// Map a Factorio position to host space.
pub fn to_host_position(record: &ParsedRecord, spacing: f32) -> [f32; 3] {
    [
        record.x,
        record.z + record.surface as f32 * spacing,
        -record.y,
    ]
}

/// Build the frame for one record. Avatar and camera are the same point.
pub fn transform(record: &ParsedRecord, spacing: f32) -> SpatialFrame {
    let observer = Observer {
        position: to_host_position(record, spacing),
        front: FRONT,
        top: TOP,
    };

    SpatialFrame {
        avatar: observer,
        camera: observer,
        context: record.server.clone(),
        identity: record.player.to_string(),
    }
}

/// True if the record's height is small enough that its surface band
/// cannot reach a neighbouring one.
pub fn within_separation_bound(record: &ParsedRecord, bound: f32) -> bool {
    record.z.abs() < bound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::constants::{SEPARATION_BOUND, SURFACE_SPACING};
    use proptest::prelude::*;

    fn record(x: f32, y: f32, z: f32, surface: i32) -> ParsedRecord {
        ParsedRecord {
            x,
            y,
            z,
            surface,
            player: 7,
            server: "saveA".to_string(),
        }
    }

    #[test]
    fn test_transform_sample() {
        let frame = transform(&record(10.0, 20.0, 0.0, 1), SURFACE_SPACING);
        assert_eq!(frame.avatar.position, [10.0, 1000.0, -20.0]);
        assert_eq!(frame.camera, frame.avatar);
        assert_eq!(frame.avatar.front, [0.0, -1.0, 0.0]);
        assert_eq!(frame.avatar.top, [0.0, 0.0, 1.0]);
        assert_eq!(frame.context, "saveA");
        assert_eq!(frame.identity, "7");
    }

    #[test]
    fn test_negative_surface_and_identity() {
        let mut rec = record(-3.5, -8.0, 2.0, -2);
        rec.player = -1;
        let frame = transform(&rec, SURFACE_SPACING);
        assert_eq!(frame.avatar.position, [-3.5, -1998.0, 8.0]);
        assert_eq!(frame.identity, "-1");
    }

    #[test]
    fn test_transform_is_deterministic() {
        let rec = record(1.25, 2.5, 3.75, 4);
        assert_eq!(
            transform(&rec, SURFACE_SPACING),
            transform(&rec, SURFACE_SPACING)
        );
    }

    #[test]
    fn test_separation_bound() {
        assert!(within_separation_bound(
            &record(0.0, 0.0, 499.0, 1),
            SEPARATION_BOUND
        ));
        assert!(!within_separation_bound(
            &record(0.0, 0.0, -500.0, 1),
            SEPARATION_BOUND
        ));
    }

    proptest! {
        #[test]
        fn prop_height_is_local_z_plus_surface_offset(
            z in -499i32..499,
            surface in -50i32..50,
        ) {
            let pos = to_host_position(&record(0.0, 0.0, z as f32, surface), SURFACE_SPACING);
            prop_assert_eq!(pos[1], z as f32 + 1000.0 * surface as f32);
        }

        #[test]
        fn prop_distinct_surfaces_never_collide(
            z1 in -499.0f32..499.0,
            z2 in -499.0f32..499.0,
            s1 in -50i32..50,
            s2 in -50i32..50,
        ) {
            prop_assume!(s1 != s2);
            let a = to_host_position(&record(0.0, 0.0, z1, s1), SURFACE_SPACING);
            let b = to_host_position(&record(0.0, 0.0, z2, s2), SURFACE_SPACING);
            prop_assert!(a[1] != b[1]);
        }
    }
}
