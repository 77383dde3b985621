// License: MIT

//! Monte Carlo shadow-loss estimation.
//!
//! Samples sun positions across the year (the 15th of each month at three
//! local solar times) and random interior points on every panel, testing
//! each point against the projected shadow footprints of taller objects.
//! The RNG is injected so callers and tests can seed it.

use rand::Rng;

use crate::device::{DeviceKind, KindPredicates, PlacedObject, Vertex};

/// Local solar times sampled per month.
const SAMPLE_HOURS: [f64; 3] = [9.0, 12.0, 15.0];

/// Random interior points drawn per panel per sample.
const POINTS_PER_PANEL: usize = 5;

/// Shadow length is capped to avoid near-sunset blowup, in multiples of the
/// occluder height.
const MAX_SHADOW_LENGTH: f64 = 10.0;

/// Day of year of the 15th of each month.
const MID_MONTH_DOY: [f64; 12] = [
    15.0, 46.0, 74.0, 105.0, 135.0, 166.0, 196.0, 227.0, 258.0, 288.0, 319.0, 349.0,
];

/// Sun position for one sample, altitude and azimuth in radians.
/// Azimuth is measured from north, clockwise.
#[derive(Clone, Copy, Debug)]
struct SunPosition {
    altitude: f64,
    azimuth: f64,
}

/// Simplified solar position from day-of-year and UTC hour.
fn sun_position(doy: f64, utc_hour: f64, lat_deg: f64, lon_deg: f64) -> SunPosition {
    use std::f64::consts::PI;
    let deg = PI / 180.0;

    let declination = 23.45 * deg * (2.0 * PI * (284.0 + doy) / 365.0).sin();
    let solar_time = utc_hour + lon_deg / 15.0;
    let hour_angle = (solar_time - 12.0) * 15.0 * deg;
    let lat = lat_deg * deg;

    let sin_alt =
        lat.sin() * declination.sin() + lat.cos() * declination.cos() * hour_angle.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin();
    let azimuth = hour_angle
        .sin()
        .atan2(hour_angle.cos() * lat.sin() - declination.tan() * lat.cos())
        + PI;

    SunPosition { altitude, azimuth }
}

/// The planar displacement of a shadow cast by a unit-height edge.
fn shadow_vector(sun: SunPosition) -> (f64, f64) {
    let len = (1.0 / sun.altitude.tan()).min(MAX_SHADOW_LENGTH);
    (-sun.azimuth.sin() * len, sun.azimuth.cos() * len)
}

/// Ray-casting point-in-polygon test.
fn point_in_polygon(px: f64, py: f64, vertices: &[Vertex], dx: f64, dy: f64) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut inside = false;
    let mut j = vertices.len() - 1;
    for i in 0..vertices.len() {
        let (ax, ay) = (vertices[i].x + dx, vertices[i].y + dy);
        let (bx, by) = (vertices[j].x + dx, vertices[j].y + dy);
        if (ay > py) != (by > py) && px < (bx - ax) * (py - ay) / (by - ay) + ax {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Returns true if the occluder's shadow, displaced by `(vx, vy)` per meter
/// of height difference, covers the point.
fn shades_point(
    occluder: &PlacedObject,
    elevation_diff: f64,
    (vx, vy): (f64, f64),
    px: f64,
    py: f64,
) -> bool {
    let dx = vx * elevation_diff;
    let dy = vy * elevation_diff;
    match (&occluder.vertices, occluder.kind) {
        (Some(vertices), DeviceKind::Polygon) => point_in_polygon(px, py, vertices, dx, dy),
        _ => occluder.bounds().contains(px - dx, py - dy),
    }
}

/// Estimates the fraction of annual generation lost to shadowing, in [0, 1].
///
/// For each month the shaded panel area is averaged over the three time
/// samples (below-horizon samples count as unshaded), while the total panel
/// area is accumulated once; the final ratio divides the summed month
/// averages by the summed areas (12 × total panel area).
pub fn estimate_shadow_loss<R: Rng>(
    objects: &[PlacedObject],
    lat_deg: f64,
    lon_deg: f64,
    rng: &mut R,
) -> f64 {
    let panels: Vec<_> = objects.iter().filter(|o| o.is_panel()).collect();
    let total_panel_area: f64 = panels.iter().map(|p| p.w * p.h).sum();
    if panels.is_empty() || total_panel_area <= 0.0 {
        return 0.0;
    }

    let mut shaded_area_sum = 0.0;
    let mut area_sum = 0.0;

    for doy in MID_MONTH_DOY {
        let mut month_shaded = 0.0;

        for local_hour in SAMPLE_HOURS {
            let utc_hour = local_hour - lon_deg / 15.0;
            let sun = sun_position(doy, utc_hour, lat_deg, lon_deg);
            if sun.altitude <= 0.0 {
                continue;
            }
            let vec = shadow_vector(sun);

            for panel in &panels {
                let mut shaded_points = 0usize;
                for _ in 0..POINTS_PER_PANEL {
                    let px = panel.x + rng.gen::<f64>() * panel.w;
                    let py = panel.y + rng.gen::<f64>() * panel.h;

                    let shaded = objects.iter().any(|o| {
                        o.id != panel.id
                            && o.h_z > panel.h_z
                            && shades_point(o, o.h_z - panel.h_z, vec, px, py)
                    });
                    if shaded {
                        shaded_points += 1;
                    }
                }
                month_shaded +=
                    (shaded_points as f64 / POINTS_PER_PANEL as f64) * panel.w * panel.h;
            }
        }

        // Always average over the three time samples; a sample below the
        // horizon contributes no shade.
        shaded_area_sum += month_shaded / SAMPLE_HOURS.len() as f64;
        area_sum += total_panel_area;
    }

    if area_sum <= 0.0 {
        return 0.0;
    }
    (shaded_area_sum / area_sum).clamp(0.0, 1.0)
}
