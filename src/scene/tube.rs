use crate::scene::curve::ClosedCurve;
use glam::{Quat, Vec3};
use std::f32::consts::TAU;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TubeSettings {
    pub tubular_segments: usize,
    pub radius: f32,
    pub radial_segments: usize,
}

impl Default for TubeSettings {
    fn default() -> Self {
        Self {
            tubular_segments: 270,
            radius: 0.85,
            radial_segments: 18,
        }
    }
}

/// Rotation-minimizing frames sampled along a closed curve.
#[derive(Debug, Clone)]
pub struct TubeFrames {
    pub tangents: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub binormals: Vec<Vec3>,
}

/// Parallel-transport frames for `segments + 1` samples. The accumulated twist is spread over
/// the loop so the last frame lines up with the first.
pub fn compute_frames(curve: &ClosedCurve, segments: usize) -> TubeFrames {
    let segments = segments.max(1);
    let tangents: Vec<Vec3> = (0..=segments)
        .map(|i| curve.tangent_at(i as f32 / segments as f32))
        .collect();

    let t0 = tangents[0];
    let axis = smallest_axis(t0);
    let v = t0.cross(axis).normalize();
    let mut normals = vec![t0.cross(v)];
    let mut binormals = vec![t0.cross(normals[0])];

    for i in 1..=segments {
        let mut n = normals[i - 1];
        let axis = tangents[i - 1].cross(tangents[i]);
        if axis.length() > f32::EPSILON {
            let theta = tangents[i - 1].dot(tangents[i]).clamp(-1.0, 1.0).acos();
            n = Quat::from_axis_angle(axis.normalize(), theta) * n;
        }
        normals.push(n);
        binormals.push(tangents[i].cross(n));
    }

    let mut theta = normals[0].dot(normals[segments]).clamp(-1.0, 1.0).acos() / segments as f32;
    if tangents[0].dot(normals[0].cross(normals[segments])) > 0.0 {
        theta = -theta;
    }
    for i in 1..=segments {
        normals[i] = Quat::from_axis_angle(tangents[i], theta * i as f32) * normals[i];
        binormals[i] = tangents[i].cross(normals[i]);
    }

    TubeFrames {
        tangents,
        normals,
        binormals,
    }
}

fn smallest_axis(t: Vec3) -> Vec3 {
    let a = t.abs();
    if a.x <= a.y && a.x <= a.z {
        Vec3::X
    } else if a.y <= a.z {
        Vec3::Y
    } else {
        Vec3::Z
    }
}

/// Triangle-edge wireframe of a closed tube: rings, longitudinal rails and one diagonal per quad.
#[derive(Debug, Clone)]
pub struct TubeWireframe {
    pub edges: Vec<[Vec3; 2]>,
    pub settings: TubeSettings,
}

impl TubeWireframe {
    pub fn build(curve: &ClosedCurve, settings: TubeSettings) -> Self {
        let segs = settings.tubular_segments.max(3);
        let radial = settings.radial_segments.max(3);
        let frames = compute_frames(curve, segs);

        let rings: Vec<Vec<Vec3>> = (0..segs)
            .map(|i| {
                let center = curve.position_at(i as f32 / segs as f32);
                (0..radial)
                    .map(|j| {
                        let a = j as f32 / radial as f32 * TAU;
                        let dir = a.sin() * frames.normals[i] - a.cos() * frames.binormals[i];
                        center + settings.radius * dir
                    })
                    .collect()
            })
            .collect();

        let mut edges = Vec::with_capacity(segs * radial * 3);
        for i in 0..segs {
            let next = (i + 1) % segs;
            for j in 0..radial {
                let j1 = (j + 1) % radial;
                edges.push([rings[i][j], rings[i][j1]]);
                edges.push([rings[i][j], rings[next][j]]);
                edges.push([rings[i][j1], rings[next][j]]);
            }
        }

        Self { edges, settings }
    }
}
