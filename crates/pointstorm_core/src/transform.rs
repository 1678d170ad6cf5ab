//! Per-frame transform
//!
//! Column-major 4x4 matrices laid out the way WGSL `mat4x4<f32>` expects
//! (`m[column][row]`).

use crate::resolution::Resolution;

/// Column-major 4x4 matrix
pub type Mat4 = [[f32; 4]; 4];

pub const IDENTITY: Mat4 = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

/// Counter-clockwise rotation about the Z axis
pub fn rotation_z(angle: f32) -> Mat4 {
    let (s, c) = angle.sin_cos();
    [
        [c, s, 0.0, 0.0],
        [-s, c, 0.0, 0.0],
        [0.0, 0.0, 1.0, 0.0],
        [0.0, 0.0, 0.0, 1.0],
    ]
}

/// Orthographic projection mapping the given box onto clip space
pub fn ortho(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
    [
        [2.0 / (right - left), 0.0, 0.0, 0.0],
        [0.0, 2.0 / (top - bottom), 0.0, 0.0],
        [0.0, 0.0, -2.0 / (far - near), 0.0],
        [
            -(right + left) / (right - left),
            -(top + bottom) / (top - bottom),
            -(far + near) / (far - near),
            1.0,
        ],
    ]
}

/// Matrix product `a * b`
pub fn mul(a: &Mat4, b: &Mat4) -> Mat4 {
    let mut result = [[0.0f32; 4]; 4];
    for i in 0..4 {
        for j in 0..4 {
            result[i][j] =
                a[0][j] * b[i][0] + a[1][j] * b[i][1] + a[2][j] * b[i][2] + a[3][j] * b[i][3];
        }
    }
    result
}

/// Apply `m` to a homogeneous point
pub fn transform(m: &Mat4, v: [f32; 4]) -> [f32; 4] {
    let mut out = [0.0f32; 4];
    for (row, out) in out.iter_mut().enumerate() {
        *out = m[0][row] * v[0] + m[1][row] * v[1] + m[2][row] * v[2] + m[3][row] * v[3];
    }
    out
}

/// Projection for the current viewport: x spans `[-aspect, aspect]`, y spans `[-1, 1]`
pub fn projection(resolution: Resolution) -> Mat4 {
    let ratio = resolution.aspect();
    ortho(-ratio, ratio, -1.0, 1.0, 1.0, -1.0)
}

/// Combined matrix for one frame; the rotation angle in radians is the
/// elapsed time in seconds
pub fn frame_transform(elapsed_seconds: f32, resolution: Resolution) -> Mat4 {
    mul(&projection(resolution), &rotation_z(elapsed_seconds))
}
