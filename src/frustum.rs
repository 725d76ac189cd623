//! View frustum extraction and visibility tests.

use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

/// Six-plane view frustum in world space. Planes point inward: a point p is
/// inside when `dot(plane.xyz, p) + plane.w >= 0` for every plane.
#[derive(Debug, Clone, Copy)]
pub struct Frustum {
    pub planes: [Vec4; 6],
}

impl Frustum {
    /// Extract the six clip planes from a view-projection matrix
    /// (Gribb/Hartmann). Works for any projection glam produces.
    pub fn from_view_proj(view_proj: &Mat4) -> Self {
        let r0 = view_proj.row(0);
        let r1 = view_proj.row(1);
        let r2 = view_proj.row(2);
        let r3 = view_proj.row(3);

        let mut planes = [
            r3 + r0, // left
            r3 - r0, // right
            r3 + r1, // bottom
            r3 - r1, // top
            r2,      // near (0..w clip depth)
            r3 - r2, // far
        ];
        for plane in &mut planes {
            let len = plane.xyz().length();
            if len > 0.0 {
                *plane /= len;
            }
        }
        Self { planes }
    }

    /// Test an axis-aligned box against all six planes. Conservative: may
    /// report true for boxes that only touch the frustum corners.
    pub fn intersects_aabb(&self, min: Vec3, max: Vec3) -> bool {
        for plane in &self.planes {
            let normal = plane.xyz();
            // Vertex of the box furthest along the plane normal.
            let positive = Vec3::new(
                if normal.x >= 0.0 { max.x } else { min.x },
                if normal.y >= 0.0 { max.y } else { min.y },
                if normal.z >= 0.0 { max.z } else { min.z },
            );
            if normal.dot(positive) + plane.w < 0.0 {
                return false;
            }
        }
        true
    }

    /// Raw plane data for upload into a 6 x vec4 uniform block.
    pub fn plane_array(&self) -> [[f32; 4]; 6] {
        let mut out = [[0.0f32; 4]; 6];
        for (dst, plane) in out.iter_mut().zip(self.planes.iter()) {
            *dst = plane.to_array();
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn look_down_z() -> Frustum {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 5.0, 10.0), Vec3::ZERO, Vec3::Y);
        let proj = Mat4::perspective_rh(60f32.to_radians(), 1.0, 0.1, 500.0);
        Frustum::from_view_proj(&(proj * view))
    }

    #[test]
    fn origin_box_is_visible() {
        let frustum = look_down_z();
        assert!(frustum.intersects_aabb(Vec3::splat(-1.0), Vec3::splat(1.0)));
    }

    #[test]
    fn box_behind_camera_is_culled() {
        let frustum = look_down_z();
        assert!(!frustum.intersects_aabb(Vec3::new(-1.0, -1.0, 100.0), Vec3::new(1.0, 1.0, 102.0)));
    }

    #[test]
    fn orthographic_frustum_contains_its_volume() {
        let proj = Mat4::orthographic_rh(-100.0, 100.0, -100.0, 100.0, 0.1, 200.0);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 50.0, 0.0), Vec3::ZERO, Vec3::Z);
        let frustum = Frustum::from_view_proj(&(proj * view));
        assert!(frustum.intersects_aabb(Vec3::new(-50.0, -10.0, -50.0), Vec3::new(50.0, 10.0, 50.0)));
        assert!(!frustum.intersects_aabb(Vec3::new(500.0, 0.0, 500.0), Vec3::new(501.0, 1.0, 501.0)));
    }
}
