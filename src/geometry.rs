use std::f32::consts::PI;

/// Upper bound on sphere segments per axis. Keeps every vertex index well
/// inside `u32`.
pub const MAX_SPHERE_SEGMENTS: u32 = 512;

/// Indexed triangle mesh with interleaved position/normal vertices.
#[derive(Clone, Debug, Default)]
pub struct MeshData {
    /// px, py, pz, nx, ny, nz per vertex.
    pub vertices: Vec<f32>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub const STRIDE: usize = 6;

    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / Self::STRIDE
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// UV sphere centered at the origin. The poles are degenerate rows, so
    /// their triangles are skipped. Segment counts are clamped to
    /// [`MAX_SPHERE_SEGMENTS`].
    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let w = width_segments.clamp(3, MAX_SPHERE_SEGMENTS);
        let h = height_segments.clamp(2, MAX_SPHERE_SEGMENTS);
        let (wu, hu) = (w as usize, h as usize);
        let mut mesh = MeshData {
            vertices: Vec::with_capacity((wu + 1) * (hu + 1) * Self::STRIDE),
            indices: Vec::with_capacity(wu * hu * 6),
        };

        for iy in 0..=h {
            let v = iy as f32 / h as f32;
            for ix in 0..=w {
                let u = ix as f32 / w as f32;
                let nx = -(u * 2.0 * PI).cos() * (v * PI).sin();
                let ny = (v * PI).cos();
                let nz = (u * 2.0 * PI).sin() * (v * PI).sin();
                mesh.vertices
                    .extend_from_slice(&[radius * nx, radius * ny, radius * nz, nx, ny, nz]);
            }
        }

        let row = w + 1;
        for iy in 0..h {
            for ix in 0..w {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                if iy != 0 {
                    mesh.indices.extend_from_slice(&[a, b, d]);
                }
                if iy != h - 1 {
                    mesh.indices.extend_from_slice(&[b, c, d]);
                }
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sphere_counts() {
        let mesh = MeshData::sphere(2.0, 8, 4);
        assert_eq!(mesh.vertex_count(), 9 * 5);
        // Every band has two triangles per quad except the polar bands.
        assert_eq!(mesh.triangle_count(), 8 * 4 * 2 - 2 * 8);
        let max = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max < mesh.vertex_count());
    }

    #[test]
    fn oversized_segment_counts_are_clamped() {
        let mesh = MeshData::sphere(1.0, 70_000, 70_000);
        let n = MAX_SPHERE_SEGMENTS as usize;
        assert_eq!(mesh.vertex_count(), (n + 1) * (n + 1));
        let max = *mesh.indices.iter().max().unwrap() as usize;
        assert!(max < mesh.vertex_count());
    }

    #[test]
    fn vertices_lie_on_the_sphere() {
        let mesh = MeshData::sphere(2.2, 16, 8);
        for v in mesh.vertices.chunks(MeshData::STRIDE) {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - 2.2).abs() < 1e-4);
            let n = (v[3] * v[3] + v[4] * v[4] + v[5] * v[5]).sqrt();
            assert!((n - 1.0).abs() < 1e-4);
        }
    }
}
