use glam::DVec2;

use crate::config::validate_surface;
use crate::error::SimResult;
use crate::water::wave::WaveField;

/// Rows in the strip: the flat bottom edge and the moving top edge.
const ROWS: usize = 2;

/// Renderable two-row strip matching a [`WaveField`].
///
/// Vertices are stored row-major (`row * columns + column`) in the water's
/// local space, centred on the origin. Only the y of top-row vertices ever
/// changes between regenerations.
#[derive(Debug, Clone, Default)]
pub struct SurfaceGeometry {
    columns: usize,
    width: f64,
    height: f64,
    vertices: Vec<DVec2>,
    triangles: Vec<u32>,
    uvs: Vec<DVec2>,
    top_vertex_index: Vec<usize>,
}

impl SurfaceGeometry {
    pub fn regenerate(point_count: usize, width: f64, height: f64) -> SimResult<Self> {
        let mut geometry = Self::default();
        geometry.rebuild(point_count, width, height)?;
        Ok(geometry)
    }

    /// Rebuild in place. On error the previous geometry is left untouched.
    pub fn rebuild(&mut self, point_count: usize, width: f64, height: f64) -> SimResult<()> {
        validate_surface(point_count, width, height)?;

        let columns = point_count;
        let mut vertices = Vec::with_capacity(columns * ROWS);
        let mut top_vertex_index = Vec::with_capacity(columns);
        for row in 0..ROWS {
            for column in 0..columns {
                let x = (column as f64 / (columns - 1) as f64) * width - width / 2.0;
                let y = (row as f64 / (ROWS - 1) as f64) * height - height / 2.0;
                vertices.push(DVec2::new(x, y));
                if row == ROWS - 1 {
                    top_vertex_index.push(row * columns + column);
                }
            }
        }

        let mut triangles = Vec::with_capacity((columns - 1) * (ROWS - 1) * 6);
        for row in 0..ROWS - 1 {
            for column in 0..columns - 1 {
                let bottom_left = (row * columns + column) as u32;
                let bottom_right = bottom_left + 1;
                let top_left = bottom_left + columns as u32;
                let top_right = top_left + 1;
                triangles.extend_from_slice(&[
                    bottom_left,
                    top_left,
                    bottom_right,
                    bottom_right,
                    top_left,
                    top_right,
                ]);
            }
        }

        let uvs = vertices
            .iter()
            .map(|v| DVec2::new((v.x + width / 2.0) / width, (v.y + height / 2.0) / height))
            .collect();

        *self = Self {
            columns,
            width,
            height,
            vertices,
            triangles,
            uvs,
            top_vertex_index,
        };
        log::debug!(
            "surface geometry rebuilt: {} columns, {:.2} x {:.2}",
            columns,
            width,
            height
        );
        Ok(())
    }

    /// Copy the wave heights into the top row. Topology, UVs and the bottom
    /// row are untouched. Extra points on either side are ignored.
    pub fn sync_top_row(&mut self, wave: &WaveField) {
        for (&vertex, height) in self.top_vertex_index.iter().zip(wave.heights()) {
            self.vertices[vertex].y = height;
        }
    }

    /// World positions of the first and last top-row vertices.
    pub fn edge_endpoints(&self, origin: DVec2) -> (DVec2, DVec2) {
        let first = self.vertices[self.top_vertex_index[0]];
        let last = self.vertices[self.top_vertex_index[self.columns - 1]];
        (origin + first, origin + last)
    }

    /// Resting y of the top edge in local space.
    pub fn top_rest_height(&self) -> f64 {
        self.height / 2.0
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn vertices(&self) -> &[DVec2] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[u32] {
        &self.triangles
    }

    pub fn uvs(&self) -> &[DVec2] {
        &self.uvs
    }

    pub fn top_vertex_index(&self, wave_index: usize) -> usize {
        self.top_vertex_index[wave_index]
    }

    pub fn top_heights(&self) -> impl Iterator<Item = f64> + '_ {
        self.top_vertex_index.iter().map(|&i| self.vertices[i].y)
    }
}
