pub mod mesh;
pub mod shader;

use glam::{DVec2, Mat4, Vec3};
use hecs::World;
use mesh::Mesh;
use shader::ShaderProgram;

use tidepool::components::{Bounds, PreviousPosition, Tint, Transform2d};
use tidepool::water::WaterSurface;

const VERT_SRC: &str = r#"#version 330 core
layout(location = 0) in vec2 a_pos;
layout(location = 1) in vec2 a_uv;
uniform mat4 u_view_proj;
uniform mat4 u_model;
out vec2 v_uv;
void main() {
    v_uv = a_uv;
    gl_Position = u_view_proj * u_model * vec4(a_pos, 0.0, 1.0);
}
"#;

const FRAG_SRC: &str = r#"#version 330 core
in vec2 v_uv;
uniform vec3 u_color;
uniform float u_gradient;
out vec4 frag_color;
void main() {
    float shade = mix(1.0, 0.55 + 0.45 * v_uv.y, u_gradient);
    frag_color = vec4(u_color * shade, 1.0);
}
"#;

const BACKGROUND: Vec3 = Vec3::new(0.62, 0.78, 0.88);
const WATER_COLOR: Vec3 = Vec3::new(0.12, 0.42, 0.75);
/// World units visible vertically.
const VIEW_HEIGHT: f32 = 14.0;

pub struct Renderer {
    shader: ShaderProgram,
    quad: Mesh,
    water: Mesh,
    water_vertices: Vec<f32>,
}

impl Renderer {
    pub fn init() -> Result<Self, String> {
        unsafe {
            gl::ClearColor(BACKGROUND.x, BACKGROUND.y, BACKGROUND.z, 1.0);
        }
        Ok(Self {
            shader: ShaderProgram::from_sources(VERT_SRC, FRAG_SRC)?,
            quad: Mesh::quad(),
            water: Mesh::new(),
            water_vertices: Vec::new(),
        })
    }

    pub fn resize(&self, width: u32, height: u32) {
        unsafe {
            gl::Viewport(0, 0, width as i32, height as i32);
        }
    }

    /// Draw bodies at `alpha` between their previous and current fixed-step
    /// positions, then the water strip over them.
    pub fn draw_scene(&mut self, world: &World, surface: &WaterSurface, aspect: f32, alpha: f64) {
        unsafe {
            gl::Clear(gl::COLOR_BUFFER_BIT);
        }

        let center = surface.origin().as_vec2();
        let half_h = VIEW_HEIGHT / 2.0;
        let half_w = half_h * aspect;
        let view_proj = Mat4::orthographic_rh_gl(
            center.x - half_w,
            center.x + half_w,
            center.y - half_h + 2.0,
            center.y + half_h + 2.0,
            -1.0,
            1.0,
        );

        self.shader.bind();
        self.shader.set_mat4("u_view_proj", &view_proj);

        self.shader.set_float("u_gradient", 0.0);
        for (_entity, (transform, bounds, tint, previous)) in world
            .query::<(&Transform2d, &Bounds, &Tint, Option<&PreviousPosition>)>()
            .iter()
        {
            let position = match previous {
                Some(prev) => prev.0.lerp(transform.position, alpha),
                None => transform.position,
            };
            let model = Mat4::from_translation(position.as_vec2().extend(0.0))
                * Mat4::from_rotation_z(transform.rotation as f32)
                * Mat4::from_scale((bounds.0 * 2.0).as_vec2().extend(1.0));
            self.shader.set_mat4("u_model", &model);
            self.shader.set_vec3("u_color", Vec3::from_array(tint.0));
            self.quad.draw();
        }

        self.upload_water(surface);
        self.shader.set_float("u_gradient", 1.0);
        self.shader.set_mat4("u_model", &Mat4::IDENTITY);
        self.shader.set_vec3("u_color", WATER_COLOR);
        self.water.draw();
    }

    fn upload_water(&mut self, surface: &WaterSurface) {
        let geometry = surface.geometry();
        let origin = surface.origin();
        self.water_vertices.clear();
        for (vertex, uv) in geometry.vertices().iter().zip(geometry.uvs()) {
            let world_pos: DVec2 = origin + *vertex;
            self.water_vertices.extend_from_slice(&[
                world_pos.x as f32,
                world_pos.y as f32,
                uv.x as f32,
                uv.y as f32,
            ]);
        }
        self.water
            .upload(&self.water_vertices, geometry.triangles(), gl::DYNAMIC_DRAW);
    }
}
