use js_sys::{Float32Array, Object, Reflect, Uint32Array};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    window, HtmlCanvasElement, WebGl2RenderingContext as GL, WebGlBuffer, WebGlProgram,
    WebGlUniformLocation,
    WebGlVertexArrayObject,
};

use super::shaders;
use crate::color::Color;
use crate::error::SceneError;
use crate::geometry::MeshData;
use crate::particles::PARTICLE_STRIDE;
use crate::scene::{Face, FrameData, MeshKind, RenderBackend, RenderSurface, SceneGeometry};

const F32_BYTES: i32 = 4;

/// The orb canvas together with the CSS size the page assigned to it.
pub struct CanvasSurface {
    pub canvas: HtmlCanvasElement,
    pub width: u32,
    pub height: u32,
}

impl RenderSurface for CanvasSurface {
    type Backend = WebGlBackend;

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn create_backend(&self, geometry: &SceneGeometry) -> Result<WebGlBackend, SceneError> {
        WebGlBackend::new(self.canvas.clone(), geometry)
    }
}

struct GpuMesh {
    vao: WebGlVertexArrayObject,
    index_count: i32,
    _vertices: WebGlBuffer,
    _indices: WebGlBuffer,
}

struct MeshUniforms {
    view_proj: Option<WebGlUniformLocation>,
    model: Option<WebGlUniformLocation>,
    color: Option<WebGlUniformLocation>,
    emissive: Option<WebGlUniformLocation>,
    emissive_intensity: Option<WebGlUniformLocation>,
    opacity: Option<WebGlUniformLocation>,
    lit: Option<WebGlUniformLocation>,
    camera_position: Option<WebGlUniformLocation>,
    ambient: Option<WebGlUniformLocation>,
    dir_color: Option<WebGlUniformLocation>,
    dir_position: Option<WebGlUniformLocation>,
    point_position: [Option<WebGlUniformLocation>; 2],
    point_color: [Option<WebGlUniformLocation>; 2],
    point_range: [Option<WebGlUniformLocation>; 2],
    time: Option<WebGlUniformLocation>,
    pulse: Option<WebGlUniformLocation>,
}

impl MeshUniforms {
    fn locate(gl: &GL, program: &WebGlProgram) -> Self {
        let at = |name: &str| gl.get_uniform_location(program, name);
        MeshUniforms {
            view_proj: at("u_view_proj"),
            model: at("u_model"),
            color: at("u_color"),
            emissive: at("u_emissive"),
            emissive_intensity: at("u_emissive_intensity"),
            opacity: at("u_opacity"),
            lit: at("u_lit"),
            camera_position: at("u_camera_position"),
            ambient: at("u_ambient"),
            dir_color: at("u_dir_color"),
            dir_position: at("u_dir_position"),
            point_position: [at("u_point_position[0]"), at("u_point_position[1]")],
            point_color: [at("u_point_color[0]"), at("u_point_color[1]")],
            point_range: [at("u_point_range[0]"), at("u_point_range[1]")],
            time: at("u_time"),
            pulse: at("u_pulse"),
        }
    }
}

struct ParticleUniforms {
    resolution: Option<WebGlUniformLocation>,
    pixel_ratio: Option<WebGlUniformLocation>,
    colors: [Option<WebGlUniformLocation>; 2],
}

/// WebGL2 renderer for the orb scene. All buffers are created up front. The
/// particle buffer only grows when a frame carries more particles than it
/// holds; otherwise its contents are overwritten with `bufferSubData`.
pub struct WebGlBackend {
    gl: GL,
    canvas: HtmlCanvasElement,
    mesh_program: WebGlProgram,
    mesh_uniforms: MeshUniforms,
    particle_program: WebGlProgram,
    particle_uniforms: ParticleUniforms,
    core: GpuMesh,
    glow: GpuMesh,
    particle_vao: WebGlVertexArrayObject,
    particle_buffer: WebGlBuffer,
    /// Floats the particle buffer's storage can hold.
    particle_capacity: usize,
    /// Buffers created through `create_buffer` so far.
    allocated_buffers: usize,
    pixel_ratio: f64,
}

impl WebGlBackend {
    pub fn new(canvas: HtmlCanvasElement, geometry: &SceneGeometry) -> Result<Self, SceneError> {
        let options = Object::new();
        Reflect::set(&options, &"alpha".into(), &JsValue::TRUE)?;
        Reflect::set(&options, &"antialias".into(), &JsValue::TRUE)?;
        let gl: GL = canvas
            .get_context_with_context_options("webgl2", &options)?
            .ok_or_else(|| SceneError::context("WebGL2 not supported"))?
            .dyn_into()
            .map_err(|_| SceneError::context("webgl2 context has unexpected type"))?;

        let mesh_program = shaders::link(&gl, shaders::MESH_VERT, shaders::MESH_FRAG)?;
        let mesh_uniforms = MeshUniforms::locate(&gl, &mesh_program);
        let particle_program = shaders::link(&gl, shaders::PARTICLE_VERT, shaders::PARTICLE_FRAG)?;
        let particle_uniforms = ParticleUniforms {
            resolution: gl.get_uniform_location(&particle_program, "u_resolution"),
            pixel_ratio: gl.get_uniform_location(&particle_program, "u_pixel_ratio"),
            colors: [
                gl.get_uniform_location(&particle_program, "u_colors[0]"),
                gl.get_uniform_location(&particle_program, "u_colors[1]"),
            ],
        };

        let mut allocated_buffers = 0;
        let core = upload_mesh(&gl, &geometry.core, &mut allocated_buffers)?;
        let glow = upload_mesh(&gl, &geometry.glow, &mut allocated_buffers)?;
        let (particle_vao, particle_buffer) = create_particle_buffers(&gl, &mut allocated_buffers)?;

        gl.enable(GL::DEPTH_TEST);
        gl.enable(GL::BLEND);
        gl.blend_func(GL::SRC_ALPHA, GL::ONE_MINUS_SRC_ALPHA);
        gl.clear_color(0.0, 0.0, 0.0, 0.0);

        let pixel_ratio = window().map(|w| w.device_pixel_ratio()).unwrap_or(1.0).max(1.0);

        Ok(WebGlBackend {
            gl,
            canvas,
            mesh_program,
            mesh_uniforms,
            particle_program,
            particle_uniforms,
            core,
            glow,
            particle_vao,
            particle_buffer,
            particle_capacity: 0,
            allocated_buffers,
            pixel_ratio,
        })
    }

    fn draw_meshes(&self, frame: &FrameData<'_>) {
        let gl = &self.gl;
        let u = &self.mesh_uniforms;
        gl.use_program(Some(&self.mesh_program));
        let view_proj = frame.view_projection.to_cols_array();
        gl.uniform_matrix4fv_with_f32_array(u.view_proj.as_ref(), false, &view_proj);
        gl.uniform_matrix4fv_with_f32_array(u.model.as_ref(), false, &frame.model.to_cols_array());
        let cam = frame.camera_position;
        gl.uniform3f(u.camera_position.as_ref(), cam.x, cam.y, cam.z);
        set_color(gl, u.ambient.as_ref(), frame.ambient);
        set_color(gl, u.dir_color.as_ref(), frame.directional);
        let d = frame.directional_position;
        gl.uniform3f(u.dir_position.as_ref(), d.x, d.y, d.z);
        for (i, light) in frame.point_lights.iter().enumerate() {
            let p = light.position;
            gl.uniform3f(u.point_position[i].as_ref(), p.x, p.y, p.z);
            set_color(gl, u.point_color[i].as_ref(), light.color.scaled(light.intensity));
            gl.uniform1f(u.point_range[i].as_ref(), light.range);
        }
        gl.uniform1f(u.time.as_ref(), frame.time);
        gl.uniform1f(u.pulse.as_ref(), frame.pulse);

        gl.enable(GL::DEPTH_TEST);
        gl.enable(GL::CULL_FACE);
        for node in frame.meshes {
            let mesh = match node.kind {
                MeshKind::Core => &self.core,
                MeshKind::Glow => &self.glow,
            };
            let m = &node.material;
            gl.cull_face(match m.face {
                Face::Front => GL::BACK,
                Face::Back => GL::FRONT,
            });
            // Translucent shells must not hide what lies behind them.
            gl.depth_mask(m.lit);
            set_color(gl, u.color.as_ref(), m.color);
            set_color(gl, u.emissive.as_ref(), m.emissive);
            gl.uniform1f(u.emissive_intensity.as_ref(), m.emissive_intensity);
            gl.uniform1f(u.opacity.as_ref(), m.opacity);
            gl.uniform1i(u.lit.as_ref(), m.lit as i32);

            gl.bind_vertex_array(Some(&mesh.vao));
            gl.draw_elements_with_i32(GL::TRIANGLES, mesh.index_count, GL::UNSIGNED_INT, 0);
        }
        gl.depth_mask(true);
        gl.disable(GL::CULL_FACE);
    }

    fn draw_particles(&mut self, frame: &FrameData<'_>) {
        let count = frame.particle_count();
        if count == 0 {
            return;
        }
        let gl = &self.gl;
        let u = &self.particle_uniforms;
        gl.use_program(Some(&self.particle_program));
        let (w, h) = frame.surface_size;
        gl.uniform2f(u.resolution.as_ref(), w as f32, h as f32);
        gl.uniform1f(u.pixel_ratio.as_ref(), self.pixel_ratio as f32);
        for (loc, color) in u.colors.iter().zip(frame.particle_colors) {
            set_color(gl, loc.as_ref(), color);
        }

        gl.bind_vertex_array(Some(&self.particle_vao));
        gl.bind_buffer(GL::ARRAY_BUFFER, Some(&self.particle_buffer));
        let floats = frame.particle_vertices.len();
        if floats > self.particle_capacity {
            gl.buffer_data_with_i32(GL::ARRAY_BUFFER, floats as i32 * F32_BYTES, GL::DYNAMIC_DRAW);
            self.particle_capacity = floats;
        }
        // SAFETY: the view is consumed by buffer_sub_data before any allocation.
        unsafe {
            let view = Float32Array::view(frame.particle_vertices);
            gl.buffer_sub_data_with_i32_and_array_buffer_view(GL::ARRAY_BUFFER, 0, &view);
        }
        gl.disable(GL::DEPTH_TEST);
        gl.draw_arrays(GL::POINTS, 0, count as i32);
    }
}

impl RenderBackend for WebGlBackend {
    fn resize(&mut self, width: u32, height: u32) {
        let (width, height) = (width.max(1), height.max(1));
        let pw = ((width as f64) * self.pixel_ratio).round().max(1.0) as u32;
        let ph = ((height as f64) * self.pixel_ratio).round().max(1.0) as u32;
        self.canvas.set_width(pw);
        self.canvas.set_height(ph);
        let style = self.canvas.style();
        style.set_property("width", &format!("{width}px")).ok();
        style.set_property("height", &format!("{height}px")).ok();
        self.gl.viewport(0, 0, pw as i32, ph as i32);
    }

    fn draw(&mut self, frame: &FrameData<'_>) {
        self.gl.clear(GL::COLOR_BUFFER_BIT | GL::DEPTH_BUFFER_BIT);
        self.draw_meshes(frame);
        self.draw_particles(frame);
        self.gl.bind_vertex_array(None);
    }

    fn buffer_count(&self) -> usize {
        self.allocated_buffers
    }
}

fn set_color(gl: &GL, location: Option<&WebGlUniformLocation>, color: Color) {
    gl.uniform3f(location, color.r, color.g, color.b);
}

fn create_buffer(gl: &GL, allocated: &mut usize) -> Result<WebGlBuffer, SceneError> {
    let buffer = gl
        .create_buffer()
        .ok_or_else(|| SceneError::resource("create_buffer returned null"))?;
    *allocated += 1;
    Ok(buffer)
}

fn upload_mesh(gl: &GL, mesh: &MeshData, allocated: &mut usize) -> Result<GpuMesh, SceneError> {
    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| SceneError::resource("create_vertex_array returned null"))?;
    gl.bind_vertex_array(Some(&vao));

    let vertices = create_buffer(gl, allocated)?;
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&vertices));
    // SAFETY: the views are consumed by buffer_data before any allocation.
    unsafe {
        let view = Float32Array::view(&mesh.vertices);
        gl.buffer_data_with_array_buffer_view(GL::ARRAY_BUFFER, &view, GL::STATIC_DRAW);
    }
    let stride = MeshData::STRIDE as i32 * F32_BYTES;
    gl.enable_vertex_attrib_array(0);
    gl.vertex_attrib_pointer_with_i32(0, 3, GL::FLOAT, false, stride, 0);
    gl.enable_vertex_attrib_array(1);
    gl.vertex_attrib_pointer_with_i32(1, 3, GL::FLOAT, false, stride, 3 * F32_BYTES);

    let indices = create_buffer(gl, allocated)?;
    gl.bind_buffer(GL::ELEMENT_ARRAY_BUFFER, Some(&indices));
    unsafe {
        let view = Uint32Array::view(&mesh.indices);
        gl.buffer_data_with_array_buffer_view(GL::ELEMENT_ARRAY_BUFFER, &view, GL::STATIC_DRAW);
    }

    gl.bind_vertex_array(None);
    Ok(GpuMesh {
        vao,
        index_count: mesh.indices.len() as i32,
        _vertices: vertices,
        _indices: indices,
    })
}

fn create_particle_buffers(
    gl: &GL,
    allocated: &mut usize,
) -> Result<(WebGlVertexArrayObject, WebGlBuffer), SceneError> {
    let vao = gl
        .create_vertex_array()
        .ok_or_else(|| SceneError::resource("create_vertex_array returned null"))?;
    let buffer = create_buffer(gl, allocated)?;
    gl.bind_vertex_array(Some(&vao));
    gl.bind_buffer(GL::ARRAY_BUFFER, Some(&buffer));

    let stride = PARTICLE_STRIDE as i32 * F32_BYTES;
    // position (2), size, opacity, accent
    let layout: [(u32, i32, i32); 4] = [(0, 2, 0), (1, 1, 2), (2, 1, 3), (3, 1, 4)];
    for (location, size, offset) in layout {
        gl.enable_vertex_attrib_array(location);
        let offset = offset * F32_BYTES;
        gl.vertex_attrib_pointer_with_i32(location, size, GL::FLOAT, false, stride, offset);
    }
    gl.bind_vertex_array(None);
    Ok((vao, buffer))
}
