use web_sys::{WebGl2RenderingContext as GL, WebGlProgram, WebGlShader};

use crate::error::SceneError;

pub const MESH_VERT: &str = r#"#version 300 es
layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;

uniform mat4 u_view_proj;
uniform mat4 u_model;

out vec3 v_world_pos;
out vec3 v_normal;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world_pos = world.xyz;
    // u_model is a pure rotation
    v_normal = mat3(u_model) * a_normal;
    gl_Position = u_view_proj * world;
}
"#;

pub const MESH_FRAG: &str = r#"#version 300 es
precision highp float;

in vec3 v_world_pos;
in vec3 v_normal;

uniform vec3 u_color;
uniform vec3 u_emissive;
uniform float u_emissive_intensity;
uniform float u_opacity;
uniform bool u_lit;

uniform vec3 u_camera_position;
uniform vec3 u_ambient;
uniform vec3 u_dir_color;
uniform vec3 u_dir_position;
uniform vec3 u_point_position[2];
uniform vec3 u_point_color[2];
uniform float u_point_range[2];

uniform float u_time;
uniform float u_pulse;

out vec4 frag_color;

const float SHININESS = 30.0;

void main() {
    vec3 n = normalize(v_normal);
    if (!gl_FrontFacing) {
        n = -n;
    }
    vec3 view_dir = normalize(u_camera_position - v_world_pos);

    if (!u_lit) {
        float rim = 1.0 - abs(dot(n, view_dir));
        frag_color = vec4(u_color, u_opacity * (0.6 + 0.4 * rim));
        return;
    }

    vec3 diffuse = u_ambient;
    vec3 specular = vec3(0.0);

    vec3 l = normalize(u_dir_position);
    diffuse += u_dir_color * max(dot(n, l), 0.0);
    specular += u_dir_color * pow(max(dot(n, normalize(l + view_dir)), 0.0), SHININESS);

    for (int i = 0; i < 2; i++) {
        vec3 to_light = u_point_position[i] - v_world_pos;
        float d = length(to_light);
        float falloff = clamp(1.0 - d / u_point_range[i], 0.0, 1.0);
        vec3 pl = to_light / max(d, 1e-4);
        diffuse += u_point_color[i] * max(dot(n, pl), 0.0) * falloff;
        float highlight = pow(max(dot(n, normalize(pl + view_dir)), 0.0), SHININESS);
        specular += u_point_color[i] * highlight * falloff;
    }

    float pulse = 1.0 + u_pulse * sin(u_time * 1.5);
    vec3 color = u_color * diffuse + specular * 0.5 + u_emissive * u_emissive_intensity * pulse;
    frag_color = vec4(color, u_opacity);
}
"#;

pub const PARTICLE_VERT: &str = r#"#version 300 es
layout(location = 0) in vec2 a_position;
layout(location = 1) in float a_size;
layout(location = 2) in float a_opacity;
layout(location = 3) in float a_accent;

uniform vec2 u_resolution;
uniform float u_pixel_ratio;
uniform vec3 u_colors[2];

out vec4 v_color;

void main() {
    vec2 clip = (a_position / u_resolution) * 2.0 - 1.0;
    gl_Position = vec4(clip.x, -clip.y, 0.0, 1.0);
    gl_PointSize = a_size * u_pixel_ratio;
    v_color = vec4(a_accent > 0.5 ? u_colors[1] : u_colors[0], a_opacity);
}
"#;

pub const PARTICLE_FRAG: &str = r#"#version 300 es
precision mediump float;

in vec4 v_color;
out vec4 frag_color;

void main() {
    float d = length(gl_PointCoord - vec2(0.5));
    if (d > 0.5) {
        discard;
    }
    frag_color = vec4(v_color.rgb, v_color.a * smoothstep(0.5, 0.3, d));
}
"#;

fn compile(gl: &GL, kind: u32, source: &str) -> Result<WebGlShader, SceneError> {
    let shader = gl
        .create_shader(kind)
        .ok_or_else(|| SceneError::resource("create_shader returned null"))?;
    gl.shader_source(&shader, source);
    gl.compile_shader(&shader);

    let ok = gl
        .get_shader_parameter(&shader, GL::COMPILE_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(shader)
    } else {
        let log = gl.get_shader_info_log(&shader).unwrap_or_default();
        gl.delete_shader(Some(&shader));
        Err(SceneError::ShaderCompile(log))
    }
}

pub fn link(gl: &GL, vert: &str, frag: &str) -> Result<WebGlProgram, SceneError> {
    let vs = compile(gl, GL::VERTEX_SHADER, vert)?;
    let fs = compile(gl, GL::FRAGMENT_SHADER, frag)?;
    let program = gl
        .create_program()
        .ok_or_else(|| SceneError::resource("create_program returned null"))?;
    gl.attach_shader(&program, &vs);
    gl.attach_shader(&program, &fs);
    gl.link_program(&program);

    // Shaders are no longer needed once the program is linked.
    gl.delete_shader(Some(&vs));
    gl.delete_shader(Some(&fs));

    let ok = gl
        .get_program_parameter(&program, GL::LINK_STATUS)
        .as_bool()
        .unwrap_or(false);
    if ok {
        Ok(program)
    } else {
        let log = gl.get_program_info_log(&program).unwrap_or_default();
        gl.delete_program(Some(&program));
        Err(SceneError::ProgramLink(log))
    }
}
