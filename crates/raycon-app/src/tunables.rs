//! Renderer tunables exposed to the console.

use std::cell::Cell;
use std::rc::Rc;

use raycon_console::{Argument, CallMethod, Console, GetSet, GetterSetter, VariableSlot};
use raycon_types::error::CommandError;

/// Settings the ray tracer reads every frame.
#[derive(Clone)]
pub struct RenderSettings {
    pub speed: VariableSlot<f32>,
    pub ray_bounces: VariableSlot<i32>,
    pub samples: VariableSlot<i32>,
    pub camera_pos: VariableSlot<[f32; 3]>,
    pub resolution: VariableSlot<[i32; 2]>,
    pub vsync: VariableSlot<bool>,
    pub scene: VariableSlot<String>,
    pub clear_color: VariableSlot<[f32; 3]>,
    pub frame_count: Rc<Cell<u64>>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            speed: VariableSlot::new(1.0),
            ray_bounces: VariableSlot::new(4),
            samples: VariableSlot::new(1),
            camera_pos: VariableSlot::new([0.0, 1.0, -5.0]),
            resolution: VariableSlot::new([1280, 720]),
            vsync: VariableSlot::new(true),
            scene: VariableSlot::new("cornell".to_string()),
            clear_color: VariableSlot::new([0.0; 3]),
            frame_count: Rc::new(Cell::new(0)),
        }
    }
}

/// Register every tunable and renderer command on `console`.
pub fn register(console: &mut Console, settings: &RenderSettings) {
    console.add_command(Box::new(
        GetSet::new("Speed", settings.speed.clone()).with_description("Camera movement speed"),
    ));
    console.add_command(Box::new(
        GetSet::new("rayBounces", settings.ray_bounces.clone())
            .with_description("Maximum bounces per ray"),
    ));
    console.add_command(Box::new(
        GetSet::new("Samples", settings.samples.clone()).with_description("Samples per pixel"),
    ));
    console.add_command(Box::new(
        GetSet::new("CameraPos", settings.camera_pos.clone())
            .with_description("Camera position in world space"),
    ));
    console.add_command(Box::new(
        GetSet::new("Resolution", settings.resolution.clone())
            .with_description("Render target size"),
    ));
    console.add_command(Box::new(
        GetSet::new("Vsync", settings.vsync.clone()).with_description("Wait for vertical blank"),
    ));
    console.add_command(Box::new(
        GetSet::new("Scene", settings.scene.clone()).with_description("Scene to load"),
    ));

    let frames = Rc::clone(&settings.frame_count);
    console.add_command(Box::new(
        GetterSetter::read_only("FrameCount", move || frames.get())
            .with_description("Frames rendered so far"),
    ));

    let speed = settings.speed.clone();
    console.add_command(Box::new(
        CallMethod::new("SetSpeed", move |args| {
            speed.set(args[0].to::<f32>()?);
            Ok(Argument::none())
        })
        .with_arity(1)
        .with_description("Set the camera speed"),
    ));

    let color = settings.clear_color.clone();
    console.add_command(Box::new(
        CallMethod::new("SetColor", move |args| {
            let rgb = Argument::concat(args, "SetColor").to::<[f32; 3]>()?;
            if rgb.iter().any(|c| !(0.0..=1.0).contains(c)) {
                return Err(CommandError::Failed(
                    "color components must be within 0..1".to_string(),
                ));
            }
            color.set(rgb);
            Ok(Argument::none())
        })
        .with_usage("SetColor(r, g, b)")
        .with_description("Set the background color"),
    ));

    let (pos, speed) = (settings.camera_pos.clone(), settings.speed.clone());
    console.add_command(Box::new(
        CallMethod::new("ResetCamera", move |_| {
            pos.set([0.0, 1.0, -5.0]);
            speed.set(1.0);
            Ok(Argument::string("camera reset"))
        })
        .with_arity(0)
        .with_description("Restore the default camera"),
    ));
}
