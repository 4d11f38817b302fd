//=========================================================================
// Stage
//=========================================================================
//
// Collaborator seams between the reel logic and whatever renders it.
//
//   SceneHandle  - node graph, physics world, lights, shading
//   CameraRig    - composed camera transform and its animation
//   Overlay      - 2D label and the next/back controls
//
// The engine side implements these traits; `headless` provides an
// in-memory implementation used by the demo binary and the tests.
//
//=========================================================================

//=== Module Declarations =================================================

mod headless;
mod node;
mod transform;

//=== Public Exports ======================================================

pub use headless::{control_anchor, Burst, HeadlessCamera, HeadlessOverlay, SceneGraph};
pub use node::{
    gray, hue, BodyKind, Color, Contact, FieldKind, Geometry, Light, Node, NodeAction, NodeId,
    ParticleSystem, PhysicsBody, PhysicsField, ShaderEntryPoint, BLACK,
};
pub use transform::{Easing, RigTransform};

//=== External Dependencies ===============================================

use glam::{Vec2, Vec3};
use std::time::Duration;

use crate::config::ViewportConfig;

//=== Overlay Types =======================================================

/// Navigation controls drawn by the overlay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Control {
    Next,
    Back,
}

/// Alpha animation target for a control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fade {
    /// Relative change, clamped to [0, 1].
    By(f32),
    To(f32),
}

//=== SceneHandle =========================================================

pub trait SceneHandle: Send {
    fn attach(&mut self, node: Node) -> NodeId;
    fn attach_child(&mut self, parent: NodeId, node: Node) -> NodeId;
    /// Removes the node and its subtree. Returns false if unknown.
    fn detach(&mut self, id: NodeId) -> bool;
    fn contains(&self, id: NodeId) -> bool;
    fn node(&self, id: NodeId) -> Option<&Node>;
    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node>;
    fn find(&self, name: &str) -> Option<NodeId>;
    fn world_position(&self, id: NodeId) -> Option<Vec3>;
    fn node_count(&self) -> usize;

    fn gravity(&self) -> Vec3;
    fn set_gravity(&mut self, gravity: Vec3);
    fn apply_impulse(&mut self, id: NodeId, impulse: Vec3, at: Vec3);

    fn light(&self, light: Light) -> Color;
    fn set_light(&mut self, light: Light, color: Color, duration: Duration);
    fn spot_angle(&self) -> f32;
    fn set_spot_angle(&mut self, degrees: f32, duration: Duration);

    fn set_shader_modifier(&mut self, id: NodeId, entry: Option<ShaderEntryPoint>);
    fn set_uniform(&mut self, id: NodeId, name: &'static str, value: f32, duration: Duration);

    fn run(&mut self, id: NodeId, action: NodeAction);

    /// Texture coordinates of `point` (world space) on the node surface.
    fn texture_coordinates(&self, id: NodeId, point: Vec3) -> Option<Vec2>;
    fn paint(&mut self, id: NodeId, texel: Vec2, color: Color);

    /// Short-lived particle burst owned by the engine.
    fn burst(&mut self, system: &'static str, at: Vec3, color: Color);

    fn advance(&mut self, _dt: Duration) {}
}

//=== CameraRig ===========================================================

pub trait CameraRig: Send {
    /// Model value. Updated immediately, even while animating.
    fn transform(&self) -> RigTransform;
    fn set_transform(&mut self, transform: RigTransform);
    fn animate_to(&mut self, transform: RigTransform, duration: Duration, easing: Easing);
    /// Value currently on screen.
    fn presented(&self) -> RigTransform {
        self.transform()
    }
    fn is_animating(&self) -> bool;
    /// Point under `screen` at the depth of `reference`.
    fn unproject(&self, screen: Vec2, reference: Vec3) -> Vec3;

    fn advance(&mut self, _dt: Duration) {}
}

//=== Overlay =============================================================

pub trait Overlay: Send {
    /// Shows `text` as the slide caption, or fades it out on `None`.
    fn show_label(&mut self, text: Option<&str>);
    fn label(&self) -> Option<&str>;
    fn label_visible(&self) -> bool;

    fn control_at(&self, point: Vec2) -> Option<Control>;
    fn control_alpha(&self, control: Control) -> f32;
    fn fade_control(&mut self, control: Control, fade: Fade, duration: Duration);
    fn flash_control(&mut self, control: Control);

    fn advance(&mut self, _dt: Duration) {}
}

//=== Stage ===============================================================

/// The three collaborators a reel drives.
pub struct Stage {
    pub scene: Box<dyn SceneHandle>,
    pub camera: Box<dyn CameraRig>,
    pub overlay: Box<dyn Overlay>,
}

impl Stage {
    pub fn new(
        scene: Box<dyn SceneHandle>,
        camera: Box<dyn CameraRig>,
        overlay: Box<dyn Overlay>,
    ) -> Self {
        Self {
            scene,
            camera,
            overlay,
        }
    }

    /// In-memory stage sized to `viewport`.
    pub fn headless(viewport: &ViewportConfig) -> Self {
        Self::new(
            Box::new(SceneGraph::new()),
            Box::new(HeadlessCamera::new(viewport)),
            Box::new(HeadlessOverlay::new(viewport)),
        )
    }

    pub fn advance(&mut self, dt: Duration) {
        self.scene.advance(dt);
        self.camera.advance(dt);
        self.overlay.advance(dt);
    }
}

impl std::fmt::Debug for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stage")
            .field("nodes", &self.scene.node_count())
            .field("camera", &self.camera.transform())
            .field("label", &self.overlay.label())
            .finish()
    }
}
