//=========================================================================
// Headless Stage
//=========================================================================
//
// In-memory scene graph, camera rig and overlay. No rendering: node
// actions, camera animations and dynamic bodies are stepped on
// `advance`, which is enough to drive the reel without a GPU.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Mat4, Quat, Vec2, Vec3};
use std::collections::{BTreeMap, HashMap};
use std::f32::consts::TAU;
use std::time::Duration;

use log::trace;

use super::{
    gray, CameraRig, Color, Control, Easing, Fade, Geometry, Light, Node, NodeAction, NodeId,
    Overlay, RigTransform, SceneHandle, ShaderEntryPoint,
};
use crate::config::ViewportConfig;

//=== Helpers =============================================================

fn progress(elapsed: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
    }
}

/// Center of `control` in overlay space (origin bottom-left).
pub fn control_anchor(viewport: &ViewportConfig, control: Control) -> Vec2 {
    let margin = viewport.button_margin;
    match control {
        Control::Next => Vec2::new(viewport.width - margin, margin),
        Control::Back => Vec2::new(margin, margin),
    }
}

//=========================================================================
// SceneGraph
//=========================================================================

#[derive(Debug, Clone, Copy)]
struct ActionStart {
    position: Vec3,
    scale: Vec3,
    opacity: f32,
}

#[derive(Debug)]
struct RunningAction {
    action: NodeAction,
    elapsed: Duration,
    start: Option<ActionStart>,
}

#[derive(Debug)]
struct Slot {
    node: Node,
    parent: Option<NodeId>,
    actions: Vec<RunningAction>,
}

/// Particle burst spawned by the engine on request.
#[derive(Debug, Clone, PartialEq)]
pub struct Burst {
    pub system: &'static str,
    pub at: Vec3,
    pub color: Color,
}

#[derive(Debug)]
pub struct SceneGraph {
    slots: BTreeMap<NodeId, Slot>,
    next_id: u32,
    gravity: Vec3,
    lights: HashMap<Light, Color>,
    spot_angle: f32,
    bursts: Vec<Burst>,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut lights = HashMap::new();
        lights.insert(Light::Ambient, gray(0.3));
        lights.insert(Light::Spot, gray(1.0));
        Self {
            slots: BTreeMap::new(),
            next_id: 1,
            gravity: Vec3::new(0.0, -9.8, 0.0),
            lights,
            spot_angle: 70.0,
            bursts: Vec::new(),
        }
    }

    pub fn bursts(&self) -> &[Burst] {
        &self.bursts
    }

    fn insert(&mut self, parent: Option<NodeId>, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        trace!("attach {:?} '{}' under {:?}", id, node.name, parent);
        self.slots.insert(
            id,
            Slot {
                node,
                parent,
                actions: Vec::new(),
            },
        );
        id
    }

    fn subtree(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = vec![root];
        let mut cursor = 0;
        while cursor < out.len() {
            let current = out[cursor];
            out.extend(
                self.slots
                    .iter()
                    .filter(|(_, slot)| slot.parent == Some(current))
                    .map(|(id, _)| *id),
            );
            cursor += 1;
        }
        out
    }

    fn local_matrix(node: &Node) -> Mat4 {
        Mat4::from_scale_rotation_translation(node.scale, node.rotation, node.position)
    }

    fn world_matrix(&self, id: NodeId) -> Option<Mat4> {
        let slot = self.slots.get(&id)?;
        let local = Self::local_matrix(&slot.node);
        match slot.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    /// Steps one action. Returns (finished, remove node).
    fn step_action(node: &mut Node, running: &mut RunningAction, dt: Duration) -> (bool, bool) {
        running.elapsed += dt;
        let start = *running.start.get_or_insert(ActionStart {
            position: node.position,
            scale: node.scale,
            opacity: node.opacity,
        });

        match &running.action {
            NodeAction::Fade {
                delay,
                to,
                duration,
                remove,
            } => {
                let Some(active) = running.elapsed.checked_sub(*delay) else {
                    running.start = None;
                    return (false, false);
                };
                let t = progress(active, *duration);
                node.opacity = start.opacity + (to - start.opacity) * t;
                (t >= 1.0, t >= 1.0 && *remove)
            }
            NodeAction::MoveBy {
                delay,
                offset,
                duration,
                easing,
            } => {
                let Some(active) = running.elapsed.checked_sub(*delay) else {
                    running.start = None;
                    return (false, false);
                };
                let t = progress(active, *duration);
                node.position = start.position + *offset * easing.apply(t);
                (t >= 1.0, false)
            }
            NodeAction::ScaleTo {
                scale,
                duration,
                remove,
            } => {
                let t = progress(running.elapsed, *duration);
                node.scale = start.scale.lerp(Vec3::splat(*scale), t);
                (t >= 1.0, t >= 1.0 && *remove)
            }
            NodeAction::SpinForever { axis, period } => {
                if !period.is_zero() {
                    let angle = TAU * dt.as_secs_f32() / period.as_secs_f32();
                    node.rotation =
                        (Quat::from_axis_angle(axis.normalize_or_zero(), angle) * node.rotation)
                            .normalize();
                }
                (false, false)
            }
        }
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneHandle for SceneGraph {
    fn attach(&mut self, node: Node) -> NodeId {
        self.insert(None, node)
    }

    fn attach_child(&mut self, parent: NodeId, node: Node) -> NodeId {
        assert!(
            self.slots.contains_key(&parent),
            "Cannot attach under unknown node {:?}",
            parent
        );
        self.insert(Some(parent), node)
    }

    fn detach(&mut self, id: NodeId) -> bool {
        if !self.slots.contains_key(&id) {
            return false;
        }
        for victim in self.subtree(id) {
            self.slots.remove(&victim);
        }
        trace!("detach {:?}", id);
        true
    }

    fn contains(&self, id: NodeId) -> bool {
        self.slots.contains_key(&id)
    }

    fn node(&self, id: NodeId) -> Option<&Node> {
        self.slots.get(&id).map(|slot| &slot.node)
    }

    fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots.get_mut(&id).map(|slot| &mut slot.node)
    }

    fn find(&self, name: &str) -> Option<NodeId> {
        self.slots
            .iter()
            .find(|(_, slot)| slot.node.name == name)
            .map(|(id, _)| *id)
    }

    fn world_position(&self, id: NodeId) -> Option<Vec3> {
        self.world_matrix(id)
            .map(|world| world.transform_point3(Vec3::ZERO))
    }

    fn node_count(&self) -> usize {
        self.slots.len()
    }

    fn gravity(&self) -> Vec3 {
        self.gravity
    }

    fn set_gravity(&mut self, gravity: Vec3) {
        self.gravity = gravity;
    }

    fn apply_impulse(&mut self, id: NodeId, impulse: Vec3, _at: Vec3) {
        if let Some(body) = self
            .slots
            .get_mut(&id)
            .and_then(|slot| slot.node.body.as_mut())
            .filter(|body| body.is_dynamic())
        {
            body.velocity += impulse;
        }
    }

    fn light(&self, light: Light) -> Color {
        self.lights.get(&light).copied().unwrap_or(super::BLACK)
    }

    fn set_light(&mut self, light: Light, color: Color, _duration: Duration) {
        self.lights.insert(light, color);
    }

    fn spot_angle(&self) -> f32 {
        self.spot_angle
    }

    fn set_spot_angle(&mut self, degrees: f32, _duration: Duration) {
        self.spot_angle = degrees;
    }

    fn set_shader_modifier(&mut self, id: NodeId, entry: Option<ShaderEntryPoint>) {
        if let Some(node) = self.node_mut(id) {
            node.shader_modifier = entry;
        }
    }

    fn set_uniform(&mut self, id: NodeId, name: &'static str, value: f32, _duration: Duration) {
        if let Some(node) = self.node_mut(id) {
            node.set_uniform(name, value);
        }
    }

    fn run(&mut self, id: NodeId, action: NodeAction) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.actions.push(RunningAction {
                action,
                elapsed: Duration::ZERO,
                start: None,
            });
        }
    }

    fn texture_coordinates(&self, id: NodeId, point: Vec3) -> Option<Vec2> {
        let slot = self.slots.get(&id)?;
        let local = self.world_matrix(id)?.inverse().transform_point3(point);
        match slot.node.geometry {
            Geometry::Torus { pipe_radius, .. } => {
                let u = local.z.atan2(local.x) / TAU + 0.5;
                let v = (local.y / (2.0 * pipe_radius) + 0.5).clamp(0.0, 1.0);
                Some(Vec2::new(u, v))
            }
            Geometry::Plane { width, height } => Some(Vec2::new(
                (local.x / width + 0.5).clamp(0.0, 1.0),
                (local.y / height + 0.5).clamp(0.0, 1.0),
            )),
            _ => None,
        }
    }

    fn paint(&mut self, id: NodeId, texel: Vec2, color: Color) {
        if let Some(node) = self.node_mut(id) {
            node.paint.push((texel, color));
        }
    }

    fn burst(&mut self, system: &'static str, at: Vec3, color: Color) {
        self.bursts.push(Burst { system, at, color });
    }

    fn advance(&mut self, dt: Duration) {
        let seconds = dt.as_secs_f32();
        let gravity = self.gravity;
        let mut removals = Vec::new();

        for (id, slot) in self.slots.iter_mut() {
            if let Some(body) = slot.node.body.as_mut().filter(|body| body.is_dynamic()) {
                body.velocity += gravity * seconds;
                slot.node.position += body.velocity * seconds;
            }

            let node = &mut slot.node;
            let mut remove = false;
            slot.actions.retain_mut(|running| {
                let (finished, detach) = Self::step_action(node, running, dt);
                remove |= detach;
                !finished
            });
            if remove {
                removals.push(*id);
            }
        }

        for id in removals {
            self.detach(id);
        }
    }
}

//=========================================================================
// HeadlessCamera
//=========================================================================

#[derive(Debug, Clone, Copy)]
struct CameraAnimation {
    from: RigTransform,
    to: RigTransform,
    elapsed: Duration,
    duration: Duration,
    easing: Easing,
}

#[derive(Debug)]
pub struct HeadlessCamera {
    model: RigTransform,
    animation: Option<CameraAnimation>,
    viewport: Vec2,
    fov_y: f32,
}

impl HeadlessCamera {
    pub fn new(viewport: &ViewportConfig) -> Self {
        Self {
            model: RigTransform::initial(),
            animation: None,
            viewport: Vec2::new(viewport.width, viewport.height),
            fov_y: 75f32.to_radians(),
        }
    }
}

impl CameraRig for HeadlessCamera {
    fn transform(&self) -> RigTransform {
        self.model
    }

    fn set_transform(&mut self, transform: RigTransform) {
        self.model = transform;
        self.animation = None;
    }

    fn animate_to(&mut self, transform: RigTransform, duration: Duration, easing: Easing) {
        let from = self.presented();
        self.model = transform;
        self.animation = (!duration.is_zero()).then_some(CameraAnimation {
            from,
            to: transform,
            elapsed: Duration::ZERO,
            duration,
            easing,
        });
    }

    fn presented(&self) -> RigTransform {
        match &self.animation {
            Some(anim) => anim
                .from
                .lerp(&anim.to, anim.easing.apply(progress(anim.elapsed, anim.duration))),
            None => self.model,
        }
    }

    fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    fn unproject(&self, screen: Vec2, reference: Vec3) -> Vec3 {
        let world = self.presented().eye_world();
        let origin = world.transform_point3(Vec3::ZERO);
        let forward = world.transform_vector3(Vec3::NEG_Z).normalize();
        let right = world.transform_vector3(Vec3::X).normalize();
        let up = world.transform_vector3(Vec3::Y).normalize();

        let ndc = screen / self.viewport * 2.0 - Vec2::ONE;
        let tan = (self.fov_y * 0.5).tan();
        let aspect = self.viewport.x / self.viewport.y;
        let ray = (forward + right * ndc.x * tan * aspect + up * ndc.y * tan).normalize();

        let depth = (reference - origin).dot(forward);
        origin + ray * (depth / ray.dot(forward))
    }

    fn advance(&mut self, dt: Duration) {
        if let Some(anim) = self.animation.as_mut() {
            anim.elapsed += dt;
            if anim.elapsed >= anim.duration {
                self.animation = None;
            }
        }
    }
}

//=========================================================================
// HeadlessOverlay
//=========================================================================

#[derive(Debug)]
pub struct HeadlessOverlay {
    viewport: ViewportConfig,
    label: Option<String>,
    label_visible: bool,
    next_alpha: f32,
    back_alpha: f32,
    flashes: u32,
}

impl HeadlessOverlay {
    pub fn new(viewport: &ViewportConfig) -> Self {
        Self {
            viewport: viewport.clone(),
            label: None,
            label_visible: false,
            next_alpha: 0.0,
            back_alpha: 0.0,
            flashes: 0,
        }
    }

    pub fn flashes(&self) -> u32 {
        self.flashes
    }

    fn alpha_mut(&mut self, control: Control) -> &mut f32 {
        match control {
            Control::Next => &mut self.next_alpha,
            Control::Back => &mut self.back_alpha,
        }
    }
}

impl Overlay for HeadlessOverlay {
    fn show_label(&mut self, text: Option<&str>) {
        match text {
            Some(text) => {
                self.label = Some(text.to_owned());
                self.label_visible = true;
            }
            None => self.label_visible = false,
        }
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref().filter(|_| self.label_visible)
    }

    fn label_visible(&self) -> bool {
        self.label_visible
    }

    fn control_at(&self, point: Vec2) -> Option<Control> {
        let half = self.viewport.button_size * 0.5;
        [Control::Next, Control::Back].into_iter().find(|control| {
            let delta = (point - control_anchor(&self.viewport, *control)).abs();
            delta.x <= half && delta.y <= half
        })
    }

    fn control_alpha(&self, control: Control) -> f32 {
        match control {
            Control::Next => self.next_alpha,
            Control::Back => self.back_alpha,
        }
    }

    fn fade_control(&mut self, control: Control, fade: Fade, _duration: Duration) {
        let alpha = self.alpha_mut(control);
        *alpha = match fade {
            Fade::By(delta) => (*alpha + delta).clamp(0.0, 1.0),
            Fade::To(value) => value.clamp(0.0, 1.0),
        };
    }

    fn flash_control(&mut self, _control: Control) {
        self.flashes += 1;
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::PhysicsBody;

    const FRAME: Duration = Duration::from_millis(100);

    #[test]
    fn detach_removes_whole_subtree() {
        let mut scene = SceneGraph::new();
        let group = scene.attach(Node::new("group"));
        let child = scene.attach_child(group, Node::new("child"));
        scene.attach_child(child, Node::new("grandchild"));
        let other = scene.attach(Node::new("other"));

        assert_eq!(scene.node_count(), 4);
        assert!(scene.detach(group));
        assert_eq!(scene.node_count(), 1);
        assert!(scene.contains(other));
        assert!(!scene.detach(group));
    }

    #[test]
    fn world_position_composes_parents() {
        let mut scene = SceneGraph::new();
        let parent = scene.attach(Node::new("parent").at(Vec3::new(10.0, 0.0, 0.0)));
        let child = scene.attach_child(parent, Node::new("child").at(Vec3::new(0.0, 5.0, 0.0)));
        let world = scene.world_position(child).unwrap();
        assert!((world - Vec3::new(10.0, 5.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn fade_with_removal_detaches_after_delay_and_duration() {
        let mut scene = SceneGraph::new();
        let id = scene.attach(Node::new("splash"));
        scene.run(
            id,
            NodeAction::Fade {
                delay: Duration::from_millis(200),
                to: 0.0,
                duration: Duration::from_millis(300),
                remove: true,
            },
        );

        scene.advance(FRAME);
        scene.advance(FRAME);
        assert_eq!(scene.node(id).unwrap().opacity, 1.0);
        scene.advance(FRAME);
        scene.advance(FRAME);
        assert!(scene.contains(id));
        scene.advance(FRAME);
        assert!(!scene.contains(id));
    }

    #[test]
    fn move_by_lands_on_offset() {
        let mut scene = SceneGraph::new();
        let id = scene.attach(Node::new("collider").at(Vec3::new(0.0, 260.0, 0.0)));
        scene.run(
            id,
            NodeAction::MoveBy {
                delay: Duration::ZERO,
                offset: Vec3::new(0.0, -215.0, 0.0),
                duration: Duration::from_millis(300),
                easing: Easing::EaseOut,
            },
        );
        for _ in 0..5 {
            scene.advance(FRAME);
        }
        assert!((scene.node(id).unwrap().position.y - 45.0).abs() < 1e-3);
    }

    #[test]
    fn impulses_only_move_dynamic_bodies() {
        let mut scene = SceneGraph::new();
        let wall = scene.attach(Node::new("wall").with_body(PhysicsBody::fixed()));
        let ball = scene.attach(Node::new("ball").with_body(PhysicsBody::dynamic()));
        scene.apply_impulse(wall, Vec3::X, Vec3::ZERO);
        scene.apply_impulse(ball, Vec3::X, Vec3::ZERO);
        assert_eq!(scene.node(wall).unwrap().body.as_ref().unwrap().velocity, Vec3::ZERO);
        assert_eq!(scene.node(ball).unwrap().body.as_ref().unwrap().velocity, Vec3::X);
    }

    #[test]
    fn camera_model_is_immediate_and_presentation_catches_up() {
        let mut camera = HeadlessCamera::new(&ViewportConfig::default());
        let start = camera.transform();
        let target = start.translated(Vec3::new(100.0, 0.0, 0.0));

        camera.animate_to(target, Duration::from_millis(500), Easing::Linear);
        assert_eq!(camera.transform(), target);
        assert_eq!(camera.presented(), start);
        assert!(camera.is_animating());

        for _ in 0..5 {
            camera.advance(FRAME);
        }
        assert!(!camera.is_animating());
        assert_eq!(camera.presented(), target);
    }

    #[test]
    fn unproject_center_lands_on_reference_depth() {
        let camera = HeadlessCamera::new(&ViewportConfig::default());
        let center = Vec2::new(640.0, 360.0);
        let point = camera.unproject(center, Vec3::new(0.0, 0.0, 50.0));
        assert!((point - Vec3::new(0.0, 60.0, 50.0)).length() < 1e-3);
    }

    #[test]
    fn controls_are_hit_tested_at_bottom_corners() {
        let viewport = ViewportConfig::default();
        let overlay = HeadlessOverlay::new(&viewport);
        assert_eq!(
            overlay.control_at(control_anchor(&viewport, Control::Next)),
            Some(Control::Next)
        );
        assert_eq!(
            overlay.control_at(control_anchor(&viewport, Control::Back)),
            Some(Control::Back)
        );
        assert_eq!(overlay.control_at(Vec2::new(640.0, 360.0)), None);
    }

    #[test]
    fn relative_fade_clamps() {
        let mut overlay = HeadlessOverlay::new(&ViewportConfig::default());
        overlay.fade_control(Control::Back, Fade::To(1.0), Duration::ZERO);
        overlay.fade_control(Control::Back, Fade::By(-0.5), Duration::ZERO);
        assert_eq!(overlay.control_alpha(Control::Back), 0.5);
        overlay.fade_control(Control::Next, Fade::By(-0.5), Duration::ZERO);
        assert_eq!(overlay.control_alpha(Control::Next), 0.0);
    }

    #[test]
    fn hidden_label_reports_none() {
        let mut overlay = HeadlessOverlay::new(&ViewportConfig::default());
        overlay.show_label(Some("Physics"));
        assert_eq!(overlay.label(), Some("Physics"));
        overlay.show_label(None);
        assert_eq!(overlay.label(), None);
        assert!(!overlay.label_visible());
    }
}
