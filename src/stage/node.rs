//=========================================================================
// Scene Nodes
//=========================================================================
//
// Plain data describing what a slide asks the engine to show. The
// engine owns the live objects; slides only keep `NodeId`s.
//
//=========================================================================

//=== External Dependencies ===============================================

use glam::{Quat, Vec2, Vec3, Vec4};
use std::time::Duration;

use super::Easing;

//=== Identifiers & Colors ================================================

/// Handle to a node attached to the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

/// Linear RGBA.
pub type Color = Vec4;

pub const BLACK: Color = Vec4::new(0.0, 0.0, 0.0, 1.0);

pub fn gray(level: f32) -> Color {
    Vec4::new(level, level, level, 1.0)
}

/// Fully saturated color for `hue` in [0, 1).
pub fn hue(hue: f32) -> Color {
    let h = hue.rem_euclid(1.0) * 6.0;
    let x = 1.0 - (h % 2.0 - 1.0).abs();
    let (r, g, b) = match h as u32 {
        0 => (1.0, x, 0.0),
        1 => (x, 1.0, 0.0),
        2 => (0.0, 1.0, x),
        3 => (0.0, x, 1.0),
        4 => (x, 0.0, 1.0),
        _ => (1.0, 0.0, x),
    };
    Vec4::new(r, g, b, 1.0)
}

//=== Geometry ============================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    /// Transform-only node (group, emitter holder, field carrier).
    Empty,
    Floor,
    Cuboid { width: f32, height: f32, length: f32 },
    Sphere { radius: f32 },
    Plane { width: f32, height: f32 },
    Torus { ring_radius: f32, pipe_radius: f32 },
    /// Named asset resolved by the engine.
    Model(&'static str),
}

//=== Physics =============================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Static,
    Dynamic,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsBody {
    pub kind: BodyKind,
    pub restitution: f32,
    pub category_mask: u32,
    pub collision_mask: u32,
    pub velocity: Vec3,
    /// Axis in `xyz`, radians per second in `w`.
    pub angular_velocity: Vec4,
}

impl PhysicsBody {
    pub fn dynamic() -> Self {
        Self {
            kind: BodyKind::Dynamic,
            restitution: 0.5,
            category_mask: u32::MAX,
            collision_mask: u32::MAX,
            velocity: Vec3::ZERO,
            angular_velocity: Vec4::ZERO,
        }
    }

    pub fn fixed() -> Self {
        Self {
            kind: BodyKind::Static,
            ..Self::dynamic()
        }
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution;
        self
    }

    pub fn with_masks(mut self, category: u32, collision: u32) -> Self {
        self.category_mask = category;
        self.collision_mask = collision;
        self
    }

    pub fn with_velocity(mut self, velocity: Vec3, angular: Vec4) -> Self {
        self.velocity = velocity;
        self.angular_velocity = angular;
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }
}

/// Particle emitter loaded from a named system description.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSystem {
    pub name: &'static str,
    pub birth_rate: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    RadialGravity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsField {
    pub kind: FieldKind,
    pub strength: f32,
    pub half_extent: Vec3,
    pub minimum_distance: f32,
}

//=== Shaders =============================================================

/// Stage of the shading pipeline a modifier is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderEntryPoint {
    Geometry,
    Surface,
    Fragment,
}

//=== Node ================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub geometry: Geometry,
    pub color: Option<Color>,
    pub texture: Option<&'static str>,
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    pub opacity: f32,
    pub body: Option<PhysicsBody>,
    pub particles: Option<ParticleSystem>,
    pub field: Option<PhysicsField>,
    pub shader_modifier: Option<ShaderEntryPoint>,
    pub uniforms: Vec<(&'static str, f32)>,
    /// Texels painted onto the diffuse texture, in texture pixels.
    pub paint: Vec<(Vec2, Color)>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            geometry: Geometry::Empty,
            color: None,
            texture: None,
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            opacity: 1.0,
            body: None,
            particles: None,
            field: None,
            shader_modifier: None,
            uniforms: Vec::new(),
            paint: Vec::new(),
        }
    }

    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = geometry;
        self
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.position = position;
        self
    }

    pub fn with_rotation(mut self, rotation: Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_scale(mut self, scale: Vec3) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn with_texture(mut self, texture: &'static str) -> Self {
        self.texture = Some(texture);
        self
    }

    pub fn with_body(mut self, body: PhysicsBody) -> Self {
        self.body = Some(body);
        self
    }

    pub fn with_particles(mut self, name: &'static str, birth_rate: f32) -> Self {
        self.particles = Some(ParticleSystem { name, birth_rate });
        self
    }

    pub fn with_field(mut self, field: PhysicsField) -> Self {
        self.field = Some(field);
        self
    }

    pub fn uniform(&self, name: &str) -> Option<f32> {
        self.uniforms
            .iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| *value)
    }

    pub(crate) fn set_uniform(&mut self, name: &'static str, value: f32) {
        match self.uniforms.iter_mut().find(|(key, _)| *key == name) {
            Some(slot) => slot.1 = value,
            None => self.uniforms.push((name, value)),
        }
    }
}

//=== Actions =============================================================

/// Engine-driven animation attached to a node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeAction {
    /// Animates opacity to `to`; detaches the node afterwards when
    /// `remove` is set.
    Fade {
        delay: Duration,
        to: f32,
        duration: Duration,
        remove: bool,
    },
    MoveBy {
        delay: Duration,
        offset: Vec3,
        duration: Duration,
        easing: Easing,
    },
    ScaleTo {
        scale: f32,
        duration: Duration,
        remove: bool,
    },
    /// Full turn around `axis` every `period`, until detached.
    SpinForever { axis: Vec3, period: Duration },
}

//=== Lighting & Contacts =================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Light {
    Ambient,
    Spot,
}

/// Physics contact reported by the engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    pub node_a: NodeId,
    pub node_b: NodeId,
    pub point: Vec3,
}

impl Contact {
    /// The node on the other side of `node`, if `node` takes part.
    pub fn other(&self, node: NodeId) -> Option<NodeId> {
        if self.node_a == node {
            Some(self.node_b)
        } else if self.node_b == node {
            Some(self.node_a)
        } else {
            None
        }
    }
}

//=========================================================================
// Unit Tests
//=========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hue_wheel_primaries() {
        assert_eq!(hue(0.0), Vec4::new(1.0, 0.0, 0.0, 1.0));
        assert!((hue(1.0 / 3.0) - Vec4::new(0.0, 1.0, 0.0, 1.0)).length() < 1e-5);
        assert!((hue(2.0 / 3.0) - Vec4::new(0.0, 0.0, 1.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn uniform_overwrites_existing_value() {
        let mut node = Node::new("globe");
        node.set_uniform("Amplitude", 3.0);
        node.set_uniform("Amplitude", 0.0);
        assert_eq!(node.uniform("Amplitude"), Some(0.0));
        assert_eq!(node.uniforms.len(), 1);
    }

    #[test]
    fn contact_other_side() {
        let contact = Contact {
            node_a: NodeId(1),
            node_b: NodeId(2),
            point: Vec3::ZERO,
        };
        assert_eq!(contact.other(NodeId(1)), Some(NodeId(2)));
        assert_eq!(contact.other(NodeId(2)), Some(NodeId(1)));
        assert_eq!(contact.other(NodeId(3)), None);
    }
}
