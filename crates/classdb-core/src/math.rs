//! Plain-old-data math carriers.
//!
//! These exist so that [`Value`](crate::Value) can transport the full set of
//! engine-facing types. They are data, not a math library: construction,
//! equality, and a stable hash fold are all that the registry needs.

use crate::hashing::{canon_f32_bits, fold64};

macro_rules! fold_fields {
    ($acc:expr, $($field:expr),+ $(,)?) => {{
        let mut acc = $acc;
        $(acc = fold64(acc, canon_f32_bits($field) as u64);)+
        acc
    }};
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

impl Vector2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn fold_hash(&self, acc: u64) -> u64 {
        fold_fields!(acc, self.x, self.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vector3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn fold_hash(&self, acc: u64) -> u64 {
        fold_fields!(acc, self.x, self.y, self.z)
    }
}

/// Axis-aligned rectangle: origin + size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect2 {
    pub position: Vector2,
    pub size: Vector2,
}

impl Rect2 {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            position: Vector2::new(x, y),
            size: Vector2::new(w, h),
        }
    }

    pub fn fold_hash(&self, acc: u64) -> u64 {
        self.size.fold_hash(self.position.fold_hash(acc))
    }
}

/// Normal + distance plane representation.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Plane {
    pub normal: Vector3,
    pub d: f32,
}

impl Plane {
    pub fn new(a: f32, b: f32, c: f32, d: f32) -> Self {
        Self {
            normal: Vector3::new(a, b, c),
            d,
        }
    }

    pub fn fold_hash(&self, acc: u64) -> u64 {
        fold_fields!(self.normal.fold_hash(acc), self.d)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quat {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Quat {
    pub fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    pub fn fold_hash(&self, acc: u64) -> u64 {
        fold_fields!(acc, self.x, self.y, self.z, self.w)
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}

/// Axis-aligned box: position + size.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Aabb {
    pub position: Vector3,
    pub size: Vector3,
}

impl Aabb {
    pub fn new(position: Vector3, size: Vector3) -> Self {
        Self { position, size }
    }

    pub fn fold_hash(&self, acc: u64) -> u64 {
        self.size.fold_hash(self.position.fold_hash(acc))
    }
}

/// 3x3 matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Basis {
    pub rows: [Vector3; 3],
}

impl Basis {
    pub fn fold_hash(&self, acc: u64) -> u64 {
        self.rows
            .iter()
            .fold(acc, |acc, row| row.fold_hash(acc))
    }
}

impl Default for Basis {
    fn default() -> Self {
        Self {
            rows: [
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
                Vector3::new(0.0, 0.0, 1.0),
            ],
        }
    }
}

/// 2D affine transform: two basis columns + origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2d {
    pub columns: [Vector2; 3],
}

impl Transform2d {
    pub fn fold_hash(&self, acc: u64) -> u64 {
        self.columns
            .iter()
            .fold(acc, |acc, col| col.fold_hash(acc))
    }
}

impl Default for Transform2d {
    fn default() -> Self {
        Self {
            columns: [
                Vector2::new(1.0, 0.0),
                Vector2::new(0.0, 1.0),
                Vector2::new(0.0, 0.0),
            ],
        }
    }
}

/// 3D affine transform: basis + origin.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform3d {
    pub basis: Basis,
    pub origin: Vector3,
}

impl Transform3d {
    pub fn fold_hash(&self, acc: u64) -> u64 {
        self.origin.fold_hash(self.basis.fold_hash(acc))
    }
}

/// RGBA color, components in 0..=1 by convention but not clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub fn fold_hash(&self, acc: u64) -> u64 {
        fold_fields!(acc, self.r, self.g, self.b, self.a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }
}
