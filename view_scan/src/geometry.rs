//! Small fixed-size geometry used by views: wrapped angles, coordinates and rotations.
//!
//! All angles are `f32` degrees.

use std::ops::{Add, Sub};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Maps any angle into `[-180, 180)`.
pub fn wrap_degrees(angle: f32) -> f32 {

    let mut wrapped = (angle + 180.0).rem_euclid(360.0) - 180.0;

    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if wrapped >= 180.0 {
        wrapped -= 360.0;
    }

    return wrapped;
}

/// Absolute difference between two angles, going the short way round. Always in `[0, 180]`.
pub fn angle_difference(a: f32, b: f32) -> f32 {

    let diff = (a - b).rem_euclid(360.0);
    return diff.min(360.0 - diff);
}

#[derive(Debug, PartialEq, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Coord {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Coord {

    pub fn new(x: f32, y: f32, z: f32) -> Self {
        return Self { x, y, z };
    }

    pub fn dot(&self, other: &Coord) -> f32 {
        return self.x * other.x + self.y * other.y + self.z * other.z;
    }

    pub fn cross(&self, other: &Coord) -> Coord {

        return Coord {
            x: self.y * other.z - self.z * other.y,
            y: self.z * other.x - self.x * other.z,
            z: self.x * other.y - self.y * other.x,
        };
    }

    pub fn scale(&self, factor: f32) -> Coord {
        return Coord::new(self.x * factor, self.y * factor, self.z * factor);
    }

    pub fn length(&self) -> f32 {
        return self.dot(self).sqrt();
    }

    pub fn squared_distance(&self, other: &Coord) -> f32 {

        let diff = *self - *other;
        return diff.dot(&diff);
    }

    pub fn random_in_cube<R: Rng>(rng: &mut R, half_width: f32) -> Self {

        if half_width <= 0.0 {
            return Self::default();
        }

        return Self {
            x: rng.gen_range(-half_width..half_width),
            y: rng.gen_range(-half_width..half_width),
            z: rng.gen_range(-half_width..half_width),
        };
    }
}

impl Add for Coord {
    type Output = Coord;

    fn add(self, other: Coord) -> Coord {
        return Coord::new(self.x + other.x, self.y + other.y, self.z + other.z);
    }
}

impl Sub for Coord {
    type Output = Coord;

    fn sub(self, other: Coord) -> Coord {
        return Coord::new(self.x - other.x, self.y - other.y, self.z - other.z);
    }
}

/// A rotation stored as a unit quaternion.
#[derive(Debug, PartialEq, Clone, Copy, Serialize, Deserialize)]
pub struct Rotation {
    pub w: f32,
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Default for Rotation {
    fn default() -> Self {
        return Self::identity();
    }
}

impl Rotation {

    pub fn identity() -> Self {
        return Self { w: 1.0, x: 0.0, y: 0.0, z: 0.0 };
    }

    /// Rotation of `degrees` about `axis` (right-handed). A zero axis gives the identity.
    pub fn from_axis_angle(axis: Coord, degrees: f32) -> Self {

        let length = axis.length();
        if length == 0.0 {
            return Self::identity();
        }

        let half = degrees.to_radians() / 2.0;
        let unit = axis.scale(half.sin() / length);

        return Self { w: half.cos(), x: unit.x, y: unit.y, z: unit.z };
    }

    /// Uniformly distributed random rotation (Shoemake's method).
    pub fn random<R: Rng>(rng: &mut R) -> Self {

        let u1: f32 = rng.gen();
        let u2: f32 = rng.gen::<f32>() * std::f32::consts::TAU;
        let u3: f32 = rng.gen::<f32>() * std::f32::consts::TAU;

        let a = (1.0 - u1).sqrt();
        let b = u1.sqrt();

        return Self {
            w: b * u3.cos(),
            x: a * u2.sin(),
            y: a * u2.cos(),
            z: b * u3.sin(),
        }.normalized();
    }

    fn vector_part(&self) -> Coord {
        return Coord::new(self.x, self.y, self.z);
    }

    pub fn normalized(&self) -> Self {

        let norm = self.dot(self).sqrt();
        if norm == 0.0 {
            return Self::identity();
        }

        return Self { w: self.w / norm, x: self.x / norm, y: self.y / norm, z: self.z / norm };
    }

    pub fn inverse(&self) -> Self {
        return Self { w: self.w, x: -self.x, y: -self.y, z: -self.z };
    }

    pub fn dot(&self, other: &Rotation) -> f32 {
        return self.w * other.w + self.x * other.x + self.y * other.y + self.z * other.z;
    }

    /// The rotation that applies `other` first and then `self`.
    pub fn compose(&self, other: &Rotation) -> Self {

        return Self {
            w: self.w * other.w - self.x * other.x - self.y * other.y - self.z * other.z,
            x: self.w * other.x + self.x * other.w + self.y * other.z - self.z * other.y,
            y: self.w * other.y - self.x * other.z + self.y * other.w + self.z * other.x,
            z: self.w * other.z + self.x * other.y - self.y * other.x + self.z * other.w,
        };
    }

    pub fn rotate(&self, point: &Coord) -> Coord {

        let q = self.vector_part();
        let t = q.cross(point).scale(2.0);
        return *point + t.scale(self.w) + q.cross(&t);
    }

    /// Angle in degrees of the smallest rotation taking `self` onto `other`, in `[0, 180]`.
    pub fn angle_between(&self, other: &Rotation) -> f32 {
        return angle_of_abs_dot(self.dot(other).abs());
    }
}

/// Converts `|q1 . q2|` of two unit quaternions to the angle between them, in degrees.
pub fn angle_of_abs_dot(abs_dot: f32) -> f32 {
    return (2.0 * abs_dot.min(1.0).acos()).to_degrees();
}

/// Inverse of [`angle_of_abs_dot`]: the smallest `|q1 . q2|` still within `degrees` of each other.
pub fn abs_dot_of_angle(degrees: f32) -> f32 {
    return (degrees.min(180.0).to_radians() / 2.0).cos();
}
