//! Geometry kernel: angles and distances between landmark positions.
//!
//! Every function here is pure; results depend only on the arguments.

use nalgebra::Vector3;

use crate::error::{Error, Result};
use crate::types::Point3D;

/// Arms shorter than this are treated as coincident points
pub const MIN_ARM_LENGTH: f64 = 1e-9;

/// Calculate the angle in radians between two vectors
pub fn angle_between(v1: &Vector3<f64>, v2: &Vector3<f64>) -> Result<f64> {
    let n1 = v1.norm();
    let n2 = v2.norm();
    if n1 < MIN_ARM_LENGTH || n2 < MIN_ARM_LENGTH {
        return Err(Error::Geometry(format!(
            "zero-length arm (|v1| = {n1:.3e}, |v2| = {n2:.3e})"
        )));
    }

    // Clamp absorbs rounding that pushes the cosine just past ±1
    Ok((v1.dot(v2) / (n1 * n2)).clamp(-1.0, 1.0).acos())
}

/// Angle in degrees at vertex `b` between the rays b→a and b→c.
///
/// Always in [0, 180]. Fails when `a` or `c` coincides with `b`.
pub fn angle(a: &Point3D, b: &Point3D, c: &Point3D) -> Result<f64> {
    let ba = a.relative_to(b);
    let bc = c.relative_to(b);
    Ok(angle_between(&ba, &bc)?.to_degrees())
}

/// Euclidean distance between two points
pub fn distance(p1: &Point3D, p2: &Point3D) -> f64 {
    p1.distance_to(p2)
}

/// Angle in degrees between the image-plane segment `to`→`from` and the
/// upward image vertical.
///
/// Image y grows downwards, so a segment whose `from` end sits straight
/// above `to` reads 0 and a horizontal segment reads 90. Depth is ignored.
pub fn inclination(from: &Point3D, to: &Point3D) -> Result<f64> {
    let segment = Vector3::new(from.x - to.x, from.y - to.y, 0.0);
    let up = Vector3::new(0.0, -1.0, 0.0);
    Ok(angle_between(&segment, &up)?.to_degrees())
}
