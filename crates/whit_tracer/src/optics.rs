//! Reflection, refraction and Fresnel reflectance.
//!
//! All routines take the incident direction pointing *toward* the surface and
//! the geometric outward normal, both unit length. Whether the ray enters or
//! leaves the solid is decided from the sign of their dot product; the medium
//! outside every surface has index 1.

use whit_math::Vec3;

/// Reflect a vector about a normal.
#[inline]
pub fn mirror_reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * incident.dot(normal) * normal
}

/// Refraction direction from Snell's law.
///
/// Returns `Vec3::ZERO` on total internal reflection. Callers must check for
/// it before using the result as a direction. A grazing ray (`dot == 0`) is
/// treated as leaving the solid.
pub fn snell_refract(incident: Vec3, normal: Vec3, refractive_index: f32) -> Vec3 {
    let mut eta_in = 1.0;
    let mut eta_out = refractive_index;
    let mut n = normal;
    let mut cos_incident = incident.dot(normal);

    if cos_incident < 0.0 {
        cos_incident = -cos_incident;
    } else {
        std::mem::swap(&mut eta_in, &mut eta_out);
        n = -normal;
    }

    let eta = eta_in / eta_out;
    let cos_refract_sq = 1.0 - eta * eta * (1.0 - cos_incident * cos_incident);
    if cos_refract_sq < 0.0 {
        return Vec3::ZERO;
    }
    eta * incident + (eta * cos_incident - cos_refract_sq.sqrt()) * n
}

/// Exact unpolarized Fresnel reflectance (average of s and p terms).
///
/// Returns exactly 1.0 under total internal reflection and at the critical angle.
pub fn fresnel_reflectance(incident: Vec3, normal: Vec3, refractive_index: f32) -> f32 {
    let mut eta_in = 1.0;
    let mut eta_out = refractive_index;
    let mut cos_incident = incident.dot(normal);

    if cos_incident < 0.0 {
        cos_incident = -cos_incident;
    } else {
        std::mem::swap(&mut eta_in, &mut eta_out);
    }

    let sin_refract = eta_in / eta_out * (1.0 - cos_incident * cos_incident).max(0.0).sqrt();
    if sin_refract >= 1.0 {
        return 1.0;
    }

    let cos_refract = (1.0 - sin_refract * sin_refract).max(0.0).sqrt();
    let r_s = (eta_in * cos_incident - eta_out * cos_refract)
        / (eta_in * cos_incident + eta_out * cos_refract);
    let r_p = (eta_in * cos_refract - eta_out * cos_incident)
        / (eta_in * cos_refract + eta_out * cos_incident);
    ((r_s * r_s + r_p * r_p) * 0.5).clamp(0.0, 1.0)
}
