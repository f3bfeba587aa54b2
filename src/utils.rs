use rand::Rng;
use ultraviolet::DVec2;

/// Uniform point inside a disc of `radius` around the origin.
/// The square root on the radial draw keeps the areal density uniform.
pub fn uniform_disc_point<R: Rng + ?Sized>(rng: &mut R, radius: f64, pi: f64) -> DVec2 {
    let a = rng.random::<f64>() * 2.0 * pi;
    let (sin, cos) = a.sin_cos();
    let r = rng.random::<f64>().sqrt() * radius;
    DVec2::new(cos, sin) * r
}

/// Keep only finite, strictly positive radii.
pub fn sanitize_radii(radii: &[f64]) -> Vec<f64> {
    radii
        .iter()
        .copied()
        .filter(|r| r.is_finite() && *r > 0.0)
        .collect()
}
