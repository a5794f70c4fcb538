//! Pressure → depth conversion for seawater.
//!
//! Two strategies are available and they are not numerically identical:
//!
//! * [`DepthMethod::Direct`]: closed-form UNESCO 1983 (Fofonoff & Millard)
//!   depth formula with a latitude gravity correction. Default.
//! * [`DepthMethod::Iterative`]: hydrostatic refinement using the EOS-80
//!   equation of state for in-situ density, evaluated at the mid-column
//!   pressure implied by the current depth guess. Stops at [`TOLERANCE_M`] or
//!   after [`MAX_ITER`] steps; the last estimate is returned either way.

use serde::Deserialize;

// ─────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────
pub const TOLERANCE_M: f64   = 1.0e-3;
pub const MAX_ITER:    usize = 10;
pub const DBAR_TO_PA:  f64   = 1.0e4;
pub const DBAR_TO_BAR: f64   = 0.1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DepthMethod {
    #[default]
    Direct,
    Iterative,
}

impl std::str::FromStr for DepthMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct"    => Ok(DepthMethod::Direct),
            "iterative" => Ok(DepthMethod::Iterative),
            other       => Err(format!("unknown depth method '{other}' (expected direct|iterative)")),
        }
    }
}

/// Depth in metres, or `None` if any input is missing (NaN).
pub fn depth(
    method:    DepthMethod,
    pres_dbar: f64,
    psal:      f64,
    temp_c:    f64,
    lat_deg:   f64,
) -> Option<f64> {
    if [pres_dbar, psal, temp_c, lat_deg].iter().any(|v| v.is_nan()) {
        return None;
    }
    let z = match method {
        DepthMethod::Direct    => depth_direct(pres_dbar, lat_deg),
        DepthMethod::Iterative => depth_iterative(pres_dbar, psal, temp_c, lat_deg),
    };
    Some(z)
}

/// Normal gravity (m s⁻²) at the sea surface for a latitude in degrees.
pub fn gravity(lat_deg: f64) -> f64 {
    let x = lat_deg.to_radians().sin().powi(2);
    9.780318 * (1.0 + (5.2788e-3 + 2.36e-5 * x) * x)
}

// ─────────────────────────────────────────────────────────────────────
// Direct formula
// ─────────────────────────────────────────────────────────────────────
fn depth_direct(p: f64, lat_deg: f64) -> f64 {
    // mean gravity over the column picks up 2.184e-6 / 2 per dbar
    let gr = gravity(lat_deg) + 1.092e-6 * p;
    ((((-1.82e-15 * p + 2.279e-10) * p - 2.2512e-5) * p + 9.72659) * p) / gr
}

// ─────────────────────────────────────────────────────────────────────
// Iterative refinement
// ─────────────────────────────────────────────────────────────────────
fn depth_iterative(p_dbar: f64, s: f64, t: f64, lat_deg: f64) -> f64 {
    let g    = gravity(lat_deg);
    let p_pa = p_dbar * DBAR_TO_PA;

    let mut z   = p_dbar;
    let mut rho = density_eos80(s, t, 0.0);

    for _ in 0..MAX_ITER {
        // column-mean density is taken at the mid-column pressure
        let p_mid_bar = rho * g * (z / 2.0) / DBAR_TO_PA * DBAR_TO_BAR;
        rho = density_eos80(s, t, p_mid_bar);
        let next = p_pa / (rho * g);
        if (next - z).abs() < TOLERANCE_M {
            return next;
        }
        z = next;
    }
    z
}

/// EOS-80 in-situ density (kg m⁻³). Pressure is in **bar**, not dbar.
pub fn density_eos80(s: f64, t: f64, p_bar: f64) -> f64 {
    let s15 = s * s.sqrt();
    let (t2, t3, t4, t5) = (t * t, t * t * t, t.powi(4), t.powi(5));

    let rho_w = 999.842594 + 6.793952e-2 * t - 9.095290e-3 * t2 + 1.001685e-4 * t3
        - 1.120083e-6 * t4 + 6.536332e-9 * t5;
    let rho0 = rho_w
        + s * (0.824493 - 4.0899e-3 * t + 7.6438e-5 * t2 - 8.2467e-7 * t3 + 5.3875e-9 * t4)
        + s15 * (-5.72466e-3 + 1.0227e-4 * t - 1.6546e-6 * t2)
        + 4.8314e-4 * s * s;

    if p_bar == 0.0 {
        return rho0;
    }

    let k_w = 19652.21 + 148.4206 * t - 2.327105 * t2 + 1.360477e-2 * t3 - 5.155288e-5 * t4;
    let k0  = k_w
        + s * (54.6746 - 0.603459 * t + 1.09987e-2 * t2 - 6.1670e-5 * t3)
        + s15 * (7.944e-2 + 1.6483e-2 * t - 5.3009e-4 * t2);
    let a   = 3.239908 + 1.43713e-3 * t + 1.16092e-4 * t2 - 5.77905e-7 * t3
        + s * (2.2838e-3 - 1.0981e-5 * t - 1.6078e-6 * t2)
        + 1.91075e-4 * s15;
    let b   = 8.50935e-5 - 6.12293e-6 * t + 5.2787e-8 * t2
        + s * (-9.9348e-7 + 2.0816e-8 * t + 9.1697e-10 * t2);
    let k   = k0 + a * p_bar + b * p_bar * p_bar;

    rho0 / (1.0 - p_bar / k)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_shallow_equator() {
        let z = depth(DepthMethod::Direct, 100.0, 35.0, 10.0, 0.0).unwrap();
        assert!(z > 99.3 && z < 99.5, "got {z}");
    }

    #[test]
    fn direct_matches_unesco_check_value() {
        // UNESCO tech. paper 44: 10000 dbar at 30° → 9712.653 m
        let z = depth(DepthMethod::Direct, 10_000.0, 35.0, 2.0, 30.0).unwrap();
        assert!((z - 9712.653).abs() < 0.01, "got {z}");
    }

    #[test]
    fn missing_inputs_propagate() {
        for m in [DepthMethod::Direct, DepthMethod::Iterative] {
            assert!(depth(m, f64::NAN, 35.0, 10.0, 0.0).is_none());
            assert!(depth(m, 100.0, f64::NAN, 10.0, 0.0).is_none());
            assert!(depth(m, 100.0, 35.0, f64::NAN, 0.0).is_none());
        }
    }

    #[test]
    fn eos80_reference_values() {
        assert!((density_eos80(0.0, 5.0, 0.0) - 999.96675).abs() < 1e-3);
        assert!((density_eos80(35.0, 5.0, 0.0) - 1027.67547).abs() < 1e-3);
        assert!((density_eos80(35.0, 25.0, 1000.0) - 1062.53817).abs() < 1e-2);
    }

    #[test]
    fn iterative_close_to_direct_in_shallow_water() {
        let d = depth(DepthMethod::Direct, 100.0, 35.0, 10.0, 0.0).unwrap();
        let i = depth(DepthMethod::Iterative, 100.0, 35.0, 10.0, 0.0).unwrap();
        assert!((d - i).abs() < 0.5, "direct {d} iterative {i}");
    }

    #[test]
    fn iterative_increases_with_pressure() {
        let shallow = depth(DepthMethod::Iterative, 500.0, 35.0, 4.0, 45.0).unwrap();
        let deep    = depth(DepthMethod::Iterative, 2000.0, 35.0, 4.0, 45.0).unwrap();
        assert!(deep > shallow);
        assert!(deep < 2000.0);
    }

    #[test]
    fn gravity_grows_towards_poles() {
        assert!(gravity(90.0) > gravity(45.0));
        assert!(gravity(-45.0) > gravity(0.0));
    }

    #[test]
    fn parses_method_names() {
        assert_eq!("Direct".parse::<DepthMethod>().unwrap(), DepthMethod::Direct);
        assert_eq!("iterative".parse::<DepthMethod>().unwrap(), DepthMethod::Iterative);
        assert!("bogus".parse::<DepthMethod>().is_err());
    }
}
