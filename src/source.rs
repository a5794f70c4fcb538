//! Source files as named, rectangular arrays.
//!
//! The pipeline only sees [`ProfileSource`]; [`NetcdfSource`] is the Argo
//! `*_prof.nc` implementation.

use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use crate::{error::SourceError, record::RawSample};

pub const VAR_LONGITUDE: &str = "LONGITUDE";
pub const VAR_LATITUDE:  &str = "LATITUDE";
pub const VAR_TEMP:      &str = "TEMP";
pub const VAR_PRES:      &str = "PRES";
pub const VAR_PSAL:      &str = "PSAL";
pub const VAR_JULD:      &str = "JULD";
pub const VAR_PLATFORM:  &str = "PLATFORM_NUMBER";
pub const VAR_CYCLE:     &str = "CYCLE_NUMBER";

/// Something that can turn a file into [`ProfileArrays`].
pub trait ProfileSource: Sync {
    fn read(&self, path: &Path) -> Result<ProfileArrays, SourceError>;
}

/// Per-profile vectors have `n_prof` entries; per-sample vectors are
/// row-major `n_prof × n_levels`. Missing floats are NaN, a missing cast
/// time is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileArrays {
    pub n_prof:      usize,
    pub n_levels:    usize,
    pub longitude:   Vec<f64>,
    pub latitude:    Vec<f64>,
    pub juld:        Vec<Option<NaiveDateTime>>,
    pub platform:    Vec<String>,
    pub cycle:       Vec<i32>,
    pub temperature: Vec<f64>,
    pub pressure:    Vec<f64>,
    pub salinity:    Vec<f64>,
}

impl ProfileArrays {
    pub fn validate(&self) -> Result<(), SourceError> {
        let per_prof = [
            (VAR_LONGITUDE, self.longitude.len()),
            (VAR_LATITUDE,  self.latitude.len()),
            (VAR_JULD,      self.juld.len()),
            (VAR_PLATFORM,  self.platform.len()),
            (VAR_CYCLE,     self.cycle.len()),
        ];
        for (name, actual) in per_prof {
            if actual != self.n_prof {
                return Err(SourceError::Shape { name, expected: self.n_prof, actual });
            }
        }
        let grid = self.n_prof * self.n_levels;
        for (name, actual) in [
            (VAR_TEMP, self.temperature.len()),
            (VAR_PRES, self.pressure.len()),
            (VAR_PSAL, self.salinity.len()),
        ] {
            if actual != grid {
                return Err(SourceError::Shape { name, expected: grid, actual });
            }
        }
        Ok(())
    }

    /// Number of profiles with no usable cast time.
    pub fn undated_profiles(&self) -> usize {
        self.juld.iter().filter(|t| t.is_none()).count()
    }

    /// Every (profile, level) sample of the profiles that have a cast time.
    pub fn samples(&self) -> impl Iterator<Item = RawSample<'_>> + '_ {
        (0..self.n_prof)
            .filter_map(move |i| self.juld[i].map(|ts| (i, ts)))
            .flat_map(move |(i, ts)| {
                (0..self.n_levels).map(move |j| {
                    let k = i * self.n_levels + j;
                    RawSample {
                        longitude:   self.longitude[i],
                        latitude:    self.latitude[i],
                        temperature: self.temperature[k],
                        pressure:    self.pressure[k],
                        salinity:    self.salinity[k],
                        timestamp:   ts,
                        platform:    &self.platform[i],
                        cycle:       self.cycle[i],
                    }
                })
            })
    }
}

// ─────────────────────────────────────────────────────────────────────
// JULD (days since 1950-01-01 UTC) → timestamp
// ─────────────────────────────────────────────────────────────────────
pub fn juld_to_datetime(days: f64) -> Option<NaiveDateTime> {
    if !days.is_finite() {
        return None;
    }
    let epoch = NaiveDate::from_ymd_opt(1950, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let ms = (days * 86_400_000.0).round();
    if ms.abs() > i64::MAX as f64 {
        return None;
    }
    epoch.checked_add_signed(Duration::milliseconds(ms as i64))
}

// ─────────────────────────────────────────────────────────────────────
// NetCDF
// ─────────────────────────────────────────────────────────────────────
#[derive(Debug, Default, Clone, Copy)]
pub struct NetcdfSource;

impl ProfileSource for NetcdfSource {
    fn read(&self, path: &Path) -> Result<ProfileArrays, SourceError> {
        let nc = netcdf::open(path).map_err(|e| SourceError::Open {
            path:   path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let longitude = read_f64(&nc, VAR_LONGITUDE)?;
        let latitude  = read_f64(&nc, VAR_LATITUDE)?;
        let n_prof    = longitude.len();

        let temp_var = nc.variable(VAR_TEMP).ok_or(SourceError::MissingVariable(VAR_TEMP))?;
        let n_levels = temp_var.dimensions().get(1).map_or(0, |d| d.len());

        let juld = read_f64(&nc, VAR_JULD)?
            .into_iter()
            .map(juld_to_datetime)
            .collect();

        let cycle = {
            let v = nc.variable(VAR_CYCLE).ok_or(SourceError::MissingVariable(VAR_CYCLE))?;
            v.get_values::<i32, _>(..)?
        };

        let arrays = ProfileArrays {
            n_prof,
            n_levels,
            longitude,
            latitude,
            juld,
            platform:    read_platforms(&nc, n_prof)?,
            cycle,
            temperature: read_f64(&nc, VAR_TEMP)?,
            pressure:    read_f64(&nc, VAR_PRES)?,
            salinity:    read_f64(&nc, VAR_PSAL)?,
        };
        arrays.validate()?;
        Ok(arrays)
    }
}

/// Read a numeric variable as f64, turning `_FillValue` into NaN.
fn read_f64(nc: &netcdf::File, name: &'static str) -> Result<Vec<f64>, SourceError> {
    let var  = nc.variable(name).ok_or(SourceError::MissingVariable(name))?;
    let fill = fill_value(&var);
    let mut vals = var.get_values::<f64, _>(..)?;
    if let Some(fill) = fill {
        vals.iter_mut().filter(|v| **v == fill).for_each(|v| *v = f64::NAN);
    }
    Ok(vals)
}

fn fill_value(var: &netcdf::Variable) -> Option<f64> {
    use netcdf::AttributeValue as A;
    match var.attribute_value("_FillValue")?.ok()? {
        A::Double(x) => Some(x),
        A::Float(x)  => Some(f64::from(x)),
        A::Int(x)    => Some(f64::from(x)),
        A::Short(x)  => Some(f64::from(x)),
        _            => None,
    }
}

/// `PLATFORM_NUMBER` is a fixed-width char array, one row per profile.
fn read_platforms(nc: &netcdf::File, n_prof: usize) -> Result<Vec<String>, SourceError> {
    let var   = nc.variable(VAR_PLATFORM).ok_or(SourceError::MissingVariable(VAR_PLATFORM))?;
    let width = var.dimensions().get(1).map_or(1, |d| d.len()).max(1);
    let mut buf = vec![0u8; n_prof * width];
    var.get_raw_values_into(&mut buf, ..)?;
    Ok(buf
        .chunks(width)
        .map(|row| String::from_utf8_lossy(row).into_owned())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arrays() -> ProfileArrays {
        let t = NaiveDate::from_ymd_opt(2025, 3, 17).unwrap().and_hms_opt(0, 0, 0).unwrap();
        ProfileArrays {
            n_prof:      2,
            n_levels:    3,
            longitude:   vec![10.0, -20.0],
            latitude:    vec![1.0, 2.0],
            juld:        vec![Some(t), None],
            platform:    vec!["A".into(), "B".into()],
            cycle:       vec![1, 2],
            temperature: vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
            pressure:    vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
            salinity:    vec![35.0; 6],
        }
    }

    #[test]
    fn samples_walk_row_major_and_skip_undated() {
        let a = arrays();
        a.validate().unwrap();
        let s: Vec<_> = a.samples().collect();
        assert_eq!(s.len(), 3);
        assert_eq!(s[2].pressure, 30.0);
        assert_eq!(s[0].platform, "A");
        assert_eq!(a.undated_profiles(), 1);
    }

    #[test]
    fn ragged_arrays_are_rejected() {
        let mut a = arrays();
        a.salinity.pop();
        assert!(matches!(a.validate(), Err(SourceError::Shape { name: VAR_PSAL, .. })));
    }

    #[test]
    fn juld_epoch_and_fill() {
        let t = juld_to_datetime(27_469.25).unwrap();
        assert_eq!(t.to_string(), "2025-03-17 06:00:00");
        assert!(juld_to_datetime(f64::NAN).is_none());
    }
}
