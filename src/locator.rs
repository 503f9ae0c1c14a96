//! Geodetic helpers used by amateur radio applications.
//!
//! Maidenhead locators, great-circle distance and bearing on a spherical Earth, and
//! conversion between decimal degrees and degree/minute/second notation. All functions are
//! pure and safe to call from any thread.
//!
//! Longitudes are positive east, latitudes positive north, both in decimal degrees.

use crate::Error;

/// Equatorial circumference of the Earth in km.
pub const EARTH_CIRCUMFERENCE_KM: f64 = 40075.017;

/// Length of one degree of great-circle arc in km.
pub const ARC_IN_KM: f64 = EARTH_CIRCUMFERENCE_KM / 360.0;

pub const MIN_LOCATOR_PAIRS: usize = 1;
pub const MAX_LOCATOR_PAIRS: usize = 6;

/// Number of symbols per pair: fields A-R, squares 0-9, subsquares A-X, and so on.
const LOC_CHAR_RANGE: [u32; MAX_LOCATOR_PAIRS] = [18, 10, 24, 10, 24, 10];

fn pair_base(pair: usize) -> char {
    if pair % 2 == 0 {
        'A'
    } else {
        '0'
    }
}

fn symbol_value(c: char, pair: usize) -> Result<u32, Error> {
    (c.to_ascii_uppercase() as u32)
        .checked_sub(pair_base(pair) as u32)
        .filter(|v| *v < LOC_CHAR_RANGE[pair])
        .ok_or(Error::InvalidLocator)
}

/// Centre of the square named by `locator`, as `(longitude, latitude)`.
///
/// The locator has 1 to 6 character pairs and is case-insensitive.
pub fn locator2longlat(locator: &str) -> Result<(f64, f64), Error> {
    let chars: Vec<char> = locator.trim().chars().collect();
    let pairs = chars.len() / 2;
    if chars.len() % 2 != 0 || !(MIN_LOCATOR_PAIRS..=MAX_LOCATOR_PAIRS).contains(&pairs) {
        return Err(Error::InvalidLocator);
    }

    let mut lon = 0.0;
    let mut lat = 0.0;
    let mut divisions = 1.0;
    for (pair, symbols) in chars.chunks(2).enumerate() {
        divisions *= LOC_CHAR_RANGE[pair] as f64;
        lon += symbol_value(symbols[0], pair)? as f64 * 360.0 / divisions;
        lat += symbol_value(symbols[1], pair)? as f64 * 180.0 / divisions;
    }
    lon += 180.0 / divisions;
    lat += 90.0 / divisions;

    Ok((lon - 180.0, lat - 90.0))
}

/// Locator of `pairs` character pairs containing the point.
///
/// Points on the east or north edge of the map are placed in the last square.
pub fn longlat2locator(longitude: f64, latitude: f64, pairs: usize) -> Result<String, Error> {
    if !(MIN_LOCATOR_PAIRS..=MAX_LOCATOR_PAIRS).contains(&pairs)
        || !(-180.0..=180.0).contains(&longitude)
        || !(-90.0..=90.0).contains(&latitude)
    {
        return Err(Error::OutOfRange);
    }

    let mut symbols = [[' '; 2]; MAX_LOCATOR_PAIRS];
    for (axis, (ordinate, span)) in [(longitude + 180.0, 360.0), (latitude + 90.0, 180.0)]
        .into_iter()
        .enumerate()
    {
        let mut rest: f64 = ordinate;
        let mut divisions = 1.0;
        for (pair, symbol) in symbols.iter_mut().take(pairs).enumerate() {
            divisions *= LOC_CHAR_RANGE[pair] as f64;
            let size = span / divisions;
            let v = ((rest / size).floor() as u32).min(LOC_CHAR_RANGE[pair] - 1);
            rest -= v as f64 * size;
            symbol[axis] = char::from_u32(pair_base(pair) as u32 + v).ok_or(Error::OutOfRange)?;
        }
    }

    Ok(symbols.iter().take(pairs).flatten().collect())
}

/// Great-circle distance in km and initial bearing in degrees (`0..360`, clockwise from north)
/// from point 1 to point 2.
///
/// Coincident points have distance and azimuth 0.
pub fn qrb(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> Result<(f64, f64), Error> {
    for (lon, lat) in [(lon1, lat1), (lon2, lat2)] {
        if !(-180.0..=180.0).contains(&lon) || !(-90.0..=90.0).contains(&lat) {
            return Err(Error::OutOfRange);
        }
    }

    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let dphi = phi2 - phi1;
    let dlambda = (lon2 - lon1).to_radians();

    // haversine
    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let arc = 2.0 * a.sqrt().min(1.0).asin();
    let distance = arc.to_degrees() * ARC_IN_KM;

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    let azimuth = normalize_azimuth(y.atan2(x).to_degrees());

    Ok((distance, azimuth))
}

fn normalize_azimuth(azimuth: f64) -> f64 {
    let az = azimuth.rem_euclid(360.0);
    if az >= 360.0 {
        0.0
    } else {
        az
    }
}

/// Length of the long path, going the other way around the globe.
pub fn distance_long_path(distance: f64) -> f64 {
    EARTH_CIRCUMFERENCE_KM - distance
}

/// Bearing of the long path.
pub fn azimuth_long_path(azimuth: f64) -> f64 {
    normalize_azimuth(azimuth + 180.0)
}

/// Split `-180..=180` decimal degrees into `(degrees, minutes, seconds, negative)`.
///
/// The sign is carried separately so values between -1 and 0 keep it.
pub fn dec2dms(dec: f64) -> Result<(i32, i32, f64, bool), Error> {
    if !(-180.0..=180.0).contains(&dec) {
        return Err(Error::OutOfRange);
    }
    let negative = dec < 0.0;
    let st = dec.abs();
    let degrees = st.trunc();
    let minutes = ((st - degrees) * 60.0).trunc();
    let seconds = (st - degrees - minutes / 60.0) * 3600.0;
    Ok((degrees as i32, minutes as i32, seconds.max(0.0), negative))
}

/// Inverse of [`dec2dms`].
pub fn dms2dec(degrees: i32, minutes: i32, seconds: f64, negative: bool) -> f64 {
    let st = degrees.unsigned_abs() as f64
        + minutes.unsigned_abs() as f64 / 60.0
        + seconds.abs() / 3600.0;
    if negative {
        -st
    } else {
        st
    }
}

/// Split `-180..=180` decimal degrees into `(degrees, decimal minutes, negative)`.
pub fn dec2dmmm(dec: f64) -> Result<(i32, f64, bool), Error> {
    let (degrees, minutes, seconds, negative) = dec2dms(dec)?;
    Ok((degrees, minutes as f64 + seconds / 60.0, negative))
}

/// Inverse of [`dec2dmmm`].
pub fn dmmm2dec(degrees: i32, minutes: f64, negative: bool) -> f64 {
    let st = degrees.unsigned_abs() as f64 + minutes.abs() / 60.0;
    if negative {
        -st
    } else {
        st
    }
}
