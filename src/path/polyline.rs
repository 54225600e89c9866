//! Google encoded polyline format, precision 1e5.

use geo_types::{Coord, LineString};

use crate::error::{invalid_route_error, Error};

const PRECISION: f64 = 1e5;

#[tracing::instrument(level = "debug", skip(encoded), fields(len = encoded.len()))]
pub fn decode(encoded: &str) -> Result<LineString<f64>, Error> {
    let bytes = encoded.as_bytes();
    let mut index = 0;
    let mut latitude: i64 = 0;
    let mut longitude: i64 = 0;
    let mut coords = vec![];

    while index < bytes.len() {
        latitude += decode_value(bytes, &mut index)?;
        longitude += decode_value(bytes, &mut index)?;

        coords.push(Coord {
            x: longitude as f64 / PRECISION,
            y: latitude as f64 / PRECISION,
        });
    }

    Ok(LineString::new(coords))
}

fn decode_value(bytes: &[u8], index: &mut usize) -> Result<i64, Error> {
    let mut result: i64 = 0;
    let mut shift = 0;

    loop {
        let byte = *bytes.get(*index).ok_or_else(invalid_route_error)?;
        if !(63..127).contains(&byte) || shift > 60 {
            return Err(invalid_route_error());
        }

        let chunk = (byte - 63) as i64;
        *index += 1;

        result |= (chunk & 0x1f) << shift;
        shift += 5;

        if chunk < 0x20 {
            break;
        }
    }

    if result & 1 == 1 {
        Ok(!(result >> 1))
    } else {
        Ok(result >> 1)
    }
}

pub fn encode(line: &LineString<f64>) -> String {
    let mut encoded = String::new();
    let mut previous = (0i64, 0i64);

    for coord in line.coords() {
        let latitude = (coord.y * PRECISION).round() as i64;
        let longitude = (coord.x * PRECISION).round() as i64;

        encode_value(latitude - previous.0, &mut encoded);
        encode_value(longitude - previous.1, &mut encoded);

        previous = (latitude, longitude);
    }

    encoded
}

fn encode_value(delta: i64, out: &mut String) {
    let mut value = if delta < 0 { !(delta << 1) } else { delta << 1 };

    while value >= 0x20 {
        out.push(char::from((((value & 0x1f) | 0x20) + 63) as u8));
        value >>= 5;
    }

    out.push(char::from((value + 63) as u8));
}
