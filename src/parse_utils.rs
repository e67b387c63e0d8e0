use crate::math::Vector3;

pub fn parse_vec3(src: &str) -> Option<Vector3> {
    let mut split = src.split_whitespace();
    let x = split.next()?.parse::<f32>().ok()?;
    let y = split.next()?.parse::<f32>().ok()?;
    let z = split.next()?.parse::<f32>().ok()?;

    if split.next().is_some() {
        return None;
    }

    Some(Vector3::new(x, y, z))
}

pub fn parse_f32(src: &str) -> Option<f32> {
    src.trim().parse::<f32>().ok().filter(|v| v.is_finite())
}

pub fn parse_bool(src: &str) -> Option<bool> {
    match src.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Some(true),
        "0" | "false" | "no" => Some(false),
        _ => None,
    }
}
