use macroquad::prelude::Vec2;

/// A named `<objectgroup>` and the polylines found in it, in map pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectGroup {
    id: u32,
    name: String,
    polylines: Vec<Vec<Vec2>>,
}

impl ObjectGroup {
    /// An empty group.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        ObjectGroup {
            id,
            name: name.into(),
            polylines: Vec::new(),
        }
    }

    /// Adds a polyline whose points are offsets from `origin`.
    pub fn add_polyline(&mut self, origin: Vec2, offsets: impl IntoIterator<Item = Vec2>) {
        self.polylines
            .push(offsets.into_iter().map(|p| origin + p).collect());
    }

    /// Group id from the map document.
    pub fn id(&self) -> u32 {
        self.id
    }

    /// Group name from the map document.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Polylines in document order.
    pub fn polylines(&self) -> &[Vec<Vec2>] {
        &self.polylines
    }
}

/// `-?(0|[1-9][0-9]*)(\.[0-9]+)?`
pub(crate) fn is_decimal_literal(s: &str) -> bool {
    let s = s.strip_prefix('-').unwrap_or(s);
    let (int, frac) = match s.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (s, None),
    };
    let int_ok = crate::decode::is_uint_literal(int);
    let frac_ok = frac.map_or(true, |f| !f.is_empty() && f.bytes().all(|b| b.is_ascii_digit()));
    int_ok && frac_ok
}

/// Parses a polyline `points` attribute: whitespace separated `dx,dy` pairs.
/// Returns the offending token on failure.
pub(crate) fn parse_points(points: &str) -> Result<Vec<Vec2>, String> {
    let mut out = Vec::new();
    for pair in points.split_whitespace() {
        let parsed = pair.split_once(',').and_then(|(dx, dy)| {
            if !is_decimal_literal(dx) || !is_decimal_literal(dy) {
                return None;
            }
            Some(Vec2::new(dx.parse().ok()?, dy.parse().ok()?))
        });
        out.push(parsed.ok_or_else(|| pair.to_owned())?);
    }
    if out.is_empty() {
        return Err(points.to_owned());
    }
    Ok(out)
}
