/// SVG path data for a polyline with rounded corners. Each interior
/// vertex becomes a quadratic curve clamped to half the shorter adjacent
/// segment; corners too tight to round fall back to plain line joins.
pub fn rounded_path(points: &[(f32, f32)], radius: f32) -> String {
    let Some(first) = points.first() else {
        return String::new();
    };
    if points.len() < 2 {
        return String::new();
    }

    let mut d = format!("M {:.2} {:.2}", first.0, first.1);
    if points.len() == 2 {
        d.push_str(&format!(" L {:.2} {:.2}", points[1].0, points[1].1));
        return d;
    }

    for i in 1..points.len() - 1 {
        let prev = points[i - 1];
        let corner = points[i];
        let next = points[i + 1];
        let incoming = (corner.0 - prev.0, corner.1 - prev.1);
        let outgoing = (next.0 - corner.0, next.1 - corner.1);
        let d1 = incoming.0.abs() + incoming.1.abs();
        let d2 = outgoing.0.abs() + outgoing.1.abs();
        let r = radius.min(d1 / 2.0).min(d2 / 2.0);
        if r > 1.0 && d1 > 0.0 && d2 > 0.0 {
            let unit_in = (incoming.0 / d1, incoming.1 / d1);
            let unit_out = (outgoing.0 / d2, outgoing.1 / d2);
            let before = (corner.0 - unit_in.0 * r, corner.1 - unit_in.1 * r);
            let after = (corner.0 + unit_out.0 * r, corner.1 + unit_out.1 * r);
            d.push_str(&format!(" L {:.2} {:.2}", before.0, before.1));
            d.push_str(&format!(
                " Q {:.2} {:.2} {:.2} {:.2}",
                corner.0, corner.1, after.0, after.1
            ));
        } else {
            d.push_str(&format!(" L {:.2} {:.2}", corner.0, corner.1));
        }
    }

    let last = points[points.len() - 1];
    d.push_str(&format!(" L {:.2} {:.2}", last.0, last.1));
    d
}
