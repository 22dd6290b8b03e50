use glam::DVec2;
use ratatui::style::Color;

use super::Surface;

/// Draw a line using Bresenham's algorithm
pub fn draw_line<S: Surface + ?Sized>(surface: &mut S, x0: i32, y0: i32, x1: i32, y1: i32, color: Color) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        surface.plot(x, y, color);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a filled circle
pub fn fill_circle<S: Surface + ?Sized>(surface: &mut S, cx: i32, cy: i32, radius: i32, color: Color) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                surface.plot(cx + dx, cy + dy, color);
            }
        }
    }
}

/// Draw a one-pixel circle outline
pub fn stroke_circle<S: Surface + ?Sized>(surface: &mut S, cx: i32, cy: i32, radius: i32, color: Color) {
    let inner = (radius - 1) * (radius - 1);
    let outer = radius * radius;
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            let d = dx * dx + dy * dy;
            if d <= outer && d > inner {
                surface.plot(cx + dx, cy + dy, color);
            }
        }
    }
}

/// Fill a closed polygon with the even-odd rule, sampling pixel centers
pub fn fill_polygon<S: Surface + ?Sized>(surface: &mut S, points: &[DVec2], color: Color) {
    if points.len() < 3 {
        return;
    }

    let (min_y, max_y) = points
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
    let mut crossings: Vec<f64> = Vec::with_capacity(points.len());

    for y in min_y.floor() as i32..=max_y.ceil() as i32 {
        let sample_y = y as f64 + 0.5;
        crossings.clear();

        for (i, a) in points.iter().enumerate() {
            let b = points[(i + 1) % points.len()];
            if (a.y <= sample_y && b.y > sample_y) || (b.y <= sample_y && a.y > sample_y) {
                let t = (sample_y - a.y) / (b.y - a.y);
                crossings.push(a.x + t * (b.x - a.x));
            }
        }

        crossings.sort_by(|a, b| a.total_cmp(b));
        for span in crossings.chunks_exact(2) {
            let start = (span[0] - 0.5).ceil() as i32;
            let end = (span[1] - 0.5).floor() as i32;
            for x in start..=end {
                surface.plot(x, y, color);
            }
        }
    }
}
