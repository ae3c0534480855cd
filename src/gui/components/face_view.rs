use std::f32::consts::TAU;

use eframe::egui;
use glam::Vec2;
use maskfx::RenderParameterSnapshot;
use maskfx::consts::{EYE_POSITIONS, EYE_SPLAY, GLOW_PLANE_SIZE, MOUTH_BAR_COUNT, MOUTH_POSITION};
use maskfx::expression::{EyeShape, Rgb};

/// How far features sit in front of the pivot; sets the parallax on turns.
const HEAD_DEPTH: f32 = 0.9;
const HEAD_RADII: Vec2 = Vec2::new(1.15, 1.35);
const HEAD_SEGMENTS: usize = 48;

/// Head space to screen, with a cheap rotation-as-parallax projection.
struct Projection {
    center: egui::Pos2,
    unit: f32,
    yaw: f32,
    pitch: f32,
}

impl Projection {
    fn to_screen(&self, p: Vec2) -> egui::Pos2 {
        let x = p.x * self.yaw.cos() + self.yaw.sin() * HEAD_DEPTH;
        let y = p.y * self.pitch.cos() - self.pitch.sin() * HEAD_DEPTH;
        egui::pos2(self.center.x + x * self.unit, self.center.y - y * self.unit)
    }
}

pub fn render_face(ui: &mut egui::Ui, snapshot: &RenderParameterSnapshot) -> egui::Response {
    let (response, painter) = ui.allocate_painter(ui.available_size(), egui::Sense::hover());
    let rect = response.rect;

    let projection = Projection {
        center: rect.center(),
        unit: rect.width().min(rect.height()) / 3.2,
        yaw: snapshot.orientation.yaw,
        pitch: snapshot.orientation.pitch,
    };

    // Mask silhouette
    let silhouette: Vec<egui::Pos2> = (0..HEAD_SEGMENTS)
        .map(|i| {
            let angle = i as f32 / HEAD_SEGMENTS as f32 * TAU;
            let p = Vec2::new(angle.cos(), angle.sin()) * HEAD_RADII;
            projection.to_screen(Vec2::new(p.x, p.y * 0.9))
        })
        .collect();
    painter.add(egui::Shape::convex_polygon(
        silhouette,
        egui::Color32::from_gray(18),
        egui::Stroke::new(1.0, egui::Color32::from_gray(40)),
    ));

    let color = to_color(snapshot.color);
    let glow = egui::Color32::from_rgba_unmultiplied(
        snapshot.color.r,
        snapshot.color.g,
        snapshot.color.b,
        (snapshot.glow_opacity.clamp(0.0, 1.0) * 255.0).round() as u8,
    );

    for eye in 0..EYE_POSITIONS.len() {
        let [ex, ey] = EYE_POSITIONS[eye];
        let splay = EYE_SPLAY[eye].cos();
        let jitter = snapshot.jitter[eye];
        let scale = snapshot.eye_scale;

        let place = |q: Vec2| {
            let local = q * scale + jitter;
            projection.to_screen(Vec2::new(local.x * splay + ex, local.y + ey))
        };

        let half = GLOW_PLANE_SIZE * 0.5;
        painter.add(quad(&place, Vec2::ZERO, half * 2.0, half * 2.0, 0.0, glow));

        for shape in eye_shapes(&place, &snapshot.eye_shape, color) {
            painter.add(shape);
        }
    }

    let mouth = &snapshot.mouth;
    let [mx, my] = MOUTH_POSITION;
    let mouth_place = |q: Vec2| projection.to_screen(Vec2::new(q.x + mx, q.y + my));
    let middle = (MOUTH_BAR_COUNT as f32 - 1.0) * 0.5;
    for bar in 0..MOUTH_BAR_COUNT {
        let x = (bar as f32 - middle) * mouth.bar_spacing;
        painter.add(quad(
            &mouth_place,
            Vec2::new(x, 0.0),
            mouth.bar_width,
            mouth.bar_heights[bar] * mouth.scale_y,
            mouth.bar_rotations[bar],
            color,
        ));
    }

    response
}

fn eye_shapes(
    place: &impl Fn(Vec2) -> egui::Pos2,
    shape: &EyeShape,
    color: egui::Color32,
) -> Vec<egui::Shape> {
    match *shape {
        EyeShape::Caret {
            stroke_width,
            stroke_length,
            spread,
            drop,
            tilt,
        } => vec![
            quad(place, Vec2::new(-spread, drop), stroke_width, stroke_length, tilt, color),
            quad(place, Vec2::new(spread, drop), stroke_width, stroke_length, -tilt, color),
        ],
        EyeShape::CrossedBars {
            bar_width,
            bar_length,
            tilt,
        } => vec![
            quad(place, Vec2::ZERO, bar_width, bar_length, tilt, color),
            quad(place, Vec2::ZERO, bar_width, bar_length, -tilt, color),
        ],
        EyeShape::Ring {
            inner_radius,
            outer_radius,
            segments,
            rotation,
        } => {
            let segments = segments.max(3);
            let corner = |k: u32, radius: f32| {
                let angle = rotation + k as f32 / segments as f32 * TAU;
                place(Vec2::new(angle.cos(), angle.sin()) * radius)
            };
            (0..segments)
                .map(|k| {
                    egui::Shape::convex_polygon(
                        vec![
                            corner(k, inner_radius),
                            corner(k, outer_radius),
                            corner(k + 1, outer_radius),
                            corner(k + 1, inner_radius),
                        ],
                        color,
                        egui::Stroke::NONE,
                    )
                })
                .collect()
        }
        EyeShape::FlatBar { width, height } => {
            vec![quad(place, Vec2::ZERO, width, height, 0.0, color)]
        }
    }
}

/// A `width` x `height` rectangle centred on `center`, rotated by `angle`.
fn quad(
    place: &impl Fn(Vec2) -> egui::Pos2,
    center: Vec2,
    width: f32,
    height: f32,
    angle: f32,
    color: egui::Color32,
) -> egui::Shape {
    let (sin, cos) = angle.sin_cos();
    let (hw, hh) = (width * 0.5, height * 0.5);
    let points = [(-hw, -hh), (hw, -hh), (hw, hh), (-hw, hh)]
        .into_iter()
        .map(|(x, y)| place(center + Vec2::new(x * cos - y * sin, x * sin + y * cos)))
        .collect();
    egui::Shape::convex_polygon(points, color, egui::Stroke::NONE)
}

fn to_color(rgb: Rgb) -> egui::Color32 {
    egui::Color32::from_rgb(rgb.r, rgb.g, rgb.b)
}
