//! Mass-spring deformable background grid
//!
//! A lattice of point masses in 3D (the z axis points out of the screen)
//! connected by pull-only springs. Border points are immovable so the
//! sheet stays attached to the screen edges, and every few interior
//! points carry a weak anchor spring to a pinned twin that slowly
//! restores the rest shape. Gameplay pokes the sheet through the three
//! force kernels; drawing projects the deformed lattice back to 2D with
//! perspective.

use glam::{Vec2, Vec3};

use crate::color::Color;
use crate::consts::*;
use crate::draw::DrawList;
use crate::catmull_rom;

const GRID_COLOR: Color = Color::new(30.0 / 255.0, 30.0 / 255.0, 139.0 / 255.0, 0.66);

#[derive(Debug, Clone, Copy)]
pub struct PointMass {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Zero pins the point in place
    pub inverse_mass: f32,
    acceleration: Vec3,
    damping: f32,
}

impl PointMass {
    fn new(position: Vec3, inverse_mass: f32) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            inverse_mass,
            acceleration: Vec3::ZERO,
            damping: GRID_BASE_DAMPING,
        }
    }

    fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force * self.inverse_mass;
    }

    /// Extra damping for this frame only; compounds multiplicatively
    fn increase_damping(&mut self, factor: f32) {
        self.damping *= factor;
    }

    fn update(&mut self, dt: f32) {
        self.velocity += self.acceleration * dt;
        self.position += self.velocity * dt;
        self.acceleration = Vec3::ZERO;
        if self.velocity.length_squared() < 1e-6 {
            self.velocity = Vec3::ZERO;
        }
        self.velocity *= self.damping;
        self.damping = GRID_BASE_DAMPING;
    }
}

/// Pull-only spring between two points of the lattice. Indices, not
/// references; the points live in one flat vec owned by the grid.
#[derive(Debug, Clone, Copy)]
struct Spring {
    end1: u32,
    end2: u32,
    target_length: f32,
    stiffness: f32,
    damping: f32,
}

pub struct Grid {
    points: Vec<PointMass>,
    springs: Vec<Spring>,
    /// Lattice dimensions in points (pinned twins live past cols * rows)
    cols: usize,
    rows: usize,
    spacing: f32,
    screen_size: Vec2,
}

impl Grid {
    /// Build the lattice sized so the whole screen holds about
    /// `GRID_MAX_POINTS` points at square spacing.
    pub fn new(screen_size: Vec2) -> Self {
        let spacing = (screen_size.x * screen_size.y / GRID_MAX_POINTS as f32).sqrt();
        let cols = (screen_size.x / spacing).ceil() as usize + 1;
        let rows = (screen_size.y / spacing).ceil() as usize + 1;

        let mut points = Vec::with_capacity(cols * rows);
        for y in 0..rows {
            for x in 0..cols {
                let pos = Vec3::new(x as f32 * spacing, y as f32 * spacing, 0.0);
                // Border points are immovable: the sheet stays glued to
                // the screen edges without any border ties
                let border = x == 0 || y == 0 || x == cols - 1 || y == rows - 1;
                points.push(PointMass::new(pos, if border { 0.0 } else { 1.0 }));
            }
        }

        let mut springs = Vec::new();
        let idx = |x: usize, y: usize| (y * cols + x) as u32;
        // Rest length slightly short of the lattice spacing keeps the
        // sheet under a little tension
        let rest = spacing * 0.95;

        for y in 0..rows {
            for x in 0..cols {
                let here = idx(x, y);
                let movable = points[here as usize].inverse_mass > 0.0;
                if movable && x % GRID_ANCHOR_PERIOD == 0 && y % GRID_ANCHOR_PERIOD == 0 {
                    let twin = Self::push_pin(&mut points, here);
                    springs.push(Spring {
                        end1: twin,
                        end2: here,
                        target_length: 0.0,
                        stiffness: GRID_ANCHOR_STIFFNESS,
                        damping: GRID_ANCHOR_DAMPING,
                    });
                }

                if x > 0 {
                    springs.push(Spring {
                        end1: idx(x - 1, y),
                        end2: here,
                        target_length: rest,
                        stiffness: GRID_STIFFNESS,
                        damping: GRID_SPRING_DAMPING,
                    });
                }
                if y > 0 {
                    springs.push(Spring {
                        end1: idx(x, y - 1),
                        end2: here,
                        target_length: rest,
                        stiffness: GRID_STIFFNESS,
                        damping: GRID_SPRING_DAMPING,
                    });
                }
            }
        }

        Self {
            points,
            springs,
            cols,
            rows,
            spacing,
            screen_size,
        }
    }

    /// Lattice index window whose home cells could fall inside `radius`
    /// of `center`. Points drift from their home cells, so this is a
    /// likely-affected prefilter, not an exact one; the per-point radius
    /// check stays.
    fn range_in_radius(&self, center: Vec3, radius: f32) -> (usize, usize, usize, usize) {
        let left = (((center.x - radius) / self.spacing).ceil().max(0.0)) as usize;
        let right = ((((center.x + radius) / self.spacing).ceil()).max(0.0) as usize)
            .min(self.cols - 1);
        let top = (((center.y - radius) / self.spacing).ceil().max(0.0)) as usize;
        let bottom = ((((center.y + radius) / self.spacing).ceil()).max(0.0) as usize)
            .min(self.rows - 1);
        (left, right, top, bottom)
    }

    /// Pinned copy of an existing point, appended past the lattice
    fn push_pin(points: &mut Vec<PointMass>, of: u32) -> u32 {
        let twin = points.len() as u32;
        points.push(PointMass::new(points[of as usize].position, 0.0));
        twin
    }

    /// Push every point within `radius` along `force` (falls off with
    /// distance). Used for the respawn punch.
    pub fn apply_directed_force(&mut self, force: Vec3, position: Vec3, radius: f32) {
        let (left, right, top, bottom) = self.range_in_radius(position, radius);
        for y in top..=bottom {
            for x in left..=right {
                let p = &mut self.points[y * self.cols + x];
                let dist_sq = position.distance_squared(p.position);
                if dist_sq < radius * radius {
                    p.apply_force(10.0 * force / (10.0 + dist_sq.sqrt()));
                }
            }
        }
    }

    /// Suck points toward `position`; strong close in, heavily damped so
    /// the sheet does not ring. Black holes call this every frame.
    pub fn apply_implosive_force(&mut self, force: f32, position: Vec3, radius: f32) {
        let (left, right, top, bottom) = self.range_in_radius(position, radius);
        for y in top..=bottom {
            for x in left..=right {
                let p = &mut self.points[y * self.cols + x];
                let dist_sq = position.distance_squared(p.position);
                if dist_sq < radius * radius {
                    p.apply_force(10.0 * force * (position - p.position) / (100.0 + dist_sq));
                    p.increase_damping(0.6);
                }
            }
        }
    }

    /// Blast points away from `position`. `damping` is the per-frame
    /// extra damping factor (lower values calm the wave faster).
    pub fn apply_explosive_force(&mut self, force: f32, position: Vec3, radius: f32, damping: f32) {
        let (left, right, top, bottom) = self.range_in_radius(position, radius);
        for y in top..=bottom {
            for x in left..=right {
                let p = &mut self.points[y * self.cols + x];
                let dist_sq = position.distance_squared(p.position);
                if dist_sq < radius * radius {
                    p.apply_force(100.0 * force * (p.position - position) / (10_000.0 + dist_sq));
                    p.increase_damping(damping);
                }
            }
        }
    }

    /// One integration step: springs accumulate forces, then every point
    /// integrates symplectically.
    pub fn update(&mut self, dt: f32) {
        for s in &self.springs {
            let (a, b) = (s.end1 as usize, s.end2 as usize);
            let x = self.points[a].position - self.points[b].position;
            let length = x.length();
            // Pull-only: a compressed spring exerts nothing
            if length <= s.target_length {
                continue;
            }
            let x = (x / length) * (length - s.target_length);
            let dv = self.points[b].velocity - self.points[a].velocity;
            let force = s.stiffness * x - s.damping * dv;
            self.points[a].apply_force(-force);
            self.points[b].apply_force(force);
        }

        for p in &mut self.points {
            p.update(dt);
        }
    }

    /// Perspective projection of a lattice point back onto the screen;
    /// z > 0 is toward the viewer.
    fn project(&self, p: Vec3) -> Vec2 {
        let factor = (p.z + 2000.0) / 2000.0;
        (p.truncate() - self.screen_size / 2.0) * factor + self.screen_size / 2.0
    }

    fn point(&self, x: usize, y: usize) -> Vec3 {
        self.points[y * self.cols + x].position
    }

    /// Emit the lattice as line segments: horizontal and vertical runs
    /// with Catmull-Rom midpoints where the sheet bends sharply, plus
    /// faint half-cell cross lines. Rows and columns on the anchor period
    /// draw thicker.
    pub fn draw(&self, out: &mut DrawList) {
        let cross_color = GRID_COLOR.faded(0.5);
        for y in 0..self.rows {
            for x in 0..self.cols {
                let p = self.project(self.point(x, y));

                if x < self.cols - 1 {
                    let right = self.project(self.point(x + 1, y));
                    let thickness = if y % GRID_ANCHOR_PERIOD == 0 {
                        GRID_ANCHOR_LINE_THICKNESS
                    } else {
                        GRID_LINE_THICKNESS
                    };
                    // Control points clamp at the lattice edges
                    let prev = self.project(self.point(x.saturating_sub(1), y));
                    let next = self.project(self.point((x + 2).min(self.cols - 1), y));
                    self.smoothed_line(out, prev, p, right, next, GRID_COLOR, thickness);
                }
                if y < self.rows - 1 {
                    let down = self.project(self.point(x, y + 1));
                    let thickness = if x % GRID_ANCHOR_PERIOD == 0 {
                        GRID_ANCHOR_LINE_THICKNESS
                    } else {
                        GRID_LINE_THICKNESS
                    };
                    let prev = self.project(self.point(x, y.saturating_sub(1)));
                    let next = self.project(self.point(x, (y + 2).min(self.rows - 1)));
                    self.smoothed_line(out, prev, p, down, next, GRID_COLOR, thickness);
                }

                if x < self.cols - 1 && y < self.rows - 1 {
                    let right = self.project(self.point(x + 1, y));
                    let down = self.project(self.point(x, y + 1));
                    let down_right = self.project(self.point(x + 1, y + 1));
                    out.line(
                        0.5 * (p + down),
                        0.5 * (right + down_right),
                        cross_color,
                        GRID_LINE_THICKNESS,
                    );
                    out.line(
                        0.5 * (p + right),
                        0.5 * (down + down_right),
                        cross_color,
                        GRID_LINE_THICKNESS,
                    );
                }
            }
        }
    }

    /// Segment from `b` to `c`, split at the Catmull-Rom midpoint when the
    /// curve deviates visibly from the chord
    fn smoothed_line(
        &self,
        out: &mut DrawList,
        a: Vec2,
        b: Vec2,
        c: Vec2,
        d: Vec2,
        color: Color,
        thickness: f32,
    ) {
        let mid = catmull_rom(a, b, c, d, 0.5);
        if mid.distance_squared((b + c) / 2.0) > 1.0 {
            out.line(b, mid, color, thickness);
            out.line(mid, c, color, thickness);
        } else {
            out.line(b, c, color, thickness);
        }
    }

    #[cfg(test)]
    fn lattice_points(&self) -> impl Iterator<Item = &PointMass> {
        self.points.iter().take(self.cols * self.rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const DT: f32 = 1.0 / 60.0;

    fn test_grid() -> Grid {
        Grid::new(Vec2::new(1280.0, 720.0))
    }

    fn max_displacement(grid: &Grid, rest: &Grid) -> f32 {
        grid.points
            .iter()
            .zip(&rest.points)
            .map(|(p, r)| p.position.distance(r.position))
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_grid_at_rest_stays_at_rest() {
        let mut grid = test_grid();
        let rest = test_grid();
        for _ in 0..30 {
            grid.update(DT);
        }
        // Slight pre-tension settles a hair, but nothing visible
        assert!(max_displacement(&grid, &rest) < 4.0);
    }

    #[test]
    fn test_pinned_points_never_move() {
        let mut grid = test_grid();
        grid.apply_explosive_force(60.0 * 5000.0, Vec3::new(640.0, 360.0, 0.0), 100_000.0, 1.0);
        for _ in 0..10 {
            grid.update(DT);
        }
        for p in &grid.points {
            if p.inverse_mass == 0.0 {
                assert_eq!(p.velocity, Vec3::ZERO);
            }
        }
    }

    #[test]
    fn test_border_points_are_immovable() {
        let mut grid = test_grid();
        let near_top_edge = grid.point(3, 0) + Vec3::new(0.0, 5.0, 0.0);
        grid.apply_explosive_force(60.0 * 5000.0, near_top_edge, 150.0, 1.0);
        for _ in 0..10 {
            grid.update(DT);
        }
        for y in 0..grid.rows {
            for x in 0..grid.cols {
                if x == 0 || y == 0 || x == grid.cols - 1 || y == grid.rows - 1 {
                    let p = &grid.points[y * grid.cols + x];
                    assert_eq!(p.inverse_mass, 0.0);
                    assert_eq!(p.velocity, Vec3::ZERO);
                }
            }
        }
    }

    #[test]
    fn test_position_steps_by_velocity_times_dt() {
        let mut grid = test_grid();
        let target = grid.point(5, 5);
        // Kernel at zero distance passes the force through unchanged
        let force = Vec3::new(60.0 * 100.0, 0.0, 0.0);
        grid.apply_directed_force(force, target, 1.0);
        grid.update(DT);
        // Neighbor spring pulls cancel on a symmetric interior point, so
        // the whole displacement comes from the applied force
        let moved = grid.point(5, 5) - target;
        let expected = force * DT * DT;
        assert!((moved - expected).length() < 1e-3);
    }

    #[test]
    fn test_explosive_force_pushes_points_outward() {
        let mut grid = test_grid();
        let center = Vec3::new(640.0, 360.0, 0.0);
        grid.apply_explosive_force(60.0 * 5000.0, center, 150.0, 1.0);
        grid.update(DT);

        let mut moved_any = false;
        for p in grid.lattice_points() {
            if p.inverse_mass == 0.0 || p.velocity == Vec3::ZERO {
                continue;
            }
            moved_any = true;
            // Velocity points away from the blast center
            let outward = p.position - center;
            assert!(p.velocity.dot(outward) > 0.0);
        }
        assert!(moved_any);
    }

    #[test]
    fn test_implosive_force_pulls_points_inward() {
        let mut grid = test_grid();
        let center = Vec3::new(640.0, 360.0, 0.0);
        grid.apply_implosive_force(60.0 * 1000.0, center, 150.0);
        grid.update(DT);

        let mut moved_any = false;
        for p in grid.lattice_points() {
            if p.inverse_mass == 0.0 || p.velocity == Vec3::ZERO {
                continue;
            }
            moved_any = true;
            let inward = center - p.position;
            assert!(p.velocity.dot(inward) > 0.0);
        }
        assert!(moved_any);
    }

    #[test]
    fn test_disturbance_decays_back_toward_rest() {
        let mut grid = test_grid();
        let rest = test_grid();
        let center = Vec3::new(640.0, 360.0, 0.0);
        grid.apply_explosive_force(60.0 * 5000.0, center, 150.0, 1.0);
        grid.update(DT);
        let peak = max_displacement(&grid, &rest);
        assert!(peak > 0.0);

        // Ten simulated seconds of damped springs
        for _ in 0..600 {
            grid.update(DT);
        }
        assert!(max_displacement(&grid, &rest) < peak / 4.0);
    }

    #[test]
    fn test_directed_force_respects_radius() {
        let mut grid = test_grid();
        let center = Vec3::new(640.0, 360.0, 0.0);
        grid.apply_directed_force(60.0 * 5000.0 * Vec3::NEG_Z, center, 50.0);
        grid.update(DT);

        for p in grid.lattice_points() {
            if p.position.distance(center) > 60.0 {
                assert_eq!(p.velocity, Vec3::ZERO);
            }
        }
    }

    #[test]
    fn test_draw_emits_lines_only() {
        let grid = test_grid();
        let mut out = DrawList::new();
        grid.draw(&mut out);
        assert!(out.sprites.is_empty());
        assert!(!out.lines.is_empty());
    }

    #[test]
    fn test_draw_covers_first_row_with_thick_stroke() {
        let grid = test_grid();
        let mut out = DrawList::new();
        grid.draw(&mut out);

        // At rest the projection is the identity, so the very first
        // horizontal segment runs from the origin; the top row sits on
        // the anchor period and draws thick
        let first = out
            .lines
            .iter()
            .find(|l| l.start == Vec2::ZERO && l.end.y == 0.0 && l.end.x > 0.0)
            .expect("first top-row segment");
        assert_eq!(first.thickness, GRID_ANCHOR_LINE_THICKNESS);
    }

    proptest! {
        /// A compressed spring exerts no force: two points closer than the
        /// rest length keep zero velocity through an update
        #[test]
        fn prop_pull_only_springs(scale in 0.01f32..0.94) {
            let mut grid = test_grid();
            // Uniformly shrink the lattice toward the center so every
            // neighbor spring is below its rest length
            let center = (grid.screen_size / 2.0).extend(0.0);
            let count = grid.cols * grid.rows;
            for p in grid.points.iter_mut().take(count) {
                p.position = center + (p.position - center) * scale;
            }
            // Detach anchor ties; only neighbor springs remain
            grid.springs.retain(|s| s.target_length > 0.0);

            grid.update(DT);
            for p in grid.points.iter().take(count) {
                prop_assert_eq!(p.velocity, Vec3::ZERO);
            }
        }
    }
}
