//! Line-oriented scene descriptions.
//!
//! ```text
//! # comment
//! SIZE 800 600 -40 30 40 -30
//! TITLE Bouncing particles
//! LINE -40 -30 40 -30
//! LINE -40 -30 -40 30 0 0
//! PARTICLE 1 1 0 10 [vx vy]
//! BALL 2 1.5 5 10 [vx vy] [angle] [angular velocity]
//! BOX 3 2 1 -5 10 [vx vy] [angle] [angular velocity]
//! GRAVITY [gx gy]
//! REPEAT 50 PARTICLE 1 2 0.5 1 -30 30 0 25
//! END
//! ```

use std::path::Path;

use glam::Vec2;
use rand::Rng;
use tracing::{debug, warn};

use crate::api::SimulatorApi;
use crate::error::{SceneError, SimError, SimResult};
use crate::force::{ForceField, EARTH_GRAVITY};

/// Window size and visible world rectangle from a `SIZE` directive.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

/// One population step produced by parsing.
#[derive(Clone, Debug, PartialEq)]
pub enum SceneCommand {
    Line { start: Vec2, end: Vec2, facing: Option<Vec2> },
    Particle { mass: f32, radius: f32, pos: Vec2, vel: Vec2 },
    Ball { mass: f32, radius: f32, pos: Vec2, vel: Vec2, angle: f32, ang_vel: f32 },
    Box { mass: f32, width: f32, height: f32, pos: Vec2, vel: Vec2, angle: f32, ang_vel: f32 },
    Gravity(Vec2),
}

/// A fully parsed scene. Random `REPEAT` batches are already expanded, so
/// applying the same `Scene` twice yields identical simulators.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scene {
    pub title: Option<String>,
    pub viewport: Option<Viewport>,
    pub commands: Vec<SceneCommand>,
}

struct LineCtx<'a> {
    origin: &'a str,
    line: usize,
    directive: &'a str,
}

impl LineCtx<'_> {
    fn syntax(&self) -> SceneError {
        SceneError::Syntax {
            origin: self.origin.to_string(),
            line: self.line,
            message: format!("invalid '{}' input", self.directive),
        }
    }

    fn invalid(&self, source: SimError) -> SceneError {
        SceneError::Invalid { origin: self.origin.to_string(), line: self.line, source }
    }

    fn numbers(&self, args: &[&str]) -> Result<Vec<f32>, SceneError> {
        args.iter().map(|a| a.parse::<f32>().map_err(|_| self.syntax())).collect()
    }

    fn mass(&self, mass: f32) -> Result<f32, SceneError> {
        if mass.is_finite() && mass > 0.0 {
            Ok(mass)
        } else {
            Err(self.invalid(SimError::InvalidMass(mass)))
        }
    }

    /// Optional trailing `[vx vy] [angle] [angular velocity]`.
    fn motion(&self, rest: &[f32]) -> Result<(Vec2, f32, f32), SceneError> {
        match *rest {
            [] => Ok((Vec2::ZERO, 0.0, 0.0)),
            [vx, vy] => Ok((Vec2::new(vx, vy), 0.0, 0.0)),
            [vx, vy, angle] => Ok((Vec2::new(vx, vy), angle, 0.0)),
            [vx, vy, angle, ang_vel] => Ok((Vec2::new(vx, vy), angle, ang_vel)),
            _ => Err(self.syntax()),
        }
    }

    fn sample<R: Rng + ?Sized>(&self, rng: &mut R, lo: f32, hi: f32) -> Result<f32, SceneError> {
        if !(lo <= hi && lo.is_finite() && hi.is_finite()) {
            return Err(self.syntax());
        }
        Ok(if lo == hi { lo } else { rng.gen_range(lo..=hi) })
    }
}

impl Scene {
    /// Parse `source`. `origin` names the input in error messages; `rng`
    /// drives `REPEAT` batches.
    pub fn parse<R: Rng + ?Sized>(source: &str, origin: &str, rng: &mut R) -> Result<Self, SceneError> {
        let mut scene = Scene::default();

        for (idx, raw) in source.lines().enumerate() {
            let mut tokens = raw.split_whitespace();
            let Some(directive) = tokens.next() else { continue };
            if directive.starts_with('#') {
                continue;
            }
            let args: Vec<&str> = tokens.collect();
            let ctx = LineCtx { origin, line: idx + 1, directive };

            match directive {
                "SIZE" => {
                    let [w, h, rest @ ..] = args.as_slice() else { return Err(ctx.syntax()) };
                    let width = w.parse::<u32>().map_err(|_| ctx.syntax())?;
                    let height = h.parse::<u32>().map_err(|_| ctx.syntax())?;
                    let [left, top, right, bottom] = ctx.numbers(rest)?[..] else { return Err(ctx.syntax()) };
                    scene.viewport = Some(Viewport { width, height, left, top, right, bottom });
                }
                "TITLE" => {
                    let title = raw.trim_start().trim_start_matches("TITLE").trim();
                    if title.is_empty() {
                        return Err(ctx.syntax());
                    }
                    scene.title = Some(title.to_string());
                }
                "LINE" => {
                    let (start, end, facing) = match ctx.numbers(&args)?[..] {
                        [x1, y1, x2, y2] => (Vec2::new(x1, y1), Vec2::new(x2, y2), None),
                        [x1, y1, x2, y2, px, py] => (Vec2::new(x1, y1), Vec2::new(x2, y2), Some(Vec2::new(px, py))),
                        _ => return Err(ctx.syntax()),
                    };
                    scene.commands.push(SceneCommand::Line { start, end, facing });
                }
                "PARTICLE" => {
                    let nums = ctx.numbers(&args)?;
                    let (pos, vel) = match nums[..] {
                        [_, _, x, y] => (Vec2::new(x, y), Vec2::ZERO),
                        [_, _, x, y, vx, vy] => (Vec2::new(x, y), Vec2::new(vx, vy)),
                        _ => return Err(ctx.syntax()),
                    };
                    let mass = ctx.mass(nums[0])?;
                    scene.commands.push(SceneCommand::Particle { mass, radius: nums[1], pos, vel });
                }
                "BALL" => {
                    let nums = ctx.numbers(&args)?;
                    if nums.len() < 4 {
                        return Err(ctx.syntax());
                    }
                    let (vel, angle, ang_vel) = ctx.motion(&nums[4..])?;
                    scene.commands.push(SceneCommand::Ball {
                        mass: ctx.mass(nums[0])?,
                        radius: nums[1],
                        pos: Vec2::new(nums[2], nums[3]),
                        vel,
                        angle,
                        ang_vel,
                    });
                }
                "BOX" => {
                    let nums = ctx.numbers(&args)?;
                    if nums.len() < 5 {
                        return Err(ctx.syntax());
                    }
                    let (vel, angle, ang_vel) = ctx.motion(&nums[5..])?;
                    scene.commands.push(SceneCommand::Box {
                        mass: ctx.mass(nums[0])?,
                        width: nums[1],
                        height: nums[2],
                        pos: Vec2::new(nums[3], nums[4]),
                        vel,
                        angle,
                        ang_vel,
                    });
                }
                "GRAVITY" => {
                    let g = match ctx.numbers(&args)?[..] {
                        [] => EARTH_GRAVITY,
                        [gx, gy] => Vec2::new(gx, gy),
                        _ => return Err(ctx.syntax()),
                    };
                    scene.commands.push(SceneCommand::Gravity(g));
                }
                "REPEAT" => {
                    let [count, item, rest @ ..] = args.as_slice() else { return Err(ctx.syntax()) };
                    let count = count.parse::<i64>().map_err(|_| ctx.syntax())?.max(0);
                    if *item != "PARTICLE" {
                        warn!(origin, line = ctx.line, item = *item, "REPEAT only supports PARTICLE; ignoring");
                        continue;
                    }
                    let [m0, m1, r0, r1, x0, x1, y0, y1] = ctx.numbers(rest)?[..] else {
                        return Err(ctx.syntax());
                    };
                    ctx.mass(m0)?;
                    for _ in 0..count {
                        let x = ctx.sample(rng, x0, x1)?;
                        let y = ctx.sample(rng, y0, y1)?;
                        let mass = ctx.sample(rng, m0, m1)?;
                        let radius = ctx.sample(rng, r0, r1)?;
                        scene.commands.push(SceneCommand::Particle { mass, radius, pos: Vec2::new(x, y), vel: Vec2::ZERO });
                    }
                }
                "END" => break,
                _ => {
                    return Err(SceneError::UnknownDirective {
                        origin: origin.to_string(),
                        line: ctx.line,
                        directive: directive.to_string(),
                    });
                }
            }
        }

        debug!(origin, commands = scene.commands.len(), title = ?scene.title, "parsed scene");
        Ok(scene)
    }

    /// Read and parse a scene file.
    pub fn load<R: Rng + ?Sized>(path: impl AsRef<Path>, rng: &mut R) -> Result<Self, SceneError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|source| SceneError::Io { path: path.to_path_buf(), source })?;
        Self::parse(&source, &path.display().to_string(), rng)
    }

    /// Clear `sim` and populate it with this scene.
    pub fn apply<S: SimulatorApi>(&self, sim: &mut S) -> SimResult<()> {
        sim.clear();
        for cmd in &self.commands {
            match *cmd {
                SceneCommand::Line { start, end, facing: None } => {
                    sim.add_line(start, end);
                }
                SceneCommand::Line { start, end, facing: Some(p) } => {
                    sim.add_line_facing(start, end, p);
                }
                SceneCommand::Particle { mass, radius, pos, vel } => {
                    sim.add_particle(mass, radius, pos, vel)?;
                }
                SceneCommand::Ball { mass, radius, pos, vel, angle, ang_vel } => {
                    sim.add_ball(mass, radius, pos, vel, angle, ang_vel)?;
                }
                SceneCommand::Box { mass, width, height, pos, vel, angle, ang_vel } => {
                    sim.add_box(mass, width, height, pos, vel, angle, ang_vel)?;
                }
                SceneCommand::Gravity(g) => {
                    sim.add_force_field(ForceField::uniform(g));
                }
            }
        }
        Ok(())
    }
}
