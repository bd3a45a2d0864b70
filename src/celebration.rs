use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

const SYMBOLS: [char; 6] = ['*', '+', 'o', '•', '✦', '✧'];
const GRAVITY: f64 = 12.0;

/// One spark of the all-clear burst
#[derive(Debug, Clone, PartialEq)]
pub struct Spark {
    pub x: f64,
    pub y: f64,
    pub vel_x: f64,
    pub vel_y: f64,
    pub symbol: char,
    pub color_index: usize,
    pub age: f64,
    pub max_age: f64,
}

impl Spark {
    fn launch<R: Rng>(x: f64, y: f64, rng: &mut R) -> Self {
        let angle = rng.gen_range(0.0..std::f64::consts::TAU);
        let speed = rng.gen_range(4.0..14.0);
        Self {
            x,
            y,
            // cells are roughly twice as tall as wide
            vel_x: angle.cos() * speed,
            vel_y: angle.sin() * speed * 0.5 - 4.0,
            symbol: *SYMBOLS.choose(rng).unwrap_or(&'*'),
            color_index: rng.gen_range(0..6),
            age: 0.0,
            max_age: rng.gen_range(1.2..2.5),
        }
    }

    /// Advances physics; returns false once the spark burned out
    fn update(&mut self, dt: f64) -> bool {
        self.x += self.vel_x * dt;
        self.y += self.vel_y * dt;
        self.vel_y += GRAVITY * dt;
        self.vel_x *= 0.97;
        self.age += dt;
        self.age < self.max_age
    }

    pub fn brightness(&self) -> f64 {
        (1.0 - self.age / self.max_age).clamp(0.0, 1.0)
    }
}

/// Firework drawn over the board when a session is all clear
#[derive(Debug, Default)]
pub struct Celebration {
    pub sparks: Vec<Spark>,
    pub is_active: bool,
    elapsed: f64,
    duration: f64,
    width: f64,
    height: f64,
}

impl Celebration {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bursts from the middle of a `width` x `height` cell area
    pub fn start(&mut self, width: u16, height: u16) {
        self.start_with(width, height, &mut rand::thread_rng());
    }

    pub fn start_with<R: Rng>(&mut self, width: u16, height: u16, rng: &mut R) {
        self.width = width as f64;
        self.height = height as f64;
        self.elapsed = 0.0;
        self.duration = 2.5;
        self.is_active = true;

        let (cx, cy) = (self.width / 2.0, self.height / 2.0);
        self.sparks = (0..48).map(|_| Spark::launch(cx, cy, rng)).collect();
    }

    pub fn stop(&mut self) {
        self.is_active = false;
        self.sparks.clear();
    }

    pub fn update(&mut self, dt: Duration) {
        if !self.is_active {
            return;
        }

        let dt = dt.as_secs_f64();
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            self.stop();
            return;
        }

        let (w, h) = (self.width, self.height);
        self.sparks.retain_mut(|s| {
            let alive = s.update(dt);
            alive && s.x >= 0.0 && s.x < w && s.y < h
        });
        if self.sparks.is_empty() {
            self.is_active = false;
        }
    }
}
