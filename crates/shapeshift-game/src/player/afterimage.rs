//! Fading copies left behind by a dashing body

use glam::Vec2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AfterimageConfig {
    /// Seconds until an afterimage disappears
    pub lifetime: f32,
    /// Seconds between spawns while dashing
    pub spawn_interval: f32,
    /// Alpha of a fresh afterimage
    pub start_alpha: f32,
}

impl Default for AfterimageConfig {
    fn default() -> Self {
        Self {
            lifetime: 0.3,
            spawn_interval: 0.05,
            start_alpha: 0.5,
        }
    }
}

/// One afterimage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Afterimage {
    pub position: Vec2,
    pub facing_right: bool,
    pub age: f32,
    pub alpha: f32,
}

/// Afterimages spawned at a fixed interval that fade out on their own
#[derive(Debug, Clone)]
pub struct AfterimageTrail {
    pub config: AfterimageConfig,
    images: Vec<Afterimage>,
    spawn_timer: f32,
}

impl AfterimageTrail {
    pub fn new(config: AfterimageConfig) -> Self {
        Self {
            config,
            images: Vec::new(),
            spawn_timer: 0.0,
        }
    }

    /// Spawn on the next [`AfterimageTrail::emit`]
    pub fn restart(&mut self) {
        self.spawn_timer = 0.0;
    }

    /// Count down the spawn timer and drop an image when it runs out
    pub fn emit(&mut self, dt: f32, position: Vec2, facing_right: bool) {
        self.spawn_timer -= dt;
        if self.spawn_timer <= 0.0 {
            self.images.push(Afterimage {
                position,
                facing_right,
                age: 0.0,
                alpha: self.config.start_alpha,
            });
            self.spawn_timer = self.config.spawn_interval;
        }
    }

    /// Age and fade every image, dropping expired ones
    pub fn update(&mut self, dt: f32) {
        let lifetime = self.config.lifetime.max(f32::EPSILON);
        let start_alpha = self.config.start_alpha;
        for image in &mut self.images {
            image.age += dt;
            let t = (image.age / lifetime).min(1.0);
            image.alpha = start_alpha * (1.0 - t);
        }
        self.images.retain(|image| image.age < lifetime);
    }

    pub fn images(&self) -> &[Afterimage] {
        &self.images
    }

    pub fn clear(&mut self) {
        self.images.clear();
        self.spawn_timer = 0.0;
    }
}
