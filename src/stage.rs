//! Headless host for one trail container: replays scripted host events
//! against a [`TrailController`] driven by a manual clock.

use crate::animation::tween_engine::{EngineStats, TweenEngine};
use crate::config::{ConfigError, TrailConfig};
use crate::fade::{FadeConfig, FadeReveal};
use crate::trail::controller::TrailController;
use crate::trail::pointer::PointerInput;
use crate::trail::slot_pool::{SlotId, BASE_Z_INDEX};
use crate::trail::surface::Surface;
use crate::trail::variants::Variant;
use crate::utils::clock::ManualClock;
use crate::utils::geometry::{Position, Rect};
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use trail_script::{HostEvent, ScriptError};

#[derive(Error, Debug)]
pub enum StageError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error("Failed to write summary: {0}")]
    Output(#[from] serde_json::Error),
}

/// Container with a fixed number of equally sized slots.
#[derive(Debug, Clone, PartialEq)]
pub struct StaticSurface {
    pub bounds: Rect,
    pub slots: usize,
    pub slot_width: f64,
    pub slot_height: f64,
}

impl Surface for StaticSurface {
    fn container_bounds(&self) -> Rect {
        self.bounds
    }

    fn slot_count(&self) -> usize {
        self.slots
    }

    fn measure_slot(&self, _slot: SlotId) -> Rect {
        Rect::new(0.0, 0.0, self.slot_width, self.slot_height)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StageOptions {
    pub width: f64,
    pub height: f64,
    pub slots: usize,
    pub slot_width: f64,
    pub slot_height: f64,
    /// Seed for the engine's random numbers; entropy when absent.
    pub seed: Option<u64>,
    /// Fade-in element revealed by `intersection` events.
    pub fade: FadeConfig,
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            slots: 10,
            slot_width: 200.0,
            slot_height: 250.0,
            seed: None,
            fade: FadeConfig::default(),
        }
    }
}

impl StageOptions {
    fn surface(&self) -> StaticSurface {
        StaticSurface {
            bounds: Rect::new(0.0, 0.0, self.width, self.height),
            slots: self.slots,
            slot_width: self.slot_width,
            slot_height: self.slot_height,
        }
    }
}

/// Outcome of a replay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub variant: Option<Variant>,
    pub activations: u64,
    pub per_slot: Vec<u64>,
    /// Pointer and touch events received.
    pub inputs: u64,
    pub active: usize,
    /// Slots with a timeline still running.
    pub animating: usize,
    pub idle: bool,
    pub z_index: u32,
    pub rebuilds: u64,
    pub frames: u64,
    pub torn_down: bool,
    /// Fade-in transition started by an `intersection` event, if any.
    pub reveal: Option<RevealSummary>,
    pub engine: EngineStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevealSummary {
    /// Frame count when the element was revealed.
    pub at_frame: u64,
    pub delay_ms: u64,
    pub duration_ms: u64,
    pub easing: String,
}

pub struct Stage {
    clock: Arc<ManualClock>,
    config: TrailConfig,
    controller: Option<TrailController<StaticSurface, TweenEngine>>,
    variant: Option<Variant>,
    engine_stats: EngineStats,
    activations: u64,
    per_slot: Vec<u64>,
    inputs: u64,
    frames: u64,
    rebuilds: u64,
    fade: FadeReveal,
    reveal: Option<RevealSummary>,
}

impl Stage {
    pub fn new(config: TrailConfig, options: &StageOptions) -> Self {
        let clock = Arc::new(ManualClock::new());
        let engine = match options.seed {
            Some(seed) => TweenEngine::with_seed(clock.clone(), seed),
            None => TweenEngine::new(clock.clone()),
        };
        let controller = TrailController::new(&config, options.surface(), engine);
        Self {
            clock,
            variant: controller.variant(),
            per_slot: vec![0; controller.pool().len()],
            controller: Some(controller),
            config,
            engine_stats: EngineStats::default(),
            activations: 0,
            inputs: 0,
            frames: 0,
            rebuilds: 0,
            fade: FadeReveal::new(options.fade.clone()),
            reveal: None,
        }
    }

    /// Loads `script` and replays it on a fresh stage.
    pub fn replay(
        config: TrailConfig,
        options: &StageOptions,
        script: &Path,
    ) -> Result<Summary, StageError> {
        let events = trail_script::load_script(script)?;
        let mut stage = Self::new(config, options);
        stage.run(&events);
        Ok(stage.summary())
    }

    pub fn run(&mut self, events: &[HostEvent]) {
        for event in events {
            self.handle(event);
        }
    }

    pub fn handle(&mut self, event: &HostEvent) {
        if let HostEvent::Intersection { ratio } = event {
            self.intersect(*ratio);
            return;
        }
        if event.is_input() {
            self.inputs += 1;
        }

        let Some(controller) = self.controller.as_mut() else {
            log::debug!("Stage::handle: ignoring {event} after teardown");
            return;
        };

        match event {
            HostEvent::PointerMove(m) => {
                controller.pointer_moved(&PointerInput::Mouse(Position::new(m.x, m.y)));
            }
            HostEvent::TouchMove(m) => {
                let touches = m.touches.iter().map(|t| Position::new(t.x, t.y)).collect();
                controller.pointer_moved(&PointerInput::Touch(touches));
            }
            HostEvent::Frame { .. } => {
                let dt = event.frame_interval().unwrap_or(trail_script::DEFAULT_FRAME_MS);
                self.clock.advance_ms(dt);
                controller.animator_mut().update();
                let report = controller.tick();
                self.frames += 1;
                if let Some(slot) = report.activated {
                    self.activations += 1;
                    if let Some(count) = self.per_slot.get_mut(slot) {
                        *count += 1;
                    }
                }
            }
            HostEvent::Resize(m) => {
                let bounds = controller.surface().bounds;
                controller.surface_mut().bounds = Rect::new(bounds.left, bounds.top, m.width, m.height);
                controller.resize();
            }
            HostEvent::SetVariant { variant } => {
                self.config = self.config.clone().with_variant(variant.as_str());
                if let Some(controller) = self.controller.take() {
                    let controller = controller.rebuild(&self.config);
                    self.variant = controller.variant();
                    self.controller = Some(controller);
                    self.rebuilds += 1;
                }
            }
            HostEvent::Teardown => {
                if let Some(controller) = self.controller.take() {
                    let (_surface, engine) = controller.teardown();
                    self.engine_stats = engine.stats();
                    self.fade.disconnect();
                    log::info!("Stage::handle: torn down after {} frames", self.frames);
                }
            }
            // Routed to the fade element above.
            HostEvent::Intersection { .. } => {}
        }
    }

    fn intersect(&mut self, ratio: f64) {
        let Some(reveal) = self.fade.on_intersection(ratio) else {
            return;
        };
        log::info!(
            "Stage::intersect: revealing fade-in element at frame {}",
            self.frames
        );
        self.reveal = Some(RevealSummary {
            at_frame: self.frames,
            delay_ms: reveal.delay.as_millis() as u64,
            duration_ms: reveal.duration.as_millis() as u64,
            easing: reveal.easing,
        });
    }

    pub fn fade(&self) -> &FadeReveal {
        &self.fade
    }

    pub fn controller(&self) -> Option<&TrailController<StaticSurface, TweenEngine>> {
        self.controller.as_ref()
    }

    pub fn summary(&self) -> Summary {
        let (active, animating, z_index, engine) = match &self.controller {
            Some(c) => (
                c.tracker().active_count(),
                (0..c.pool().len())
                    .filter(|&slot| c.animator().is_animating(slot))
                    .count(),
                c.pool().z_index(),
                c.animator().stats(),
            ),
            None => (0, 0, BASE_Z_INDEX, self.engine_stats),
        };
        Summary {
            variant: self.variant,
            activations: self.activations,
            per_slot: self.per_slot.clone(),
            inputs: self.inputs,
            active,
            animating,
            idle: active == 0,
            z_index,
            rebuilds: self.rebuilds,
            frames: self.frames,
            torn_down: self.controller.is_none(),
            reveal: self.reveal.clone(),
            engine,
        }
    }
}
