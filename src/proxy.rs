//! Sprite proxy seam
//!
//! The simulation never touches render objects. A host implements
//! `SpriteProxy` and calls `sync` after each frame with the drained events;
//! `sync` creates, moves, re-textures, layers and destroys sprites to match.

use std::collections::HashMap;

use glam::Vec2;

use crate::consts::MAX_CHALLENGE;
use crate::sim::{GameEvent, GameState, SushiKind, draw_order};

/// Preview row height and spacing
const PREVIEW_Y: f32 = 150.0;
const PREVIEW_SPACING: f32 = 100.0;

const FALLING_SCALE: f32 = 0.5;
const PREVIEW_SCALE: f32 = 0.4;
const CAT_SCALE: f32 = 0.4;
const PLATE_SCALE: f32 = 0.5;

/// Opaque handle a proxy maps to its own render objects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpriteHandle {
    Cat,
    Plate,
    PreviewPlate,
    Preview(usize),
    Item(u32),
}

/// Render surface the core drives
pub trait SpriteProxy {
    fn create(&mut self, handle: SpriteHandle, texture: &str, pos: Vec2, scale: f32);
    fn set_position(&mut self, handle: SpriteHandle, pos: Vec2);
    fn set_texture(&mut self, handle: SpriteHandle, texture: &str);
    fn set_depth(&mut self, handle: SpriteHandle, depth: i32);
    /// Destroying an unknown handle must be a no-op
    fn destroy(&mut self, handle: SpriteHandle);
}

/// Image path for a texture key
pub fn texture_path(key: &str) -> String {
    match key {
        "cat" | "cat-happy" => "assets/images/cat.png".to_string(),
        "plate" => "assets/images/plates/geta.png".to_string(),
        other => match other.strip_suffix("-sushi") {
            Some(name) => format!("assets/images/sushi/{}.png", name),
            None => format!("assets/images/{}.png", other),
        },
    }
}

/// X of preview slot `i` of `len`, centred on the screen
pub fn preview_x(i: usize, len: usize) -> f32 {
    let width = (len.saturating_sub(1)) as f32 * PREVIEW_SPACING;
    crate::consts::SCREEN_WIDTH / 2.0 - width / 2.0 + i as f32 * PREVIEW_SPACING
}

/// Create the cat and plate for a fresh game
pub fn setup(proxy: &mut impl SpriteProxy, state: &GameState) {
    proxy.create(
        SpriteHandle::Plate,
        "plate",
        state.plate.pos(),
        PLATE_SCALE,
    );
    proxy.create(
        SpriteHandle::Cat,
        state.cat_mood.texture_key(),
        state.plate.cat_pos(),
        CAT_SCALE,
    );
    proxy.set_depth(SpriteHandle::Plate, 0);
    proxy.set_depth(SpriteHandle::Cat, 1);
}

/// Remove everything `setup` and `sync` created
pub fn teardown(proxy: &mut impl SpriteProxy, state: &GameState) {
    clear_preview(proxy);
    for id in state
        .round
        .falling
        .iter()
        .map(|i| i.id)
        .chain(state.round.caught.iter().map(|c| c.id))
    {
        proxy.destroy(SpriteHandle::Item(id));
    }
    proxy.destroy(SpriteHandle::Cat);
    proxy.destroy(SpriteHandle::Plate);
}

fn show_preview(proxy: &mut impl SpriteProxy, kinds: &[SushiKind]) {
    clear_preview(proxy);
    let centre = Vec2::new(crate::consts::SCREEN_WIDTH / 2.0, PREVIEW_Y);
    proxy.create(SpriteHandle::PreviewPlate, "plate", centre, PREVIEW_SCALE);
    for (i, kind) in kinds.iter().enumerate() {
        let handle = SpriteHandle::Preview(i);
        let pos = Vec2::new(preview_x(i, kinds.len()), PREVIEW_Y);
        proxy.create(handle, &kind.texture_key(), pos, PREVIEW_SCALE);
        proxy.set_depth(handle, 1);
    }
}

fn clear_preview(proxy: &mut impl SpriteProxy) {
    proxy.destroy(SpriteHandle::PreviewPlate);
    for i in 0..MAX_CHALLENGE {
        proxy.destroy(SpriteHandle::Preview(i));
    }
}

/// Apply drained events, then refresh positions and layering
pub fn sync(proxy: &mut impl SpriteProxy, state: &GameState, events: &[GameEvent]) {
    for event in events {
        match event {
            GameEvent::RoundStarted { .. } => {
                clear_preview(proxy);
                proxy.set_texture(SpriteHandle::Cat, state.cat_mood.texture_key());
            }
            GameEvent::ChallengeShown { kinds, .. } => show_preview(proxy, kinds),
            GameEvent::ChallengeHidden { .. } => clear_preview(proxy),
            GameEvent::ItemSpawned { id, kind, pos, .. } => {
                proxy.create(SpriteHandle::Item(*id), &kind.texture_key(), *pos, FALLING_SCALE);
            }
            GameEvent::ItemCaught { id, rest_pos, .. } => {
                proxy.set_position(SpriteHandle::Item(*id), *rest_pos);
            }
            GameEvent::ItemMissed { id } | GameEvent::ItemRemoved { id } => {
                proxy.destroy(SpriteHandle::Item(*id));
            }
            GameEvent::PlateMoved { .. } => {
                proxy.set_position(SpriteHandle::Plate, state.plate.pos());
                proxy.set_position(SpriteHandle::Cat, state.plate.cat_pos());
            }
            GameEvent::RoundJudged(result) => {
                proxy.set_texture(SpriteHandle::Cat, state.cat_mood.texture_key());
                if let Some(order) = &result.correct_order {
                    show_preview(proxy, order);
                }
            }
            GameEvent::TimeUp | GameEvent::GameOver { .. } => {}
        }
    }

    for item in state.round.falling.iter().filter(|i| !i.processed) {
        proxy.set_position(SpriteHandle::Item(item.id), item.pos);
    }
    for item in &state.round.caught {
        proxy.set_position(SpriteHandle::Item(item.id), item.pos);
    }
    for (depth, id) in draw_order(state).into_iter().enumerate() {
        proxy.set_depth(SpriteHandle::Item(id), 10 + depth as i32);
    }
}

/// A sprite as tracked by `HeadlessProxy`
#[derive(Debug, Clone, PartialEq)]
pub struct HeadlessSprite {
    pub texture: String,
    pub pos: Vec2,
    pub scale: f32,
    pub depth: i32,
}

/// Proxy that only records sprite state (native runs and tests)
#[derive(Debug, Default)]
pub struct HeadlessProxy {
    pub sprites: HashMap<SpriteHandle, HeadlessSprite>,
    pub created: usize,
    pub destroyed: usize,
}

impl HeadlessProxy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, handle: SpriteHandle) -> Option<&HeadlessSprite> {
        self.sprites.get(&handle)
    }

    fn with_sprite(&mut self, handle: SpriteHandle, f: impl FnOnce(&mut HeadlessSprite)) {
        match self.sprites.get_mut(&handle) {
            Some(sprite) => f(sprite),
            None => log::trace!("Update for missing sprite {:?}", handle),
        }
    }
}

impl SpriteProxy for HeadlessProxy {
    fn create(&mut self, handle: SpriteHandle, texture: &str, pos: Vec2, scale: f32) {
        self.created += 1;
        self.sprites.insert(
            handle,
            HeadlessSprite {
                texture: texture.to_string(),
                pos,
                scale,
                depth: 0,
            },
        );
    }

    fn set_position(&mut self, handle: SpriteHandle, pos: Vec2) {
        self.with_sprite(handle, |s| s.pos = pos);
    }

    fn set_texture(&mut self, handle: SpriteHandle, texture: &str) {
        self.with_sprite(handle, |s| s.texture = texture.to_string());
    }

    fn set_depth(&mut self, handle: SpriteHandle, depth: i32) {
        self.with_sprite(handle, |s| s.depth = depth);
    }

    fn destroy(&mut self, handle: SpriteHandle) {
        if self.sprites.remove(&handle).is_some() {
            self.destroyed += 1;
        }
    }
}
