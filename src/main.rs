//! Sushi Cat entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::rc::Rc;

    use glam::Vec2;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, KeyboardEvent, PointerEvent};

    use sushi_cat::consts::*;
    use sushi_cat::proxy::{self, SpriteHandle, SpriteProxy};
    use sushi_cat::scene::SelectionScene;
    use sushi_cat::sim::{GameEvent, RoundPhase, TickInput};
    use sushi_cat::{Director, SceneId, Tuning};

    /// A DOM <img> standing in for a sprite
    struct DomSprite {
        el: Element,
        pos: Vec2,
        scale: f32,
        depth: i32,
    }

    impl DomSprite {
        fn apply_style(&self) {
            let style = format!(
                "position:absolute;left:{:.1}px;top:{:.1}px;\
                 transform:translate(-50%,-50%) scale({});z-index:{};pointer-events:none",
                self.pos.x, self.pos.y, self.scale, self.depth
            );
            let _ = self.el.set_attribute("style", &style);
        }
    }

    /// Sprite proxy backed by absolutely positioned images in the game container
    struct DomProxy {
        document: Document,
        container: Element,
        sprites: HashMap<SpriteHandle, DomSprite>,
    }

    impl SpriteProxy for DomProxy {
        fn create(&mut self, handle: SpriteHandle, texture: &str, pos: Vec2, scale: f32) {
            self.destroy(handle);
            let el = match self.document.create_element("img") {
                Ok(el) => el,
                Err(e) => {
                    log::warn!("Could not create sprite {:?}: {:?}", handle, e);
                    return;
                }
            };
            let _ = el.set_attribute("src", &proxy::texture_path(texture));
            let _ = self.container.append_child(&el);
            let sprite = DomSprite {
                el,
                pos,
                scale,
                depth: 0,
            };
            sprite.apply_style();
            self.sprites.insert(handle, sprite);
        }

        fn set_position(&mut self, handle: SpriteHandle, pos: Vec2) {
            if let Some(sprite) = self.sprites.get_mut(&handle) {
                if sprite.pos != pos {
                    sprite.pos = pos;
                    sprite.apply_style();
                }
            }
        }

        fn set_texture(&mut self, handle: SpriteHandle, texture: &str) {
            if let Some(sprite) = self.sprites.get(&handle) {
                let _ = sprite.el.set_attribute("src", &proxy::texture_path(texture));
            }
        }

        fn set_depth(&mut self, handle: SpriteHandle, depth: i32) {
            if let Some(sprite) = self.sprites.get_mut(&handle) {
                if sprite.depth != depth {
                    sprite.depth = depth;
                    sprite.apply_style();
                }
            }
        }

        fn destroy(&mut self, handle: SpriteHandle) {
            if let Some(sprite) = self.sprites.remove(&handle) {
                sprite.el.remove();
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        director: Director,
        proxy: DomProxy,
        accumulator: f32,
        last_time: f64,
        input: TickInput,
        held_left: bool,
        held_right: bool,
        /// Director generation the sprites were built for
        synced_generation: u64,
        message: String,
    }

    impl Game {
        fn new(seed: u64, proxy: DomProxy) -> Self {
            Self {
                director: Director::new(Tuning::default(), seed),
                proxy,
                accumulator: 0.0,
                last_time: 0.0,
                input: TickInput::default(),
                held_left: false,
                held_right: false,
                synced_generation: 0,
                message: String::new(),
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32) {
            let dt = dt.min(0.1);
            self.accumulator += dt;
            self.input.move_dir = match (self.held_left, self.held_right) {
                (true, false) => -1.0,
                (false, true) => 1.0,
                _ => 0.0,
            };

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                let input = self.input.clone();
                self.director.update(&input, SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;

                // Clear one-shot inputs after processing
                self.input.confirm = false;
                self.input.pointer_x = None;
                self.input.select_count = None;

                self.sync_sprites();
            }
        }

        /// Rebuild sprites on scene change, then apply this step's events
        fn sync_sprites(&mut self) {
            if self.director.generation() != self.synced_generation {
                self.synced_generation = self.director.generation();
                for handle in self.proxy.sprites.keys().copied().collect::<Vec<_>>() {
                    self.proxy.destroy(handle);
                }
                self.message.clear();
                if let Some(state) = self.director.game_state() {
                    proxy::setup(&mut self.proxy, state);
                }
            }

            let Some(state) = self.director.game_state_mut() else {
                return;
            };
            let events = state.drain_events();
            for event in &events {
                match event {
                    GameEvent::RoundStarted { .. } => self.message.clear(),
                    GameEvent::RoundJudged(result) => {
                        self.message = format!("{}\n{}", result.headline(), result.message)
                    }
                    GameEvent::GameOver { total_score } => {
                        self.message = format!("Game over! Final score: {}", total_score)
                    }
                    _ => {}
                }
            }
            let state = &*state;
            proxy::sync(&mut self.proxy, state, &events);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let document = &self.proxy.document;
            let set_text = |id: &str, text: &str| {
                if let Some(el) = document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            let set_visible = |id: &str, visible: bool| {
                if let Some(el) = document.get_element_by_id(id) {
                    let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
                }
            };

            match self.director.active_id() {
                SceneId::Selection => {
                    set_visible("selection", true);
                    set_visible("hud", false);
                    set_visible("result", false);
                }
                SceneId::Play => {
                    set_visible("selection", false);
                    set_visible("hud", true);
                }
            }

            if let Some(state) = self.director.game_state() {
                let session = &state.session;
                set_text("hud-score", &session.total_score.to_string());
                set_text(
                    "hud-round",
                    &format!("{}/{}", session.round, session.max_rounds),
                );
                set_text("hud-streak", &session.perfect_streak.to_string());
                let secs = match state.round.phase {
                    RoundPhase::Falling => state.seconds_left().ceil() as u32,
                    _ => 0,
                };
                set_text("hud-timer", &secs.to_string());
                set_text("result", &self.message);
                set_visible("result", !self.message.is_empty());
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Sushi Cat starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let container = document.get_element_by_id("game").expect("no game container");

        let seed = js_sys::Date::now() as u64;
        let proxy = DomProxy {
            document: document.clone(),
            container: container.clone(),
            sprites: HashMap::new(),
        };
        let game = Rc::new(RefCell::new(Game::new(seed, proxy)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&container, game.clone());
        setup_auto_release(game.clone());

        request_animation_frame(game);

        log::info!("Sushi Cat running!");
    }

    fn setup_input_handlers(container: &Element, game: Rc<RefCell<Game>>) {
        // Keyboard press
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.held_left = true,
                    "ArrowRight" => g.held_right = true,
                    " " | "Enter" => g.input.confirm = true,
                    "2" | "3" | "4" | "5" => {
                        g.input.select_count = event.key().parse().ok();
                    }
                    "i" | "I" => {
                        g.input.idle_mode = !g.input.idle_mode;
                        log::info!("Idle mode: {}", g.input.idle_mode);
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard release
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" => g.held_left = false,
                    "ArrowRight" => g.held_right = false,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pointer press - mapped into logical screen coordinates
        {
            let game = game.clone();
            let container_clone = container.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                event.prevent_default();
                let rect = container_clone.get_bounding_client_rect();
                if rect.width() <= 0.0 {
                    return;
                }
                let x = (event.client_x() as f64 - rect.left()) / rect.width()
                    * SCREEN_WIDTH as f64;
                game.borrow_mut().input.pointer_x = Some(x as f32);
            });
            let _ = container
                .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Selection buttons
        for count in SelectionScene::choices() {
            let document = web_sys::window().unwrap().document().unwrap();
            if let Some(btn) = document.get_element_by_id(&format!("challenge-{}", count)) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    game.borrow_mut().input.select_count = Some(count);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = web_sys::window()
            .and_then(|w| w.document())
            .and_then(|d| d.get_element_by_id("start-btn"))
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().input.confirm = true;
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Drop held keys when the window loses focus, or the cat keeps walking
    fn setup_auto_release(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut g = game.borrow_mut();
            g.held_left = false;
            g.held_right = false;
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use sushi_cat::consts::{DEFAULT_CHALLENGE, SIM_DT};
    use sushi_cat::proxy::{self, HeadlessProxy};
    use sushi_cat::sim::{GameEvent, TickInput};
    use sushi_cat::{Director, SceneId, Tuning};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Sushi Cat (native) starting...");
    log::info!("Native mode plays headless with the autopilot - use `trunk serve` for the web version");

    let mut args = std::env::args().skip(1).peekable();
    if args.peek().map(String::as_str) == Some("--dump-tuning") {
        match Tuning::default().to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Could not serialize tuning: {}", e),
        }
        return;
    }
    let challenge_count = args
        .next()
        .and_then(|a| a.parse().ok())
        .unwrap_or(DEFAULT_CHALLENGE);
    let tuning = match args.next() {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| Tuning::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(tuning) => {
                log::info!("Loaded tuning from {}", path);
                tuning
            }
            Err(e) => {
                log::error!("Could not load tuning from {}: {}", path, e);
                Tuning::default()
            }
        },
        None => Tuning::default(),
    };

    let seed = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0);
    let mut director = Director::new(tuning, seed);
    let mut proxy = HeadlessProxy::new();

    let start = TickInput {
        select_count: Some(challenge_count),
        confirm: true,
        ..Default::default()
    };
    director.update(&start, SIM_DT);

    let idle = TickInput {
        idle_mode: true,
        ..Default::default()
    };
    if let Some(state) = director.game_state() {
        proxy::setup(&mut proxy, state);
    }

    while director.active_id() == SceneId::Play {
        director.update(&idle, SIM_DT);
        let Some(state) = director.game_state_mut() else {
            break;
        };
        let events = state.drain_events();
        for event in &events {
            if let GameEvent::RoundJudged(result) = event {
                println!("--- Round {}: {} ---", result.round, result.headline());
                println!("{}", result.message);
            }
        }
        proxy::sync(&mut proxy, state, &events);

        if state.is_game_over() {
            let session = state.session.clone();
            proxy::teardown(&mut proxy, state);
            log::info!(
                "Sprites created: {}, destroyed: {}",
                proxy.created,
                proxy.destroyed
            );
            match serde_json::to_string_pretty(&session) {
                Ok(json) => println!("{}", json),
                Err(e) => log::error!("Could not serialize session: {}", e),
            }
            break;
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
